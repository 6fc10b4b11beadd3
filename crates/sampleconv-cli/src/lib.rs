//! Shared plumbing for the `sampleconv-bench` and `sampleconv-check`
//! executables: argument parsing, configuration, tracing and the report
//! loops that write to stdout.

#![warn(missing_docs)]

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use rand::RngCore;
use sampleconv_core::bench::{default_suite, run_case};
use sampleconv_core::check::{default_loopback_suite, loopback_check, smoke_check_all};
use sampleconv_core::config::CONFIG_FILE;
use sampleconv_core::{
    log_simd_capabilities, simd_level, ConverterRegistry, SampleconvConfig, SimdLevel,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Options common to both harness executables.
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file (defaults to ./sampleconv.toml)
    #[arg(short, long, env = "SAMPLECONV_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub print_config: bool,
}

impl Args {
    /// The configuration file to read.
    #[must_use]
    pub fn config_path(&self) -> &Path {
        self.config
            .as_deref()
            .unwrap_or_else(|| Path::new(CONFIG_FILE))
    }
}

/// Installs the global subscriber. `RUST_LOG` wins over `default_level`.
///
/// Logs go to stderr so stdout carries only the report. Returns `false` when
/// a global subscriber was already set; that one stays in place.
pub fn init_tracing(default_level: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    match tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
    {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!(error = %e, "keeping the existing tracing subscriber");
            false
        }
    }
}

/// Loads the configuration named by `args`, then installs tracing with its
/// logging level and reports a missing file.
///
/// # Errors
///
/// Fails when the file is malformed or a value is invalid.
pub fn start(args: &Args) -> Result<SampleconvConfig> {
    let path = args.config_path();
    let config = SampleconvConfig::from_file(path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))?;
    if init_tracing(&config.logging.level) {
        tracing::debug!(level = %config.logging.level, "tracing initialised");
    }
    if !path.exists() {
        tracing::warn!(path = %path.display(), "configuration file not found, using defaults");
    }
    log_simd_capabilities();
    Ok(config)
}

/// Builds the registry with both tiers loaded.
///
/// # Errors
///
/// Fails if a built-in registration is rejected.
pub fn default_registry() -> Result<ConverterRegistry> {
    ConverterRegistry::with_defaults().context("failed to load the converter catalog")
}

/// Benchmark header lines.
#[must_use]
pub fn bench_header(config: &SampleconvConfig, level: SimdLevel) -> String {
    format!(
        "sampleconv-bench {}\nKernel level:   {}\nBuffer size:    {} elements\nIterations:     {}\nScalar ratio:   {}\n",
        env!("CARGO_PKG_VERSION"),
        level.name(),
        config.bench.num_elements,
        config.bench.num_iterations,
        config.bench.scalar_ratio,
    )
}

/// Runs the benchmark suite, writing one report per pair.
///
/// # Errors
///
/// Stops at the first pair whose converter cannot be resolved or fails.
pub fn run_bench<W: Write, R: RngCore + ?Sized>(
    registry: &ConverterRegistry,
    config: &SampleconvConfig,
    rng: &mut R,
    out: &mut W,
) -> Result<usize> {
    writeln!(out, "{}", bench_header(config, simd_level()))?;
    let suite = default_suite();
    for case in &suite {
        let report = run_case(registry, case, &config.bench, rng)
            .with_context(|| format!("benchmark failed for {} -> {}", case.source, case.target))?;
        writeln!(out, "{report}\n")?;
    }
    Ok(suite.len())
}

/// Counts of what went wrong during [`run_check`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckOutcome {
    /// Catalog pairs whose smoke call failed.
    pub smoke_failures: usize,
    /// Loopback cases that could not be run.
    pub loopback_failures: usize,
}

impl CheckOutcome {
    /// Returns `true` when nothing failed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.smoke_failures == 0 && self.loopback_failures == 0
    }
}

/// Smoke-checks the catalog, then runs the loopback suite, writing reports.
///
/// # Errors
///
/// Only IO errors on `out`; conversion failures are counted instead.
pub fn run_check<W: Write, R: RngCore + ?Sized>(
    registry: &ConverterRegistry,
    config: &SampleconvConfig,
    rng: &mut R,
    out: &mut W,
) -> Result<CheckOutcome> {
    let mut outcome = CheckOutcome::default();

    let smoke = smoke_check_all(registry, &config.check, rng);
    writeln!(
        out,
        "Smoke check: {} of {} catalog pairs passed",
        smoke.checked - smoke.failures.len(),
        smoke.checked
    )?;
    for failure in &smoke.failures {
        writeln!(
            out,
            " * FAILED {} -> {}: {}",
            failure.source, failure.target, failure.error
        )?;
    }
    outcome.smoke_failures = smoke.failures.len();

    for case in default_loopback_suite() {
        writeln!(out, "-----")?;
        match loopback_check(registry, &case, config.check.loopback_elements, rng) {
            Ok(report) => writeln!(out, "{report}")?,
            Err(e) => {
                outcome.loopback_failures += 1;
                tracing::error!(type1 = %case.type1, type2 = %case.type2, error = %e, "loopback failed");
                writeln!(out, "Testing {} -> {}... FAILED: {e}", case.type1, case.type2)?;
            }
        }
    }
    writeln!(out, "-----")?;
    Ok(outcome)
}

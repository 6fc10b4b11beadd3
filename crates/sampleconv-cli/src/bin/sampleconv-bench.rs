//! `sampleconv-bench`: times the generic and vectorized converter tiers.

use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use sampleconv_cli::{default_registry, run_bench, start, Args};

fn run(args: &Args) -> anyhow::Result<()> {
    let config = start(args)?;
    let mut stdout = std::io::stdout().lock();
    if args.print_config {
        write!(stdout, "{}", config.to_toml_string()?)?;
        return Ok(());
    }

    let registry = default_registry()?;
    let mut rng = StdRng::from_entropy();
    let pairs = run_bench(&registry, &config, &mut rng, &mut stdout)?;
    tracing::info!(pairs, "benchmark complete");
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

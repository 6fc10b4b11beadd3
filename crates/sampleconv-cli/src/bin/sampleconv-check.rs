//! `sampleconv-check`: smoke and loopback checks over the vectorized catalog.

use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use sampleconv_cli::{default_registry, run_check, start, Args};

fn run(args: &Args) -> anyhow::Result<bool> {
    let config = start(args)?;
    let mut stdout = std::io::stdout().lock();
    if args.print_config {
        write!(stdout, "{}", config.to_toml_string()?)?;
        return Ok(true);
    }

    let registry = default_registry()?;
    let mut rng = StdRng::from_entropy();
    let outcome = run_check(&registry, &config, &mut rng, &mut stdout)?;
    if !outcome.passed() {
        tracing::error!(
            smoke_failures = outcome.smoke_failures,
            loopback_failures = outcome.loopback_failures,
            "correctness checks failed"
        );
    }
    Ok(outcome.passed())
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

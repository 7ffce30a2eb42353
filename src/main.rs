//! Stackyield CLI entry point.

mod cli;

use clap::Parser;
use cli::{Cli, Command};
use stackyield::SweepConfig;
use stackyield::check::check_sweep;
use stackyield::runner::run_sweep;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Run(args) => run(args.into_config()),
        Command::Check(args) => check(args.into_config()),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(config: SweepConfig) -> stackyield::Result<()> {
    println!("=== {} ===", config.protocol);
    for report in run_sweep(&config)? {
        println!("{report}");
    }
    Ok(())
}

fn check(config: SweepConfig) -> stackyield::Result<()> {
    let checked = check_sweep(&config)?;
    println!("{}: {checked} sweep point(s) passed", config.protocol);
    Ok(())
}

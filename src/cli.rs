//! Command-line interface for the stackyield driver.

use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use stackyield::{Protocol, SweepConfig};

#[derive(Parser)]
#[command(name = "stackyield")]
#[command(about = "Suspend/resume cost of stackful continuations", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Time a protocol across its parameter sweep
    Run(SweepArgs),
    /// Drive every sweep point through its lifecycle without timing
    Check(SweepArgs),
}

#[derive(Args, Debug)]
pub struct SweepArgs {
    /// Benchmark protocol
    #[arg(value_enum, default_value_t = Protocol::YieldAndStay)]
    pub protocol: Protocol,

    /// Scratch argument counts to sweep (1-3)
    #[arg(long = "params", value_delimiter = ',')]
    pub param_counts: Vec<usize>,

    /// Stack depths to sweep
    #[arg(long, value_delimiter = ',')]
    pub depths: Vec<u32>,

    /// Warm-up iterations
    #[arg(long)]
    pub warmup: Option<u32>,

    /// Measurement iterations
    #[arg(long)]
    pub iterations: Option<u32>,

    /// Wall-clock time per iteration, in milliseconds
    #[arg(long, value_name = "MS")]
    pub time_ms: Option<u64>,

    /// Continuation stack size in bytes
    #[arg(long, value_name = "BYTES")]
    pub stack_size: Option<usize>,
}

impl SweepArgs {
    /// Protocol defaults, overridden by whatever was given on the command line.
    pub fn into_config(self) -> SweepConfig {
        let mut config = SweepConfig::defaults(self.protocol);
        if !self.param_counts.is_empty() {
            config.param_counts = self.param_counts;
        }
        if !self.depths.is_empty() {
            config.depths = self.depths;
        }
        if let Some(iterations) = self.warmup {
            config.warmup.iterations = iterations;
        }
        if let Some(iterations) = self.iterations {
            config.measurement.iterations = iterations;
        }
        if let Some(ms) = self.time_ms {
            let time = Duration::from_millis(ms);
            config.warmup.time = time;
            config.measurement.time = time;
        }
        if let Some(size) = self.stack_size {
            config.continuation.stack_size = size;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> SweepConfig {
        let cli = Cli::try_parse_from(args.iter().copied()).unwrap();
        match cli.command {
            Command::Run(args) | Command::Check(args) => args.into_config(),
        }
    }

    #[test]
    fn test_defaults_follow_protocol() {
        let config = parse(&["stackyield", "run", "yield-and-return"]);
        assert_eq!(config, SweepConfig::defaults(Protocol::YieldAndReturn));

        let config = parse(&["stackyield", "check"]);
        assert_eq!(config.protocol, Protocol::YieldAndStay);
    }

    #[test]
    fn test_overrides() {
        let config = parse(&[
            "stackyield",
            "run",
            "yield-and-stay",
            "--params",
            "1,3",
            "--depths",
            "5,500",
            "--iterations",
            "2",
            "--time-ms",
            "10",
            "--stack-size",
            "65536",
        ]);
        assert_eq!(config.param_counts, vec![1, 3]);
        assert_eq!(config.depths, vec![5, 500]);
        assert_eq!(config.measurement.iterations, 2);
        assert_eq!(config.warmup.iterations, 20);
        assert_eq!(config.measurement.time, Duration::from_millis(10));
        assert_eq!(config.continuation.stack_size, 65536);
    }

    #[test]
    fn test_negative_depth_is_rejected() {
        assert!(Cli::try_parse_from(["stackyield", "run", "--depths", "-5"]).is_err());
    }

    #[test]
    fn test_unknown_protocol_is_rejected() {
        assert!(Cli::try_parse_from(["stackyield", "run", "yield-forever"]).is_err());
    }
}

//! Parameter sweeps and timing settings for each benchmark protocol.

use std::fmt;
use std::time::Duration;

use stackyield_runtime::{ConfigError, ContinuationConfig};
use stackyield_workload::{ParamCount, max_depth_for};

/// Which benchmark protocol to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Protocol {
    /// Fresh continuations per invocation; suspend once at the bottom and return.
    YieldAndReturn,
    /// One continuation per trial, suspending at the bottom forever.
    YieldAndStay,
    /// A fixed call chain, direct and on a continuation stack.
    CallChain,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Protocol::YieldAndReturn => "yield-and-return",
            Protocol::YieldAndStay => "yield-and-stay",
            Protocol::CallChain => "call-chain",
        };
        f.write_str(name)
    }
}

/// A fixed number of iterations, each running for a fixed wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IterationSpec {
    pub iterations: u32,
    pub time: Duration,
}

impl IterationSpec {
    pub const fn new(iterations: u32, time: Duration) -> Self {
        Self { iterations, time }
    }
}

/// One combination of swept parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SweepPoint {
    pub param_count: usize,
    pub depth: u32,
}

impl fmt::Display for SweepPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "params={} depth={}", self.param_count, self.depth)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepConfig {
    pub protocol: Protocol,
    pub param_counts: Vec<usize>,
    pub depths: Vec<u32>,
    pub warmup: IterationSpec,
    pub measurement: IterationSpec,
    pub continuation: ContinuationConfig,
}

impl SweepConfig {
    /// Default sweep for `protocol`.
    pub fn defaults(protocol: Protocol) -> Self {
        let two_seconds = Duration::from_secs(2);
        match protocol {
            Protocol::YieldAndReturn => Self {
                protocol,
                param_counts: vec![3],
                depths: vec![5, 50, 100, 200, 300, 400, 500],
                warmup: IterationSpec::new(5, two_seconds),
                measurement: IterationSpec::new(5, two_seconds),
                continuation: ContinuationConfig::default(),
            },
            Protocol::YieldAndStay => Self {
                protocol,
                param_counts: vec![1, 2, 3],
                depths: vec![5, 10, 20, 100, 200, 500],
                warmup: IterationSpec::new(20, two_seconds),
                measurement: IterationSpec::new(20, two_seconds),
                continuation: ContinuationConfig::default(),
            },
            Protocol::CallChain => Self {
                protocol,
                param_counts: Vec::new(),
                depths: Vec::new(),
                warmup: IterationSpec::new(5, two_seconds),
                measurement: IterationSpec::new(5, two_seconds),
                continuation: ContinuationConfig::default(),
            },
        }
    }

    /// Reject parameter counts, stack sizes and depths no continuation could
    /// use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for &count in &self.param_counts {
            ParamCount::try_from(count)?;
        }
        self.continuation.validate()?;

        let stack_size = self.continuation.stack_size;
        let limit = max_depth_for(stack_size);
        if let Some(&depth) = self.depths.iter().find(|&&d| limit.is_none_or(|max| d > max)) {
            return Err(ConfigError::DepthTooLarge { depth, stack_size });
        }
        Ok(())
    }

    /// Every (param_count, depth) pair, param counts outermost.
    pub fn points(&self) -> impl Iterator<Item = SweepPoint> + '_ {
        self.param_counts.iter().flat_map(move |&param_count| {
            self.depths.iter().map(move |&depth| SweepPoint { param_count, depth })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yield_and_return_defaults() {
        let config = SweepConfig::defaults(Protocol::YieldAndReturn);
        assert_eq!(config.param_counts, vec![3]);
        assert_eq!(config.depths, vec![5, 50, 100, 200, 300, 400, 500]);
        assert_eq!(config.measurement.iterations, 5);
        assert_eq!(config.points().count(), 7);
    }

    #[test]
    fn test_yield_and_stay_points_order() {
        let config = SweepConfig::defaults(Protocol::YieldAndStay);
        let points: Vec<SweepPoint> = config.points().collect();
        assert_eq!(points.len(), 18);
        assert_eq!(
            points[0],
            SweepPoint {
                param_count: 1,
                depth: 5
            }
        );
        assert_eq!(
            points[6],
            SweepPoint {
                param_count: 2,
                depth: 5
            }
        );
        assert_eq!(config.warmup, IterationSpec::new(20, Duration::from_secs(2)));
    }

    #[test]
    fn test_call_chain_has_no_points() {
        let config = SweepConfig::defaults(Protocol::CallChain);
        assert_eq!(config.points().count(), 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_param_count() {
        let mut config = SweepConfig::defaults(Protocol::YieldAndStay);
        config.param_counts.push(4);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ParamCount { count: 4 })
        ));
    }

    #[test]
    fn test_validate_rejects_tiny_stack() {
        let mut config = SweepConfig::defaults(Protocol::YieldAndReturn);
        config.continuation.stack_size = 1024;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::StackTooSmall { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_depth_beyond_stack() {
        let mut config = SweepConfig::defaults(Protocol::YieldAndStay);
        config.depths.push(5000);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DepthTooLarge { depth: 5000, .. })
        ));

        config.continuation.stack_size = 8 * 1024 * 1024;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_protocol_display_matches_cli_names() {
        use clap::ValueEnum;
        for protocol in Protocol::value_variants() {
            let name = protocol.to_possible_value().unwrap();
            assert_eq!(name.get_name(), protocol.to_string());
        }
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn points_cover_the_cross_product(
                param_counts in proptest::collection::vec(1usize..=3, 0..4),
                depths in proptest::collection::vec(0u32..600, 0..8),
            ) {
                let mut config = SweepConfig::defaults(Protocol::YieldAndStay);
                config.param_counts = param_counts.clone();
                config.depths = depths.clone();

                let points: Vec<SweepPoint> = config.points().collect();
                prop_assert_eq!(points.len(), param_counts.len() * depths.len());
                for (i, point) in points.iter().enumerate() {
                    prop_assert_eq!(point.param_count, param_counts[i / depths.len()]);
                    prop_assert_eq!(point.depth, depths[i % depths.len()]);
                }
                prop_assert!(config.validate().is_ok());
            }
        }
    }
}

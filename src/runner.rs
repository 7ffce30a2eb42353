//! Timed sweeps using the average-time runner.

use std::fmt;
use std::hint::black_box;

use stackyield_workload::chain::DEFAULT_INPUT;
use tracing::info;

use crate::error::Result;
use crate::measure::{self, Measurement};
use crate::protocol::{CallChain, YieldAndReturn, YieldAndStay};
use crate::sweep::{Protocol, SweepConfig, SweepPoint};

/// Result of timing one benchmark at one sweep point.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub benchmark: &'static str,
    pub point: Option<SweepPoint>,
    pub measurement: Measurement,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let point = match self.point {
            Some(point) => point.to_string(),
            None => String::from("-"),
        };
        write!(
            f,
            "{:<28} {:<20} {:>14.3} ns/op ({} ops)",
            self.benchmark,
            point,
            self.measurement.ns_per_op(),
            self.measurement.ops
        )
    }
}

fn report(benchmark: &'static str, point: Option<SweepPoint>, measurement: Measurement) -> Report {
    info!(
        benchmark,
        point = ?point,
        ns_per_op = measurement.ns_per_op(),
        "benchmark finished"
    );
    Report {
        benchmark,
        point,
        measurement,
    }
}

/// Time every benchmark of `config.protocol` at every sweep point.
pub fn run_sweep(config: &SweepConfig) -> Result<Vec<Report>> {
    config.validate()?;
    let (warmup, measurement) = (config.warmup, config.measurement);
    let stack = &config.continuation;
    let mut reports = Vec::new();

    match config.protocol {
        Protocol::YieldAndReturn => {
            for point in config.points() {
                let m = measure::per_invocation(
                    warmup,
                    measurement,
                    || YieldAndReturn::setup(point, stack),
                    |pair| Ok(pair.no_yielding()?),
                )?;
                reports.push(report("no_yielding", Some(point), m));

                let m = measure::per_invocation(
                    warmup,
                    measurement,
                    || YieldAndReturn::setup(point, stack),
                    |pair| Ok(pair.yield_at_bottom_and_return()?),
                )?;
                reports.push(report("yield_at_bottom_and_return", Some(point), m));

                let m = measure::per_invocation(
                    warmup,
                    measurement,
                    || YieldAndReturn::setup_suspended(point, stack),
                    |pair| Ok(pair.resume_to_completion()?),
                )?;
                reports.push(report("resume_to_completion", Some(point), m));
            }
        }
        Protocol::YieldAndStay => {
            for point in config.points() {
                let mut stay = YieldAndStay::setup(point, stack)?;
                let m = measure::per_trial(warmup, measurement, &mut stay, |stay| {
                    Ok(stay.yield_at_the_bottom()?)
                })?;
                reports.push(report("yield_at_the_bottom", Some(point), m));
            }
        }
        Protocol::CallChain => {
            let m = measure::per_trial(warmup, measurement, &mut (), |_| {
                black_box(CallChain::empty_continuation(stack)?);
                Ok(())
            })?;
            reports.push(report("empty_continuation", None, m));

            let m = measure::per_trial(warmup, measurement, &mut (), |_| {
                black_box(CallChain::inlined(black_box(DEFAULT_INPUT)));
                Ok(())
            })?;
            reports.push(report("baseline", None, m));

            let m = measure::per_trial(warmup, measurement, &mut (), |_| {
                black_box(CallChain::outlined(black_box(DEFAULT_INPUT)));
                Ok(())
            })?;
            reports.push(report("no_inline", None, m));

            let m = measure::per_trial(warmup, measurement, &mut (), |_| {
                black_box(CallChain::on_continuation(black_box(DEFAULT_INPUT), stack)?);
                Ok(())
            })?;
            reports.push(report("on_continuation", None, m));
        }
    }

    Ok(reports)
}

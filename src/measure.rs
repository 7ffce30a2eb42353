//! Average-time runner.
//!
//! Runs warm-up iterations, then measurement iterations, each for a fixed
//! wall-clock time, and reports the mean time per operation over the
//! measurement iterations. Setup work done per invocation is excluded from
//! the timed section.

use std::hint::black_box;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::Result;
use crate::sweep::IterationSpec;

/// Timings of the measurement iterations of one benchmark.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    /// Operations timed across all measurement iterations.
    pub ops: u64,
    /// Time spent inside timed operations.
    pub timed: Duration,
    /// Mean nanoseconds per operation for each iteration.
    pub per_iteration: Vec<f64>,
}

impl Measurement {
    pub fn ns_per_op(&self) -> f64 {
        if self.ops == 0 {
            return 0.0;
        }
        self.timed.as_nanos() as f64 / self.ops as f64
    }
}

/// Build fresh state with `setup` before every call to `op`; only `op` is
/// timed.
pub fn per_invocation<T, S, F>(
    warmup: IterationSpec,
    measurement: IterationSpec,
    mut setup: S,
    mut op: F,
) -> Result<Measurement>
where
    S: FnMut() -> Result<T>,
    F: FnMut(&mut T) -> Result<()>,
{
    run(warmup, measurement, || {
        let mut state = setup()?;
        let start = Instant::now();
        op(&mut state)?;
        let elapsed = start.elapsed();
        black_box(&state);
        Ok(elapsed)
    })
}

/// Reuse `state` for every call to `op`.
pub fn per_trial<T, F>(
    warmup: IterationSpec,
    measurement: IterationSpec,
    state: &mut T,
    mut op: F,
) -> Result<Measurement>
where
    F: FnMut(&mut T) -> Result<()>,
{
    run(warmup, measurement, || {
        let start = Instant::now();
        op(state)?;
        Ok(start.elapsed())
    })
}

fn run(
    warmup: IterationSpec,
    measurement: IterationSpec,
    mut timed_op: impl FnMut() -> Result<Duration>,
) -> Result<Measurement> {
    for i in 0..warmup.iterations {
        let (ops, timed) = iterate(warmup.time, &mut timed_op)?;
        debug!(iteration = i, ops, ?timed, "warm-up iteration");
    }

    let mut total = Measurement {
        ops: 0,
        timed: Duration::ZERO,
        per_iteration: Vec::with_capacity(measurement.iterations as usize),
    };
    for i in 0..measurement.iterations {
        let (ops, timed) = iterate(measurement.time, &mut timed_op)?;
        debug!(iteration = i, ops, ?timed, "measurement iteration");
        total.ops += ops;
        total.timed += timed;
        total
            .per_iteration
            .push(timed.as_nanos() as f64 / ops.max(1) as f64);
    }
    Ok(total)
}

/// Run `timed_op` until `budget` of wall-clock time has passed, at least
/// once.
fn iterate(
    budget: Duration,
    timed_op: &mut impl FnMut() -> Result<Duration>,
) -> Result<(u64, Duration)> {
    let wall = Instant::now();
    let mut ops = 0u64;
    let mut timed = Duration::ZERO;
    loop {
        timed += timed_op()?;
        ops += 1;
        if wall.elapsed() >= budget {
            return Ok((ops, timed));
        }
    }
}

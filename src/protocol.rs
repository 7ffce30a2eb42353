//! Benchmark protocols.
//!
//! Each protocol owns the continuations a timed operation needs and exposes
//! that operation as a method, so any harness (criterion or the built-in
//! average-time runner) can time exactly the call it is meant to measure.

use stackyield_runtime::{
    ConfigError, Continuation, ContinuationConfig, InvalidStateError, Runnable, State, Suspender,
};
use stackyield_workload::chain::{self, ChainTask};
use stackyield_workload::{Mode, Workload};
use tracing::trace;

use crate::error::{DriverError, Result};
use crate::sweep::SweepPoint;

fn workload_continuation(
    point: SweepPoint,
    mode: Mode,
    config: &ContinuationConfig,
) -> std::result::Result<Continuation, ConfigError> {
    Workload::new(point.param_count, point.depth, mode)?.into_continuation_with(config)
}

// =============================================================================
// Yield and return (setup per invocation)
// =============================================================================

/// A baseline continuation that never suspends and a yielding one that
/// suspends once at the bottom, both freshly built for a single invocation.
#[derive(Debug)]
pub struct YieldAndReturn {
    baseline: Continuation,
    with_yield: Continuation,
}

impl YieldAndReturn {
    /// Build both continuations, neither started.
    pub fn setup(point: SweepPoint, config: &ContinuationConfig) -> Result<Self> {
        let baseline = workload_continuation(point, Mode::BASELINE, config)?;
        let with_yield = workload_continuation(point, Mode::YIELD_ONCE, config)?;
        trace!(%point, "yield-and-return setup");
        Ok(Self {
            baseline,
            with_yield,
        })
    }

    /// Build both continuations and run the yielding one down to its suspend
    /// point, so the next run resumes and unwinds.
    pub fn setup_suspended(point: SweepPoint, config: &ContinuationConfig) -> Result<Self> {
        let mut this = Self::setup(point, config)?;
        this.with_yield.run()?;
        Ok(this)
    }

    /// Full descent and unwind with no suspend.
    pub fn no_yielding(&mut self) -> std::result::Result<(), InvalidStateError> {
        self.baseline.run()
    }

    /// Descend and suspend, then resume and unwind to completion.
    ///
    /// Expects a continuation from [`YieldAndReturn::setup`].
    pub fn yield_at_bottom_and_return(&mut self) -> std::result::Result<(), InvalidStateError> {
        self.with_yield.run()?;
        self.with_yield.run()
    }

    /// Resume from the bottom frame and unwind to completion.
    ///
    /// Expects a continuation from [`YieldAndReturn::setup_suspended`].
    pub fn resume_to_completion(&mut self) -> std::result::Result<(), InvalidStateError> {
        self.with_yield.run()
    }

    pub fn baseline_state(&self) -> State {
        self.baseline.state()
    }

    pub fn yielding_state(&self) -> State {
        self.with_yield.state()
    }
}

// =============================================================================
// Yield and stay (setup per trial)
// =============================================================================

/// An unbounded continuation parked at its bottom frame.
#[derive(Debug)]
pub struct YieldAndStay {
    cont: Continuation,
}

impl YieldAndStay {
    /// Build the continuation and run it down to its first suspend.
    pub fn setup(point: SweepPoint, config: &ContinuationConfig) -> Result<Self> {
        let mut cont = workload_continuation(point, Mode::Unbounded, config)?;
        cont.run()?;
        trace!(%point, "yield-and-stay setup");
        Ok(Self { cont })
    }

    /// One resume → suspend round trip.
    pub fn yield_at_the_bottom(&mut self) -> std::result::Result<(), InvalidStateError> {
        self.cont.run()
    }

    pub fn state(&self) -> State {
        self.cont.state()
    }
}

// =============================================================================
// Call chain
// =============================================================================

pub struct CallChain;

struct EmptyTask;

impl Runnable for EmptyTask {
    fn run(self, _suspender: &Suspender<'_>) -> std::result::Result<(), InvalidStateError> {
        Ok(())
    }
}

impl CallChain {
    pub fn inlined(input: i32) -> i32 {
        chain::inlined::test(input)
    }

    pub fn outlined(input: i32) -> i32 {
        chain::outlined::test(input)
    }

    /// Create and run a continuation whose task does nothing; the cost
    /// [`CallChain::on_continuation`] pays before any chain work.
    pub fn empty_continuation(config: &ContinuationConfig) -> Result<State> {
        let mut cont = Continuation::with_config(
            stackyield_workload::scope(),
            EmptyTask,
            config,
        )?;
        cont.run()?;
        Ok(cont.state())
    }

    /// Run the outlined chain on a fresh continuation's stack.
    pub fn on_continuation(input: i32, config: &ContinuationConfig) -> Result<i32> {
        let task = ChainTask::new(input);
        let output = task.output();
        let mut cont = Continuation::with_config(stackyield_workload::scope(), task, config)?;
        cont.run()?;
        output.get().ok_or(DriverError::Incomplete {
            state: cont.state(),
        })
    }
}

//! Lifecycle check: drive every sweep point through the transitions its
//! protocol relies on, without timing anything.

use stackyield_runtime::{ContinuationConfig, InvalidStateError, State};
use tracing::{debug, info};

use crate::error::{DriverError, Result};
use crate::protocol::{CallChain, YieldAndReturn, YieldAndStay};
use crate::sweep::{Protocol, SweepConfig, SweepPoint};

/// Resumes an unbounded continuation must survive during a check.
pub const STAY_RESUMES: usize = 10_000;

fn expect_state(point: SweepPoint, what: &str, actual: State, expected: State) -> Result<()> {
    if actual == expected {
        return Ok(());
    }
    Err(DriverError::Check {
        subject: point.to_string(),
        reason: format!("{what}: expected {expected:?}, found {actual:?}"),
    })
}

fn check_yield_and_return(point: SweepPoint, config: &ContinuationConfig) -> Result<()> {
    let mut pair = YieldAndReturn::setup_suspended(point, config)?;
    expect_state(point, "yielding after setup", pair.yielding_state(), State::Suspended)?;

    pair.no_yielding()?;
    expect_state(point, "baseline after one run", pair.baseline_state(), State::Completed)?;

    pair.resume_to_completion()?;
    expect_state(point, "yielding after resume", pair.yielding_state(), State::Completed)?;

    match pair.resume_to_completion() {
        Err(InvalidStateError::Completed { .. }) => Ok(()),
        other => Err(DriverError::Check {
            subject: point.to_string(),
            reason: format!("third run of yielding continuation returned {other:?}"),
        }),
    }
}

fn check_yield_and_stay(point: SweepPoint, config: &ContinuationConfig) -> Result<()> {
    let mut stay = YieldAndStay::setup(point, config)?;
    for _ in 0..STAY_RESUMES {
        stay.yield_at_the_bottom()?;
    }
    expect_state(point, "unbounded after resumes", stay.state(), State::Suspended)
}

fn check_call_chain(config: &ContinuationConfig) -> Result<()> {
    let empty = CallChain::empty_continuation(config)?;
    if empty != State::Completed {
        return Err(DriverError::Check {
            subject: Protocol::CallChain.to_string(),
            reason: format!("empty continuation stopped in state {empty:?}"),
        });
    }

    let input = stackyield_workload::chain::DEFAULT_INPUT;
    let expected = CallChain::inlined(input);
    let results = [CallChain::outlined(input), CallChain::on_continuation(input, config)?];
    if results.iter().all(|&r| r == expected) {
        return Ok(());
    }
    Err(DriverError::Check {
        subject: Protocol::CallChain.to_string(),
        reason: format!("call chain flavours disagree: {expected} vs {results:?}"),
    })
}

/// Check every point of `config`; returns how many were checked.
pub fn check_sweep(config: &SweepConfig) -> Result<usize> {
    config.validate()?;
    let mut checked = 0;
    match config.protocol {
        Protocol::YieldAndReturn => {
            for point in config.points() {
                check_yield_and_return(point, &config.continuation)?;
                debug!(%point, "lifecycle ok");
                checked += 1;
            }
        }
        Protocol::YieldAndStay => {
            for point in config.points() {
                check_yield_and_stay(point, &config.continuation)?;
                debug!(%point, "lifecycle ok");
                checked += 1;
            }
        }
        Protocol::CallChain => {
            check_call_chain(&config.continuation)?;
            checked += 1;
        }
    }
    info!(protocol = %config.protocol, checked, "lifecycle check passed");
    Ok(checked)
}

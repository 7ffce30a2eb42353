//! Error handling for the benchmark driver.

use derive_more::{Display, Error, From};
use stackyield_runtime::{ConfigError, InvalidStateError, State};

pub type Result<T> = std::result::Result<T, DriverError>;

/// Errors raised while driving continuations through a protocol.
#[derive(Debug, Display, Error, From)]
pub enum DriverError {
    /// A continuation or workload could not be built.
    #[display("Configuration error: {_0}")]
    Config(#[error(source)] ConfigError),

    /// A continuation was driven through an invalid transition.
    #[display("Invalid continuation state: {_0}")]
    State(#[error(source)] InvalidStateError),

    /// A task stopped before producing its result.
    #[from(ignore)]
    #[display("Continuation stopped in state {state:?} before producing a result")]
    Incomplete { state: State },

    /// A sweep point did not follow the expected lifecycle.
    #[from(ignore)]
    #[display("Lifecycle check failed for {subject}: {reason}")]
    Check { subject: String, reason: String },
}

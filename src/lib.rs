//! Stackyield benchmark driver.
//!
//! Builds continuations from [`stackyield_workload`] workloads and drives
//! them through the two suspend/resume protocols:
//! - [`protocol::YieldAndReturn`]: fresh continuations per invocation that
//!   suspend once at the bottom and then unwind
//! - [`protocol::YieldAndStay`]: one continuation per trial that suspends at
//!   the bottom on every resume
//!
//! [`runner`] times a [`sweep::SweepConfig`] with the built-in average-time
//! runner; the criterion benches under `benches/` time the same protocol
//! operations.

pub mod check;
pub mod error;
pub mod measure;
pub mod protocol;
pub mod runner;
pub mod sweep;

pub use error::{DriverError, Result};
pub use protocol::{CallChain, YieldAndReturn, YieldAndStay};
pub use sweep::{IterationSpec, Protocol, SweepConfig, SweepPoint};

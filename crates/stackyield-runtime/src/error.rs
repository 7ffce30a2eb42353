//! Error types for continuation construction and lifecycle.

use derive_more::{Display, Error};

use crate::ScopeTag;

/// Invalid construction parameters, detected before anything runs.
#[derive(Debug, Display, Error)]
pub enum ConfigError {
    /// Scratch argument count outside `1..=3`.
    #[display("Invalid scratch argument count: {count} (expected 1..=3)")]
    ParamCount { count: usize },

    /// Requested continuation stack is smaller than the supported minimum.
    #[display("Stack size {size} is below the minimum of {min} bytes")]
    StackTooSmall { size: usize, min: usize },

    /// Recursion depth the requested stack cannot hold.
    #[display("Depth {depth} does not fit in a {stack_size}-byte continuation stack")]
    DepthTooLarge { depth: u32, stack_size: usize },

    /// The OS refused to map a stack for the continuation.
    #[display("Failed to allocate a {size}-byte continuation stack: {source}")]
    StackAlloc { size: usize, source: std::io::Error },
}

/// Invalid lifecycle transition. Always a programming error.
#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
pub enum InvalidStateError {
    /// `run()` called on a continuation that already completed.
    #[display("Continuation {scope} has already completed")]
    Completed { scope: ScopeTag },

    /// Suspend requested under a tag the running continuation does not own.
    #[display("Suspend under scope {found} cannot yield continuation of scope {expected}")]
    ScopeMismatch { expected: ScopeTag, found: ScopeTag },
}

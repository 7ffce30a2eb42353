//! Workloads that exercise stackful continuations.
//!
//! - [`Workload`]: recurses to a fixed depth with 1–3 scratch arguments per
//!   frame, then suspends once, never, or forever
//! - [`FrameProbe`] / [`FrameLog`]: observe descents, suspends and unwinds
//! - [`chain`]: a fixed call chain run directly or on a continuation's stack

pub mod chain;
mod probe;
mod scratch;
mod workload;

pub use probe::{FrameEvent, FrameLog, FrameProbe, NoProbe, Tick};
pub use scratch::{MAX_SCRATCH, Scratch, ScratchCells};
pub use workload::{
    FRAME_BYTES, Mode, ParamCount, STACK_RESERVE, Workload, max_depth_for, required_stack, scope,
};

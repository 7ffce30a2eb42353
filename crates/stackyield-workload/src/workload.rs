//! Depth-parameterized workloads.
//!
//! A workload recurses `max_depth` frames and then, depending on its
//! [`Mode`], returns straight away, suspends once, or suspends forever. Every
//! frame carries one to three scratch arguments so the measured suspend cost
//! reflects frames of realistic size.

use std::hint::black_box;
use std::rc::Rc;
use std::sync::LazyLock;

use stackyield_runtime::{
    ConfigError, Continuation, ContinuationConfig, DEFAULT_STACK_SIZE, InvalidStateError,
    Runnable, ScopeTag, Suspender,
};
use tracing::trace;

use crate::probe::{FrameProbe, NoProbe};
use crate::scratch::{Scratch, ScratchCells};

/// Upper bound on the stack one workload frame takes, in any build profile.
pub const FRAME_BYTES: usize = 1024;

/// Stack kept free below the bottom frame for the suspend path itself.
pub const STACK_RESERVE: usize = 8 * 1024;

/// Stack bytes a workload recursing `max_depth` frames needs, or `None` if
/// that does not fit in `usize`.
pub fn required_stack(max_depth: u32) -> Option<usize> {
    let frames = usize::try_from(max_depth).ok()?.checked_add(1)?;
    frames.checked_mul(FRAME_BYTES)?.checked_add(STACK_RESERVE)
}

/// Deepest `max_depth` a stack of `stack_size` bytes can hold.
pub fn max_depth_for(stack_size: usize) -> Option<u32> {
    let frames = stack_size.checked_sub(STACK_RESERVE)? / FRAME_BYTES;
    let depth = frames.checked_sub(1)?;
    Some(u32::try_from(depth).unwrap_or(u32::MAX))
}

static FAMILY_SCOPE: LazyLock<ScopeTag> = LazyLock::new(ScopeTag::new);

/// Scope tag shared by every workload unless rebound with
/// [`Workload::with_scope`].
pub fn scope() -> ScopeTag {
    *FAMILY_SCOPE
}

/// Number of scratch arguments threaded through each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamCount {
    One = 1,
    Two = 2,
    Three = 3,
}

impl ParamCount {
    pub const ALL: [ParamCount; 3] = [ParamCount::One, ParamCount::Two, ParamCount::Three];

    pub fn get(self) -> usize {
        self as usize
    }
}

impl TryFrom<usize> for ParamCount {
    type Error = ConfigError;

    fn try_from(count: usize) -> Result<Self, Self::Error> {
        match count {
            1 => Ok(ParamCount::One),
            2 => Ok(ParamCount::Two),
            3 => Ok(ParamCount::Three),
            _ => Err(ConfigError::ParamCount { count }),
        }
    }
}

/// What a workload does once it reaches the bottom frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Suspend at most once, then unwind every frame and complete.
    Bounded { suspend: bool },
    /// Suspend every time control comes back. Never completes.
    Unbounded,
}

impl Mode {
    /// Descend and unwind without suspending.
    pub const BASELINE: Mode = Mode::Bounded { suspend: false };
    /// Suspend once at the bottom, then complete.
    pub const YIELD_ONCE: Mode = Mode::Bounded { suspend: true };
}

/// A recursive task that suspends from `max_depth` frames down.
pub struct Workload<P = NoProbe> {
    param_count: ParamCount,
    max_depth: u32,
    mode: Mode,
    scope: ScopeTag,
    scratch: Rc<ScratchCells>,
    probe: P,
}

impl Workload {
    /// Build a workload bound to the family [`scope`].
    ///
    /// Fails if `param_count` is not 1, 2 or 3.
    pub fn new(param_count: usize, max_depth: u32, mode: Mode) -> Result<Self, ConfigError> {
        let param_count = ParamCount::try_from(param_count)?;
        trace!(param_count = param_count.get(), max_depth, ?mode, "built workload");
        Ok(Self {
            param_count,
            max_depth,
            mode,
            scope: scope(),
            scratch: Rc::default(),
            probe: NoProbe,
        })
    }
}

impl<P: FrameProbe> Workload<P> {
    /// Suspend under `scope` instead of the family tag.
    pub fn with_scope(mut self, scope: ScopeTag) -> Self {
        self.scope = scope;
        self
    }

    /// Report frame events to `probe`.
    pub fn with_probe<Q: FrameProbe>(self, probe: Q) -> Workload<Q> {
        Workload {
            param_count: self.param_count,
            max_depth: self.max_depth,
            mode: self.mode,
            scope: self.scope,
            scratch: self.scratch,
            probe,
        }
    }

    pub fn param_count(&self) -> ParamCount {
        self.param_count
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn scope(&self) -> ScopeTag {
        self.scope
    }

    /// Handle to the scratch cells this workload's frames carry.
    pub fn scratch(&self) -> Rc<ScratchCells> {
        Rc::clone(&self.scratch)
    }

    /// Wrap this workload in a continuation created under its own scope.
    ///
    /// The stack is the default size, grown when `max_depth` needs more.
    pub fn into_continuation(self) -> Result<Continuation, ConfigError> {
        let required = self.required_stack()?;
        let config = ContinuationConfig {
            stack_size: required.max(DEFAULT_STACK_SIZE),
        };
        Continuation::with_config(self.scope, self, &config)
    }

    /// Like [`Workload::into_continuation`], with explicit stack options.
    ///
    /// Fails with [`ConfigError::DepthTooLarge`] if `config.stack_size`
    /// cannot hold `max_depth` frames.
    pub fn into_continuation_with(
        self,
        config: &ContinuationConfig,
    ) -> Result<Continuation, ConfigError> {
        if self.required_stack()? > config.stack_size {
            return Err(ConfigError::DepthTooLarge {
                depth: self.max_depth,
                stack_size: config.stack_size,
            });
        }
        Continuation::with_config(self.scope, self, config)
    }

    fn required_stack(&self) -> Result<usize, ConfigError> {
        required_stack(self.max_depth).ok_or(ConfigError::DepthTooLarge {
            depth: self.max_depth,
            stack_size: usize::MAX,
        })
    }

    fn enter(&self, suspender: &Suspender<'_>) -> Result<(), InvalidStateError> {
        let [a, b, c] = &self.scratch.cells;
        match self.param_count {
            ParamCount::One => self.descend(self.max_depth, [a], suspender),
            ParamCount::Two => self.descend(self.max_depth, [a, b], suspender),
            ParamCount::Three => self.descend(self.max_depth, [a, b, c], suspender),
        }
    }

    #[inline(never)]
    fn descend<const N: usize>(
        &self,
        depth: u32,
        args: [&Scratch; N],
        suspender: &Suspender<'_>,
    ) -> Result<(), InvalidStateError> {
        self.probe.descend(depth);
        if depth > 0 {
            self.descend(depth - 1, args, suspender)?;
        }
        if depth == 0 {
            self.bottom(suspender)?;
        } else if black_box(depth) > self.max_depth {
            // never taken: no frame sits above max_depth
            for arg in args {
                arg.clobber();
            }
        }
        self.probe.unwind(depth);
        Ok(())
    }

    fn bottom(&self, suspender: &Suspender<'_>) -> Result<(), InvalidStateError> {
        match self.mode {
            Mode::Bounded { suspend: false } => Ok(()),
            Mode::Bounded { suspend: true } => {
                self.probe.suspend();
                suspender.suspend(&self.scope)
            }
            Mode::Unbounded => loop {
                self.probe.suspend();
                suspender.suspend(&self.scope)?;
            },
        }
    }
}

impl<P: FrameProbe> Runnable for Workload<P> {
    fn run(self, suspender: &Suspender<'_>) -> Result<(), InvalidStateError> {
        self.enter(suspender)
    }
}

impl<P> std::fmt::Debug for Workload<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workload")
            .field("param_count", &self.param_count)
            .field("max_depth", &self.max_depth)
            .field("mode", &self.mode)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

//! Stackful continuations.
//!
//! A [`Continuation`] owns a dedicated native stack. The task it wraps runs on
//! that stack and may suspend from any call depth through its [`Suspender`];
//! the intervening frames stay frozen on the continuation's stack until the
//! next [`Continuation::run`] switches back in.

use corosensei::stack::DefaultStack;
use corosensei::{Coroutine, CoroutineResult, Yielder};
use tracing::{debug, trace, warn};

use crate::{ConfigError, InvalidStateError, ScopeTag};

/// Smallest stack a continuation may be created with.
pub const MIN_STACK_SIZE: usize = 16 * 1024;

/// Stack size used by [`Continuation::create`].
pub const DEFAULT_STACK_SIZE: usize = 1024 * 1024;

// =============================================================================
// Tasks
// =============================================================================

/// A unit of work that can run inside a continuation.
pub trait Runnable: 'static {
    /// Run to completion, suspending through `suspender` as often as needed.
    fn run(self, suspender: &Suspender<'_>) -> Result<(), InvalidStateError>;
}

/// Adapter that lets a closure act as a [`Runnable`].
struct FnTask<F>(F);

impl<F> Runnable for FnTask<F>
where
    F: FnOnce(&Suspender<'_>) -> Result<(), InvalidStateError> + 'static,
{
    fn run(self, suspender: &Suspender<'_>) -> Result<(), InvalidStateError> {
        (self.0)(suspender)
    }
}

/// Capability to suspend the continuation a task is running in.
///
/// Only handed to the task itself, and only honored for the scope tag the
/// continuation was created with.
pub struct Suspender<'y> {
    yielder: &'y Yielder<(), ()>,
    scope: ScopeTag,
}

impl Suspender<'_> {
    /// Switch back to the caller of [`Continuation::run`].
    ///
    /// Returns once the continuation is resumed. Fails without switching if
    /// `scope` is not the continuation's own tag.
    pub fn suspend(&self, scope: &ScopeTag) -> Result<(), InvalidStateError> {
        if *scope != self.scope {
            warn!(expected = %self.scope, found = %scope, "suspend under foreign scope");
            return Err(InvalidStateError::ScopeMismatch {
                expected: self.scope,
                found: *scope,
            });
        }
        self.yielder.suspend(());
        Ok(())
    }
}

// =============================================================================
// Continuation
// =============================================================================

/// Lifecycle state of a [`Continuation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Created, never run.
    Fresh,
    /// Stopped at a suspend point, frames preserved.
    Suspended,
    /// Task returned. No further runs are allowed.
    Completed,
}

/// Construction options for a [`Continuation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContinuationConfig {
    /// Bytes reserved for the continuation's stack, excluding the guard page.
    pub stack_size: usize,
}

impl Default for ContinuationConfig {
    fn default() -> Self {
        Self {
            stack_size: DEFAULT_STACK_SIZE,
        }
    }
}

impl ContinuationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stack_size < MIN_STACK_SIZE {
            return Err(ConfigError::StackTooSmall {
                size: self.stack_size,
                min: MIN_STACK_SIZE,
            });
        }
        Ok(())
    }
}

/// A suspendable unit of execution with its own call stack.
///
/// Not `Send`: a continuation is driven by the thread that created it.
pub struct Continuation {
    scope: ScopeTag,
    state: State,
    coroutine: Coroutine<(), (), Result<(), InvalidStateError>>,
}

impl Continuation {
    /// Bind `task` to `scope` on a stack of [`DEFAULT_STACK_SIZE`] bytes.
    pub fn create<R: Runnable>(scope: ScopeTag, task: R) -> Result<Self, ConfigError> {
        Self::with_config(scope, task, &ContinuationConfig::default())
    }

    /// Bind a closure to `scope`.
    pub fn from_fn<F>(scope: ScopeTag, f: F) -> Result<Self, ConfigError>
    where
        F: FnOnce(&Suspender<'_>) -> Result<(), InvalidStateError> + 'static,
    {
        Self::create(scope, FnTask(f))
    }

    /// Bind `task` to `scope` using explicit construction options.
    pub fn with_config<R: Runnable>(
        scope: ScopeTag,
        task: R,
        config: &ContinuationConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let size = config.stack_size;
        let stack =
            DefaultStack::new(size).map_err(|source| ConfigError::StackAlloc { size, source })?;

        let coroutine = Coroutine::with_stack(stack, move |yielder: &Yielder<(), ()>, ()| {
            let suspender = Suspender { yielder, scope };
            task.run(&suspender)
        });

        debug!(scope = %scope, stack_size = size, "created continuation");
        Ok(Self {
            scope,
            state: State::Fresh,
            coroutine,
        })
    }

    /// Start or resume the task.
    ///
    /// Returns when the task suspends (state becomes [`State::Suspended`]) or
    /// returns (state becomes [`State::Completed`]; an error returned by the
    /// task is passed through). Calling this on a completed continuation is
    /// an error.
    pub fn run(&mut self) -> Result<(), InvalidStateError> {
        if self.state == State::Completed {
            return Err(InvalidStateError::Completed { scope: self.scope });
        }

        // stays Completed if the task panics: the coroutine cannot resume again
        self.state = State::Completed;
        match self.coroutine.resume(()) {
            CoroutineResult::Yield(()) => {
                self.state = State::Suspended;
                Ok(())
            }
            CoroutineResult::Return(result) => {
                trace!(scope = %self.scope, ok = result.is_ok(), "continuation completed");
                result
            }
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn scope(&self) -> ScopeTag {
        self.scope
    }

    pub fn is_completed(&self) -> bool {
        self.state == State::Completed
    }
}

impl core::fmt::Debug for Continuation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Continuation")
            .field("scope", &self.scope)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[test]
    fn test_task_without_suspend_completes_in_one_run() {
        let scope = ScopeTag::new();
        let mut cont = Continuation::from_fn(scope, |_| Ok(())).unwrap();
        assert_eq!(cont.state(), State::Fresh);

        cont.run().unwrap();
        assert_eq!(cont.state(), State::Completed);
        assert!(cont.is_completed());
    }

    #[test]
    fn test_run_after_completion_fails() {
        let scope = ScopeTag::new();
        let mut cont = Continuation::from_fn(scope, |_| Ok(())).unwrap();
        cont.run().unwrap();

        let err = cont.run().unwrap_err();
        assert_eq!(err, InvalidStateError::Completed { scope });
        // Still completed, and still failing
        assert_eq!(cont.run().unwrap_err(), err);
    }

    #[test]
    fn test_suspend_then_resume_to_completion() {
        let scope = ScopeTag::new();
        let mut cont = Continuation::from_fn(scope, move |s| s.suspend(&scope)).unwrap();

        cont.run().unwrap();
        assert_eq!(cont.state(), State::Suspended);
        cont.run().unwrap();
        assert_eq!(cont.state(), State::Completed);
        assert!(matches!(
            cont.run(),
            Err(InvalidStateError::Completed { .. })
        ));
    }

    #[test]
    fn test_nested_frames_survive_suspend() {
        // Each frame keeps a local derived from its depth and checks it after
        // the suspend at the bottom has been resumed.
        fn nest(
            depth: u32,
            scope: ScopeTag,
            s: &Suspender<'_>,
            seen: &RefCell<Vec<u32>>,
        ) -> Result<(), InvalidStateError> {
            let local = depth * 7 + 1;
            if depth > 0 {
                nest(depth - 1, scope, s, seen)?;
            } else {
                s.suspend(&scope)?;
            }
            seen.borrow_mut().push(local);
            Ok(())
        }

        let scope = ScopeTag::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        let mut cont = Continuation::from_fn(scope, move |s| nest(4, scope, s, &log)).unwrap();

        cont.run().unwrap();
        assert!(seen.borrow().is_empty());

        cont.run().unwrap();
        assert_eq!(*seen.borrow(), vec![1, 8, 15, 22, 29]);
    }

    #[test]
    fn test_foreign_scope_is_rejected() {
        let own = ScopeTag::new();
        let foreign = ScopeTag::new();
        let mut cont = Continuation::from_fn(own, move |s| s.suspend(&foreign)).unwrap();

        let err = cont.run().unwrap_err();
        assert_eq!(
            err,
            InvalidStateError::ScopeMismatch {
                expected: own,
                found: foreign,
            }
        );
        assert_eq!(cont.state(), State::Completed);
    }

    #[test]
    fn test_stack_below_minimum_is_rejected() {
        let config = ContinuationConfig {
            stack_size: MIN_STACK_SIZE - 1,
        };
        let task = FnTask(|_: &Suspender<'_>| -> Result<(), InvalidStateError> { Ok(()) });
        let err = Continuation::with_config(ScopeTag::new(), task, &config).unwrap_err();
        assert!(matches!(err, ConfigError::StackTooSmall { .. }));
    }

    #[test]
    fn test_minimum_stack_is_usable() {
        let scope = ScopeTag::new();
        let config = ContinuationConfig {
            stack_size: MIN_STACK_SIZE,
        };
        let task = FnTask(move |s: &Suspender<'_>| s.suspend(&scope));
        let mut cont = Continuation::with_config(scope, task, &config).unwrap();
        cont.run().unwrap();
        cont.run().unwrap();
        assert!(cont.is_completed());
    }

    #[test]
    fn test_panicking_task_leaves_continuation_completed() {
        use std::panic::{AssertUnwindSafe, catch_unwind};

        let scope = ScopeTag::new();
        let mut cont = Continuation::from_fn(
            scope,
            |_: &Suspender<'_>| -> Result<(), InvalidStateError> { panic!("task failed") },
        )
        .unwrap();

        assert!(catch_unwind(AssertUnwindSafe(|| cont.run())).is_err());
        assert_eq!(cont.state(), State::Completed);
        assert_eq!(
            cont.run().unwrap_err(),
            InvalidStateError::Completed { scope }
        );
    }

    #[test]
    fn test_dropping_suspended_continuation_unwinds_frames() {
        struct Guard(Rc<Cell<bool>>);
        impl Drop for Guard {
            fn drop(&mut self) {
                self.0.set(true);
            }
        }

        let dropped = Rc::new(Cell::new(false));
        let flag = Rc::clone(&dropped);
        let scope = ScopeTag::new();
        let mut cont = Continuation::from_fn(scope, move |s| {
            let _guard = Guard(flag);
            loop {
                s.suspend(&scope)?;
            }
        })
        .unwrap();

        cont.run().unwrap();
        assert!(!dropped.get());
        drop(cont);
        assert!(dropped.get());
    }

    proptest! {
        /// A task that suspends `n` times needs exactly `n + 1` runs.
        #[test]
        fn suspend_count_matches_run_count(n in 0usize..64) {
            let scope = ScopeTag::new();
            let mut cont = Continuation::from_fn(scope, move |s| {
                for _ in 0..n {
                    s.suspend(&scope)?;
                }
                Ok(())
            })
            .unwrap();

            for _ in 0..n {
                cont.run().unwrap();
                prop_assert_eq!(cont.state(), State::Suspended);
            }
            cont.run().unwrap();
            prop_assert_eq!(cont.state(), State::Completed);
        }
    }
}

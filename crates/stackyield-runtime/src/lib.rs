//! Stackyield runtime library.
//!
//! Provides the stackful continuation primitive the benchmarks exercise:
//! - Scope tags that bind a suspend request to its owning continuation
//! - Continuations running on their own native stack (`create`, `run`)
//! - The `Suspender` capability a task uses to yield from any call depth
//! - Construction and lifecycle error types
//!
//! ```
//! use stackyield_runtime::{Continuation, ScopeTag, State};
//!
//! let scope = ScopeTag::new();
//! let mut cont = Continuation::from_fn(scope, move |s| {
//!     s.suspend(&scope)?;
//!     Ok(())
//! })?;
//!
//! cont.run()?;
//! assert_eq!(cont.state(), State::Suspended);
//! cont.run()?;
//! assert_eq!(cont.state(), State::Completed);
//! assert!(cont.run().is_err());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod continuation;
mod error;
mod scope;

pub use continuation::{
    Continuation, ContinuationConfig, DEFAULT_STACK_SIZE, MIN_STACK_SIZE, Runnable, State,
    Suspender,
};
pub use error::{ConfigError, InvalidStateError};
pub use scope::ScopeTag;

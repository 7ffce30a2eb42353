//! Fixed call-chain workload.
//!
//! A short chain of small functions (`test` → `foo`, `bar`, `baz`, each
//! calling `validate`) used to compare plain calls, calls the optimizer may
//! not inline, and the same calls made on a continuation's stack. Arithmetic
//! wraps on overflow.

use std::cell::Cell;
use std::hint::black_box;
use std::rc::Rc;

use stackyield_runtime::{InvalidStateError, Runnable, Suspender};

/// Input the benchmarks feed the chain.
pub const DEFAULT_INPUT: i32 = 42;

macro_rules! call_chain {
    ($(#[$attr:meta])* mod $name:ident) => {
        pub mod $name {
            $(#[$attr])*
            fn validate_raw(input: i32) -> bool {
                input % 13 != 0
            }

            $(#[$attr])*
            fn validate(input: i32) {
                let b = input == 42;
                if !validate_raw(input) && !b {
                    tracing::warn!(input, b, "call chain validation failed");
                }
            }

            $(#[$attr])*
            pub fn foo() -> i32 {
                validate(14);
                37
            }

            $(#[$attr])*
            pub fn bar(input: i32) -> i32 {
                let mut res = 0i32;
                validate(input);
                for i in 1..=300i32 {
                    res = res.wrapping_add(i.wrapping_mul(foo()));
                }
                foo().wrapping_add(res.wrapping_mul(input))
            }

            $(#[$attr])*
            pub fn baz(input: i32) -> i32 {
                validate(input);
                foo().wrapping_sub(input.wrapping_mul(bar(3)))
            }

            $(#[$attr])*
            pub fn test(_input: i32) -> i32 {
                let r = foo();
                validate(r);
                let l = bar(r.wrapping_add(42));
                validate(l);
                baz(r.wrapping_add(l))
            }
        }
    };
}

call_chain! {
    #[inline]
    mod inlined
}

call_chain! {
    #[inline(never)]
    mod outlined
}

/// Runs the outlined chain on a continuation's stack without suspending.
#[derive(Debug)]
pub struct ChainTask {
    input: i32,
    output: Rc<Cell<Option<i32>>>,
}

impl ChainTask {
    pub fn new(input: i32) -> Self {
        Self {
            input,
            output: Rc::default(),
        }
    }

    /// Slot the task writes its result into when it completes.
    pub fn output(&self) -> Rc<Cell<Option<i32>>> {
        Rc::clone(&self.output)
    }
}

impl Runnable for ChainTask {
    fn run(self, _suspender: &Suspender<'_>) -> Result<(), InvalidStateError> {
        let value = outlined::test(black_box(self.input));
        self.output.set(Some(value));
        Ok(())
    }
}

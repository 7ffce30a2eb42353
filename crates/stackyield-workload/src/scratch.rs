//! Scratch arguments threaded through workload frames.
//!
//! Each frame receives one reference per scratch cell. The cells are only
//! written on a branch no frame ever takes; they exist so every frame carries
//! real argument slots instead of having them optimized away.

use std::cell::Cell;
use std::hint::black_box;

/// Largest number of scratch cells a workload threads per frame.
pub const MAX_SCRATCH: usize = 3;

/// Value written by the dead branch. Anything other than the default shows
/// that branch ran.
const CLOBBERED: i32 = 0x5eed;

/// One scratch argument.
#[derive(Debug, Default)]
pub struct Scratch {
    field: Cell<i32>,
}

impl Scratch {
    pub fn get(&self) -> i32 {
        self.field.get()
    }

    #[inline(never)]
    pub(crate) fn clobber(&self) {
        self.field.set(black_box(CLOBBERED));
    }
}

/// The scratch cells owned by one workload.
#[derive(Debug, Default)]
pub struct ScratchCells {
    pub(crate) cells: [Scratch; MAX_SCRATCH],
}

impl ScratchCells {
    pub fn values(&self) -> [i32; MAX_SCRATCH] {
        [self.cells[0].get(), self.cells[1].get(), self.cells[2].get()]
    }

    /// True when no cell has been written since creation.
    pub fn is_pristine(&self) -> bool {
        self.values() == [0; MAX_SCRATCH]
    }
}

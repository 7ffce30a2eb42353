//! Frame observers for workloads.
//!
//! A [`FrameProbe`] is called on every descent, suspend and unwind. The
//! default [`NoProbe`] has empty hooks and compiles away, so measured
//! workloads pay nothing for the hook points.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Hooks invoked by a workload as it walks its frames.
pub trait FrameProbe: 'static {
    /// Entering the frame at `depth`, before recursing further.
    fn descend(&self, _depth: u32) {}

    /// About to suspend at the bottom frame.
    fn suspend(&self) {}

    /// Leaving the frame at `depth`, after every deeper frame returned.
    fn unwind(&self, _depth: u32) {}
}

/// Probe that observes nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProbe;

impl FrameProbe for NoProbe {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameEvent {
    Descend { depth: u32 },
    Suspend,
    Unwind { depth: u32 },
}

/// A tick of the shared counter together with the event that caused it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub seq: u64,
    pub event: FrameEvent,
}

/// Probe that records every event against a shared counter.
///
/// Clones share the same log, so a test can keep one clone while the other
/// is moved into a continuation.
#[derive(Debug, Clone, Default)]
pub struct FrameLog {
    counter: Rc<Cell<u64>>,
    ticks: Rc<RefCell<Vec<Tick>>>,
}

impl FrameLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, event: FrameEvent) {
        let seq = self.counter.get() + 1;
        self.counter.set(seq);
        self.ticks.borrow_mut().push(Tick { seq, event });
    }

    /// Current value of the shared counter.
    pub fn count(&self) -> u64 {
        self.counter.get()
    }

    pub fn ticks(&self) -> Vec<Tick> {
        self.ticks.borrow().clone()
    }

    pub fn events(&self) -> Vec<FrameEvent> {
        self.ticks.borrow().iter().map(|t| t.event).collect()
    }

    /// Depths of descents, in the order they happened.
    pub fn descents(&self) -> Vec<u32> {
        self.depths(|e| match e {
            FrameEvent::Descend { depth } => Some(depth),
            _ => None,
        })
    }

    /// Depths of unwinds, in the order they happened.
    pub fn unwinds(&self) -> Vec<u32> {
        self.depths(|e| match e {
            FrameEvent::Unwind { depth } => Some(depth),
            _ => None,
        })
    }

    pub fn suspends(&self) -> usize {
        self.ticks
            .borrow()
            .iter()
            .filter(|t| t.event == FrameEvent::Suspend)
            .count()
    }

    fn depths(&self, pick: impl Fn(FrameEvent) -> Option<u32>) -> Vec<u32> {
        self.ticks.borrow().iter().filter_map(|t| pick(t.event)).collect()
    }
}

impl FrameProbe for FrameLog {
    fn descend(&self, depth: u32) {
        self.record(FrameEvent::Descend { depth });
    }

    fn suspend(&self) {
        self.record(FrameEvent::Suspend);
    }

    fn unwind(&self, depth: u32) {
        self.record(FrameEvent::Unwind { depth });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_log() {
        let log = FrameLog::new();
        let other = log.clone();
        other.descend(2);
        other.suspend();
        other.unwind(2);

        assert_eq!(log.count(), 3);
        assert_eq!(log.descents(), vec![2]);
        assert_eq!(log.unwinds(), vec![2]);
        assert_eq!(log.suspends(), 1);
    }

    #[test]
    fn test_ticks_are_sequential() {
        let log = FrameLog::new();
        log.descend(1);
        log.descend(0);
        log.unwind(0);

        let seqs: Vec<u64> = log.ticks().iter().map(|t| t.seq).collect();
        assert_eq!(seqs, vec![1, 2, 3]);
    }
}

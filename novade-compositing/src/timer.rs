//! Named single-shot timers.
//!
//! The compositor never sleeps or reads the wall clock directly. It arms
//! timers by [`TimerId`] through a [`TimerQueue`] and is told when one fires
//! via `Compositor::handle_timer`. At most one instance of each timer is
//! armed; starting an armed timer re-arms it.
//!
//! The runtime backs the queue with calloop timers
//! (`crate::runtime::CalloopTimers`); tests use [`ManualTimers`], a virtual
//! clock that only moves when told to.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimerId {
    /// Next frame.
    Repaint,
    /// Zero-delay unredirect evaluation pass.
    UnredirectCheck,
    /// Retry after an unredirect toggle was debounced.
    UnredirectRetry,
    /// Delayed removal of unclaimed support properties.
    SupportSweep,
    /// Delayed compositor restart.
    Restart,
    /// Next event-loop turn: runs queued suspend/resume/setup actions.
    Deferred,
}

pub trait TimerQueue {
    fn now(&self) -> Instant;
    fn start(&mut self, id: TimerId, after: Duration);
    fn stop(&mut self, id: TimerId);
    fn is_active(&self, id: TimerId) -> bool;
}

#[derive(Debug)]
struct ManualClock {
    origin: Instant,
    elapsed: Duration,
    sequence: u64,
    armed: HashMap<TimerId, (Duration, u64)>,
}

/// Deterministic [`TimerQueue`] on a virtual clock.
///
/// Clones share the same clock, so a test can keep one handle while the
/// compositor owns another.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use novade_compositing::timer::{ManualTimers, TimerId, TimerQueue};
///
/// let mut timers = ManualTimers::new();
/// let handle = timers.clone();
/// timers.start(TimerId::Repaint, Duration::from_millis(16));
/// timers.start(TimerId::Deferred, Duration::ZERO);
///
/// let target = handle.now() + Duration::from_millis(20);
/// assert_eq!(handle.pop_due(target), Some(TimerId::Deferred));
/// assert_eq!(handle.pop_due(target), Some(TimerId::Repaint));
/// assert_eq!(handle.pop_due(target), None);
/// ```
#[derive(Debug, Clone)]
pub struct ManualTimers {
    clock: Rc<RefCell<ManualClock>>,
}

impl Default for ManualTimers {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualTimers {
    pub fn new() -> Self {
        Self {
            clock: Rc::new(RefCell::new(ManualClock {
                origin: Instant::now(),
                elapsed: Duration::ZERO,
                sequence: 0,
                armed: HashMap::new(),
            })),
        }
    }

    /// Time remaining until `id` fires, if armed.
    pub fn remaining(&self, id: TimerId) -> Option<Duration> {
        let clock = self.clock.borrow();
        clock
            .armed
            .get(&id)
            .map(|(deadline, _)| deadline.saturating_sub(clock.elapsed))
    }

    /// Disarms and returns the earliest timer due at or before `target`,
    /// moving the clock to its deadline. Ties fire in arming order.
    pub fn pop_due(&self, target: Instant) -> Option<TimerId> {
        let mut clock = self.clock.borrow_mut();
        let limit = target.saturating_duration_since(clock.origin);
        let (id, deadline) = clock
            .armed
            .iter()
            .filter(|(_, (deadline, _))| *deadline <= limit)
            .min_by_key(|(_, (deadline, seq))| (*deadline, *seq))
            .map(|(id, (deadline, _))| (*id, *deadline))?;
        clock.armed.remove(&id);
        clock.elapsed = clock.elapsed.max(deadline);
        Some(id)
    }

    /// Moves the clock forward without firing anything.
    pub fn advance_to(&self, target: Instant) {
        let mut clock = self.clock.borrow_mut();
        let offset = target.saturating_duration_since(clock.origin);
        clock.elapsed = clock.elapsed.max(offset);
    }
}

impl TimerQueue for ManualTimers {
    fn now(&self) -> Instant {
        let clock = self.clock.borrow();
        clock.origin + clock.elapsed
    }

    fn start(&mut self, id: TimerId, after: Duration) {
        let mut clock = self.clock.borrow_mut();
        clock.sequence += 1;
        let entry = (clock.elapsed + after, clock.sequence);
        clock.armed.insert(id, entry);
    }

    fn stop(&mut self, id: TimerId) {
        self.clock.borrow_mut().armed.remove(&id);
    }

    fn is_active(&self, id: TimerId) -> bool {
        self.clock.borrow().armed.contains_key(&id)
    }
}

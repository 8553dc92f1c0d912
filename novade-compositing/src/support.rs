//! Root-window support properties.
//!
//! Features advertise themselves with properties on the root window. When a
//! feature lets go of one, the property is queued and deleted by a delayed
//! sweep, unless something claims it again first. The sweep never runs while
//! the compositor is starting or finishing: a restart is likely to re-claim
//! the same properties.

use std::time::Duration;

use crate::display::{Atom, DisplayConnection};
use crate::timer::{TimerId, TimerQueue};

pub const SUPPORT_SWEEP_DELAY: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepOutcome {
    /// The compositor was busy; the sweep timer was re-armed.
    Deferred,
    /// This many properties were deleted.
    Swept(usize),
}

#[derive(Debug, Default)]
pub struct SupportPropertyRegistry {
    unused: Vec<Atom>,
}

impl SupportPropertyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A feature (re)claims `atom`; it will not be swept.
    pub fn keep(&mut self, atom: Atom) {
        self.unused.retain(|a| *a != atom);
    }

    /// Queues `atom` for deletion and (re)starts the sweep timer.
    pub fn remove(&mut self, atom: Atom, timers: &mut dyn TimerQueue) {
        if !self.unused.contains(&atom) {
            self.unused.push(atom);
        }
        timers.start(TimerId::SupportSweep, SUPPORT_SWEEP_DELAY);
    }

    pub fn is_pending(&self, atom: Atom) -> bool {
        self.unused.contains(&atom)
    }

    pub fn pending(&self) -> &[Atom] {
        &self.unused
    }

    /// Deletes every queued property, or re-arms the timer while `busy`.
    pub fn sweep(&mut self, busy: bool, display: &mut dyn DisplayConnection, timers: &mut dyn TimerQueue) -> SweepOutcome {
        if busy {
            tracing::debug!(pending = self.unused.len(), "Support property sweep deferred");
            timers.start(TimerId::SupportSweep, SUPPORT_SWEEP_DELAY);
            return SweepOutcome::Deferred;
        }
        let swept = self.unused.len();
        for atom in self.unused.drain(..) {
            display.delete_root_property(atom);
        }
        if swept > 0 {
            tracing::debug!(swept, "Unused support properties deleted");
        }
        SweepOutcome::Swept(swept)
    }
}

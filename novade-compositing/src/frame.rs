//! Repaint pacing.
//!
//! There is no vblank callback to wait on. Instead the scheduler keeps the
//! frame interval and the time the last paint reported as consumed since the
//! previous vblank, and arms the single repaint timer for the remainder.
//! All bookkeeping is in nanoseconds; the timer resolution is milliseconds.

use std::time::Duration;

use crate::scene::PaintTiming;
use crate::timer::{TimerId, TimerQueue};

/// Shortest wait. Zero would spin the event loop.
pub const MIN_WAIT_MS: u64 = 1;
/// Longest wait: a 4 fps floor, whatever the configured interval.
pub const MAX_WAIT_MS: u64 = 250;

const NANOS_PER_MILLI: i64 = 1_000_000;
const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Milliseconds to wait before the next frame.
///
/// If the interval exceeds the time already consumed, waits the remainder,
/// otherwise the floor. The result is always within
/// `MIN_WAIT_MS..=MAX_WAIT_MS`, including for zero or negative inputs.
///
/// # Examples
///
/// ```
/// use novade_compositing::frame::compute_wait_ms;
///
/// assert_eq!(compute_wait_ms(16_666_666, 10_000_000), 6);
/// assert_eq!(compute_wait_ms(16_666_666, 16_500_000), 1);
/// assert_eq!(compute_wait_ms(0, 0), 1);
/// assert_eq!(compute_wait_ms(2_000_000_000, 0), 250);
/// ```
pub fn compute_wait_ms(refresh_interval_ns: i64, consumed_ns: i64) -> u64 {
    let wait = if refresh_interval_ns > consumed_ns {
        let remaining = refresh_interval_ns.saturating_sub(consumed_ns) / NANOS_PER_MILLI;
        (remaining as u64).max(MIN_WAIT_MS)
    } else {
        MIN_WAIT_MS
    };
    wait.min(MAX_WAIT_MS)
}

fn duration_to_nanos(duration: Duration) -> i64 {
    i64::try_from(duration.as_nanos()).unwrap_or(i64::MAX)
}

/// Owns the repaint timer and the frame budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameScheduler {
    fps_interval_ns: i64,
    vblank_interval_ns: i64,
    vblank_time_ns: i64,
    consumed_ns: i64,
}

impl Default for FrameScheduler {
    fn default() -> Self {
        let mut scheduler = Self {
            fps_interval_ns: NANOS_PER_SECOND / 60,
            vblank_interval_ns: NANOS_PER_MILLI,
            vblank_time_ns: 6_000_000,
            consumed_ns: 0,
        };
        scheduler.start_now();
        scheduler
    }
}

impl FrameScheduler {
    /// Reads the frame budget at setup time.
    ///
    /// With a vsync-aligned scene the interval is rounded down to a multiple
    /// of the refresh period (but never below one period). `refresh_rate`
    /// of zero is treated as 60 Hz.
    pub fn configure(&mut self, max_fps_interval: Duration, refresh_rate: u32, syncs_to_vblank: bool, vblank_time: Duration) {
        self.fps_interval_ns = duration_to_nanos(max_fps_interval).max(1);
        self.vblank_time_ns = duration_to_nanos(vblank_time);
        if syncs_to_vblank {
            let rate = if refresh_rate == 0 { 60 } else { i64::from(refresh_rate) };
            self.vblank_interval_ns = NANOS_PER_SECOND / rate;
            self.fps_interval_ns =
                ((self.fps_interval_ns / self.vblank_interval_ns) * self.vblank_interval_ns).max(self.vblank_interval_ns);
        } else {
            self.vblank_interval_ns = NANOS_PER_MILLI;
        }
        self.start_now();
        tracing::debug!(
            fps_interval_ns = self.fps_interval_ns,
            vblank_interval_ns = self.vblank_interval_ns,
            vblank_time_ns = self.vblank_time_ns,
            "Frame budget configured"
        );
    }

    /// Pretends the previous frame consumed everything but the paint estimate,
    /// so the next frame is drawn right away.
    pub fn start_now(&mut self) {
        self.consumed_ns = self.fps_interval_ns - (self.vblank_time_ns + 1);
    }

    pub fn fps_interval(&self) -> Duration {
        Duration::from_nanos(self.fps_interval_ns.max(0) as u64)
    }

    pub fn consumed_ns(&self) -> i64 {
        self.consumed_ns
    }

    pub fn next_wait(&self) -> Duration {
        Duration::from_millis(compute_wait_ms(self.fps_interval_ns, self.consumed_ns))
    }

    /// Arms the repaint timer unless it already is. Returns whether it armed.
    pub fn schedule(&self, timers: &mut dyn TimerQueue) -> bool {
        if timers.is_active(TimerId::Repaint) {
            return false;
        }
        let wait = self.next_wait();
        tracing::trace!(wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX), "Repaint scheduled");
        timers.start(TimerId::Repaint, wait);
        true
    }

    /// Nothing left to draw: reset the budget and stop the timer.
    pub fn mark_idle(&mut self, timers: &mut dyn TimerQueue) {
        self.start_now();
        timers.stop(TimerId::Repaint);
    }

    pub fn record_paint(&mut self, timing: PaintTiming) {
        self.consumed_ns = duration_to_nanos(timing.since_last_vblank);
    }
}

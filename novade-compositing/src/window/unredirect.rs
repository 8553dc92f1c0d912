//! Letting eligible windows bypass compositing.
//!
//! Toggling redirection is expensive and visible, so all toggles share one
//! global debounce: after any window toggles, no other toggle is acted on for
//! [`UNREDIRECT_DEBOUNCE`]. A debounced request is not dropped; the caller
//! arms a retry and the next evaluation pass picks it up.

use std::time::{Duration, Instant};

use super::{StackingView, Toplevel};
use crate::display::DisplayConnection;
use crate::scene::Scene;

pub const UNREDIRECT_DEBOUNCE: Duration = Duration::from_millis(100);

/// Result of one window's evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnredirectChange {
    Unchanged,
    Unredirected,
    Redirected,
    /// The window wants to toggle but the debounce interval has not passed.
    Debounced,
}

impl UnredirectChange {
    pub fn toggled(self) -> bool {
        matches!(self, UnredirectChange::Unredirected | UnredirectChange::Redirected)
    }
}

/// Global inputs to eligibility beyond the window's own policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnredirectContext {
    pub option_enabled: bool,
    pub fullscreen_effect_active: bool,
}

/// Whether `window` should currently render directly to the screen.
pub fn is_eligible(window: &Toplevel, view: &StackingView<'_>, context: UnredirectContext) -> bool {
    context.option_enabled
        && !context.fullscreen_effect_active
        && !window.unredirect_suspended()
        && !window.is_shaped()
        && !window.has_alpha()
        && window.opacity() >= 1.0
        && window.should_unredirect(view)
}

#[derive(Debug, Default)]
pub struct UnredirectOptimizer {
    last_toggle: Option<Instant>,
    force: bool,
    option_changed: bool,
}

impl UnredirectOptimizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invalidates every window's cached eligibility at the next pass.
    pub fn force_recheck(&mut self) {
        self.force = true;
    }

    pub fn is_forced(&self) -> bool {
        self.force
    }

    /// The option itself flipped; the next pass runs even if it is now off.
    pub fn note_option_changed(&mut self) {
        self.option_changed = true;
        self.force = true;
    }

    pub fn option_changed(&self) -> bool {
        self.option_changed
    }

    /// Ends a pass. Returns whether the pass must be treated as changed.
    ///
    /// An option change stays pending while any window was debounced, so the
    /// retry pass still runs after the option was switched off.
    pub(crate) fn finish_pass(&mut self, toggled: bool, debounced: bool) -> bool {
        let changed = toggled || self.force;
        if changed {
            self.force = false;
        }
        if !debounced {
            self.option_changed = false;
        }
        changed
    }

    /// Compositing stopped; nothing is unredirected any more.
    pub fn reset(&mut self) {
        self.force = false;
        self.option_changed = false;
    }

    /// Applies `should` to `window`, honouring the global debounce.
    pub fn update_window(
        &mut self,
        window: &mut Toplevel,
        should: bool,
        now: Instant,
        display: &mut dyn DisplayConnection,
        scene: &mut dyn Scene,
    ) -> UnredirectChange {
        if should == window.unredirected {
            return UnredirectChange::Unchanged;
        }
        if let Some(last) = self.last_toggle {
            if now.saturating_duration_since(last) < UNREDIRECT_DEBOUNCE {
                tracing::trace!(window = window.id().0, should, "Unredirect toggle debounced");
                return UnredirectChange::Debounced;
            }
        }
        self.last_toggle = Some(now);
        window.unredirected = should;
        if should {
            tracing::debug!(window = window.id().0, "Unredirecting window");
            display.unredirect_window(window.id());
            scene.pixmap_discarded(window.id());
            UnredirectChange::Unredirected
        } else {
            tracing::debug!(window = window.id().0, "Redirecting window");
            display.redirect_window(window.id());
            window.discard_window_pixmap(scene);
            UnredirectChange::Redirected
        }
    }
}

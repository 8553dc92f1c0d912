//! The compositor state machine.
//!
//! [`Compositor`] owns the scene, the global repaint region, the suspend
//! reasons and every tracked window. It is driven entirely from one event
//! loop: window-management calls, display events ([`Compositor::handle_display_event`])
//! and timer expiries ([`Compositor::handle_timer`]). No call blocks, and no
//! failure leaves it half-initialised; every path ends in `Inactive` or
//! `Active`.

use std::collections::VecDeque;
use std::time::Duration;

use novade_core::config::CompositingConfig;
use novade_core::types::{Rect, Region};

use crate::capability;
use crate::display::{Atom, DisplayConnection, DisplayEvent, WindowId};
use crate::error::{CompositingError, Result};
use crate::frame::FrameScheduler;
use crate::scene::{Scene, SceneFactory};
use crate::support::{SupportPropertyRegistry, SweepOutcome};
use crate::suspend::SuspendReason;
use crate::timer::{TimerId, TimerQueue};
use crate::window::unredirect::{is_eligible, UnredirectChange, UnredirectContext};
use crate::window::{ClientState, StackingView, Toplevel, UnredirectOptimizer, WindowStack, UNREDIRECT_DEBOUNCE};

/// Prefix of the per-screen compositing-manager selection.
pub const SELECTION_PREFIX: &str = "_NET_WM_CM_S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositorState {
    /// No scene. Never started, suspended, or cleanly finished.
    Inactive,
    Starting,
    Active,
    Finishing,
}

/// Notifications for the window-management layer, drained with
/// [`Compositor::take_events`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompositorEvent {
    CompositingToggled(bool),
    /// Compositing was suspended remotely; tell the user how to get it back.
    SuspendedNotice { message: String },
}

/// Work that must not run inside the current call chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeferredAction {
    Suspend(SuspendReason),
    Resume(SuspendReason),
    Setup,
}

pub struct Compositor<D: DisplayConnection> {
    display: D,
    scene_factory: Box<dyn SceneFactory>,
    timers: Box<dyn TimerQueue>,
    config: CompositingConfig,
    state: CompositorState,
    scene: Option<Box<dyn Scene>>,
    suspended: SuspendReason,
    repaints: Region,
    frame: FrameScheduler,
    windows: WindowStack,
    unredirect: UnredirectOptimizer,
    support: SupportPropertyRegistry,
    deferred: VecDeque<DeferredAction>,
    events: Vec<CompositorEvent>,
    selection: Option<String>,
}

impl<D: DisplayConnection> Compositor<D> {
    /// Creates an inactive compositor. Call [`Compositor::setup`] to start it.
    ///
    /// With `enabled = false` it starts out suspended on behalf of the user.
    pub fn new(
        display: D,
        scene_factory: Box<dyn SceneFactory>,
        timers: Box<dyn TimerQueue>,
        config: CompositingConfig,
    ) -> Self {
        let suspended = if config.enabled {
            SuspendReason::empty()
        } else {
            SuspendReason::USER_REQUESTED
        };
        Self {
            display,
            scene_factory,
            timers,
            config,
            state: CompositorState::Inactive,
            scene: None,
            suspended,
            repaints: Region::new(),
            frame: FrameScheduler::default(),
            windows: WindowStack::new(),
            unredirect: UnredirectOptimizer::new(),
            support: SupportPropertyRegistry::new(),
            deferred: VecDeque::new(),
            events: Vec::new(),
            selection: None,
        }
    }

    // --- Lifecycle -------------------------------------------------------

    /// Starts compositing if nothing prevents it.
    ///
    /// Does nothing while a scene exists, while any suspend reason is held or
    /// when the display cannot composite. A failure after the selection was
    /// claimed is logged and rolled back to `Inactive`.
    pub fn setup(&mut self) {
        if self.scene.is_some() {
            return;
        }
        if !self.suspended.is_empty() {
            tracing::debug!(reasons = ?self.suspended, "Compositing is suspended, not starting");
            self.state = CompositorState::Inactive;
            return;
        }
        if let Err(missing) = capability::probe(&self.display) {
            tracing::warn!(reason = %missing, "Compositing is not possible");
            self.state = CompositorState::Inactive;
            return;
        }

        self.state = CompositorState::Starting;
        if let Err(err) = self.try_setup() {
            tracing::error!(error = %err, "Compositing setup failed, staying uncomposited");
            self.scene = None;
            self.release_selection();
            self.state = CompositorState::Inactive;
            return;
        }

        let refresh_rate = if self.config.refresh_rate > 0 {
            self.config.refresh_rate
        } else {
            self.display.refresh_rate().unwrap_or(60)
        };
        let syncs_to_vblank = self.scene.as_ref().map_or(false, |scene| scene.syncs_to_vblank());
        self.frame.configure(
            self.config.max_fps_interval(),
            refresh_rate,
            syncs_to_vblank,
            self.config.vblank_time(),
        );
        self.schedule_repaint();
        self.add_repaint_full();

        if let Some(scene) = self.scene.as_deref_mut() {
            for window in self.windows.iter_mut() {
                window.setup_compositing(&mut self.display, scene);
            }
        }
        self.check_unredirect(true);

        self.state = CompositorState::Active;
        tracing::info!(
            backend = self.compositing_type(),
            windows = self.windows.len(),
            "Compositing enabled"
        );
        self.events.push(CompositorEvent::CompositingToggled(true));
        self.perform_compositing();
    }

    fn try_setup(&mut self) -> Result<()> {
        let selection = format!("{}{}", SELECTION_PREFIX, self.display.screen_number());
        self.display
            .claim_selection(&selection)
            .map_err(|source| CompositingError::SelectionClaim {
                selection: selection.clone(),
                source,
            })?;
        self.selection = Some(selection);

        self.discard_placeholders();

        let scene = self.scene_factory.create(self.config.backend, &self.display)?;
        self.scene = Some(scene);
        self.display.redirect_subwindows()?;
        Ok(())
    }

    /// Stops compositing and releases everything `setup` acquired.
    pub fn finish(&mut self) {
        let Some(mut scene) = self.scene.take() else {
            return;
        };
        self.state = CompositorState::Finishing;
        tracing::info!("Compositing disabled");

        for window in self.windows.iter() {
            if window.is_deleted() {
                scene.window_deleted(window.id());
            } else {
                scene.window_closed(window.id(), false);
            }
        }
        for window in self.windows.iter_mut() {
            window.finish_compositing(&mut self.display, scene.as_mut());
        }
        self.display.unredirect_subwindows();
        drop(scene);

        self.timers.stop(TimerId::Repaint);
        self.timers.stop(TimerId::UnredirectCheck);
        self.timers.stop(TimerId::UnredirectRetry);
        self.repaints.clear();
        self.unredirect.reset();

        // Keep translucent windows translucent once nothing composites them.
        for window in self.windows.iter() {
            if window.is_client() && window.opacity() < 1.0 {
                self.display.set_window_opacity(window.id(), window.opacity());
            }
        }

        self.discard_placeholders();
        self.state = CompositorState::Inactive;
        self.events.push(CompositorEvent::CompositingToggled(false));
        self.release_selection();
    }

    fn release_selection(&mut self) {
        if let Some(selection) = self.selection.take() {
            self.display.release_selection(&selection);
        }
    }

    /// Adds `reason` and stops compositing right away.
    pub fn suspend(&mut self, reason: SuspendReason) {
        tracing::info!(reason = ?reason, "Suspending compositing");
        self.suspended |= reason;
        self.finish();
    }

    /// Drops `reason`; compositing restarts once no reason is left.
    pub fn resume(&mut self, reason: SuspendReason) {
        tracing::info!(reason = ?reason, remaining = ?(self.suspended - reason), "Resuming compositing");
        self.suspended.remove(reason);
        self.setup();
    }

    /// Keyboard-shortcut toggle: resume everything, or suspend for the user.
    pub fn toggle_compositing(&mut self) {
        if !self.suspended.is_empty() {
            self.resume(SuspendReason::ALL);
        } else {
            self.suspend(SuspendReason::USER_REQUESTED);
        }
    }

    /// Toggle requested by another application.
    ///
    /// When compositing ends up suspended and a shortcut is configured, a
    /// [`CompositorEvent::SuspendedNotice`] tells the user how to undo it.
    pub fn toggle_compositing_remote(&mut self) {
        self.toggle_compositing();
        if self.suspended.is_empty() {
            return;
        }
        if let Some(shortcut) = self.config.suspend_shortcut.as_deref() {
            let message = format!(
                "Compositing has been suspended by another application. You can resume using the '{shortcut}' shortcut."
            );
            self.events.push(CompositorEvent::SuspendedNotice { message });
        }
    }

    /// Script-driven switch.
    pub fn set_compositing(&mut self, active: bool) {
        if active {
            self.resume(SuspendReason::SCRIPT_REQUESTED);
        } else {
            self.suspend(SuspendReason::SCRIPT_REQUESTED);
        }
    }

    /// Applies new settings.
    ///
    /// Starts compositing if nothing holds it suspended, otherwise makes sure
    /// it is stopped. Settings read only at setup time take effect on the
    /// next restart.
    pub fn reconfigure(&mut self, config: CompositingConfig) {
        let unredirect_changed = config.unredirect_fullscreen != self.config.unredirect_fullscreen;
        self.config = config;
        if unredirect_changed {
            self.unredirect.note_option_changed();
        }
        if self.suspended.is_empty() {
            self.setup();
            self.add_repaint_full();
            if unredirect_changed {
                self.check_unredirect(true);
            }
        } else {
            self.finish();
        }
    }

    /// Restarts from scratch with `config`, forgetting every suspend reason.
    pub fn reinitialize(&mut self, config: CompositingConfig) {
        self.finish();
        self.suspended = if config.enabled {
            SuspendReason::empty()
        } else {
            SuspendReason::USER_REQUESTED
        };
        self.config = config;
        self.setup();
    }

    /// Finishes now and sets up again on the next event-loop turn.
    /// Until then the state is `Starting` without a scene.
    pub fn restart(&mut self) {
        if self.scene.is_none() {
            return;
        }
        tracing::info!("Restarting compositing");
        self.finish();
        // Stays `Starting` until the deferred setup has run.
        self.state = CompositorState::Starting;
        self.queue_deferred(DeferredAction::Setup);
    }

    /// Arms a restart after `delay`.
    pub fn schedule_restart(&mut self, delay: Duration) {
        self.timers.start(TimerId::Restart, delay);
    }

    /// Runs `finish()` and a final support-property sweep.
    pub fn shutdown(&mut self) {
        self.finish();
        self.timers.stop(TimerId::SupportSweep);
        self.support.sweep(false, &mut self.display, self.timers.as_mut());
    }

    fn queue_deferred(&mut self, action: DeferredAction) {
        self.deferred.push_back(action);
        if !self.timers.is_active(TimerId::Deferred) {
            self.timers.start(TimerId::Deferred, Duration::ZERO);
        }
    }

    fn run_deferred(&mut self) {
        while let Some(action) = self.deferred.pop_front() {
            match action {
                DeferredAction::Suspend(reason) => self.suspend(reason),
                DeferredAction::Resume(reason) => self.resume(reason),
                DeferredAction::Setup => self.setup(),
            }
        }
    }

    /// Re-evaluates rule-based blocking.
    ///
    /// With a window, suspends (on the next turn) if it blocks compositing.
    /// Without one, resumes (on the next turn) once no client blocks any more.
    pub fn update_composite_blocking(&mut self, window: Option<WindowId>) {
        match window {
            Some(id) => {
                let blocks = self
                    .windows
                    .get(id)
                    .and_then(Toplevel::client_state)
                    .map_or(false, |state| state.blocks_compositing);
                if blocks && !self.suspended.contains(SuspendReason::RULE_BLOCKED) {
                    tracing::debug!(window = id.0, "Window blocks compositing");
                    self.queue_deferred(DeferredAction::Suspend(SuspendReason::RULE_BLOCKED));
                }
            }
            None => {
                if !self.suspended.contains(SuspendReason::RULE_BLOCKED) {
                    return;
                }
                let still_blocked = self
                    .windows
                    .iter()
                    .filter_map(Toplevel::client_state)
                    .any(|state| state.blocks_compositing);
                if !still_blocked {
                    self.queue_deferred(DeferredAction::Resume(SuspendReason::RULE_BLOCKED));
                }
            }
        }
    }

    // --- Frames ----------------------------------------------------------

    /// One frame: fetch damage, paint, reschedule.
    pub fn perform_compositing(&mut self) {
        let Some(scene) = self.scene.as_deref_mut() else {
            return;
        };
        if !scene.overlay().is_visible() {
            return;
        }

        let mut order: Vec<WindowId> = self.windows.order().to_vec();
        // Issue every request before collecting any reply.
        let mut damaged = Vec::new();
        for id in &order {
            if let Some(window) = self.windows.get_mut(*id) {
                if window.reset_and_fetch_damage(&mut self.display) {
                    damaged.push(*id);
                }
            }
        }
        if !damaged.is_empty() {
            self.display.flush();
        }

        for id in scene.elevated_windows() {
            if order.contains(&id) {
                order.retain(|w| *w != id);
                order.push(id);
            }
        }

        for id in &damaged {
            if let Some(window) = self.windows.get_mut(*id) {
                window.collect_damage_reply(&mut self.display);
            }
        }

        let windows_pending = self.windows.iter().any(Toplevel::has_pending_repaints);
        if self.repaints.is_empty() && !windows_pending {
            scene.idle();
            self.frame.mark_idle(self.timers.as_mut());
            return;
        }

        let paint_list: Vec<_> = order
            .iter()
            .filter_map(|id| self.windows.get(*id))
            .filter(|window| window.is_ready_for_painting())
            .map(Toplevel::paint_info)
            .collect();
        let damage = std::mem::take(&mut self.repaints);
        tracing::trace!(windows = paint_list.len(), damage_area = damage.area(), "Painting frame");
        let timing = scene.paint(&damage, &paint_list);
        self.frame.record_paint(timing);

        for id in &order {
            if let Some(window) = self.windows.get_mut(*id) {
                window.reset_repaints();
                if window.is_ready_for_painting() {
                    window.reset_damage();
                }
            }
        }

        self.timers.stop(TimerId::Repaint);
        // Rescheduled even when nothing is pending so the idle call happens once.
        self.schedule_repaint();
    }

    /// Arms the repaint timer if it is not armed yet.
    pub fn schedule_repaint(&mut self) {
        if self.scene.is_none() {
            return;
        }
        self.frame.schedule(self.timers.as_mut());
    }

    /// `region` is in screen coordinates.
    pub fn add_repaint(&mut self, region: &Region) {
        if self.scene.is_none() {
            return;
        }
        self.repaints.add_region(region);
        self.schedule_repaint();
    }

    pub fn add_repaint_full(&mut self) {
        if self.scene.is_none() {
            return;
        }
        self.repaints = Region::from_rect(self.display.screen_layout().full);
        self.schedule_repaint();
    }

    // --- Windows ---------------------------------------------------------

    /// Starts managing `window`, on top of the stack.
    pub fn add_window(&mut self, mut window: Toplevel) {
        let id = window.id();
        if self.windows.contains(id) {
            tracing::warn!(window = id.0, "Window is already tracked");
            return;
        }
        if let Some(scene) = self.scene.as_deref_mut() {
            window.setup_compositing(&mut self.display, scene);
        }
        let blocks = window.client_state().map_or(false, |state| state.blocks_compositing);
        self.windows.insert(window);
        tracing::debug!(window = id.0, "Window added");
        self.check_unredirect(true);
        self.schedule_repaint();
        if blocks {
            self.update_composite_blocking(Some(id));
        }
    }

    /// Stops managing `id`. With `keep_placeholder` the window stays in the
    /// stack as a deleted placeholder until [`Compositor::discard_placeholder`].
    pub fn remove_window(&mut self, id: WindowId, keep_placeholder: bool) -> bool {
        let Some(window) = self.windows.get_mut(id) else {
            return false;
        };
        if window.is_deleted() {
            return false;
        }
        let was_blocking = window.client_state().map_or(false, |state| state.blocks_compositing);
        let geometry = window.geometry();
        let placeholder = keep_placeholder && self.scene.is_some();
        if let Some(scene) = self.scene.as_deref_mut() {
            scene.window_closed(id, placeholder);
            window.finish_compositing(&mut self.display, scene);
        }
        if placeholder {
            window.become_placeholder();
        } else {
            self.windows.remove(id);
        }
        tracing::debug!(window = id.0, placeholder, "Window removed");

        self.add_repaint(&Region::from_rect(geometry));
        self.check_unredirect(true);
        if was_blocking {
            self.update_composite_blocking(None);
        }
        true
    }

    /// Drops a placeholder once its effects are done.
    pub fn discard_placeholder(&mut self, id: WindowId) -> bool {
        if !self.windows.get(id).map_or(false, Toplevel::is_deleted) {
            return false;
        }
        let Some(window) = self.windows.remove(id) else {
            return false;
        };
        if let Some(scene) = self.scene.as_deref_mut() {
            scene.window_deleted(id);
        }
        self.add_repaint(&Region::from_rect(window.geometry()));
        true
    }

    fn discard_placeholders(&mut self) {
        for id in self.windows.placeholders() {
            self.windows.remove(id);
        }
    }

    /// Moves or resizes a window. Both old and new extents are repainted; a
    /// size change also drops the cached contents.
    pub fn set_window_geometry(&mut self, id: WindowId, geometry: Rect) {
        let Some(window) = self.windows.get_mut(id) else {
            return;
        };
        let old = window.geometry();
        if old == geometry {
            return;
        }
        window.set_geometry(geometry);
        if old.size != geometry.size {
            if let Some(scene) = self.scene.as_deref_mut() {
                window.discard_window_pixmap(scene);
            }
        }
        self.add_repaint(&Region::from_rects([old, geometry]));
        self.check_unredirect(true);
    }

    /// Replaces the stacking order, bottom to top.
    pub fn set_stacking_order(&mut self, order: &[WindowId]) {
        self.windows.restack(order);
        self.add_repaint_full();
        self.check_unredirect(true);
    }

    pub fn raise_window(&mut self, id: WindowId) {
        if self.windows.raise(id) {
            self.add_repaint_full();
            self.check_unredirect(true);
        }
    }

    pub fn set_window_opacity(&mut self, id: WindowId, opacity: f64) {
        let Some(window) = self.windows.get_mut(id) else {
            return;
        };
        window.set_opacity(opacity);
        window.add_repaint_full();
        self.schedule_repaint();
        self.check_unredirect(false);
    }

    /// Updates a managed client's active/fullscreen/blocking state.
    pub fn set_client_state(&mut self, id: WindowId, state: ClientState) -> bool {
        let Some(window) = self.windows.get_mut(id) else {
            return false;
        };
        let was_blocking = window.client_state().map_or(false, |s| s.blocks_compositing);
        if !window.set_client_state(state) {
            return false;
        }
        self.check_unredirect(false);
        if state.blocks_compositing && !was_blocking {
            self.update_composite_blocking(Some(id));
        } else if was_blocking && !state.blocks_compositing {
            self.update_composite_blocking(None);
        }
        true
    }

    pub fn set_window_shaped(&mut self, id: WindowId, shaped: bool) {
        if let Some(window) = self.windows.get_mut(id) {
            window.set_shaped(shaped);
            self.check_unredirect(false);
        }
    }

    /// Temporarily keeps `id` redirected regardless of eligibility.
    pub fn suspend_unredirect(&mut self, id: WindowId, suspend: bool) {
        if let Some(window) = self.windows.get_mut(id) {
            window.set_unredirect_suspended(suspend);
            self.check_unredirect(false);
        }
    }

    /// `region` is window-local.
    pub fn add_window_repaint(&mut self, id: WindowId, region: &Region) {
        if let Some(window) = self.windows.get_mut(id) {
            window.add_repaint(region);
            self.schedule_repaint();
        }
    }

    pub fn add_window_repaint_full(&mut self, id: WindowId) {
        if let Some(window) = self.windows.get_mut(id) {
            window.add_repaint_full();
            self.schedule_repaint();
        }
    }

    /// `region` is in screen coordinates.
    pub fn add_window_layer_repaint(&mut self, id: WindowId, region: &Region) {
        if let Some(window) = self.windows.get_mut(id) {
            window.add_layer_repaint(region);
            self.schedule_repaint();
        }
    }

    /// Whether any tracked window, placeholders included, waits for a repaint.
    pub fn window_repaints_pending(&self) -> bool {
        self.windows.iter().any(Toplevel::has_pending_repaints)
    }

    // --- Events and timers -----------------------------------------------

    pub fn handle_display_event(&mut self, event: DisplayEvent) {
        match event {
            DisplayEvent::DamageNotify { window } => match self.windows.get_mut(window) {
                Some(toplevel) => {
                    if toplevel.damage_notify() {
                        self.schedule_repaint();
                    }
                }
                None => tracing::trace!(window = window.0, "Damage for unknown window ignored"),
            },
            DisplayEvent::SelectionCleared => {
                if self.selection.take().is_some() {
                    tracing::info!("Another compositing manager took over the selection");
                    self.finish();
                }
            }
        }
    }

    /// Handles every queued display event. Returns how many there were.
    pub fn dispatch_display_events(&mut self) -> usize {
        let mut handled = 0;
        while let Some(event) = self.display.poll_event() {
            self.handle_display_event(event);
            handled += 1;
        }
        handled
    }

    pub fn handle_timer(&mut self, id: TimerId) {
        match id {
            TimerId::Repaint => self.perform_compositing(),
            TimerId::UnredirectCheck => self.delayed_check_unredirect(),
            TimerId::UnredirectRetry => self.check_unredirect(false),
            TimerId::SupportSweep => {
                let busy = matches!(self.state, CompositorState::Starting | CompositorState::Finishing);
                if let SweepOutcome::Swept(count) = self.support.sweep(busy, &mut self.display, self.timers.as_mut()) {
                    tracing::trace!(count, "Support property sweep done");
                }
            }
            TimerId::Restart => self.restart(),
            TimerId::Deferred => self.run_deferred(),
        }
    }

    // --- Unredirection ---------------------------------------------------

    /// Schedules an unredirect evaluation pass on the next loop turn.
    /// `force` makes the pass count as changed even if no window toggles.
    pub fn check_unredirect(&mut self, force: bool) {
        let Some(scene) = self.scene.as_deref() else {
            return;
        };
        if scene.overlay().window().is_none() {
            return;
        }
        if !self.config.unredirect_fullscreen && !self.unredirect.option_changed() {
            return;
        }
        if force {
            self.unredirect.force_recheck();
        }
        if !self.timers.is_active(TimerId::UnredirectCheck) {
            self.timers.start(TimerId::UnredirectCheck, Duration::ZERO);
        }
    }

    fn delayed_check_unredirect(&mut self) {
        let Some(scene) = self.scene.as_deref_mut() else {
            return;
        };
        if scene.overlay().window().is_none() {
            return;
        }
        if !self.config.unredirect_fullscreen && !self.unredirect.option_changed() {
            return;
        }

        let layout = self.display.screen_layout();
        let context = UnredirectContext {
            option_enabled: self.config.unredirect_fullscreen,
            fullscreen_effect_active: scene.has_active_fullscreen_effect(),
        };
        let decisions: Vec<(WindowId, bool)> = {
            let view = StackingView::new(&self.windows, &layout);
            self.windows
                .iter()
                .filter(|window| !window.is_deleted())
                .map(|window| (window.id(), is_eligible(window, &view, context)))
                .collect()
        };

        let now = self.timers.now();
        let mut toggled = false;
        let mut debounced = false;
        for (id, should) in decisions {
            let Some(window) = self.windows.get_mut(id) else {
                continue;
            };
            match self.unredirect.update_window(window, should, now, &mut self.display, scene) {
                UnredirectChange::Debounced => debounced = true,
                change if change.toggled() => toggled = true,
                _ => {}
            }
        }
        if debounced && !self.timers.is_active(TimerId::UnredirectRetry) {
            self.timers.start(TimerId::UnredirectRetry, UNREDIRECT_DEBOUNCE);
        }
        if !self.unredirect.finish_pass(toggled, debounced) {
            return;
        }

        let mut shape = Region::from_rect(layout.full);
        for geometry in self.windows.unredirected_geometries() {
            shape.subtract_rect(&geometry);
        }
        scene.overlay_mut().set_shape(&shape);
        self.add_repaint_full();
    }

    /// Enables or disables unredirection of full-screen windows at runtime.
    pub fn set_unredirect_fullscreen(&mut self, enabled: bool) {
        if self.config.unredirect_fullscreen == enabled {
            return;
        }
        self.config.unredirect_fullscreen = enabled;
        self.unredirect.note_option_changed();
        self.check_unredirect(true);
    }

    // --- Overlay ---------------------------------------------------------

    /// Whether `window` is the overlay window. Always `false` without a scene.
    pub fn check_for_overlay_window(&self, window: WindowId) -> bool {
        self.overlay_window() == Some(window)
    }

    pub fn overlay_window(&self) -> Option<WindowId> {
        self.scene.as_ref().and_then(|scene| scene.overlay().window())
    }

    pub fn is_overlay_window_visible(&self) -> bool {
        self.scene.as_ref().map_or(false, |scene| scene.overlay().is_visible())
    }

    /// Becoming visible schedules a full repaint.
    pub fn set_overlay_window_visibility(&mut self, visible: bool) {
        let Some(scene) = self.scene.as_deref_mut() else {
            return;
        };
        scene.overlay_mut().set_visibility(visible);
        if visible {
            self.add_repaint_full();
        }
    }

    // --- Support properties ----------------------------------------------

    pub fn keep_support_property(&mut self, atom: Atom) {
        self.support.keep(atom);
    }

    pub fn remove_support_property(&mut self, atom: Atom) {
        self.support.remove(atom, self.timers.as_mut());
    }

    // --- Queries ---------------------------------------------------------

    pub fn is_active(&self) -> bool {
        self.scene.is_some() && self.state != CompositorState::Finishing
    }

    /// `"none"` without a scene, otherwise the renderer family.
    pub fn compositing_type(&self) -> &'static str {
        self.scene
            .as_ref()
            .map_or("none", |scene| scene.compositing_type().as_str())
    }

    pub fn is_compositing_possible(&self) -> bool {
        capability::is_possible(&self.display)
    }

    /// Empty when compositing is possible.
    pub fn compositing_not_possible_reason(&self) -> String {
        capability::reason_unavailable(&self.display)
    }

    pub fn state(&self) -> CompositorState {
        self.state
    }

    pub fn suspend_reasons(&self) -> SuspendReason {
        self.suspended
    }

    pub fn config(&self) -> &CompositingConfig {
        &self.config
    }

    pub fn frame(&self) -> &FrameScheduler {
        &self.frame
    }

    /// Global repaints waiting for the next frame.
    pub fn pending_repaints(&self) -> &Region {
        &self.repaints
    }

    pub fn scene(&self) -> Option<&dyn Scene> {
        self.scene.as_deref()
    }

    pub fn windows(&self) -> &WindowStack {
        &self.windows
    }

    pub fn window(&self, id: WindowId) -> Option<&Toplevel> {
        self.windows.get(id)
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn take_events(&mut self) -> Vec<CompositorEvent> {
        std::mem::take(&mut self.events)
    }
}

impl<D: DisplayConnection> Drop for Compositor<D> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl<D: DisplayConnection> std::fmt::Debug for Compositor<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor")
            .field("state", &self.state)
            .field("suspended", &self.suspended)
            .field("compositing_type", &self.compositing_type())
            .field("windows", &self.windows.len())
            .finish()
    }
}

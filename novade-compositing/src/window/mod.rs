//! Top-level windows as the compositor sees them.
//!
//! A [`Toplevel`] is one of three variants: a managed client, an unmanaged
//! (override-redirect) window, or a deleted placeholder kept alive until its
//! closing animation is done. The variants share damage tracking
//! ([`damage`]) and differ only in their unredirect policy
//! ([`UnredirectPolicy`]).

pub mod damage;
pub mod stack;
pub mod unredirect;

pub use stack::{StackingView, WindowStack};
pub use unredirect::{UnredirectOptimizer, UNREDIRECT_DEBOUNCE};

use novade_core::types::{Rect, Region};

use crate::display::{DamageFetch, DamageHandle, WindowId};

/// State the window manager reports for a managed client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClientState {
    pub active: bool,
    pub fullscreen: bool,
    /// A window rule asks for compositing to be suspended while this client exists.
    pub blocks_compositing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UnmanagedState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeletedState {
    pub was_client: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToplevelKind {
    Client(ClientState),
    Unmanaged(UnmanagedState),
    Deleted(DeletedState),
}

/// Per-variant answer to "may this window bypass compositing?".
pub trait UnredirectPolicy {
    fn should_unredirect(&self, window: &Toplevel, view: &StackingView<'_>) -> bool;
}

impl UnredirectPolicy for ClientState {
    fn should_unredirect(&self, window: &Toplevel, view: &StackingView<'_>) -> bool {
        self.active && self.fullscreen && view.is_uncovered(window)
    }
}

impl UnredirectPolicy for UnmanagedState {
    fn should_unredirect(&self, window: &Toplevel, view: &StackingView<'_>) -> bool {
        let geometry = window.geometry();
        let covers_screen = geometry == view.layout().full
            || view.layout().screen_at(geometry.center()) == Some(geometry);
        covers_screen && view.is_uncovered(window)
    }
}

impl UnredirectPolicy for DeletedState {
    fn should_unredirect(&self, _window: &Toplevel, _view: &StackingView<'_>) -> bool {
        false
    }
}

#[derive(Debug, Clone)]
pub struct Toplevel {
    id: WindowId,
    kind: ToplevelKind,
    geometry: Rect,
    opacity: f64,
    shaped: bool,
    has_alpha: bool,
    unredirect_suspended: bool,
    pub(crate) damage: Option<DamageHandle>,
    pub(crate) damage_region: Region,
    /// Window-local.
    pub(crate) repaints: Region,
    /// Screen coordinates.
    pub(crate) layer_repaints: Region,
    pub(crate) is_damaged: bool,
    pub(crate) pending_fetch: Option<DamageFetch>,
    pub(crate) unredirected: bool,
    pub(crate) ready_for_painting: bool,
}

impl Toplevel {
    fn new(id: WindowId, kind: ToplevelKind, geometry: Rect) -> Self {
        Self {
            id,
            kind,
            geometry,
            opacity: 1.0,
            shaped: false,
            has_alpha: false,
            unredirect_suspended: false,
            damage: None,
            damage_region: Region::new(),
            repaints: Region::new(),
            layer_repaints: Region::new(),
            is_damaged: false,
            pending_fetch: None,
            unredirected: false,
            ready_for_painting: !matches!(kind, ToplevelKind::Client(_)),
        }
    }

    /// A managed client. Not ready for painting until its first damage.
    pub fn client(id: WindowId, geometry: Rect, state: ClientState) -> Self {
        Self::new(id, ToplevelKind::Client(state), geometry)
    }

    pub fn unmanaged(id: WindowId, geometry: Rect) -> Self {
        Self::new(id, ToplevelKind::Unmanaged(UnmanagedState), geometry)
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    pub fn with_alpha(mut self, has_alpha: bool) -> Self {
        self.has_alpha = has_alpha;
        self
    }

    pub fn with_shape(mut self, shaped: bool) -> Self {
        self.shaped = shaped;
        self
    }

    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn kind(&self) -> ToplevelKind {
        self.kind
    }

    pub fn is_client(&self) -> bool {
        matches!(self.kind, ToplevelKind::Client(_))
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self.kind, ToplevelKind::Deleted(_))
    }

    pub fn client_state(&self) -> Option<ClientState> {
        match self.kind {
            ToplevelKind::Client(state) => Some(state),
            _ => None,
        }
    }

    pub(crate) fn set_client_state(&mut self, state: ClientState) -> bool {
        match &mut self.kind {
            ToplevelKind::Client(current) => {
                *current = state;
                true
            }
            _ => false,
        }
    }

    pub fn geometry(&self) -> Rect {
        self.geometry
    }

    pub(crate) fn set_geometry(&mut self, geometry: Rect) {
        self.geometry = geometry;
    }

    /// Extents in window-local coordinates.
    pub fn local_rect(&self) -> Rect {
        self.geometry.at_origin()
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub(crate) fn set_opacity(&mut self, opacity: f64) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn is_shaped(&self) -> bool {
        self.shaped
    }

    pub(crate) fn set_shaped(&mut self, shaped: bool) {
        self.shaped = shaped;
    }

    pub fn has_alpha(&self) -> bool {
        self.has_alpha
    }

    pub fn unredirect_suspended(&self) -> bool {
        self.unredirect_suspended
    }

    pub(crate) fn set_unredirect_suspended(&mut self, suspended: bool) {
        self.unredirect_suspended = suspended;
    }

    pub fn is_unredirected(&self) -> bool {
        self.unredirected
    }

    pub fn is_ready_for_painting(&self) -> bool {
        self.ready_for_painting
    }

    pub fn has_damage_handle(&self) -> bool {
        self.damage.is_some()
    }

    pub fn is_damaged(&self) -> bool {
        self.is_damaged
    }

    pub fn has_pending_reply(&self) -> bool {
        self.pending_fetch.is_some()
    }

    /// Accumulated damage, window-local.
    pub fn damage_region(&self) -> &Region {
        &self.damage_region
    }

    pub fn layer_repaints(&self) -> &Region {
        &self.layer_repaints
    }

    /// Dispatches to the variant's [`UnredirectPolicy`].
    pub fn should_unredirect(&self, view: &StackingView<'_>) -> bool {
        match &self.kind {
            ToplevelKind::Client(state) => state.should_unredirect(self, view),
            ToplevelKind::Unmanaged(state) => state.should_unredirect(self, view),
            ToplevelKind::Deleted(state) => state.should_unredirect(self, view),
        }
    }

    /// Turns this window into its own deleted placeholder. Damage tracking
    /// must already have been finished.
    pub(crate) fn become_placeholder(&mut self) {
        let was_client = self.is_client();
        self.kind = ToplevelKind::Deleted(DeletedState { was_client });
        self.unredirected = false;
        self.ready_for_painting = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::ScreenLayout;

    fn fullscreen_client(id: u32) -> Toplevel {
        Toplevel::client(
            WindowId(id),
            Rect::from_coords(0, 0, 1920, 1080),
            ClientState {
                active: true,
                fullscreen: true,
                blocks_compositing: false,
            },
        )
    }

    #[test]
    fn test_client_policy_requires_active_fullscreen() {
        let layout = ScreenLayout::single(1920, 1080);
        let mut stack = WindowStack::new();
        stack.insert(fullscreen_client(1));
        let view = StackingView::new(&stack, &layout);
        assert!(stack.get(WindowId(1)).unwrap().should_unredirect(&view));

        let mut inactive = fullscreen_client(2);
        inactive.set_client_state(ClientState {
            active: false,
            fullscreen: true,
            blocks_compositing: false,
        });
        let mut stack = WindowStack::new();
        stack.insert(inactive);
        let view = StackingView::new(&stack, &layout);
        assert!(!stack.get(WindowId(2)).unwrap().should_unredirect(&view));
    }

    #[test]
    fn test_unmanaged_policy_matches_monitor() {
        let layout = ScreenLayout {
            full: Rect::from_coords(0, 0, 3840, 1080),
            screens: vec![Rect::from_coords(0, 0, 1920, 1080), Rect::from_coords(1920, 0, 1920, 1080)],
        };
        let mut stack = WindowStack::new();
        stack.insert(Toplevel::unmanaged(WindowId(1), Rect::from_coords(1920, 0, 1920, 1080)));
        stack.insert(Toplevel::unmanaged(WindowId(2), Rect::from_coords(0, 0, 1900, 1080)));
        let view = StackingView::new(&stack, &layout);
        assert!(stack.get(WindowId(1)).unwrap().should_unredirect(&view));
        assert!(!stack.get(WindowId(2)).unwrap().should_unredirect(&view));
    }

    #[test]
    fn test_placeholder_never_unredirects() {
        let layout = ScreenLayout::single(1920, 1080);
        let mut stack = WindowStack::new();
        let mut window = fullscreen_client(1);
        window.become_placeholder();
        stack.insert(window);
        let view = StackingView::new(&stack, &layout);
        let placeholder = stack.get(WindowId(1)).unwrap();
        assert!(placeholder.is_deleted());
        assert!(placeholder.is_ready_for_painting());
        assert!(!placeholder.should_unredirect(&view));
    }
}

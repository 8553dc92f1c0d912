//! The display-server protocol seam.
//!
//! [`DisplayConnection`] covers exactly what the compositor needs from the
//! display server: extension queries, manual redirection, damage objects with
//! a non-blocking subtract-and-fetch, the compositing-manager selection and a
//! few root-window property operations. Damage fetches are two-phase: a
//! request returns a [`DamageFetch`] ticket immediately and the reply is
//! collected later, so all requests of a frame can be issued before the first
//! reply is awaited.

pub mod headless;

pub use headless::HeadlessDisplay;

use novade_core::types::{Point, Rect};

use crate::error::DisplayError;

/// Protocol handle of a top-level window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub u32);

/// Interned name of a root-window property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Atom(pub u32);

/// Server-side damage object owned by one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DamageHandle(pub u32);

/// Ticket for an outstanding subtract-and-fetch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DamageFetch(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Extension {
    /// Region objects; also used to shape the overlay window.
    Fixes,
    Damage,
    /// Off-screen redirection of windows.
    Composite,
    Render,
    Glx,
}

/// Reply to a damage fetch, in window-local coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DamageReply {
    pub extents: Rect,
    pub rectangles: Vec<Rect>,
}

/// Geometry of the whole display and of each monitor on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenLayout {
    pub full: Rect,
    pub screens: Vec<Rect>,
}

impl ScreenLayout {
    /// A single monitor at the origin.
    pub fn single(width: u32, height: u32) -> Self {
        let full = Rect::from_coords(0, 0, width, height);
        Self { full, screens: vec![full] }
    }

    /// The monitor containing `point`, if any.
    pub fn screen_at(&self, point: Point) -> Option<Rect> {
        self.screens.iter().copied().find(|s| s.contains_point(point))
    }
}

/// Events the display server delivers to the compositor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayEvent {
    /// A window's damage object went from empty to non-empty.
    DamageNotify { window: WindowId },
    /// Another client took the compositing-manager selection.
    SelectionCleared,
}

pub trait DisplayConnection {
    fn has_extension(&self, extension: Extension) -> bool;

    /// Screen number used to build the `_NET_WM_CM_S<n>` selection name.
    fn screen_number(&self) -> u32 {
        0
    }

    fn screen_layout(&self) -> ScreenLayout;

    /// Refresh rate reported by the display, in Hz.
    fn refresh_rate(&self) -> Option<u32>;

    fn claim_selection(&mut self, selection: &str) -> Result<(), DisplayError>;
    fn release_selection(&mut self, selection: &str);

    /// Redirects every child of the root window to off-screen storage.
    fn redirect_subwindows(&mut self) -> Result<(), DisplayError>;
    fn unredirect_subwindows(&mut self);
    fn redirect_window(&mut self, window: WindowId);
    fn unredirect_window(&mut self, window: WindowId);

    /// Creates a damage object that reports only non-empty damage.
    fn create_damage(&mut self, window: WindowId) -> Result<DamageHandle, DisplayError>;
    fn destroy_damage(&mut self, damage: DamageHandle);
    /// Subtracts the accumulated damage and requests it without waiting.
    fn request_damage_region(&mut self, damage: DamageHandle) -> Result<DamageFetch, DisplayError>;
    /// Collects a reply. `None` if the request failed or the reply is gone.
    fn damage_region_reply(&mut self, fetch: DamageFetch) -> Option<DamageReply>;
    fn discard_damage_reply(&mut self, fetch: DamageFetch);
    fn flush(&mut self);

    fn delete_root_property(&mut self, atom: Atom);
    /// Writes the window opacity property for a non-compositing presentation.
    fn set_window_opacity(&mut self, window: WindowId, opacity: f64);

    fn poll_event(&mut self) -> Option<DisplayEvent>;
}

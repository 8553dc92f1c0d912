//! Per-window damage tracking.
//!
//! A tracked window owns a server-side damage object. Damage notifications
//! only mark the window dirty; the damaged area is fetched once per frame
//! with a subtract-and-fetch request whose reply is collected after every
//! other window's request has been issued.

use novade_core::types::Region;

use super::{Toplevel, ToplevelKind};
use crate::display::DisplayConnection;
use crate::scene::{Scene, WindowPaintInfo};

/// Reply rectangle counts in this range are kept as a list; anything else
/// collapses to the bounding rectangle.
const DETAILED_REPLY_RANGE: std::ops::Range<usize> = 2..16;

impl Toplevel {
    /// Starts tracking damage for this window.
    ///
    /// Returns `false` without side effects if the window is already tracked
    /// or is a placeholder. On success the whole window counts as damaged,
    /// since its owner may have drawn before tracking began.
    pub fn setup_compositing(&mut self, display: &mut dyn DisplayConnection, scene: &mut dyn Scene) -> bool {
        if self.damage.is_some() || self.is_deleted() {
            return false;
        }
        let handle = match display.create_damage(self.id) {
            Ok(handle) => handle,
            Err(err) => {
                tracing::warn!(window = self.id.0, error = %err, "Could not create damage object");
                return false;
            }
        };
        self.damage = Some(handle);
        self.damage_region = Region::from_rect(self.local_rect());
        self.unredirected = false;
        scene.window_added(self.id);
        if let ToplevelKind::Unmanaged(_) = self.kind {
            // May have been mapped and drawn before the damage object existed.
            self.add_damage_full();
        }
        tracing::trace!(window = self.id.0, damage = handle.0, "Window compositing set up");
        true
    }

    /// Stops tracking. Returns `false` if the window was not tracked.
    pub fn finish_compositing(&mut self, display: &mut dyn DisplayConnection, scene: &mut dyn Scene) -> bool {
        let Some(handle) = self.damage else {
            return false;
        };
        self.discard_window_pixmap(scene);
        if let Some(fetch) = self.pending_fetch.take() {
            display.discard_damage_reply(fetch);
        }
        display.destroy_damage(handle);
        self.damage = None;
        self.is_damaged = false;
        self.unredirected = false;
        self.damage_region.clear();
        self.repaints.clear();
        self.layer_repaints.clear();
        tracing::trace!(window = self.id.0, damage = handle.0, "Window compositing finished");
        true
    }

    /// The display reported new damage. Returns `false` for an untracked window.
    pub fn damage_notify(&mut self) -> bool {
        if self.damage.is_none() {
            return false;
        }
        self.is_damaged = true;
        if self.is_client() {
            self.ready_for_painting = true;
        }
        true
    }

    /// Issues the subtract-and-fetch for a dirty window without waiting.
    ///
    /// Returns `true` if a reply must be collected with
    /// [`Toplevel::collect_damage_reply`]. While an earlier reply is still
    /// outstanding no second request is issued and the window stays dirty.
    pub fn reset_and_fetch_damage(&mut self, display: &mut dyn DisplayConnection) -> bool {
        if !self.is_damaged || self.pending_fetch.is_some() {
            return false;
        }
        let Some(handle) = self.damage else {
            self.is_damaged = false;
            return false;
        };
        self.is_damaged = false;
        match display.request_damage_region(handle) {
            Ok(fetch) => {
                self.pending_fetch = Some(fetch);
                true
            }
            Err(err) => {
                tracing::warn!(window = self.id.0, error = %err, "Damage fetch failed");
                false
            }
        }
    }

    /// Folds the fetched damage into the damage and repaint regions.
    /// Returns whether any damage arrived.
    pub fn collect_damage_reply(&mut self, display: &mut dyn DisplayConnection) -> bool {
        let Some(fetch) = self.pending_fetch.take() else {
            return false;
        };
        let Some(reply) = display.damage_region_reply(fetch) else {
            tracing::debug!(window = self.id.0, "Damage reply missing");
            return false;
        };
        let region = if DETAILED_REPLY_RANGE.contains(&reply.rectangles.len()) {
            Region::from_rects(reply.rectangles)
        } else {
            Region::from_rect(reply.extents)
        };
        if region.is_empty() {
            return false;
        }
        self.damage_region.add_region(&region);
        self.repaints.add_region(&region);
        true
    }

    /// Marks the whole window damaged and in need of a repaint.
    pub fn add_damage_full(&mut self) {
        if self.damage.is_none() {
            return;
        }
        let local = self.local_rect();
        self.damage_region = Region::from_rect(local);
        self.repaints.add_rect(local);
    }

    /// Full damage plus telling the scene its cached contents are stale.
    pub fn discard_window_pixmap(&mut self, scene: &mut dyn Scene) {
        self.add_damage_full();
        scene.pixmap_discarded(self.id);
    }

    /// `region` is window-local.
    pub fn add_repaint(&mut self, region: &Region) {
        if self.damage.is_none() {
            return;
        }
        self.repaints.add_region(region);
    }

    pub fn add_repaint_full(&mut self) {
        if self.damage.is_none() {
            return;
        }
        self.repaints = Region::from_rect(self.local_rect());
    }

    /// `region` is in screen coordinates.
    pub fn add_layer_repaint(&mut self, region: &Region) {
        if self.damage.is_none() {
            return;
        }
        self.layer_repaints.add_region(region);
    }

    /// Everything waiting to be repainted, in screen coordinates.
    pub fn repaints(&self) -> Region {
        let origin = self.geometry().origin;
        let mut all = self.repaints.translated(origin.x, origin.y);
        all.add_region(&self.layer_repaints);
        all
    }

    pub fn has_pending_repaints(&self) -> bool {
        !self.repaints.is_empty() || !self.layer_repaints.is_empty()
    }

    pub fn reset_repaints(&mut self) {
        self.repaints.clear();
        self.layer_repaints.clear();
    }

    pub fn reset_damage(&mut self) {
        self.damage_region.clear();
    }

    pub(crate) fn paint_info(&self) -> WindowPaintInfo {
        WindowPaintInfo {
            id: self.id,
            geometry: self.geometry(),
            opacity: self.opacity(),
            damage: self.damage_region.clone(),
            repaints: self.repaints(),
            unredirected: self.unredirected,
        }
    }
}

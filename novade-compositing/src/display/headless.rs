//! In-memory display server.
//!
//! Used by the `novade-compositing` binary when no real display backend is
//! wired in, and by the tests, which drive it directly (report damage, steal
//! the selection) and then inspect what the compositor asked of it.

use std::collections::{HashMap, HashSet, VecDeque};

use novade_core::types::{Rect, Region};

use super::{
    Atom, DamageFetch, DamageHandle, DamageReply, DisplayConnection, DisplayEvent, Extension, ScreenLayout, WindowId,
};
use crate::error::DisplayError;

#[derive(Debug)]
struct DamageObject {
    window: WindowId,
    pending: Region,
}

#[derive(Debug)]
pub struct HeadlessDisplay {
    extensions: HashSet<Extension>,
    layout: ScreenLayout,
    refresh_rate: Option<u32>,
    selection_owner: Option<String>,
    refuse_selection: bool,
    claim_attempts: usize,
    subwindows_redirected: bool,
    unredirected: HashSet<WindowId>,
    next_id: u32,
    damages: HashMap<DamageHandle, DamageObject>,
    replies: HashMap<DamageFetch, DamageReply>,
    root_properties: HashSet<Atom>,
    opacities: HashMap<WindowId, f64>,
    events: VecDeque<DisplayEvent>,
    damages_created: usize,
    damages_destroyed: usize,
    fetch_requests: usize,
    flushes: usize,
}

impl HeadlessDisplay {
    pub fn new(extensions: &[Extension], layout: ScreenLayout) -> Self {
        Self {
            extensions: extensions.iter().copied().collect(),
            layout,
            refresh_rate: Some(60),
            selection_owner: None,
            refuse_selection: false,
            claim_attempts: 0,
            subwindows_redirected: false,
            unredirected: HashSet::new(),
            next_id: 1,
            damages: HashMap::new(),
            replies: HashMap::new(),
            root_properties: HashSet::new(),
            opacities: HashMap::new(),
            events: VecDeque::new(),
            damages_created: 0,
            damages_destroyed: 0,
            fetch_requests: 0,
            flushes: 0,
        }
    }

    /// A single `width`x`height` screen advertising every extension.
    pub fn with_all_extensions(width: u32, height: u32) -> Self {
        Self::new(
            &[Extension::Fixes, Extension::Damage, Extension::Composite, Extension::Render, Extension::Glx],
            ScreenLayout::single(width, height),
        )
    }

    pub fn set_refresh_rate(&mut self, rate: Option<u32>) {
        self.refresh_rate = rate;
    }

    /// Makes every subsequent selection claim fail.
    pub fn set_refuse_selection(&mut self, refuse: bool) {
        self.refuse_selection = refuse;
    }

    /// Accumulates damage on `window`'s damage object.
    ///
    /// Queues a [`DisplayEvent::DamageNotify`] only when the object was empty
    /// before. Returns `false` if the window has no damage object.
    pub fn report_damage(&mut self, window: WindowId, rects: &[Rect]) -> bool {
        let Some(object) = self.damages.values_mut().find(|d| d.window == window) else {
            return false;
        };
        let was_empty = object.pending.is_empty();
        for rect in rects {
            object.pending.add_rect(*rect);
        }
        if was_empty && !object.pending.is_empty() {
            self.events.push_back(DisplayEvent::DamageNotify { window });
        }
        true
    }

    /// Simulates another compositing manager taking over.
    pub fn steal_selection(&mut self, owner: &str) {
        if self.selection_owner.take().is_some() {
            self.events.push_back(DisplayEvent::SelectionCleared);
        }
        tracing::debug!(owner, "Selection taken by another client");
    }

    pub fn set_root_property(&mut self, atom: Atom) {
        self.root_properties.insert(atom);
    }

    pub fn has_root_property(&self, atom: Atom) -> bool {
        self.root_properties.contains(&atom)
    }

    pub fn selection_owner(&self) -> Option<&str> {
        self.selection_owner.as_deref()
    }

    pub fn claim_attempts(&self) -> usize {
        self.claim_attempts
    }

    pub fn subwindows_redirected(&self) -> bool {
        self.subwindows_redirected
    }

    pub fn is_unredirected(&self, window: WindowId) -> bool {
        self.unredirected.contains(&window)
    }

    pub fn live_damage_count(&self) -> usize {
        self.damages.len()
    }

    pub fn has_damage_for(&self, window: WindowId) -> bool {
        self.damages.values().any(|d| d.window == window)
    }

    pub fn damages_created(&self) -> usize {
        self.damages_created
    }

    pub fn damages_destroyed(&self) -> usize {
        self.damages_destroyed
    }

    pub fn fetch_requests(&self) -> usize {
        self.fetch_requests
    }

    pub fn flushes(&self) -> usize {
        self.flushes
    }

    pub fn opacity_of(&self, window: WindowId) -> Option<f64> {
        self.opacities.get(&window).copied()
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1).max(1);
        id
    }
}

impl DisplayConnection for HeadlessDisplay {
    fn has_extension(&self, extension: Extension) -> bool {
        self.extensions.contains(&extension)
    }

    fn screen_layout(&self) -> ScreenLayout {
        self.layout.clone()
    }

    fn refresh_rate(&self) -> Option<u32> {
        self.refresh_rate
    }

    fn claim_selection(&mut self, selection: &str) -> Result<(), DisplayError> {
        self.claim_attempts += 1;
        if self.refuse_selection {
            return Err(DisplayError::SelectionOwned(selection.to_string()));
        }
        self.selection_owner = Some(selection.to_string());
        Ok(())
    }

    fn release_selection(&mut self, selection: &str) {
        if self.selection_owner.as_deref() == Some(selection) {
            self.selection_owner = None;
        }
    }

    fn redirect_subwindows(&mut self) -> Result<(), DisplayError> {
        if !self.has_extension(Extension::Composite) {
            return Err(DisplayError::MissingExtension(Extension::Composite));
        }
        self.subwindows_redirected = true;
        Ok(())
    }

    fn unredirect_subwindows(&mut self) {
        self.subwindows_redirected = false;
        self.unredirected.clear();
    }

    fn redirect_window(&mut self, window: WindowId) {
        self.unredirected.remove(&window);
    }

    fn unredirect_window(&mut self, window: WindowId) {
        self.unredirected.insert(window);
    }

    fn create_damage(&mut self, window: WindowId) -> Result<DamageHandle, DisplayError> {
        if !self.has_extension(Extension::Damage) {
            return Err(DisplayError::MissingExtension(Extension::Damage));
        }
        let handle = DamageHandle(self.next_id());
        self.damages.insert(
            handle,
            DamageObject {
                window,
                pending: Region::new(),
            },
        );
        self.damages_created += 1;
        Ok(handle)
    }

    fn destroy_damage(&mut self, damage: DamageHandle) {
        if self.damages.remove(&damage).is_some() {
            self.damages_destroyed += 1;
        } else {
            tracing::warn!(damage = damage.0, "Destroying unknown damage object");
        }
    }

    fn request_damage_region(&mut self, damage: DamageHandle) -> Result<DamageFetch, DisplayError> {
        let object = self.damages.get_mut(&damage).ok_or(DisplayError::UnknownDamage(damage))?;
        let region = std::mem::take(&mut object.pending);
        let reply = DamageReply {
            extents: region.bounding_rect(),
            rectangles: region.rects().to_vec(),
        };
        let fetch = DamageFetch(self.next_id());
        self.replies.insert(fetch, reply);
        self.fetch_requests += 1;
        Ok(fetch)
    }

    fn damage_region_reply(&mut self, fetch: DamageFetch) -> Option<DamageReply> {
        self.replies.remove(&fetch)
    }

    fn discard_damage_reply(&mut self, fetch: DamageFetch) {
        self.replies.remove(&fetch);
    }

    fn flush(&mut self) {
        self.flushes += 1;
    }

    fn delete_root_property(&mut self, atom: Atom) {
        self.root_properties.remove(&atom);
    }

    fn set_window_opacity(&mut self, window: WindowId, opacity: f64) {
        self.opacities.insert(window, opacity);
    }

    fn poll_event(&mut self) -> Option<DisplayEvent> {
        self.events.pop_front()
    }
}

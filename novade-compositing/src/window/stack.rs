//! Stacking order, bottom to top.

use std::collections::HashMap;

use novade_core::types::Rect;

use super::Toplevel;
use crate::display::{ScreenLayout, WindowId};

#[derive(Debug, Default)]
pub struct WindowStack {
    order: Vec<WindowId>,
    windows: HashMap<WindowId, Toplevel>,
}

impl WindowStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Places `window` on top. A window with the same id is replaced in place.
    pub fn insert(&mut self, window: Toplevel) {
        let id = window.id();
        if self.windows.insert(id, window).is_none() {
            self.order.push(id);
        }
    }

    pub fn remove(&mut self, id: WindowId) -> Option<Toplevel> {
        let window = self.windows.remove(&id)?;
        self.order.retain(|w| *w != id);
        Some(window)
    }

    pub fn get(&self, id: WindowId) -> Option<&Toplevel> {
        self.windows.get(&id)
    }

    pub fn get_mut(&mut self, id: WindowId) -> Option<&mut Toplevel> {
        self.windows.get_mut(&id)
    }

    pub fn contains(&self, id: WindowId) -> bool {
        self.windows.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Ids bottom to top.
    pub fn order(&self) -> &[WindowId] {
        &self.order
    }

    /// Windows bottom to top.
    pub fn iter(&self) -> impl Iterator<Item = &Toplevel> + '_ {
        self.order.iter().filter_map(move |id| self.windows.get(id))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Toplevel> + '_ {
        self.windows.values_mut()
    }

    /// Replaces the stacking order.
    ///
    /// Unknown ids and duplicates are ignored. Known windows missing from
    /// `order` keep their relative order and end up below the listed ones.
    pub fn restack(&mut self, order: &[WindowId]) {
        let mut listed: Vec<WindowId> = Vec::with_capacity(self.order.len());
        for id in order {
            if self.windows.contains_key(id) && !listed.contains(id) {
                listed.push(*id);
            }
        }
        let mut restacked: Vec<WindowId> = self.order.iter().copied().filter(|id| !listed.contains(id)).collect();
        restacked.extend(listed);
        self.order = restacked;
    }

    /// Moves `id` to the top. Returns `false` for an unknown window.
    pub fn raise(&mut self, id: WindowId) -> bool {
        if !self.windows.contains_key(&id) {
            return false;
        }
        self.order.retain(|w| *w != id);
        self.order.push(id);
        true
    }

    pub fn placeholders(&self) -> Vec<WindowId> {
        self.iter().filter(|w| w.is_deleted()).map(Toplevel::id).collect()
    }

    /// Geometries of every unredirected window.
    pub fn unredirected_geometries(&self) -> Vec<Rect> {
        self.iter().filter(|w| w.is_unredirected()).map(Toplevel::geometry).collect()
    }
}

/// Read-only view handed to unredirect policies.
#[derive(Debug, Clone, Copy)]
pub struct StackingView<'a> {
    stack: &'a WindowStack,
    layout: &'a ScreenLayout,
}

impl<'a> StackingView<'a> {
    pub fn new(stack: &'a WindowStack, layout: &'a ScreenLayout) -> Self {
        Self { stack, layout }
    }

    pub fn layout(&self) -> &'a ScreenLayout {
        self.layout
    }

    /// `true` if no window stacked above `window` intersects it.
    /// A window not in the stack counts as covered.
    pub fn is_uncovered(&self, window: &Toplevel) -> bool {
        for other in self.stack.order.iter().rev() {
            if *other == window.id() {
                return true;
            }
            let Some(above) = self.stack.windows.get(other) else {
                continue;
            };
            if above.geometry().intersects(&window.geometry()) {
                return false;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn window(id: u32, rect: Rect) -> Toplevel {
        Toplevel::unmanaged(WindowId(id), rect)
    }

    #[test]
    fn test_insert_and_raise() {
        let mut stack = WindowStack::new();
        stack.insert(window(1, Rect::from_coords(0, 0, 10, 10)));
        stack.insert(window(2, Rect::from_coords(0, 0, 10, 10)));
        stack.insert(window(1, Rect::from_coords(5, 5, 10, 10)));
        assert_eq!(stack.order(), &[WindowId(1), WindowId(2)]);
        assert_eq!(stack.get(WindowId(1)).unwrap().geometry(), Rect::from_coords(5, 5, 10, 10));

        assert!(stack.raise(WindowId(1)));
        assert_eq!(stack.order(), &[WindowId(2), WindowId(1)]);
        assert!(!stack.raise(WindowId(9)));
    }

    #[test]
    fn test_restack_keeps_unlisted_below() {
        let mut stack = WindowStack::new();
        for id in 1..=4 {
            stack.insert(window(id, Rect::from_coords(0, 0, 1, 1)));
        }
        stack.restack(&[WindowId(4), WindowId(9), WindowId(2), WindowId(4)]);
        assert_eq!(stack.order(), &[WindowId(1), WindowId(3), WindowId(4), WindowId(2)]);
    }

    #[test]
    fn test_is_uncovered_only_looks_above() {
        let layout = ScreenLayout::single(100, 100);
        let mut stack = WindowStack::new();
        stack.insert(window(1, Rect::from_coords(0, 0, 100, 100)));
        stack.insert(window(2, Rect::from_coords(10, 10, 20, 20)));
        stack.insert(window(3, Rect::from_coords(200, 200, 20, 20)));
        let view = StackingView::new(&stack, &layout);

        assert!(!view.is_uncovered(stack.get(WindowId(1)).unwrap()));
        assert!(view.is_uncovered(stack.get(WindowId(2)).unwrap()));
        let outsider = window(7, Rect::from_coords(0, 0, 1, 1));
        assert!(!view.is_uncovered(&outsider));
    }
}

//! Pixel regions as sets of disjoint rectangles.
//!
//! [`Region`] is what damage, repaint and overlay-shape bookkeeping is expressed
//! in. The stored rectangles never overlap, so [`Region::area`] is exact and
//! unions never count a pixel twice. The decomposition itself is not canonical:
//! two regions covering the same pixels compare equal even when their
//! rectangle lists differ.
//!
//! # Examples
//!
//! ```
//! use novade_core::types::{Rect, Region};
//!
//! let mut damage = Region::from_rect(Rect::from_coords(0, 0, 100, 100));
//! damage.add_rect(Rect::from_coords(50, 50, 100, 100));
//! assert_eq!(damage.area(), 100 * 100 + 100 * 100 - 50 * 50);
//! assert_eq!(damage.bounding_rect(), Rect::from_coords(0, 0, 150, 150));
//!
//! let remaining = damage.subtracted_rect(&Rect::from_coords(0, 0, 150, 150));
//! assert!(remaining.is_empty());
//! ```

use super::geometry::{Point, Rect};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Region {
    rects: Vec<Rect>,
}

/// Pieces of `rect` not covered by `hole`, at most four.
fn subtract_rect_from_rect(rect: &Rect, hole: &Rect) -> Vec<Rect> {
    let Some(cut) = rect.intersection(hole) else {
        return vec![*rect];
    };
    let mut pieces = Vec::with_capacity(4);
    // Full-width bands above and below the cut, then the side pieces.
    if cut.top() > rect.top() {
        pieces.push(Rect::from_edges(rect.left(), rect.top(), rect.right(), cut.top()));
    }
    if cut.bottom() < rect.bottom() {
        pieces.push(Rect::from_edges(rect.left(), cut.bottom(), rect.right(), rect.bottom()));
    }
    if cut.left() > rect.left() {
        pieces.push(Rect::from_edges(rect.left(), cut.top(), cut.left(), cut.bottom()));
    }
    if cut.right() < rect.right() {
        pieces.push(Rect::from_edges(cut.right(), cut.top(), rect.right(), cut.bottom()));
    }
    pieces
}

impl Region {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rect(rect: Rect) -> Self {
        let mut region = Self::new();
        region.add_rect(rect);
        region
    }

    pub fn from_rects<I: IntoIterator<Item = Rect>>(rects: I) -> Self {
        let mut region = Self::new();
        for rect in rects {
            region.add_rect(rect);
        }
        region
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// The disjoint rectangles making up this region.
    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    pub fn clear(&mut self) {
        self.rects.clear();
    }

    /// Number of covered pixels.
    pub fn area(&self) -> u64 {
        self.rects.iter().map(|r| r.size.area()).sum()
    }

    /// Smallest rectangle containing the whole region; empty for an empty region.
    pub fn bounding_rect(&self) -> Rect {
        self.rects.iter().fold(Rect::default(), |acc, r| acc.union(r))
    }

    /// Adds `rect`, keeping the stored rectangles disjoint.
    pub fn add_rect(&mut self, rect: Rect) {
        if rect.is_empty() {
            return;
        }
        let mut fresh = vec![rect];
        for existing in &self.rects {
            fresh = fresh
                .iter()
                .flat_map(|piece| subtract_rect_from_rect(piece, existing))
                .collect();
            if fresh.is_empty() {
                return;
            }
        }
        self.rects.extend(fresh);
    }

    pub fn add_region(&mut self, other: &Region) {
        for rect in &other.rects {
            self.add_rect(*rect);
        }
    }

    pub fn union(&self, other: &Region) -> Region {
        let mut result = self.clone();
        result.add_region(other);
        result
    }

    pub fn subtract_rect(&mut self, hole: &Rect) {
        if hole.is_empty() {
            return;
        }
        self.rects = self
            .rects
            .iter()
            .flat_map(|r| subtract_rect_from_rect(r, hole))
            .collect();
    }

    pub fn subtracted_rect(&self, hole: &Rect) -> Region {
        let mut result = self.clone();
        result.subtract_rect(hole);
        result
    }

    pub fn subtract(&mut self, other: &Region) {
        for hole in &other.rects {
            self.subtract_rect(hole);
        }
    }

    pub fn subtracted(&self, other: &Region) -> Region {
        let mut result = self.clone();
        result.subtract(other);
        result
    }

    /// The part of this region inside `clip`.
    pub fn intersected_rect(&self, clip: &Rect) -> Region {
        Region {
            rects: self.rects.iter().filter_map(|r| r.intersection(clip)).collect(),
        }
    }

    pub fn intersects_rect(&self, rect: &Rect) -> bool {
        self.rects.iter().any(|r| r.intersects(rect))
    }

    pub fn contains_point(&self, point: Point) -> bool {
        self.rects.iter().any(|r| r.contains_point(point))
    }

    pub fn translate(&mut self, dx: i32, dy: i32) {
        for rect in &mut self.rects {
            *rect = rect.translate(dx, dy);
        }
    }

    pub fn translated(&self, dx: i32, dy: i32) -> Region {
        let mut result = self.clone();
        result.translate(dx, dy);
        result
    }
}

impl PartialEq for Region {
    fn eq(&self, other: &Self) -> bool {
        self.area() == other.area() && self.subtracted(other).is_empty()
    }
}

impl Eq for Region {}

impl From<Rect> for Region {
    fn from(rect: Rect) -> Self {
        Region::from_rect(rect)
    }
}

//! Integer geometry primitives in screen coordinates.
//!
//! Window geometry, damage rectangles and screen areas are all whole-pixel
//! quantities, so everything here is `i32` positions and `u32` extents.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// A 2D point with `i32` coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// The origin (0, 0).
    pub const ZERO: Point = Point::new(0, 0);

    pub const fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }
}

impl Add for Point {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Point::new(self.x.saturating_add(other.x), self.y.saturating_add(other.y))
    }
}

impl Sub for Point {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Point::new(self.x.saturating_sub(other.x), self.y.saturating_sub(other.y))
    }
}

/// A 2D size with `u32` dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Size { width, height }
    }

    /// Checks if the area is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// An axis-aligned rectangle: `i32` origin and `u32` size.
///
/// Edges are inclusive on the left/top and exclusive on the right/bottom.
///
/// # Examples
///
/// ```
/// use novade_core::types::{Point, Rect};
///
/// let screen = Rect::from_coords(0, 0, 1920, 1080);
/// let window = Rect::from_coords(1800, 1000, 400, 300);
/// assert!(screen.intersects(&window));
/// assert_eq!(screen.intersection(&window), Some(Rect::from_coords(1800, 1000, 120, 80)));
/// assert!(screen.contains_point(Point::new(960, 540)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    /// The origin point (top-left corner) of the rectangle.
    pub origin: Point,
    /// The size (width and height) of the rectangle.
    pub size: Size,
}

impl Rect {
    pub const fn new(origin: Point, size: Size) -> Self {
        Rect { origin, size }
    }

    /// Creates a new `Rect` from individual coordinate and dimension values.
    pub const fn from_coords(x: i32, y: i32, width: u32, height: u32) -> Self {
        Rect {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    /// Builds a rectangle from its edges. Inverted edges yield an empty rectangle.
    pub fn from_edges(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        let width = (i64::from(right) - i64::from(left)).max(0) as u32;
        let height = (i64::from(bottom) - i64::from(top)).max(0) as u32;
        Rect::from_coords(left, top, width, height)
    }

    pub fn x(&self) -> i32 {
        self.origin.x
    }
    pub fn y(&self) -> i32 {
        self.origin.y
    }
    pub fn width(&self) -> u32 {
        self.size.width
    }
    pub fn height(&self) -> u32 {
        self.size.height
    }

    pub fn area(&self) -> u64 {
        self.size.area()
    }

    pub fn left(&self) -> i32 {
        self.origin.x
    }
    pub fn top(&self) -> i32 {
        self.origin.y
    }
    /// Calculates the x-coordinate of the right edge (exclusive).
    pub fn right(&self) -> i32 {
        self.origin.x.saturating_add(self.size.width as i32)
    }
    /// Calculates the y-coordinate of the bottom edge (exclusive).
    pub fn bottom(&self) -> i32 {
        self.origin.y.saturating_add(self.size.height as i32)
    }

    /// Returns the center, rounded towards the origin.
    pub fn center(&self) -> Point {
        Point::new(
            self.origin.x.saturating_add((self.size.width / 2) as i32),
            self.origin.y.saturating_add((self.size.height / 2) as i32),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.size.is_empty()
    }

    pub fn contains_point(&self, point: Point) -> bool {
        point.x >= self.left() && point.x < self.right() && point.y >= self.top() && point.y < self.bottom()
    }

    /// `true` if `other` lies entirely inside this rectangle.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.is_empty()
            || (other.left() >= self.left()
                && other.top() >= self.top()
                && other.right() <= self.right()
                && other.bottom() <= self.bottom())
    }

    /// Checks if this rectangle shares a non-empty area with `other`.
    pub fn intersects(&self, other: &Rect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Returns the overlapping area, or `None` if they do not intersect.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.intersects(other) {
            return None;
        }
        Some(Rect::from_edges(
            self.left().max(other.left()),
            self.top().max(other.top()),
            self.right().min(other.right()),
            self.bottom().min(other.bottom()),
        ))
    }

    /// Smallest rectangle containing both. Empty rectangles are ignored.
    pub fn union(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Rect::from_edges(
            self.left().min(other.left()),
            self.top().min(other.top()),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        )
    }

    /// Moves the origin by (dx, dy) with saturating arithmetic.
    pub fn translate(&self, dx: i32, dy: i32) -> Self {
        Rect::from_coords(
            self.origin.x.saturating_add(dx),
            self.origin.y.saturating_add(dy),
            self.size.width,
            self.size.height,
        )
    }

    /// The same size placed at (0, 0); a window's extents in local coordinates.
    pub fn at_origin(&self) -> Self {
        Rect::new(Point::ZERO, self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges() {
        let r = Rect::from_coords(10, 20, 30, 40);
        assert_eq!((r.left(), r.top(), r.right(), r.bottom()), (10, 20, 40, 60));
        assert_eq!(r.center(), Point::new(25, 40));
        assert_eq!(r.area(), 1200);
        assert_eq!(Rect::from_edges(5, 5, 1, 1), Rect::from_coords(5, 5, 0, 0));
    }

    #[test]
    fn test_touching_rects_do_not_intersect() {
        let a = Rect::from_coords(0, 0, 10, 10);
        let b = Rect::from_coords(10, 0, 10, 10);
        assert!(!a.intersects(&b));
        assert_eq!(a.intersection(&b), None);
    }

    #[test]
    fn test_empty_rect_never_intersects() {
        let a = Rect::from_coords(0, 0, 10, 10);
        let empty = Rect::from_coords(5, 5, 0, 3);
        assert!(!a.intersects(&empty));
        assert!(a.contains_rect(&empty));
        assert_eq!(a.union(&empty), a);
    }

    #[test]
    fn test_union_and_translate() {
        let a = Rect::from_coords(0, 0, 10, 10);
        let b = Rect::from_coords(20, 5, 5, 10);
        assert_eq!(a.union(&b), Rect::from_coords(0, 0, 25, 15));
        assert_eq!(b.translate(-20, 5), Rect::from_coords(0, 10, 5, 10));
        assert_eq!(b.at_origin(), Rect::from_coords(0, 0, 5, 10));
    }
}

//! Core data types shared by the NovaDE compositing stack.
//!
//! - **Geometry**: [`Point`], [`Size`], [`Rect`] in whole screen pixels.
//! - **Regions**: [`Region`], a set of disjoint rectangles used for damage and repaint tracking.

pub mod geometry;
pub mod region;

pub use geometry::{Point, Rect, Size};
pub use region::Region;

//! Planar geometry for collision masks
//!
//! Everything here is a pure query object:
//! - `shape`: rectangles and polygons with point/rectangle tests
//! - `area`: exact positive-area overlap between arbitrary outlines
//! - `mask`: a shape anchored at a global position

pub mod area;
pub mod mask;
pub mod shape;

pub use area::outlines_overlap;
pub use mask::CollisionMask;
pub use shape::{Polygon, Rect, Shape};

/// A position in level space (pixels, y grows downward)
pub type Pos = glam::DVec2;

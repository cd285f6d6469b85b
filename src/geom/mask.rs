//! Collision masks: a local shape anchored at a global position

use super::{Pos, Rect, Shape};

/// A positioned collision shape
///
/// The shape is stored relative to the mask origin; `global_shape` returns it
/// translated to the current global position. A mask without a shape has no
/// collision capability at all.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CollisionMask {
    shape: Option<Shape>,
    global_pos: Pos,
}

impl CollisionMask {
    pub fn new(shape: impl Into<Shape>) -> Self {
        Self {
            shape: Some(shape.into()),
            global_pos: Pos::ZERO,
        }
    }

    /// A mask that never collides
    pub fn empty() -> Self {
        Self::default()
    }

    /// A `width` × `height` rectangle with its top-left at the mask origin
    pub fn rect(width: f64, height: f64) -> Self {
        Self::new(Rect::new(0.0, 0.0, width, height))
    }

    pub fn local_shape(&self) -> Option<&Shape> {
        self.shape.as_ref()
    }

    pub fn global_position(&self) -> Pos {
        self.global_pos
    }

    pub fn set_global_position(&mut self, pos: Pos) {
        self.global_pos = pos;
    }

    /// The shape in level space
    pub fn global_shape(&self) -> Option<Shape> {
        self.shape.as_ref().map(|s| s.translated(self.global_pos))
    }

    /// The global rectangle when the shape is a rectangle
    pub fn global_rect(&self) -> Option<Rect> {
        self.shape
            .as_ref()
            .and_then(Shape::as_rect)
            .map(|r| r.translated(self.global_pos))
    }

    /// True iff the underlying shape is a rectangle
    pub fn supports_fast_path(&self) -> bool {
        matches!(self.shape, Some(Shape::Rect(_)))
    }

    pub fn contains(&self, point: Pos) -> bool {
        self.global_shape().is_some_and(|s| s.contains(point))
    }

    pub fn intersects(&self, other: &Shape) -> bool {
        self.global_shape().is_some_and(|s| s.intersects(other))
    }
}

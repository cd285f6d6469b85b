//! Rectangles, polygons and the `Shape` sum type used by collision masks

use glam::DVec2;

use super::area::outlines_overlap;

/// An axis-aligned rectangle (top-left corner plus size)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A rectangle with no area never intersects or contains anything
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    #[inline]
    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    #[inline]
    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    /// O(1) interval overlap; edges that only touch do not intersect
    pub fn intersects(&self, other: &Rect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.x < other.max_x()
            && other.x < self.max_x()
            && self.y < other.max_y()
            && other.y < self.max_y()
    }

    /// Half-open containment: `[x, x + w) × [y, y + h)`
    pub fn contains(&self, p: DVec2) -> bool {
        !self.is_empty() && p.x >= self.x && p.y >= self.y && p.x < self.max_x() && p.y < self.max_y()
    }

    /// Corners in clockwise order (screen space)
    pub fn corners(&self) -> [DVec2; 4] {
        [
            DVec2::new(self.x, self.y),
            DVec2::new(self.max_x(), self.y),
            DVec2::new(self.max_x(), self.max_y()),
            DVec2::new(self.x, self.max_y()),
        ]
    }

    pub fn translated(&self, offset: DVec2) -> Self {
        Self {
            x: self.x + offset.x,
            y: self.y + offset.y,
            ..*self
        }
    }
}

/// A simple polygon, filled with the even-odd rule
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    points: Vec<DVec2>,
}

impl Polygon {
    pub fn new(points: Vec<DVec2>) -> Self {
        Self { points }
    }

    /// Convenience constructor from `(x, y)` pairs
    pub fn from_points(points: &[(f64, f64)]) -> Self {
        Self::new(points.iter().map(|&(x, y)| DVec2::new(x, y)).collect())
    }

    pub fn points(&self) -> &[DVec2] {
        &self.points
    }

    /// Axis-aligned bounds, `None` when there are no vertices
    pub fn bounds(&self) -> Option<Rect> {
        let first = *self.points.first()?;
        let (min, max) = self
            .points
            .iter()
            .fold((first, first), |(min, max), &p| (min.min(p), max.max(p)));
        Some(Rect::new(min.x, min.y, max.x - min.x, max.y - min.y))
    }

    /// Even-odd ray cast toward +x
    pub fn contains(&self, p: DVec2) -> bool {
        let n = self.points.len();
        if n < 3 {
            return false;
        }
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[j];
            if (a.y > p.y) != (b.y > p.y) {
                let x = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
                if p.x < x {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }

    pub fn translated(&self, offset: DVec2) -> Self {
        Self::new(self.points.iter().map(|&p| p + offset).collect())
    }
}

/// Any shape a collision mask can carry
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rect(Rect),
    Polygon(Polygon),
}

impl Shape {
    /// Shorthand for a rectangle shape
    pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Shape::Rect(Rect::new(x, y, width, height))
    }

    pub fn polygon(points: &[(f64, f64)]) -> Self {
        Shape::Polygon(Polygon::from_points(points))
    }

    /// The rectangle, if this shape is one (fast-path eligibility)
    #[inline]
    pub fn as_rect(&self) -> Option<&Rect> {
        match self {
            Shape::Rect(r) => Some(r),
            Shape::Polygon(_) => None,
        }
    }

    pub fn contains(&self, p: DVec2) -> bool {
        match self {
            Shape::Rect(r) => r.contains(p),
            Shape::Polygon(poly) => poly.contains(p),
        }
    }

    /// Closed outline used by the exact path
    pub fn outline(&self) -> Vec<DVec2> {
        match self {
            Shape::Rect(r) if r.is_empty() => Vec::new(),
            Shape::Rect(r) => r.corners().to_vec(),
            Shape::Polygon(poly) => poly.points().to_vec(),
        }
    }

    pub fn translated(&self, offset: DVec2) -> Self {
        match self {
            Shape::Rect(r) => Shape::Rect(r.translated(offset)),
            Shape::Polygon(poly) => Shape::Polygon(poly.translated(offset)),
        }
    }

    /// Does this shape's interior overlap the rectangle's?
    ///
    /// Rectangle-vs-rectangle stays O(1); a polygon falls back to the exact
    /// area test against the rectangle's outline.
    pub fn intersects_rect(&self, rect: &Rect) -> bool {
        match self {
            Shape::Rect(r) => r.intersects(rect),
            Shape::Polygon(poly) => {
                !rect.is_empty() && outlines_overlap(poly.points(), &rect.corners())
            }
        }
    }

    /// Exact area intersection, regardless of shape kinds
    pub fn intersects_exact(&self, other: &Shape) -> bool {
        outlines_overlap(&self.outline(), &other.outline())
    }

    /// General intersection test: fast when both are rectangles
    pub fn intersects(&self, other: &Shape) -> bool {
        match (self, other) {
            (Shape::Rect(a), Shape::Rect(b)) => a.intersects(b),
            (_, Shape::Rect(b)) => self.intersects_rect(b),
            (Shape::Rect(a), _) => other.intersects_rect(a),
            _ => self.intersects_exact(other),
        }
    }
}

impl From<Rect> for Shape {
    fn from(rect: Rect) -> Self {
        Shape::Rect(rect)
    }
}

impl From<Polygon> for Shape {
    fn from(poly: Polygon) -> Self {
        Shape::Polygon(poly)
    }
}

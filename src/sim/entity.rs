//! Entities: a positioned body with an optional collision mask, a depth and
//! a pluggable behaviour
//!
//! Collision between two bodies picks one of three paths:
//! 1. either side has no usable mask → no collision
//! 2. fast path: one side is a rectangle and both sides allow it
//! 3. exact path: area intersection of both global shapes

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::geom::{CollisionMask, Pos, Shape};

use super::lock;
use super::present::DrawItem;
use super::world::TickContext;

/// Process-unique entity identifier
pub type EntityId = u64;

static NEXT_ENTITY_ID: AtomicU64 = AtomicU64::new(1);

/// Registry type of an entity (numeric id as used in level files, plus name)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityKind {
    pub type_id: u32,
    pub name: &'static str,
}

impl EntityKind {
    pub const fn new(type_id: u32, name: &'static str) -> Self {
        Self { type_id, name }
    }
}

/// Position plus collision mask, kept in lock-step
#[derive(Debug, Clone)]
pub struct Body {
    pos: Pos,
    mask: Option<CollisionMask>,
    /// Mask shape is a rectangle
    can_fast_collide: bool,
    /// Fast collision permitted for this body
    fast_collision: bool,
}

impl Body {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            pos: Pos::new(x, y),
            mask: None,
            can_fast_collide: false,
            fast_collision: true,
        }
    }

    #[inline]
    pub fn pos(&self) -> Pos {
        self.pos
    }

    #[inline]
    pub fn x(&self) -> f64 {
        self.pos.x
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.pos.y
    }

    pub fn set_pos(&mut self, pos: Pos) {
        self.pos = pos;
        self.sync_mask();
    }

    pub fn set_x(&mut self, x: f64) {
        self.pos.x = x;
        self.sync_mask();
    }

    pub fn set_y(&mut self, y: f64) {
        self.pos.y = y;
        self.sync_mask();
    }

    pub fn move_by(&mut self, dx: f64, dy: f64) {
        self.pos += Pos::new(dx, dy);
        self.sync_mask();
    }

    fn sync_mask(&mut self) {
        if let Some(mask) = self.mask.as_mut() {
            mask.set_global_position(self.pos);
        }
    }

    pub fn has_collision_mask(&self) -> bool {
        self.mask.is_some()
    }

    pub fn collision_mask(&self) -> Option<&CollisionMask> {
        self.mask.as_ref()
    }

    /// Install a mask and move it to the body's current position
    pub fn set_collision_mask(&mut self, mut mask: CollisionMask) {
        self.can_fast_collide = mask.supports_fast_path();
        mask.set_global_position(self.pos);
        self.mask = Some(mask);
    }

    pub fn clear_collision_mask(&mut self) {
        self.mask = None;
        self.can_fast_collide = false;
    }

    /// Allow or forbid the rectangle fast path for this body
    pub fn set_fast_collision(&mut self, fast: bool) {
        self.fast_collision = fast;
    }

    pub fn does_fast_collision(&self) -> bool {
        self.fast_collision
    }

    /// Fast path is possible from this side (rectangle mask)
    pub fn can_fast_collide(&self) -> bool {
        self.can_fast_collide
    }

    pub fn global_shape(&self) -> Option<Shape> {
        self.mask.as_ref().and_then(CollisionMask::global_shape)
    }

    pub fn is_collided_with_point(&self, point: Pos) -> bool {
        self.mask.as_ref().is_some_and(|m| m.contains(point))
    }

    /// Does the mask intersect an arbitrary level-space shape?
    ///
    /// The shape takes the "other" role and always permits fast collision.
    pub fn is_collided_with_shape(&self, other: &Shape) -> bool {
        let Some(shape) = self.global_shape() else {
            return false;
        };
        if self.can_fast_collide && self.fast_collision {
            if let Some(rect) = shape.as_rect() {
                return other.intersects_rect(rect);
            }
        }
        if self.fast_collision {
            if let Some(rect) = other.as_rect() {
                return shape.intersects_rect(rect);
            }
        }
        shape.intersects_exact(other)
    }

    /// Does this mask intersect another body's mask?
    pub fn is_collided_with(&self, other: &Body) -> bool {
        let (Some(shape), Some(other_shape)) = (self.global_shape(), other.global_shape()) else {
            return false;
        };
        let both_fast = self.fast_collision && other.fast_collision;
        if self.can_fast_collide && both_fast {
            if let Some(rect) = shape.as_rect() {
                return other_shape.intersects_rect(rect);
            }
        }
        if other.can_fast_collide && both_fast {
            if let Some(rect) = other_shape.as_rect() {
                return shape.intersects_rect(rect);
            }
        }
        shape.intersects_exact(&other_shape)
    }
}

/// What a collision notification tells the receiver about the other party
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub id: EntityId,
    pub kind: EntityKind,
    pub pos: Pos,
}

/// Per-kind entity logic
///
/// Every hook has a no-op default so simple kinds (walls) implement nothing.
pub trait Behavior: Send {
    /// Advance one simulation tick
    fn tick(&mut self, _body: &mut Body, _ctx: &mut TickContext<'_>) {}

    /// Another entity reported a collision with this one
    fn on_collided_with(&mut self, _body: &mut Body, _other: &Contact, _ctx: &mut TickContext<'_>) {}

    /// Entities returning false are skipped by collision dispatch
    fn receives_collision_events(&self) -> bool {
        true
    }

    /// Entities returning false are never registered as update listeners
    fn listens(&self) -> bool {
        true
    }

    /// Kind-specific appearance hint for the presenter (facing, frame, ...)
    fn draw_variant(&self) -> u32 {
        0
    }
}

/// A live game object
pub struct Entity {
    id: EntityId,
    kind: EntityKind,
    depth: i32,
    body: Body,
    behavior: Box<dyn Behavior>,
}

impl Entity {
    pub fn new(kind: EntityKind, x: f64, y: f64, behavior: impl Behavior + 'static) -> Self {
        Self {
            id: NEXT_ENTITY_ID.fetch_add(1, Ordering::Relaxed),
            kind,
            depth: 0,
            body: Body::new(x, y),
            behavior: Box::new(behavior),
        }
    }

    pub fn with_depth(mut self, depth: i32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_mask(mut self, mask: CollisionMask) -> Self {
        self.body.set_collision_mask(mask);
        self
    }

    pub fn with_fast_collision(mut self, fast: bool) -> Self {
        self.body.set_fast_collision(fast);
        self
    }

    #[inline]
    pub fn id(&self) -> EntityId {
        self.id
    }

    #[inline]
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn is_kind(&self, name: &str) -> bool {
        self.kind.name == name
    }

    /// Draw/update priority; higher values go first
    #[inline]
    pub fn depth(&self) -> i32 {
        self.depth
    }

    pub fn set_depth(&mut self, depth: i32) {
        self.depth = depth;
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    pub fn pos(&self) -> Pos {
        self.body.pos()
    }

    pub fn contact(&self) -> Contact {
        Contact {
            id: self.id,
            kind: self.kind,
            pos: self.body.pos(),
        }
    }

    pub fn tick(&mut self, ctx: &mut TickContext<'_>) {
        self.behavior.tick(&mut self.body, ctx);
    }

    pub fn on_collided_with(&mut self, other: &Contact, ctx: &mut TickContext<'_>) {
        self.behavior.on_collided_with(&mut self.body, other, ctx);
    }

    pub fn receives_collision_events(&self) -> bool {
        self.behavior.receives_collision_events()
    }

    pub fn listens(&self) -> bool {
        self.behavior.listens()
    }

    pub fn is_collided_with(&self, other: &Entity) -> bool {
        self.body.is_collided_with(&other.body)
    }

    pub fn is_collided_with_shape(&self, shape: &Shape) -> bool {
        self.body.is_collided_with_shape(shape)
    }

    pub fn is_collided_with_point(&self, point: Pos) -> bool {
        self.body.is_collided_with_point(point)
    }

    pub fn draw_item(&self) -> DrawItem {
        DrawItem {
            id: self.id,
            kind: self.kind.name,
            pos: self.body.pos(),
            depth: self.depth,
            shape: self.body.global_shape(),
            variant: self.behavior.draw_variant(),
        }
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("kind", &self.kind.name)
            .field("depth", &self.depth)
            .field("pos", &self.body.pos())
            .finish()
    }
}

/// Shared handle to an entity living in the world
///
/// Id and kind are cached so removal and kind filters never need the entity
/// lock.
#[derive(Clone)]
pub struct SharedEntity {
    id: EntityId,
    kind: EntityKind,
    inner: Arc<Mutex<Entity>>,
}

impl SharedEntity {
    pub fn new(entity: Entity) -> Self {
        Self {
            id: entity.id(),
            kind: entity.kind(),
            inner: Arc::new(Mutex::new(entity)),
        }
    }

    #[inline]
    pub fn id(&self) -> EntityId {
        self.id
    }

    #[inline]
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn lock(&self) -> MutexGuard<'_, Entity> {
        lock(&self.inner)
    }

    pub fn depth(&self) -> i32 {
        self.lock().depth()
    }
}

impl fmt::Debug for SharedEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedEntity")
            .field("id", &self.id)
            .field("kind", &self.kind.name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Rect;

    struct Inert;
    impl Behavior for Inert {}

    const BLOCK: EntityKind = EntityKind::new(99, "block");

    fn boxed(x: f64, y: f64, w: f64, h: f64) -> Entity {
        Entity::new(BLOCK, x, y, Inert).with_mask(CollisionMask::rect(w, h))
    }

    fn triangle(x: f64, y: f64) -> Entity {
        Entity::new(BLOCK, x, y, Inert).with_mask(CollisionMask::new(Shape::polygon(&[
            (0.0, 0.0),
            (10.0, 0.0),
            (0.0, 10.0),
        ])))
    }

    #[test]
    fn test_overlapping_rectangles_collide_until_moved_apart() {
        let a = boxed(0.0, 0.0, 10.0, 10.0);
        let mut b = boxed(5.0, 5.0, 10.0, 10.0);
        assert!(a.is_collided_with(&b));

        b.body_mut().set_pos(Pos::new(20.0, 20.0));
        assert!(!a.is_collided_with(&b));
    }

    #[test]
    fn test_mask_follows_every_mutator() {
        let mut e = boxed(0.0, 0.0, 4.0, 4.0);
        e.body_mut().move_by(3.0, 2.0);
        assert_eq!(e.body().collision_mask().map(CollisionMask::global_position), Some(Pos::new(3.0, 2.0)));
        e.body_mut().set_x(10.0);
        e.body_mut().set_y(-1.0);
        assert_eq!(e.body().global_shape(), Some(Shape::rect(10.0, -1.0, 4.0, 4.0)));
    }

    #[test]
    fn test_set_mask_snaps_to_current_position() {
        let mut e = Entity::new(BLOCK, 7.0, 8.0, Inert);
        e.body_mut().set_collision_mask(CollisionMask::rect(2.0, 2.0));
        assert_eq!(e.body().global_shape(), Some(Shape::rect(7.0, 8.0, 2.0, 2.0)));
        assert!(e.body().can_fast_collide());
    }

    #[test]
    fn test_no_mask_never_collides() {
        let a = Entity::new(BLOCK, 0.0, 0.0, Inert);
        let b = boxed(0.0, 0.0, 10.0, 10.0);
        assert!(!a.is_collided_with(&b));
        assert!(!b.is_collided_with(&a));
        assert!(!a.is_collided_with_point(Pos::ZERO));
        assert!(!a.is_collided_with_shape(&Shape::rect(-1.0, -1.0, 5.0, 5.0)));
    }

    #[test]
    fn test_empty_mask_never_collides() {
        let a = Entity::new(BLOCK, 0.0, 0.0, Inert).with_mask(CollisionMask::empty());
        let b = boxed(0.0, 0.0, 10.0, 10.0);
        assert!(!a.is_collided_with(&b));
        assert!(!b.is_collided_with(&a));
    }

    #[test]
    fn test_rectangle_against_polygon_uses_true_shape() {
        // Box sits inside the triangle's bounds but past the hypotenuse
        let tri = triangle(0.0, 0.0);
        let rect = boxed(7.0, 7.0, 2.0, 2.0);
        assert!(!tri.is_collided_with(&rect));
        assert!(!rect.is_collided_with(&tri));

        let rect = boxed(1.0, 1.0, 2.0, 2.0);
        assert!(tri.is_collided_with(&rect));
        assert!(rect.is_collided_with(&tri));
    }

    #[test]
    fn test_fast_and_exact_paths_agree_on_rectangles() {
        let a = boxed(0.0, 0.0, 10.0, 10.0);
        let b = boxed(9.0, 3.0, 5.0, 5.0);
        let slow_a = boxed(0.0, 0.0, 10.0, 10.0).with_fast_collision(false);
        assert!(a.is_collided_with(&b));
        assert!(slow_a.is_collided_with(&b));
    }

    #[test]
    fn test_shape_query_takes_other_role() {
        let e = triangle(100.0, 100.0);
        assert!(e.is_collided_with_shape(&Shape::Rect(Rect::new(101.0, 101.0, 1.0, 1.0))));
        assert!(!e.is_collided_with_shape(&Shape::Rect(Rect::new(108.0, 108.0, 1.0, 1.0))));
        assert!(e.is_collided_with_point(Pos::new(101.0, 101.0)));
    }

    #[test]
    fn test_shared_entity_caches_identity() {
        let e = boxed(0.0, 0.0, 1.0, 1.0).with_depth(4);
        let id = e.id();
        let shared = SharedEntity::new(e);
        assert_eq!(shared.id(), id);
        assert_eq!(shared.kind(), BLOCK);
        assert_eq!(shared.depth(), 4);
    }

    #[test]
    fn test_entity_ids_are_unique() {
        let a = boxed(0.0, 0.0, 1.0, 1.0);
        let b = boxed(0.0, 0.0, 1.0, 1.0);
        assert_ne!(a.id(), b.id());
    }
}

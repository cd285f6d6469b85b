//! Spatial and predicate queries over the live entity sequence
//!
//! Every query works on a snapshot taken under the read lock, so it sees the
//! sequence as of the last drain. Candidates are locked one at a time and
//! never while another entity lock is held, so these are safe to call from
//! any thread while the world ticks. Ids in `exclude` are skipped without
//! locking (entities the caller already holds).

use crate::geom::{Pos, Shape};

use super::entity::{Body, Entity, EntityId, SharedEntity};
use super::world::World;

impl World {
    /// All live entities matching `predicate`, in depth order
    pub fn find_entities<P>(&self, predicate: P) -> Vec<SharedEntity>
    where
        P: FnMut(&Entity) -> bool,
    {
        self.find_entities_excluding(&[], predicate)
    }

    pub fn find_entities_excluding<P>(&self, exclude: &[EntityId], mut predicate: P) -> Vec<SharedEntity>
    where
        P: FnMut(&Entity) -> bool,
    {
        self.entities()
            .into_iter()
            .filter(|e| !exclude.contains(&e.id()) && predicate(&e.lock()))
            .collect()
    }

    /// Kind filter that never takes an entity lock
    pub fn entities_of_kind(&self, kind: &str) -> Vec<SharedEntity> {
        self.entities().into_iter().filter(|e| e.kind().name == kind).collect()
    }

    pub fn entities_colliding_with_shape(&self, shape: &Shape) -> Vec<SharedEntity> {
        self.find_entities(|e| e.is_collided_with_shape(shape))
    }

    /// Entities whose masks intersect `body`, skipping `exclude`
    pub fn entities_colliding_with(&self, body: &Body, exclude: &[EntityId]) -> Vec<SharedEntity> {
        self.find_entities_excluding(exclude, |e| e.body().is_collided_with(body))
    }

    pub fn is_shape_collided_with<P>(&self, shape: &Shape, mut predicate: P) -> bool
    where
        P: FnMut(&Entity) -> bool,
    {
        self.entities().iter().any(|e| {
            let entity = e.lock();
            entity.is_collided_with_shape(shape) && predicate(&entity)
        })
    }

    pub fn is_shape_collided_with_kind(&self, shape: &Shape, kind: &str) -> bool {
        self.entities_of_kind(kind)
            .iter()
            .any(|e| e.lock().is_collided_with_shape(shape))
    }

    /// Short-circuits on the first match
    pub fn is_body_collided_with<P>(&self, body: &Body, exclude: &[EntityId], mut predicate: P) -> bool
    where
        P: FnMut(&Entity) -> bool,
    {
        self.entities()
            .iter()
            .filter(|e| !exclude.contains(&e.id()))
            .any(|e| {
                let entity = e.lock();
                entity.body().is_collided_with(body) && predicate(&entity)
            })
    }

    pub fn is_body_collided_with_kind(&self, body: &Body, exclude: &[EntityId], kind: &str) -> bool {
        self.entities_of_kind(kind)
            .iter()
            .filter(|e| !exclude.contains(&e.id()))
            .any(|e| e.lock().body().is_collided_with(body))
    }

    /// Collision test for a live entity; the entity itself is never reported
    ///
    /// The entity is locked only to copy its body and released before the
    /// scan, so the caller must not be holding it.
    pub fn is_entity_collided_with<P>(&self, entity: &SharedEntity, predicate: P) -> bool
    where
        P: FnMut(&Entity) -> bool,
    {
        let body = entity.lock().body().clone();
        self.is_body_collided_with(&body, &[entity.id()], predicate)
    }

    pub fn is_entity_collided_with_kind(&self, entity: &SharedEntity, kind: &str) -> bool {
        let body = entity.lock().body().clone();
        self.is_body_collided_with_kind(&body, &[entity.id()], kind)
    }

    /// Manhattan distance between two live entities, locking each in turn
    pub fn entity_distance(&self, a: &SharedEntity, b: &SharedEntity) -> f64 {
        let from = a.lock().pos();
        let to = b.lock().pos();
        taxicab_distance(from, to)
    }
}

/// Manhattan distance between two positions
pub fn taxicab_distance(a: Pos, b: Pos) -> f64 {
    let d = a - b;
    d.x.abs() + d.y.abs()
}

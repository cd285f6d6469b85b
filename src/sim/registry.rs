//! Type-id → constructor table used by level loading and spawning

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

use super::entity::{Entity, EntityKind};

/// Builds an entity of the given kind at level coordinates
pub type Factory = Box<dyn Fn(EntityKind, f64, f64) -> Entity + Send + Sync>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpawnError {
    #[error("unknown entity type id {0}")]
    UnknownType(u32),
}

/// Data-driven entity registry
#[derive(Default)]
pub struct EntityRegistry {
    factories: HashMap<u32, (EntityKind, Factory)>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in kind (see [`crate::sim::kinds`])
    pub fn with_default_kinds() -> Self {
        let mut registry = Self::new();
        super::kinds::register_default_kinds(&mut registry);
        registry
    }

    /// Register (or replace) the constructor for `type_id`
    pub fn register<F>(&mut self, type_id: u32, name: &'static str, factory: F)
    where
        F: Fn(EntityKind, f64, f64) -> Entity + Send + Sync + 'static,
    {
        let kind = EntityKind::new(type_id, name);
        if let Some((old, _)) = self.factories.insert(type_id, (kind, Box::new(factory))) {
            log::warn!("Entity type {} ({}) replaced by {}", type_id, old.name, name);
        }
    }

    pub fn kind(&self, type_id: u32) -> Option<EntityKind> {
        self.factories.get(&type_id).map(|(kind, _)| *kind)
    }

    pub fn contains(&self, type_id: u32) -> bool {
        self.factories.contains_key(&type_id)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Construct an entity; unknown ids fail the call
    pub fn create(&self, type_id: u32, x: f64, y: f64) -> Result<Entity, SpawnError> {
        let (kind, factory) = self
            .factories
            .get(&type_id)
            .ok_or(SpawnError::UnknownType(type_id))?;
        Ok(factory(*kind, x, y))
    }
}

impl fmt::Debug for EntityRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.factories.values().map(|(kind, _)| *kind).collect();
        kinds.sort_by_key(|k| k.type_id);
        f.debug_struct("EntityRegistry").field("kinds", &kinds).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::Behavior;

    struct Inert;
    impl Behavior for Inert {}

    #[test]
    fn test_create_registered_kind() {
        let mut registry = EntityRegistry::new();
        registry.register(7, "crate", |kind, x, y| Entity::new(kind, x, y, Inert).with_depth(3));

        let e = registry.create(7, 1.0, 2.0).expect("registered");
        assert_eq!(e.kind(), EntityKind::new(7, "crate"));
        assert_eq!(e.depth(), 3);
        assert_eq!((e.pos().x, e.pos().y), (1.0, 2.0));
    }

    #[test]
    fn test_unknown_type_fails_loudly() {
        let registry = EntityRegistry::new();
        let err = registry.create(42, 0.0, 0.0).unwrap_err();
        assert_eq!(err, SpawnError::UnknownType(42));
        assert_eq!(err.to_string(), "unknown entity type id 42");
    }

    #[test]
    fn test_default_kinds_registered() {
        let registry = EntityRegistry::with_default_kinds();
        for type_id in 0..=6 {
            assert!(registry.contains(type_id), "missing type {type_id}");
        }
        assert_eq!(registry.len(), 7);
    }
}

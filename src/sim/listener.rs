//! Update listeners: everything advanced once per tick
//!
//! Entities that opt in are listeners; any other object can join through
//! [`SharedListener`]. Ordering uses an explicit `(is_entity, depth)` key so
//! entities always run before non-entity listeners.

use std::cmp::Reverse;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use super::entity::{EntityId, SharedEntity};
use super::lock;
use super::world::TickContext;

static NEXT_LISTENER_ID: AtomicU64 = AtomicU64::new(1);

/// A non-entity object advanced every tick
pub trait UpdateListener: Send {
    fn update(&mut self, ctx: &mut TickContext<'_>);
}

/// Shared handle to a non-entity listener
#[derive(Clone)]
pub struct SharedListener {
    id: u64,
    inner: Arc<Mutex<dyn UpdateListener>>,
}

impl SharedListener {
    pub fn new(listener: impl UpdateListener + 'static) -> Self {
        Self {
            id: NEXT_LISTENER_ID.fetch_add(1, Ordering::Relaxed),
            inner: Arc::new(Mutex::new(listener)),
        }
    }

    pub fn id(&self) -> ListenerId {
        ListenerId::Other(self.id)
    }
}

impl fmt::Debug for SharedListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedListener").field("id", &self.id).finish()
    }
}

/// Identity used by remove-listener commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerId {
    Entity(EntityId),
    Other(u64),
}

/// Sort key computed once per listener per resort
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerKey {
    pub is_entity: bool,
    /// Always 0 for non-entities, which compare equal among themselves
    pub depth: i32,
}

impl ListenerKey {
    /// Ascending order of this tuple is the update order
    pub fn order(self) -> (Reverse<bool>, Reverse<i32>) {
        (Reverse(self.is_entity), Reverse(self.depth))
    }
}

#[derive(Debug, Clone)]
pub enum Listener {
    Entity(SharedEntity),
    Other(SharedListener),
}

impl Listener {
    pub fn id(&self) -> ListenerId {
        match self {
            Listener::Entity(e) => ListenerId::Entity(e.id()),
            Listener::Other(l) => l.id(),
        }
    }

    pub fn entity(&self) -> Option<&SharedEntity> {
        match self {
            Listener::Entity(e) => Some(e),
            Listener::Other(_) => None,
        }
    }

    pub fn sort_key(&self) -> ListenerKey {
        match self {
            Listener::Entity(e) => ListenerKey {
                is_entity: true,
                depth: e.depth(),
            },
            Listener::Other(_) => ListenerKey {
                is_entity: false,
                depth: 0,
            },
        }
    }

    /// Advance this listener once; entity locks are held for the whole call
    pub fn update(&self, ctx: &mut TickContext<'_>) {
        match self {
            Listener::Entity(shared) => {
                let mut entity = shared.lock();
                ctx.enter(entity.contact());
                entity.tick(ctx);
                ctx.leave();
            }
            Listener::Other(other) => lock(&other.inner).update(ctx),
        }
    }
}

impl From<SharedListener> for Listener {
    fn from(listener: SharedListener) -> Self {
        Listener::Other(listener)
    }
}

//! Fixed-tick simulation module
//!
//! Everything that advances game state lives here:
//! - One designated apply point per tick for structural changes (commands)
//! - Stable depth ordering of entities and listeners
//! - A dedicated ticking thread that never overlaps itself
//! - No drawing or windowing dependencies

pub mod command;
pub mod entity;
pub mod event;
pub mod input;
pub mod kinds;
pub mod level;
pub mod listener;
pub mod overlay;
pub mod present;
pub mod query;
pub mod registry;
pub mod scheduler;
pub mod session;
pub mod world;

pub use command::{Command, CommandQueue};
pub use entity::{Behavior, Body, Contact, Entity, EntityId, EntityKind, SharedEntity};
pub use event::GameEvent;
pub use input::{KeyCode, Keyboard, PointerButton};
pub use level::{JsonLevelDir, Level, LevelObject, LevelSource, LoadError, MemoryLevels};
pub use listener::{Listener, ListenerId, SharedListener, UpdateListener};
pub use overlay::{CompletionOverlay, Overlay, OverlayAction, PauseOverlay};
pub use present::{ChannelPresenter, DrawItem, NullPresenter, Presenter};
pub use query::taxicab_distance;
pub use registry::{EntityRegistry, SpawnError};
pub use scheduler::{Scheduler, SchedulerHandle, Simulation};
pub use session::Session;
pub use world::{PAUSE_CONTROL, TickContext, World};

use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

// A panic on the ticking thread already shuts the game down, so readers keep
// going with whatever state the poisoned lock holds.

pub(crate) fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn read<T: ?Sized>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write<T: ?Sized>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

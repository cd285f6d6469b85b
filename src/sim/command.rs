//! Deferred structural mutations
//!
//! Adding or removing entities and listeners while the world iterates them
//! would corrupt that iteration, so every structural change is queued here
//! and applied by the world at one designated point of its tick.

use std::fmt;

use crossbeam_channel::{Receiver, Sender, unbounded};

use super::entity::{EntityId, SharedEntity};
use super::listener::{Listener, ListenerId};
use super::overlay::Overlay;

/// One pending structural change
pub enum Command {
    Add(SharedEntity),
    Remove(EntityId),
    AddListener(Listener),
    RemoveListener(ListenerId),
    /// Drop every entity and listener
    Clear,
    /// Replace the open overlay (`None` closes it)
    OpenOverlay(Option<Box<dyn Overlay>>),
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Add(e) => f.debug_tuple("Add").field(e).finish(),
            Command::Remove(id) => f.debug_tuple("Remove").field(id).finish(),
            Command::AddListener(l) => f.debug_tuple("AddListener").field(&l.id()).finish(),
            Command::RemoveListener(id) => f.debug_tuple("RemoveListener").field(id).finish(),
            Command::Clear => f.write_str("Clear"),
            Command::OpenOverlay(o) => f
                .debug_tuple("OpenOverlay")
                .field(&o.as_ref().map(|o| o.name()))
                .finish(),
        }
    }
}

/// Thread-safe FIFO of pending commands
///
/// Any thread may enqueue. Only the world drains, once per tick.
pub struct CommandQueue {
    tx: Sender<Command>,
    rx: Receiver<Command>,
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandQueue {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn enqueue(&self, command: Command) {
        // The receiver lives as long as the queue, so sending cannot fail
        let _ = self.tx.send(command);
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Apply, in FIFO order, exactly the commands present when the drain starts
    ///
    /// Commands enqueued by `apply` itself stay queued for the next drain.
    /// Returns how many commands were applied.
    pub fn drain_and_apply(&self, mut apply: impl FnMut(Command)) -> usize {
        let pending = self.rx.len();
        let mut applied = 0;
        for command in self.rx.try_iter().take(pending) {
            apply(command);
            applied += 1;
        }
        applied
    }
}

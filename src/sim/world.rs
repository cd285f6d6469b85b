//! The simulation world: live entities, listeners, pending commands
//!
//! One call to [`World::update_tick`] runs a fixed sequence:
//! 1. latch input
//! 2. tick every listener in committed order (skipped while paused)
//! 3. advance the open overlay
//! 4. request a redraw
//! 5. stable resort of entities by descending depth
//! 6. stable resort of listeners by `(is_entity, depth)`
//! 7. apply queued commands
//!
//! Sorting before applying commands means anything added during a tick first
//! takes part in the next one.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, RwLock};

use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::geom::{Pos, Rect};

use super::command::{Command, CommandQueue};
use super::entity::{Body, Contact, Entity, EntityId, SharedEntity};
use super::event::GameEvent;
use super::input::{KeyCode, Keyboard, PointerButton};
use super::level::Level;
use super::listener::{Listener, ListenerId, SharedListener, UpdateListener};
use super::overlay::{Overlay, OverlayAction, PauseOverlay};
use super::present::{DrawItem, NullPresenter, Presenter};
use super::registry::{EntityRegistry, SpawnError};
use super::{lock, read, write};

/// Screen region of the pause control (top-left corner, 16×16 icon)
pub const PAUSE_CONTROL: Rect = Rect::new(2.0, 2.0, 16.0, 16.0);

/// What a listener sees while it is being advanced
///
/// Entities whose locks are currently held by this tick (the ticking entity
/// and any entity being notified of a collision) are tracked here and
/// skipped by every query issued through the context.
pub struct TickContext<'a> {
    world: &'a World,
    input: &'a Keyboard,
    held: Vec<Contact>,
    held_ids: Vec<EntityId>,
}

impl<'a> TickContext<'a> {
    pub fn new(world: &'a World, input: &'a Keyboard) -> Self {
        Self {
            world,
            input,
            held: Vec::new(),
            held_ids: Vec::new(),
        }
    }

    pub fn input(&self) -> &'a Keyboard {
        self.input
    }

    /// The entity currently being advanced or notified
    pub fn actor(&self) -> Option<&Contact> {
        self.held.last()
    }

    pub(crate) fn enter(&mut self, contact: Contact) {
        self.held_ids.push(contact.id);
        self.held.push(contact);
    }

    pub(crate) fn leave(&mut self) {
        self.held.pop();
        self.held_ids.pop();
    }

    pub fn emit(&self, event: GameEvent) {
        self.world.emit(event);
    }

    pub fn level_size(&self) -> Option<(u32, u32)> {
        self.world.level_size()
    }

    // Structural changes only queue commands and never touch an entity lock

    pub fn enqueue(&self, command: Command) {
        self.world.enqueue(command);
    }

    pub fn add_entity(&self, entity: Entity) -> SharedEntity {
        self.world.add_entity(entity)
    }

    pub fn spawn(&self, type_id: u32, x: f64, y: f64) -> Result<SharedEntity, SpawnError> {
        self.world.spawn(type_id, x, y)
    }

    pub fn remove_entity(&self, id: EntityId) {
        self.world.remove_entity(id);
    }

    pub fn add_listener(&self, listener: impl UpdateListener + 'static) -> ListenerId {
        self.world.add_listener(listener)
    }

    /// Queue removal of the current actor
    pub fn remove_self(&self) {
        if let Some(actor) = self.actor() {
            self.world.remove_entity(actor.id);
        }
    }

    /// Live entities other than those held by this tick
    pub fn entities(&self) -> Vec<SharedEntity> {
        self.without_held(self.world.entities())
    }

    pub fn entities_of_kind(&self, kind: &str) -> Vec<SharedEntity> {
        self.without_held(self.world.entities_of_kind(kind))
    }

    fn without_held(&self, mut entities: Vec<SharedEntity>) -> Vec<SharedEntity> {
        entities.retain(|e| !self.held_ids.contains(&e.id()));
        entities
    }

    pub fn find_entities<P>(&self, predicate: P) -> Vec<SharedEntity>
    where
        P: FnMut(&Entity) -> bool,
    {
        self.world.find_entities_excluding(&self.held_ids, predicate)
    }

    pub fn colliding_with(&self, body: &Body) -> Vec<SharedEntity> {
        self.world.entities_colliding_with(body, &self.held_ids)
    }

    pub fn is_collided_with<P>(&self, body: &Body, predicate: P) -> bool
    where
        P: FnMut(&Entity) -> bool,
    {
        self.world.is_body_collided_with(body, &self.held_ids, predicate)
    }

    pub fn is_collided_with_kind(&self, body: &Body, kind: &str) -> bool {
        self.world.is_body_collided_with_kind(body, &self.held_ids, kind)
    }

    /// Notify every entity colliding with `body` that accepts collision events
    ///
    /// The notification names the current actor as the other party. Returns
    /// how many entities were notified.
    pub fn dispatch_collisions(&mut self, body: &Body) -> usize {
        let Some(actor) = self.actor().copied() else {
            return 0;
        };
        let source = Contact {
            pos: body.pos(),
            ..actor
        };

        let mut notified = 0;
        for target in self.colliding_with(body) {
            let mut entity = target.lock();
            if !entity.receives_collision_events() {
                continue;
            }
            self.enter(entity.contact());
            entity.on_collided_with(&source, self);
            self.leave();
            notified += 1;
        }
        notified
    }
}

/// Process-wide simulation state, shared between the ticking thread and the
/// presentation thread
pub struct World {
    entities: RwLock<Vec<SharedEntity>>,
    listeners: RwLock<Vec<Listener>>,
    commands: CommandQueue,
    paused: AtomicBool,
    overlay: Mutex<Option<Box<dyn Overlay>>>,
    input: Mutex<Keyboard>,
    events_tx: Sender<GameEvent>,
    events_rx: Receiver<GameEvent>,
    notices: Mutex<Vec<String>>,
    level_size: RwLock<Option<(u32, u32)>>,
    registry: EntityRegistry,
    presenter: Box<dyn Presenter>,
    ticks: AtomicU64,
}

impl World {
    pub fn new(registry: EntityRegistry, presenter: Box<dyn Presenter>) -> Self {
        let (events_tx, events_rx) = unbounded();
        Self {
            entities: RwLock::new(Vec::new()),
            listeners: RwLock::new(Vec::new()),
            commands: CommandQueue::new(),
            paused: AtomicBool::new(false),
            overlay: Mutex::new(None),
            input: Mutex::new(Keyboard::with_default_bindings()),
            events_tx,
            events_rx,
            notices: Mutex::new(Vec::new()),
            level_size: RwLock::new(None),
            registry,
            presenter,
            ticks: AtomicU64::new(0),
        }
    }

    /// World without a presenter (tests, tools)
    pub fn headless(registry: EntityRegistry) -> Self {
        Self::new(registry, Box::new(NullPresenter))
    }

    /// Replace the key binding table
    pub fn with_keyboard(self, keyboard: Keyboard) -> Self {
        *lock(&self.input) = keyboard;
        self
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    // === Structural changes (all deferred) ===

    pub fn enqueue(&self, command: Command) {
        self.commands.enqueue(command);
    }

    pub fn pending_commands(&self) -> usize {
        self.commands.len()
    }

    /// Queue an entity (and its listener registration when it listens)
    pub fn add_entity(&self, entity: Entity) -> SharedEntity {
        let listens = entity.listens();
        let shared = SharedEntity::new(entity);
        self.enqueue(Command::Add(shared.clone()));
        if listens {
            self.enqueue(Command::AddListener(Listener::Entity(shared.clone())));
        }
        shared
    }

    /// Construct through the registry and queue the result
    pub fn spawn(&self, type_id: u32, x: f64, y: f64) -> Result<SharedEntity, SpawnError> {
        let entity = self.registry.create(type_id, x, y)?;
        Ok(self.add_entity(entity))
    }

    pub fn remove_entity(&self, id: EntityId) {
        self.enqueue(Command::Remove(id));
        self.enqueue(Command::RemoveListener(ListenerId::Entity(id)));
    }

    pub fn add_listener(&self, listener: impl UpdateListener + 'static) -> ListenerId {
        let shared = SharedListener::new(listener);
        let id = shared.id();
        self.enqueue(Command::AddListener(shared.into()));
        id
    }

    pub fn remove_listener(&self, id: ListenerId) {
        self.enqueue(Command::RemoveListener(id));
    }

    pub fn clear(&self) {
        self.enqueue(Command::Clear);
    }

    /// Replace the world's contents with a level
    ///
    /// Every entity is constructed before anything is queued, so an unknown
    /// type id fails the call and leaves the world as it was.
    pub fn load_level(&self, level: &Level) -> Result<(), SpawnError> {
        let entities = level
            .objects
            .iter()
            .map(|o| self.registry.create(o.id, o.x, o.y))
            .collect::<Result<Vec<_>, _>>()?;

        self.clear();
        for entity in entities {
            self.add_entity(entity);
        }
        *write(&self.level_size) = Some((level.width, level.height));

        log::info!(
            "Loaded level {}x{} with {} objects",
            level.width,
            level.height,
            level.objects.len()
        );
        Ok(())
    }

    /// Width and height of the current level
    pub fn level_size(&self) -> Option<(u32, u32)> {
        *read(&self.level_size)
    }

    // === Pause and overlays ===

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    pub fn pause(&self) {
        self.paused.store(true, Ordering::Release);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::Release);
    }

    /// Open an overlay at the end of the current tick
    pub fn open_overlay(&self, overlay: Box<dyn Overlay>) {
        self.enqueue(Command::OpenOverlay(Some(overlay)));
    }

    pub fn close_overlay(&self) {
        self.enqueue(Command::OpenOverlay(None));
    }

    pub fn overlay_name(&self) -> Option<&'static str> {
        lock(&self.overlay).as_ref().map(|o| o.name())
    }

    /// Whether the presenter should draw the level under the overlay
    pub fn draws_level(&self) -> bool {
        lock(&self.overlay)
            .as_ref()
            .is_none_or(|o| o.draws_level_background())
    }

    fn replace_overlay(&self, overlay: Option<Box<dyn Overlay>>) {
        let mut current = lock(&self.overlay);
        if let Some(mut old) = current.take() {
            old.on_closed();
            log::debug!("Closed overlay {}", old.name());
        }
        let pauses = overlay.as_ref().is_some_and(|o| o.pauses_game());
        self.paused.store(pauses, Ordering::Release);
        if let Some(o) = overlay.as_ref() {
            log::debug!("Opened overlay {} (pauses: {})", o.name(), pauses);
        }
        *current = overlay;
    }

    fn update_overlay(&self, input: &Keyboard) {
        let action = lock(&self.overlay).as_mut().map(|o| o.update_tick(input));
        if action == Some(OverlayAction::Close) {
            self.close_overlay();
        }
    }

    // === Input (presentation thread) ===

    pub fn key_pressed(&self, key: KeyCode) {
        lock(&self.input).key_pressed(key);
    }

    pub fn key_released(&self, key: KeyCode) {
        lock(&self.input).key_released(key);
    }

    pub fn focus_lost(&self) {
        lock(&self.input).clear_keys();
    }

    pub fn register_binding(&self, name: &str, key: KeyCode) {
        lock(&self.input).register_binding(name, key);
    }

    /// Forward to the open overlay, or hit-test the pause control
    pub fn pointer_pressed(&self, x: i32, y: i32, button: PointerButton) {
        if let Some(overlay) = lock(&self.overlay).as_mut() {
            overlay.pointer_pressed(x, y, button);
            return;
        }
        if button == PointerButton::Primary && PAUSE_CONTROL.contains(Pos::new(x as f64, y as f64)) {
            self.open_overlay(Box::new(PauseOverlay::new()));
        }
    }

    pub fn pointer_released(&self, x: i32, y: i32, button: PointerButton) {
        if let Some(overlay) = lock(&self.overlay).as_mut() {
            overlay.pointer_released(x, y, button);
        }
    }

    pub fn scrolled(&self, amount: f32) {
        if let Some(overlay) = lock(&self.overlay).as_mut() {
            overlay.scrolled(amount);
        }
    }

    // === Events and notices ===

    pub fn emit(&self, event: GameEvent) {
        // Receiver is owned by the world
        let _ = self.events_tx.send(event);
    }

    pub fn drain_events(&self) -> Vec<GameEvent> {
        self.events_rx.try_iter().collect()
    }

    /// Raise a user-visible message (recovered failures)
    pub fn notify(&self, message: impl Into<String>) {
        lock(&self.notices).push(message.into());
    }

    pub fn take_notices(&self) -> Vec<String> {
        std::mem::take(&mut *lock(&self.notices))
    }

    // === Reads ===

    /// Point-in-time copy of the live entity sequence
    pub fn entities(&self) -> Vec<SharedEntity> {
        read(&self.entities).clone()
    }

    pub fn entity_count(&self) -> usize {
        read(&self.entities).len()
    }

    /// Point-in-time copy of the live listener sequence
    pub fn listeners(&self) -> Vec<Listener> {
        read(&self.listeners).clone()
    }

    /// Depth-ordered draw data for the presenter
    pub fn snapshot(&self) -> Vec<DrawItem> {
        self.entities().iter().map(|e| e.lock().draw_item()).collect()
    }

    pub fn tick_count(&self) -> u64 {
        self.ticks.load(Ordering::Acquire)
    }

    // === Tick ===

    /// Advance the simulation by one fixed tick
    pub fn update_tick(&self) {
        let input = {
            let mut keyboard = lock(&self.input);
            keyboard.update_tick();
            keyboard.clone()
        };

        if !self.is_paused() {
            let mut ctx = TickContext::new(self, &input);
            for listener in self.listeners() {
                listener.update(&mut ctx);
            }
        }

        self.update_overlay(&input);
        self.presenter.request_redraw();

        self.sort_entities();
        self.sort_listeners();
        let applied = self.apply_commands();

        let tick = self.ticks.fetch_add(1, Ordering::AcqRel) + 1;
        if applied > 0 {
            log::trace!("Tick {}: applied {} commands", tick, applied);
        }
    }

    // Keys are gathered from a snapshot first so no entity lock is taken while
    // a sequence is write-locked. Only this thread changes the sequences, so
    // the snapshot holds exactly the sorted items.

    fn sort_entities(&self) {
        let depths: HashMap<EntityId, i32> =
            self.entities().iter().map(|e| (e.id(), e.depth())).collect();
        write(&self.entities).sort_by_key(|e| Reverse(depths.get(&e.id()).copied().unwrap_or(0)));
    }

    fn sort_listeners(&self) {
        let keys: HashMap<ListenerId, _> = self
            .listeners()
            .iter()
            .map(|l| (l.id(), l.sort_key().order()))
            .collect();
        write(&self.listeners).sort_by_key(|l| keys.get(&l.id()).copied());
    }

    /// Both sequences stay write-locked for the whole drain, so readers see
    /// either the pre-drain or the post-drain state
    fn apply_commands(&self) -> usize {
        if self.commands.is_empty() {
            return 0;
        }
        let mut entities = write(&self.entities);
        let mut listeners = write(&self.listeners);
        self.commands.drain_and_apply(|command| match command {
            Command::Add(entity) => entities.push(entity),
            Command::Remove(id) => {
                if let Some(i) = entities.iter().position(|e| e.id() == id) {
                    entities.remove(i);
                }
            }
            Command::AddListener(listener) => listeners.push(listener),
            Command::RemoveListener(id) => {
                if let Some(i) = listeners.iter().position(|l| l.id() == id) {
                    listeners.remove(i);
                }
            }
            Command::Clear => {
                entities.clear();
                listeners.clear();
            }
            Command::OpenOverlay(overlay) => self.replace_overlay(overlay),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::CollisionMask;
    use crate::sim::entity::{Behavior, EntityKind};
    use crate::sim::input::keys;
    use crate::sim::level::LevelObject;
    use std::sync::Arc;

    const DUMMY: EntityKind = EntityKind::new(100, "dummy");

    struct Inert;
    impl Behavior for Inert {}

    struct Silent;
    impl Behavior for Silent {
        fn listens(&self) -> bool {
            false
        }
    }

    fn world() -> World {
        World::headless(EntityRegistry::with_default_kinds())
    }

    fn dummy(depth: i32) -> Entity {
        Entity::new(DUMMY, 0.0, 0.0, Inert).with_depth(depth)
    }

    fn ids(entities: &[SharedEntity]) -> Vec<EntityId> {
        entities.iter().map(SharedEntity::id).collect()
    }

    /// Records the live entity ids every time it is advanced
    struct Observer(Arc<Mutex<Vec<Vec<EntityId>>>>);
    impl UpdateListener for Observer {
        fn update(&mut self, ctx: &mut TickContext<'_>) {
            let seen = ids(&ctx.entities());
            self.0.lock().expect("observer log").push(seen);
        }
    }

    /// Spawns one deep entity on its first update
    struct Spawner(Arc<Mutex<Option<EntityId>>>);
    impl UpdateListener for Spawner {
        fn update(&mut self, ctx: &mut TickContext<'_>) {
            let mut spawned = self.0.lock().expect("spawner slot");
            if spawned.is_none() {
                *spawned = Some(ctx.add_entity(dummy(100)).id());
            }
        }
    }

    struct Counter(Arc<AtomicU64>);
    impl UpdateListener for Counter {
        fn update(&mut self, _ctx: &mut TickContext<'_>) {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn test_added_entity_appears_after_drain() {
        let world = world();
        let e = world.add_entity(dummy(0));
        assert_eq!(world.entity_count(), 0);
        assert_eq!(world.pending_commands(), 2);

        world.update_tick();
        assert_eq!(ids(&world.entities()), vec![e.id()]);
        assert_eq!(world.listeners().len(), 1);
        assert_eq!(world.tick_count(), 1);
    }

    #[test]
    fn test_non_listening_entity_is_not_a_listener() {
        let world = world();
        world.add_entity(Entity::new(DUMMY, 0.0, 0.0, Silent));
        world.update_tick();
        assert_eq!(world.entity_count(), 1);
        assert!(world.listeners().is_empty());
    }

    #[test]
    fn test_entity_added_mid_tick_joins_next_tick() {
        let world = world();
        let existing = world.add_entity(dummy(1));
        let log = Arc::new(Mutex::new(Vec::new()));
        let spawned = Arc::new(Mutex::new(None));
        world.add_listener(Spawner(Arc::clone(&spawned)));
        world.add_listener(Observer(Arc::clone(&log)));
        world.update_tick(); // applies the setup commands

        world.update_tick(); // spawner enqueues here
        let new_id = spawned.lock().expect("slot").expect("spawned");
        // Applied after this tick's sort: appended behind the shallower entity
        assert_eq!(ids(&world.entities()), vec![existing.id(), new_id]);

        world.update_tick();
        // Now sorted by depth
        assert_eq!(ids(&world.entities()), vec![new_id, existing.id()]);

        let log = log.lock().expect("log");
        assert_eq!(log[0], vec![existing.id()], "absent during the spawning tick");
        assert_eq!(log[1], vec![existing.id(), new_id], "present the tick after");
    }

    #[test]
    fn test_depth_sort_is_stable() {
        let world = world();
        let depths = [1, 3, 1, 3, 2];
        let added: Vec<_> = depths.iter().map(|&d| world.add_entity(dummy(d))).collect();
        world.update_tick();
        world.update_tick();

        let expected = vec![added[1].id(), added[3].id(), added[4].id(), added[0].id(), added[2].id()];
        assert_eq!(ids(&world.entities()), expected);

        for _ in 0..5 {
            world.update_tick();
            assert_eq!(ids(&world.entities()), expected);
        }
    }

    #[test]
    fn test_listener_order_puts_entities_first() {
        let world = world();
        let count = Arc::new(AtomicU64::new(0));
        let first = world.add_listener(Counter(Arc::clone(&count)));
        let shallow = world.add_entity(dummy(1));
        let second = world.add_listener(Counter(Arc::clone(&count)));
        let deep = world.add_entity(dummy(5));
        world.update_tick();
        world.update_tick();

        let order: Vec<_> = world.listeners().iter().map(Listener::id).collect();
        assert_eq!(
            order,
            vec![
                ListenerId::Entity(deep.id()),
                ListenerId::Entity(shallow.id()),
                first,
                second,
            ]
        );
        assert_eq!(count.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_pause_skips_listeners() {
        let world = world();
        let count = Arc::new(AtomicU64::new(0));
        world.add_listener(Counter(Arc::clone(&count)));
        world.update_tick();

        world.pause();
        world.update_tick();
        assert_eq!(count.load(Ordering::Relaxed), 0);

        world.resume();
        world.update_tick();
        assert_eq!(count.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_remove_entity_drops_listener_too() {
        let world = world();
        let e = world.add_entity(dummy(0));
        world.update_tick();
        world.remove_entity(e.id());
        assert_eq!(world.entity_count(), 1);
        world.update_tick();
        assert_eq!(world.entity_count(), 0);
        assert!(world.listeners().is_empty());
    }

    #[test]
    fn test_overlay_open_is_deferred_and_pauses() {
        let world = world();
        world.open_overlay(Box::new(PauseOverlay::new()));
        assert!(!world.is_paused());
        assert_eq!(world.overlay_name(), None);

        world.update_tick();
        assert!(world.is_paused());
        assert_eq!(world.overlay_name(), Some("pause"));

        world.key_pressed(keys::ESCAPE);
        world.update_tick();
        assert!(!world.is_paused());
        assert_eq!(world.overlay_name(), None);
    }

    #[test]
    fn test_pause_control_hit_test() {
        let world = world();
        world.pointer_pressed(100, 100, PointerButton::Primary);
        world.pointer_pressed(5, 5, PointerButton::Secondary);
        world.update_tick();
        assert_eq!(world.overlay_name(), None);

        world.pointer_pressed(5, 5, PointerButton::Primary);
        world.update_tick();
        assert_eq!(world.overlay_name(), Some("pause"));
        assert!(world.is_paused());
    }

    #[test]
    fn test_load_level_with_unknown_type_leaves_world_untouched() {
        let world = world();
        world.add_entity(dummy(0));
        world.update_tick();

        let level = Level {
            width: 64,
            height: 64,
            objects: vec![
                LevelObject { id: 0, x: 0.0, y: 0.0 },
                LevelObject { id: 999, x: 0.0, y: 0.0 },
            ],
        };
        assert_eq!(world.load_level(&level), Err(SpawnError::UnknownType(999)));
        assert_eq!(world.pending_commands(), 0);
        assert_eq!(world.level_size(), None);
        world.update_tick();
        assert_eq!(world.entity_count(), 1);
    }

    #[test]
    fn test_load_level_replaces_contents() {
        let world = world();
        world.add_entity(dummy(0));
        world.update_tick();

        let level = Level {
            width: 320,
            height: 240,
            objects: vec![
                LevelObject { id: 0, x: 0.0, y: 200.0 },
                LevelObject { id: 0, x: 32.0, y: 200.0 },
            ],
        };
        world.load_level(&level).expect("known kinds");
        assert_eq!(world.level_size(), Some((320, 240)));
        world.update_tick();

        let kinds: Vec<_> = world.entities().iter().map(|e| e.kind().name).collect();
        assert_eq!(kinds, vec!["wall", "wall"]);
    }

    #[test]
    fn test_snapshot_follows_depth_order() {
        let world = world();
        world.add_entity(dummy(1).with_mask(CollisionMask::rect(4.0, 4.0)));
        world.add_entity(dummy(9));
        world.update_tick();
        world.update_tick();

        let depths: Vec<_> = world.snapshot().iter().map(|d| d.depth).collect();
        assert_eq!(depths, vec![9, 1]);
    }

    #[test]
    fn test_events_and_notices_drain_once() {
        let world = world();
        world.emit(GameEvent::StarCollected(1));
        world.emit(GameEvent::LevelComplete);
        assert_eq!(
            world.drain_events(),
            vec![GameEvent::StarCollected(1), GameEvent::LevelComplete]
        );
        assert!(world.drain_events().is_empty());

        world.notify("disk full");
        assert_eq!(world.take_notices(), vec!["disk full".to_string()]);
        assert!(world.take_notices().is_empty());
    }

    /// Notifies everything it overlaps and records how many accepted
    struct Bumper(Arc<AtomicU64>);
    impl Behavior for Bumper {
        fn tick(&mut self, body: &mut Body, ctx: &mut TickContext<'_>) {
            let notified = ctx.dispatch_collisions(body);
            self.0.store(notified as u64, Ordering::Relaxed);
        }
    }

    struct Target {
        hits: Arc<AtomicU64>,
        accepts: bool,
    }
    impl Behavior for Target {
        fn on_collided_with(&mut self, _body: &mut Body, other: &Contact, _ctx: &mut TickContext<'_>) {
            assert_eq!(other.kind, DUMMY);
            self.hits.fetch_add(1, Ordering::Relaxed);
        }

        fn receives_collision_events(&self) -> bool {
            self.accepts
        }

        fn listens(&self) -> bool {
            false
        }
    }

    fn target(x: f64, hits: &Arc<AtomicU64>, accepts: bool) -> Entity {
        let behavior = Target {
            hits: Arc::clone(hits),
            accepts,
        };
        Entity::new(DUMMY, x, x, behavior).with_mask(CollisionMask::rect(10.0, 10.0))
    }

    #[test]
    fn test_dispatch_skips_entities_that_opt_out() {
        let world = world();
        let notified = Arc::new(AtomicU64::new(u64::MAX));
        let receiver = Arc::new(AtomicU64::new(0));
        let opted_out = Arc::new(AtomicU64::new(0));
        let distant = Arc::new(AtomicU64::new(0));

        world.add_entity(
            Entity::new(DUMMY, 0.0, 0.0, Bumper(Arc::clone(&notified))).with_mask(CollisionMask::rect(10.0, 10.0)),
        );
        world.add_entity(target(5.0, &receiver, true));
        world.add_entity(target(2.0, &opted_out, false));
        world.add_entity(target(50.0, &distant, true));
        world.update_tick();

        world.update_tick();
        assert_eq!(notified.load(Ordering::Relaxed), 1);
        assert_eq!(receiver.load(Ordering::Relaxed), 1);
        assert_eq!(opted_out.load(Ordering::Relaxed), 0);
        assert_eq!(distant.load(Ordering::Relaxed), 0);
    }

    /// Locks every entity the context hands it, which would hang on its own
    struct Census(Arc<Mutex<Vec<EntityId>>>);
    impl Behavior for Census {
        fn tick(&mut self, _body: &mut Body, ctx: &mut TickContext<'_>) {
            let seen: Vec<_> = ctx.entities().iter().map(|e| e.lock().id()).collect();
            *self.0.lock().expect("census log") = seen;
        }
    }

    #[test]
    fn test_tick_context_hides_the_actor() {
        let world = world();
        let log = Arc::new(Mutex::new(Vec::new()));
        let census = world.add_entity(Entity::new(DUMMY, 0.0, 0.0, Census(Arc::clone(&log))));
        let other = world.add_entity(Entity::new(DUMMY, 0.0, 0.0, Silent));
        world.update_tick();

        world.update_tick();
        assert_eq!(*log.lock().expect("census log"), vec![other.id()]);
        assert_eq!(world.entity_count(), 2);
        assert!(ids(&world.entities()).contains(&census.id()));
    }
}

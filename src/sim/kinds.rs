//! Built-in entity kinds and their level-file type ids

use crate::geom::{CollisionMask, Shape};

use super::entity::{Behavior, Body, Contact, Entity, EntityKind};
use super::event::GameEvent;
use super::input::bindings;
use super::registry::EntityRegistry;
use super::world::TickContext;

pub const WALL_ID: u32 = 0;
pub const PLAYER_ID: u32 = 1;
/// Stars take three consecutive ids, one per star slot
pub const STAR_BASE_ID: u32 = 2;
pub const GOAL_ID: u32 = 5;
pub const PATROLLER_ID: u32 = 6;

pub const WALL: &str = "wall";
pub const PLAYER: &str = "player";
pub const STAR: &str = "star";
pub const GOAL: &str = "goal";
pub const PATROLLER: &str = "patroller";

pub const STARS_PER_LEVEL: u8 = 3;

pub const TILE_SIZE: f64 = 32.0;

const PLAYER_WIDTH: f64 = 16.0;
const PLAYER_HEIGHT: f64 = 24.0;
const PLAYER_DEPTH: i32 = 10;
const WALK_SPEED: f64 = 3.0;
const GRAVITY: f64 = 0.5;
const MAX_FALL_SPEED: f64 = 8.0;
const JUMP_SPEED: f64 = 8.0;

const STAR_DEPTH: i32 = 5;
const STAR_FRAMES: u32 = 8;
const TICKS_PER_FRAME: u32 = 4;

const PATROL_SPEED: f64 = 1.5;

pub fn register_default_kinds(registry: &mut EntityRegistry) {
    registry.register(WALL_ID, WALL, wall);
    registry.register(PLAYER_ID, PLAYER, player);
    for index in 0..STARS_PER_LEVEL {
        registry.register(STAR_BASE_ID + u32::from(index), STAR, move |kind, x, y| star(kind, x, y, index));
    }
    registry.register(GOAL_ID, GOAL, goal);
    registry.register(PATROLLER_ID, PATROLLER, patroller);
}

pub fn wall(kind: EntityKind, x: f64, y: f64) -> Entity {
    Entity::new(kind, x, y, Wall).with_mask(CollisionMask::rect(TILE_SIZE, TILE_SIZE))
}

pub fn player(kind: EntityKind, x: f64, y: f64) -> Entity {
    Entity::new(kind, x, y, Player::default())
        .with_depth(PLAYER_DEPTH)
        .with_mask(CollisionMask::rect(PLAYER_WIDTH, PLAYER_HEIGHT))
}

pub fn star(kind: EntityKind, x: f64, y: f64, index: u8) -> Entity {
    let outline = Shape::polygon(&[(8.0, 0.0), (16.0, 16.0), (0.0, 16.0)]);
    Entity::new(kind, x, y, Star::new(index))
        .with_depth(STAR_DEPTH)
        .with_mask(CollisionMask::new(outline))
        .with_fast_collision(false)
}

pub fn goal(kind: EntityKind, x: f64, y: f64) -> Entity {
    Entity::new(kind, x, y, Goal::default()).with_mask(CollisionMask::rect(TILE_SIZE, TILE_SIZE))
}

pub fn patroller(kind: EntityKind, x: f64, y: f64) -> Entity {
    let diamond = Shape::polygon(&[(8.0, 0.0), (16.0, 8.0), (8.0, 16.0), (0.0, 8.0)]);
    Entity::new(kind, x, y, Patroller::default()).with_mask(CollisionMask::new(diamond))
}

/// Static level geometry
struct Wall;

impl Behavior for Wall {
    fn listens(&self) -> bool {
        false
    }
}

/// Move along one axis in unit steps, stopping flush against walls
///
/// Returns false when a wall cut the move short.
fn move_blocked_by_walls(body: &mut Body, ctx: &TickContext<'_>, dx: f64, dy: f64) -> bool {
    let distance = dx.abs().max(dy.abs());
    if distance == 0.0 {
        return true;
    }
    let (ux, uy) = (dx / distance, dy / distance);
    let mut moved = 0.0;
    while moved < distance {
        let step = (distance - moved).min(1.0);
        body.move_by(ux * step, uy * step);
        if ctx.is_collided_with_kind(body, WALL) {
            body.move_by(-ux * step, -uy * step);
            return false;
        }
        moved += step;
    }
    true
}

#[derive(Debug, Default)]
struct Player {
    vel_y: f64,
    facing_left: bool,
    dead: bool,
}

impl Player {
    fn on_ground(body: &Body, ctx: &TickContext<'_>) -> bool {
        let mut below = body.clone();
        below.move_by(0.0, 1.0);
        ctx.is_collided_with_kind(&below, WALL)
    }

    fn out_of_level(body: &Body, ctx: &TickContext<'_>) -> bool {
        ctx.level_size().is_some_and(|(_, height)| body.y() > f64::from(height))
    }
}

impl Behavior for Player {
    fn tick(&mut self, body: &mut Body, ctx: &mut TickContext<'_>) {
        if self.dead {
            return;
        }
        let input = ctx.input();

        let mut dx = 0.0;
        if input.is_down(bindings::MOVE_LEFT) {
            dx -= WALK_SPEED;
            self.facing_left = true;
        }
        if input.is_down(bindings::MOVE_RIGHT) {
            dx += WALK_SPEED;
            self.facing_left = false;
        }
        move_blocked_by_walls(body, ctx, dx, 0.0);

        if input.is_just_pressed(bindings::JUMP) && Self::on_ground(body, ctx) {
            self.vel_y = -JUMP_SPEED;
        }
        self.vel_y = (self.vel_y + GRAVITY).min(MAX_FALL_SPEED);
        if !move_blocked_by_walls(body, ctx, 0.0, self.vel_y) {
            self.vel_y = 0.0;
        }

        ctx.dispatch_collisions(body);

        if ctx.is_collided_with_kind(body, PATROLLER) || Self::out_of_level(body, ctx) {
            self.dead = true;
            log::debug!("Player died at ({:.1}, {:.1})", body.x(), body.y());
            ctx.emit(GameEvent::PlayerDied);
        }
    }

    fn draw_variant(&self) -> u32 {
        u32::from(self.facing_left)
    }
}

/// Collectible; one of three per level
#[derive(Debug)]
struct Star {
    index: u8,
    ticks: u32,
    collected: bool,
}

impl Star {
    fn new(index: u8) -> Self {
        Self {
            index,
            ticks: 0,
            collected: false,
        }
    }
}

impl Behavior for Star {
    fn tick(&mut self, _body: &mut Body, _ctx: &mut TickContext<'_>) {
        self.ticks = (self.ticks + 1) % (STAR_FRAMES * TICKS_PER_FRAME);
    }

    fn on_collided_with(&mut self, _body: &mut Body, other: &Contact, ctx: &mut TickContext<'_>) {
        if self.collected || other.kind.name != PLAYER {
            return;
        }
        self.collected = true;
        ctx.emit(GameEvent::StarCollected(self.index));
        ctx.remove_self();
    }

    fn draw_variant(&self) -> u32 {
        self.ticks / TICKS_PER_FRAME
    }
}

#[derive(Debug, Default)]
struct Goal {
    reached: bool,
}

impl Behavior for Goal {
    fn on_collided_with(&mut self, _body: &mut Body, other: &Contact, ctx: &mut TickContext<'_>) {
        if !self.reached && other.kind.name == PLAYER {
            self.reached = true;
            ctx.emit(GameEvent::LevelComplete);
        }
    }

    fn listens(&self) -> bool {
        false
    }
}

/// Walks back and forth between walls
#[derive(Debug, Default)]
struct Patroller {
    reversed: bool,
}

impl Behavior for Patroller {
    fn tick(&mut self, body: &mut Body, ctx: &mut TickContext<'_>) {
        let dx = if self.reversed { -PATROL_SPEED } else { PATROL_SPEED };
        if !move_blocked_by_walls(body, ctx, dx, 0.0) {
            self.reversed = !self.reversed;
        }
    }

    fn receives_collision_events(&self) -> bool {
        false
    }

    fn draw_variant(&self) -> u32 {
        u32::from(self.reversed)
    }
}

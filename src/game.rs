//! A world and the session driving it, ticked together

use std::sync::Arc;

use crate::sim::{LoadError, Session, Simulation, World};

pub struct Game {
    world: Arc<World>,
    session: Session,
}

impl Game {
    pub fn new(world: Arc<World>, session: Session) -> Self {
        Self { world, session }
    }

    /// Handle for the presentation thread
    pub fn world(&self) -> &Arc<World> {
        &self.world
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn start(&mut self, level: usize) -> Result<(), LoadError> {
        self.session.load_level(&self.world, level)
    }
}

impl Simulation for Game {
    /// Tick the world, then react to the events it raised
    fn update_tick(&mut self) {
        self.world.update_tick();
        self.session.process_events(&self.world);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Profiles;
    use crate::sim::{EntityRegistry, GameEvent, Level, MemoryLevels};

    #[test]
    fn test_game_reacts_to_events_after_tick() {
        let world = Arc::new(World::headless(EntityRegistry::with_default_kinds()));
        let levels = MemoryLevels::new(vec![Level::demo(), Level::demo()]);
        let session = Session::new(Box::new(levels), Profiles::in_memory(), "ada");
        let mut game = Game::new(Arc::clone(&world), session);
        game.start(0).expect("demo level");

        game.update_tick();
        assert!(world.entity_count() > 0);

        world.emit(GameEvent::LevelComplete);
        game.update_tick();
        assert_eq!(game.session().current_level(), 1);
    }

    #[test]
    fn test_start_out_of_range_fails() {
        let world = Arc::new(World::headless(EntityRegistry::with_default_kinds()));
        let session = Session::new(Box::new(MemoryLevels::default()), Profiles::in_memory(), "ada");
        let mut game = Game::new(world, session);
        assert!(matches!(game.start(0), Err(LoadError::NotFound(0))));
    }
}

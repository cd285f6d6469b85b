//! Level progression for one player
//!
//! Turns the world's game events into level loads, profile updates and the
//! end-of-game overlay.

use crate::profile::{Profile, Profiles, STARS_PER_LEVEL};

use super::event::GameEvent;
use super::level::{Level, LevelSource, LoadError};
use super::overlay::CompletionOverlay;
use super::world::World;

pub const SAVE_FAILED_NOTICE: &str = "An error occurred while saving to profiles file.";

pub struct Session {
    levels: Box<dyn LevelSource>,
    profiles: Profiles,
    profile_name: String,
    current_level: usize,
    /// Stars collected since this level was last loaded by index
    stars: [bool; STARS_PER_LEVEL],
    current: Option<Level>,
}

impl Session {
    pub fn new(levels: Box<dyn LevelSource>, mut profiles: Profiles, profile_name: impl Into<String>) -> Self {
        let profile_name = profile_name.into();
        profiles.get_or_create(&profile_name);
        Self {
            levels,
            profiles,
            profile_name,
            current_level: 0,
            stars: [false; STARS_PER_LEVEL],
            current: None,
        }
    }

    pub fn current_level(&self) -> usize {
        self.current_level
    }

    pub fn level_count(&self) -> usize {
        self.levels.count()
    }

    pub fn stars(&self) -> [bool; STARS_PER_LEVEL] {
        self.stars
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profiles.get(&self.profile_name)
    }

    pub fn profiles(&self) -> &Profiles {
        &self.profiles
    }

    /// Load level `index` into the world
    ///
    /// On failure the world and the session are left as they were.
    pub fn load_level(&mut self, world: &World, index: usize) -> Result<(), LoadError> {
        let level = self.levels.load(index)?;
        world.load_level(&level)?;
        self.stars = [false; STARS_PER_LEVEL];
        self.current_level = index;
        self.current = Some(level);
        log::info!("Level {} started", index);
        Ok(())
    }

    /// Reload the current level; stars collected so far are kept
    pub fn restart_level(&mut self, world: &World) -> Result<(), LoadError> {
        let Some(level) = self.current.as_ref() else {
            return self.load_level(world, self.current_level);
        };
        world.load_level(level)?;
        log::debug!("Level {} restarted", self.current_level);
        Ok(())
    }

    pub fn complete_star(&mut self, index: usize) {
        if let Some(star) = self.stars.get_mut(index) {
            *star = true;
        }
    }

    /// Record progress, persist it, then move on
    pub fn complete_level(&mut self, world: &World) -> Result<(), LoadError> {
        let level = self.current_level;
        let stars = self.stars;
        let profile = self.profiles.get_or_create(&self.profile_name);
        profile.complete_level(level);
        for (i, _) in stars.iter().enumerate().filter(|&(_, &got)| got) {
            profile.obtain_star(level, i);
        }

        if let Err(e) = self.profiles.save() {
            log::error!("Failed to save profiles: {}", e);
            world.notify(SAVE_FAILED_NOTICE);
        }

        if level + 1 >= self.levels.count() {
            self.complete_game(world);
            Ok(())
        } else {
            self.load_level(world, level + 1)
        }
    }

    pub fn complete_game(&self, world: &World) {
        log::info!("All {} levels complete", self.levels.count());
        world.open_overlay(Box::new(CompletionOverlay));
    }

    /// React to everything the last tick emitted
    pub fn process_events(&mut self, world: &World) {
        for event in world.drain_events() {
            let result = match event {
                GameEvent::StarCollected(i) => {
                    self.complete_star(usize::from(i));
                    Ok(())
                }
                GameEvent::LevelComplete => self.complete_level(world),
                GameEvent::PlayerDied => self.restart_level(world),
            };
            if let Err(e) = result {
                log::error!("Could not handle {:?}: {}", event, e);
            }
        }
    }
}

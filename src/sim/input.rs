//! Keyboard and pointer state fed by the presentation thread
//!
//! Key presses arriving between two ticks are latched so even a tap shorter
//! than a tick is seen by exactly one tick as "just pressed".

use std::collections::{HashMap, HashSet};

/// Platform key code (AWT virtual key numbering)
pub type KeyCode = u32;

/// Common key codes
pub mod keys {
    use super::KeyCode;

    pub const ESCAPE: KeyCode = 27;
    pub const SPACE: KeyCode = 32;
    pub const LEFT: KeyCode = 37;
    pub const UP: KeyCode = 38;
    pub const RIGHT: KeyCode = 39;
    pub const DOWN: KeyCode = 40;
}

/// Names of the bindings gameplay code looks up
pub mod bindings {
    pub const MOVE_LEFT: &str = "moveLeft";
    pub const MOVE_RIGHT: &str = "moveRight";
    pub const JUMP: &str = "jump";
    pub const CLOSE_GUI: &str = "closeGui";
}

/// Pointer buttons the core distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
}

/// Key binding table plus pressed-key state
#[derive(Debug, Clone, Default)]
pub struct Keyboard {
    bindings: HashMap<String, KeyCode>,
    down: HashSet<KeyCode>,
    /// Pressed since the last tick
    latched: HashSet<KeyCode>,
    /// Pressed since the tick before this one
    just_pressed: HashSet<KeyCode>,
}

impl Keyboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arrow keys to move, space to jump, escape to close overlays
    pub fn with_default_bindings() -> Self {
        let mut keyboard = Self::new();
        keyboard.register_binding(bindings::MOVE_LEFT, keys::LEFT);
        keyboard.register_binding(bindings::MOVE_RIGHT, keys::RIGHT);
        keyboard.register_binding(bindings::JUMP, keys::SPACE);
        keyboard.register_binding(bindings::CLOSE_GUI, keys::ESCAPE);
        keyboard
    }

    pub fn register_binding(&mut self, name: &str, key: KeyCode) {
        self.bindings.insert(name.to_owned(), key);
    }

    pub fn binding(&self, name: &str) -> Option<KeyCode> {
        self.bindings.get(name).copied()
    }

    pub fn key_pressed(&mut self, key: KeyCode) {
        if self.down.insert(key) {
            self.latched.insert(key);
        }
    }

    pub fn key_released(&mut self, key: KeyCode) {
        self.down.remove(&key);
    }

    /// Forget every held key (window lost focus)
    pub fn clear_keys(&mut self) {
        self.down.clear();
        self.latched.clear();
    }

    /// Called once at the start of every tick
    pub fn update_tick(&mut self) {
        self.just_pressed = std::mem::take(&mut self.latched);
    }

    /// Held now, or tapped since the previous tick
    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.down.contains(&key) || self.just_pressed.contains(&key)
    }

    pub fn is_key_just_pressed(&self, key: KeyCode) -> bool {
        self.just_pressed.contains(&key)
    }

    pub fn is_down(&self, binding: &str) -> bool {
        self.binding(binding).is_some_and(|k| self.is_key_down(k))
    }

    pub fn is_just_pressed(&self, binding: &str) -> bool {
        self.binding(binding).is_some_and(|k| self.is_key_just_pressed(k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_just_pressed_lasts_one_tick() {
        let mut kb = Keyboard::with_default_bindings();
        kb.key_pressed(keys::SPACE);
        kb.update_tick();
        assert!(kb.is_just_pressed(bindings::JUMP));
        assert!(kb.is_down(bindings::JUMP));

        kb.update_tick();
        assert!(!kb.is_just_pressed(bindings::JUMP));
        assert!(kb.is_down(bindings::JUMP));
    }

    #[test]
    fn test_tap_between_ticks_is_seen() {
        let mut kb = Keyboard::with_default_bindings();
        kb.key_pressed(keys::LEFT);
        kb.key_released(keys::LEFT);
        kb.update_tick();
        assert!(kb.is_down(bindings::MOVE_LEFT));
        kb.update_tick();
        assert!(!kb.is_down(bindings::MOVE_LEFT));
    }

    #[test]
    fn test_held_key_does_not_relatch() {
        let mut kb = Keyboard::with_default_bindings();
        kb.key_pressed(keys::RIGHT);
        kb.update_tick();
        // Auto-repeat from the platform
        kb.key_pressed(keys::RIGHT);
        kb.update_tick();
        assert!(!kb.is_just_pressed(bindings::MOVE_RIGHT));
    }

    #[test]
    fn test_clear_keys_on_focus_loss() {
        let mut kb = Keyboard::with_default_bindings();
        kb.key_pressed(keys::RIGHT);
        kb.clear_keys();
        kb.update_tick();
        assert!(!kb.is_down(bindings::MOVE_RIGHT));
    }

    #[test]
    fn test_unbound_name() {
        let kb = Keyboard::new();
        assert_eq!(kb.binding("fly"), None);
        assert!(!kb.is_down("fly"));
    }
}

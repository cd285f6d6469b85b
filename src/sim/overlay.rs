//! Overlays: GUI layers drawn above the level that may pause the world
//!
//! Widgets themselves belong to the presentation side; the core only needs
//! to know whether an overlay pauses the game and when it wants to close.

use super::input::{Keyboard, PointerButton, bindings};

/// What an overlay asks of the world after its tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayAction {
    Stay,
    Close,
}

pub trait Overlay: Send {
    fn name(&self) -> &'static str;

    /// Listeners are not ticked while a pausing overlay is open
    fn pauses_game(&self) -> bool {
        true
    }

    /// Whether the presenter should still draw the level underneath
    fn draws_level_background(&self) -> bool {
        true
    }

    /// Advanced every tick, paused or not
    fn update_tick(&mut self, _input: &Keyboard) -> OverlayAction {
        OverlayAction::Stay
    }

    fn on_closed(&mut self) {}

    fn pointer_pressed(&mut self, _x: i32, _y: i32, _button: PointerButton) {}

    fn pointer_released(&mut self, _x: i32, _y: i32, _button: PointerButton) {}

    fn scrolled(&mut self, _amount: f32) {}
}

/// Pause menu opened from the pause control
#[derive(Debug, Default)]
pub struct PauseOverlay {
    ticks_open: u64,
}

impl PauseOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ticks_open(&self) -> u64 {
        self.ticks_open
    }
}

impl Overlay for PauseOverlay {
    fn name(&self) -> &'static str {
        "pause"
    }

    fn update_tick(&mut self, input: &Keyboard) -> OverlayAction {
        self.ticks_open += 1;
        if input.is_just_pressed(bindings::CLOSE_GUI) {
            OverlayAction::Close
        } else {
            OverlayAction::Stay
        }
    }
}

/// Shown after the last level; stays until the game exits
#[derive(Debug, Default)]
pub struct CompletionOverlay;

impl Overlay for CompletionOverlay {
    fn name(&self) -> &'static str {
        "complete"
    }

    fn draws_level_background(&self) -> bool {
        false
    }
}

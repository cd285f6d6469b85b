//! Gameplay events raised by entities during a tick

/// Something the session layer reacts to after the tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// One of the level's three stars was picked up
    StarCollected(u8),
    /// The player reached the goal
    LevelComplete,
    /// The player was caught or fell out of the level
    PlayerDied,
}

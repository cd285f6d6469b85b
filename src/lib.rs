//! Galactic Game - simulation core for a tile/level based 2D platformer
//!
//! Core modules:
//! - `geom`: Rectangles, polygons, collision masks and exact area overlap
//! - `sim`: Entities, the world, the command queue and the ticking thread
//! - `game`: World plus session, as one tickable unit
//! - `profile`: Persistent player progress
//! - `settings`: Data-driven configuration

pub mod game;
pub mod geom;
pub mod profile;
pub mod settings;
pub mod sim;

pub use game::Game;
pub use profile::{Profile, ProfileError, Profiles};
pub use settings::{Settings, SettingsError};

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Game configuration constants
pub mod consts {
    pub const GAME_NAME: &str = "Galactic Game";
    pub const GAME_VERSION: &str = "0.1 Alpha";
    /// Fixed simulation rate (ticks per second)
    pub const TICK_RATE: u32 = 30;
}

/// Sixteen random ASCII letters, the same for every run with the same seed
pub fn random_title(seed: u64) -> String {
    let mut rng = Pcg32::seed_from_u64(seed);
    (0..16)
        .map(|_| {
            let n: u8 = rng.random_range(0..52);
            if n < 26 { (b'A' + n) as char } else { (b'a' + n - 26) as char }
        })
        .collect()
}

/// 31-based rolling hash over UTF-16 code units
fn string_hash(s: &str) -> i32 {
    s.encode_utf16()
        .fold(0i32, |h, c| h.wrapping_mul(31).wrapping_add(i32::from(c)))
}

/// Title seed derived from the game's name and version
pub fn title_seed() -> u64 {
    let seed = string_hash(consts::GAME_VERSION).wrapping_add(string_hash(consts::GAME_NAME).wrapping_mul(31));
    seed as u64
}

/// Window title: random letters plus name and version
pub fn window_title() -> String {
    format!(
        "{} ({} {})",
        random_title(title_seed()),
        consts::GAME_NAME,
        consts::GAME_VERSION
    )
}

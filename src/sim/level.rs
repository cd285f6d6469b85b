//! Level data and where it comes from

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::kinds::{GOAL_ID, PATROLLER_ID, PLAYER_ID, STAR_BASE_ID, TILE_SIZE, WALL_ID};
use super::registry::SpawnError;

/// One placed object: registry type id plus level coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelObject {
    pub id: u32,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub objects: Vec<LevelObject>,
}

impl Level {
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Built-in 640×480 level used when no level directory is configured
    pub fn demo() -> Self {
        let mut objects: Vec<LevelObject> = (0..20)
            .map(|i| LevelObject {
                id: WALL_ID,
                x: f64::from(i) * TILE_SIZE,
                y: 448.0,
            })
            .collect();
        objects.extend([
            LevelObject { id: WALL_ID, x: 0.0, y: 416.0 },
            LevelObject { id: WALL_ID, x: 608.0, y: 416.0 },
            LevelObject { id: WALL_ID, x: 224.0, y: 352.0 },
            LevelObject { id: PLAYER_ID, x: 64.0, y: 424.0 },
            LevelObject { id: STAR_BASE_ID, x: 160.0, y: 432.0 },
            LevelObject { id: STAR_BASE_ID + 1, x: 232.0, y: 336.0 },
            LevelObject { id: STAR_BASE_ID + 2, x: 448.0, y: 432.0 },
            LevelObject { id: GOAL_ID, x: 576.0, y: 416.0 },
            LevelObject { id: PATROLLER_ID, x: 320.0, y: 432.0 },
        ]);
        Self {
            width: 640,
            height: 480,
            objects,
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("level {0} does not exist")]
    NotFound(usize),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed level data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Spawn(#[from] SpawnError),
}

/// Indexed supply of levels
pub trait LevelSource: Send {
    fn load(&self, index: usize) -> Result<Level, LoadError>;

    fn count(&self) -> usize;
}

/// Levels held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryLevels {
    levels: Vec<Level>,
}

impl MemoryLevels {
    pub fn new(levels: Vec<Level>) -> Self {
        Self { levels }
    }
}

impl LevelSource for MemoryLevels {
    fn load(&self, index: usize) -> Result<Level, LoadError> {
        self.levels.get(index).cloned().ok_or(LoadError::NotFound(index))
    }

    fn count(&self) -> usize {
        self.levels.len()
    }
}

/// A directory of `level0.json`, `level1.json`, ...
///
/// The level count is the length of the consecutive run starting at 0.
#[derive(Debug, Clone)]
pub struct JsonLevelDir {
    dir: PathBuf,
    count: usize,
}

impl JsonLevelDir {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref().to_path_buf();
        let count = (0..).take_while(|&i| Self::path_in(&dir, i).is_file()).count();
        log::info!("Found {} levels in {}", count, dir.display());
        Self { dir, count }
    }

    fn path_in(dir: &Path, index: usize) -> PathBuf {
        dir.join(format!("level{index}.json"))
    }

    pub fn path(&self, index: usize) -> PathBuf {
        Self::path_in(&self.dir, index)
    }
}

impl LevelSource for JsonLevelDir {
    fn load(&self, index: usize) -> Result<Level, LoadError> {
        if index >= self.count {
            return Err(LoadError::NotFound(index));
        }
        let path = self.path(index);
        let json = std::fs::read_to_string(&path).map_err(|source| LoadError::Io { path, source })?;
        Level::from_json(&json)
    }

    fn count(&self) -> usize {
        self.count
    }
}

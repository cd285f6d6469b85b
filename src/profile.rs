//! Player profiles: level progress and collected stars
//!
//! Persisted as one JSON file holding every profile.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stars available in every level
pub const STARS_PER_LEVEL: usize = 3;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("profiles file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("profiles file is malformed: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Progress of one named player
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    /// Highest level unlocked (the frontier)
    pub current_level: usize,
    /// Stars ever obtained, per level index
    #[serde(default)]
    pub stars: BTreeMap<usize, [bool; STARS_PER_LEVEL]>,
}

impl Profile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Unlock the next level if `level` is the frontier
    ///
    /// Returns true when the frontier moved.
    pub fn complete_level(&mut self, level: usize) -> bool {
        if level == self.current_level {
            self.current_level += 1;
            true
        } else {
            false
        }
    }

    pub fn is_star_obtained(&self, level: usize, star: usize) -> bool {
        self.stars
            .get(&level)
            .and_then(|s| s.get(star))
            .copied()
            .unwrap_or(false)
    }

    pub fn obtain_star(&mut self, level: usize, star: usize) {
        if star < STARS_PER_LEVEL {
            self.stars.entry(level).or_default()[star] = true;
        }
    }

    /// Total stars across all levels
    pub fn star_count(&self) -> usize {
        self.stars.values().flatten().filter(|&&s| s).count()
    }
}

/// Every profile, plus the file they came from
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profiles {
    profiles: BTreeMap<String, Profile>,
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl Profiles {
    /// Profiles that are never written anywhere
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load from `path`; a missing file yields an empty set bound to `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProfileError> {
        let path = path.as_ref();
        let mut profiles = if path.exists() {
            let json = std::fs::read_to_string(path)?;
            let profiles: Profiles = serde_json::from_str(&json)?;
            log::info!("Loaded {} profiles from {}", profiles.len(), path.display());
            profiles
        } else {
            log::info!("No profiles file at {}, starting fresh", path.display());
            Self::default()
        };
        profiles.path = Some(path.to_path_buf());
        Ok(profiles)
    }

    /// Write back to the file this set was loaded from (no-op in memory)
    pub fn save(&self) -> Result<(), ProfileError> {
        let Some(path) = self.path.as_ref() else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::debug!("Profiles saved ({} entries)", self.profiles.len());
        Ok(())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Profile> {
        self.profiles.get(name)
    }

    pub fn get_or_create(&mut self, name: &str) -> &mut Profile {
        self.profiles
            .entry(name.to_string())
            .or_insert_with(|| Profile::new(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_level_only_advances_frontier() {
        let mut profile = Profile::new("ada");
        assert!(profile.complete_level(0));
        assert_eq!(profile.current_level, 1);
        assert!(!profile.complete_level(0));
        assert_eq!(profile.current_level, 1);
    }

    #[test]
    fn test_stars_are_per_level() {
        let mut profile = Profile::new("ada");
        profile.obtain_star(2, 1);
        profile.obtain_star(2, 1);
        profile.obtain_star(0, 0);
        profile.obtain_star(0, 7);
        assert!(profile.is_star_obtained(2, 1));
        assert!(!profile.is_star_obtained(2, 0));
        assert!(!profile.is_star_obtained(5, 0));
        assert_eq!(profile.star_count(), 2);
    }

    #[test]
    fn test_save_and_reload() {
        let path = std::env::temp_dir().join(format!("galactic-profiles-{}.json", std::process::id()));
        let _ = std::fs::remove_file(&path);

        let mut profiles = Profiles::load(&path).expect("missing file is fine");
        assert!(profiles.is_empty());
        let ada = profiles.get_or_create("ada");
        ada.complete_level(0);
        ada.obtain_star(0, 2);
        profiles.save().expect("save");

        let reloaded = Profiles::load(&path).expect("reload");
        let ada = reloaded.get("ada").expect("profile kept");
        assert_eq!(ada.current_level, 1);
        assert!(ada.is_star_obtained(0, 2));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_in_memory_save_is_noop() {
        let mut profiles = Profiles::in_memory();
        profiles.get_or_create("bob");
        assert!(profiles.save().is_ok());
        assert_eq!(profiles.path(), None);
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let path = std::env::temp_dir().join(format!("galactic-profiles-bad-{}.json", std::process::id()));
        std::fs::write(&path, "[not a profile").expect("write");
        assert!(matches!(Profiles::load(&path), Err(ProfileError::Parse(_))));
        let _ = std::fs::remove_file(&path);
    }
}

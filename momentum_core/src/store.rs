//! Local persistence for preferences, profile and favorites.
//!
//! Everything the user owns lives in one JSON document, `user.json`, that is
//! replaced atomically on every save. A missing or unreadable document loads
//! as defaults.

use crate::config::Config;
use crate::{Error, Result, UserPreferences, UserProfile};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Whether persistence is wired up at all. Decided once, from config.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageAvailability {
    Available,
    Unavailable,
}

impl StorageAvailability {
    pub fn from_config(config: &Config) -> Self {
        if config.storage.enabled {
            StorageAvailability::Available
        } else {
            StorageAvailability::Unavailable
        }
    }

    pub fn is_available(self) -> bool {
        self == StorageAvailability::Available
    }
}

/// File layout under the data directory
#[derive(Clone, Debug)]
pub struct DataPaths {
    pub log_dir: PathBuf,
    pub session_log: PathBuf,
    pub session_csv: PathBuf,
    pub user_file: PathBuf,
}

impl DataPaths {
    pub fn new(data_dir: &Path) -> Self {
        let log_dir = data_dir.join("log");
        Self {
            session_log: log_dir.join("sessions.jsonl"),
            log_dir,
            session_csv: data_dir.join("sessions.csv"),
            user_file: data_dir.join("user.json"),
        }
    }
}

/// The persisted user document
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UserData {
    pub preferences: Option<UserPreferences>,
    pub profile: Option<UserProfile>,
    pub favorite_exercises: Vec<String>,
}

pub struct UserStore {
    path: PathBuf,
    availability: StorageAvailability,
}

impl UserStore {
    pub fn new(path: impl Into<PathBuf>, availability: StorageAvailability) -> Self {
        Self {
            path: path.into(),
            availability,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the document under a shared lock
    ///
    /// Returns defaults if the file doesn't exist, can't be read, or doesn't
    /// parse. Only the last case is worth a warning.
    pub fn load(&self) -> UserData {
        if !self.availability.is_available() {
            return UserData::default();
        }
        if !self.path.exists() {
            tracing::debug!("No user file at {:?}, using defaults", self.path);
            return UserData::default();
        }

        let contents = match read_locked(&self.path) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::warn!("Unable to read {:?}: {}. Using defaults.", self.path, e);
                return UserData::default();
            }
        };

        match serde_json::from_str::<UserData>(&contents) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!("Failed to parse {:?}: {}. Using defaults.", self.path, e);
                UserData::default()
            }
        }
    }

    /// Replace the document atomically (temp file, fsync, rename)
    pub fn save(&self, data: &UserData) -> Result<()> {
        if !self.availability.is_available() {
            tracing::debug!("Storage unavailable, user data not saved");
            return Ok(());
        }

        let parent = self
            .path
            .parent()
            .ok_or_else(|| Error::Storage(format!("{:?} has no parent directory", self.path)))?;
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            serde_json::to_writer_pretty(&mut writer, data)?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;
        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved user data to {:?}", self.path);
        Ok(())
    }

    /// Load, modify and save back
    pub fn update<F>(&self, f: F) -> Result<UserData>
    where
        F: FnOnce(&mut UserData) -> Result<()>,
    {
        let mut data = self.load();
        f(&mut data)?;
        self.save(&data)?;
        Ok(data)
    }

    pub fn load_preferences(&self) -> Option<UserPreferences> {
        self.load().preferences
    }

    /// Validated preferences replace whatever was stored
    pub fn save_preferences(&self, preferences: &UserPreferences) -> Result<()> {
        preferences.validate()?;
        self.update(|data| {
            data.preferences = Some(preferences.clone());
            Ok(())
        })?;
        tracing::info!(
            "Saved preferences: {} / {} / {:?}",
            preferences.goal,
            preferences.skill_level,
            preferences.body_parts
        );
        Ok(())
    }

    pub fn load_profile(&self) -> Option<UserProfile> {
        self.load().profile
    }

    pub fn save_profile(&self, profile: &UserProfile) -> Result<()> {
        profile.validate()?;
        self.update(|data| {
            data.profile = Some(profile.clone());
            Ok(())
        })?;
        Ok(())
    }

    pub fn favorites(&self) -> Vec<String> {
        self.load().favorite_exercises
    }

    pub fn is_favorite(&self, exercise_id: &str) -> bool {
        self.favorites().iter().any(|id| id == exercise_id)
    }

    /// Returns false if the exercise was already a favorite
    pub fn add_favorite(&self, exercise_id: &str) -> Result<bool> {
        let mut added = false;
        self.update(|data| {
            if !data.favorite_exercises.iter().any(|id| id == exercise_id) {
                data.favorite_exercises.push(exercise_id.to_string());
                added = true;
            }
            Ok(())
        })?;
        Ok(added)
    }

    /// Returns false if the exercise was not a favorite
    pub fn remove_favorite(&self, exercise_id: &str) -> Result<bool> {
        let mut removed = false;
        self.update(|data| {
            let before = data.favorite_exercises.len();
            data.favorite_exercises.retain(|id| id != exercise_id);
            removed = data.favorite_exercises.len() != before;
            Ok(())
        })?;
        Ok(removed)
    }
}

fn read_locked(path: &Path) -> Result<String> {
    let file = File::open(path)?;
    file.lock_shared()?;

    let mut contents = String::new();
    let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
    let _ = file.unlock();
    read?;
    Ok(contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Difficulty, Goal};

    fn store_in(dir: &Path) -> UserStore {
        UserStore::new(dir.join("user.json"), StorageAvailability::Available)
    }

    fn preferences() -> UserPreferences {
        UserPreferences {
            goal: Goal::StrengthTraining,
            skill_level: Difficulty::Intermediate,
            body_parts: vec!["chest".into(), "back".into()],
        }
    }

    #[test]
    fn test_preferences_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = store_in(temp_dir.path());

        assert!(store.load_preferences().is_none());
        store.save_preferences(&preferences()).unwrap();
        assert_eq!(store.load_preferences(), Some(preferences()));
    }

    #[test]
    fn test_invalid_preferences_are_not_saved() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = store_in(temp_dir.path());

        let empty = UserPreferences::default();
        assert!(matches!(store.save_preferences(&empty), Err(Error::Validation(_))));
        assert!(!store.path().exists());
    }

    #[test]
    fn test_profile_age_bounds() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = store_in(temp_dir.path());

        let mut profile = UserProfile {
            full_name: "Sam".into(),
            age: 12,
            ..Default::default()
        };
        assert!(store.save_profile(&profile).is_err());

        profile.age = 13;
        store.save_profile(&profile).unwrap();
        assert_eq!(store.load_profile().map(|p| p.age), Some(13));
    }

    #[test]
    fn test_favorites_are_idempotent() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = store_in(temp_dir.path());

        assert!(store.add_favorite("1").unwrap());
        assert!(!store.add_favorite("1").unwrap());
        assert!(store.add_favorite("6").unwrap());
        assert_eq!(store.favorites(), vec!["1".to_string(), "6".to_string()]);
        assert!(store.is_favorite("6"));

        assert!(store.remove_favorite("1").unwrap());
        assert!(!store.remove_favorite("1").unwrap());
        assert_eq!(store.favorites(), vec!["6".to_string()]);
    }

    #[test]
    fn test_saving_one_part_keeps_the_others() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = store_in(temp_dir.path());

        store.add_favorite("3").unwrap();
        store.save_preferences(&preferences()).unwrap();
        assert_eq!(store.favorites(), vec!["3".to_string()]);
    }

    #[test]
    fn test_corrupted_file_loads_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = store_in(temp_dir.path());
        std::fs::write(store.path(), "{ invalid json }").unwrap();

        assert_eq!(store.load(), UserData::default());

        // And the next save repairs it
        store.add_favorite("2").unwrap();
        assert_eq!(store.favorites(), vec!["2".to_string()]);
    }

    #[test]
    fn test_partial_document_fills_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = store_in(temp_dir.path());
        std::fs::write(store.path(), r#"{"preferences": {"skill_level": "expert"}}"#).unwrap();

        let prefs = store.load_preferences().unwrap();
        assert_eq!(prefs.skill_level, Difficulty::Expert);
        assert_eq!(prefs.goal, Goal::MuscleBuilding);
        assert!(prefs.body_parts.is_empty());
        assert!(store.favorites().is_empty());
    }

    #[test]
    fn test_unavailable_storage() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = UserStore::new(
            temp_dir.path().join("user.json"),
            StorageAvailability::Unavailable,
        );

        store.save_preferences(&preferences()).unwrap();
        store.add_favorite("1").unwrap();
        assert!(!store.path().exists());
        assert!(store.load_preferences().is_none());
    }

    #[test]
    fn test_atomic_save_leaves_no_temp_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = store_in(temp_dir.path());
        store.save(&UserData::default()).unwrap();

        let extras: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "user.json")
            .collect();
        assert!(extras.is_empty(), "unexpected files: {:?}", extras);
    }

    #[test]
    fn test_availability_from_config() {
        let mut config = Config::default();
        assert!(StorageAvailability::from_config(&config).is_available());
        config.storage.enabled = false;
        assert_eq!(
            StorageAvailability::from_config(&config),
            StorageAvailability::Unavailable
        );
    }
}

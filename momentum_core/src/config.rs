//! Configuration file support for Momentum.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/momentum/config.toml`.

use crate::generator::{MAX_EXERCISES_PER_DAY, MIN_EXERCISES_PER_DAY};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub generator: GeneratorConfig,

    #[serde(default)]
    pub user: UserConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Whether persistence is wired up at all
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_enabled")]
    pub enabled: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            enabled: default_storage_enabled(),
        }
    }
}

/// Weekly program generation parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Per-day exercise cap, 4 to 6
    #[serde(default = "default_max_exercises")]
    pub max_exercises: usize,

    /// Fixed seed for reproducible schedules. Unset means a fresh schedule each run.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_exercises: default_max_exercises(),
            seed: None,
        }
    }
}

/// Local user identity (owner of recorded sessions)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default = "default_user_id")]
    pub id: String,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            id: default_user_id(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("momentum")
}

fn default_storage_enabled() -> bool {
    true
}

fn default_max_exercises() -> usize {
    6
}

fn default_user_id() -> String {
    "local-user".into()
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("momentum").join("config.toml")
    }

    /// Reject generator settings the selection step cannot honour
    pub fn validate(&self) -> Result<()> {
        let generator = &self.generator;
        if !(MIN_EXERCISES_PER_DAY..=MAX_EXERCISES_PER_DAY).contains(&generator.max_exercises) {
            return Err(Error::Config(format!(
                "generator.max_exercises must be between {} and {}, got {}",
                MIN_EXERCISES_PER_DAY, MAX_EXERCISES_PER_DAY, generator.max_exercises
            )));
        }
        Ok(())
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}

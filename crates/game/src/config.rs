//! Range configuration (scenario plus combat tunables). Loaded from config.ron at startup.

use combat::CombatConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Persistent range settings. Loaded from `config.ron` in the current directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeConfig {
    /// Simulated seconds before the range shuts down.
    #[serde(default = "default_duration")]
    pub duration: f32,
    /// Number of targets standing in a row.
    #[serde(default = "default_targets")]
    pub targets: usize,
    /// Distance between neighbouring targets.
    #[serde(default = "default_spacing")]
    pub spacing: f32,
    /// How far downrange the target row stands.
    #[serde(default = "default_distance")]
    pub distance: f32,
    #[serde(default)]
    pub combat: CombatConfig,
}

fn default_duration() -> f32 {
    20.0
}
fn default_targets() -> usize {
    3
}
fn default_spacing() -> f32 {
    2.5
}
fn default_distance() -> f32 {
    15.0
}

impl Default for RangeConfig {
    fn default() -> Self {
        Self {
            duration: default_duration(),
            targets: default_targets(),
            spacing: default_spacing(),
            distance: default_distance(),
            combat: CombatConfig::default(),
        }
    }
}

impl RangeConfig {
    /// Load config from `config.ron`. If the file is missing or invalid, returns default config.
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        if let Ok(data) = std::fs::read_to_string(path) {
            match Self::parse(&data) {
                Ok(c) => return c,
                Err(e) => log::warn!("Invalid config at {:?}: {}, using defaults", path, e),
            }
        }
        Self::default()
    }

    pub fn parse(data: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(data)
    }
}

fn config_path() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join("config.ron")
}

//! Engine configuration
//!
//! A small RON file with every field optional:
//!
//! ```ron
//! (
//!     play_width: 640,
//!     play_height: 480,
//!     probe_slop: 10.0,
//!     show_rules: true,
//!     level: Some("levels/first.ron"),
//! )
//! ```
//!
//! Looked up in the working directory first, then in the user config dir.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::game::rules::DEFAULT_PROBE_SLOP;

/// Config file name in the working directory
pub const LOCAL_CONFIG_FILE: &str = "rulebound.ron";

/// Upper bound on play-area dimensions, keeps the hit raster sane
pub const MAX_PLAY_DIMENSION: u32 = 4096;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("validation error: {0}")]
    Validation(String),
}

#[cfg(not(target_arch = "wasm32"))]
fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("rulebound").join("config.ron"))
}

#[cfg(target_arch = "wasm32")]
fn user_config_path() -> Option<PathBuf> {
    None
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Play area width in pixels
    pub play_width: u32,
    /// Play area height in pixels
    pub play_height: u32,
    /// How far past an IS block to look for its noun and verb
    pub probe_slop: f32,
    /// Show the rule list next to the board
    pub show_rules: bool,
    /// Level file to load instead of the built-in one
    pub level: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            play_width: 640,
            play_height: 480,
            probe_slop: DEFAULT_PROBE_SLOP,
            show_rules: true,
            level: None,
        }
    }
}

impl EngineConfig {
    pub fn with_level(mut self, path: impl Into<PathBuf>) -> Self {
        self.level = Some(path.into());
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [("play_width", self.play_width), ("play_height", self.play_height)] {
            if value == 0 || value > MAX_PLAY_DIMENSION {
                return Err(ConfigError::Validation(format!(
                    "{name} must be between 1 and {MAX_PLAY_DIMENSION}, got {value}"
                )));
            }
        }
        if !self.probe_slop.is_finite() || self.probe_slop < 0.0 {
            return Err(ConfigError::Validation(format!(
                "probe_slop must be a non-negative number, got {}",
                self.probe_slop
            )));
        }
        Ok(())
    }

    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_ron(&text)
    }

    /// Where to look, in order.
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        paths.extend(user_config_path());
        paths
    }

    /// First config that exists and parses; defaults otherwise. Broken files
    /// are logged and skipped.
    pub fn load_or_default() -> Self {
        Self::load_first(&Self::search_paths())
    }

    fn load_first(paths: &[PathBuf]) -> Self {
        for path in paths {
            if !path.exists() {
                continue;
            }
            match Self::load(path) {
                Ok(config) => {
                    info!(path = %path.display(), "loaded config");
                    return config;
                }
                Err(e) => warn!(path = %path.display(), error = %e, "ignoring config"),
            }
        }
        Self::default()
    }
}

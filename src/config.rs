// SPDX-License-Identifier: GPL-3.0-only

//! User configuration
//!
//! Loaded from `$XDG_CONFIG_HOME/camera-capture/config.toml`. Every field has a
//! default, so a missing file or missing keys are fine.

use crate::constants::{naming, recording};
use crate::request::Orientation;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Configuration directory name under the platform config root
const CONFIG_DIR_NAME: &str = "camera-capture";

/// Configuration file name
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Folder created under the public pictures/videos directories
    pub media_subdirectory: String,
    /// Override for the public pictures directory
    pub pictures_dir: Option<PathBuf>,
    /// Override for the public videos directory
    pub videos_dir: Option<PathBuf>,
    /// Override for the private cache directory used for temporary captures
    pub cache_dir: Option<PathBuf>,
    /// Device orientation used when a request does not specify one
    pub default_orientation: Option<Orientation>,
    /// Requested maximum durations below this are raised to it
    pub min_recording_seconds: u64,
    /// Output size ceiling for recordings in bytes
    pub max_recording_bytes: u64,
    /// Record the camcorder microphone alongside video
    pub record_audio: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            media_subdirectory: naming::DEFAULT_SAVE_FOLDER.to_string(),
            pictures_dir: None,
            videos_dir: None,
            cache_dir: None,
            default_orientation: None,
            min_recording_seconds: recording::MIN_DURATION.as_secs(),
            max_recording_bytes: recording::MAX_FILE_SIZE,
            record_audio: true,
        }
    }
}

impl Config {
    /// Default location of the configuration file
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load the user configuration, falling back to defaults
    ///
    /// A missing file is not an error. A malformed file is logged and ignored.
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            debug!("No config directory available, using defaults");
            return Self::default();
        };

        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "Ignoring invalid config file");
                Self::default()
            }
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn min_recording_duration(&self) -> Duration {
        Duration::from_secs(self.min_recording_seconds)
    }
}

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::directory::{MissingCoordinates, DEFAULT_MAX_DISTANCE_KM};
use crate::eligibility::{EligibilityPolicy, ELIGIBILITY_WINDOW_DAYS};
use crate::validation::{PhoneRule, DEFAULT_PHONE_PATTERN};

/// Application-level constants
pub const APP_NAME: &str = "Donorlink";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DB_FILE_NAME: &str = "donorlink.db";
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "donorlink=info"
}

/// Get the application data directory
/// ~/Donorlink/ on all platforms, or `DONORLINK_HOME` when set.
pub fn app_data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("DONORLINK_HOME") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

pub fn database_path() -> PathBuf {
    app_data_dir().join(DB_FILE_NAME)
}

pub fn settings_path() -> PathBuf {
    app_data_dir().join(SETTINGS_FILE_NAME)
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid phone pattern {pattern}: {source}")]
    PhonePattern {
        pattern: String,
        source: regex::Error,
    },
}

/// Tunable rules and server options. Every field has a default, so a
/// settings file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub eligibility_window_days: u32,
    pub default_max_distance_km: f64,
    pub missing_coordinates: MissingCoordinates,
    pub phone_pattern: String,
    pub bind_addr: SocketAddr,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            eligibility_window_days: ELIGIBILITY_WINDOW_DAYS,
            default_max_distance_km: DEFAULT_MAX_DISTANCE_KM,
            missing_coordinates: MissingCoordinates::Exclude,
            phone_pattern: DEFAULT_PHONE_PATTERN.to_string(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8787)),
        }
    }
}

impl Settings {
    /// Load from `path`, falling back to defaults when the file is absent.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No settings file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let settings: Settings =
            serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        // Reject a bad pattern at start-up rather than on first registration.
        settings.phone_rule()?;
        tracing::info!(path = %path.display(), "Settings loaded");
        Ok(settings)
    }

    pub fn eligibility_policy(&self) -> EligibilityPolicy {
        EligibilityPolicy::new(self.eligibility_window_days)
    }

    pub fn phone_rule(&self) -> Result<PhoneRule, ConfigError> {
        PhoneRule::new(&self.phone_pattern).map_err(|source| ConfigError::PhonePattern {
            pattern: self.phone_pattern.clone(),
            source,
        })
    }
}

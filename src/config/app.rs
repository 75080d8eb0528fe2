//! Application configuration loading from config.toml
//!
//! Every setting has a default, so the file is optional. Environment variables
//! (usually coming from `.env`) override the file.

use crate::{
    config::database::DEFAULT_DATABASE_URL,
    core::goal::{DEFAULT_GOAL_ML, Goal},
    errors::{Error, Result},
};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Storage key of the current document format.
pub const DEFAULT_STORAGE_KEY: &str = "hydration_tracker_v1";

/// Settings for one tracker session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// SeaORM connection URL
    pub database_url: String,
    /// Key the document is stored under
    pub storage_key: String,
    /// Goal in ml used until the user sets one
    pub default_goal: u32,
    /// Length of the trailing series shown by `status`
    pub trailing_days: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            default_goal: DEFAULT_GOAL_ML,
            trailing_days: 7,
        }
    }
}

impl AppConfig {
    /// The configured default goal, or the built-in one if it is zero.
    #[must_use]
    pub fn default_goal(&self) -> Goal {
        Goal::from_ml(self.default_goal).unwrap_or_else(|e| {
            warn!("Configured default goal rejected ({e}), using {DEFAULT_GOAL_ML} ml");
            Goal::default()
        })
    }

    /// Applies `DATABASE_URL` and `HYDRATION_GOAL` overrides read through `lookup`.
    #[must_use]
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL").filter(|u| !u.trim().is_empty()) {
            self.database_url = url;
        }
        if let Some(raw) = lookup("HYDRATION_GOAL") {
            match raw.trim().parse::<u32>() {
                Ok(goal) if goal > 0 => self.default_goal = goal,
                _ => warn!(value = %raw, "Ignoring invalid HYDRATION_GOAL"),
            }
        }
        self
    }
}

/// Loads configuration from a TOML file.
///
/// # Errors
/// Returns `Error::Config` if the file cannot be read or is not valid TOML.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path_ref.display()),
    })
}

/// Resolves the configuration for this process.
///
/// An explicit `path` must exist. Without one, `config.toml` is used when
/// present and defaults otherwise. Environment overrides are applied last.
pub fn load_app_configuration(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => load_config(path)?,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => load_config(DEFAULT_CONFIG_PATH)?,
        None => {
            debug!("No config.toml found, using defaults");
            AppConfig::default()
        }
    };
    Ok(config.with_overrides(|key| std::env::var(key).ok()))
}

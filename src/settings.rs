//! Optional TOML configuration.
//!
//! ```toml
//! [remove]
//! retries = 100
//! interval_ms = 10
//! suppress_errors = true
//!
//! [logging]
//! level = "debug"
//! file = "/var/log/dirkit.log"
//! ```
//!
//! Every key is optional; missing keys fall back to the host defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories_next::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

use crate::fs_op::retry::{Exhaustion, RetryPolicy};
use crate::logging::LogConfig;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("could not read settings file `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub remove: RemoveSettings,
    pub logging: LogConfig,
}

/// Overrides applied on top of [`RetryPolicy::for_host`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RemoveSettings {
    pub retries: Option<u32>,
    pub interval_ms: Option<u64>,
    pub suppress_errors: Option<bool>,
}

impl RemoveSettings {
    pub fn policy(&self) -> RetryPolicy {
        let mut p = RetryPolicy::for_host();
        if let Some(r) = self.retries {
            p.retries = r;
        }
        if let Some(ms) = self.interval_ms {
            p.interval = Duration::from_millis(ms);
        }
        if let Some(s) = self.suppress_errors {
            p.on_exhausted = if s {
                Exhaustion::Suppress
            } else {
                Exhaustion::Propagate
            };
        }
        p
    }
}

impl Settings {
    pub fn from_toml_str(s: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(s)?)
    }
}

/// Read settings from `path`.
pub fn load_settings(path: impl AsRef<Path>) -> Result<Settings, SettingsError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let settings = Settings::from_toml_str(&raw)?;
    tracing::debug!(path = %path.display(), "loaded settings");
    Ok(settings)
}

/// Read settings from the default location, or defaults if there is no
/// file there.
pub fn load_default_settings() -> Result<Settings, SettingsError> {
    match default_settings_path() {
        Some(p) if p.exists() => load_settings(p),
        _ => Ok(Settings::default()),
    }
}

/// `<config dir>/dirkit/settings.toml`, when a home directory is known.
pub fn default_settings_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "dirkit").map(|d| d.config_dir().join("settings.toml"))
}

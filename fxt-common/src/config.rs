//! Dashboard configuration loading
//!
//! Config file resolution priority:
//! 1. Explicit path passed by the host application (highest priority)
//! 2. `FXT_CONFIG` environment variable
//! 3. `<config dir>/fluxtape/dashboard.toml` (OS-dependent)
//! 4. Compiled defaults (fallback)
//!
//! A missing file at step 2 or 3 is not an error: a warning is logged and
//! defaults are used. A missing file at step 1, a malformed file, or an
//! invalid value is reported to the caller.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::upload_policy::{AudioFormat, UploadPolicy};
use crate::{Error, Result};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "FXT_CONFIG";

/// Default event bus capacity per session
pub const DEFAULT_EVENT_CAPACITY: usize = 100;

/// `[upload]` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Accepted extensions, case-insensitive
    pub allowed_formats: Vec<String>,
    /// Per-file size cap in bytes; 0 disables the cap
    pub max_file_bytes: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            allowed_formats: AudioFormat::all_variants()
                .iter()
                .map(|f| f.extension().to_string())
                .collect(),
            max_file_bytes: 0,
        }
    }
}

/// `[events]` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    pub capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

/// Top-level dashboard configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub upload: UploadConfig,
    pub events: EventsConfig,
}

impl DashboardConfig {
    /// Parse and validate TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: DashboardConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Resolve and load the configuration
    ///
    /// `explicit` comes from the host application (e.g. its own command line).
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(Error::NotFound(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            info!("Loading dashboard config from {}", path.display());
            return Self::from_file(path);
        }

        match resolve_config_path() {
            Some(path) if path.exists() => {
                info!("Loading dashboard config from {}", path.display());
                Self::from_file(&path)
            }
            Some(path) => {
                warn!(
                    "Config file {} not found, using compiled defaults",
                    path.display()
                );
                Ok(Self::default())
            }
            None => {
                warn!("No config location available, using compiled defaults");
                Ok(Self::default())
            }
        }
    }

    /// Check values that TOML typing cannot express
    pub fn validate(&self) -> Result<()> {
        self.upload_policy()?;
        if self.events.capacity == 0 {
            return Err(Error::Config("events.capacity must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Upload policy described by the `[upload]` table
    pub fn upload_policy(&self) -> Result<UploadPolicy> {
        let formats = self
            .upload
            .allowed_formats
            .iter()
            .map(|ext| {
                ext.parse::<AudioFormat>()
                    .map_err(|_| Error::Config(format!("Unknown audio format in allow-list: {:?}", ext)))
            })
            .collect::<Result<Vec<_>>>()?;

        let cap = (self.upload.max_file_bytes > 0).then_some(self.upload.max_file_bytes);
        UploadPolicy::new(formats, cap)
    }
}

/// Config file location from the environment or the OS config directory
///
/// Does not check that the file exists.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    default_config_path()
}

/// `<config dir>/fluxtape/dashboard.toml` for the current platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("fluxtape").join("dashboard.toml"))
}

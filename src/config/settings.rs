//! `settings.toml`: reading rate bounds and autosave cadence.

use std::{fs, path::Path, path::PathBuf};

use log::info;
use quickread_core::ReaderConfig;
use serde::{Deserialize, Serialize};

use super::AppPaths;
use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderSettings {
    pub wpm: u16,
    pub min_wpm: u16,
    pub max_wpm: u16,
    pub wpm_step: u16,
    /// Seconds between progress saves while a document is open.
    pub autosave_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_file: Option<PathBuf>,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        let reader = ReaderConfig::default();
        Self {
            wpm: reader.wpm,
            min_wpm: reader.min_wpm,
            max_wpm: reader.max_wpm,
            wpm_step: reader.wpm_step,
            autosave_secs: 5,
            progress_file: None,
        }
    }
}

impl ReaderSettings {
    /// Load from the platform `settings.toml`; defaults when it does not exist yet.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(AppPaths::new().settings_file())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Self = toml::from_str(&content)?;
        info!(
            "config: loaded path={} wpm={} autosave_secs={}",
            path.display(),
            settings.wpm,
            settings.autosave_secs
        );
        Ok(settings)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(AppPaths::new().settings_file())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source: std::io::Error| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(io_err)
    }

    /// Clock configuration with repaired bounds.
    pub fn reader_config(&self) -> ReaderConfig {
        ReaderConfig {
            wpm: self.wpm,
            min_wpm: self.min_wpm,
            max_wpm: self.max_wpm,
            wpm_step: self.wpm_step,
        }
        .normalized()
    }

    /// Autosave period, never shorter than one second.
    pub fn autosave_interval_ms(&self) -> u64 {
        self.autosave_secs.max(1).saturating_mul(1_000)
    }
}

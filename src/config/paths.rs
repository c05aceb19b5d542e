//! Platform directories resolved with `dirs`.
//!
//! Config dir (`settings.toml`):
//!   Linux: ~/.config/quickread/
//!   macOS: ~/Library/Application Support/quickread/
//!
//! Data dir (reading progress):
//!   Linux: ~/.local/share/quickread/
//!   macOS: ~/Library/Application Support/quickread/

use std::path::{Path, PathBuf};

use super::ReaderSettings;

pub const PROGRESS_FILE_NAME: &str = "speed-reader-progress.json";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub settings_file: PathBuf,
    pub data_dir: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "quickread";

    /// Falls back to the working directory when the platform has no standard path.
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        Self::in_dirs(config_dir, data_dir)
    }

    pub fn in_dirs(config_dir: impl Into<PathBuf>, data_dir: impl Into<PathBuf>) -> Self {
        let config_dir = config_dir.into();
        Self {
            settings_file: config_dir.join("settings.toml"),
            config_dir,
            data_dir: data_dir.into(),
        }
    }

    /// Explicit `progress_file` from settings, else the default file in the data dir.
    /// A relative override is taken relative to the data dir.
    pub fn progress_file(&self, settings: &ReaderSettings) -> PathBuf {
        match settings.progress_file.as_deref() {
            Some(path) if path.is_absolute() => path.to_path_buf(),
            Some(path) => self.data_dir.join(path),
            None => self.data_dir.join(PROGRESS_FILE_NAME),
        }
    }

    pub fn settings_file(&self) -> &Path {
        &self.settings_file
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

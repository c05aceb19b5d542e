//! Host-side errors: persistence, configuration and document sessions.

use std::{io, path::PathBuf};

use quickread_core::ExtractError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("progress file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode progress: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to replace progress file: {0}")]
    Persist(#[from] tempfile::PersistError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to encode settings: {0}")]
    Encode(#[from] toml::ser::Error),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// A newer load started before this one finished; its result was dropped.
    #[error("load of {0} was superseded by a newer document")]
    Superseded(String),
}

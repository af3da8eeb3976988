// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DurableTaskError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerError(#[from] toml::ser::Error),

    /// A template referenced a placeholder with no value bound to it.
    #[error("Template error: no value for placeholder '{0}'")]
    Template(String),

    /// The interpreter could not be started. No result file will ever appear.
    #[error("Failed to launch '{binary}': {source}")]
    LaunchFailed {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    /// The control directory vanished (deleted externally, unmounted, ...).
    #[error("Control directory not found: {0:?}")]
    ControlDirMissing(PathBuf),

    /// The result file exists but does not hold a decimal exit code.
    #[error("Corrupt result file {path:?}: {content:?}")]
    CorruptResult { path: PathBuf, content: String },

    #[error("Task {id} made no progress for {idle:?}; process may have died")]
    TaskStale { id: String, idle: Duration },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, DurableTaskError>;

// src/config/mod.rs

//! Configuration loading and validation for durabletask.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate basic invariants like a sane poll interval (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{DEFAULT_CONFIG_FILE, load_and_validate, load_from_path, load_or_default};
pub use model::{ConfigFile, LaunchSection, PollSection, RawConfigFile};
pub use validate::MIN_POLL_INTERVAL_MS;

// src/exec/mod.rs

//! Process start-up layer.
//!
//! - [`backend`] defines the [`ProcessLauncher`] seam and the [`LaunchSpec`]
//!   it consumes. Tests swap in a fake launcher that never spawns anything.
//! - [`local`] is the production launcher built on `tokio::process::Command`.
//!   It starts the process detached and returns without waiting.
//! - [`live_log`] holds the live log sinks that receive the child's mirrored
//!   stdout/stderr.

pub mod backend;
pub mod live_log;
pub mod local;

pub use backend::{LaunchSpec, LaunchedProcess, ProcessLauncher};
pub use live_log::{LiveLog, StdoutLiveLog, TracingLiveLog};
pub use local::LocalLauncher;

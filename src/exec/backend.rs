// src/exec/backend.rs

//! Pluggable process launcher abstraction.
//!
//! The task talks to a `ProcessLauncher` instead of `tokio::process` directly.
//! Production code uses [`super::LocalLauncher`]; tests provide a launcher
//! that records the [`LaunchSpec`] and, if they like, plays the child process
//! by writing into a mock filesystem.

use std::collections::BTreeMap;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use crate::errors::Result;

/// Everything needed to start the interpreter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    /// Control directory id, used in diagnostics.
    pub task: String,
    /// Interpreter binary, resolved through `PATH`.
    pub program: String,
    pub args: Vec<String>,
    /// Working directory of the child (the workspace root).
    pub cwd: PathBuf,
    /// Variables added on top of the inherited environment.
    pub envs: BTreeMap<String, String>,
    /// Mirror the child's stdout/stderr to the live log.
    pub mirror_output: bool,
    /// Line written to the live log right before the process starts.
    pub banner: String,
}

/// What a launcher knows about the process it started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LaunchedProcess {
    pub pid: Option<u32>,
}

/// Trait abstracting how the interpreter process is started.
pub trait ProcessLauncher: Send + Sync {
    /// Start the process described by `spec` and return as soon as it is
    /// running. Implementations must not wait for it to exit.
    fn launch(
        &self,
        spec: LaunchSpec,
    ) -> Pin<Box<dyn Future<Output = Result<LaunchedProcess>> + Send + '_>>;
}

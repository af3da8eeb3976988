// src/exec/local.rs

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;
use std::sync::Arc;

use tokio::process::Command;
use tracing::info;

use crate::errors::{DurableTaskError, Result};
use crate::exec::backend::{LaunchSpec, LaunchedProcess, ProcessLauncher};
use crate::exec::live_log::{LiveLog, TracingLiveLog, spawn_mirror};

#[cfg(windows)]
const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Launcher that starts the interpreter on this machine.
///
/// The child gets its own process group (Unix) or console process group
/// (Windows), so a Ctrl-C aimed at the controller does not reach it, and
/// `kill_on_drop` stays off: dropping the handle leaves the child running.
#[derive(Clone)]
pub struct LocalLauncher {
    live: Arc<dyn LiveLog>,
}

impl LocalLauncher {
    pub fn new(live: Arc<dyn LiveLog>) -> Self {
        Self { live }
    }
}

impl Default for LocalLauncher {
    fn default() -> Self {
        Self::new(Arc::new(TracingLiveLog))
    }
}

impl std::fmt::Debug for LocalLauncher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalLauncher").finish()
    }
}

impl ProcessLauncher for LocalLauncher {
    fn launch(
        &self,
        spec: LaunchSpec,
    ) -> Pin<Box<dyn Future<Output = Result<LaunchedProcess>> + Send + '_>> {
        let live = Arc::clone(&self.live);

        Box::pin(async move {
            let mut cmd = Command::new(&spec.program);
            cmd.args(&spec.args)
                .current_dir(&spec.cwd)
                .envs(&spec.envs)
                .stdin(Stdio::null())
                .kill_on_drop(false);

            if spec.mirror_output {
                cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
            } else {
                cmd.stdout(Stdio::null()).stderr(Stdio::null());
            }

            #[cfg(unix)]
            cmd.process_group(0);

            #[cfg(windows)]
            cmd.creation_flags(CREATE_NEW_PROCESS_GROUP | CREATE_NO_WINDOW);

            live.line(&spec.banner);

            let mut child = cmd.spawn().map_err(|source| DurableTaskError::LaunchFailed {
                binary: spec.program.clone(),
                source,
            })?;

            let pid = child.id();

            if let Some(stdout) = child.stdout.take() {
                spawn_mirror(stdout, Arc::clone(&live), "stdout", spec.task.clone());
            }
            if let Some(stderr) = child.stderr.take() {
                spawn_mirror(stderr, Arc::clone(&live), "stderr", spec.task.clone());
            }

            info!(
                task = %spec.task,
                program = %spec.program,
                cwd = ?spec.cwd,
                pid = ?pid,
                mirror_output = spec.mirror_output,
                "started detached process"
            );

            // The child is not awaited; tokio reaps it in the background
            // once it exits.
            drop(child);

            Ok(LaunchedProcess { pid })
        })
    }
}

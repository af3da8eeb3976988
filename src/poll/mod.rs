// src/poll/mod.rs

//! Reference polling loop.
//!
//! Turns repeated, non-blocking [`Controller`] probes into a final
//! [`TaskResult`]. Each cycle copies new log bytes to a sink, then checks the
//! result file. Because the helper closes its writers before it writes the
//! result, one last log copy after seeing the result yields the complete log.
//!
//! A missing result file cannot be told apart from a dead process, so the
//! loop can optionally give up when neither the log grows nor a result
//! appears for `stale_after`.

use std::io::Write;
use std::time::{Duration, Instant};

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::controller::{Controller, TaskStatus};
use crate::errors::{DurableTaskError, Result};
use crate::workspace::Workspace;

pub mod watcher;

pub use watcher::ControlDirWatcher;

/// Final state handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskResult {
    pub exit_code: i32,
    /// Captured stdout, for capturing tasks.
    pub output: Option<Vec<u8>>,
}

impl TaskResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    pub interval: Duration,
    /// Give up after this long without log growth or result. `None` waits
    /// forever.
    pub stale_after: Option<Duration>,
    /// Also wake on filesystem events in the control directory.
    pub fs_events: bool,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            stale_after: None,
            fs_events: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Poller {
    options: PollOptions,
}

impl Poller {
    pub fn new(options: PollOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &PollOptions {
        &self.options
    }

    /// One poll cycle: copy new log bytes into `sink`, then probe the result.
    ///
    /// Returns `Some` once the task has completed. The bool in the tuple says
    /// whether any log bytes were copied during this cycle.
    pub fn poll_once(
        &self,
        ws: &Workspace,
        controller: &mut Controller,
        sink: &mut (dyn Write + Send),
    ) -> Result<(Option<TaskResult>, bool)> {
        let mut progressed = controller.write_log(ws, sink)?;

        match controller.check_status(ws)? {
            TaskStatus::Running => Ok((None, progressed)),
            TaskStatus::Complete(exit_code) => {
                // Tail written between our log read and the result write.
                progressed |= controller.write_log(ws, sink)?;
                let output = controller.output(ws)?;
                info!(task = %controller.id(), exit_code, "task completed");
                Ok((Some(TaskResult { exit_code, output }), progressed))
            }
        }
    }

    /// Poll until the task completes, streaming its log into `sink`.
    pub async fn wait(
        &self,
        ws: &Workspace,
        controller: &mut Controller,
        sink: &mut (dyn Write + Send),
    ) -> Result<TaskResult> {
        let mut watcher = self.spawn_watcher(ws, controller);
        let mut last_progress = Instant::now();

        loop {
            let (result, progressed) = self.poll_once(ws, controller, sink)?;
            if let Some(result) = result {
                return Ok(result);
            }
            if progressed {
                last_progress = Instant::now();
            }

            if let Some(stale_after) = self.options.stale_after {
                let idle = last_progress.elapsed();
                if idle >= stale_after {
                    warn!(
                        task = %controller.id(),
                        idle = ?idle,
                        "no log growth and no result; giving up"
                    );
                    return Err(DurableTaskError::TaskStale {
                        id: controller.id().to_string(),
                        idle,
                    });
                }
            }

            match watcher.as_mut() {
                Some(w) => {
                    tokio::select! {
                        _ = sleep(self.options.interval) => {}
                        _ = w.changed() => {
                            debug!(task = %controller.id(), "woken by control directory event");
                        }
                    }
                }
                None => sleep(self.options.interval).await,
            }
        }
    }

    fn spawn_watcher(&self, ws: &Workspace, controller: &Controller) -> Option<ControlDirWatcher> {
        if !self.options.fs_events {
            return None;
        }
        let dir = controller.control_dir(ws);
        match ControlDirWatcher::spawn(&dir) {
            Ok(w) => Some(w),
            Err(err) => {
                warn!(
                    task = %controller.id(),
                    error = %err,
                    "filesystem events unavailable; polling only"
                );
                None
            }
        }
    }
}

// src/controller.rs

//! Durable handle on one control directory.
//!
//! A [`Controller`] holds no process handle and no open files. It names a
//! control directory by id and recomputes every path from the workspace it is
//! given, so it survives a restart of the controlling process: serialise it,
//! rebuild the [`Workspace`], deserialise, keep polling.
//!
//! Completion is signalled only by the result file. Its absence means
//! "running" or "died before finishing"; the two cannot be told apart here.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::{DurableTaskError, Result};
use crate::workspace::Workspace;

pub const SCRIPT_FILE: &str = "powershellScript.ps1";
pub const HELPER_FILE: &str = "powershellHelper.ps1";
pub const WRAPPER_FILE: &str = "powershellWrapper.ps1";
pub const LOG_FILE: &str = "task-log.txt";
pub const OUTPUT_FILE: &str = "output.txt";
pub const RESULT_FILE: &str = "task-result.txt";

/// Status derived from a single probe of the control directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// No result yet: still running, or died without writing one.
    Running,
    /// Result file holds this exit code. Final.
    Complete(i32),
}

impl TaskStatus {
    pub fn is_complete(&self) -> bool {
        matches!(self, TaskStatus::Complete(_))
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self {
            TaskStatus::Running => None,
            TaskStatus::Complete(code) => Some(*code),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Controller {
    id: String,
    #[serde(default)]
    capturing_output: bool,
    /// Bytes of the log already handed to a sink by [`Controller::write_log`].
    #[serde(default)]
    log_offset: u64,
}

impl Controller {
    /// Attach to the control directory `id` (e.g. after a restart).
    pub fn attach(id: impl Into<String>, capturing_output: bool) -> Self {
        Self {
            id: id.into(),
            capturing_output,
            log_offset: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn capturing_output(&self) -> bool {
        self.capturing_output
    }

    pub fn log_offset(&self) -> u64 {
        self.log_offset
    }

    pub fn control_dir(&self, ws: &Workspace) -> PathBuf {
        ws.control_dir(&self.id)
    }

    pub fn script_file(&self, ws: &Workspace) -> PathBuf {
        self.control_dir(ws).join(SCRIPT_FILE)
    }

    pub fn helper_file(&self, ws: &Workspace) -> PathBuf {
        self.control_dir(ws).join(HELPER_FILE)
    }

    pub fn wrapper_file(&self, ws: &Workspace) -> PathBuf {
        self.control_dir(ws).join(WRAPPER_FILE)
    }

    pub fn log_file(&self, ws: &Workspace) -> PathBuf {
        self.control_dir(ws).join(LOG_FILE)
    }

    pub fn output_file(&self, ws: &Workspace) -> PathBuf {
        self.control_dir(ws).join(OUTPUT_FILE)
    }

    pub fn result_file(&self, ws: &Workspace) -> PathBuf {
        self.control_dir(ws).join(RESULT_FILE)
    }

    /// Probe the result file once. Never blocks on the process.
    ///
    /// - control directory gone => [`DurableTaskError::ControlDirMissing`]
    /// - no result file, or an empty one (write in flight) => `Running`
    /// - decimal integer => `Complete(code)`
    /// - anything else => [`DurableTaskError::CorruptResult`]
    pub fn check_status(&self, ws: &Workspace) -> Result<TaskStatus> {
        self.ensure_control_dir(ws)?;

        let result = self.result_file(ws);
        if !ws.fs().exists(&result) {
            return Ok(TaskStatus::Running);
        }

        let content = ws.fs().read(&result)?;
        match parse_result(&result, &content)? {
            Some(code) => {
                debug!(task = %self.id, exit_code = code, "result file present");
                Ok(TaskStatus::Complete(code))
            }
            None => {
                debug!(task = %self.id, "result file empty; treating as running");
                Ok(TaskStatus::Running)
            }
        }
    }

    /// Copy log bytes appended since the last call into `sink`.
    ///
    /// Returns whether anything was copied. A trailing partial line is copied
    /// as-is; the rest of it arrives on a later call.
    pub fn write_log(&mut self, ws: &Workspace, sink: &mut dyn Write) -> Result<bool> {
        self.ensure_control_dir(ws)?;

        let log = self.log_file(ws);
        if !ws.fs().exists(&log) {
            return Ok(false);
        }

        let chunk = ws.fs().read_from(&log, self.log_offset)?;
        if chunk.is_empty() {
            return Ok(false);
        }

        sink.write_all(&chunk)?;
        sink.flush()?;
        self.log_offset += chunk.len() as u64;
        Ok(true)
    }

    /// Entire log as written so far; empty if the helper has not created it.
    pub fn log_content(&self, ws: &Workspace) -> Result<Vec<u8>> {
        self.ensure_control_dir(ws)?;
        let log = self.log_file(ws);
        if !ws.fs().exists(&log) {
            return Ok(Vec::new());
        }
        Ok(ws.fs().read(&log)?)
    }

    /// Captured stdout. `None` when not capturing or not written yet.
    pub fn output(&self, ws: &Workspace) -> Result<Option<Vec<u8>>> {
        if !self.capturing_output {
            return Ok(None);
        }
        self.ensure_control_dir(ws)?;
        let output = self.output_file(ws);
        if !ws.fs().exists(&output) {
            return Ok(None);
        }
        Ok(Some(ws.fs().read(&output)?))
    }

    /// Persist this handle so a later process can [`Controller::load`] it.
    pub fn save(&self, ws: &Workspace) -> Result<()> {
        let path = ws.handle_file(&self.id);
        ws.fs().write(&path, self.to_toml()?.as_bytes())?;
        debug!(task = %self.id, handle = ?path, "saved controller handle");
        Ok(())
    }

    /// Reattach to `id` from its saved handle.
    ///
    /// Without a saved handle the task is assumed not to capture output.
    pub fn load(ws: &Workspace, id: &str) -> Result<Self> {
        let path = ws.handle_file(id);
        if !ws.fs().is_file(&path) {
            debug!(task = %id, "no saved handle; attaching without output capture");
            return Ok(Self::attach(id, false));
        }
        Self::from_toml(&ws.fs().read_to_string(&path)?)
    }

    /// Remove the control directory and any saved handle. Removing an absent
    /// one is not an error.
    pub fn cleanup(&self, ws: &Workspace) -> Result<()> {
        let handle = ws.handle_file(&self.id);
        if ws.fs().is_file(&handle) {
            ws.fs().remove_file(&handle)?;
        }

        let dir = self.control_dir(ws);
        if !ws.fs().is_dir(&dir) {
            warn!(task = %self.id, control_dir = ?dir, "control directory already gone");
            return Ok(());
        }
        ws.fs().remove_dir_all(&dir)?;
        info!(task = %self.id, control_dir = ?dir, "removed control directory");
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }

    pub fn from_toml(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    fn ensure_control_dir(&self, ws: &Workspace) -> Result<()> {
        let dir = self.control_dir(ws);
        if ws.fs().is_dir(&dir) {
            Ok(())
        } else {
            Err(DurableTaskError::ControlDirMissing(dir))
        }
    }
}

/// Parse result file content.
///
/// Surrounding whitespace and a leading BOM are ignored. Empty content yields
/// `Ok(None)`.
pub fn parse_result(path: &Path, content: &[u8]) -> Result<Option<i32>> {
    let text = String::from_utf8_lossy(content);
    let trimmed = text.trim_start_matches('\u{feff}').trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<i32>()
        .map(Some)
        .map_err(|_| DurableTaskError::CorruptResult {
            path: path.to_path_buf(),
            content: trimmed.to_string(),
        })
}

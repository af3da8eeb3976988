use std::sync::Arc;

use durabletask::controller::Controller;
use durabletask::fs::mock::MockFileSystem;
use durabletask::script::ExitCodePolicy;
use durabletask::workspace::Workspace;

/// Root of the workspace used by mock-filesystem tests.
pub const MOCK_WORKSPACE: &str = "/jobs/build";

/// A workspace on a fresh `MockFileSystem`. The returned mock shares storage
/// with the workspace, so tests can play the child process through it.
pub fn mock_workspace() -> (MockFileSystem, Workspace) {
    let fs = MockFileSystem::new();
    let ws = Workspace::open(MOCK_WORKSPACE, Arc::new(fs.clone()))
        .expect("opening mock workspace");
    (fs, ws)
}

#[derive(Debug, Clone)]
enum Line {
    Stdout(String),
    Stderr(String),
}

/// Plays the helper routine against a mock control directory: writes the log,
/// the output file when capturing, then the result file last.
#[derive(Debug, Clone)]
pub struct ScriptedRun {
    lines: Vec<Line>,
    policy: ExitCodePolicy,
}

impl Default for ScriptedRun {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedRun {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            policy: ExitCodePolicy {
                last_exit_code: None,
                succeeded: true,
                error_caught: false,
            },
        }
    }

    pub fn stdout(mut self, line: &str) -> Self {
        self.lines.push(Line::Stdout(line.to_string()));
        self
    }

    pub fn stderr(mut self, line: &str) -> Self {
        self.lines.push(Line::Stderr(line.to_string()));
        self
    }

    /// Native `exit <code>` in the script.
    pub fn exit(mut self, code: i32) -> Self {
        self.policy.last_exit_code = Some(code);
        self.policy.succeeded = code == 0;
        self
    }

    /// Unhandled error caught by the helper.
    pub fn throw(mut self, message: &str) -> Self {
        self.lines.push(Line::Stderr(message.to_string()));
        self.policy.error_caught = true;
        self
    }

    pub fn exit_code(&self) -> i32 {
        self.policy.resolve()
    }

    /// Write only the log lines, as a still-running helper would.
    pub fn write_partial_log(&self, fs: &MockFileSystem, ws: &Workspace, controller: &Controller) {
        fs.append(controller.log_file(ws), b"");
        for line in &self.lines {
            let text = match line {
                Line::Stdout(s) | Line::Stderr(s) => s,
            };
            fs.append(controller.log_file(ws), format!("{text}\n").as_bytes());
        }
    }

    /// Run to completion.
    pub fn complete(&self, fs: &MockFileSystem, ws: &Workspace, controller: &Controller) {
        self.write_partial_log(fs, ws, controller);
        self.finish(fs, ws, controller);
    }

    /// Write the output file (when capturing) and then the result file, as
    /// the helper's `finally` block does after the log is complete.
    pub fn finish(&self, fs: &MockFileSystem, ws: &Workspace, controller: &Controller) {
        if controller.capturing_output() {
            let mut out = Vec::new();
            for line in &self.lines {
                if let Line::Stdout(s) = line {
                    out.extend_from_slice(s.as_bytes());
                    out.push(b'\n');
                }
            }
            fs.add_file(controller.output_file(ws), out);
        }

        fs.add_file(
            controller.result_file(ws),
            format!("{}\r\n", self.exit_code()),
        );
    }
}

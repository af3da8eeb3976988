#![allow(unused_imports, dead_code)]

pub use durabletask_test_utils::fake_launcher::FakeLauncher;
pub use durabletask_test_utils::fixtures::{MOCK_WORKSPACE, ScriptedRun, mock_workspace};
pub use durabletask_test_utils::{init_tracing, with_timeout};

use std::process::{Command, Stdio};

/// Whether a `pwsh` binary can be started on this machine.
pub fn pwsh_available() -> bool {
    Command::new("pwsh")
        .args(["-NoProfile", "-NonInteractive", "-Command", "exit 0"])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

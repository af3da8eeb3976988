use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use durabletask::errors::{DurableTaskError, Result};
use durabletask::exec::{LaunchSpec, LaunchedProcess, ProcessLauncher};

/// A fake launcher that:
/// - records every `LaunchSpec` it is handed
/// - never spawns a process
/// - optionally fails like a missing interpreter binary.
#[derive(Clone, Default)]
pub struct FakeLauncher {
    launched: Arc<Mutex<Vec<LaunchSpec>>>,
    fail: bool,
}

impl FakeLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// A launcher whose every launch fails with `NotFound`.
    pub fn failing() -> Self {
        Self {
            launched: Arc::default(),
            fail: true,
        }
    }

    pub fn launched(&self) -> Vec<LaunchSpec> {
        self.launched.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<LaunchSpec> {
        self.launched.lock().unwrap().last().cloned()
    }
}

impl ProcessLauncher for FakeLauncher {
    fn launch(
        &self,
        spec: LaunchSpec,
    ) -> Pin<Box<dyn Future<Output = Result<LaunchedProcess>> + Send + '_>> {
        let launched = Arc::clone(&self.launched);
        let fail = self.fail;

        Box::pin(async move {
            if fail {
                return Err(DurableTaskError::LaunchFailed {
                    binary: spec.program,
                    source: io::Error::new(io::ErrorKind::NotFound, "no such file or directory"),
                });
            }
            launched.lock().unwrap().push(spec);
            Ok(LaunchedProcess { pid: Some(4242) })
        })
    }
}

// src/poll/watcher.rs

use std::path::Path;

use anyhow::Result;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Wakes the poller when something changes in a control directory.
///
/// Purely an accelerator: events can be coalesced or lost (network mounts
/// often deliver none), so the poller keeps its fixed cadence as well.
/// Dropping the handle stops watching.
pub struct ControlDirWatcher {
    _inner: RecommendedWatcher,
    rx: mpsc::UnboundedReceiver<()>,
}

impl std::fmt::Debug for ControlDirWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlDirWatcher").finish()
    }
}

impl ControlDirWatcher {
    /// Start watching `dir` (non-recursively).
    pub fn spawn(dir: &Path) -> Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel::<()>();

        // Called synchronously by notify on its own thread.
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    debug!(?event, "control directory event");
                    let _ = tx.send(());
                }
                Err(err) => {
                    debug!(error = %err, "control directory watch error");
                }
            },
            Config::default(),
        )?;

        watcher.watch(dir, RecursiveMode::NonRecursive)?;
        info!(control_dir = ?dir, "watching control directory for changes");

        Ok(Self {
            _inner: watcher,
            rx,
        })
    }

    /// Wait for the next change, then swallow any queued duplicates.
    pub async fn changed(&mut self) {
        if self.rx.recv().await.is_some() {
            while self.rx.try_recv().is_ok() {}
        } else {
            // Sender lives in the watcher we own, so this only happens while
            // dropping; park instead of spinning the poll loop.
            std::future::pending::<()>().await;
        }
    }
}

// src/exec/live_log.rs

//! Live log sinks.
//!
//! The live log is the host's view of a running task: the launch banner and
//! whatever the child prints to stdout/stderr. It is independent from the
//! on-disk log in the control directory, which the helper writes itself.

use std::io::Write;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinHandle;
use tracing::{debug, info};

pub trait LiveLog: Send + Sync {
    fn line(&self, line: &str);
}

/// Emits each line as a `tracing` event.
#[derive(Debug, Clone, Default)]
pub struct TracingLiveLog;

impl LiveLog for TracingLiveLog {
    fn line(&self, line: &str) {
        info!(target: "durabletask::live", "{}", line);
    }
}

/// Prints each line to stdout; used by the CLI.
#[derive(Debug, Clone, Default)]
pub struct StdoutLiveLog;

impl LiveLog for StdoutLiveLog {
    fn line(&self, line: &str) {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        let _ = writeln!(handle, "{line}");
    }
}

/// Forward every line from `reader` to `live` until EOF.
///
/// Lines that are not valid UTF-8 are forwarded lossily and the pipe is
/// drained to EOF, so the child never writes into a closed stdout/stderr.
/// The returned handle completes once the pipe is closed.
pub fn spawn_mirror<R>(
    reader: R,
    live: Arc<dyn LiveLog>,
    stream: &'static str,
    task: String,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    let text = String::from_utf8_lossy(&buf);
                    live.line(text.trim_end_matches(['\n', '\r']));
                }
                Err(err) => {
                    debug!(task = %task, stream, error = %err, "live log read failed");
                    break;
                }
            }
        }
        debug!(task = %task, stream, "live log mirror finished");
    })
}

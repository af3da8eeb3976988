// src/lib.rs

pub mod cli;
pub mod config;
pub mod controller;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod poll;
pub mod script;
pub mod task;
pub mod types;
pub mod workspace;

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use crate::cli::{CliArgs, Command, LaunchArgs};
use crate::config::{ConfigFile, load_or_default};
use crate::controller::{Controller, TaskStatus};
use crate::exec::{LiveLog, LocalLauncher, StdoutLiveLog, TracingLiveLog};
use crate::fs::RealFileSystem;
use crate::poll::Poller;
use crate::task::{LaunchOptions, PowershellScript};
use crate::workspace::Workspace;

pub use crate::errors::DurableTaskError;

/// High-level entry point used by `main.rs`.
///
/// Returns the process exit code: the task's own exit code for `run` and
/// `wait`, `0` for the other subcommands.
pub async fn run(args: CliArgs) -> Result<i32> {
    let cfg = load_or_default(&args.config)?;
    let ws = Workspace::open(&args.workspace, Arc::new(RealFileSystem))?;
    debug!(workspace = ?ws.root(), "opened workspace");

    match args.command {
        Command::Launch(launch) => {
            let controller = launch_task(&ws, &cfg, &launch, false).await?;
            controller.save(&ws)?;
            println!("{}", controller.id());
            Ok(0)
        }
        Command::Run(launch) => {
            let mut controller = launch_task(&ws, &cfg, &launch, true).await?;
            controller.save(&ws)?;
            follow(&ws, &cfg, &mut controller).await
        }
        Command::Status(task) => {
            let controller = Controller::load(&ws, &task.id)?;
            match controller.check_status(&ws)? {
                TaskStatus::Running => println!("running"),
                TaskStatus::Complete(code) => println!("complete {code}"),
            }
            Ok(0)
        }
        Command::Log(task) => {
            let controller = Controller::load(&ws, &task.id)?;
            let log = controller.log_content(&ws)?;
            std::io::stdout().write_all(&log)?;
            Ok(0)
        }
        Command::Output(task) => {
            let controller = Controller::load(&ws, &task.id)?;
            let output = controller
                .output(&ws)?
                .context("no output file (task not capturing, or not started yet)")?;
            std::io::stdout().write_all(&output)?;
            Ok(0)
        }
        Command::Wait(task) => {
            let mut controller = Controller::load(&ws, &task.id)?;
            follow(&ws, &cfg, &mut controller).await
        }
        Command::Cleanup(task) => {
            Controller::load(&ws, &task.id)?.cleanup(&ws)?;
            Ok(0)
        }
    }
}

async fn launch_task(
    ws: &Workspace,
    cfg: &ConfigFile,
    args: &LaunchArgs,
    attached: bool,
) -> Result<Controller> {
    let body = match (&args.file, &args.inline) {
        (Some(path), _) => std::fs::read_to_string(path)
            .with_context(|| format!("reading script {:?}", path))?,
        (None, Some(inline)) => inline.clone(),
        (None, None) => anyhow::bail!("either --file or --inline is required"),
    };

    let mut script = PowershellScript::new(body);
    if args.capture {
        script.capture_output();
    }

    // A detached launch exits right away; nobody would drain the pipes.
    let live: Arc<dyn LiveLog> = if attached {
        Arc::new(StdoutLiveLog)
    } else {
        Arc::new(TracingLiveLog)
    };
    let launcher = LocalLauncher::new(live);

    let options = LaunchOptions {
        platform: args.platform.unwrap_or_else(|| cfg.platform()),
        envs: args.envs.iter().cloned().collect(),
        mirror_output: attached && cfg.mirror_output(),
    };

    Ok(script.launch(ws, &launcher, &options).await?)
}

/// Stream the task's log to stdout until it completes.
///
/// Captured output is not printed here; the log already carries stdout and
/// `output` prints the capture on its own.
async fn follow(ws: &Workspace, cfg: &ConfigFile, controller: &mut Controller) -> Result<i32> {
    let poller = Poller::new(cfg.poll_options());
    let mut stdout = std::io::stdout();
    let result = poller.wait(ws, controller, &mut stdout).await?;

    if let Some(output) = &result.output {
        debug!(bytes = output.len(), "captured output");
    }

    Ok(result.exit_code)
}

// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::DEFAULT_CONFIG_FILE;
use crate::types::Platform;

/// Command-line arguments for `durabletask`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "durabletask",
    version,
    about = "Run PowerShell scripts as durable, detached tasks supervised through a control directory.",
    long_about = None
)]
pub struct CliArgs {
    /// Workspace the script runs in. Control directories live next to it in
    /// `<workspace>@tmp/`.
    #[arg(long, short = 'w', value_name = "DIR", default_value = ".", global = true)]
    pub workspace: PathBuf,

    /// Path to the config file (TOML). A missing file means defaults.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG_FILE, global = true)]
    pub config: PathBuf,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DURABLETASK_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Start a script detached and print its task id.
    Launch(LaunchArgs),

    /// Start a script, follow its log and exit with its exit code.
    Run(LaunchArgs),

    /// Print `running` or `complete <code>` for a task.
    Status(TaskRef),

    /// Print the task's log as written so far.
    Log(TaskRef),

    /// Print the task's captured stdout.
    Output(TaskRef),

    /// Follow the log of a launched task until it completes.
    Wait(TaskRef),

    /// Remove the task's control directory.
    Cleanup(TaskRef),
}

#[derive(Debug, Clone, Args)]
pub struct LaunchArgs {
    /// File holding the script body.
    #[arg(long, short = 'f', value_name = "PATH", conflicts_with = "inline", required_unless_present = "inline")]
    pub file: Option<PathBuf>,

    /// Script body given inline.
    #[arg(long, short = 'c', value_name = "SCRIPT")]
    pub inline: Option<String>,

    /// Also capture stdout into a separate output file.
    #[arg(long)]
    pub capture: bool,

    /// Target platform class; overrides `[launch].platform`.
    #[arg(long, value_parser = parse_platform, value_name = "PLATFORM")]
    pub platform: Option<Platform>,

    /// Extra environment variable for the script (repeatable).
    #[arg(long = "env", short = 'e', value_parser = parse_env_pair, value_name = "KEY=VALUE")]
    pub envs: Vec<(String, String)>,
}

#[derive(Debug, Clone, Args)]
pub struct TaskRef {
    /// Task id (control directory name, e.g. `durable-1a2b3c4d`).
    pub id: String,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

fn parse_platform(s: &str) -> Result<Platform, String> {
    s.parse()
}

fn parse_env_pair(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("invalid environment assignment: {s} (expected KEY=VALUE)")),
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

// tests/pwsh_scenarios.rs
//
// End-to-end runs against a real `pwsh`. Each test returns early when no
// PowerShell 7 is installed.

mod common;
use crate::common::{init_tracing, pwsh_available};

use std::collections::BTreeMap;
use std::error::Error;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use durabletask::controller::Controller;
use durabletask::exec::{LiveLog, LocalLauncher};
use durabletask::fs::RealFileSystem;
use durabletask::poll::{PollOptions, Poller, TaskResult};
use durabletask::script::UTF8_BOM;
use durabletask::task::{LaunchOptions, PowershellScript};
use durabletask::types::Platform;
use durabletask::workspace::Workspace;
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn Error>>;

#[derive(Default)]
struct CollectingLiveLog {
    lines: Mutex<Vec<String>>,
}

impl LiveLog for CollectingLiveLog {
    fn line(&self, line: &str) {
        self.lines.lock().unwrap().push(line.to_string());
    }
}

struct Run {
    _tmp: TempDir,
    ws: Workspace,
    controller: Controller,
    result: TaskResult,
    live: Arc<CollectingLiveLog>,
}

async fn run_script(body: &str, capture: bool) -> Result<Run, Box<dyn Error>> {
    init_tracing();
    let tmp = tempfile::tempdir()?;
    let ws = Workspace::open(tmp.path().join("job"), Arc::new(RealFileSystem))?;

    let live = Arc::new(CollectingLiveLog::default());
    let launcher = LocalLauncher::new(live.clone());
    let options = LaunchOptions {
        platform: Platform::Posix,
        envs: BTreeMap::new(),
        mirror_output: true,
    };

    let mut script = PowershellScript::new(body);
    if capture {
        script.capture_output();
    }
    let mut controller = script.launch(&ws, &launcher, &options).await?;

    let poller = Poller::new(PollOptions {
        interval: Duration::from_millis(100),
        stale_after: None,
        fs_events: true,
    });
    let mut sink = Vec::new();
    let result = tokio::time::timeout(
        Duration::from_secs(60),
        poller.wait(&ws, &mut controller, &mut sink),
    )
    .await??;

    Ok(Run {
        _tmp: tmp,
        ws,
        controller,
        result,
        live,
    })
}

#[tokio::test]
async fn clean_exit_reports_zero() -> TestResult {
    if !pwsh_available() {
        eprintln!("pwsh not installed; skipping");
        return Ok(());
    }

    let run = run_script("exit 0", true).await?;
    assert_eq!(run.result.exit_code, 0);
    assert!(run.controller.log_content(&run.ws)?.is_empty());
    assert_eq!(run.result.output, Some(Vec::new()));

    let lines = run.live.lines.lock().unwrap().clone();
    assert_eq!(lines.first().map(String::as_str), Some("[job] Running PowerShell script"));
    Ok(())
}

#[tokio::test]
async fn captured_stdout_and_native_exit_code() -> TestResult {
    if !pwsh_available() {
        eprintln!("pwsh not installed; skipping");
        return Ok(());
    }

    let run = run_script("Write-Output 'hi'; exit 3", true).await?;
    assert_eq!(run.result.exit_code, 3);

    let output = String::from_utf8(run.result.output.clone().expect("capturing"))?;
    assert_eq!(output.trim_end(), "hi");
    assert!(output.ends_with('\n'));

    let log = run.controller.log_content(&run.ws)?;
    assert!(!log.starts_with(&UTF8_BOM));
    assert!(String::from_utf8(log)?.contains("hi"));
    Ok(())
}

#[tokio::test]
async fn unhandled_error_is_logged_and_fails() -> TestResult {
    if !pwsh_available() {
        eprintln!("pwsh not installed; skipping");
        return Ok(());
    }

    let run = run_script("throw 'kaboom from the script'", false).await?;
    assert_eq!(run.result.exit_code, 1);
    assert_eq!(run.result.output, None);
    assert!(!run.controller.output_file(&run.ws).exists());

    let log = String::from_utf8(run.controller.log_content(&run.ws)?)?;
    assert!(log.contains("kaboom from the script"));
    Ok(())
}

#[tokio::test]
async fn environment_reaches_the_script() -> TestResult {
    if !pwsh_available() {
        eprintln!("pwsh not installed; skipping");
        return Ok(());
    }

    init_tracing();
    let tmp = tempfile::tempdir()?;
    let ws = Workspace::open(tmp.path().join("job"), Arc::new(RealFileSystem))?;
    let mut options = LaunchOptions {
        platform: Platform::Posix,
        envs: BTreeMap::new(),
        mirror_output: false,
    };
    options
        .envs
        .insert("DURABLETASK_GREETING".to_string(), "bonjour".to_string());

    let mut script = PowershellScript::new("Write-Output $env:DURABLETASK_GREETING");
    script.capture_output();
    let mut controller = script
        .launch(&ws, &LocalLauncher::default(), &options)
        .await?;

    let mut sink = Vec::new();
    let result = tokio::time::timeout(
        Duration::from_secs(60),
        Poller::default().wait(&ws, &mut controller, &mut sink),
    )
    .await??;

    assert_eq!(result.exit_code, 0);
    let output = String::from_utf8(result.output.expect("capturing"))?;
    assert_eq!(output.trim_end(), "bonjour");

    controller.cleanup(&ws)?;
    assert!(!controller.control_dir(&ws).exists());
    Ok(())
}

// tests/controller_status.rs

mod common;
use crate::common::init_tracing;

use std::error::Error;
use std::fs;
use std::sync::Arc;

use durabletask::controller::{Controller, TaskStatus};
use durabletask::errors::DurableTaskError;
use durabletask::fs::RealFileSystem;
use durabletask::workspace::Workspace;
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn Error>>;

/// Real workspace with one allocated control directory.
fn setup(capturing: bool) -> Result<(TempDir, Workspace, Controller), Box<dyn Error>> {
    init_tracing();
    let tmp = tempfile::tempdir()?;
    let ws = Workspace::open(tmp.path().join("job"), Arc::new(RealFileSystem))?;
    let id = ws.allocate_control_dir()?;
    Ok((tmp, ws, Controller::attach(id, capturing)))
}

#[test]
fn missing_result_file_means_running() -> TestResult {
    let (_tmp, ws, controller) = setup(false)?;
    assert_eq!(controller.check_status(&ws)?, TaskStatus::Running);
    Ok(())
}

#[test]
fn result_file_holds_the_exit_code() -> TestResult {
    let (_tmp, ws, controller) = setup(false)?;
    fs::write(controller.result_file(&ws), "0")?;
    assert_eq!(controller.check_status(&ws)?, TaskStatus::Complete(0));

    fs::write(controller.result_file(&ws), "3\r\n")?;
    let status = controller.check_status(&ws)?;
    assert_eq!(status, TaskStatus::Complete(3));
    assert!(status.is_complete());
    assert_eq!(status.exit_code(), Some(3));
    Ok(())
}

#[test]
fn rereading_a_completed_result_is_stable() -> TestResult {
    let (_tmp, ws, controller) = setup(false)?;
    fs::write(controller.result_file(&ws), "255\n")?;
    for _ in 0..5 {
        assert_eq!(controller.check_status(&ws)?, TaskStatus::Complete(255));
    }
    Ok(())
}

#[test]
fn leading_bom_and_whitespace_are_ignored() -> TestResult {
    let (_tmp, ws, controller) = setup(false)?;
    fs::write(controller.result_file(&ws), b"\xEF\xBB\xBF  42 \r\n")?;
    assert_eq!(controller.check_status(&ws)?, TaskStatus::Complete(42));
    Ok(())
}

#[test]
fn negative_exit_codes_parse() -> TestResult {
    let (_tmp, ws, controller) = setup(false)?;
    fs::write(controller.result_file(&ws), "-1073741510")?;
    assert_eq!(controller.check_status(&ws)?, TaskStatus::Complete(-1073741510));
    Ok(())
}

#[test]
fn empty_result_file_is_still_running() -> TestResult {
    let (_tmp, ws, controller) = setup(false)?;
    fs::write(controller.result_file(&ws), "")?;
    assert_eq!(controller.check_status(&ws)?, TaskStatus::Running);
    fs::write(controller.result_file(&ws), "\r\n")?;
    assert_eq!(controller.check_status(&ws)?, TaskStatus::Running);
    Ok(())
}

#[test]
fn garbage_result_file_is_reported_as_corrupt() -> TestResult {
    let (_tmp, ws, controller) = setup(false)?;
    fs::write(controller.result_file(&ws), "not a number")?;

    match controller.check_status(&ws) {
        Err(DurableTaskError::CorruptResult { path, content }) => {
            assert_eq!(path, controller.result_file(&ws));
            assert_eq!(content, "not a number");
        }
        other => panic!("expected CorruptResult, got {other:?}"),
    }
    Ok(())
}

#[test]
fn deleted_control_directory_is_distinct_from_running() -> TestResult {
    let (_tmp, ws, mut controller) = setup(false)?;
    fs::remove_dir_all(controller.control_dir(&ws))?;

    match controller.check_status(&ws) {
        Err(DurableTaskError::ControlDirMissing(dir)) => {
            assert_eq!(dir, controller.control_dir(&ws));
        }
        other => panic!("expected ControlDirMissing, got {other:?}"),
    }

    let mut sink = Vec::new();
    assert!(matches!(
        controller.write_log(&ws, &mut sink),
        Err(DurableTaskError::ControlDirMissing(_))
    ));
    Ok(())
}

#[test]
fn write_log_copies_only_new_bytes() -> TestResult {
    let (_tmp, ws, mut controller) = setup(false)?;
    let mut sink = Vec::new();

    // Helper has not created the log yet.
    assert!(!controller.write_log(&ws, &mut sink)?);

    fs::write(controller.log_file(&ws), "first line\nsecond ")?;
    assert!(controller.write_log(&ws, &mut sink)?);
    assert_eq!(sink, b"first line\nsecond ");
    assert_eq!(controller.log_offset(), 18);

    // Nothing new.
    assert!(!controller.write_log(&ws, &mut sink)?);

    fs::write(controller.log_file(&ws), "first line\nsecond line\n")?;
    assert!(controller.write_log(&ws, &mut sink)?);
    assert_eq!(sink, b"first line\nsecond line\n");
    assert_eq!(controller.log_content(&ws)?, b"first line\nsecond line\n");
    Ok(())
}

#[test]
fn output_is_only_read_for_capturing_tasks() -> TestResult {
    let (_tmp, ws, controller) = setup(false)?;
    fs::write(controller.output_file(&ws), "ignored")?;
    assert_eq!(controller.output(&ws)?, None);

    let capturing = Controller::attach(controller.id(), true);
    assert_eq!(capturing.output(&ws)?, Some(b"ignored".to_vec()));
    Ok(())
}

#[test]
fn capturing_task_without_output_yet_returns_none() -> TestResult {
    let (_tmp, ws, controller) = setup(true)?;
    assert_eq!(controller.output(&ws)?, None);
    Ok(())
}

#[test]
fn cleanup_removes_the_control_directory_once() -> TestResult {
    let (_tmp, ws, controller) = setup(false)?;
    fs::write(controller.log_file(&ws), "log")?;

    controller.cleanup(&ws)?;
    assert!(!controller.control_dir(&ws).exists());

    // Second cleanup is a no-op.
    controller.cleanup(&ws)?;
    Ok(())
}

#[test]
fn controller_survives_a_restart() -> TestResult {
    let (tmp, ws, mut controller) = setup(true)?;
    fs::write(controller.log_file(&ws), "before restart\n")?;
    let mut sink = Vec::new();
    controller.write_log(&ws, &mut sink)?;

    let saved = controller.to_toml()?;
    drop(controller);
    drop(ws);

    // New process: rebuild the workspace and reattach from the saved handle.
    let ws = Workspace::open(tmp.path().join("job"), Arc::new(RealFileSystem))?;
    let mut controller = Controller::from_toml(&saved)?;
    assert!(controller.capturing_output());
    assert_eq!(controller.log_offset(), 15);

    let mut log = fs::read(controller.log_file(&ws))?;
    log.extend_from_slice(b"after restart\n");
    fs::write(controller.log_file(&ws), &log)?;
    fs::write(controller.result_file(&ws), "0")?;

    let mut sink = Vec::new();
    controller.write_log(&ws, &mut sink)?;
    assert_eq!(sink, b"after restart\n");
    assert_eq!(controller.check_status(&ws)?, TaskStatus::Complete(0));
    Ok(())
}

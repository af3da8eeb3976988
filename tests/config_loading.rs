// tests/config_loading.rs

use std::error::Error;
use std::fs;
use std::time::Duration;

use durabletask::config::{
    ConfigFile, MIN_POLL_INTERVAL_MS, load_and_validate, load_from_path, load_or_default,
};
use durabletask::errors::DurableTaskError;
use durabletask::types::Platform;
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn Error>>;

fn write_config(contents: &str) -> Result<(TempDir, std::path::PathBuf), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("Durabletask.toml");
    fs::write(&path, contents)?;
    Ok((dir, path))
}

#[test]
fn full_config_is_loaded() -> TestResult {
    let (_dir, path) = write_config(
        r#"
[launch]
platform = "windows"
mirror_output = false

[poll]
interval_ms = 250
stale_after_secs = 600
fs_events = false
"#,
    )?;

    let cfg = load_and_validate(&path)?;
    assert_eq!(cfg.platform(), Platform::Windows);
    assert!(!cfg.mirror_output());

    let poll = cfg.poll_options();
    assert_eq!(poll.interval, Duration::from_millis(250));
    assert_eq!(poll.stale_after, Some(Duration::from_secs(600)));
    assert!(!poll.fs_events);
    Ok(())
}

#[test]
fn empty_file_means_defaults() -> TestResult {
    let (_dir, path) = write_config("")?;
    let cfg = load_and_validate(&path)?;

    assert_eq!(cfg.platform(), Platform::current());
    assert!(cfg.mirror_output());
    let poll = cfg.poll_options();
    assert_eq!(poll.interval, Duration::from_secs(1));
    assert_eq!(poll.stale_after, None);
    assert!(poll.fs_events);
    Ok(())
}

#[test]
fn missing_file_means_defaults() -> TestResult {
    let dir = tempfile::tempdir()?;
    let cfg = load_or_default(dir.path().join("nope.toml"))?;
    assert_eq!(cfg.poll_options(), ConfigFile::default().poll_options());
    Ok(())
}

#[test]
fn missing_file_is_an_error_for_strict_loading() -> TestResult {
    let dir = tempfile::tempdir()?;
    let err = load_and_validate(dir.path().join("nope.toml")).expect_err("file is missing");
    assert!(matches!(err, DurableTaskError::IoError(_)));
    Ok(())
}

#[test]
fn zero_stale_after_disables_the_timeout() -> TestResult {
    let (_dir, path) = write_config("[poll]\nstale_after_secs = 0\n")?;
    assert_eq!(load_and_validate(&path)?.poll_options().stale_after, None);
    Ok(())
}

#[test]
fn too_small_interval_is_rejected() -> TestResult {
    let (_dir, path) = write_config(&format!(
        "[poll]\ninterval_ms = {}\n",
        MIN_POLL_INTERVAL_MS - 1
    ))?;

    match load_and_validate(&path) {
        Err(DurableTaskError::ConfigError(msg)) => assert!(msg.contains("interval_ms")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
    Ok(())
}

#[test]
fn stale_timeout_shorter_than_interval_is_rejected() -> TestResult {
    let (_dir, path) = write_config("[poll]\ninterval_ms = 5000\nstale_after_secs = 2\n")?;
    assert!(matches!(
        load_and_validate(&path),
        Err(DurableTaskError::ConfigError(_))
    ));
    Ok(())
}

#[test]
fn unknown_platform_is_a_parse_error() -> TestResult {
    let (_dir, path) = write_config("[launch]\nplatform = \"beos\"\n")?;
    assert!(matches!(
        load_from_path(&path),
        Err(DurableTaskError::TomlError(_))
    ));
    Ok(())
}

#[test]
fn unknown_keys_are_rejected() -> TestResult {
    let (_dir, path) = write_config("[poll]\ninterval = 100\n")?;
    assert!(matches!(
        load_from_path(&path),
        Err(DurableTaskError::TomlError(_))
    ));

    let (_dir, path) = write_config("[logging]\nlevel = \"debug\"\n")?;
    assert!(load_or_default(&path).is_err());
    Ok(())
}

// tests/live_log.rs

mod common;
use crate::common::{init_tracing, with_timeout};

use std::error::Error;
use std::sync::{Arc, Mutex};

use durabletask::exec::LiveLog;
use durabletask::exec::live_log::spawn_mirror;

type TestResult = Result<(), Box<dyn Error>>;

#[derive(Default)]
struct Lines(Mutex<Vec<String>>);

impl LiveLog for Lines {
    fn line(&self, line: &str) {
        self.0.lock().unwrap().push(line.to_string());
    }
}

#[tokio::test]
async fn mirror_keeps_going_past_invalid_utf8() -> TestResult {
    init_tracing();
    let live = Arc::new(Lines::default());
    let pipe: &'static [u8] = b"before\n\xff\xfe cp1252 line\nafter 1\r\nafter 2\n";

    with_timeout(spawn_mirror(pipe, live.clone(), "stderr", "durable-test".to_string())).await?;

    let lines = live.0.lock().unwrap().clone();
    assert_eq!(
        lines,
        vec![
            "before".to_string(),
            "\u{fffd}\u{fffd} cp1252 line".to_string(),
            "after 1".to_string(),
            "after 2".to_string(),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn mirror_forwards_a_final_unterminated_line() -> TestResult {
    init_tracing();
    let live = Arc::new(Lines::default());
    let pipe: &'static [u8] = b"one\ntwo";

    with_timeout(spawn_mirror(pipe, live.clone(), "stdout", "durable-test".to_string())).await?;

    assert_eq!(*live.0.lock().unwrap(), vec!["one", "two"]);
    Ok(())
}

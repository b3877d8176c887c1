//! Tests for running the simulation binary.
//!
//! Standard Unix tools stand in for the simulation; they accept (or ignore)
//! the five positional arguments.

#![cfg(all(unix, feature = "run"))]

use ferry_log_check::{runner, RunConfig, RunError};
use std::time::Duration;

fn config(executable: &str, timeout: Duration) -> RunConfig {
    RunConfig::builder()
        .executable(executable)
        .trucks(5u32)
        .cars(0u32)
        .capacity(0u32)
        .max_arrival_us(0u32)
        .max_crossing_us(0u32)
        .timeout(timeout)
        .build()
        .unwrap()
}

#[test]
fn test_successful_run() {
    runner::run(&config("true", Duration::from_secs(10))).unwrap();
}

#[test]
fn test_non_zero_exit_is_reported() {
    let err = runner::run(&config("false", Duration::from_secs(10))).unwrap_err();
    assert!(matches!(err, RunError::NonZeroExit { code: Some(1) }), "{err}");
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn test_run_is_killed_after_timeout() {
    // `sleep 5 0 0 0 0` sleeps for five seconds
    let started = std::time::Instant::now();
    let err = runner::run(&config("sleep", Duration::from_millis(200))).unwrap_err();
    assert!(matches!(err, RunError::Timeout { .. }), "{err}");
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[test]
fn test_missing_executable() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("proj2");
    let err = runner::run(&config(missing.to_str().unwrap(), Duration::from_secs(1))).unwrap_err();
    assert!(matches!(err, RunError::NotFound { .. }), "{err}");
    assert!(err.to_string().contains("proj2"), "{err}");
}

//! Adapter and legacy computer tests against fake `/bin/sh` programs

#![cfg(unix)]

use payroll_core::{Amount, ErrorKind, PayrollComputer, PayrollError};
use payroll_legacy::{LegacyPayrollComputer, LegacyProcessAdapter};
use payroll_test_utils::{nan_rate_batch, scenario_batch, LegacyWorkspace, SCENARIO_BLOB};
use pretty_assertions::assert_eq;
use std::time::Duration;

const PREFIX: &str = "temp_payroll_input_";

#[tokio::test]
async fn test_program_reads_the_transient_input() {
    let ws = LegacyWorkspace::new();
    let program = ws.write_script("echo-input", r#"cat "$1""#);
    let adapter = LegacyProcessAdapter::new(ws.legacy_config(program));

    let output = adapter.run(SCENARIO_BLOB).await.unwrap();

    assert_eq!(output.exit_code, Some(0));
    assert_eq!(output.stdout, SCENARIO_BLOB);
    assert!(ws.leftover_inputs(PREFIX).is_empty());
}

#[tokio::test]
async fn test_single_argument_and_working_directory() {
    let ws = LegacyWorkspace::new();
    let program = ws.write_script("args", r#"printf '%s\n' "$#" "$(basename "$1")" "$(pwd -P)""#);
    let adapter = LegacyProcessAdapter::new(ws.legacy_config(program));

    let output = adapter.run(SCENARIO_BLOB).await.unwrap();
    let lines: Vec<&str> = output.stdout.lines().collect();

    assert_eq!(lines[0], "1");
    assert!(lines[1].starts_with(PREFIX));
    assert!(lines[1].ends_with(".txt"));
    let canonical = std::fs::canonicalize(ws.path()).unwrap();
    assert_eq!(lines[2], canonical.to_string_lossy());
}

#[tokio::test]
async fn test_relative_program_resolves_against_working_dir() {
    let ws = LegacyWorkspace::new();
    ws.write_script("payroll", "echo ran");
    let adapter = LegacyProcessAdapter::new(ws.legacy_config("./payroll"));

    let output = adapter.run("").await.unwrap();
    assert_eq!(output.stdout.trim(), "ran");
}

#[tokio::test]
async fn test_nonzero_exit_carries_diagnostics() {
    let ws = LegacyWorkspace::new();
    let program = ws.write_script("fail", "echo partial\necho 'file status 35' >&2\nexit 3");
    let adapter = LegacyProcessAdapter::new(ws.legacy_config(program));

    let err = adapter.run(SCENARIO_BLOB).await.unwrap_err();
    match err {
        PayrollError::ProcessExit {
            exit_code,
            stdout,
            stderr,
            input,
        } => {
            assert_eq!(exit_code, Some(3));
            assert_eq!(stdout, "partial\n");
            assert_eq!(stderr, "file status 35\n");
            assert_eq!(input, SCENARIO_BLOB);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(ws.leftover_inputs(PREFIX).is_empty());
}

#[tokio::test]
async fn test_slow_program_times_out() {
    let ws = LegacyWorkspace::new();
    let program = ws.write_script("slow", "exec sleep 30");
    let config = ws
        .legacy_config(program)
        .with_timeout(Duration::from_millis(200));
    let adapter = LegacyProcessAdapter::new(config);

    let started = std::time::Instant::now();
    let err = adapter.run(SCENARIO_BLOB).await.unwrap_err();

    assert!(started.elapsed() < Duration::from_secs(10));
    match err {
        PayrollError::ProcessTimeout { timeout, input } => {
            assert_eq!(timeout, Duration::from_millis(200));
            assert_eq!(input, SCENARIO_BLOB);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(ws.leftover_inputs(PREFIX).is_empty());
}

#[tokio::test]
async fn test_concurrent_runs_use_distinct_files() {
    let ws = LegacyWorkspace::new();
    let program = ws.write_script("name", r#"basename "$1""#);
    let adapter = LegacyProcessAdapter::new(ws.legacy_config(program));

    let (a, b) = tokio::join!(adapter.run("A"), adapter.run("B"));
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_ne!(a.stdout, b.stdout);
    assert!(ws.leftover_inputs(PREFIX).is_empty());
}

#[tokio::test]
async fn test_legacy_computer_scenario() {
    let ws = LegacyWorkspace::new();
    let program = ws.write_script(
        "canned",
        r#"grep -q '^E1   02000015500005000$' "$1" || exit 9
printf 'EMP-ID,GROSS-PAY,NET-PAY\nE1,310.00,260.00\n'"#,
    );
    let legacy = LegacyPayrollComputer::new(&ws.payroll_config(program));

    let results = legacy.compute(&scenario_batch()).await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].employee_id, "E1");
    assert_eq!(
        results[0].pay_pair(),
        (Amount::from_cents(31_000), Amount::from_cents(26_000))
    );
}

#[tokio::test]
async fn test_legacy_computer_rejects_partial_output() {
    let ws = LegacyWorkspace::new();
    let program = ws.write_script("short", r"printf 'EMP-ID,GROSS-PAY,NET-PAY\nE1,310.00\n'");
    let legacy = LegacyPayrollComputer::new(&ws.payroll_config(program));

    let err = legacy.compute(&scenario_batch()).await.unwrap_err();
    match err {
        PayrollError::IncompleteOutput {
            expected,
            received,
            row_errors,
        } => {
            assert_eq!((expected, received), (1, 0));
            assert_eq!(row_errors.len(), 1);
            assert_eq!(row_errors[0].line(), 2);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_validation_failure_never_launches() {
    let ws = LegacyWorkspace::new();
    let program = ws.write_script("marker", "touch launched");
    let legacy = LegacyPayrollComputer::new(&ws.payroll_config(program));

    let err = legacy.compute(&nan_rate_batch()).await.unwrap_err();

    assert!(err.is_validation());
    assert_eq!(err.kind(), ErrorKind::NotFinite);
    assert_eq!(err.signature().position, Some(2));
    assert!(!ws.path().join("launched").exists());
    assert!(ws.leftover_inputs(PREFIX).is_empty());
}

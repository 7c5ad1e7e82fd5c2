//! End-to-end parity against the legacy emulator binary

use payroll_core::{Amount, ErrorKind, EmployeeRecord, Field, PayrollError};
use payroll_legacy::LegacyProcessAdapter;
use payroll_oracle::{run_simulator, EquivalenceOracle, Outcome, SimulatorConfig, Verdict};
use payroll_test_utils::{nan_rate_batch, sample_batch, scenario_batch, LegacyWorkspace};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

const EMULATOR: &str = env!("CARGO_BIN_EXE_legacy-payroll-emulator");
const CLI: &str = env!("CARGO_BIN_EXE_payroll-parity");

fn emulator_oracle(ws: &LegacyWorkspace) -> EquivalenceOracle {
    EquivalenceOracle::from_config(&ws.payroll_config(EMULATOR))
}

#[tokio::test]
async fn test_scenario_parity() {
    let ws = LegacyWorkspace::new();
    let report = emulator_oracle(&ws)
        .assert_parity(&scenario_batch())
        .await
        .unwrap();

    assert_eq!(report.verdict, Verdict::Agree);
    let Outcome::Success { results } = &report.legacy else {
        panic!("legacy failed: {}", report.generate_text());
    };
    assert_eq!(results[0].employee_id, "E1");
    assert_eq!(
        results[0].pay_pair(),
        (Amount::from_cents(31_000), Amount::from_cents(26_000))
    );
}

#[tokio::test]
async fn test_nan_rate_fails_identically() {
    let ws = LegacyWorkspace::new();
    let report = emulator_oracle(&ws).check(&nan_rate_batch()).await;

    assert_eq!(report.verdict, Verdict::BothFailed);
    for outcome in [&report.legacy, &report.native] {
        let Outcome::Failure { signature, .. } = outcome else {
            panic!("expected failure: {}", report.generate_text());
        };
        assert_eq!(signature.kind, ErrorKind::NotFinite);
        assert_eq!(signature.position, Some(2));
        assert_eq!(signature.field, Some(Field::HourlyRate));
    }
}

#[tokio::test]
async fn test_boundary_batch_parity() {
    let ws = LegacyWorkspace::new();
    let records = vec![
        EmployeeRecord::new("MAX", 999.99, 99_999.99, 0.0),
        EmployeeRecord::new("NEG", 1.0, 10.0, 99_999.99),
        EmployeeRecord::new("TRUNC", 7.9, 10.0, 0.0),
        EmployeeRecord::new("EMPLOYEE-42", 1.0, 0.125, 0.0),
    ];
    let report = emulator_oracle(&ws).assert_parity(&records).await.unwrap();

    let Outcome::Success { results } = &report.native else {
        panic!("native failed");
    };
    assert_eq!(results[0].gross_pay.to_string(), "99899990.01");
    assert_eq!(results[1].net_pay.to_string(), "-99989.99");
    assert_eq!(results[2].gross_pay.to_string(), "70.00");
    assert_eq!(results[3].employee_id, "EMPLO");
}

#[tokio::test]
async fn test_oversized_batch_fails_identically() {
    let ws = LegacyWorkspace::new();
    let report = emulator_oracle(&ws).check(&sample_batch(11)).await;
    assert_eq!(report.verdict, Verdict::BothFailed);
    assert!(ws.leftover_inputs("temp_payroll_input_").is_empty());
}

#[tokio::test]
async fn test_emulator_rejects_malformed_input() {
    let ws = LegacyWorkspace::new();
    let adapter = LegacyProcessAdapter::new(ws.legacy_config(EMULATOR));

    let err = adapter.run("E1   02000015\n").await.unwrap_err();
    assert!(matches!(
        err,
        PayrollError::ProcessExit {
            exit_code: Some(1),
            ..
        }
    ));
}

#[tokio::test]
async fn test_simulator_against_emulator_passes() {
    let ws = LegacyWorkspace::new();
    let config = SimulatorConfig {
        seed: 2024,
        total_batches: 25,
        ..SimulatorConfig::default()
    };
    let report = run_simulator(&emulator_oracle(&ws), config).await;

    assert!(report.passed(), "{}", report.generate_text());
    assert_eq!(report.stats.total_batches, 25);
    assert!(ws.leftover_inputs("temp_payroll_input_").is_empty());
}

#[test]
fn test_cli_check_json() {
    let ws = LegacyWorkspace::new();
    let batch = ws.path().join("batch.json");
    std::fs::write(
        &batch,
        r#"[{"employee_id":"E1","hours_worked":20.0,"hourly_rate":15.5,"tax_deduction":50.0}]"#,
    )
    .unwrap();

    let output = std::process::Command::new(CLI)
        .args(["check", "--json", "--program", EMULATOR, "--workdir"])
        .arg(ws.path())
        .arg("--input")
        .arg(&batch)
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["verdict"], "agree");
    assert_eq!(json["native"]["results"][0]["gross_pay"], "310.00");
}

#[test]
fn test_cli_encode_prints_blob() {
    let ws = LegacyWorkspace::new();
    let batch = ws.path().join("batch.json");
    std::fs::write(
        &batch,
        r#"[{"employee_id":"E1","hours_worked":20.0,"hourly_rate":15.5,"tax_deduction":50.0}]"#,
    )
    .unwrap();

    let output = std::process::Command::new(CLI)
        .arg("encode")
        .arg("--input")
        .arg(&batch)
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "E1   02000015500005000\n");
}

fn valid_record() -> impl Strategy<Value = EmployeeRecord> {
    (
        "[A-Z][A-Z0-9]{0,6}",
        0.0f64..1_000.0,
        0.0f64..=99_999.99,
        0.0f64..=99_999.99,
    )
        .prop_map(|(id, hours, rate, tax)| EmployeeRecord::new(id, hours, rate, tax))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_valid_batches_agree(records in prop::collection::vec(valid_record(), 1..=10)) {
        let ws = LegacyWorkspace::new();
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let report = runtime.block_on(emulator_oracle(&ws).check(&records));
        prop_assert_eq!(report.verdict, Verdict::Agree, "{}", report.generate_text());
    }
}

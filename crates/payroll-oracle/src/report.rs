//! Parity reports
//!
//! A [`ParityReport`] keeps everything needed to reproduce a verdict: the
//! input batch, what each path produced and, on divergence, every mismatch.

use payroll_core::{Amount, EmployeeRecord, FailureSignature, PayResult, PayrollError};
use serde::Serialize;
use std::fmt::Write as _;

/// What one computation path produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Success { results: Vec<PayResult> },
    Failure {
        signature: FailureSignature,
        message: String,
    },
}

impl Outcome {
    /// Capture a computation result
    #[must_use]
    pub fn from_result(result: Result<Vec<PayResult>, PayrollError>) -> Self {
        match result {
            Ok(results) => Self::Success { results },
            Err(e) => Self::Failure {
                signature: e.signature(),
                message: e.to_string(),
            },
        }
    }

    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    fn summary(&self) -> String {
        match self {
            Self::Success { results } => format!("{} result(s)", results.len()),
            Self::Failure { signature, .. } => format!("failed: {signature}"),
        }
    }
}

/// Oracle verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Both succeeded with identical results
    Agree,
    /// Both failed with the same signature
    BothFailed,
    /// Anything else
    Diverged,
}

impl Verdict {
    #[inline]
    #[must_use]
    pub fn is_parity(self) -> bool {
        !matches!(self, Self::Diverged)
    }
}

/// One concrete difference between the two paths
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Mismatch {
    /// Same record, different pay
    Pay {
        position: usize,
        employee_id: String,
        legacy_gross: Amount,
        legacy_net: Amount,
        native_gross: Amount,
        native_net: Amount,
    },
    /// Same position, different identifiers
    Identifier {
        position: usize,
        legacy: String,
        native: String,
    },
    /// Only one path produced a result at this position
    Missing {
        position: usize,
        present_in: &'static str,
    },
    /// One path failed, or both failed differently
    Outcome { legacy: String, native: String },
}

impl std::fmt::Display for Mismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pay {
                position,
                employee_id,
                legacy_gross,
                legacy_net,
                native_gross,
                native_net,
            } => write!(
                f,
                "record {position} ({employee_id}): legacy gross {legacy_gross} net {legacy_net}, \
                 native gross {native_gross} net {native_net}"
            ),
            Self::Identifier {
                position,
                legacy,
                native,
            } => write!(f, "record {position}: legacy id {legacy:?}, native id {native:?}"),
            Self::Missing {
                position,
                present_in,
            } => write!(f, "record {position}: only {present_in} produced a result"),
            Self::Outcome { legacy, native } => write!(f, "legacy {legacy}, native {native}"),
        }
    }
}

/// Full record of one oracle check
#[derive(Debug, Clone, Serialize)]
pub struct ParityReport {
    pub inputs: Vec<EmployeeRecord>,
    pub legacy: Outcome,
    pub native: Outcome,
    pub verdict: Verdict,
    pub mismatches: Vec<Mismatch>,
}

impl ParityReport {
    /// Compare two outcomes over the same inputs
    #[must_use]
    pub fn new(inputs: Vec<EmployeeRecord>, legacy: Outcome, native: Outcome) -> Self {
        let mismatches = compare_outcomes(&legacy, &native);
        let verdict = match (&legacy, &native) {
            _ if !mismatches.is_empty() => Verdict::Diverged,
            (Outcome::Success { .. }, Outcome::Success { .. }) => Verdict::Agree,
            _ => Verdict::BothFailed,
        };
        Self {
            inputs,
            legacy,
            native,
            verdict,
            mismatches,
        }
    }

    #[inline]
    #[must_use]
    pub fn passed(&self) -> bool {
        self.verdict.is_parity()
    }

    /// One line: verdict plus both outcomes
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{:?}: legacy {}, native {}",
            self.verdict,
            self.legacy.summary(),
            self.native.summary()
        )
    }

    /// Generate a text report
    #[must_use]
    pub fn generate_text(&self) -> String {
        let mut report = String::new();

        report.push_str("=== Payroll Parity Report ===\n\n");
        let _ = writeln!(report, "Records: {}", self.inputs.len());
        let _ = writeln!(report, "Verdict: {:?}", self.verdict);
        let _ = writeln!(report, "Legacy: {}", self.legacy.summary());
        let _ = writeln!(report, "Native: {}", self.native.summary());

        if let (Outcome::Success { results }, true) = (&self.native, self.passed()) {
            report.push_str("\n=== Results ===\n");
            for r in results {
                let _ = writeln!(report, "{},{},{}", r.employee_id, r.gross_pay, r.net_pay);
            }
        }

        if !self.passed() {
            report.push_str("\n=== Inputs ===\n");
            for (i, record) in self.inputs.iter().enumerate() {
                let _ = writeln!(
                    report,
                    "{i}. id={:?} hours={} rate={} tax={}",
                    record.employee_id(),
                    record.hours_worked(),
                    record.hourly_rate(),
                    record.tax_deduction()
                );
            }
            for (label, outcome) in [("Legacy", &self.legacy), ("Native", &self.native)] {
                if let Outcome::Failure { message, .. } = outcome {
                    let _ = writeln!(report, "{label} error: {message}");
                }
            }
            report.push_str("\n=== Mismatches ===\n");
            for (i, m) in self.mismatches.iter().enumerate() {
                let _ = writeln!(report, "{}. {m}", i + 1);
            }
        }

        let _ = write!(
            report,
            "\n=== Result: {} ===\n",
            if self.passed() { "PASS" } else { "FAIL" }
        );
        report
    }

    /// Pretty JSON rendering
    ///
    /// # Errors
    /// Serialization failure from `serde_json`
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn compare_outcomes(legacy: &Outcome, native: &Outcome) -> Vec<Mismatch> {
    match (legacy, native) {
        (Outcome::Success { results: l }, Outcome::Success { results: n }) => compare_results(l, n),
        (
            Outcome::Failure { signature: l, .. },
            Outcome::Failure { signature: n, .. },
        ) if l == n => Vec::new(),
        _ => vec![Mismatch::Outcome {
            legacy: legacy.summary(),
            native: native.summary(),
        }],
    }
}

fn compare_results(legacy: &[PayResult], native: &[PayResult]) -> Vec<Mismatch> {
    let mut mismatches = Vec::new();
    for position in 0..legacy.len().max(native.len()) {
        match (legacy.get(position), native.get(position)) {
            (Some(l), Some(n)) if l.employee_id != n.employee_id => {
                mismatches.push(Mismatch::Identifier {
                    position,
                    legacy: l.employee_id.clone(),
                    native: n.employee_id.clone(),
                });
            }
            (Some(l), Some(n)) if l.pay_pair() != n.pay_pair() => {
                mismatches.push(Mismatch::Pay {
                    position,
                    employee_id: n.employee_id.clone(),
                    legacy_gross: l.gross_pay,
                    legacy_net: l.net_pay,
                    native_gross: n.gross_pay,
                    native_net: n.net_pay,
                });
            }
            (Some(_), None) => mismatches.push(Mismatch::Missing {
                position,
                present_in: "legacy",
            }),
            (None, Some(_)) => mismatches.push(Mismatch::Missing {
                position,
                present_in: "native",
            }),
            _ => {}
        }
    }
    mismatches
}

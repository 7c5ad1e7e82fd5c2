//! Equivalence oracle
//!
//! Runs the legacy path and the native path over the same batch and decides
//! whether they agree. Divergence is never resolved in favour of either side;
//! the caller gets the full [`ParityReport`].

use crate::report::{Outcome, ParityReport, Verdict};
use payroll_core::{EmployeeRecord, NativePayrollEngine, PayrollComputer};
use payroll_legacy::{LegacyPayrollComputer, PayrollConfig};
use std::sync::Arc;

/// The two paths diverged
#[derive(Debug, thiserror::Error)]
#[error("payroll parity violated: {}", .report.summary())]
pub struct ParityViolation {
    pub report: Box<ParityReport>,
}

/// Compares a legacy computer against a native one
#[derive(Clone)]
pub struct EquivalenceOracle {
    legacy: Arc<dyn PayrollComputer>,
    native: Arc<dyn PayrollComputer>,
}

impl std::fmt::Debug for EquivalenceOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EquivalenceOracle")
            .field("legacy", &self.legacy.name())
            .field("native", &self.native.name())
            .finish()
    }
}

impl EquivalenceOracle {
    /// Create an oracle over any two computers
    pub fn new(
        legacy: impl PayrollComputer + 'static,
        native: impl PayrollComputer + 'static,
    ) -> Self {
        Self {
            legacy: Arc::new(legacy),
            native: Arc::new(native),
        }
    }

    /// Legacy program against the native engine, sharing one encoder setup
    #[must_use]
    pub fn from_config(config: &PayrollConfig) -> Self {
        Self::new(
            LegacyPayrollComputer::new(config),
            NativePayrollEngine::with_encoder(config.encoder()),
        )
    }

    /// Run both paths over `records`, legacy first, and compare
    pub async fn check(&self, records: &[EmployeeRecord]) -> ParityReport {
        let legacy = Outcome::from_result(self.legacy.compute(records).await);
        let native = Outcome::from_result(self.native.compute(records).await);
        let report = ParityReport::new(records.to_vec(), legacy, native);

        match report.verdict {
            Verdict::Diverged => tracing::warn!(
                legacy = self.legacy.name(),
                native = self.native.name(),
                records = records.len(),
                mismatches = report.mismatches.len(),
                summary = %report.summary(),
                "payroll parity violated"
            ),
            verdict => tracing::info!(
                records = records.len(),
                verdict = ?verdict,
                "payroll parity holds"
            ),
        }
        report
    }

    /// Like [`check`](Self::check), but divergence is an error
    ///
    /// # Errors
    /// [`ParityViolation`] carrying the full report
    pub async fn assert_parity(
        &self,
        records: &[EmployeeRecord],
    ) -> Result<ParityReport, ParityViolation> {
        let report = self.check(records).await;
        if report.passed() {
            Ok(report)
        } else {
            Err(ParityViolation {
                report: Box::new(report),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Mismatch;
    use payroll_core::{Amount, PayResult, PayrollError};

    /// Native engine with every gross pay bumped by one cent
    struct OffByOneCent(NativePayrollEngine);

    #[async_trait::async_trait]
    impl PayrollComputer for OffByOneCent {
        fn name(&self) -> &'static str {
            "off-by-one"
        }

        async fn compute(
            &self,
            records: &[EmployeeRecord],
        ) -> Result<Vec<PayResult>, PayrollError> {
            Ok(self
                .0
                .compute_batch(records)?
                .into_iter()
                .map(|r| {
                    let gross = Amount::from_cents(r.gross_pay.cents() + 1);
                    PayResult::new(r.employee_id, gross, r.net_pay)
                })
                .collect())
        }
    }

    fn scenario() -> Vec<EmployeeRecord> {
        vec![EmployeeRecord::new("E1", 20.0, 15.50, 50.00)]
    }

    #[tokio::test]
    async fn test_native_against_itself_agrees() {
        let oracle = EquivalenceOracle::new(NativePayrollEngine::new(), NativePayrollEngine::new());
        let report = oracle.assert_parity(&scenario()).await.unwrap();
        assert_eq!(report.verdict, Verdict::Agree);
    }

    #[tokio::test]
    async fn test_shared_validation_failure_is_parity() {
        let oracle = EquivalenceOracle::new(NativePayrollEngine::new(), NativePayrollEngine::new());
        let records = vec![EmployeeRecord::new("E1", 1.0, f64::NAN, 0.0)];
        let report = oracle.check(&records).await;
        assert_eq!(report.verdict, Verdict::BothFailed);
    }

    #[tokio::test]
    async fn test_cent_difference_is_violation() {
        let oracle =
            EquivalenceOracle::new(OffByOneCent(NativePayrollEngine::new()), NativePayrollEngine::new());
        let violation = oracle.assert_parity(&scenario()).await.unwrap_err();
        assert_eq!(violation.report.verdict, Verdict::Diverged);
        assert_eq!(
            violation.report.mismatches,
            vec![Mismatch::Pay {
                position: 0,
                employee_id: "E1".into(),
                legacy_gross: Amount::from_cents(31_001),
                legacy_net: Amount::from_cents(26_000),
                native_gross: Amount::from_cents(31_000),
                native_net: Amount::from_cents(26_000),
            }]
        );
        assert!(violation.to_string().contains("Diverged"));
    }

    #[tokio::test]
    async fn test_rounding_modes_diverge_on_ties() {
        let oracle = EquivalenceOracle::new(
            NativePayrollEngine::new()
                .with_rounding(payroll_core::RoundingMode::HalfAwayFromZero),
            NativePayrollEngine::new(),
        );
        let records = vec![EmployeeRecord::new("E1", 1.0, 0.125, 0.0)];
        let report = oracle.check(&records).await;
        assert!(!report.passed());
    }
}

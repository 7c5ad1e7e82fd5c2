//! Legacy computation path: encode, run, parse

use crate::adapter::LegacyProcessAdapter;
use crate::config::PayrollConfig;
use crate::parser::{ParsedOutput, TabularOutputParser};
use payroll_core::{
    EmployeeRecord, EncodedBatch, PayResult, PayrollComputer, PayrollError, RecordEncoder,
};

/// [`PayrollComputer`] backed by the external batch program
#[derive(Debug, Clone)]
pub struct LegacyPayrollComputer {
    encoder: RecordEncoder,
    adapter: LegacyProcessAdapter,
    parser: TabularOutputParser,
}

impl LegacyPayrollComputer {
    /// Create from pipeline configuration
    #[must_use]
    pub fn new(config: &PayrollConfig) -> Self {
        Self::from_parts(config.encoder(), LegacyProcessAdapter::new(config.legacy.clone()))
    }

    /// Create from an encoder and an adapter
    #[inline]
    #[must_use]
    pub fn from_parts(encoder: RecordEncoder, adapter: LegacyProcessAdapter) -> Self {
        Self {
            encoder,
            adapter,
            parser: TabularOutputParser::new(),
        }
    }

    /// Adapter in use
    #[inline]
    #[must_use]
    pub fn adapter(&self) -> &LegacyProcessAdapter {
        &self.adapter
    }
}

#[async_trait::async_trait]
impl PayrollComputer for LegacyPayrollComputer {
    fn name(&self) -> &'static str {
        "legacy"
    }

    async fn compute(&self, records: &[EmployeeRecord]) -> Result<Vec<PayResult>, PayrollError> {
        // Validation failures stop here, before anything is written or spawned
        let batch = self.encoder.encode_batch(records)?;
        let output = self.adapter.run(batch.blob()).await?;
        let parsed = self.parser.parse(&output.stdout);
        reconcile(&batch, parsed, &output.stdout)
    }
}

/// Turn parsed rows into results, refusing anything short of one clean row per record
///
/// # Errors
/// - [`PayrollError::InvalidOutputFormat`] for an unusable header
/// - [`PayrollError::IncompleteOutput`] if any row was skipped or the counts differ
/// - [`PayrollError::IdentifierMismatch`] if a row belongs to a different record
pub fn reconcile(
    batch: &EncodedBatch,
    parsed: ParsedOutput,
    stdout: &str,
) -> Result<Vec<PayResult>, PayrollError> {
    if let Some(reason) = parsed.format_error.filter(|_| !batch.is_empty()) {
        return Err(PayrollError::InvalidOutputFormat {
            reason,
            stdout: stdout.to_string(),
        });
    }

    if !parsed.row_errors.is_empty() || parsed.rows.len() != batch.len() {
        return Err(PayrollError::IncompleteOutput {
            expected: batch.len(),
            received: parsed.rows.len(),
            row_errors: parsed.row_errors,
        });
    }

    batch
        .records()
        .iter()
        .zip(parsed.rows)
        .enumerate()
        .map(|(position, (operand, row))| {
            if row.employee_id != operand.display_id() {
                return Err(PayrollError::IdentifierMismatch {
                    position,
                    expected: operand.display_id().to_string(),
                    actual: row.employee_id,
                });
            }
            tracing::debug!(
                employee_id = %row.employee_id,
                gross_pay = %row.gross_pay,
                net_pay = %row.net_pay,
                "legacy pay parsed"
            );
            Ok(PayResult::new(row.employee_id, row.gross_pay, row.net_pay))
        })
        .collect()
}

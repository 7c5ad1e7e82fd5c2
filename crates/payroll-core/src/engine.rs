//! Native payroll engine
//!
//! Same arithmetic as the legacy program, no subprocess. Operands come from
//! the shared validator, so hours are truncated and amounts quantized to
//! cents exactly as they would be on the wire; computing from the raw `f64`
//! inputs would drift from the legacy results.

use crate::computer::PayrollComputer;
use crate::error::PayrollError;
use crate::record::{EncodedRecord, RecordEncoder};
use crate::types::{Amount, EmployeeRecord, PayResult, RoundingMode};

/// Pure in-process payroll computation
#[derive(Debug, Clone, Copy, Default)]
pub struct NativePayrollEngine {
    encoder: RecordEncoder,
}

impl NativePayrollEngine {
    /// Create an engine with default validation settings
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Share validation settings with an existing encoder
    #[inline]
    #[must_use]
    pub fn with_encoder(encoder: RecordEncoder) -> Self {
        Self { encoder }
    }

    /// With rounding mode
    #[inline]
    #[must_use]
    pub fn with_rounding(mut self, rounding: RoundingMode) -> Self {
        self.encoder = self.encoder.with_rounding(rounding);
        self
    }

    /// Compute a batch synchronously
    ///
    /// # Errors
    /// The same validation errors the encoder would raise for this batch.
    pub fn compute_batch(&self, records: &[EmployeeRecord]) -> Result<Vec<PayResult>, PayrollError> {
        self.encoder.check_batch_size(records.len())?;

        let operands = records
            .iter()
            .enumerate()
            .map(|(position, record)| self.encoder.validate(position, record))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(operands
            .iter()
            .map(|operand| {
                let result = compute_pay(operand);
                tracing::debug!(
                    employee_id = %result.employee_id,
                    gross_pay = %result.gross_pay,
                    net_pay = %result.net_pay,
                    "native pay computed"
                );
                result
            })
            .collect())
    }
}

/// Gross and net pay for one set of encoded operands
#[must_use]
pub fn compute_pay(operand: &EncodedRecord) -> PayResult {
    let gross = i64::from(operand.hours()) * i64::from(operand.rate_cents());
    let net = gross - i64::from(operand.tax_cents());
    PayResult::new(
        operand.display_id(),
        Amount::from_cents(gross),
        Amount::from_cents(net),
    )
}

#[async_trait::async_trait]
impl PayrollComputer for NativePayrollEngine {
    fn name(&self) -> &'static str {
        "native"
    }

    async fn compute(&self, records: &[EmployeeRecord]) -> Result<Vec<PayResult>, PayrollError> {
        self.compute_batch(records)
    }
}

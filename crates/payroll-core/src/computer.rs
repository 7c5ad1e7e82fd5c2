//! The seam both computation paths sit behind

use crate::error::PayrollError;
use crate::types::{EmployeeRecord, PayResult};

/// A way of turning a batch of records into pay results
///
/// Implemented by the native engine and by the legacy process path. The
/// equivalence oracle only ever talks to this trait, so either side can be
/// replaced by a test double.
#[async_trait::async_trait]
pub trait PayrollComputer: Send + Sync {
    /// Short label used in reports and logs
    fn name(&self) -> &'static str;

    /// Compute pay for every record, in input order
    ///
    /// Returns either one result per record or a typed error; never a
    /// partial list.
    async fn compute(&self, records: &[EmployeeRecord]) -> Result<Vec<PayResult>, PayrollError>;
}

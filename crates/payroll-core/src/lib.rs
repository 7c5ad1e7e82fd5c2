//! Payroll Core - fixed-point encoding and native computation
//!
//! The pieces of the payroll pipeline that never leave the process:
//! - `PIC 9(5)V99` fixed-point formatting
//! - Fixed-width record encoding for the legacy batch program
//! - The native payroll engine
//! - The [`PayrollComputer`] seam shared with the legacy path
//!
//! # Example
//!
//! ```rust
//! use payroll_core::{EmployeeRecord, NativePayrollEngine, RecordEncoder};
//!
//! let batch = vec![EmployeeRecord::new("E1", 20.0, 15.50, 50.00)];
//!
//! let encoded = RecordEncoder::new().encode_batch(&batch).unwrap();
//! assert_eq!(encoded.blob(), "E1   02000015500005000\n");
//!
//! let results = NativePayrollEngine::new().compute_batch(&batch).unwrap();
//! assert_eq!(results[0].gross_pay.to_string(), "310.00");
//! assert_eq!(results[0].net_pay.to_string(), "260.00");
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod computer;
pub mod engine;
pub mod error;
pub mod fixed_point;
pub mod record;
pub mod types;

pub use computer::PayrollComputer;
pub use engine::{compute_pay, NativePayrollEngine};
pub use error::{EncodeError, ErrorKind, FailureSignature, FieldError, PayrollError, RowParseError};
pub use fixed_point::{decode_fixed, format_fixed, to_fixed_cents};
pub use record::{EncodedBatch, EncodedRecord, RecordEncoder, DEFAULT_MAX_BATCH_SIZE, RECORD_WIDTH};
pub use types::{Amount, AmountParseError, EmployeeRecord, Field, PayResult, RoundingMode};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with payroll batches
    pub use crate::{
        Amount, EmployeeRecord, NativePayrollEngine, PayResult, PayrollComputer, PayrollError,
        RecordEncoder, RoundingMode,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

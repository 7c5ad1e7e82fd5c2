//! Payroll Oracle - parity checking between the legacy and native paths
//!
//! - [`EquivalenceOracle`] runs both [`payroll_core::PayrollComputer`]s over
//!   one batch and produces a [`ParityReport`]
//! - [`run_simulator`] drives the oracle with seeded random batches
//!
//! Two binaries ship with this crate: `payroll-parity`, the command line
//! front end, and `legacy-payroll-emulator`, a stand-in for the legacy
//! program used in tests and dry runs.
//!
//! # Example
//!
//! ```rust
//! use payroll_core::{EmployeeRecord, NativePayrollEngine};
//! use payroll_oracle::{EquivalenceOracle, Verdict};
//!
//! # tokio_test_block(async {
//! let oracle = EquivalenceOracle::new(NativePayrollEngine::new(), NativePayrollEngine::new());
//! let report = oracle.check(&[EmployeeRecord::new("E1", 20.0, 15.50, 50.00)]).await;
//! assert_eq!(report.verdict, Verdict::Agree);
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Runtime::new().unwrap().block_on(f)
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod oracle;
pub mod report;
pub mod simulator;

pub use oracle::{EquivalenceOracle, ParityViolation};
pub use report::{Mismatch, Outcome, ParityReport, Verdict};
pub use simulator::{
    run_simulator, BatchStats, RecordDistribution, SimulatorConfig, SimulatorReport, Violation,
};

//! Payroll Legacy - the external batch program path
//!
//! Everything needed to compute pay by way of the legacy fixed-width
//! program:
//! - [`LegacyProcessAdapter`] writes a transient input file, runs the program
//!   with a timeout and always cleans up
//! - [`TabularOutputParser`] reads the `EMP-ID,GROSS-PAY,NET-PAY` table,
//!   skipping and reporting bad rows
//! - [`LegacyPayrollComputer`] ties encoder, adapter and parser together
//!   behind [`payroll_core::PayrollComputer`]
//! - [`PayrollConfig`] loads the whole pipeline's settings from TOML
//!
//! # Example
//!
//! ```rust,no_run
//! use payroll_core::{EmployeeRecord, PayrollComputer};
//! use payroll_legacy::{LegacyConfig, LegacyPayrollComputer, PayrollConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PayrollConfig::new()
//!     .with_legacy(LegacyConfig::new().with_working_dir("/opt/payroll"));
//! let legacy = LegacyPayrollComputer::new(&config);
//!
//! let results = legacy
//!     .compute(&[EmployeeRecord::new("E1", 20.0, 15.50, 50.00)])
//!     .await?;
//! println!("gross {}", results[0].gross_pay);
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod adapter;
pub mod computer;
pub mod config;
pub mod parser;

pub use adapter::{LegacyProcessAdapter, ProcessOutput};
pub use computer::{reconcile, LegacyPayrollComputer};
pub use config::{ConfigError, LegacyConfig, PayrollConfig};
pub use parser::{LegacyRow, ParsedOutput, TabularOutputParser};

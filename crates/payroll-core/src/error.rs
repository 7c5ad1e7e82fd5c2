//! Error types for payroll computation
//!
//! Covers both computation paths:
//! - Field validation (non-finite and out-of-range values)
//! - Record and batch encoding
//! - Legacy process launch, exit and timeout
//! - Legacy output interpretation
//!
//! [`ErrorKind`] and [`FailureSignature`] classify failures so that the
//! equivalence oracle can compare the failure mode of two paths without
//! comparing error messages.

use crate::types::{AmountParseError, Field};
use serde::Serialize;
use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

/// A single numeric value that cannot be represented in its field
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum FieldError {
    /// NaN or infinite
    #[error("value must be finite, got {value}")]
    NotFinite { value: f64 },

    /// Negative, or wider than the field allows
    #[error("value {value} outside representable range {min}..={max}")]
    OutOfRange { value: f64, min: f64, max: f64 },
}

/// Errors while turning a batch into fixed-width lines
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EncodeError {
    /// A numeric field of one record failed validation
    #[error("record {position} field {field}: {source}")]
    Field {
        position: usize,
        field: Field,
        #[source]
        source: FieldError,
    },

    /// Identifier contains a character the layout cannot carry
    #[error("record {position}: employee id {id:?} is not printable ASCII without commas")]
    InvalidIdentifier { position: usize, id: String },

    /// Too many records for one legacy run
    #[error("batch of {len} records exceeds the limit of {max}")]
    BatchTooLarge { len: usize, max: usize },
}

impl EncodeError {
    /// Create a field error for a record
    #[inline]
    #[must_use]
    pub fn field(position: usize, field: Field, source: FieldError) -> Self {
        Self::Field {
            position,
            field,
            source,
        }
    }
}

/// A data row of legacy output that could not be used
///
/// Collected by the parser, never raised on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
pub enum RowParseError {
    /// Row has fewer cells than the header names
    #[error("line {line}: missing column {column}")]
    MissingColumn { line: usize, column: String },

    /// Cell is not decimal text
    #[error("line {line}: invalid number {value:?} in column {column}: {reason}")]
    InvalidNumber {
        line: usize,
        column: String,
        value: String,
        reason: AmountParseError,
    },
}

impl RowParseError {
    /// 1-based line number within the legacy stdout
    #[inline]
    #[must_use]
    pub fn line(&self) -> usize {
        match self {
            Self::MissingColumn { line, .. } | Self::InvalidNumber { line, .. } => *line,
        }
    }
}

/// Main payroll error type
#[derive(Debug, thiserror::Error)]
pub enum PayrollError {
    /// Input validation failed; nothing was launched
    #[error("encoding failed: {0}")]
    Encode(#[from] EncodeError),

    /// Legacy program missing or not executable
    #[error("failed to launch {}: {source}", .program.display())]
    ProcessLaunch {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Legacy program exited non-zero
    #[error("legacy program exited with status {exit_code:?}")]
    ProcessExit {
        /// `None` when terminated by a signal
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
        /// Fixed-width blob that was fed to the program
        input: String,
    },

    /// Legacy program did not finish in time and was killed
    #[error("legacy program timed out after {}ms", .timeout.as_millis())]
    ProcessTimeout { timeout: Duration, input: String },

    /// Output header lacks the identifier column
    #[error("invalid output format: {reason}")]
    InvalidOutputFormat { reason: String, stdout: String },

    /// Fewer usable rows than records
    #[error("incomplete output: expected {expected} rows, received {received}")]
    IncompleteOutput {
        expected: usize,
        received: usize,
        row_errors: Vec<RowParseError>,
    },

    /// Output rows are not in record order
    #[error("row {position}: expected employee id {expected:?}, got {actual:?}")]
    IdentifierMismatch {
        position: usize,
        expected: String,
        actual: String,
    },

    /// Transient file could not be written
    #[error("io error {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl PayrollError {
    /// Create an IO error with context
    #[inline]
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Classify this error
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Encode(EncodeError::Field { source, .. }) => match source {
                FieldError::NotFinite { .. } => ErrorKind::NotFinite,
                FieldError::OutOfRange { .. } => ErrorKind::Range,
            },
            Self::Encode(EncodeError::InvalidIdentifier { .. }) => ErrorKind::InvalidIdentifier,
            Self::Encode(EncodeError::BatchTooLarge { .. }) => ErrorKind::BatchTooLarge,
            Self::ProcessLaunch { .. } => ErrorKind::ProcessLaunch,
            Self::ProcessExit { .. } => ErrorKind::ProcessExit,
            Self::ProcessTimeout { .. } => ErrorKind::ProcessTimeout,
            Self::InvalidOutputFormat { .. } => ErrorKind::InvalidOutputFormat,
            Self::IncompleteOutput { .. } => ErrorKind::IncompleteOutput,
            Self::IdentifierMismatch { .. } => ErrorKind::IdentifierMismatch,
            Self::Io { .. } => ErrorKind::Io,
        }
    }

    /// Kind plus the record and field responsible, where known
    #[must_use]
    pub fn signature(&self) -> FailureSignature {
        let (position, field) = match self {
            Self::Encode(EncodeError::Field {
                position, field, ..
            }) => (Some(*position), Some(*field)),
            Self::Encode(EncodeError::InvalidIdentifier { position, .. }) => {
                (Some(*position), Some(Field::EmployeeId))
            }
            Self::IdentifierMismatch { position, .. } => (Some(*position), Some(Field::EmployeeId)),
            _ => (None, None),
        };
        FailureSignature {
            kind: self.kind(),
            position,
            field,
        }
    }

    /// Whether the failure happened before anything was launched
    #[inline]
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Encode(_))
    }
}

/// Failure categories shared by both computation paths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    NotFinite,
    Range,
    InvalidIdentifier,
    BatchTooLarge,
    ProcessLaunch,
    ProcessExit,
    ProcessTimeout,
    InvalidOutputFormat,
    IncompleteOutput,
    IdentifierMismatch,
    Io,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// What the oracle compares when both paths fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FailureSignature {
    pub kind: ErrorKind,
    pub position: Option<usize>,
    pub field: Option<Field>,
}

impl Display for FailureSignature {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(position) = self.position {
            write!(f, " at record {position}")?;
        }
        if let Some(field) = self.field {
            write!(f, " ({field})")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_errors_classify_by_cause() {
        let nan = PayrollError::from(EncodeError::field(
            2,
            Field::HourlyRate,
            FieldError::NotFinite { value: f64::NAN },
        ));
        assert_eq!(nan.kind(), ErrorKind::NotFinite);
        assert_eq!(
            nan.signature(),
            FailureSignature {
                kind: ErrorKind::NotFinite,
                position: Some(2),
                field: Some(Field::HourlyRate),
            }
        );
        assert!(nan.is_validation());

        let range = PayrollError::from(EncodeError::field(
            0,
            Field::HoursWorked,
            FieldError::OutOfRange {
                value: 1000.0,
                min: 0.0,
                max: 999.0,
            },
        ));
        assert_eq!(range.kind(), ErrorKind::Range);
    }

    #[test]
    fn test_process_errors_have_no_position() {
        let err = PayrollError::ProcessTimeout {
            timeout: Duration::from_millis(250),
            input: String::new(),
        };
        assert_eq!(err.signature().position, None);
        assert_eq!(err.to_string(), "legacy program timed out after 250ms");
        assert!(!err.is_validation());
    }

    #[test]
    fn test_signature_display() {
        let sig = FailureSignature {
            kind: ErrorKind::Range,
            position: Some(3),
            field: Some(Field::TaxDeduction),
        };
        assert_eq!(sig.to_string(), "Range at record 3 (TAX-DEDUCTION)");
    }
}

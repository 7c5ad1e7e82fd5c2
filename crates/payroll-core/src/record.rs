//! Fixed-width record encoding
//!
//! Layout of one input line consumed by the legacy program:
//!
//! ```text
//! [EMP-ID:5][HOURS:3][HOURLY-RATE:7][TAX-DEDUCTION:7]\n
//! ```
//!
//! Validation lives here and is shared with the native engine through
//! [`RecordEncoder::validate`], so both paths reject exactly the same inputs
//! with exactly the same errors.

use crate::error::{EncodeError, FieldError};
use crate::fixed_point::to_fixed_cents;
use crate::types::{EmployeeRecord, Field, RoundingMode};

/// Bytes per record, excluding the newline
pub const RECORD_WIDTH: usize = 22;

/// Largest hours value after truncation
pub const MAX_HOURS: u16 = 999;

/// Default record limit for a single legacy run
pub const DEFAULT_MAX_BATCH_SIZE: usize = 10;

/// The exact operands one record contributes, after the lossy steps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedRecord {
    id_field: String,
    hours: u16,
    rate_cents: u32,
    tax_cents: u32,
}

impl EncodedRecord {
    /// Five-character identifier field, padding included
    #[inline]
    #[must_use]
    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    /// Identifier as the legacy output reports it
    #[inline]
    #[must_use]
    pub fn display_id(&self) -> &str {
        self.id_field.trim()
    }

    /// Truncated whole hours
    #[inline]
    #[must_use]
    pub fn hours(&self) -> u16 {
        self.hours
    }

    /// Hourly rate in cents, as encoded
    #[inline]
    #[must_use]
    pub fn rate_cents(&self) -> u32 {
        self.rate_cents
    }

    /// Tax deduction in cents, as encoded
    #[inline]
    #[must_use]
    pub fn tax_cents(&self) -> u32 {
        self.tax_cents
    }

    /// The 22-byte line, without newline
    #[must_use]
    pub fn line(&self) -> String {
        format!(
            "{}{:03}{:07}{:07}",
            self.id_field, self.hours, self.rate_cents, self.tax_cents
        )
    }
}

/// A fully validated batch and its input blob
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBatch {
    records: Vec<EncodedRecord>,
    blob: String,
}

impl EncodedBatch {
    /// Newline-terminated fixed-width lines
    #[inline]
    #[must_use]
    pub fn blob(&self) -> &str {
        &self.blob
    }

    /// Per-record operands in input order
    #[inline]
    #[must_use]
    pub fn records(&self) -> &[EncodedRecord] {
        &self.records
    }

    /// Number of records
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the batch has no records
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Lines of the blob, without newlines
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.blob.lines()
    }

    /// Consume into the blob
    #[inline]
    #[must_use]
    pub fn into_blob(self) -> String {
        self.blob
    }
}

/// Encoder for fixed-width payroll input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordEncoder {
    rounding: RoundingMode,
    max_batch_size: usize,
}

impl Default for RecordEncoder {
    fn default() -> Self {
        Self {
            rounding: RoundingMode::default(),
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
        }
    }
}

impl RecordEncoder {
    /// Create an encoder with default rounding and batch limit
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With rounding mode
    #[inline]
    #[must_use]
    pub fn with_rounding(mut self, rounding: RoundingMode) -> Self {
        self.rounding = rounding;
        self
    }

    /// With batch size limit
    #[inline]
    #[must_use]
    pub fn with_max_batch_size(mut self, max: usize) -> Self {
        self.max_batch_size = max;
        self
    }

    /// Rounding mode in use
    #[inline]
    #[must_use]
    pub fn rounding(&self) -> RoundingMode {
        self.rounding
    }

    /// Batch size limit in use
    #[inline]
    #[must_use]
    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    /// Reject batches above the limit
    ///
    /// # Errors
    /// [`EncodeError::BatchTooLarge`]
    pub fn check_batch_size(&self, len: usize) -> Result<(), EncodeError> {
        if len > self.max_batch_size {
            return Err(EncodeError::BatchTooLarge {
                len,
                max: self.max_batch_size,
            });
        }
        Ok(())
    }

    /// Validate one record and derive its encoded operands
    ///
    /// Fields are checked in layout order; the first failure wins.
    ///
    /// # Errors
    /// [`EncodeError::InvalidIdentifier`] or [`EncodeError::Field`] tagged
    /// with `position`.
    pub fn validate(
        &self,
        position: usize,
        record: &EmployeeRecord,
    ) -> Result<EncodedRecord, EncodeError> {
        let id_field = encode_identifier(position, record.employee_id())?;
        let hours = truncate_hours(record.hours_worked())
            .map_err(|e| EncodeError::field(position, Field::HoursWorked, e))?;
        let rate_cents = to_fixed_cents(record.hourly_rate(), self.rounding)
            .map_err(|e| EncodeError::field(position, Field::HourlyRate, e))?;
        let tax_cents = to_fixed_cents(record.tax_deduction(), self.rounding)
            .map_err(|e| EncodeError::field(position, Field::TaxDeduction, e))?;

        Ok(EncodedRecord {
            id_field,
            hours,
            rate_cents,
            tax_cents,
        })
    }

    /// Encode a whole batch
    ///
    /// All-or-nothing: on error no blob is produced.
    ///
    /// # Errors
    /// The first [`EncodeError`] encountered, in record order.
    pub fn encode_batch(&self, records: &[EmployeeRecord]) -> Result<EncodedBatch, EncodeError> {
        self.check_batch_size(records.len())?;

        let encoded = records
            .iter()
            .enumerate()
            .map(|(position, record)| self.validate(position, record))
            .collect::<Result<Vec<_>, _>>()?;

        let mut blob = String::with_capacity(encoded.len() * (RECORD_WIDTH + 1));
        for record in &encoded {
            let line = record.line();
            debug_assert_eq!(line.len(), RECORD_WIDTH);
            tracing::debug!(line = %line, "encoded payroll record");
            blob.push_str(&line);
            blob.push('\n');
        }

        Ok(EncodedBatch {
            records: encoded,
            blob,
        })
    }
}

/// Truncate hours toward zero for the 3-digit `HOURS` field
///
/// Fractional hours are dropped, never rounded.
///
/// # Errors
/// - [`FieldError::NotFinite`] for NaN and infinities
/// - [`FieldError::OutOfRange`] when the truncated value is below 0 or above 999
pub fn truncate_hours(hours: f64) -> Result<u16, FieldError> {
    if !hours.is_finite() {
        return Err(FieldError::NotFinite { value: hours });
    }
    let whole = hours.trunc();
    // -0.5 truncates to -0.0, which is not below zero
    if whole < 0.0 || whole > f64::from(MAX_HOURS) {
        return Err(FieldError::OutOfRange {
            value: hours,
            min: 0.0,
            max: f64::from(MAX_HOURS),
        });
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Ok(whole as u16)
}

/// Left-justify an identifier into the 5-character `EMP-ID` field
///
/// Longer ids are silently truncated; only the retained characters must be
/// printable ASCII without commas.
///
/// # Errors
/// [`EncodeError::InvalidIdentifier`]
pub fn encode_identifier(position: usize, id: &str) -> Result<String, EncodeError> {
    let width = Field::EmployeeId.width();
    let retained: String = id.chars().take(width).collect();
    if !retained.chars().all(is_identifier_char) {
        return Err(EncodeError::InvalidIdentifier {
            position,
            id: id.to_string(),
        });
    }
    Ok(format!("{retained:<width$}"))
}

fn is_identifier_char(c: char) -> bool {
    (' '..='~').contains(&c) && c != ','
}

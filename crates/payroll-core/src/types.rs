//! Payroll data model
//!
//! Inputs are carried as `f64` because that is what upstream callers hand
//! us; every output is an exact [`Amount`] in integer cents so that results
//! from the two computation paths can be compared without float noise.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Fields of the fixed-width input record, in layout order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// `EMP-ID`, 5 characters, left-justified
    EmployeeId,
    /// `HOURS`, 3 digits
    HoursWorked,
    /// `HOURLY-RATE`, 7 digits, implied scale 100
    HourlyRate,
    /// `TAX-DEDUCTION`, 7 digits, implied scale 100
    TaxDeduction,
}

impl Field {
    /// All fields in layout order
    pub const ALL: [Field; 4] = [
        Field::EmployeeId,
        Field::HoursWorked,
        Field::HourlyRate,
        Field::TaxDeduction,
    ];

    /// Width of the field in bytes
    #[inline]
    #[must_use]
    pub const fn width(self) -> usize {
        match self {
            Self::EmployeeId => 5,
            Self::HoursWorked => 3,
            Self::HourlyRate | Self::TaxDeduction => 7,
        }
    }

    /// Legacy column name
    #[inline]
    #[must_use]
    pub const fn legacy_name(self) -> &'static str {
        match self {
            Self::EmployeeId => "EMP-ID",
            Self::HoursWorked => "HOURS",
            Self::HourlyRate => "HOURLY-RATE",
            Self::TaxDeduction => "TAX-DEDUCTION",
        }
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.legacy_name())
    }
}

/// One employee's payroll input
///
/// Immutable once constructed. Validation happens at encode/compute time so
/// that both computation paths reject the same inputs the same way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    employee_id: String,
    hours_worked: f64,
    hourly_rate: f64,
    tax_deduction: f64,
}

impl EmployeeRecord {
    /// Create a new record
    #[inline]
    #[must_use]
    pub fn new(
        employee_id: impl Into<String>,
        hours_worked: f64,
        hourly_rate: f64,
        tax_deduction: f64,
    ) -> Self {
        Self {
            employee_id: employee_id.into(),
            hours_worked,
            hourly_rate,
            tax_deduction,
        }
    }

    /// Employee identifier as supplied
    #[inline]
    #[must_use]
    pub fn employee_id(&self) -> &str {
        &self.employee_id
    }

    /// Hours worked as supplied (before truncation)
    #[inline]
    #[must_use]
    pub fn hours_worked(&self) -> f64 {
        self.hours_worked
    }

    /// Hourly rate as supplied (before quantization)
    #[inline]
    #[must_use]
    pub fn hourly_rate(&self) -> f64 {
        self.hourly_rate
    }

    /// Tax deduction as supplied (before quantization)
    #[inline]
    #[must_use]
    pub fn tax_deduction(&self) -> f64 {
        self.tax_deduction
    }
}

/// Rounding rule applied when scaling an amount by 100
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoundingMode {
    /// Banker's rounding, ties go to the even neighbour
    #[default]
    HalfEven,
    /// Ties go away from zero
    HalfAwayFromZero,
}

impl RoundingMode {
    /// Round `value` to an integral float
    #[inline]
    #[must_use]
    pub fn round(self, value: f64) -> f64 {
        match self {
            Self::HalfEven => value.round_ties_even(),
            Self::HalfAwayFromZero => value.round(),
        }
    }

    /// Name as accepted by [`FromStr`]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HalfEven => "half-even",
            Self::HalfAwayFromZero => "half-away-from-zero",
        }
    }
}

impl Display for RoundingMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoundingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "half-even" => Ok(Self::HalfEven),
            "half-away-from-zero" | "half-up" => Ok(Self::HalfAwayFromZero),
            other => Err(format!("unknown rounding mode: {other}")),
        }
    }
}

/// Exact monetary amount in integer cents
///
/// Signed: net pay goes negative when the deduction exceeds gross pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(i64);

impl Amount {
    /// Zero
    pub const ZERO: Amount = Amount(0);

    /// Create from a count of cents
    #[inline]
    #[must_use]
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Count of cents
    #[inline]
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Lossy conversion for display to humans and float-based callers
    #[inline]
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Whether the amount is below zero
    #[inline]
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let magnitude = self.0.unsigned_abs();
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{sign}{}.{:02}", magnitude / 100, magnitude % 100)
    }
}

/// Reasons decimal text cannot become an [`Amount`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
pub enum AmountParseError {
    /// Nothing to parse
    #[error("empty amount")]
    Empty,

    /// A character that is not a digit, sign or single decimal point
    #[error("unexpected character {0:?}")]
    InvalidCharacter(char),

    /// Non-zero digits below one cent
    #[error("more precision than cents")]
    ExcessPrecision,

    /// Does not fit in 64-bit cents
    #[error("amount overflows")]
    Overflow,
}

impl FromStr for Amount {
    type Err = AmountParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (negative, body) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            Some(_) => (false, s),
            None => return Err(AmountParseError::Empty),
        };
        let (whole, fraction) = body.split_once('.').unwrap_or((body, ""));
        if whole.is_empty() && fraction.is_empty() {
            return Err(AmountParseError::Empty);
        }
        if let Some(bad) = whole.chars().chain(fraction.chars()).find(|c| !c.is_ascii_digit()) {
            return Err(AmountParseError::InvalidCharacter(bad));
        }

        let (cents_digits, below_cent) = fraction.split_at(fraction.len().min(2));
        if below_cent.bytes().any(|b| b != b'0') {
            return Err(AmountParseError::ExcessPrecision);
        }

        let mut cents: i64 = 0;
        for digit in whole.bytes().chain(cents_digits.bytes()) {
            cents = cents
                .checked_mul(10)
                .and_then(|c| c.checked_add(i64::from(digit - b'0')))
                .ok_or(AmountParseError::Overflow)?;
        }
        for _ in cents_digits.len()..2 {
            cents = cents.checked_mul(10).ok_or(AmountParseError::Overflow)?;
        }

        Ok(Self(if negative { -cents } else { cents }))
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Computed pay for one employee
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayResult {
    /// Identifier as it appears after encoding, padding removed
    pub employee_id: String,
    /// Hours (truncated) times rate
    pub gross_pay: Amount,
    /// Gross minus tax deduction
    pub net_pay: Amount,
}

impl PayResult {
    /// Create a new result
    #[inline]
    #[must_use]
    pub fn new(employee_id: impl Into<String>, gross_pay: Amount, net_pay: Amount) -> Self {
        Self {
            employee_id: employee_id.into(),
            gross_pay,
            net_pay,
        }
    }

    /// The `(gross, net)` pair compared by the oracle
    #[inline]
    #[must_use]
    pub fn pay_pair(&self) -> (Amount, Amount) {
        (self.gross_pay, self.net_pay)
    }
}

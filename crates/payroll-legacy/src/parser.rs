//! Tabular output parser
//!
//! The legacy program prints a comma-separated table:
//!
//! ```text
//! EMP-ID,GROSS-PAY,NET-PAY
//! E1,310.00,260.00
//! ```
//!
//! Bad rows are skipped and reported, never fatal. A header without an
//! identifier column yields no rows and a format error.

use payroll_core::{Amount, RowParseError};

const ID_COLUMNS: &[&str] = &["EMP-ID", "EMPLOYEE-ID", "ID"];
const GROSS_COLUMNS: &[&str] = &["GROSS-PAY", "GROSS"];
const NET_COLUMNS: &[&str] = &["NET-PAY", "NET"];

/// One usable data row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyRow {
    /// 1-based line number within stdout
    pub line: usize,
    pub employee_id: String,
    pub gross_pay: Amount,
    pub net_pay: Amount,
}

/// Result of parsing one stdout capture
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedOutput {
    /// Usable rows, in output order
    pub rows: Vec<LegacyRow>,
    /// Rows that were skipped and why
    pub row_errors: Vec<RowParseError>,
    /// Set when the header is unusable; `rows` is then empty
    pub format_error: Option<String>,
}

impl ParsedOutput {
    /// No skipped rows and a usable header
    #[inline]
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.row_errors.is_empty() && self.format_error.is_none()
    }
}

/// Header positions of the three columns we read
#[derive(Debug)]
struct Columns<'h> {
    names: Vec<&'h str>,
    id: usize,
    gross: Option<usize>,
    net: Option<usize>,
}

impl<'h> Columns<'h> {
    fn from_header(header: &'h str) -> Option<Self> {
        let names: Vec<&str> = header.split(',').map(str::trim).collect();
        let find = |aliases: &[&str]| {
            names.iter().position(|name| {
                let normalized = normalize_column(name);
                aliases.iter().any(|alias| normalized == *alias)
            })
        };
        Some(Self {
            id: find(ID_COLUMNS)?,
            gross: find(GROSS_COLUMNS),
            net: find(NET_COLUMNS),
            names,
        })
    }

    fn name(&self, index: Option<usize>, fallback: &str) -> String {
        index
            .and_then(|i| self.names.get(i))
            .map_or_else(|| fallback.to_string(), ToString::to_string)
    }
}

/// Parser for the legacy program's stdout
#[derive(Debug, Clone, Copy, Default)]
pub struct TabularOutputParser;

impl TabularOutputParser {
    /// Create a parser
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Parse a full stdout capture
    ///
    /// The first line is the header, even when blank. Blank lines between
    /// rows are ignored. Whitespace-only output has no header and no rows.
    #[must_use]
    pub fn parse(&self, stdout: &str) -> ParsedOutput {
        if stdout.trim().is_empty() {
            return ParsedOutput::default();
        }
        let mut lines = stdout.lines().enumerate().map(|(i, line)| (i + 1, line));

        let Some((_, header)) = lines.next() else {
            return ParsedOutput::default();
        };

        let Some(columns) = Columns::from_header(header) else {
            let reason = format!("header {header:?} has no identifier column");
            tracing::warn!(%reason, "invalid legacy output format");
            return ParsedOutput {
                format_error: Some(reason),
                ..ParsedOutput::default()
            };
        };

        let mut parsed = ParsedOutput::default();
        for (line_no, line) in lines.filter(|(_, line)| !line.trim().is_empty()) {
            match parse_row(&columns, line_no, line) {
                Ok(row) => parsed.rows.push(row),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping legacy output row");
                    parsed.row_errors.push(e);
                }
            }
        }
        parsed
    }
}

fn parse_row(columns: &Columns<'_>, line: usize, text: &str) -> Result<LegacyRow, RowParseError> {
    let cells: Vec<&str> = text.split(',').map(str::trim).collect();
    let cell = |index: Option<usize>, fallback: &str| {
        index
            .and_then(|i| cells.get(i).copied())
            .ok_or_else(|| RowParseError::MissingColumn {
                line,
                column: columns.name(index, fallback),
            })
    };
    let amount = |index: Option<usize>, fallback: &str| -> Result<Amount, RowParseError> {
        let value = cell(index, fallback)?;
        value.parse().map_err(|reason| RowParseError::InvalidNumber {
            line,
            column: columns.name(index, fallback),
            value: value.to_string(),
            reason,
        })
    };

    let employee_id = cell(Some(columns.id), ID_COLUMNS[0])?.to_string();
    let gross_pay = amount(columns.gross, GROSS_COLUMNS[0])?;
    let net_pay = amount(columns.net, NET_COLUMNS[0])?;

    Ok(LegacyRow {
        line,
        employee_id,
        gross_pay,
        net_pay,
    })
}

/// Canonical spelling of a column name: upper case, `_` and spaces as `-`
fn normalize_column(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| match c {
            '_' | ' ' => '-',
            other => other.to_ascii_uppercase(),
        })
        .collect()
}

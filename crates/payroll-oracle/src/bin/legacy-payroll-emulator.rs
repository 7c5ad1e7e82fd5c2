//! Stand-in for the legacy batch payroll program
//!
//! Usage: `legacy-payroll-emulator <input-file>`
//!
//! Reads 22-byte fixed-width records, prints `EMP-ID,GROSS-PAY,NET-PAY` and
//! one row per record. Any malformed record or unreadable file exits 1.
//! Written against the record layout alone, without the workspace encoder or
//! engine, so parity runs against it compare two independent readings.

use anyhow::{bail, Context, Result};
use std::io::Write;

const ID_END: usize = 5;
const HOURS_END: usize = 8;
const RATE_END: usize = 15;
const TAX_END: usize = 22;

struct Row<'a> {
    id: &'a str,
    gross_cents: i64,
    net_cents: i64,
}

fn digits(line: &str, range: std::ops::Range<usize>, name: &str, line_no: usize) -> Result<i64> {
    let field = &line[range];
    if !field.bytes().all(|b| b.is_ascii_digit()) {
        bail!("line {line_no}: {name} field {field:?} is not numeric");
    }
    field
        .parse()
        .with_context(|| format!("line {line_no}: {name} field {field:?}"))
}

fn read_row(line: &str, line_no: usize) -> Result<Row<'_>> {
    if line.len() != TAX_END || !line.is_ascii() {
        bail!("line {line_no}: expected {TAX_END} ASCII bytes, got {:?}", line);
    }
    let hours = digits(line, ID_END..HOURS_END, "HOURS", line_no)?;
    let rate = digits(line, HOURS_END..RATE_END, "RATE", line_no)?;
    let tax = digits(line, RATE_END..TAX_END, "TAX", line_no)?;

    let gross_cents = hours * rate;
    Ok(Row {
        id: line[..ID_END].trim_end(),
        gross_cents,
        net_cents: gross_cents - tax,
    })
}

fn money(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

fn run(path: &str) -> Result<()> {
    let input =
        std::fs::read_to_string(path).with_context(|| format!("cannot read input file {path}"))?;

    let rows = input
        .split('\n')
        .enumerate()
        .filter(|(_, line)| !line.is_empty())
        .map(|(i, line)| read_row(line, i + 1))
        .collect::<Result<Vec<_>>>()?;

    let stdout = std::io::stdout();
    let mut out = std::io::BufWriter::new(stdout.lock());
    writeln!(out, "EMP-ID,GROSS-PAY,NET-PAY")?;
    for row in rows {
        writeln!(
            out,
            "{},{},{}",
            row.id,
            money(row.gross_cents),
            money(row.net_cents)
        )?;
    }
    out.flush()?;
    Ok(())
}

fn main() {
    let mut args = std::env::args().skip(1);
    let (Some(path), None) = (args.next(), args.next()) else {
        eprintln!("usage: legacy-payroll-emulator <input-file>");
        std::process::exit(1);
    };

    if let Err(e) = run(&path) {
        eprintln!("legacy-payroll-emulator: {e:#}");
        std::process::exit(1);
    }
}

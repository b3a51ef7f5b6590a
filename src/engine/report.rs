//! CSV output of accepted records.

use anyhow::{Context, Result};
use std::io::Write;

use crate::Record;
use crate::utils::config::{CSV_HEADER, DATE_FORMAT};

/// Quote a CSV field when it contains a delimiter, quote or line break (RFC 4180).
pub fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn write_row<W: Write, S: AsRef<str>>(w: &mut W, fields: &[S]) -> std::io::Result<()> {
    let line = fields
        .iter()
        .map(|f| csv_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    writeln!(w, "{line}")
}

/// CSV columns for one record: date, first sender, subject (cut to `subject_len`), source, id, received.
pub fn csv_row(record: &Record, subject_len: usize) -> [String; 6] {
    [
        record.timestamp().format(DATE_FORMAT).to_string(),
        record.sender().unwrap_or_default().to_string(),
        record.subject_truncated(subject_len).to_string(),
        record.source().to_string(),
        record.message_id().to_string(),
        record.received_joined(),
    ]
}

/// Sort by timestamp (stable) and write header plus one row per record.
pub fn write_records<W: Write>(w: &mut W, records: &mut [Record], subject_len: usize) -> Result<()> {
    records.sort_by_key(|r| r.timestamp());
    write_row(w, &CSV_HEADER).context("csv header writing error")?;
    for r in records.iter() {
        write_row(w, &csv_row(r, subject_len)).context("csv writing error")?;
    }
    w.flush().context("csv flush error")?;
    Ok(())
}

//! CSV ingestion for equipment readings.
//!
//! Expected layout: a header line, then rows in the fixed column order
//! `name, type, flowrate, pressure, temperature`.
//!
//! - The first line is always skipped, whatever it contains.
//! - Rows end at `\n` only; a trailing `\r` is trimmed with the field.
//! - Fields are split on `,` with no quoting or escaping. A value that
//!   contains a comma shifts the remaining columns of its row.
//! - Unparseable numeric cells become `NaN`; the row is kept.
//! - Rows whose name is empty after trimming are dropped.

use csv::{ReaderBuilder, StringRecord, Terminator};

use crate::equipment::EquipmentRecord;
use crate::error::CoreError;

/// Column positions within a data row.
const COL_NAME: usize = 0;
const COL_TYPE: usize = 1;
const COL_FLOWRATE: usize = 2;
const COL_PRESSURE: usize = 3;
const COL_TEMPERATURE: usize = 4;

/// Header written by [`crate::summary::export_records_csv`] and expected
/// (but not checked) on input.
pub const EXPECTED_HEADER: &str = "name,type,flowrate,pressure,temperature";

/// Parse raw file bytes into records.
///
/// Fails as a whole if the bytes are not UTF-8 text; no partial result is
/// returned in that case.
pub fn ingest(bytes: &[u8]) -> Result<Vec<EquipmentRecord>, CoreError> {
    let text = std::str::from_utf8(bytes)?;
    ingest_str(text)
}

/// Parse already-decoded text into records. See [`ingest`].
pub fn ingest_str(text: &str) -> Result<Vec<EquipmentRecord>, CoreError> {
    let body = match text.split_once('\n') {
        Some((_header, rest)) => rest,
        None => "",
    };

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .quoting(false)
        .flexible(true)
        .terminator(Terminator::Any(b'\n'))
        .from_reader(body.as_bytes());

    let mut records = Vec::new();
    let mut dropped = 0usize;

    for row in reader.records() {
        let row = row?;
        match parse_row(&row) {
            Some(record) => records.push(record),
            None => dropped += 1,
        }
    }

    tracing::debug!(kept = records.len(), dropped, "Ingested equipment CSV");
    Ok(records)
}

fn field<'a>(row: &'a StringRecord, idx: usize) -> &'a str {
    row.get(idx).unwrap_or("").trim()
}

fn parse_number(row: &StringRecord, idx: usize) -> f64 {
    let raw = field(row, idx);
    raw.parse::<f64>().unwrap_or_else(|_| {
        tracing::debug!(
            line = row.position().map(|p| p.line() + 1),
            column = idx,
            value = raw,
            "Non-numeric cell, keeping row with NaN",
        );
        f64::NAN
    })
}

fn parse_row(row: &StringRecord) -> Option<EquipmentRecord> {
    let name = field(row, COL_NAME);
    if name.is_empty() {
        return None;
    }

    Some(EquipmentRecord {
        name: name.to_string(),
        equipment_type: field(row, COL_TYPE).to_string(),
        flowrate: parse_number(row, COL_FLOWRATE),
        pressure: parse_number(row, COL_PRESSURE),
        temperature: parse_number(row, COL_TEMPERATURE),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

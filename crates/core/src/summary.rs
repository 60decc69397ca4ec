//! Local batch summary and delimited-text export.
//!
//! [`BatchSummary`] mirrors the shape of the backend's upload summary so a
//! preview can be shown before the server answers. The export helpers write
//! `metric,value` and per-record tables with two-decimal numbers.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::equipment::{AssessedRecord, EquipmentRecord};
use crate::error::CoreError;

// ── Metric names ─────────────────────────────────────────────────────

pub const METRIC_TOTAL_RECORDS: &str = "total_records";
pub const METRIC_AVG_FLOWRATE: &str = "avg_flowrate";
pub const METRIC_AVG_PRESSURE: &str = "avg_pressure";
pub const METRIC_AVG_TEMPERATURE: &str = "avg_temperature";

/// Prefix for per-type count rows, e.g. `type:Pump`.
pub const TYPE_METRIC_PREFIX: &str = "type:";

// ── Types ────────────────────────────────────────────────────────────

/// Aggregate view of one ingested batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub total_records: u64,
    pub avg_flowrate: f64,
    pub avg_pressure: f64,
    pub avg_temperature: f64,
    /// Record count per equipment type, ordered by type name.
    pub type_distribution: BTreeMap<String, u64>,
}

impl BatchSummary {
    /// Summarise a batch. `NaN` cells are left out of the averages; a column
    /// with no finite values averages to `0.0`.
    pub fn from_records(records: &[EquipmentRecord]) -> Self {
        let mut type_distribution = BTreeMap::new();
        for r in records {
            *type_distribution
                .entry(r.equipment_type.clone())
                .or_insert(0u64) += 1;
        }

        Self {
            total_records: records.len() as u64,
            avg_flowrate: mean(records.iter().map(|r| r.flowrate)),
            avg_pressure: mean(records.iter().map(|r| r.pressure)),
            avg_temperature: mean(records.iter().map(|r| r.temperature)),
            type_distribution,
        }
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .filter(|v| v.is_finite())
        .fold((0.0, 0u64), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

fn two_decimals(value: f64) -> String {
    format!("{value:.2}")
}

// ── Export ───────────────────────────────────────────────────────────

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String, CoreError> {
    let bytes = writer
        .into_inner()
        .map_err(|e| CoreError::Csv(e.into_error().into()))?;
    String::from_utf8(bytes).map_err(|e| CoreError::NotText(e.utf8_error()))
}

/// Write a summary as a `metric,value` table.
pub fn export_summary_csv(summary: &BatchSummary) -> Result<String, CoreError> {
    let mut wtr = csv::Writer::from_writer(Vec::new());

    wtr.write_record(["metric", "value"])?;
    wtr.write_record([
        METRIC_TOTAL_RECORDS.to_string(),
        summary.total_records.to_string(),
    ])?;
    wtr.write_record([
        METRIC_AVG_FLOWRATE.to_string(),
        two_decimals(summary.avg_flowrate),
    ])?;
    wtr.write_record([
        METRIC_AVG_PRESSURE.to_string(),
        two_decimals(summary.avg_pressure),
    ])?;
    wtr.write_record([
        METRIC_AVG_TEMPERATURE.to_string(),
        two_decimals(summary.avg_temperature),
    ])?;
    for (equipment_type, count) in &summary.type_distribution {
        wtr.write_record([
            format!("{TYPE_METRIC_PREFIX}{equipment_type}"),
            count.to_string(),
        ])?;
    }

    finish(wtr)
}

/// Read back a table written by [`export_summary_csv`].
pub fn parse_summary_csv(text: &str) -> Result<BatchSummary, CoreError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(text.as_bytes());

    let mut total_records = None;
    let mut avg_flowrate = None;
    let mut avg_pressure = None;
    let mut avg_temperature = None;
    let mut type_distribution = BTreeMap::new();

    for row in reader.records() {
        let row = row?;
        let metric = row.get(0).unwrap_or("");
        let value = row.get(1).unwrap_or("").trim();

        match metric {
            METRIC_TOTAL_RECORDS => total_records = Some(parse_count(metric, value)?),
            METRIC_AVG_FLOWRATE => avg_flowrate = Some(parse_float(metric, value)?),
            METRIC_AVG_PRESSURE => avg_pressure = Some(parse_float(metric, value)?),
            METRIC_AVG_TEMPERATURE => avg_temperature = Some(parse_float(metric, value)?),
            other => match other.strip_prefix(TYPE_METRIC_PREFIX) {
                Some(equipment_type) => {
                    type_distribution
                        .insert(equipment_type.to_string(), parse_count(other, value)?);
                }
                None => {
                    return Err(CoreError::Validation(format!(
                        "Unknown summary metric: '{other}'"
                    )))
                }
            },
        }
    }

    Ok(BatchSummary {
        total_records: total_records.ok_or(CoreError::MissingMetric(METRIC_TOTAL_RECORDS))?,
        avg_flowrate: avg_flowrate.ok_or(CoreError::MissingMetric(METRIC_AVG_FLOWRATE))?,
        avg_pressure: avg_pressure.ok_or(CoreError::MissingMetric(METRIC_AVG_PRESSURE))?,
        avg_temperature: avg_temperature
            .ok_or(CoreError::MissingMetric(METRIC_AVG_TEMPERATURE))?,
        type_distribution,
    })
}

fn parse_count(metric: &str, value: &str) -> Result<u64, CoreError> {
    value.parse().map_err(|_| {
        CoreError::Validation(format!("{metric} must be a whole number, got '{value}'"))
    })
}

fn parse_float(metric: &str, value: &str) -> Result<f64, CoreError> {
    value
        .parse()
        .map_err(|_| CoreError::Validation(format!("{metric} must be a number, got '{value}'")))
}

/// Write the per-record preview table
/// (`name,type,flowrate,pressure,temperature,status,score`).
pub fn export_records_csv(records: &[AssessedRecord]) -> Result<String, CoreError> {
    let mut wtr = csv::Writer::from_writer(Vec::new());

    wtr.write_record([
        "name",
        "type",
        "flowrate",
        "pressure",
        "temperature",
        "status",
        "score",
    ])?;

    for a in records {
        wtr.write_record([
            a.record.name.clone(),
            a.record.equipment_type.clone(),
            two_decimals(a.record.flowrate),
            two_decimals(a.record.pressure),
            two_decimals(a.record.temperature),
            a.status.as_str().to_string(),
            a.score.to_string(),
        ])?;
    }

    finish(wtr)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

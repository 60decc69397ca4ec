//! Local health heuristics for equipment readings.
//!
//! Pure logic, no I/O. These values only drive the preview shown before the
//! backend's own analytics arrive; the server result is authoritative.

use crate::equipment::{AssessedRecord, EquipmentRecord, HealthStatus};

// ---------------------------------------------------------------------------
// Bands
// ---------------------------------------------------------------------------

/// Inclusive `[min, max]` range for one parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub min: f64,
    pub max: f64,
}

impl Band {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// `false` for `NaN`.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Normal operating range for flowrate.
pub const FLOWRATE_NORMAL: Band = Band::new(80.0, 150.0);
/// Normal operating range for pressure.
pub const PRESSURE_NORMAL: Band = Band::new(4.0, 8.0);
/// Normal operating range for temperature.
pub const TEMPERATURE_NORMAL: Band = Band::new(100.0, 135.0);

/// Scoring bands for one parameter: `ideal` earns full marks, `acceptable`
/// earns [`SCORE_ACCEPTABLE`], anything else [`SCORE_FLOOR`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBands {
    pub ideal: Band,
    pub acceptable: Band,
}

pub const FLOWRATE_SCORE: ScoreBands = ScoreBands {
    ideal: Band::new(100.0, 130.0),
    acceptable: Band::new(80.0, 150.0),
};

pub const PRESSURE_SCORE: ScoreBands = ScoreBands {
    ideal: Band::new(4.0, 8.0),
    acceptable: Band::new(3.0, 9.0),
};

pub const TEMPERATURE_SCORE: ScoreBands = ScoreBands {
    ideal: Band::new(100.0, 135.0),
    acceptable: Band::new(90.0, 150.0),
};

pub const SCORE_IDEAL: u8 = 100;
pub const SCORE_ACCEPTABLE: u8 = 80;
/// Lowest possible sub-score, however far outside the bands a value is.
pub const SCORE_FLOOR: u8 = 60;

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Classify a reading against the normal ranges.
///
/// The low check runs first, so a reading that is below one range and above
/// another is `Low`.
pub fn classify(flowrate: f64, pressure: f64, temperature: f64) -> HealthStatus {
    if flowrate < FLOWRATE_NORMAL.min
        || pressure < PRESSURE_NORMAL.min
        || temperature < TEMPERATURE_NORMAL.min
    {
        HealthStatus::Low
    } else if flowrate > FLOWRATE_NORMAL.max
        || pressure > PRESSURE_NORMAL.max
        || temperature > TEMPERATURE_NORMAL.max
    {
        HealthStatus::High
    } else {
        HealthStatus::Normal
    }
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

fn sub_score(value: f64, bands: &ScoreBands) -> u8 {
    if bands.ideal.contains(value) {
        SCORE_IDEAL
    } else if bands.acceptable.contains(value) {
        SCORE_ACCEPTABLE
    } else {
        SCORE_FLOOR
    }
}

/// Health score in `60..=100`: the rounded mean of three banded sub-scores.
pub fn score(flowrate: f64, pressure: f64, temperature: f64) -> u8 {
    let total = u32::from(sub_score(flowrate, &FLOWRATE_SCORE))
        + u32::from(sub_score(pressure, &PRESSURE_SCORE))
        + u32::from(sub_score(temperature, &TEMPERATURE_SCORE));

    // Round half up in integer arithmetic: floor((2 * total + 3) / 6).
    ((2 * total + 3) / 6) as u8
}

/// Attach status and score to every record, preserving order.
pub fn assess(records: &[EquipmentRecord]) -> Vec<AssessedRecord> {
    records
        .iter()
        .map(|r| AssessedRecord {
            record: r.clone(),
            status: classify(r.flowrate, r.pressure, r.temperature),
            score: score(r.flowrate, r.pressure, r.temperature),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

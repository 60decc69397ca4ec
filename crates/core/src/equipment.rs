//! Equipment reading records and their derived health classification.

use serde::{Deserialize, Serialize};

/// One row of an uploaded equipment CSV.
///
/// Numeric fields may hold `NaN` when the source cell could not be parsed;
/// such rows are kept so the user can see them in the preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentRecord {
    /// Equipment name, never empty.
    pub name: String,
    /// Category label (e.g. "Pump", "Reactor"). Open set.
    #[serde(rename = "type")]
    pub equipment_type: String,
    pub flowrate: f64,
    pub pressure: f64,
    pub temperature: f64,
}

/// Coarse health classification used for immediate visual feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// At least one parameter is below its normal floor.
    Low,
    Normal,
    /// At least one parameter is above its normal ceiling (and none below).
    High,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// A record together with its locally derived status and score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessedRecord {
    #[serde(flatten)]
    pub record: EquipmentRecord,
    pub status: HealthStatus,
    /// Health score in `60..=100`.
    pub score: u8,
}

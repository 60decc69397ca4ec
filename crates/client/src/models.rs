//! Typed request and response schemas for the equipment backend.
//!
//! Every JSON body the backend returns is decoded into one of these types at
//! the HTTP boundary. Optional sections use `#[serde(default)]` so a missing
//! key is not an error, but a present key with the wrong shape is.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// Severity class of a backend alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    Critical,
    Warning,
    Info,
    /// Raised ahead of a predicted failure.
    Predictive,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::Warning => "WARNING",
            Self::Info => "INFO",
            Self::Predictive => "PREDICTIVE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaintenancePriority {
    Low,
    Medium,
    High,
    Critical,
}

impl MaintenancePriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

impl FromStr for MaintenancePriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOW" => Ok(Self::Low),
            "MEDIUM" => Ok(Self::Medium),
            "HIGH" => Ok(Self::High),
            "CRITICAL" => Ok(Self::Critical),
            _ => Err(format!(
                "Unknown priority: '{s}'. Valid priorities: low, medium, high, critical"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaintenanceStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl MaintenanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "SCHEDULED",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl FromStr for MaintenanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "SCHEDULED" => Ok(Self::Scheduled),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "COMPLETED" => Ok(Self::Completed),
            "CANCELLED" => Ok(Self::Cancelled),
            _ => Err(format!(
                "Unknown status: '{s}'. Valid statuses: scheduled, in-progress, completed, cancelled"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportFrequency {
    Daily,
    Weekly,
    Monthly,
}

impl ReportFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "DAILY",
            Self::Weekly => "WEEKLY",
            Self::Monthly => "MONTHLY",
        }
    }
}

impl FromStr for ReportFrequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DAILY" => Ok(Self::Daily),
            "WEEKLY" => Ok(Self::Weekly),
            "MONTHLY" => Ok(Self::Monthly),
            _ => Err(format!(
                "Unknown frequency: '{s}'. Valid frequencies: daily, weekly, monthly"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Upload
// ---------------------------------------------------------------------------

/// Response of `POST /upload/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadSummary {
    pub total_records: u64,
    pub avg_flowrate: f64,
    pub avg_pressure: f64,
    pub avg_temperature: f64,
    /// Record count per equipment type.
    pub type_distribution: BTreeMap<String, u64>,
    #[serde(default)]
    pub advanced_analytics: Option<AdvancedAnalytics>,
    #[serde(default)]
    pub alerts: Vec<UploadAlert>,
}

/// Server-side analytics attached to an upload when the backend computes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvancedAnalytics {
    #[serde(default)]
    pub std_flowrate: Option<f64>,
    #[serde(default)]
    pub std_pressure: Option<f64>,
    #[serde(default)]
    pub std_temperature: Option<f64>,
    #[serde(default)]
    pub average_health_score: Option<f64>,
    #[serde(default)]
    pub equipment_health: Vec<EquipmentHealth>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentHealth {
    pub equipment_name: String,
    pub equipment_type: String,
    pub health_score: f64,
    #[serde(default)]
    pub efficiency_index: Option<f64>,
}

/// Threshold violation reported inline with an upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadAlert {
    pub equipment_name: String,
    pub alert_type: AlertType,
    pub parameter: String,
    pub value: f64,
    pub threshold: f64,
    pub message: String,
    #[serde(default)]
    pub recommendation: Option<String>,
}

// ---------------------------------------------------------------------------
// History / trends
// ---------------------------------------------------------------------------

/// One stored upload, as listed by `GET /history/` and `GET /trends/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSnapshot {
    pub id: i64,
    pub uploaded_at: DateTime<Utc>,
    pub total_records: u64,
    pub avg_flowrate: f64,
    pub avg_pressure: f64,
    pub avg_temperature: f64,
    #[serde(default)]
    pub file_name: Option<String>,
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentAlert {
    pub id: i64,
    pub equipment_name: String,
    pub alert_type: AlertType,
    pub parameter: String,
    pub value: f64,
    pub threshold: f64,
    pub message: String,
    #[serde(default)]
    pub recommendation: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub resolved: bool,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub predicted_failure_date: Option<NaiveDate>,
    /// Model confidence for predictive alerts, `0.0..=1.0`.
    #[serde(default)]
    pub confidence_score: Option<f64>,
}

// ---------------------------------------------------------------------------
// Comparison / rankings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentComparison {
    pub equipment_name: String,
    pub equipment_type: String,
    pub flowrate: f64,
    pub pressure: f64,
    pub temperature: f64,
    #[serde(default)]
    pub health_score: Option<f64>,
    #[serde(default)]
    pub efficiency_index: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentRanking {
    pub equipment_name: String,
    pub equipment_type: String,
    pub overall_score: f64,
    pub efficiency_rank: u32,
    pub reliability_rank: u32,
    pub performance_rank: u32,
}

// ---------------------------------------------------------------------------
// Maintenance
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceSchedule {
    pub id: i64,
    pub equipment_name: String,
    pub equipment_type: String,
    pub scheduled_date: NaiveDate,
    pub priority: MaintenancePriority,
    pub status: MaintenanceStatus,
    pub estimated_hours: f64,
    #[serde(default)]
    pub parts_needed: Vec<String>,
    pub description: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Body of `POST /maintenance/create/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewMaintenanceSchedule {
    pub equipment_name: String,
    pub equipment_type: String,
    pub scheduled_date: NaiveDate,
    pub priority: MaintenancePriority,
    pub estimated_hours: f64,
    pub parts_needed: Vec<String>,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Body of `POST /maintenance/{id}/update/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaintenanceStatusUpdate {
    pub status: MaintenanceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

// ---------------------------------------------------------------------------
// Email reports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailReportSchedule {
    pub id: i64,
    pub frequency: ReportFrequency,
    pub email: String,
    pub include_summary: bool,
    pub include_charts: bool,
    pub include_alerts: bool,
    pub include_analytics: bool,
    pub active: bool,
    #[serde(default)]
    pub last_sent: Option<DateTime<Utc>>,
}

/// Body of `POST /email-reports/schedule/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewEmailSchedule {
    pub frequency: ReportFrequency,
    pub email: String,
    pub include_summary: bool,
    pub include_charts: bool,
    pub include_alerts: bool,
    pub include_analytics: bool,
}

impl NewEmailSchedule {
    /// A schedule with every section included.
    pub fn full(frequency: ReportFrequency, email: impl Into<String>) -> Self {
        Self {
            frequency,
            email: email.into(),
            include_summary: true,
            include_charts: true,
            include_alerts: true,
            include_analytics: true,
        }
    }
}

/// Body of `POST /email-reports/{id}/update/`. Unset fields are left as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EmailScheduleUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<ReportFrequency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub email: &'a str,
}

/// Response of the login and register endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub success: bool,
    pub user: User,
    pub tokens: TokenPair,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Bearer token sent with subsequent requests.
    pub access: String,
    pub refresh: String,
}

/// Error body shape used by the backend on 4xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

// ---------------------------------------------------------------------------
// Binary downloads
// ---------------------------------------------------------------------------

/// A binary payload (PDF report, Excel export).
#[derive(Debug, Clone, PartialEq)]
pub struct Download {
    /// From `Content-Disposition`, or a per-endpoint default.
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_summary_minimal() {
        let json = r#"{
            "total_records": 3,
            "avg_flowrate": 110.5,
            "avg_pressure": 5.25,
            "avg_temperature": 118.0,
            "type_distribution": {"Pump": 2, "Valve": 1}
        }"#;
        let s: UploadSummary = serde_json::from_str(json).unwrap();
        assert_eq!(s.total_records, 3);
        assert_eq!(s.type_distribution["Pump"], 2);
        assert!(s.advanced_analytics.is_none());
        assert!(s.alerts.is_empty());
    }

    #[test]
    fn upload_summary_with_analytics_and_alerts() {
        let json = r#"{
            "total_records": 1,
            "avg_flowrate": 160.0,
            "avg_pressure": 5.0,
            "avg_temperature": 110.0,
            "type_distribution": {"Pump": 1},
            "advanced_analytics": {
                "std_flowrate": 0.0,
                "equipment_health": [
                    {"equipment_name": "P-1", "equipment_type": "Pump", "health_score": 86.7}
                ]
            },
            "alerts": [{
                "equipment_name": "P-1",
                "alert_type": "WARNING",
                "parameter": "flowrate",
                "value": 160.0,
                "threshold": 150.0,
                "message": "Flowrate above limit"
            }]
        }"#;
        let s: UploadSummary = serde_json::from_str(json).unwrap();
        let analytics = s.advanced_analytics.unwrap();
        assert_eq!(analytics.equipment_health[0].equipment_name, "P-1");
        assert!(analytics.equipment_health[0].efficiency_index.is_none());
        assert_eq!(s.alerts[0].alert_type, AlertType::Warning);
    }

    #[test]
    fn upload_summary_wrong_shape_is_rejected() {
        let json = r#"{"total_records": "three", "avg_flowrate": 1, "avg_pressure": 1,
                       "avg_temperature": 1, "type_distribution": {}}"#;
        assert!(serde_json::from_str::<UploadSummary>(json).is_err());
    }

    #[test]
    fn maintenance_schedule_decodes_enums_and_dates() {
        let json = r#"{
            "id": 7,
            "equipment_name": "HX-2",
            "equipment_type": "HeatExchanger",
            "scheduled_date": "2026-11-02",
            "priority": "HIGH",
            "status": "IN_PROGRESS",
            "estimated_hours": 4.5,
            "parts_needed": ["gasket"],
            "description": "Replace gasket"
        }"#;
        let m: MaintenanceSchedule = serde_json::from_str(json).unwrap();
        assert_eq!(m.priority, MaintenancePriority::High);
        assert_eq!(m.status, MaintenanceStatus::InProgress);
        assert_eq!(m.scheduled_date, NaiveDate::from_ymd_opt(2026, 11, 2).unwrap());
        assert!(m.completed_at.is_none());
    }

    #[test]
    fn alert_decodes_microsecond_timestamp() {
        let json = r#"{
            "id": 1,
            "equipment_name": "R-1",
            "alert_type": "PREDICTIVE",
            "parameter": "temperature",
            "value": 140.0,
            "threshold": 135.0,
            "message": "Trending hot",
            "created_at": "2026-10-18T09:30:12.345678Z",
            "predicted_failure_date": "2026-11-01",
            "confidence_score": 0.82
        }"#;
        let a: EquipmentAlert = serde_json::from_str(json).unwrap();
        assert_eq!(a.alert_type, AlertType::Predictive);
        assert!(!a.resolved);
        assert_eq!(a.confidence_score, Some(0.82));
    }

    #[test]
    fn status_parsing_accepts_cli_spelling() {
        assert_eq!(
            "in-progress".parse::<MaintenanceStatus>().unwrap(),
            MaintenanceStatus::InProgress
        );
        assert_eq!("high".parse::<MaintenancePriority>().unwrap(), MaintenancePriority::High);
        assert!("sometimes".parse::<ReportFrequency>().is_err());
    }

    #[test]
    fn status_update_omits_empty_notes() {
        let body = serde_json::to_value(MaintenanceStatusUpdate {
            status: MaintenanceStatus::Completed,
            notes: None,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"status": "COMPLETED"}));
    }
}

//! In-process stub of the equipment backend for client integration tests.
//!
//! The stub binds to `127.0.0.1:0` and serves canned JSON for the routes the
//! client calls. Protected routes require `Authorization: Bearer test-token`.

#![allow(dead_code)]

use std::collections::HashMap;

use axum::extract::{Multipart, Path, Query};
use axum::http::header::{AUTHORIZATION, CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use chemviz_client::api::ApiClient;
use chemviz_client::session::Session;

pub const TEST_TOKEN: &str = "test-token";

/// Serve `app` on an ephemeral port and return an [`ApiClient`] pointed at it.
pub async fn spawn(app: Router) -> ApiClient {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    ApiClient::with_client(reqwest::Client::new(), &format!("http://{addr}/api"))
}

pub fn authed_session() -> Session {
    Session::with_token(TEST_TOKEN)
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TEST_TOKEN}"))
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"error": "Authentication credentials were not provided."})),
    )
        .into_response()
}

/// The well-behaved backend.
pub fn backend() -> Router {
    Router::new()
        .route("/api/auth/login/", post(login))
        .route("/api/auth/register/", post(register))
        .route("/api/upload/", post(upload))
        .route("/api/history/", get(history))
        .route("/api/alerts/", get(alerts))
        .route("/api/alerts/{id}/resolve/", post(resolve_alert))
        .route("/api/compare-equipment/", get(compare))
        .route("/api/maintenance/", get(maintenance_list))
        .route("/api/maintenance/create/", post(create_maintenance))
        .route("/api/maintenance/{id}/update/", post(update_maintenance))
        .route("/api/email-reports/", get(email_list))
        .route("/api/email-reports/schedule/", post(schedule_email))
        .route("/api/email-reports/{id}/update/", post(update_email))
        .route("/api/email-reports/{id}/delete/", delete(delete_schedule))
        .route("/api/report/", get(report))
        .route("/api/export/excel/", get(export_excel))
        // Wrong shape: an object where a list is expected.
        .route("/api/rankings/", get(|| async { Json(json!({"detail": "not a list"})) }))
        // Plain-text server error.
        .route(
            "/api/trends/",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        )
}

/// A backend whose upload endpoint always fails.
pub fn failing_backend() -> Router {
    Router::new().route(
        "/api/upload/",
        post(|| async {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "No file uploaded"})),
            )
        }),
    )
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["username"] == "demo" && body["password"] == "demo123" {
        Json(json!({
            "success": true,
            "user": {"id": 1, "username": "demo", "email": "demo@example.com"},
            "tokens": {"access": TEST_TOKEN, "refresh": "refresh-token"}
        }))
        .into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Invalid credentials"})),
        )
            .into_response()
    }
}

async fn register(Json(body): Json<Value>) -> Response {
    if body["username"].as_str().unwrap_or_default().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Username and password required"})),
        )
            .into_response();
    }
    Json(json!({
        "success": true,
        "user": {"id": 2, "username": body["username"], "email": body["email"]},
        "tokens": {"access": TEST_TOKEN, "refresh": "refresh-token"}
    }))
    .into_response()
}

/// Reject bodies that carry `null` or keys outside `allowed`.
fn check_body(body: &Value, allowed: &[&str]) -> Result<(), Response> {
    let Some(fields) = body.as_object() else {
        return Err((StatusCode::BAD_REQUEST, "expected a JSON object").into_response());
    };
    for (key, value) in fields {
        if value.is_null() || !allowed.contains(&key.as_str()) {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(json!({"error": format!("Unexpected field: {key}")})),
            )
                .into_response());
        }
    }
    Ok(())
}

async fn upload(headers: HeaderMap, mut multipart: Multipart) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }

    let mut rows: Vec<Vec<String>> = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().map(str::to_string);
        let text = field.text().await.unwrap_or_default();
        if name.as_deref() == Some("file") {
            rows = text
                .lines()
                .skip(1)
                .filter(|l| !l.trim().is_empty())
                .map(|l| l.split(',').map(str::to_string).collect())
                .collect();
        }
    }

    let mut types: HashMap<String, u64> = HashMap::new();
    for row in &rows {
        *types.entry(row[1].clone()).or_default() += 1;
    }

    Json(json!({
        "total_records": rows.len(),
        "avg_flowrate": 110.0,
        "avg_pressure": 5.5,
        "avg_temperature": 115.0,
        "type_distribution": types,
        "alerts": []
    }))
    .into_response()
}

async fn history(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!([
        {
            "id": 2,
            "uploaded_at": "2026-10-18T09:30:12.345678Z",
            "total_records": 15,
            "avg_flowrate": 119.8,
            "avg_pressure": 6.1,
            "avg_temperature": 117.47
        },
        {
            "id": 1,
            "uploaded_at": "2026-10-17T08:00:00Z",
            "total_records": 10,
            "avg_flowrate": 100.0,
            "avg_pressure": 5.0,
            "avg_temperature": 110.0,
            "file_name": "sample.csv"
        }
    ]))
    .into_response()
}

async fn alerts(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!([alert_json(5, false)])).into_response()
}

async fn resolve_alert(headers: HeaderMap, Path(id): Path<i64>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(alert_json(id, true)).into_response()
}

fn alert_json(id: i64, resolved: bool) -> Value {
    json!({
        "id": id,
        "equipment_name": "Reactor-1",
        "alert_type": "CRITICAL",
        "parameter": "temperature",
        "value": 142.0,
        "threshold": 135.0,
        "message": "Temperature above safe limit",
        "recommendation": "Inspect cooling loop",
        "created_at": "2026-10-18T10:00:00Z",
        "resolved": resolved
    })
}

async fn compare(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let names = params.get("names").cloned().unwrap_or_default();
    let rows: Vec<Value> = names
        .split(',')
        .filter(|n| !n.is_empty())
        .map(|n| {
            json!({
                "equipment_name": n,
                "equipment_type": "Pump",
                "flowrate": 120.0,
                "pressure": 5.0,
                "temperature": 110.0,
                "health_score": 93.3
            })
        })
        .collect();
    Json(Value::Array(rows))
}

async fn update_maintenance(Path(id): Path<i64>, Json(body): Json<Value>) -> Json<Value> {
    Json(json!({
        "id": id,
        "equipment_name": "Pump-1",
        "equipment_type": "Pump",
        "scheduled_date": "2026-11-02",
        "priority": "MEDIUM",
        "status": body["status"],
        "estimated_hours": 2.0,
        "parts_needed": [],
        "description": "Seal check",
        "notes": body.get("notes").cloned().unwrap_or(Value::Null)
    }))
}

fn maintenance_json(id: i64) -> Value {
    json!({
        "id": id,
        "equipment_name": "Pump-1",
        "equipment_type": "Pump",
        "scheduled_date": "2026-11-02",
        "priority": "MEDIUM",
        "status": "SCHEDULED",
        "estimated_hours": 2.0,
        "parts_needed": ["seal kit"],
        "description": "Seal check"
    })
}

async fn maintenance_list(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!([maintenance_json(1), maintenance_json(2)])).into_response()
}

async fn create_maintenance(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if let Err(rejected) = check_body(
        &body,
        &[
            "equipment_name",
            "equipment_type",
            "scheduled_date",
            "priority",
            "estimated_hours",
            "parts_needed",
            "description",
            "notes",
        ],
    ) {
        return rejected;
    }

    let mut created = body;
    created["id"] = json!(9);
    created["status"] = json!("SCHEDULED");
    (StatusCode::CREATED, Json(created)).into_response()
}

fn email_json(id: i64) -> Value {
    json!({
        "id": id,
        "frequency": "WEEKLY",
        "email": "ops@example.com",
        "include_summary": true,
        "include_charts": true,
        "include_alerts": true,
        "include_analytics": true,
        "active": true,
        "last_sent": null
    })
}

async fn email_list(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!([email_json(3)])).into_response()
}

async fn schedule_email(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if let Err(rejected) = check_body(
        &body,
        &[
            "frequency",
            "email",
            "include_summary",
            "include_charts",
            "include_alerts",
            "include_analytics",
        ],
    ) {
        return rejected;
    }

    let mut created = body;
    created["id"] = json!(4);
    created["active"] = json!(true);
    (StatusCode::CREATED, Json(created)).into_response()
}

/// Applies only the fields present in the body to a stored schedule.
async fn update_email(
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if let Err(rejected) = check_body(&body, &["frequency", "email", "active"]) {
        return rejected;
    }

    let mut stored = email_json(id);
    if let Some(fields) = body.as_object() {
        for (key, value) in fields {
            stored[key.as_str()] = value.clone();
        }
    }
    Json(stored).into_response()
}

async fn delete_schedule(Path(_id): Path<i64>) -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn report() -> Response {
    (
        [
            (CONTENT_TYPE, "application/pdf"),
            (
                CONTENT_DISPOSITION,
                "attachment; filename=\"equipment_report.pdf\"",
            ),
        ],
        b"%PDF-1.4 stub".to_vec(),
    )
        .into_response()
}

/// No `Content-Disposition`: the client picks the file name.
async fn export_excel() -> Response {
    (
        [(
            CONTENT_TYPE,
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        )],
        b"PK\x03\x04 stub".to_vec(),
    )
        .into_response()
}

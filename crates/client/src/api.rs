//! REST client for the equipment analytics backend.
//!
//! One request, one response: no retries, no backoff. Every JSON body is
//! decoded into a type from [`crate::models`]; a body that does not match
//! fails with [`ClientError::Decode`].

use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::{normalize_base_url, ClientConfig};
use crate::error::ClientError;
use crate::models::{
    AuthResponse, DatasetSnapshot, Download, EmailReportSchedule, EmailScheduleUpdate,
    EquipmentAlert, EquipmentComparison, EquipmentRanking, ErrorBody, LoginRequest,
    MaintenanceSchedule, MaintenanceStatus, MaintenanceStatusUpdate, NewEmailSchedule,
    NewMaintenanceSchedule, RegisterRequest, UploadSummary,
};
use crate::session::Session;

/// Multipart field name the upload endpoint reads the file from.
pub const UPLOAD_FIELD: &str = "file";
pub const DEFAULT_REPORT_FILE: &str = "equipment_report.pdf";
pub const DEFAULT_EXCEL_FILE: &str = "equipment_data.xlsx";

/// HTTP client for one backend instance.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    api_url: String,
}

impl ApiClient {
    /// Build a client with the configured base URL and request timeout.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self::with_client(client, &config.api_url))
    }

    /// Reuse an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: &str) -> Self {
        Self {
            client,
            api_url: normalize_base_url(api_url),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    // ---- auth ----

    /// `POST /auth/login/`.
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthResponse, ClientError> {
        let body = LoginRequest { username, password };
        self.send_json(Method::POST, "/auth/login/", &Session::anonymous(), Some(&body))
            .await
    }

    /// `POST /auth/register/`.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        email: &str,
    ) -> Result<AuthResponse, ClientError> {
        let body = RegisterRequest {
            username,
            password,
            email,
        };
        self.send_json(Method::POST, "/auth/register/", &Session::anonymous(), Some(&body))
            .await
    }

    // ---- upload ----

    /// Upload a raw CSV file as multipart field `file`.
    pub async fn upload_csv(
        &self,
        session: &Session,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadSummary, ClientError> {
        let size = bytes.len();
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("text/csv")?;
        let form = reqwest::multipart::Form::new().part(UPLOAD_FIELD, part);

        tracing::info!(file_name, size, "Uploading CSV");
        let response = self
            .request(Method::POST, "/upload/", session)
            .multipart(form)
            .send()
            .await?;

        Self::parse_response("/upload/", response).await
    }

    // ---- read-only collections ----

    /// `GET /history/`: recent uploads, newest first.
    pub async fn history(&self, session: &Session) -> Result<Vec<DatasetSnapshot>, ClientError> {
        self.get_json("/history/", session).await
    }

    /// `GET /trends/`.
    pub async fn trends(&self, session: &Session) -> Result<Vec<DatasetSnapshot>, ClientError> {
        self.get_json("/trends/", session).await
    }

    /// `GET /alerts/`.
    pub async fn alerts(&self, session: &Session) -> Result<Vec<EquipmentAlert>, ClientError> {
        self.get_json("/alerts/", session).await
    }

    /// `GET /rankings/`.
    pub async fn rankings(&self, session: &Session) -> Result<Vec<EquipmentRanking>, ClientError> {
        self.get_json("/rankings/", session).await
    }

    /// `GET /compare-equipment/?names=a,b`.
    pub async fn compare_equipment(
        &self,
        session: &Session,
        names: &[String],
    ) -> Result<Vec<EquipmentComparison>, ClientError> {
        let endpoint = "/compare-equipment/";
        let response = self
            .request(Method::GET, endpoint, session)
            .query(&[("names", names.join(","))])
            .send()
            .await?;
        Self::parse_response(endpoint, response).await
    }

    /// `GET /maintenance/`.
    pub async fn maintenance(
        &self,
        session: &Session,
    ) -> Result<Vec<MaintenanceSchedule>, ClientError> {
        self.get_json("/maintenance/", session).await
    }

    /// `GET /email-reports/`.
    pub async fn email_schedules(
        &self,
        session: &Session,
    ) -> Result<Vec<EmailReportSchedule>, ClientError> {
        self.get_json("/email-reports/", session).await
    }

    // ---- mutations ----

    /// `POST /alerts/{id}/resolve/`.
    pub async fn resolve_alert(
        &self,
        session: &Session,
        alert_id: i64,
    ) -> Result<EquipmentAlert, ClientError> {
        let path = format!("/alerts/{alert_id}/resolve/");
        self.send_json::<(), _>(Method::POST, &path, session, None)
            .await
    }

    /// `POST /maintenance/create/`.
    pub async fn create_maintenance(
        &self,
        session: &Session,
        schedule: &NewMaintenanceSchedule,
    ) -> Result<MaintenanceSchedule, ClientError> {
        self.send_json(Method::POST, "/maintenance/create/", session, Some(schedule))
            .await
    }

    /// `POST /maintenance/{id}/update/`.
    pub async fn update_maintenance_status(
        &self,
        session: &Session,
        schedule_id: i64,
        status: MaintenanceStatus,
        notes: Option<String>,
    ) -> Result<MaintenanceSchedule, ClientError> {
        let path = format!("/maintenance/{schedule_id}/update/");
        let body = MaintenanceStatusUpdate { status, notes };
        self.send_json(Method::POST, &path, session, Some(&body))
            .await
    }

    /// `POST /email-reports/schedule/`.
    pub async fn schedule_email_report(
        &self,
        session: &Session,
        schedule: &NewEmailSchedule,
    ) -> Result<EmailReportSchedule, ClientError> {
        self.send_json(Method::POST, "/email-reports/schedule/", session, Some(schedule))
            .await
    }

    /// `POST /email-reports/{id}/update/`.
    pub async fn update_email_schedule(
        &self,
        session: &Session,
        schedule_id: i64,
        update: &EmailScheduleUpdate,
    ) -> Result<EmailReportSchedule, ClientError> {
        let path = format!("/email-reports/{schedule_id}/update/");
        self.send_json(Method::POST, &path, session, Some(update))
            .await
    }

    /// `DELETE /email-reports/{id}/delete/`.
    pub async fn delete_email_schedule(
        &self,
        session: &Session,
        schedule_id: i64,
    ) -> Result<(), ClientError> {
        let path = format!("/email-reports/{schedule_id}/delete/");
        let response = self.request(Method::DELETE, &path, session).send().await?;
        Self::check_status(response).await
    }

    // ---- binary downloads ----

    /// `GET /report/`: PDF report of the latest upload.
    pub async fn download_report(&self, session: &Session) -> Result<Download, ClientError> {
        self.download("/report/", session, DEFAULT_REPORT_FILE).await
    }

    /// `GET /export/excel/`.
    pub async fn export_excel(&self, session: &Session) -> Result<Download, ClientError> {
        self.download("/export/excel/", session, DEFAULT_EXCEL_FILE)
            .await
    }

    // ---- private helpers ----

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    /// Start a request, attaching the bearer token when the session has one.
    fn request(&self, method: Method, path: &str, session: &Session) -> RequestBuilder {
        tracing::debug!(method = %method, path, authenticated = session.is_authenticated(), "Backend request");
        let builder = self.client.request(method, self.url(path));
        match session.access_token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        session: &Session,
    ) -> Result<T, ClientError> {
        let response = self.request(Method::GET, path, session).send().await?;
        Self::parse_response(path, response).await
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        session: &Session,
        body: Option<&B>,
    ) -> Result<T, ClientError> {
        let mut builder = self.request(method, path, session);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = builder.send().await?;
        Self::parse_response(path, response).await
    }

    async fn download(
        &self,
        path: &str,
        session: &Session,
        default_name: &str,
    ) -> Result<Download, ClientError> {
        let response = self.request(Method::GET, path, session).send().await?;
        let response = Self::ensure_success(response).await?;

        let headers = response.headers();
        let file_name = headers
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(filename_from_disposition)
            .unwrap_or_else(|| default_name.to_string());
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = response.bytes().await?.to_vec();
        tracing::info!(path, file_name = %file_name, size = bytes.len(), "Downloaded");

        Ok(Download {
            file_name,
            content_type,
            bytes,
        })
    }

    /// Ensure the response has a success status code. On failure, the body's
    /// `error` field becomes the message, falling back to the raw body.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        let message = match serde_json::from_str::<ErrorBody>(&body) {
            Ok(err) => err.error,
            Err(_) if body.trim().is_empty() => status
                .canonical_reason()
                .unwrap_or("no response body")
                .to_string(),
            Err(_) => body,
        };

        tracing::warn!(status = status.as_u16(), message = %message, "Backend returned an error");
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Decode a successful JSON body into the expected type.
    async fn parse_response<T: DeserializeOwned>(
        endpoint: &str,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let response = Self::ensure_success(response).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|source| ClientError::Decode {
            endpoint: endpoint.to_string(),
            source,
        })
    }

    /// Assert the response has a success status code, discarding the body.
    async fn check_status(response: reqwest::Response) -> Result<(), ClientError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}

/// Extract a local file name from a `Content-Disposition` header value.
///
/// `filename*` (`UTF-8''` percent-encoded) is preferred over `filename`.
/// Quoted values may contain `;`. Any directory part is stripped, so the
/// result is always a bare name; empty, `.` and `..` names yield `None` and
/// the caller falls back to its default.
pub fn filename_from_disposition(value: &str) -> Option<String> {
    let mut plain = None;
    let mut extended = None;

    for param in split_params(value) {
        let Some((key, raw)) = param.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let raw = raw.trim();
        if key.eq_ignore_ascii_case("filename*") {
            extended = extended.or_else(|| decode_ext_value(raw));
        } else if key.eq_ignore_ascii_case("filename") {
            plain = plain.or_else(|| Some(unquote(raw)));
        }
    }

    extended
        .into_iter()
        .chain(plain)
        .find_map(|name| sanitize_file_name(&name))
}

/// Split header parameters on `;` outside quoted strings.
fn split_params(value: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;

    for (i, c) in value.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                parts.push(&value[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&value[start..]);
    parts
}

fn unquote(raw: &str) -> String {
    let Some(inner) = raw.strip_prefix('"').and_then(|r| r.strip_suffix('"')) else {
        return raw.to_string();
    };

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.extend(chars.next()),
            _ => out.push(c),
        }
    }
    out
}

/// Decode `charset'lang'percent-encoded`. Only UTF-8 is accepted.
fn decode_ext_value(raw: &str) -> Option<String> {
    let mut parts = raw.splitn(3, '\'');
    let charset = parts.next()?;
    let _language = parts.next()?;
    let encoded = parts.next()?;
    if !charset.eq_ignore_ascii_case("utf-8") {
        return None;
    }

    let bytes = encoded.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = encoded.get(i + 1..i + 3)?;
            if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return None;
            }
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

/// Keep only the last path component of a server-supplied name.
fn sanitize_file_name(name: &str) -> Option<String> {
    let base = name.rsplit(|c: char| c == '/' || c == '\\').next()?.trim();
    if base.chars().any(char::is_control) {
        return None;
    }
    match base {
        "" | "." | ".." => None,
        _ => Some(base.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disposition_with_quotes() {
        assert_eq!(
            filename_from_disposition(r#"attachment; filename="equipment_report.pdf""#),
            Some("equipment_report.pdf".to_string())
        );
    }

    #[test]
    fn disposition_without_quotes() {
        assert_eq!(
            filename_from_disposition("attachment; filename=data.xlsx"),
            Some("data.xlsx".to_string())
        );
    }

    #[test]
    fn disposition_without_filename() {
        assert_eq!(filename_from_disposition("inline"), None);
        assert_eq!(filename_from_disposition(r#"attachment; filename="""#), None);
    }

    #[test]
    fn disposition_strips_directories() {
        assert_eq!(
            filename_from_disposition(r#"attachment; filename="../../.bashrc""#),
            Some(".bashrc".to_string())
        );
        assert_eq!(
            filename_from_disposition(r#"attachment; filename="/tmp/owned.pdf""#),
            Some("owned.pdf".to_string())
        );
        assert_eq!(
            filename_from_disposition(r#"attachment; filename="..\\..\\report.pdf""#),
            Some("report.pdf".to_string())
        );
    }

    #[test]
    fn disposition_rejects_dot_names() {
        assert_eq!(filename_from_disposition("attachment; filename=.."), None);
        assert_eq!(filename_from_disposition(r#"attachment; filename="a/..""#), None);
        assert_eq!(filename_from_disposition(r#"attachment; filename="dir/""#), None);
        assert_eq!(filename_from_disposition("attachment; filename=."), None);
    }

    #[test]
    fn disposition_quoted_semicolon() {
        assert_eq!(
            filename_from_disposition(r#"attachment; filename="plant; north.pdf"; size=10"#),
            Some("plant; north.pdf".to_string())
        );
    }

    #[test]
    fn disposition_prefers_extended_name() {
        assert_eq!(
            filename_from_disposition(
                "attachment; filename=\"fallback.pdf\"; filename*=UTF-8''r%C3%A9sum%C3%A9.pdf"
            ),
            Some("résumé.pdf".to_string())
        );
        assert_eq!(
            filename_from_disposition("attachment; filename*=UTF-8''..%2F..%2Fetc%2Fpasswd"),
            Some("passwd".to_string())
        );
    }

    #[test]
    fn disposition_bad_extended_name_falls_back() {
        assert_eq!(
            filename_from_disposition(
                "attachment; filename*=UTF-8''broken%ZZ.pdf; filename=plain.pdf"
            ),
            Some("plain.pdf".to_string())
        );
        assert_eq!(
            filename_from_disposition("attachment; filename*=ISO-8859-1''x.pdf"),
            None
        );
    }

    #[test]
    fn base_url_is_normalized() {
        let api = ApiClient::with_client(reqwest::Client::new(), "http://localhost:8000/api/");
        assert_eq!(api.url("/upload/"), "http://localhost:8000/api/upload/");
    }
}

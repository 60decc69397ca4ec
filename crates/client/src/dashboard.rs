//! Current-upload state: the local preview and the last server summary.

use chemviz_core::equipment::AssessedRecord;
use chemviz_core::health::assess;
use chemviz_core::ingest::ingest;
use chemviz_core::summary::BatchSummary;

use crate::api::ApiClient;
use crate::error::ClientError;
use crate::models::UploadSummary;
use crate::session::Session;

/// Locally derived view of one ingested file.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalPreview {
    pub file_name: String,
    pub records: Vec<AssessedRecord>,
    pub summary: BatchSummary,
}

impl LocalPreview {
    /// Ingest and assess a file without touching the network.
    pub fn from_bytes(file_name: &str, bytes: &[u8]) -> Result<Self, ClientError> {
        let records = ingest(bytes)?;
        let summary = BatchSummary::from_records(&records);
        Ok(Self {
            file_name: file_name.to_string(),
            records: assess(&records),
            summary,
        })
    }
}

/// State for the dashboard views.
///
/// The preview and the server summary are replaced wholesale; a failed step
/// leaves the corresponding previous value in place.
#[derive(Debug, Default)]
pub struct Dashboard {
    preview: Option<LocalPreview>,
    server_summary: Option<UploadSummary>,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preview(&self) -> Option<&LocalPreview> {
        self.preview.as_ref()
    }

    pub fn server_summary(&self) -> Option<&UploadSummary> {
        self.server_summary.as_ref()
    }

    /// Ingest locally and replace the preview. On failure nothing changes.
    pub fn stage(&mut self, file_name: &str, bytes: &[u8]) -> Result<&LocalPreview, ClientError> {
        let preview = LocalPreview::from_bytes(file_name, bytes)?;
        tracing::info!(
            file_name,
            records = preview.records.len(),
            "Local preview ready"
        );
        Ok(self.preview.insert(preview))
    }

    /// Upload raw bytes and replace the server summary. On failure the
    /// previous summary stays.
    pub async fn submit(
        &mut self,
        api: &ApiClient,
        session: &Session,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<&UploadSummary, ClientError> {
        let summary = api.upload_csv(session, file_name, bytes).await?;
        Ok(self.server_summary.insert(summary))
    }

    /// [`stage`](Self::stage) then [`submit`](Self::submit).
    ///
    /// An unreadable file never reaches the backend.
    pub async fn upload(
        &mut self,
        api: &ApiClient,
        session: &Session,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<&UploadSummary, ClientError> {
        self.stage(file_name, &bytes)?;
        self.submit(api, session, file_name, bytes).await
    }

    /// Forget everything (e.g. on logout).
    pub fn clear(&mut self) {
        self.preview = None;
        self.server_summary = None;
    }
}

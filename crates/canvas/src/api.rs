//! Typed course-content operations on top of [`CanvasClient`].

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;
use studyguide_core::run::id_string;
use studyguide_core::{FileContent, FileEncoding, HttpError, ResourceItem};
use tracing::debug;

use crate::client::CanvasClient;

/// Canvas operations the toolset exposes to the model.
#[derive(Debug, Clone)]
pub struct CanvasApi {
    client: CanvasClient,
}

impl CanvasApi {
    pub fn new(client: CanvasClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &CanvasClient {
        &self.client
    }

    /// Courses with an active student enrollment.
    pub async fn list_my_courses(&self) -> Result<Vec<ResourceItem>, HttpError> {
        self.client
            .fetch_all_pages(
                self.client.endpoint(&["api", "v1", "courses"])?.as_str(),
                &[("enrollment_type", "student"), ("enrollment_state", "active")],
            )
            .await
    }

    /// Modules with their items and content details inlined.
    pub async fn list_modules(&self, course_id: &str) -> Result<Vec<ResourceItem>, HttpError> {
        self.client
            .fetch_all_pages(
                self.client
                    .endpoint(&["api", "v1", "courses", course_id, "modules"])?
                    .as_str(),
                &[("include[]", "items"), ("include[]", "content_details")],
            )
            .await
    }

    pub async fn get_module_items(
        &self,
        course_id: &str,
        module_id: &str,
    ) -> Result<Vec<ResourceItem>, HttpError> {
        self.client
            .fetch_all_pages(
                self.client
                    .endpoint(&["api", "v1", "courses", course_id, "modules", module_id, "items"])?
                    .as_str(),
                &[],
            )
            .await
    }

    pub async fn get_page_content(
        &self,
        course_id: &str,
        page_url: &str,
    ) -> Result<ResourceItem, HttpError> {
        self.client
            .fetch_object(
                self.client
                    .endpoint(&["api", "v1", "courses", course_id, "pages", page_url])?
                    .as_str(),
                &[],
            )
            .await
    }

    /// Download a file and normalise it for the model.
    ///
    /// Bytes that decode as UTF-8 are returned as text, anything else as
    /// standard base64. The declared content type never decides this.
    pub async fn get_file_content(&self, file_id: &str) -> Result<FileContent, HttpError> {
        let metadata = self
            .client
            .fetch_object(
                self.client.endpoint(&["api", "v1", "files", file_id])?.as_str(),
                &[],
            )
            .await?;

        let download_url = metadata
            .get("url")
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| HttpError::MissingDownloadUrl {
                file_id: file_id.to_string(),
            })?;
        let url = self.client.resolve_download(download_url)?;
        let raw = self.client.download(url).await?;

        let (encoding, content) = match String::from_utf8(raw) {
            Ok(text) => (FileEncoding::Text, text),
            Err(e) => (FileEncoding::Base64, STANDARD.encode(e.into_bytes())),
        };
        debug!(file_id, ?encoding, "Downloaded file");

        let text_field = |key: &str| {
            metadata
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        Ok(FileContent {
            id: metadata
                .get("id")
                .map(id_string)
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| file_id.to_string()),
            name: text_field("display_name")
                .or_else(|| text_field("filename"))
                .unwrap_or_else(|| file_id.to_string()),
            mime_type: text_field("content-type")
                .unwrap_or_else(|| "application/octet-stream".to_string()),
            encoding,
            content,
        })
    }

    /// Announcements for the given contexts (e.g. `course_123`).
    pub async fn list_announcements(
        &self,
        context_codes: &[String],
    ) -> Result<Vec<ResourceItem>, HttpError> {
        let params: Vec<(&str, &str)> = context_codes
            .iter()
            .map(|code| ("context_codes[]", code.as_str()))
            .collect();
        self.client
            .fetch_all_pages(
                self.client.endpoint(&["api", "v1", "announcements"])?.as_str(),
                &params,
            )
            .await
    }

    pub async fn list_assignments(&self, course_id: &str) -> Result<Vec<ResourceItem>, HttpError> {
        self.client
            .fetch_all_pages(
                self.client
                    .endpoint(&["api", "v1", "courses", course_id, "assignments"])?
                    .as_str(),
                &[],
            )
            .await
    }
}

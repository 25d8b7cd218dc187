//! Azure Blob Storage backend over the REST API, authorised by a SAS token.
//!
//! Containers: `config`, `study-guides`, `runs`. Paths returned to callers
//! are `<container>/<blob>`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{Map, Value};
use studyguide_core::{ArtifactStore, PromptMaterials, StorageError};
use tracing::debug;
use url::Url;

use crate::{
    CONFIG_CONTAINER, GUIDELINES_NAME, GUIDES_CONTAINER, META_NAME, RUNS_CONTAINER, TEMPLATE_NAME,
    artifact_name, validate_key,
};

const API_VERSION: &str = "2021-08-06";

pub struct BlobStore {
    service_url: String,
    sas_token: String,
    client: reqwest::Client,
}

impl BlobStore {
    /// `service_url` is `https://<account>.blob.core.windows.net` (or an
    /// emulator URL); `sas_token` may carry a leading `?`.
    pub fn new(service_url: &str, sas_token: &str) -> Result<Self, StorageError> {
        let service_url = service_url.trim().trim_end_matches('/').to_string();
        Url::parse(&service_url).map_err(|e| StorageError::NotConfigured(format!(
            "invalid blob account URL {service_url}: {e}"
        )))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| StorageError::NotConfigured(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            service_url,
            sas_token: sas_token.trim().trim_start_matches('?').to_string(),
            client,
        })
    }

    fn blob_url(&self, container: &str, blob: &str) -> Result<Url, StorageError> {
        let raw = format!("{}/{container}/{blob}?{}", self.service_url, self.sas_token);
        Url::parse(&raw).map_err(|e| StorageError::Blob {
            blob: format!("{container}/{blob}"),
            reason: e.to_string(),
        })
    }

    /// Download a blob as text; a missing blob reads as empty.
    async fn download_text(&self, container: &str, blob: &str) -> Result<String, StorageError> {
        let name = format!("{container}/{blob}");
        let response = self
            .client
            .get(self.blob_url(container, blob)?)
            .header("x-ms-version", API_VERSION)
            .send()
            .await
            .map_err(|e| blob_error(&name, e))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(String::new()),
            status if status.is_success() => response.text().await.map_err(|e| blob_error(&name, e)),
            status => Err(StorageError::Blob {
                blob: name,
                reason: format!("status {}", status.as_u16()),
            }),
        }
    }

    async fn upload(
        &self,
        container: &str,
        blob: &str,
        content_type: &str,
        body: Vec<u8>,
    ) -> Result<String, StorageError> {
        let name = format!("{container}/{blob}");
        let response = self
            .client
            .put(self.blob_url(container, blob)?)
            .header("x-ms-version", API_VERSION)
            .header("x-ms-blob-type", "BlockBlob")
            .header("content-type", content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| blob_error(&name, e))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(StorageError::Blob {
                blob: name,
                reason: format!("status {}: {detail}", status.as_u16()),
            });
        }
        debug!(blob = %name, "Blob uploaded");
        Ok(name)
    }
}

fn blob_error(name: &str, e: reqwest::Error) -> StorageError {
    StorageError::Blob {
        blob: name.to_string(),
        reason: e.to_string(),
    }
}

fn to_json(blob: &str, value: &Map<String, Value>) -> Result<Vec<u8>, StorageError> {
    serde_json::to_vec(value).map_err(|e| StorageError::Blob {
        blob: blob.to_string(),
        reason: e.to_string(),
    })
}

#[async_trait]
impl ArtifactStore for BlobStore {
    fn name(&self) -> &str {
        "azure_blob"
    }

    async fn read_config(&self) -> Result<PromptMaterials, StorageError> {
        Ok(PromptMaterials {
            template: self.download_text(CONFIG_CONTAINER, TEMPLATE_NAME).await?,
            guidelines: self.download_text(CONFIG_CONTAINER, GUIDELINES_NAME).await?,
        })
    }

    async fn write_artifact(
        &self,
        course_id: &str,
        slug: &str,
        content: &str,
        meta: &Map<String, Value>,
    ) -> Result<String, StorageError> {
        let course_id = validate_key(course_id)?;
        let guide_blob = format!("{course_id}/{}", artifact_name(slug)?);
        let meta_blob = format!("{course_id}/{META_NAME}");

        let path = self
            .upload(
                GUIDES_CONTAINER,
                &guide_blob,
                "text/markdown; charset=utf-8",
                content.as_bytes().to_vec(),
            )
            .await?;
        self.upload(
            GUIDES_CONTAINER,
            &meta_blob,
            "application/json",
            to_json(&meta_blob, meta)?,
        )
        .await?;
        Ok(path)
    }

    async fn write_run_record(
        &self,
        run_id: &str,
        summary: &Map<String, Value>,
    ) -> Result<String, StorageError> {
        let blob = format!("{}.json", validate_key(run_id)?);
        self.upload(RUNS_CONTAINER, &blob, "application/json", to_json(&blob, summary)?)
            .await
    }
}

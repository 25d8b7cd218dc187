//! Filesystem storage backend.
//!
//! Directories are created on first write. Missing template or guideline
//! files read as empty text.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Map, Value};
use studyguide_core::{ArtifactStore, PromptMaterials, StorageError};
use tracing::debug;

use crate::{
    CONFIG_CONTAINER, GUIDELINES_NAME, GUIDES_CONTAINER, META_NAME, RUNS_CONTAINER, TEMPLATE_NAME,
    artifact_name, validate_key,
};

/// Stores everything under one base directory.
pub struct LocalStore {
    name: String,
    base: PathBuf,
}

impl LocalStore {
    pub fn new(name: impl Into<String>, base: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            base: base.into(),
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    async fn read_optional(path: &Path) -> Result<String, StorageError> {
        match tokio::fs::read_to_string(path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(io_error(path, e)),
        }
    }

    async fn write(path: &Path, content: &[u8]) -> Result<(), StorageError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error(parent, e))?;
        }
        tokio::fs::write(path, content)
            .await
            .map_err(|e| io_error(path, e))
    }
}

fn io_error(path: &Path, e: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

fn to_json(path: &Path, value: &Map<String, Value>) -> Result<Vec<u8>, StorageError> {
    serde_json::to_vec_pretty(value).map_err(|e| StorageError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

#[async_trait]
impl ArtifactStore for LocalStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read_config(&self) -> Result<PromptMaterials, StorageError> {
        let config_dir = self.base.join(CONFIG_CONTAINER);
        Ok(PromptMaterials {
            template: Self::read_optional(&config_dir.join(TEMPLATE_NAME)).await?,
            guidelines: Self::read_optional(&config_dir.join(GUIDELINES_NAME)).await?,
        })
    }

    async fn write_artifact(
        &self,
        course_id: &str,
        slug: &str,
        content: &str,
        meta: &Map<String, Value>,
    ) -> Result<String, StorageError> {
        let course_dir = self.base.join(GUIDES_CONTAINER).join(validate_key(course_id)?);
        let guide_path = course_dir.join(artifact_name(slug)?);
        let meta_path = course_dir.join(META_NAME);

        Self::write(&guide_path, content.as_bytes()).await?;
        Self::write(&meta_path, &to_json(&meta_path, meta)?).await?;

        debug!(storage = %self.name, course_id, path = %guide_path.display(), "Artifact written");
        Ok(guide_path.display().to_string())
    }

    async fn write_run_record(
        &self,
        run_id: &str,
        summary: &Map<String, Value>,
    ) -> Result<String, StorageError> {
        let path = self
            .base
            .join(RUNS_CONTAINER)
            .join(format!("{}.json", validate_key(run_id)?));
        Self::write(&path, &to_json(&path, summary)?).await?;

        debug!(storage = %self.name, run_id, path = %path.display(), "Run record written");
        Ok(path.display().to_string())
    }
}

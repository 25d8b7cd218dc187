//! Storage collaborator: where prompt material is read from and where
//! generated artifacts and run records are written to.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::StorageError;

/// Template and guideline text used to compose the run prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptMaterials {
    pub template: String,
    pub guidelines: String,
}

/// The storage collaborator contract.
///
/// Implementations serialize concurrent writers at the object level; the
/// run itself never shares a store across concurrent runs.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// A short name for logs (e.g. "local", "azure_blob").
    fn name(&self) -> &str;

    /// Read template and guidelines; missing documents read as empty text.
    async fn read_config(&self) -> Result<PromptMaterials, StorageError>;

    /// Persist the generated artifact for a course and return its path.
    async fn write_artifact(
        &self,
        course_id: &str,
        slug: &str,
        content: &str,
        meta: &Map<String, Value>,
    ) -> Result<String, StorageError>;

    /// Persist a run summary and return its path.
    async fn write_run_record(
        &self,
        run_id: &str,
        summary: &Map<String, Value>,
    ) -> Result<String, StorageError>;
}

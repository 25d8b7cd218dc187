//! Write a generated study guide back to storage.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use studyguide_core::{ArtifactStore, Tool, ToolError, ToolResult};
use tracing::info;

use crate::args::{id_arg, optional_object, optional_string, string_arg};

pub struct WriteArtifactTool {
    store: Arc<dyn ArtifactStore>,
}

impl WriteArtifactTool {
    pub fn new(store: Arc<dyn ArtifactStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for WriteArtifactTool {
    fn name(&self) -> &str {
        "write_artifact"
    }

    fn description(&self) -> &str {
        "Save the study guide for a course. Returns the path it was written to."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "course_id": {
                    "type": "string",
                    "description": "The Canvas course id the guide belongs to"
                },
                "content": {
                    "type": "string",
                    "description": "The full study guide in Markdown"
                },
                "slug": {
                    "type": "string",
                    "description": "Optional artifact name (default: study-guide)"
                },
                "meta": {
                    "type": "object",
                    "description": "Optional course metadata stored next to the guide"
                }
            },
            "required": ["course_id", "content"]
        })
    }

    async fn execute(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        let course_id = id_arg(&arguments, "course_id")?;
        let content = string_arg(&arguments, "content")?;
        let slug = optional_string(&arguments, "slug")?;
        let meta = optional_object(&arguments, "meta")?;

        let path = self
            .store
            .write_artifact(&course_id, &slug, content, &meta)
            .await?;
        info!(course_id = %course_id, path = %path, storage = self.store.name(), "Study guide written");
        Ok(ToolResult::Json(json!({ "path": path })))
    }
}

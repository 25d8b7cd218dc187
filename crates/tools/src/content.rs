//! Page and file content.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use studyguide_canvas::CanvasApi;
use studyguide_core::{Tool, ToolError, ToolResult};

use crate::args::{id_arg, string_arg};

pub struct GetPageContentTool {
    api: Arc<CanvasApi>,
}

impl GetPageContentTool {
    pub fn new(api: Arc<CanvasApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Tool for GetPageContentTool {
    fn name(&self) -> &str {
        "get_page_content"
    }

    fn description(&self) -> &str {
        "Fetch a wiki page of a course, including its HTML body."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "course_id": {
                    "type": "string",
                    "description": "The Canvas course id"
                },
                "page_url": {
                    "type": "string",
                    "description": "The page url slug, as found on a module item"
                }
            },
            "required": ["course_id", "page_url"]
        })
    }

    async fn execute(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        let course_id = id_arg(&arguments, "course_id")?;
        let page_url = string_arg(&arguments, "page_url")?;
        ToolResult::json(&self.api.get_page_content(&course_id, page_url).await?)
    }
}

pub struct GetFileContentTool {
    api: Arc<CanvasApi>,
}

impl GetFileContentTool {
    pub fn new(api: Arc<CanvasApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Tool for GetFileContentTool {
    fn name(&self) -> &str {
        "get_file_content"
    }

    fn description(&self) -> &str {
        "Download a course file. Returns text when the file is UTF-8, otherwise base64 with encoding set to \"base64\"."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "file_id": {
                    "type": "string",
                    "description": "The Canvas file id"
                }
            },
            "required": ["file_id"]
        })
    }

    async fn execute(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        let file_id = id_arg(&arguments, "file_id")?;
        ToolResult::json(&self.api.get_file_content(&file_id).await?)
    }
}

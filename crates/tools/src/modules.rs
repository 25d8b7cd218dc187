//! Module structure of a course.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use studyguide_canvas::CanvasApi;
use studyguide_core::{Tool, ToolError, ToolResult};

use crate::args::id_arg;

pub struct ListModulesTool {
    api: Arc<CanvasApi>,
}

impl ListModulesTool {
    pub fn new(api: Arc<CanvasApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Tool for ListModulesTool {
    fn name(&self) -> &str {
        "list_modules"
    }

    fn description(&self) -> &str {
        "List the modules of a course with their items and content details."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "course_id": {
                    "type": "string",
                    "description": "The Canvas course id"
                }
            },
            "required": ["course_id"]
        })
    }

    async fn execute(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        let course_id = id_arg(&arguments, "course_id")?;
        ToolResult::json(&self.api.list_modules(&course_id).await?)
    }
}

pub struct GetModuleItemsTool {
    api: Arc<CanvasApi>,
}

impl GetModuleItemsTool {
    pub fn new(api: Arc<CanvasApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Tool for GetModuleItemsTool {
    fn name(&self) -> &str {
        "get_module_items"
    }

    fn description(&self) -> &str {
        "List the items (pages, files, assignments, links) of one module."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "course_id": {
                    "type": "string",
                    "description": "The Canvas course id"
                },
                "module_id": {
                    "type": "string",
                    "description": "The module id within the course"
                }
            },
            "required": ["course_id", "module_id"]
        })
    }

    async fn execute(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        let course_id = id_arg(&arguments, "course_id")?;
        let module_id = id_arg(&arguments, "module_id")?;
        ToolResult::json(&self.api.get_module_items(&course_id, &module_id).await?)
    }
}

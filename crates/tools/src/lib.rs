//! Canvas course-content tools for the study guide model.
//!
//! [`canvas_registry`] builds the fixed tool table once per run. The same
//! table produces the definitions advertised to the model and executes the
//! calls it makes, so the advertised schema and the handlers cannot drift.
//! [`ToolDispatcher`] exposes the table to `{tool, arguments}` requests.

pub mod args;
pub mod artifact;
pub mod content;
pub mod courses;
pub mod modules;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use serde_json::{Map, Value};
use studyguide_canvas::CanvasApi;
use studyguide_core::{ArtifactStore, ToolCall, ToolError, ToolRegistry};
use tracing::debug;

pub use artifact::WriteArtifactTool;
pub use content::{GetFileContentTool, GetPageContentTool};
pub use courses::{ListAnnouncementsTool, ListAssignmentsTool, ListMyCoursesTool};
pub use modules::{GetModuleItemsTool, ListModulesTool};

/// Tool names in advertised order.
pub const TOOL_NAMES: [&str; 8] = [
    "list_my_courses",
    "list_modules",
    "get_module_items",
    "get_page_content",
    "get_file_content",
    "list_announcements",
    "list_assignments",
    "write_artifact",
];

/// Build the registry of every Canvas tool plus `write_artifact`.
pub fn canvas_registry(
    api: Arc<CanvasApi>,
    store: Arc<dyn ArtifactStore>,
    course_filter: Option<String>,
) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(ListMyCoursesTool::new(api.clone(), course_filter)));
    registry.register(Box::new(ListModulesTool::new(api.clone())));
    registry.register(Box::new(GetModuleItemsTool::new(api.clone())));
    registry.register(Box::new(GetPageContentTool::new(api.clone())));
    registry.register(Box::new(GetFileContentTool::new(api.clone())));
    registry.register(Box::new(ListAnnouncementsTool::new(api.clone())));
    registry.register(Box::new(ListAssignmentsTool::new(api)));
    registry.register(Box::new(WriteArtifactTool::new(store)));
    registry
}

/// Synchronous `{tool, arguments}` dispatch over a tool registry.
#[derive(Clone)]
pub struct ToolDispatcher {
    registry: Arc<ToolRegistry>,
}

impl ToolDispatcher {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Registered tool names, sorted.
    pub fn list_tools(&self) -> Vec<String> {
        let mut names: Vec<String> = self.registry.names().into_iter().map(String::from).collect();
        names.sort();
        names
    }

    /// Run one tool and return its result as JSON. `null` arguments mean `{}`.
    pub async fn dispatch(&self, tool: &str, arguments: Value) -> Result<Value, ToolError> {
        let arguments = match arguments {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };
        debug!(tool, "Dispatching tool request");
        let call = ToolCall {
            id: format!("dispatch-{tool}"),
            name: tool.to_string(),
            arguments,
        };
        Ok(self.registry.execute(&call).await?.into_value())
    }
}

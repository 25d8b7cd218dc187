//! Course-level listings: enrolled courses, assignments, announcements.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use studyguide_canvas::CanvasApi;
use studyguide_core::run::id_string;
use studyguide_core::{ResourceItem, Tool, ToolError, ToolResult};
use tracing::debug;

use crate::args::{id_arg, string_list_arg};

pub struct ListMyCoursesTool {
    api: Arc<CanvasApi>,
    course_filter: Option<String>,
}

impl ListMyCoursesTool {
    pub fn new(api: Arc<CanvasApi>, course_filter: Option<String>) -> Self {
        Self { api, course_filter }
    }
}

/// Does `course` match a filter by exact id, or by name / course code substring?
pub fn matches_course_filter(course: &ResourceItem, filter: &str) -> bool {
    let filter = filter.trim();
    if filter.is_empty() {
        return true;
    }
    if course.get("id").map(id_string).is_some_and(|id| id == filter) {
        return true;
    }
    let needle = filter.to_lowercase();
    ["name", "course_code"].iter().any(|key| {
        course
            .get(*key)
            .and_then(Value::as_str)
            .is_some_and(|text| text.to_lowercase().contains(&needle))
    })
}

#[async_trait]
impl Tool for ListMyCoursesTool {
    fn name(&self) -> &str {
        "list_my_courses"
    }

    fn description(&self) -> &str {
        "List the courses the student is actively enrolled in."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    async fn execute(&self, _arguments: Value) -> Result<ToolResult, ToolError> {
        let mut courses = self.api.list_my_courses().await?;
        if let Some(filter) = self.course_filter.as_deref() {
            let before = courses.len();
            courses.retain(|course| matches_course_filter(course, filter));
            debug!(filter, before, after = courses.len(), "Applied course filter");
        }
        ToolResult::json(&courses)
    }
}

pub struct ListAssignmentsTool {
    api: Arc<CanvasApi>,
}

impl ListAssignmentsTool {
    pub fn new(api: Arc<CanvasApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Tool for ListAssignmentsTool {
    fn name(&self) -> &str {
        "list_assignments"
    }

    fn description(&self) -> &str {
        "List the assignments of a course, including due dates and descriptions."
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
        ToolResult::json(&self.api.list_assignments(&course_id).await?)
    }
}

pub struct ListAnnouncementsTool {
    api: Arc<CanvasApi>,
}

impl ListAnnouncementsTool {
    pub fn new(api: Arc<CanvasApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Tool for ListAnnouncementsTool {
    fn name(&self) -> &str {
        "list_announcements"
    }

    fn description(&self) -> &str {
        "List announcements for one or more contexts, e.g. [\"course_123\"]."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "context_codes": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Context codes such as course_123"
                }
            },
            "required": ["context_codes"]
        })
    }

    async fn execute(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        let codes = string_list_arg(&arguments, "context_codes")?;
        ToolResult::json(&self.api.list_announcements(&codes).await?)
    }
}

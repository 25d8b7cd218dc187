//! Run-level value types: the immutable run configuration and the outcome.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Immutable per-run configuration.
///
/// Built once per run. Recomposing the prompt produces a new value via
/// [`RunConfig::with_task_prompt`] rather than mutating this one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Orchestrator identifier (e.g. "azure_openai", "foundry", "gemini")
    pub agent_provider: String,

    /// Storage identifier (e.g. "local", "gcs", "azure")
    pub storage_provider: String,

    /// The task prompt handed to the orchestrator
    pub task_prompt: String,

    /// Restrict course listing to one course
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_filter: Option<String>,

    /// Caller-supplied run id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
}

impl RunConfig {
    pub fn new(
        agent_provider: impl Into<String>,
        storage_provider: impl Into<String>,
        task_prompt: impl Into<String>,
    ) -> Self {
        Self {
            agent_provider: agent_provider.into(),
            storage_provider: storage_provider.into(),
            task_prompt: task_prompt.into(),
            course_filter: None,
            run_id: None,
        }
    }

    /// A copy of this config carrying a different task prompt.
    pub fn with_task_prompt(&self, task_prompt: impl Into<String>) -> Self {
        Self {
            task_prompt: task_prompt.into(),
            ..self.clone()
        }
    }
}

/// Per-course status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseStatus {
    Updated,
    Unknown,
    Failed,
}

impl CourseStatus {
    /// Parse a collaborator-supplied status; anything unrecognised is `Unknown`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "updated" => Self::Updated,
            "failed" => Self::Failed,
            _ => Self::Unknown,
        }
    }
}

/// One row of a run's output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseResult {
    pub course_id: String,
    pub status: CourseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guide_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CourseResult {
    /// A successfully written artifact.
    pub fn updated(course_id: impl Into<String>, guide_path: Option<String>) -> Self {
        Self {
            course_id: course_id.into(),
            status: CourseStatus::Updated,
            guide_path,
            error: None,
        }
    }

    /// Map the raw `{course_id, status?, guide_path?, error?}` shape.
    ///
    /// Missing status is `unknown`; a row carrying an error is always `failed`.
    pub fn from_value(raw: &Value) -> Self {
        let course_id = raw.get("course_id").map(id_string).unwrap_or_default();
        let error = raw
            .get("error")
            .and_then(Value::as_str)
            .map(str::to_string);
        let status = match (&error, raw.get("status").and_then(Value::as_str)) {
            (Some(_), _) => CourseStatus::Failed,
            (None, Some(status)) => CourseStatus::parse(status),
            (None, None) => CourseStatus::Unknown,
        };
        Self {
            course_id,
            status,
            guide_path: raw
                .get("guide_path")
                .and_then(Value::as_str)
                .map(str::to_string),
            error,
        }
    }
}

/// Stringify a remote identifier that may arrive as a string or a number.
pub fn id_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// The result of one orchestrator invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub success: bool,
    #[serde(default)]
    pub course_results: Vec<CourseResult>,
    #[serde(default)]
    pub metrics: Map<String, Value>,
}

impl RunOutcome {
    /// Number of course results that carry an error.
    pub fn error_count(&self) -> usize {
        self.course_results
            .iter()
            .filter(|r| r.error.is_some())
            .count()
    }
}

//! Shared test helpers: scripted models, stub tools and a recording store.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Map, Value, json};
use studyguide_core::error::ProviderError;
use studyguide_core::message::{Message, MessageToolCall};
use studyguide_core::provider::{
    ActionModel, DelegatePayload, DelegateResponse, ModelAction, Provider, ProviderRequest,
    ProviderResponse, RunClient, TranscriptEntry, Usage,
};
use studyguide_core::{ArtifactStore, PromptMaterials, StorageError};
use studyguide_core::{Tool, ToolError, ToolRegistry, ToolResult};

/// A provider that returns a sequence of scripted responses.
///
/// Panics if more calls are made than responses provided.
pub struct SequentialMockProvider {
    responses: Mutex<VecDeque<ProviderResponse>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl SequentialMockProvider {
    pub fn new(responses: Vec<ProviderResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A provider that requests `tool_calls` on every turn.
    pub fn always_calling(tool_calls: Vec<MessageToolCall>, turns: usize) -> Self {
        Self::new(
            (0..turns)
                .map(|_| make_tool_call_response(tool_calls.clone()))
                .collect(),
        )
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        self.requests.lock().unwrap().push(request);
        let next = self.responses.lock().unwrap().pop_front();
        Ok(next.unwrap_or_else(|| {
            panic!(
                "SequentialMockProvider: no more responses (call #{})",
                self.call_count()
            )
        }))
    }
}

pub fn make_text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

pub fn make_tool_call_response(tool_calls: Vec<MessageToolCall>) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant_tool_calls(tool_calls),
        usage: None,
        model: "mock-model".into(),
    }
}

pub fn call(id: &str, name: &str, arguments: Value) -> MessageToolCall {
    MessageToolCall {
        id: id.into(),
        name: name.into(),
        arguments: arguments.to_string(),
    }
}

/// An action model replaying scripted actions and recording each transcript it saw.
pub struct ScriptedActionModel {
    actions: Mutex<VecDeque<ModelAction>>,
    transcripts: Mutex<Vec<Vec<TranscriptEntry>>>,
}

impl ScriptedActionModel {
    pub fn new(actions: Vec<ModelAction>) -> Self {
        Self {
            actions: Mutex::new(actions.into()),
            transcripts: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.transcripts.lock().unwrap().len()
    }

    pub fn transcripts(&self) -> Vec<Vec<TranscriptEntry>> {
        self.transcripts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ActionModel for ScriptedActionModel {
    async fn generate(
        &self,
        _prompt: &str,
        transcript: &[TranscriptEntry],
    ) -> Result<ModelAction, ProviderError> {
        self.transcripts.lock().unwrap().push(transcript.to_vec());
        let next = self.actions.lock().unwrap().pop_front();
        Ok(next.expect("ScriptedActionModel: no more actions"))
    }
}

/// A run client returning one fixed response and recording its payloads.
pub struct ScriptedRunClient {
    response: DelegateResponse,
    payloads: Mutex<Vec<DelegatePayload>>,
}

impl ScriptedRunClient {
    pub fn new(response: DelegateResponse) -> Self {
        Self {
            response,
            payloads: Mutex::new(Vec::new()),
        }
    }

    pub fn payloads(&self) -> Vec<DelegatePayload> {
        self.payloads.lock().unwrap().clone()
    }
}

#[async_trait]
impl RunClient for ScriptedRunClient {
    async fn run(&self, payload: DelegatePayload) -> Result<DelegateResponse, ProviderError> {
        self.payloads.lock().unwrap().push(payload);
        Ok(self.response.clone())
    }
}

/// A tool returning a fixed JSON value and logging `name` on every call.
pub struct StubTool {
    name: &'static str,
    result: Value,
    log: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Tool for StubTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "stub"
    }

    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {}, "required": []})
    }

    async fn execute(&self, _arguments: Value) -> Result<ToolResult, ToolError> {
        self.log.lock().unwrap().push(self.name.to_string());
        Ok(ToolResult::Json(self.result.clone()))
    }
}

/// Stand-in for `write_artifact`: returns `{"path": "guides/<course_id>/<slug>.md"}`.
/// `slug` defaults to `study-guide`.
pub struct StubWriteTool {
    log: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Tool for StubWriteTool {
    fn name(&self) -> &str {
        "write_artifact"
    }

    fn description(&self) -> &str {
        "stub write"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "course_id": {"type": "string"},
                "content": {"type": "string"},
                "slug": {"type": "string"}
            },
            "required": ["course_id", "content"]
        })
    }

    async fn execute(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        self.log.lock().unwrap().push("write_artifact".into());
        let course_id = match &arguments["course_id"] {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let slug = arguments["slug"].as_str().unwrap_or("study-guide");
        Ok(ToolResult::Json(json!({"path": format!("guides/{course_id}/{slug}.md")})))
    }
}

/// A tool that always fails.
pub struct FailingTool;

#[async_trait]
impl Tool for FailingTool {
    fn name(&self) -> &str {
        "get_page_content"
    }

    fn description(&self) -> &str {
        "fails"
    }

    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {}, "required": []})
    }

    async fn execute(&self, _arguments: Value) -> Result<ToolResult, ToolError> {
        Err(ToolError::ExecutionFailed {
            tool_name: "get_page_content".into(),
            reason: "page not found".into(),
        })
    }
}

/// A registry with `list_my_courses`, `list_modules`, `write_artifact` and a
/// failing `get_page_content`, plus the shared call log.
pub fn stub_registry() -> (Arc<ToolRegistry>, Arc<Mutex<Vec<String>>>) {
    let log: Arc<Mutex<Vec<String>>> = Arc::default();
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(StubTool {
        name: "list_my_courses",
        result: json!([{"id": "1", "name": "Algorithms"}]),
        log: log.clone(),
    }));
    registry.register(Box::new(StubTool {
        name: "list_modules",
        result: json!([{"id": "10", "name": "Week 1"}]),
        log: log.clone(),
    }));
    registry.register(Box::new(StubWriteTool { log: log.clone() }));
    registry.register(Box::new(FailingTool));
    (Arc::new(registry), log)
}

/// Records run summaries; serves fixed prompt materials.
#[derive(Default)]
pub struct RecordingStore {
    pub materials: PromptMaterials,
    pub runs: Mutex<Vec<(String, Map<String, Value>)>>,
}

#[async_trait]
impl ArtifactStore for RecordingStore {
    fn name(&self) -> &str {
        "recording"
    }

    async fn read_config(&self) -> Result<PromptMaterials, StorageError> {
        Ok(self.materials.clone())
    }

    async fn write_artifact(
        &self,
        course_id: &str,
        _slug: &str,
        _content: &str,
        _meta: &Map<String, Value>,
    ) -> Result<String, StorageError> {
        Ok(format!("recording/{course_id}.md"))
    }

    async fn write_run_record(
        &self,
        run_id: &str,
        summary: &Map<String, Value>,
    ) -> Result<String, StorageError> {
        self.runs
            .lock()
            .unwrap()
            .push((run_id.to_string(), summary.clone()));
        Ok(format!("runs/{run_id}.json"))
    }
}

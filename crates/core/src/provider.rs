//! Model capabilities: the abstraction over LLM vendors.
//!
//! Three turn shapes are supported, one per orchestration strategy:
//!
//! - [`Provider`]: chat completions where one turn may carry a batch of
//!   tool calls (OpenAI-compatible endpoints).
//! - [`RunClient`]: a run-capable collaborator that takes the whole task
//!   as one payload and reports results back.
//! - [`ActionModel`]: a model that emits exactly one discrete action per
//!   call, given the prompt and a transcript of prior tool invocations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ProviderError;
use crate::message::Message;

/// A single chat-completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRequest {
    /// The model or deployment name
    pub model: String,

    /// The full conversation history
    pub messages: Vec<Message>,

    /// Tools the model can call
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,
}

/// A tool definition sent to the model so it knows what it can call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// The tool name
    pub name: String,

    /// Description of what the tool does
    pub description: String,

    /// JSON Schema describing the tool's parameters
    pub parameters: Value,
}

/// One model turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// The generated message; `tool_calls` empty means a final turn
    pub message: Message,

    /// Token usage statistics
    pub usage: Option<Usage>,

    /// Which model actually responded
    pub model: String,
}

/// Token usage information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Chat-completion backend with batched tool calls.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "azure_openai").
    fn name(&self) -> &str;

    /// Send the full history and get the next turn.
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError>;
}

/// The payload handed to a run-capable collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelegatePayload {
    /// The composed prompt for this invocation
    pub prompt: String,

    /// The task prompt carried by the run config
    pub task_prompt: String,

    /// Tool server endpoint the collaborator should call back into
    pub endpoint: Option<String>,
}

/// What a run-capable collaborator reports back.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DelegateResponse {
    #[serde(default)]
    pub course_results: Vec<Value>,

    #[serde(default)]
    pub metrics: Map<String, Value>,

    #[serde(default)]
    pub raw_text: String,
}

/// A collaborator that executes the whole task from one payload.
#[async_trait]
pub trait RunClient: Send + Sync {
    async fn run(&self, payload: DelegatePayload) -> Result<DelegateResponse, ProviderError>;
}

/// One prior tool invocation, replayed to an [`ActionModel`] on every turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub tool_name: String,
    pub arguments: Value,
    pub result: Value,
}

/// A single discrete action emitted by an [`ActionModel`].
#[derive(Debug, Clone, PartialEq)]
pub enum ModelAction {
    /// Invoke one tool
    FunctionCall { name: String, arguments: Value },

    /// Stop, reporting per-course results in their raw shape
    Final { course_results: Vec<Value> },

    /// Anything else the model produced, named by its type
    Unsupported { kind: String },
}

impl ModelAction {
    /// Interpret a `{type, ...}` action object.
    ///
    /// `function_call` reads `name` and `arguments` (default `{}`), `final`
    /// reads `course_results` (default empty). Any other or missing type
    /// becomes [`ModelAction::Unsupported`].
    pub fn from_value(value: &Value) -> Self {
        let kind = value.get("type").and_then(Value::as_str).unwrap_or_default();
        match kind {
            "function_call" => Self::FunctionCall {
                name: value
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                arguments: value
                    .get("arguments")
                    .cloned()
                    .unwrap_or_else(|| Value::Object(Map::new())),
            },
            "final" => Self::Final {
                course_results: value
                    .get("course_results")
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default(),
            },
            other => Self::Unsupported {
                kind: if other.is_empty() {
                    "<missing>".into()
                } else {
                    other.to_string()
                },
            },
        }
    }
}

/// A model that emits one action per call.
#[async_trait]
pub trait ActionModel: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        transcript: &[TranscriptEntry],
    ) -> Result<ModelAction, ProviderError>;
}

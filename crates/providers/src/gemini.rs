//! Gemini `generateContent` adapter emitting one action per call.
//!
//! Every call replays the prompt and the full transcript of prior tool
//! invocations as `functionCall` / `functionResponse` turns. A candidate
//! part carrying a `functionCall` becomes a `function_call` action;
//! otherwise the text is the final answer, and per-course results are read
//! from a JSON object embedded in it when one is present.

use async_trait::async_trait;
use serde_json::{Map, Value, json};
use studyguide_core::error::ProviderError;
use studyguide_core::provider::{ActionModel, ModelAction, ToolDefinition, TranscriptEntry};
use tracing::debug;

use crate::status::{build_client, check_status, transport_error};

pub struct GeminiActionModel {
    base_url: String,
    api_key: String,
    model: String,
    tools: Vec<ToolDefinition>,
    client: reqwest::Client,
}

impl GeminiActionModel {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        tools: Vec<ToolDefinition>,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            tools,
            client: build_client(120)?,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn contents(prompt: &str, transcript: &[TranscriptEntry]) -> Vec<Value> {
        let mut contents = vec![json!({"role": "user", "parts": [{"text": prompt}]})];
        for entry in transcript {
            contents.push(json!({
                "role": "model",
                "parts": [{"functionCall": {"name": entry.tool_name, "args": entry.arguments}}]
            }));
            contents.push(json!({
                "role": "user",
                "parts": [{"functionResponse": {
                    "name": entry.tool_name,
                    "response": {"result": entry.result}
                }}]
            }));
        }
        contents
    }

    /// Function declarations; parameter-less tools omit `parameters`.
    fn declarations(tools: &[ToolDefinition]) -> Vec<Value> {
        tools
            .iter()
            .map(|tool| {
                let has_properties = tool.parameters["properties"]
                    .as_object()
                    .is_some_and(|p| !p.is_empty());
                if has_properties {
                    json!({
                        "name": tool.name,
                        "description": tool.description,
                        "parameters": tool.parameters,
                    })
                } else {
                    json!({"name": tool.name, "description": tool.description})
                }
            })
            .collect()
    }

    fn parse_action(body: &Value) -> ModelAction {
        let Some(parts) = body["candidates"][0]["content"]["parts"].as_array() else {
            return ModelAction::Unsupported {
                kind: "no_candidates".into(),
            };
        };

        if let Some(call) = parts.iter().find_map(|p| p.get("functionCall")) {
            return ModelAction::FunctionCall {
                name: call["name"].as_str().unwrap_or_default().to_string(),
                arguments: call
                    .get("args")
                    .filter(|a| a.is_object())
                    .cloned()
                    .unwrap_or_else(|| Value::Object(Map::new())),
            };
        }

        let text: String = parts
            .iter()
            .filter_map(|p| p["text"].as_str())
            .collect::<Vec<_>>()
            .join("");
        ModelAction::Final {
            course_results: course_results_from_text(&text),
        }
    }
}

/// Read `course_results` from the outermost `{...}` span of `text`.
fn course_results_from_text(text: &str) -> Vec<Value> {
    let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) else {
        return Vec::new();
    };
    if end < start {
        return Vec::new();
    }
    serde_json::from_str::<Value>(&text[start..=end])
        .ok()
        .and_then(|v| v.get("course_results").and_then(Value::as_array).cloned())
        .unwrap_or_default()
}

#[async_trait]
impl ActionModel for GeminiActionModel {
    async fn generate(
        &self,
        prompt: &str,
        transcript: &[TranscriptEntry],
    ) -> Result<ModelAction, ProviderError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let mut body = json!({ "contents": Self::contents(prompt, transcript) });
        if !self.tools.is_empty() {
            body["tools"] = json!([{ "functionDeclarations": Self::declarations(&self.tools) }]);
        }

        debug!(model = %self.model, transcript = transcript.len(), "Requesting next action");
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;
        let response = check_status("gemini", response).await?;
        let body: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(format!("Failed to parse response: {e}")))?;

        Ok(Self::parse_action(&body))
    }
}

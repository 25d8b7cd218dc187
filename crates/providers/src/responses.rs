//! Responses API run client for hosted agent applications.
//!
//! The application owns the tool loop and reaches the toolset through the
//! payload's tool server endpoint; this client only submits the prompt and
//! reports the text it got back.

use async_trait::async_trait;
use serde_json::{Map, Value, json};
use studyguide_core::error::ProviderError;
use studyguide_core::provider::{DelegatePayload, DelegateResponse, RunClient};
use tracing::debug;

use crate::status::{build_client, check_status, transport_error};

pub struct ResponsesRunClient {
    base_url: String,
    api_key: String,
    model: String,
    api_version: Option<String>,
    client: reqwest::Client,
}

impl ResponsesRunClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        api_version: Option<String>,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            api_version,
            client: build_client(300)?,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// The aggregated `output_text`, falling back to joining every
    /// `output_text` content part of the `output` items.
    fn output_text(body: &Value) -> String {
        if let Some(text) = body.get("output_text").and_then(Value::as_str) {
            return text.to_string();
        }
        body.get("output")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|item| item.get("content").and_then(Value::as_array))
            .flatten()
            .filter(|part| part.get("type").and_then(Value::as_str) == Some("output_text"))
            .filter_map(|part| part.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("")
    }
}

#[async_trait]
impl RunClient for ResponsesRunClient {
    async fn run(&self, payload: DelegatePayload) -> Result<DelegateResponse, ProviderError> {
        let url = format!("{}/responses", self.base_url);
        let mut request = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&json!({
                "model": self.model,
                "input": payload.prompt,
            }));
        if let Some(version) = &self.api_version {
            request = request.query(&[("api-version", version.as_str())]);
        }

        debug!(model = %self.model, endpoint = ?payload.endpoint, "Submitting run");
        let response = request.send().await.map_err(transport_error)?;
        let response = check_status("responses", response).await?;
        let body: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(format!("Failed to parse response: {e}")))?;

        let raw_text = Self::output_text(&body);
        let mut metrics = Map::new();
        metrics.insert("model".into(), json!(self.model));
        metrics.insert("output_text_length".into(), json!(raw_text.chars().count()));

        Ok(DelegateResponse {
            course_results: Vec::new(),
            metrics,
            raw_text,
        })
    }
}

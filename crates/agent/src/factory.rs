//! Orchestrator selection by provider identifier.

use std::sync::Arc;

use studyguide_config::AppConfig;
use studyguide_core::{Error, Orchestrator, Result, ToolRegistry};
use studyguide_providers::{GeminiActionModel, OpenAiCompatProvider, ResponsesRunClient};
use tracing::info;

use crate::delegating::DelegatingOrchestrator;
use crate::tool_loop::ToolLoopOrchestrator;
use crate::transcript::TranscriptOrchestrator;

/// Build the orchestrator for `identifier` (trimmed, case-insensitive):
/// `azure_openai` / `openai`, `foundry` or `gemini`.
///
/// Missing credentials or endpoints fail here rather than on the first call.
pub fn create_orchestrator(
    identifier: &str,
    config: &AppConfig,
    tools: Arc<ToolRegistry>,
) -> Result<Arc<dyn Orchestrator>> {
    let normalized = identifier.trim().to_ascii_lowercase();
    info!(provider = %normalized, "Creating orchestrator");

    match normalized.as_str() {
        "azure_openai" | "openai" => {
            let section = &config.azure_openai;
            let endpoint = required(section.endpoint.as_deref(), "AZURE_OPENAI_ENDPOINT")?;
            let api_key = required(section.api_key.as_deref(), "AZURE_OPENAI_API_KEY")?;
            let model = required(Some(section.model.as_str()), "AZURE_OPENAI_MODEL")?;
            let provider = OpenAiCompatProvider::azure(endpoint, api_key)?;
            Ok(Arc::new(
                ToolLoopOrchestrator::new(Arc::new(provider), model, tools)
                    .with_max_steps(section.max_steps),
            ))
        }
        "foundry" => {
            let section = &config.foundry;
            let base_url = section.base_url().ok_or_else(|| {
                Error::config("Missing Foundry settings: FOUNDRY_ENDPOINT, FOUNDRY_PROJECT and FOUNDRY_APP are required")
            })?;
            let api_key = required(section.api_key.as_deref(), "FOUNDRY_API_KEY")?;
            let model = required(Some(section.model.as_str()), "FOUNDRY_MODEL")?;
            let client = ResponsesRunClient::new(
                base_url,
                api_key,
                model,
                Some(section.api_version.clone()),
            )?;
            Ok(Arc::new(DelegatingOrchestrator::new(
                Some(Arc::new(client)),
                section.mcp_server_url.clone(),
            )))
        }
        "gemini" => {
            let section = &config.gemini;
            let api_key = required(section.api_key.as_deref(), "GEMINI_API_KEY")?;
            let model = required(Some(section.model.as_str()), "GEMINI_MODEL")?;
            let action_model =
                GeminiActionModel::new(&section.base_url, api_key, model, tools.definitions())?;
            Ok(Arc::new(
                TranscriptOrchestrator::new(Arc::new(action_model), tools)
                    .with_max_steps(section.max_steps),
            ))
        }
        _ => Err(Error::config(format!("Unknown agent provider: {identifier}"))),
    }
}

fn required<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::config(format!("{name} is not set")))
}

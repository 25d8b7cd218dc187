//! Delegating adapter: the whole task goes to a hosted agent in one payload.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use studyguide_core::provider::{DelegatePayload, RunClient};
use studyguide_core::{
    CourseResult, OrchestrationError, Orchestrator, Result, RunConfig, RunOutcome,
};
use tracing::info;

pub struct DelegatingOrchestrator {
    client: Option<Arc<dyn RunClient>>,
    endpoint: Option<String>,
}

impl DelegatingOrchestrator {
    /// `endpoint` is the tool server the hosted agent should call back into.
    pub fn new(client: Option<Arc<dyn RunClient>>, endpoint: Option<String>) -> Self {
        Self { client, endpoint }
    }
}

#[async_trait]
impl Orchestrator for DelegatingOrchestrator {
    fn name(&self) -> &str {
        "delegating"
    }

    async fn invoke(&self, task_prompt: &str, config: &RunConfig) -> Result<RunOutcome> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| OrchestrationError::NotConfigured("Run client".into()))?;

        let payload = DelegatePayload {
            prompt: task_prompt.to_string(),
            task_prompt: config.task_prompt.clone(),
            endpoint: self.endpoint.clone(),
        };
        info!(endpoint = ?self.endpoint, "Delegating run");
        let response = client.run(payload).await?;

        let mut metrics = response.metrics;
        metrics.insert("provider".into(), json!(config.agent_provider));

        Ok(RunOutcome {
            success: true,
            course_results: response
                .course_results
                .iter()
                .map(CourseResult::from_value)
                .collect(),
            metrics,
        })
    }
}

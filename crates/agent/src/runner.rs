//! One end-to-end study guide run.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, json};
use studyguide_core::{ArtifactStore, Orchestrator, PromptMaterials, Result, RunConfig, RunOutcome};
use tracing::info;

const RUN_ID_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Base prompt, then `Template:` and `Guidelines:` sections when non-empty,
/// separated by blank lines.
pub fn compose_prompt(base_prompt: &str, materials: &PromptMaterials) -> String {
    let mut parts = vec![base_prompt.to_string()];
    if !materials.template.is_empty() {
        parts.push(format!("Template:\n{}", materials.template));
    }
    if !materials.guidelines.is_empty() {
        parts.push(format!("Guidelines:\n{}", materials.guidelines));
    }
    parts.join("\n\n")
}

pub struct StudyGuideRunner {
    orchestrator: Arc<dyn Orchestrator>,
    storage: Arc<dyn ArtifactStore>,
}

impl StudyGuideRunner {
    pub fn new(orchestrator: Arc<dyn Orchestrator>, storage: Arc<dyn ArtifactStore>) -> Self {
        Self {
            orchestrator,
            storage,
        }
    }

    /// Compose the prompt, invoke the orchestrator once and record a run
    /// summary. A fatal orchestrator error is returned before anything is
    /// recorded.
    pub async fn run(&self, config: &RunConfig) -> Result<RunOutcome> {
        let materials = self.storage.read_config().await?;
        let prompt = compose_prompt(&config.task_prompt, &materials);
        let effective = config.with_task_prompt(prompt.clone());

        info!(
            provider = %config.agent_provider,
            storage = self.storage.name(),
            orchestrator = self.orchestrator.name(),
            "Starting study guide run"
        );
        let outcome = self.orchestrator.invoke(&prompt, &effective).await?;

        let run_id = config
            .run_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Utc::now().format(RUN_ID_FORMAT).to_string());

        let mut summary = Map::new();
        summary.insert("success".into(), json!(outcome.success));
        summary.insert("course_count".into(), json!(outcome.course_results.len()));
        summary.insert("errors".into(), json!(outcome.error_count()));
        summary.insert("provider".into(), json!(config.agent_provider));
        let path = self.storage.write_run_record(&run_id, &summary).await?;

        info!(
            run_id = %run_id,
            success = outcome.success,
            courses = outcome.course_results.len(),
            errors = outcome.error_count(),
            path = %path,
            "Run recorded"
        );
        Ok(outcome)
    }
}

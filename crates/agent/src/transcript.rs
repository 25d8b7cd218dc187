//! Transcript loop: the model emits one action per call.
//!
//! A `function_call` action runs the named tool and appends the invocation
//! and its result to the transcript, which is passed back on every call. A
//! `final` action ends the run with the course results it carries. Anything
//! else, or running out of steps, is fatal.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, json};
use studyguide_core::provider::{ActionModel, ModelAction, TranscriptEntry};
use studyguide_core::{
    CourseResult, OrchestrationError, Orchestrator, Result, RunConfig, RunOutcome, ToolRegistry,
};
use tracing::{debug, info};

pub const DEFAULT_MAX_STEPS: u32 = 8;

pub struct TranscriptOrchestrator {
    model: Arc<dyn ActionModel>,
    tools: Arc<ToolRegistry>,
    max_steps: u32,
}

impl TranscriptOrchestrator {
    pub fn new(model: Arc<dyn ActionModel>, tools: Arc<ToolRegistry>) -> Self {
        Self {
            model,
            tools,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps;
        self
    }
}

#[async_trait]
impl Orchestrator for TranscriptOrchestrator {
    fn name(&self) -> &str {
        "transcript"
    }

    async fn invoke(&self, task_prompt: &str, config: &RunConfig) -> Result<RunOutcome> {
        let mut transcript: Vec<TranscriptEntry> = Vec::new();

        for step in 1..=self.max_steps {
            debug!(step, transcript = transcript.len(), "Requesting model action");

            match self.model.generate(task_prompt, &transcript).await? {
                ModelAction::FunctionCall { name, arguments } => {
                    let tool = self
                        .tools
                        .get(&name)
                        .ok_or_else(|| OrchestrationError::UnknownTool(name.clone()))?;
                    debug!(tool = %name, "Dispatching tool call");
                    let result = tool.execute(arguments.clone()).await?;
                    transcript.push(TranscriptEntry {
                        tool_name: name,
                        arguments,
                        result: result.into_value(),
                    });
                }
                ModelAction::Final { course_results } => {
                    info!(steps = step, courses = course_results.len(), "Model finished");
                    let mut metrics = Map::new();
                    metrics.insert("provider".into(), json!(config.agent_provider));
                    metrics.insert("steps".into(), json!(step));
                    return Ok(RunOutcome {
                        success: true,
                        course_results: course_results.iter().map(CourseResult::from_value).collect(),
                        metrics,
                    });
                }
                ModelAction::Unsupported { kind } => {
                    return Err(OrchestrationError::UnsupportedResponse(kind).into());
                }
            }
        }

        Err(OrchestrationError::StepBudgetExceeded {
            max_steps: self.max_steps,
        }
        .into())
    }
}

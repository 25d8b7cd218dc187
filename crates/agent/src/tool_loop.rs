//! Chat tool-calling loop.
//!
//! Each turn sends the full history to the provider. A turn without tool
//! calls ends the run with its text as the final output. Otherwise every
//! requested call is dispatched in emitted order and its result appended as
//! a tool message tagged with the call id, then the loop goes back to the
//! model. Running out of turns is fatal.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value, json};
use studyguide_core::message::{Conversation, Message, MessageToolCall};
use studyguide_core::provider::{Provider, ProviderRequest};
use studyguide_core::run::id_string;
use studyguide_core::{
    CourseResult, OrchestrationError, Orchestrator, Result, RunConfig, RunOutcome, ToolCall,
    ToolRegistry, ToolResult,
};
use tracing::{debug, info};

pub const DEFAULT_MAX_STEPS: u32 = 10;

const WRITE_TOOL: &str = "write_artifact";

pub struct ToolLoopOrchestrator {
    provider: Arc<dyn Provider>,
    model: String,
    tools: Arc<ToolRegistry>,
    max_steps: u32,
}

impl ToolLoopOrchestrator {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>, tools: Arc<ToolRegistry>) -> Self {
        Self {
            provider,
            model: model.into(),
            tools,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    /// Set the maximum number of model turns.
    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Decode the raw argument text of a call; empty text means `{}`.
    fn parse_arguments(call: &MessageToolCall) -> Result<Value> {
        if call.arguments.trim().is_empty() {
            return Ok(Value::Object(Map::new()));
        }
        serde_json::from_str(&call.arguments).map_err(|e| {
            OrchestrationError::MalformedArguments {
                tool: call.name.clone(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    async fn dispatch(&self, call: &MessageToolCall) -> Result<(Value, ToolResult)> {
        let arguments = Self::parse_arguments(call)?;
        if self.tools.get(&call.name).is_none() {
            return Err(OrchestrationError::UnknownTool(call.name.clone()).into());
        }
        debug!(tool = %call.name, call_id = %call.id, "Dispatching tool call");
        let result = self
            .tools
            .execute(&ToolCall {
                id: call.id.clone(),
                name: call.name.clone(),
                arguments: arguments.clone(),
            })
            .await?;
        Ok((arguments, result))
    }
}

/// The course a successful `write_artifact` call wrote, with its path.
fn written_guide(arguments: &Value, result: &ToolResult) -> Option<(String, Option<String>)> {
    let course_id = arguments.get("course_id").map(id_string).unwrap_or_default();
    if course_id.is_empty() {
        return None;
    }
    let path = match result {
        ToolResult::Json(value) => value.get("path").map(id_string),
        ToolResult::Text(text) => Some(text.clone()),
    }
    .filter(|p| !p.is_empty());
    Some((course_id, path))
}

#[async_trait]
impl Orchestrator for ToolLoopOrchestrator {
    fn name(&self) -> &str {
        self.provider.name()
    }

    async fn invoke(&self, task_prompt: &str, config: &RunConfig) -> Result<RunOutcome> {
        info!(
            provider = self.provider.name(),
            model = %self.model,
            max_steps = self.max_steps,
            "Starting tool-calling loop"
        );

        let mut conversation = Conversation::from_prompt(task_prompt);
        let definitions = self.tools.definitions();
        let mut guides: BTreeMap<String, Option<String>> = BTreeMap::new();
        let mut total_tokens: u64 = 0;

        for step in 1..=self.max_steps {
            debug!(step, messages = conversation.len(), "Model turn");

            let request = ProviderRequest {
                model: self.model.clone(),
                messages: conversation.messages.clone(),
                tools: definitions.clone(),
            };
            let response = self.provider.complete(request).await?;
            if let Some(usage) = &response.usage {
                total_tokens += u64::from(usage.total_tokens);
            }
            debug!(step, responded = %response.model, total_tokens, "Model responded");

            if response.message.tool_calls.is_empty() {
                let output_text_length = response.message.content.chars().count();
                conversation.push(response.message);

                let course_results: Vec<CourseResult> = guides
                    .into_iter()
                    .map(|(course_id, path)| CourseResult::updated(course_id, path))
                    .collect();
                info!(steps = step, courses = course_results.len(), "Tool-calling loop finished");

                let mut metrics = Map::new();
                metrics.insert("provider".into(), json!(config.agent_provider));
                metrics.insert("model".into(), json!(self.model));
                metrics.insert("steps".into(), json!(step));
                metrics.insert("output_text_length".into(), json!(output_text_length));
                metrics.insert("total_tokens".into(), json!(total_tokens));
                return Ok(RunOutcome {
                    success: true,
                    course_results,
                    metrics,
                });
            }

            let tool_calls = response.message.tool_calls.clone();
            conversation.push(response.message);

            for call in &tool_calls {
                let (arguments, result) = self.dispatch(call).await?;
                if call.name == WRITE_TOOL {
                    if let Some((course_id, path)) = written_guide(&arguments, &result) {
                        guides.insert(course_id, path);
                    }
                }
                conversation.push(Message::tool_result(&call.id, result.to_content()));
            }
        }

        Err(OrchestrationError::StepBudgetExceeded {
            max_steps: self.max_steps,
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use studyguide_core::message::Role;
    use studyguide_core::{CourseStatus, Error, ToolError};

    fn config() -> RunConfig {
        RunConfig::new("azure_openai", "local", "sync")
    }

    fn orchestrator(provider: Arc<SequentialMockProvider>) -> ToolLoopOrchestrator {
        let (tools, _) = stub_registry();
        ToolLoopOrchestrator::new(provider, "gpt-4.1", tools)
    }

    #[tokio::test]
    async fn lists_then_writes_then_finishes() {
        let provider = Arc::new(SequentialMockProvider::new(vec![
            make_tool_call_response(vec![call("c1", "list_my_courses", json!({}))]),
            make_tool_call_response(vec![call(
                "c2",
                "write_artifact",
                json!({"course_id": "1", "content": "# Guide"}),
            )]),
            make_text_response("Updated 1 course."),
        ]));
        let outcome = orchestrator(provider.clone())
            .invoke("sync", &config())
            .await
            .unwrap();

        assert!(outcome.success);
        assert_eq!(
            outcome.course_results,
            vec![CourseResult::updated("1", Some("guides/1/study-guide.md".into()))]
        );
        assert_eq!(outcome.course_results[0].status, CourseStatus::Updated);
        assert_eq!(outcome.metrics["provider"], "azure_openai");
        assert_eq!(outcome.metrics["model"], "gpt-4.1");
        assert_eq!(outcome.metrics["steps"], 3);
        assert_eq!(outcome.metrics["output_text_length"], 17);
        assert_eq!(outcome.metrics["total_tokens"], 15);
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn history_carries_tool_results_tagged_with_call_ids() {
        let provider = Arc::new(SequentialMockProvider::new(vec![
            make_tool_call_response(vec![call("c1", "list_my_courses", json!({}))]),
            make_text_response("done"),
        ]));
        orchestrator(provider.clone())
            .invoke("sync", &config())
            .await
            .unwrap();

        let requests = provider.requests();
        assert_eq!(requests[0].messages.len(), 1);
        assert_eq!(requests[0].messages[0].role, Role::User);
        assert_eq!(requests[0].messages[0].content, "sync");
        assert_eq!(requests[0].tools.len(), 4);

        let second = &requests[1].messages;
        assert_eq!(second.len(), 3);
        assert_eq!(second[1].tool_calls[0].id, "c1");
        assert_eq!(second[2].role, Role::Tool);
        assert_eq!(second[2].tool_call_id.as_deref(), Some("c1"));
        assert_eq!(second[2].content, r#"[{"id":"1","name":"Algorithms"}]"#);
    }

    #[tokio::test]
    async fn calls_within_a_turn_run_in_emitted_order() {
        let provider = Arc::new(SequentialMockProvider::new(vec![
            make_tool_call_response(vec![
                call("a", "list_modules", json!({"course_id": "1"})),
                call("b", "list_my_courses", json!({})),
                call("c", "list_modules", json!({"course_id": "2"})),
            ]),
            make_text_response("done"),
        ]));
        let (tools, log) = stub_registry();
        ToolLoopOrchestrator::new(provider.clone(), "m", tools)
            .invoke("sync", &config())
            .await
            .unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            ["list_modules", "list_my_courses", "list_modules"]
        );
        let ids: Vec<_> = provider.requests()[1]
            .messages
            .iter()
            .filter_map(|m| m.tool_call_id.clone())
            .collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn unknown_tool_is_fatal() {
        let provider = Arc::new(SequentialMockProvider::new(vec![make_tool_call_response(
            vec![call("c1", "delete_course", json!({}))],
        )]));
        let err = orchestrator(provider)
            .invoke("sync", &config())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Orchestration(OrchestrationError::UnknownTool(ref name)) if name == "delete_course"
        ));
    }

    #[tokio::test]
    async fn step_budget_is_fatal_after_max_turns() {
        let provider = Arc::new(SequentialMockProvider::always_calling(
            vec![call("c1", "list_my_courses", json!({}))],
            5,
        ));
        let err = orchestrator(provider.clone())
            .with_max_steps(2)
            .invoke("sync", &config())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Orchestration(OrchestrationError::StepBudgetExceeded { max_steps: 2 })
        ));
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn last_write_for_a_course_wins() {
        let provider = Arc::new(SequentialMockProvider::new(vec![
            make_tool_call_response(vec![
                call(
                    "a",
                    "write_artifact",
                    json!({"course_id": "2", "content": "v1", "slug": "v1"}),
                ),
                call("b", "write_artifact", json!({"course_id": 1, "content": "x"})),
            ]),
            make_tool_call_response(vec![call(
                "c",
                "write_artifact",
                json!({"course_id": "2", "content": "v2", "slug": "v2"}),
            )]),
            make_text_response("done"),
        ]));
        let outcome = orchestrator(provider)
            .invoke("sync", &config())
            .await
            .unwrap();

        let ids: Vec<_> = outcome
            .course_results
            .iter()
            .map(|r| r.course_id.as_str())
            .collect();
        assert_eq!(ids, ["1", "2"]);
        assert_eq!(
            outcome.course_results[1].guide_path.as_deref(),
            Some("guides/2/v2.md")
        );
    }

    #[tokio::test]
    async fn malformed_arguments_are_fatal() {
        let provider = Arc::new(SequentialMockProvider::new(vec![make_tool_call_response(
            vec![MessageToolCall {
                id: "c1".into(),
                name: "list_modules".into(),
                arguments: "{course_id:".into(),
            }],
        )]));
        let err = orchestrator(provider)
            .invoke("sync", &config())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Orchestration(OrchestrationError::MalformedArguments { .. })
        ));
    }

    #[tokio::test]
    async fn empty_arguments_mean_no_arguments() {
        let provider = Arc::new(SequentialMockProvider::new(vec![
            make_tool_call_response(vec![MessageToolCall {
                id: "c1".into(),
                name: "list_my_courses".into(),
                arguments: String::new(),
            }]),
            make_text_response("done"),
        ]));
        let outcome = orchestrator(provider).invoke("sync", &config()).await.unwrap();
        assert!(outcome.course_results.is_empty());
    }

    #[tokio::test]
    async fn tool_failure_aborts_the_run() {
        let provider = Arc::new(SequentialMockProvider::new(vec![make_tool_call_response(
            vec![
                call("a", "write_artifact", json!({"course_id": "1", "content": "x"})),
                call("b", "get_page_content", json!({})),
            ],
        )]));
        let err = orchestrator(provider)
            .invoke("sync", &config())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Tool(ToolError::ExecutionFailed { .. })));
    }
}

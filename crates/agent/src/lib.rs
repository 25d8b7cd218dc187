//! Orchestration for a study guide run.
//!
//! A run composes one prompt from the task and the stored template and
//! guidelines, hands it to an [`Orchestrator`](studyguide_core::Orchestrator)
//! and records a summary. Three orchestration strategies share that
//! contract:
//!
//! - [`ToolLoopOrchestrator`]: chat turns carrying batches of tool calls
//! - [`DelegatingOrchestrator`]: hands the whole task to a hosted agent
//! - [`TranscriptOrchestrator`]: one action per model call, replaying a transcript
//!
//! Every strategy runs one model turn at a time and dispatches tool calls
//! sequentially in the order the model emitted them. Any fatal error aborts
//! the run; partial results are never returned.

pub mod delegating;
pub mod factory;
pub mod runner;
pub mod tool_loop;
pub mod transcript;

#[cfg(test)]
mod test_helpers;

pub use delegating::DelegatingOrchestrator;
pub use factory::create_orchestrator;
pub use runner::{StudyGuideRunner, compose_prompt};
pub use tool_loop::ToolLoopOrchestrator;
pub use transcript::TranscriptOrchestrator;

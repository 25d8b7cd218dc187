//! Model vendor adapters for the study guide agent.
//!
//! Each adapter implements one of the core model capabilities:
//! - [`OpenAiCompatProvider`]: `Provider` (chat turns with batched tool calls)
//! - [`ResponsesRunClient`]: `RunClient` (whole-task hand-off)
//! - [`GeminiActionModel`]: `ActionModel` (one action per call)

pub mod gemini;
pub mod openai_compat;
pub mod responses;
mod status;

pub use gemini::GeminiActionModel;
pub use openai_compat::OpenAiCompatProvider;
pub use responses::ResponsesRunClient;

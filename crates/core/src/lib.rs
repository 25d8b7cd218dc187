//! # Study Guide Core
//!
//! Domain types, traits, and error definitions for the study guide agent.
//! This crate has **no framework dependencies**: it defines the domain
//! model that the HTTP client, toolset, storage backends, model adapters
//! and orchestrators implement against.
//!
//! Every collaborator is a trait here so that it can be swapped by
//! configuration and replaced by scripted implementations in tests.

pub mod error;
pub mod message;
pub mod orchestrator;
pub mod provider;
pub mod resource;
pub mod run;
pub mod storage;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{
    Error, HttpError, OrchestrationError, ProviderError, Result, StorageError, ToolError,
};
pub use message::{Conversation, Message, MessageToolCall, Role};
pub use orchestrator::Orchestrator;
pub use provider::{
    ActionModel, DelegatePayload, DelegateResponse, ModelAction, Provider, ProviderRequest,
    ProviderResponse, RunClient, ToolDefinition, TranscriptEntry, Usage,
};
pub use resource::{FileContent, FileEncoding, ResourceItem};
pub use run::{CourseResult, CourseStatus, RunConfig, RunOutcome};
pub use storage::{ArtifactStore, PromptMaterials};
pub use tool::{Tool, ToolCall, ToolRegistry, ToolResult};

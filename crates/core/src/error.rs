//! Error types for the study guide domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant; every one of them is
//! fatal to a run once it reaches the orchestrator.

use thiserror::Error;

/// The top-level error type for all study guide operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Canvas HTTP errors ---
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    // --- Model provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Storage errors ---
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    // --- Orchestration errors ---
    #[error("Orchestration error: {0}")]
    Orchestration(#[from] OrchestrationError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Errors raised by the paginated Canvas HTTP client.
#[derive(Debug, Clone, Error)]
pub enum HttpError {
    #[error("Rate limited on {url} after {attempts} attempts")]
    RateLimited { url: String, attempts: u32 },

    #[error("Request to {url} failed with status {status}: {body}")]
    Status { status: u16, url: String, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Failed to decode response from {url}: {reason}")]
    Decode { url: String, reason: String },

    #[error("Expected JSON {expected} from {url}")]
    UnexpectedShape { expected: &'static str, url: String },

    #[error("File {file_id} metadata missing download url")]
    MissingDownloadUrl { file_id: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP client not configured: {0}")]
    Config(String),
}

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("Tool execution failed: {tool_name}: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Tool result could not be serialized: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Http(#[from] HttpError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Unknown storage provider: {0}")]
    UnknownProvider(String),

    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    #[error("I/O error on {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("Blob request for {blob} failed: {reason}")]
    Blob { blob: String, reason: String },

    #[error("Storage not configured: {0}")]
    NotConfigured(String),
}

/// Protocol and budget failures of the tool-calling loop.
#[derive(Debug, Error)]
pub enum OrchestrationError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Max orchestration steps exceeded ({max_steps})")]
    StepBudgetExceeded { max_steps: u32 },

    #[error("Unsupported model response type: {0}")]
    UnsupportedResponse(String),

    #[error("Malformed arguments for tool {tool}: {reason}")]
    MalformedArguments { tool: String, reason: String },

    #[error("{0} is not configured")]
    NotConfigured(String),
}

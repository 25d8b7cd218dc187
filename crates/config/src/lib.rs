//! Configuration loading, validation, and management for the study guide agent.
//!
//! Configuration is assembled once at process start: an optional TOML file
//! (`$STUDYGUIDE_CONFIG`, else `./studyguide.toml`), then environment
//! variable overrides, then validation. Every component receives the
//! resulting value; nothing downstream reads the environment again.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use studyguide_core::RunConfig;

/// The root configuration structure.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Orchestrator identifier: "azure_openai", "foundry" or "gemini"
    #[serde(default = "default_agent_provider")]
    pub agent_provider: String,

    /// Storage identifier: "local", "gcs" or "azure"
    #[serde(default = "default_storage_provider")]
    pub storage_provider: String,

    /// Base task prompt, before template and guidelines are appended
    #[serde(default = "default_task_prompt")]
    pub task_prompt: String,

    /// Restrict the run to one course (id, name or course code)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_filter: Option<String>,

    /// Caller-supplied run id; a timestamp id is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,

    /// Canvas LMS API settings
    #[serde(default)]
    pub canvas: CanvasConfig,

    /// Azure OpenAI (chat completions) settings
    #[serde(default)]
    pub azure_openai: AzureOpenAiConfig,

    /// Foundry application (delegating run) settings
    #[serde(default)]
    pub foundry: FoundryConfig,

    /// Gemini (single-action) settings
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Storage backend settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Tool dispatch gateway settings
    #[serde(default)]
    pub gateway: GatewayConfig,
}

fn default_agent_provider() -> String {
    "gemini".into()
}
fn default_storage_provider() -> String {
    "gcs".into()
}
fn default_task_prompt() -> String {
    "Sync all courses and update study guides.".into()
}

fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("agent_provider", &self.agent_provider)
            .field("storage_provider", &self.storage_provider)
            .field("task_prompt", &self.task_prompt)
            .field("course_filter", &self.course_filter)
            .field("run_id", &self.run_id)
            .field("canvas", &self.canvas)
            .field("azure_openai", &self.azure_openai)
            .field("foundry", &self.foundry)
            .field("gemini", &self.gemini)
            .field("storage", &self.storage)
            .field("gateway", &self.gateway)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct CanvasConfig {
    #[serde(default = "default_canvas_base_url")]
    pub base_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Extra attempts after a 429 response
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay for exponential backoff, in milliseconds
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_canvas_base_url() -> String {
    "https://q.utoronto.ca".into()
}
fn default_max_retries() -> u32 {
    3
}
fn default_backoff_ms() -> u64 {
    200
}
fn default_timeout_secs() -> u64 {
    30
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            base_url: default_canvas_base_url(),
            token: None,
            max_retries: default_max_retries(),
            backoff_ms: default_backoff_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl std::fmt::Debug for CanvasConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanvasConfig")
            .field("base_url", &self.base_url)
            .field("token", &redact(&self.token))
            .field("max_retries", &self.max_retries)
            .field("backoff_ms", &self.backoff_ms)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct AzureOpenAiConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Deployment name sent as `model`
    #[serde(default = "default_azure_model")]
    pub model: String,

    #[serde(default = "default_tool_loop_steps")]
    pub max_steps: u32,
}

fn default_azure_model() -> String {
    "gpt-4.1".into()
}
fn default_tool_loop_steps() -> u32 {
    10
}

impl Default for AzureOpenAiConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            model: default_azure_model(),
            max_steps: default_tool_loop_steps(),
        }
    }
}

impl AzureOpenAiConfig {
    /// The OpenAI-compatible base URL: the endpoint with `/openai/v1` appended
    /// unless it is already there.
    pub fn base_url(&self) -> Option<String> {
        let endpoint = self.endpoint.as_deref()?.trim_end_matches('/');
        if endpoint.is_empty() {
            return None;
        }
        if endpoint.contains("/openai/v1") {
            Some(endpoint.to_string())
        } else {
            Some(format!("{endpoint}/openai/v1"))
        }
    }
}

impl std::fmt::Debug for AzureOpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureOpenAiConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("max_steps", &self.max_steps)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct FoundryConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app: Option<String>,

    #[serde(default = "default_foundry_api_version")]
    pub api_version: String,

    #[serde(default = "default_foundry_model")]
    pub model: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Tool server URL handed to the application as the payload endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mcp_server_url: Option<String>,
}

fn default_foundry_api_version() -> String {
    "2025-11-15-preview".into()
}
fn default_foundry_model() -> String {
    "gpt-4.1".into()
}

impl Default for FoundryConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            project: None,
            app: None,
            api_version: default_foundry_api_version(),
            model: default_foundry_model(),
            api_key: None,
            mcp_server_url: None,
        }
    }
}

impl FoundryConfig {
    /// The application's OpenAI protocol base URL, when endpoint, project
    /// and app are all set.
    pub fn base_url(&self) -> Option<String> {
        let endpoint = self.endpoint.as_deref()?.trim_end_matches('/');
        let project = self.project.as_deref()?;
        let app = self.app.as_deref()?;
        if endpoint.is_empty() || project.is_empty() || app.is_empty() {
            return None;
        }
        Some(format!(
            "{endpoint}/api/projects/{project}/applications/{app}/protocols/openai"
        ))
    }
}

impl std::fmt::Debug for FoundryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FoundryConfig")
            .field("endpoint", &self.endpoint)
            .field("project", &self.project)
            .field("app", &self.app)
            .field("api_version", &self.api_version)
            .field("model", &self.model)
            .field("api_key", &redact(&self.api_key))
            .field("mcp_server_url", &self.mcp_server_url)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_gemini_model")]
    pub model: String,

    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,

    #[serde(default = "default_action_loop_steps")]
    pub max_steps: u32,
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash".into()
}
fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".into()
}
fn default_action_loop_steps() -> u32 {
    8
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_gemini_model(),
            base_url: default_gemini_base_url(),
            max_steps: default_action_loop_steps(),
        }
    }
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("max_steps", &self.max_steps)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory for filesystem-backed storage
    #[serde(default = "default_storage_dir")]
    pub dir: PathBuf,

    /// Azure Blob account URL, or a bare account name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sas_token: Option<String>,
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from("runtime_storage")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
            account_url: None,
            sas_token: None,
        }
    }
}

impl StorageConfig {
    /// The blob service URL; a bare account name expands to the public endpoint.
    pub fn blob_service_url(&self) -> Option<String> {
        let raw = self.account_url.as_deref()?.trim().trim_end_matches('/');
        if raw.is_empty() {
            return None;
        }
        if raw.starts_with("http") {
            Some(raw.to_string())
        } else {
            Some(format!("https://{raw}.blob.core.windows.net"))
        }
    }
}

impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("dir", &self.dir)
            .field("account_url", &self.account_url)
            .field("sas_token", &redact(&self.sas_token))
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 {
    8787
}
fn default_host() -> String {
    "127.0.0.1".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `$STUDYGUIDE_CONFIG` (or `./studyguide.toml`)
    /// and apply environment overrides from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("STUDYGUIDE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("studyguide.toml"));
        Self::load_with(&path, |key| std::env::var(key).ok())
    }

    /// Load from a file path, then apply overrides from `lookup`, then validate.
    pub fn load_with<F>(path: &Path, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::load_from(path)?;
        config.apply_env_overrides(lookup);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    ///
    /// A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Apply environment overrides. Empty values count as unset.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("AGENT_PROVIDER") {
            self.agent_provider = v;
        }
        if let Some(v) = get("STORAGE_PROVIDER") {
            self.storage_provider = v;
        }
        if let Some(v) = get("TASK_PROMPT") {
            self.task_prompt = v;
        }
        if let Some(v) = get("COURSE_FILTER") {
            self.course_filter = Some(v);
        }
        if let Some(v) = get("RUN_ID") {
            self.run_id = Some(v);
        }

        if let Some(v) = get("CANVAS_TOKEN") {
            self.canvas.token = Some(v);
        }
        if let Some(v) = get("CANVAS_BASE_URL") {
            self.canvas.base_url = v;
        }

        if let Some(v) = get("AZURE_OPENAI_ENDPOINT") {
            self.azure_openai.endpoint = Some(v);
        }
        if let Some(v) = get("AZURE_OPENAI_API_KEY") {
            self.azure_openai.api_key = Some(v);
        }
        if let Some(v) = get("AZURE_OPENAI_MODEL") {
            self.azure_openai.model = v;
        }

        if let Some(v) = get("FOUNDRY_ENDPOINT") {
            self.foundry.endpoint = Some(v);
        }
        if let Some(v) = get("FOUNDRY_PROJECT") {
            self.foundry.project = Some(v);
        }
        if let Some(v) = get("FOUNDRY_APP") {
            self.foundry.app = Some(v);
        }
        if let Some(v) = get("FOUNDRY_API_VERSION") {
            self.foundry.api_version = v;
        }
        if let Some(v) = get("FOUNDRY_MODEL") {
            self.foundry.model = v;
        }
        if let Some(v) = get("FOUNDRY_API_KEY") {
            self.foundry.api_key = Some(v);
        }
        if let Some(v) = get("MCP_SERVER_URL") {
            self.foundry.mcp_server_url = Some(v);
        }

        if let Some(v) = get("GEMINI_API_KEY") {
            self.gemini.api_key = Some(v);
        }
        if let Some(v) = get("GEMINI_MODEL") {
            self.gemini.model = v;
        }

        if let Some(v) = get("STORAGE_DIR") {
            self.storage.dir = PathBuf::from(v);
        }
        if let Some(v) = get("AZURE_STORAGE_ACCOUNT_URL") {
            self.storage.account_url = Some(v);
        }
        if let Some(v) = get("AZURE_STORAGE_SAS_TOKEN") {
            self.storage.sas_token = Some(v);
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.agent_provider.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "agent_provider must not be empty".into(),
            ));
        }
        if self.storage_provider.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "storage_provider must not be empty".into(),
            ));
        }
        if self.azure_openai.max_steps == 0 || self.gemini.max_steps == 0 {
            return Err(ConfigError::ValidationError(
                "max_steps must be at least 1".into(),
            ));
        }
        match url::Url::parse(&self.canvas.base_url) {
            Ok(parsed) if !parsed.cannot_be_a_base() => {}
            _ => {
                return Err(ConfigError::ValidationError(format!(
                    "canvas.base_url is not an absolute URL: {}",
                    self.canvas.base_url
                )));
            }
        }
        Ok(())
    }

    /// The immutable per-run configuration.
    pub fn run_config(&self) -> RunConfig {
        RunConfig {
            agent_provider: self.agent_provider.clone(),
            storage_provider: self.storage_provider.clone(),
            task_prompt: self.task_prompt.clone(),
            course_filter: self.course_filter.clone(),
            run_id: self.run_id.clone(),
        }
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            agent_provider: default_agent_provider(),
            storage_provider: default_storage_provider(),
            task_prompt: default_task_prompt(),
            course_filter: None,
            run_id: None,
            canvas: CanvasConfig::default(),
            azure_openai: AzureOpenAiConfig::default(),
            foundry: FoundryConfig::default(),
            gemini: GeminiConfig::default(),
            storage: StorageConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

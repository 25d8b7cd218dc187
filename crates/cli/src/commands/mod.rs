pub mod run;
pub mod serve;
pub mod tools;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use studyguide_canvas::{CanvasApi, CanvasClient};
use studyguide_config::AppConfig;
use studyguide_core::{ArtifactStore, ToolRegistry};
use studyguide_storage::create_storage;
use studyguide_tools::canvas_registry;

pub type CommandResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Load the config file (default `./studyguide.toml`) with process
/// environment overrides.
pub fn load_config(path: Option<&Path>) -> CommandResult<AppConfig> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("studyguide.toml"));
    AppConfig::load_with(&path, |key| std::env::var(key).ok())
        .map_err(|e| format!("Failed to load config: {e}").into())
}

/// Storage backend plus the Canvas tool registry writing into it.
pub fn build_toolset(config: &AppConfig) -> CommandResult<(Arc<dyn ArtifactStore>, Arc<ToolRegistry>)> {
    let storage = create_storage(&config.storage_provider, &config.storage)?;
    let api = Arc::new(CanvasApi::new(CanvasClient::new(&config.canvas)?));
    let registry = canvas_registry(api, storage.clone(), config.course_filter.clone());
    Ok((storage, Arc::new(registry)))
}

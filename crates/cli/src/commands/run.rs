//! `studyguide run`: one sync run.

use std::path::Path;
use std::process::ExitCode;

use clap::Args;
use studyguide_agent::{StudyGuideRunner, create_orchestrator};
use studyguide_config::AppConfig;
use tracing::info;

use super::{CommandResult, build_toolset, load_config};

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Agent provider: azure_openai, openai, foundry or gemini
    #[arg(long)]
    pub provider: Option<String>,

    /// Storage provider: local, gcs or azure
    #[arg(long)]
    pub storage: Option<String>,

    /// Base task prompt
    #[arg(long)]
    pub prompt: Option<String>,

    /// Only sync courses matching this id, name or course code
    #[arg(long)]
    pub course: Option<String>,

    /// Run id for the run record (default: UTC timestamp)
    #[arg(long)]
    pub run_id: Option<String>,
}

impl RunArgs {
    fn apply(self, config: &mut AppConfig) {
        if let Some(provider) = self.provider {
            config.agent_provider = provider;
        }
        if let Some(storage) = self.storage {
            config.storage_provider = storage;
        }
        if let Some(prompt) = self.prompt {
            config.task_prompt = prompt;
        }
        if let Some(course) = self.course {
            config.course_filter = Some(course);
        }
        if let Some(run_id) = self.run_id {
            config.run_id = Some(run_id);
        }
    }
}

pub async fn run(config_path: Option<&Path>, args: RunArgs) -> CommandResult<ExitCode> {
    let mut config = load_config(config_path)?;
    args.apply(&mut config);
    config.validate()?;

    let (storage, tools) = build_toolset(&config)?;
    let orchestrator = create_orchestrator(&config.agent_provider, &config, tools)?;
    let runner = StudyGuideRunner::new(orchestrator, storage);

    let outcome = runner.run(&config.run_config()).await?;
    info!(
        success = outcome.success,
        courses = outcome.course_results.len(),
        errors = outcome.error_count(),
        "Study guide run completed"
    );

    Ok(if outcome.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

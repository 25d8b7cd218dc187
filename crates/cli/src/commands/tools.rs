//! `studyguide tools`: print the tool definitions advertised to the model.

use std::path::Path;
use std::process::ExitCode;

use super::{CommandResult, build_toolset, load_config};

pub async fn run(config_path: Option<&Path>) -> CommandResult<ExitCode> {
    let config = load_config(config_path)?;
    let (_, tools) = build_toolset(&config)?;
    println!("{}", serde_json::to_string_pretty(&tools.definitions())?);
    Ok(ExitCode::SUCCESS)
}

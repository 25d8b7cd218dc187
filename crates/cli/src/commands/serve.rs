//! `studyguide serve`: start the HTTP tool-dispatch gateway.

use std::path::Path;
use std::process::ExitCode;

use super::{CommandResult, load_config};

pub async fn run(config_path: Option<&Path>, port_override: Option<u16>) -> CommandResult<ExitCode> {
    let mut config = load_config(config_path)?;
    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("Study guide tool gateway");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("   Storage:   {}", config.storage_provider);

    studyguide_gateway::start(config).await?;
    Ok(ExitCode::SUCCESS)
}

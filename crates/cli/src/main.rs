//! Study guide agent CLI.
//!
//! Commands:
//! - `run`: one study guide sync run (exit 0 on success, 1 otherwise)
//! - `serve`: HTTP tool-dispatch gateway
//! - `tools`: print the tool definitions advertised to the model

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "studyguide",
    about = "Sync Canvas courses into generated study guides",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the TOML config file
    #[arg(short, long, global = true, env = "STUDYGUIDE_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one study guide sync
    Run(commands::run::RunArgs),

    /// Start the HTTP tool-dispatch gateway
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print the advertised tool definitions as JSON
    Tools,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let config_path = cli.config.as_deref();
    let result = match cli.command {
        Commands::Run(args) => commands::run::run(config_path, args).await,
        Commands::Serve { port } => commands::serve::run(config_path, port).await,
        Commands::Tools => commands::tools::run(config_path).await,
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

//! simbin CLI
//!
//! Command-line interface for running and inspecting simulations.

#![allow(clippy::print_stdout)]

use clap::Parser;
use infrastructure::{LogFormat, LoggingConfig, init_logging};
use presentation_cli::{
    Cli, Commands,
    cli::log_filter_from_verbosity,
    commands::{run_local, run_remote, status},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    init_logging(&LoggingConfig {
        format: LogFormat::Text,
        filter: log_filter_from_verbosity(cli.verbose).to_string(),
    })?;

    match cli.command {
        Commands::Run {
            scenario,
            key,
            seed,
        } => {
            for outcome in run_local(&scenario, &key, seed).await? {
                println!("{}", serde_json::to_string(&outcome)?);
            }
        },

        Commands::Remote { scenario, key, url } => {
            let client = reqwest::Client::new();
            for (code, body) in run_remote(&client, &url, &scenario, key.as_deref()).await? {
                println!("{code} {}", serde_json::to_string(&body)?);
            }
        },

        Commands::Status { url } => {
            let client = reqwest::Client::new();
            let resp = status(&client, &url).await?;
            println!("{}", serde_json::to_string_pretty(&resp)?);
        },
    }

    Ok(())
}

//! Herald CLI binary.
//!
//! - Replay recorded gateway events through the entity cache
//! - Check the runtime configuration

use clap::Parser;
use herald::observability::{ObservabilityConfig, init_observability_with_config};

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, check_config, replay};

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    init_observability_with_config(
        ObservabilityConfig::default()
            .with_log_level(log_level)
            .with_json_logs(cli.json_logs),
    )?;

    match cli.command {
        Commands::Replay { file, no_fetch } => {
            replay(&file, !no_fetch).await?;
        }

        Commands::CheckConfig => {
            check_config()?;
        }
    }

    Ok(())
}

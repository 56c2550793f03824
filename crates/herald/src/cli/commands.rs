//! CLI command definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Herald - live Discord entity cache with per-guild services
#[derive(Parser, Debug)]
#[command(name = "herald")]
#[command(about = "Live Discord entity cache with per-guild service orchestration", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Feed recorded gateway events through the cache and print its statistics
    Replay {
        /// File of newline-delimited JSON gateway events
        file: PathBuf,

        /// Store attachments without downloading their content
        #[arg(long)]
        no_fetch: bool,
    },

    /// Load the configuration and print it with the Discord token masked
    CheckConfig,
}

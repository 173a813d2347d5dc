//! shardjobd - the shardjob daemon.
//!
//! Single binary that assembles the job lifecycle stack:
//! - Record store (redb)
//! - In-process coordinator
//! - One lifecycle handler per job family
//! - REST API
//!
//! # Usage
//!
//! ```text
//! shardjobd standalone --port 8480 --data-dir /var/lib/shardjob
//! shardjobd check-config --config shardjob.toml
//! ```

mod standalone;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use shardjob_core::ShardjobConfig;

#[derive(Parser)]
#[command(name = "shardjobd", about = "shardjob lifecycle daemon")]
struct Cli {
    /// Path to shardjob.toml. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run in standalone mode (record store, coordinator and API in one process).
    Standalone {
        /// Port to listen on (overrides the config file).
        #[arg(long)]
        port: Option<u16>,

        /// Data directory for the record store (overrides the config file).
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Do not re-register READY records on startup.
        #[arg(long)]
        skip_restore: bool,
    },

    /// Parse and validate the configuration, then print it.
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ShardjobConfig::from_file(path)?,
        None => ShardjobConfig::default(),
    };

    // Initialize tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.log_filter())),
        )
        .init();

    match cli.command {
        Command::Standalone {
            port,
            data_dir,
            skip_restore,
        } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(data_dir) = data_dir {
                config.server.data_dir = data_dir;
            }
            standalone::run(config, !skip_restore).await
        }
        Command::CheckConfig => {
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}

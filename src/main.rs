//! SecondBrain - terminal client for the SecondBrain knowledge store
//!
//! Without a subcommand this opens the interactive dashboard; subcommands
//! run once and print plain text.

use clap::Parser;
use secondbrain::cli::{cli_to_config, Cli};
use secondbrain::commands::{self, Services};
use secondbrain::logging::{self, LogTarget};
use secondbrain::tui::TuiInterface;

/// Main entry point for the application
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = cli_to_config(&cli);

    match cli.command {
        Some(command) => {
            logging::init(LogTarget::Stderr)?;
            let services = Services::from_config(config, false)?;
            commands::run(command, &services).await
        }
        None => run_interactive_mode(config).await,
    }
}

/// Run the dashboard in the terminal
async fn run_interactive_mode(config: secondbrain::config::Config) -> anyhow::Result<()> {
    // The TUI needs an interactive terminal
    if !atty::is(atty::Stream::Stdin) || !atty::is(atty::Stream::Stdout) {
        eprintln!("The dashboard requires an interactive terminal. Try `secondbrain --help`.");
        return Ok(());
    }

    logging::init(LogTarget::file_in(&config.storage_dir))?;
    tracing::info!("Starting dashboard against {}", config.api_url);

    let services = Services::from_config(config, true)?;
    let mut tui = TuiInterface::new(&services)?;
    tui.run().await
}

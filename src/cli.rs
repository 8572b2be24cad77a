//! Command-line interface definition and argument parsing
//!
//! This module uses clap to define and parse command-line arguments.

use crate::config::Config;
use crate::constants::{DEFAULT_API_URL, DEFAULT_CALLBACK_PORT, DEFAULT_TIMEOUT_SECS};
use crate::views::SearchMode;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for SecondBrain
#[derive(Parser, Debug)]
#[command(
    name = "secondbrain",
    about = "SecondBrain - your knowledge store in the terminal",
    version,
    long_about = "SecondBrain signs you in with Google and lets you search and curate the nodes of your knowledge store. Without a subcommand it opens the interactive dashboard."
)]
pub struct Cli {
    /// Base URL of the knowledge-store backend
    #[arg(long, env = "SECONDBRAIN_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Google OAuth client id
    #[arg(long, env = "GOOGLE_CLIENT_ID", hide_env_values = true)]
    pub google_client_id: Option<String>,

    /// Google OAuth client secret
    #[arg(long, env = "GOOGLE_CLIENT_SECRET", hide_env_values = true)]
    pub google_client_secret: Option<String>,

    /// Firebase web API key
    #[arg(long, env = "FIREBASE_API_KEY", hide_env_values = true)]
    pub firebase_api_key: Option<String>,

    /// Loopback port for the sign-in redirect
    #[arg(long, env = "SECONDBRAIN_CALLBACK_PORT", default_value_t = DEFAULT_CALLBACK_PORT)]
    pub callback_port: u16,

    /// Directory holding the stored session and logs
    #[arg(long, env = "SECONDBRAIN_HOME")]
    pub home: Option<PathBuf>,

    /// HTTP request timeout in seconds
    #[arg(long, env = "SECONDBRAIN_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Keep the session in memory only
    #[arg(long)]
    pub ephemeral: bool,

    /// Skip authentication (for development)
    #[arg(long, hide = true)]
    pub skip_auth: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands for SecondBrain
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Sign in with Google
    Login,

    /// Sign out and forget the stored session
    Logout,

    /// Show who is signed in
    Whoami,

    /// List all nodes
    Nodes,

    /// Delete a node by id
    Delete {
        /// Id of the node to delete
        id: String,

        /// Don't ask for confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Search nodes
    Search {
        /// Search query
        #[arg(trailing_var_arg = true, required = true)]
        query: Vec<String>,

        /// Search mode (semantic, keyword)
        #[arg(long, short = 'm', default_value = "keyword", value_parser = parse_search_mode)]
        mode: SearchMode,
    },
}

fn parse_search_mode(arg: &str) -> Result<SearchMode, String> {
    arg.parse()
}

/// Convert the Cli struct to the application's Config
pub fn cli_to_config(cli: &Cli) -> Config {
    let mut config = Config::new();

    config.api_url = cli.api_url.clone();
    config.google_client_id = non_empty(&cli.google_client_id);
    config.google_client_secret = non_empty(&cli.google_client_secret);
    config.firebase_api_key = non_empty(&cli.firebase_api_key);
    config.callback_port = cli.callback_port;
    config.request_timeout_secs = cli.timeout;
    config.skip_auth = cli.skip_auth;
    config.ephemeral = cli.ephemeral;

    if let Some(home) = &cli.home {
        config.storage_dir = home.clone();
    }

    config
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.trim().is_empty()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_subcommand() {
        let cli = Cli::try_parse_from(["secondbrain", "search", "rust", "notes"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Search {
                query: vec!["rust".to_string(), "notes".to_string()],
                mode: SearchMode::Keyword,
            })
        );

        let cli =
            Cli::try_parse_from(["secondbrain", "search", "--mode", "neural", "rust"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Search { mode: SearchMode::Semantic, .. })
        ));

        assert!(Cli::try_parse_from(["secondbrain", "search", "--mode", "fuzzy", "x"]).is_err());
    }

    #[test]
    fn test_delete_subcommand() {
        let cli = Cli::try_parse_from(["secondbrain", "delete", "abc", "-y"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Delete {
                id: "abc".to_string(),
                yes: true
            })
        );
    }

    #[test]
    fn test_cli_to_config() {
        let cli = Cli::try_parse_from([
            "secondbrain",
            "--api-url",
            "http://localhost:9000",
            "--home",
            "/tmp/sb",
            "--timeout",
            "5",
            "--google-client-id",
            "  ",
            "--skip-auth",
        ])
        .unwrap();
        let config = cli_to_config(&cli);

        assert_eq!(config.api_url, "http://localhost:9000");
        assert_eq!(config.storage_dir, PathBuf::from("/tmp/sb"));
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.google_client_id, None);
        assert!(config.skip_auth);
        assert!(cli.command.is_none());
    }
}

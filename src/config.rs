//! Configuration for the SecondBrain client
//!
//! Values come from command-line flags, which clap backs with environment
//! variables (and `.env` through dotenvy). See `cli::cli_to_config`.

use crate::auth::store::default_storage_dir;
use crate::constants::{DEFAULT_API_URL, DEFAULT_CALLBACK_PORT, DEFAULT_TIMEOUT_SECS};
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration structure
#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL of the knowledge-store backend
    pub api_url: String,

    /// OAuth client registered with Google
    pub google_client_id: Option<String>,

    /// Only needed for client types Google issues a secret to
    pub google_client_secret: Option<String>,

    /// Web API key of the Firebase project issuing bearer tokens
    pub firebase_api_key: Option<String>,

    /// Loopback port the sign-in redirect lands on
    pub callback_port: u16,

    /// Timeout for every outgoing HTTP request
    pub request_timeout_secs: u64,

    /// Where the session and the TUI log file live
    pub storage_dir: PathBuf,

    /// Use the mock identity provider (for development)
    pub skip_auth: bool,

    /// Keep the session in memory only
    pub ephemeral: bool,
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            google_client_id: None,
            google_client_secret: None,
            firebase_api_key: None,
            callback_port: DEFAULT_CALLBACK_PORT,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            storage_dir: default_storage_dir(),
            skip_auth: false,
            ephemeral: false,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The first setting Google sign-in still needs, if any
    pub fn missing_google_setting(&self) -> Option<&'static str> {
        if self.google_client_id.is_none() {
            Some("GOOGLE_CLIENT_ID")
        } else if self.firebase_api_key.is_none() {
            Some("FIREBASE_API_KEY")
        } else {
            None
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::new();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.callback_port, DEFAULT_CALLBACK_PORT);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.missing_google_setting(), Some("GOOGLE_CLIENT_ID"));
        assert!(config.storage_dir.to_string_lossy().ends_with("secondbrain"));
    }

    #[test]
    fn test_google_credentials_need_both_values() {
        let mut config = Config::new();
        config.google_client_id = Some("client".to_string());
        assert_eq!(config.missing_google_setting(), Some("FIREBASE_API_KEY"));
        config.firebase_api_key = Some("key".to_string());
        assert_eq!(config.missing_google_setting(), None);
    }
}

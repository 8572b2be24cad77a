// Shared constants for the SecondBrain client

/// Default knowledge-store backend
pub const DEFAULT_API_URL: &str = "https://secondbrainbe.onrender.com";

// Knowledge-store endpoints
pub const LIST_NODES_PATH: &str = "/get-links";
pub const DELETE_NODE_PATH: &str = "/delete-link";

// Durable storage keys for the session mirror
pub const TOKEN_KEY: &str = "auth.token";
pub const DISPLAY_NAME_KEY: &str = "user.name";

/// Directory name under the platform config dir
pub const APP_DIR_NAME: &str = "secondbrain";
pub const LOG_FILE_NAME: &str = "secondbrain.log";

/// Port for the local OAuth callback server
pub const DEFAULT_CALLBACK_PORT: u16 = 8732;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// How long the browser sign-in may take before we give up
pub const SIGN_IN_TIMEOUT_SECS: u64 = 120;

// Google / Firebase identity endpoints
pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const GOOGLE_REVOKE_URL: &str = "https://oauth2.googleapis.com/revoke";
pub const FIREBASE_SIGN_IN_URL: &str =
    "https://identitytoolkit.googleapis.com/v1/accounts:signInWithIdp";

/// Keyword search needs at least this many characters
pub const MIN_KEYWORD_QUERY_CHARS: usize = 3;

// User-facing alert texts
pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please login again.";
pub const REQUEST_FAILED_MESSAGE: &str = "Something went wrong. Please try again later.";
pub const KEYWORD_HINT_MESSAGE: &str = "Please type at least 3 characters to see results";
pub const FALLBACK_DISPLAY_NAME: &str = "User";

pub const HELP_TEXT: &str = "\
Navigation:
  Tab            Switch between Assistant and Nodes
  Ctrl+L         Logout
  Ctrl+C / Esc   Quit
  F1             Show this help

Assistant:
  type           Edit the search query
  Ctrl+T         Toggle Neural / Keyword search

Nodes:
  Up / Down      Select a node
  d              Delete the selected node (asks for confirmation)
  r              Refresh
  ?              Show this help
";

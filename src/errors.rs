//! Error types shared across the client
//!
//! Nothing in here is fatal to the process. Every variant ends up as an
//! alert, a redirect to the landing screen, or a log line.

use thiserror::Error;

/// Failures talking to the knowledge store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KnowledgeError {
    /// The bearer token is missing or was rejected with a 401
    #[error("Session is no longer valid")]
    SessionInvalid,

    /// Any other HTTP or transport failure
    #[error("Request failed: {0}")]
    RequestFailed(String),
}

impl From<reqwest::Error> for KnowledgeError {
    fn from(err: reqwest::Error) -> Self {
        KnowledgeError::RequestFailed(format!("HTTP request error: {}", err))
    }
}

/// Failures of the durable key/value storage
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(#[from] std::io::Error),

    #[error("Storage rejected write for key {0}")]
    Rejected(String),
}

/// Failures of the interactive sign-in flow
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Identity provider not configured: {0} is missing")]
    NotConfigured(&'static str),

    #[error("Sign-in callback error: {0}")]
    Callback(String),

    #[error("Sign-in timed out after {0} seconds")]
    Timeout(u64),

    #[error("Identity provider error: {0}")]
    Provider(String),

    #[error("Identity provider returned an empty {0}")]
    EmptyCredential(&'static str),
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        AuthError::Provider(format!("HTTP request error: {}", err))
    }
}

impl From<std::io::Error> for AuthError {
    fn from(err: std::io::Error) -> Self {
        AuthError::Callback(err.to_string())
    }
}

//! Identity provider seam
//!
//! The provider is an opaque capability: an interactive sign-in that either
//! yields a display name plus a fresh bearer token, or fails.

use crate::errors::AuthError;
use async_trait::async_trait;

/// Result of a completed interactive sign-in
#[derive(Clone, PartialEq, Eq)]
pub struct SignIn {
    pub display_name: String,
    pub bearer_token: String,
}

impl std::fmt::Debug for SignIn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignIn")
            .field("display_name", &self.display_name)
            .field("bearer_token", &"<redacted>")
            .finish()
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Provider name for logs
    fn name(&self) -> &str;

    /// Run the interactive sign-in flow
    async fn sign_in(&self) -> Result<SignIn, AuthError>;

    /// Sign out at the provider. Callers treat this as best-effort.
    async fn sign_out(&self) -> Result<(), AuthError>;
}

/// Stand-in while no provider credentials are configured
///
/// Stored sessions keep working; only a new sign-in is refused.
pub struct UnconfiguredProvider {
    missing: &'static str,
}

impl UnconfiguredProvider {
    pub fn new(missing: &'static str) -> Self {
        Self { missing }
    }
}

#[async_trait]
impl IdentityProvider for UnconfiguredProvider {
    fn name(&self) -> &str {
        "unconfigured"
    }

    async fn sign_in(&self) -> Result<SignIn, AuthError> {
        Err(AuthError::NotConfigured(self.missing))
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_in_debug_hides_token() {
        let sign_in = SignIn {
            display_name: "Ada".to_string(),
            bearer_token: "secret".to_string(),
        };
        let printed = format!("{:?}", sign_in);
        assert!(printed.contains("Ada"));
        assert!(!printed.contains("secret"));
    }

    #[tokio::test]
    async fn test_unconfigured_refuses_sign_in() {
        let provider = UnconfiguredProvider::new("GOOGLE_CLIENT_ID");
        assert!(matches!(
            provider.sign_in().await,
            Err(AuthError::NotConfigured("GOOGLE_CLIENT_ID"))
        ));
        assert!(provider.sign_out().await.is_ok());
    }
}

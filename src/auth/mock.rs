//! Mock identity provider
//!
//! Bypasses the browser flow entirely. Backs the hidden `--skip-auth` flag
//! and the session tests, where sign-out failures need to be simulated.

use crate::auth::provider::{IdentityProvider, SignIn};
use crate::errors::AuthError;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

pub struct MockProvider {
    display_name: String,
    bearer_token: String,
    fail_sign_in: AtomicBool,
    fail_sign_out: AtomicBool,
    sign_out_calls: AtomicUsize,
}

impl MockProvider {
    pub fn new(display_name: impl Into<String>, bearer_token: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            bearer_token: bearer_token.into(),
            fail_sign_in: AtomicBool::new(false),
            fail_sign_out: AtomicBool::new(false),
            sign_out_calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_sign_in(self) -> Self {
        self.fail_sign_in.store(true, Ordering::SeqCst);
        self
    }

    pub fn failing_sign_out(self) -> Self {
        self.fail_sign_out.store(true, Ordering::SeqCst);
        self
    }

    pub fn sign_out_calls(&self) -> usize {
        self.sign_out_calls.load(Ordering::SeqCst)
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Test User", "mock-token")
    }
}

#[async_trait]
impl IdentityProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn sign_in(&self) -> Result<SignIn, AuthError> {
        if self.fail_sign_in.load(Ordering::SeqCst) {
            return Err(AuthError::Provider("mock sign-in rejected".to_string()));
        }
        tracing::info!("Mock sign-in for {}", self.display_name);
        Ok(SignIn {
            display_name: self.display_name.clone(),
            bearer_token: self.bearer_token.clone(),
        })
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_sign_out.load(Ordering::SeqCst) {
            return Err(AuthError::Provider("mock sign-out unreachable".to_string()));
        }
        Ok(())
    }
}

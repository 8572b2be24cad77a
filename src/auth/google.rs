//! Google sign-in exchanged for a Firebase ID token
//!
//! Authorization-code flow with PKCE against Google, using a loopback
//! redirect. The Google access token is then traded at Firebase's
//! `signInWithIdp` for the ID token the knowledge store accepts as a bearer.

use crate::auth::callback::CallbackServer;
use crate::auth::provider::{IdentityProvider, SignIn};
use crate::config::Config;
use crate::constants::{
    FALLBACK_DISPLAY_NAME, FIREBASE_SIGN_IN_URL, GOOGLE_AUTH_URL, GOOGLE_REVOKE_URL,
    GOOGLE_TOKEN_URL, SIGN_IN_TIMEOUT_SECS,
};
use crate::errors::AuthError;
use async_trait::async_trait;
use oauth2::{
    AccessToken, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet,
    EndpointSet, PkceCodeChallenge, RedirectUrl, RevocationUrl, Scope, StandardRevocableToken,
    TokenResponse, TokenUrl,
};
use serde::{Deserialize, Serialize};
use std::process::Command;
use std::sync::Mutex;
use std::time::Duration;

type BasicClient = oauth2::basic::BasicClient<
    EndpointSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointSet,
    EndpointSet,
>;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FirebaseSignInRequest<'a> {
    post_body: String,
    request_uri: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct FirebaseSignInResponse {
    id_token: String,
    display_name: Option<String>,
    email: Option<String>,
}

pub struct GoogleProvider {
    client_id: String,
    client_secret: Option<String>,
    firebase_api_key: String,
    callback_port: u16,
    http: reqwest::Client,
    // Google token of this process's sign-in, revoked on logout
    access_token: Mutex<Option<String>>,
    quiet: bool,
}

impl GoogleProvider {
    pub fn from_config(config: &Config) -> Result<Self, AuthError> {
        let client_id = config
            .google_client_id
            .clone()
            .ok_or(AuthError::NotConfigured("GOOGLE_CLIENT_ID"))?;
        let firebase_api_key = config
            .firebase_api_key
            .clone()
            .ok_or(AuthError::NotConfigured("FIREBASE_API_KEY"))?;

        // Token endpoint redirects are never followed
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client_id,
            client_secret: config.google_client_secret.clone(),
            firebase_api_key,
            callback_port: config.callback_port,
            http,
            access_token: Mutex::new(None),
            quiet: false,
        })
    }

    /// Don't print the sign-in URL; the TUI owns the terminal
    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    fn oauth_client(&self, redirect_uri: &str) -> Result<BasicClient, AuthError> {
        let mut client = oauth2::basic::BasicClient::new(ClientId::new(self.client_id.clone()))
            .set_auth_uri(auth_url(GOOGLE_AUTH_URL)?)
            .set_token_uri(
                TokenUrl::new(GOOGLE_TOKEN_URL.to_string())
                    .map_err(|e| AuthError::Provider(e.to_string()))?,
            )
            .set_revocation_url(
                RevocationUrl::new(GOOGLE_REVOKE_URL.to_string())
                    .map_err(|e| AuthError::Provider(e.to_string()))?,
            )
            .set_redirect_uri(
                RedirectUrl::new(redirect_uri.to_string())
                    .map_err(|e| AuthError::Provider(e.to_string()))?,
            );

        if let Some(secret) = &self.client_secret {
            client = client.set_client_secret(ClientSecret::new(secret.clone()));
        }

        Ok(client)
    }

    async fn exchange_with_firebase(
        &self,
        google_access_token: &str,
        redirect_uri: &str,
    ) -> Result<SignIn, AuthError> {
        let request = FirebaseSignInRequest {
            post_body: format!(
                "access_token={}&providerId=google.com",
                urlencoding::encode(google_access_token)
            ),
            request_uri: redirect_uri,
            return_secure_token: true,
        };

        let response = self
            .http
            .post(FIREBASE_SIGN_IN_URL)
            .query(&[("key", self.firebase_api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AuthError::Provider(format!(
                "Firebase sign-in failed: HTTP {}: {}",
                status, error_text
            )));
        }

        let body: FirebaseSignInResponse = response.json().await?;
        let display_name = body
            .display_name
            .filter(|name| !name.is_empty())
            .or(body.email)
            .unwrap_or_else(|| FALLBACK_DISPLAY_NAME.to_string());

        Ok(SignIn {
            display_name,
            bearer_token: body.id_token,
        })
    }
}

fn auth_url(url: &str) -> Result<AuthUrl, AuthError> {
    AuthUrl::new(url.to_string()).map_err(|e| AuthError::Provider(e.to_string()))
}

#[async_trait]
impl IdentityProvider for GoogleProvider {
    fn name(&self) -> &str {
        "google"
    }

    async fn sign_in(&self) -> Result<SignIn, AuthError> {
        let server = CallbackServer::bind(self.callback_port).await?;
        let redirect_uri = server.redirect_uri();
        let client = self.oauth_client(&redirect_uri)?;

        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();
        let (authorize_url, csrf_token) = client
            .authorize_url(CsrfToken::new_random)
            .add_scope(Scope::new("openid".to_string()))
            .add_scope(Scope::new("email".to_string()))
            .add_scope(Scope::new("profile".to_string()))
            .set_pkce_challenge(pkce_challenge)
            .url();

        open_browser(authorize_url.as_str(), self.quiet);

        let code = server
            .wait_for_code(
                Duration::from_secs(SIGN_IN_TIMEOUT_SECS),
                csrf_token.secret(),
            )
            .await?;

        let token_response = client
            .exchange_code(AuthorizationCode::new(code))
            .set_pkce_verifier(pkce_verifier)
            .request_async(&self.http)
            .await
            .map_err(|e| AuthError::Provider(format!("code exchange failed: {}", e)))?;

        let google_token = token_response.access_token().secret().clone();
        let sign_in = self.exchange_with_firebase(&google_token, &redirect_uri).await?;

        *self
            .access_token
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(google_token);

        Ok(sign_in)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let token = self
            .access_token
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();

        // Sessions restored from storage never held a Google token
        let Some(token) = token else {
            return Ok(());
        };

        let redirect_uri = format!("http://127.0.0.1:{}/callback", self.callback_port);
        let client = self.oauth_client(&redirect_uri)?;
        client
            .revoke_token(StandardRevocableToken::AccessToken(AccessToken::new(token)))
            .map_err(|e| AuthError::Provider(e.to_string()))?
            .request_async(&self.http)
            .await
            .map_err(|e| AuthError::Provider(format!("token revocation failed: {}", e)))?;

        tracing::debug!("Revoked Google access token");
        Ok(())
    }
}

/// Open the URL in the user's browser, printing it as a fallback
fn open_browser(url: &str, quiet: bool) {
    if !quiet {
        println!("Opening browser for authentication...");
        println!("If the browser doesn't open automatically, please visit this URL:");
        println!("{}", url);
    }
    tracing::info!("Sign-in URL: {}", url);

    #[cfg(target_os = "macos")]
    let result = Command::new("open").arg(url).spawn();

    #[cfg(target_os = "windows")]
    let result = Command::new("cmd").args(["/c", "start", "", url]).spawn();

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    let result = Command::new("xdg-open").arg(url).spawn();

    if let Err(e) = result {
        tracing::warn!("Failed to open browser automatically: {}", e);
    }
}

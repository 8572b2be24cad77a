//! HTTP client for the knowledge-store API
//!
//! Every call carries the caller's bearer token. All responses go through
//! one interceptor, which turns a 401 into [`KnowledgeError::SessionInvalid`]
//! and notifies the attached [`SessionInvalidation`] hook. Calls are fire-once:
//! no retries, no backoff, no cancellation.

use crate::config::Config;
use crate::constants::{DELETE_NODE_PATH, LIST_NODES_PATH};
use crate::errors::KnowledgeError;
use crate::knowledge::node::{Node, WireNode};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Told when the backend rejects the session token
#[async_trait]
pub trait SessionInvalidation: Send + Sync {
    /// `token` is the credential the backend rejected
    async fn session_invalid(&self, token: &str);
}

#[derive(Serialize)]
struct DeleteNodeRequest<'a> {
    id: &'a str,
}

#[derive(Clone)]
pub struct KnowledgeClient {
    base_url: String,
    http: reqwest::Client,
    invalidation: Option<Arc<dyn SessionInvalidation>>,
}

impl KnowledgeClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, KnowledgeError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            invalidation: None,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, KnowledgeError> {
        Self::new(&config.api_url, config.request_timeout())
    }

    /// Attach the hook run on every 401
    pub fn with_invalidation(mut self, hook: Arc<dyn SessionInvalidation>) -> Self {
        self.invalidation = Some(hook);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch every node of the signed-in user
    pub async fn list_nodes(&self, token: &str) -> Result<Vec<Node>, KnowledgeError> {
        require_token(token)?;

        let url = format!("{}{}", self.base_url, LIST_NODES_PATH);
        tracing::debug!("GET {}", url);
        let response = self.http.get(&url).bearer_auth(token).send().await?;
        let response = self.intercept(response, token).await?;

        let wire: Vec<WireNode> = response
            .json()
            .await
            .map_err(|e| KnowledgeError::RequestFailed(format!("invalid node list: {}", e)))?;
        let nodes: Vec<Node> = wire.into_iter().map(WireNode::into_node).collect();

        tracing::debug!("Fetched {} nodes", nodes.len());
        Ok(nodes)
    }

    /// Delete one node; the caller removes it locally only on `Ok`
    pub async fn delete_node(&self, token: &str, id: &str) -> Result<(), KnowledgeError> {
        require_token(token)?;

        let url = format!("{}{}", self.base_url, DELETE_NODE_PATH);
        tracing::debug!("DELETE {} id={}", url, id);
        let response = self
            .http
            .delete(&url)
            .bearer_auth(token)
            .json(&DeleteNodeRequest { id })
            .send()
            .await?;
        self.intercept(response, token).await?;

        tracing::info!("Deleted node {}", id);
        Ok(())
    }

    async fn intercept(
        &self,
        response: reqwest::Response,
        token: &str,
    ) -> Result<reqwest::Response, KnowledgeError> {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!("Knowledge store answered 401 for {}", response.url().path());
            if let Some(hook) = &self.invalidation {
                hook.session_invalid(token).await;
            }
            return Err(KnowledgeError::SessionInvalid);
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!("Knowledge store request failed: HTTP {}: {}", status, message);
            return Err(KnowledgeError::RequestFailed(format!(
                "HTTP {}: {}",
                status.as_u16(),
                message
            )));
        }

        Ok(response)
    }
}

fn require_token(token: &str) -> Result<(), KnowledgeError> {
    if token.is_empty() {
        return Err(KnowledgeError::SessionInvalid);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingHook(AtomicUsize);

    #[async_trait]
    impl SessionInvalidation for CountingHook {
        async fn session_invalid(&self, _token: &str) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn client(server: &mockito::Server) -> KnowledgeClient {
        KnowledgeClient::new(&server.url(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_list_nodes_sends_bearer_and_decodes() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/get-links")
            .match_header("authorization", "Bearer tok-1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[{"_id":"n1","title":"Alpha","url":"https://a.example"},
                    {"title":"Beta","description":"no id here"}]"#,
            )
            .expect(1)
            .create_async()
            .await;

        let nodes = client(&server).list_nodes("tok-1").await.unwrap();
        mock.assert_async().await;

        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].id, "n1");
        assert_eq!(nodes[0].title.as_deref(), Some("Alpha"));
        assert!(!nodes[1].id.is_empty());
        assert_ne!(nodes[1].id, nodes[0].id);
    }

    #[tokio::test]
    async fn test_list_nodes_401_signals_once_without_retry() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/get-links")
            .with_status(401)
            .expect(1)
            .create_async()
            .await;

        let hook = Arc::new(CountingHook::default());
        let client = client(&server).with_invalidation(hook.clone());

        let result = client.list_nodes("expired").await;
        mock.assert_async().await;

        assert_eq!(result, Err(KnowledgeError::SessionInvalid));
        assert_eq!(hook.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_list_nodes_server_error_is_request_failed() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/get-links")
            .with_status(500)
            .with_body("boom")
            .expect(1)
            .create_async()
            .await;

        let hook = Arc::new(CountingHook::default());
        let result = client(&server)
            .with_invalidation(hook.clone())
            .list_nodes("tok")
            .await;
        mock.assert_async().await;

        assert!(matches!(result, Err(KnowledgeError::RequestFailed(msg)) if msg.contains("500")));
        assert_eq!(hook.0.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_list_nodes_bad_body_is_request_failed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/get-links")
            .with_status(200)
            .with_body("{\"not\":\"a list\"}")
            .create_async()
            .await;

        let result = client(&server).list_nodes("tok").await;
        assert!(matches!(result, Err(KnowledgeError::RequestFailed(_))));
    }

    #[tokio::test]
    async fn test_empty_token_never_hits_network() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/get-links")
            .expect(0)
            .create_async()
            .await;

        let result = client(&server).list_nodes("").await;
        mock.assert_async().await;
        assert_eq!(result, Err(KnowledgeError::SessionInvalid));
    }

    #[tokio::test]
    async fn test_delete_node_sends_id_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("DELETE", "/delete-link")
            .match_header("authorization", "Bearer tok")
            .match_body(Matcher::Json(serde_json::json!({ "id": "n1" })))
            .with_status(200)
            .expect(1)
            .create_async()
            .await;

        client(&server).delete_node("tok", "n1").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_delete_node_401_signals_once_without_retry() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("DELETE", "/delete-link")
            .with_status(401)
            .expect(1)
            .create_async()
            .await;

        let hook = Arc::new(CountingHook::default());
        let client = client(&server).with_invalidation(hook.clone());

        let result = client.delete_node("expired", "n1").await;
        mock.assert_async().await;

        assert_eq!(result, Err(KnowledgeError::SessionInvalid));
        assert_eq!(hook.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_delete_node_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("DELETE", "/delete-link")
            .with_status(404)
            .create_async()
            .await;

        let result = client(&server).delete_node("tok", "missing").await;
        assert!(matches!(result, Err(KnowledgeError::RequestFailed(_))));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = KnowledgeClient::new("https://kb.example/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "https://kb.example");
    }
}

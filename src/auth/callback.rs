//! Local HTTP listener for the OAuth redirect
//!
//! The browser is sent back to `http://127.0.0.1:<port>/callback?code=..&state=..`.
//! Every connection is read on its own task, so a browser preconnect that never
//! sends a request cannot hold up the real redirect. Only a callback carrying
//! the expected `state` ends the flow.

use crate::errors::AuthError;
use askama::Template;
use std::collections::HashMap;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

const CALLBACK_PATH: &str = "/callback";
const REQUEST_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Query parameters of a request to the callback path
///
/// `outcome` holds the authorization code, or the reason there is none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackParams {
    pub state: Option<String>,
    pub outcome: Result<String, String>,
}

#[derive(Template)]
#[template(path = "callback.html")]
struct CallbackPage<'a> {
    title: &'a str,
    message: &'a str,
}

pub struct CallbackServer {
    listener: TcpListener,
    port: u16,
}

impl CallbackServer {
    /// Bind on localhost. Port 0 picks a free port.
    pub async fn bind(port: u16) -> Result<Self, AuthError> {
        let listener = TcpListener::bind(("127.0.0.1", port)).await.map_err(|e| {
            AuthError::Callback(format!("failed to bind local port {}: {}", port, e))
        })?;
        let port = listener.local_addr()?.port();
        tracing::debug!("OAuth callback listener on 127.0.0.1:{}", port);
        Ok(Self { listener, port })
    }

    pub fn redirect_uri(&self) -> String {
        format!("http://127.0.0.1:{}{}", self.port, CALLBACK_PATH)
    }

    /// Wait for the redirect belonging to `expected_state` and return its code
    pub async fn wait_for_code(
        self,
        timeout: Duration,
        expected_state: &str,
    ) -> Result<String, AuthError> {
        match tokio::time::timeout(timeout, self.accept_until_callback(expected_state)).await {
            Ok(result) => result,
            Err(_) => Err(AuthError::Timeout(timeout.as_secs())),
        }
    }

    async fn accept_until_callback(&self, expected_state: &str) -> Result<String, AuthError> {
        let (tx, mut rx) = mpsc::channel::<(TcpStream, String)>(8);

        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    let (stream, _) = accepted?;
                    tokio::spawn(read_connection(stream, tx.clone()));
                }
                Some((mut stream, request)) = rx.recv() => {
                    let Some(params) = parse_callback_request(&request) else {
                        // favicon and friends
                        respond(&mut stream, "404 Not Found", "Not Found", "").await;
                        continue;
                    };

                    if params.state.as_deref() != Some(expected_state) {
                        tracing::warn!("Ignoring OAuth callback with unexpected state");
                        respond(
                            &mut stream,
                            "400 Bad Request",
                            "Authentication Failed",
                            "This sign-in link does not belong to the current attempt.",
                        )
                        .await;
                        continue;
                    }

                    return match params.outcome {
                        Ok(code) => {
                            respond(
                                &mut stream,
                                "200 OK",
                                "Authentication Successful",
                                "You can now close this window and return to SecondBrain.",
                            )
                            .await;
                            Ok(code)
                        }
                        Err(reason) => {
                            respond(
                                &mut stream,
                                "400 Bad Request",
                                "Authentication Failed",
                                &reason,
                            )
                            .await;
                            Err(AuthError::Callback(reason))
                        }
                    };
                }
            }
        }
    }
}

async fn read_connection(mut stream: TcpStream, tx: mpsc::Sender<(TcpStream, String)>) {
    match tokio::time::timeout(REQUEST_READ_TIMEOUT, read_request_head(&mut stream)).await {
        Ok(Ok(request)) => {
            // The receiver is gone once the flow has finished
            let _ = tx.send((stream, request)).await;
        }
        Ok(Err(e)) => tracing::debug!("Failed to read callback request: {}", e),
        Err(_) => tracing::debug!("Dropping idle callback connection"),
    }
}

async fn read_request_head(stream: &mut TcpStream) -> Result<String, AuthError> {
    let mut buffer = vec![0u8; 8192];
    let mut read = 0;

    while read < buffer.len() {
        let n = stream.read(&mut buffer[read..]).await?;
        if n == 0 {
            break;
        }
        read += n;
        if buffer[..read].windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
    }

    Ok(String::from_utf8_lossy(&buffer[..read]).into_owned())
}

fn render_page(title: &str, message: &str) -> String {
    CallbackPage { title, message }.render().unwrap_or_else(|e| {
        tracing::debug!("Failed to render callback page: {}", e);
        String::new()
    })
}

async fn respond(stream: &mut TcpStream, status: &str, title: &str, message: &str) {
    let body = render_page(title, message);
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    if let Err(e) = stream.write_all(response.as_bytes()).await {
        tracing::debug!("Failed to answer callback request: {}", e);
    }
}

/// Parse the request line of a redirect
///
/// `None` for requests that are not the callback.
pub fn parse_callback_request(request: &str) -> Option<CallbackParams> {
    let request_line = request.lines().next()?;
    let mut parts = request_line.split_whitespace();
    if parts.next()? != "GET" {
        return None;
    }
    let target = parts.next()?;

    let (path, query) = match target.split_once('?') {
        Some((path, query)) => (path, query),
        None => (target, ""),
    };
    if path != CALLBACK_PATH {
        return None;
    }

    let mut params = parse_query(query);
    let state = params.remove("state");
    let outcome = match (params.remove("error"), params.remove("code")) {
        (Some(error), _) => Err(format!("provider returned error: {}", error)),
        (None, Some(code)) if !code.is_empty() => Ok(code),
        _ => Err("no authorization code in callback URL".to_string()),
    };

    Some(CallbackParams { state, outcome })
}

fn parse_query(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let value = value.replace('+', " ");
            let value = urlencoding::decode(&value).ok()?.into_owned();
            Some((key.to_string(), value))
        })
        .collect()
}

// src/auth/flow.rs
//
// Loopback receiver for the authorization redirect. Every accepted
// connection is read on its own task so an idle browser pre-connect cannot
// hold up the real redirect; the first request carrying a matching `state`
// wins.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, warn};
use url::Url;

use super::AuthError;

const CALLBACK_TIMEOUT: Duration = Duration::from_secs(300);
const REQUEST_READ_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_REQUEST_LINE: u64 = 8192;

const OK_PAGE: &str = "<html><body><h2>Authorized.</h2><p>You can close this tab.</p></body></html>";
const FAILED_PAGE: &str =
    "<html><body><h2>Authorization failed.</h2><p>See the terminal for details.</p></body></html>";

/// Fresh value for the OAuth `state` parameter.
pub fn new_state() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Wait for the browser to hit the redirect URI and return the auth code.
/// Redirects whose `state` differs from `expected_state` are refused.
pub async fn receive_code(listener: TcpListener, expected_state: &str) -> Result<String, AuthError> {
    timeout(CALLBACK_TIMEOUT, accept_until_code(listener, expected_state))
        .await
        .map_err(|_| AuthError::Callback("timed out waiting for the authorization redirect".into()))?
}

async fn accept_until_code(listener: TcpListener, expected_state: &str) -> Result<String, AuthError> {
    let (tx, mut rx) = mpsc::channel::<Result<String, AuthError>>(4);
    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = accepted
                    .map_err(|e| AuthError::Callback(format!("accept failed: {e}")))?;
                debug!(%peer, "redirect connection");
                let tx = tx.clone();
                let state = expected_state.to_string();
                tokio::spawn(async move {
                    if let Some(outcome) = handle_connection(stream, &state).await {
                        let _ = tx.send(outcome).await;
                    }
                });
            }
            Some(outcome) = rx.recv() => return outcome,
        }
    }
}

/// `None` for connections that don't settle the flow: idle, oversized,
/// unrelated paths, or a foreign `state`.
async fn handle_connection(
    mut stream: TcpStream,
    expected_state: &str,
) -> Option<Result<String, AuthError>> {
    let mut request_line = String::new();
    let read = {
        let mut reader = BufReader::new((&mut stream).take(MAX_REQUEST_LINE));
        timeout(REQUEST_READ_TIMEOUT, reader.read_line(&mut request_line)).await
    };
    match read {
        Ok(Ok(n)) if n > 0 => {}
        _ => return None,
    }

    // browsers also ask for /favicon.ico; ignore anything without a query
    let outcome = code_from_request_line(&request_line, expected_state)?;

    let body = if outcome.is_ok() { OK_PAGE } else { FAILED_PAGE };
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;

    match outcome {
        Err(AuthError::StateMismatch) => {
            warn!("ignoring redirect with unexpected state");
            None
        }
        other => Some(other),
    }
}

/// Parse `GET /?code=...&state=... HTTP/1.1`.
///
/// `None` if the request carries neither `code` nor `error`.
fn code_from_request_line(line: &str, expected_state: &str) -> Option<Result<String, AuthError>> {
    let target = line.split_whitespace().nth(1)?;
    let url = Url::parse("http://127.0.0.1").ok()?.join(target).ok()?;

    let mut code = None;
    let mut error = None;
    let mut state = None;
    for (k, v) in url.query_pairs() {
        match k.as_ref() {
            "code" => code = Some(v.into_owned()),
            "error" => error = Some(v.into_owned()),
            "state" => state = Some(v.into_owned()),
            _ => {}
        }
    }

    if code.is_none() && error.is_none() {
        return None;
    }
    if state.as_deref() != Some(expected_state) {
        return Some(Err(AuthError::StateMismatch));
    }
    match (code, error) {
        (Some(code), _) => Some(Ok(code)),
        (None, error) => Some(Err(AuthError::Callback(format!(
            "authorization denied: {}",
            error.unwrap_or_default()
        )))),
    }
}

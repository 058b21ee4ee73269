// src/auth/mod.rs
//
// OAuth2 credential provider for the Sheets API: cached token, refresh
// grant, or a one-shot loopback authorization when neither works.

pub mod flow;
pub mod secret;
pub mod token;

pub use secret::ClientSecret;
pub use token::{StoredToken, TokenResponse};

use std::path::PathBuf;

use chrono::{Duration, Utc};
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{info, warn};
use url::Url;

pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

/// Tokens this close to expiry are refreshed before use.
const REFRESH_SKEW_SECS: i64 = 60;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path:?}: invalid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("client secret has neither an `installed` nor a `web` section")]
    NoClientSection,

    #[error("token request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("token endpoint returned {status}: {message}")]
    TokenEndpoint { status: u16, message: String },

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("authorization redirect: {0}")]
    Callback(String),

    #[error("authorization redirect carried an unexpected state")]
    StateMismatch,
}

/// Obtains a usable access token, going to the network only when the cache
/// can't serve one.
pub struct Authenticator {
    http: Client,
    secret: ClientSecret,
    cache_path: PathBuf,
    redirect_port: u16,
    state: String,
}

impl Authenticator {
    pub fn new(
        http: Client,
        secret: ClientSecret,
        cache_path: impl Into<PathBuf>,
        redirect_port: u16,
    ) -> Self {
        Self {
            http,
            secret,
            cache_path: cache_path.into(),
            redirect_port,
            state: flow::new_state(),
        }
    }

    /// Cached token if fresh, else refreshed, else newly authorized.
    /// Anything obtained from the network is written back to the cache.
    pub async fn obtain(&self) -> Result<StoredToken, AuthError> {
        let cached = StoredToken::load(&self.cache_path)?;

        if let Some(token) = &cached {
            if token.is_fresh(Utc::now(), Duration::seconds(REFRESH_SKEW_SECS)) {
                info!(cache = %self.cache_path.display(), "using cached credentials");
                return Ok(token.clone());
            }
        }

        let refreshed = match cached.and_then(|t| t.refresh_token) {
            Some(refresh_token) => match self.refresh(&refresh_token).await {
                Ok(token) => Some(token),
                Err(e) => {
                    warn!(error = %e, "refresh failed; re-authorizing");
                    None
                }
            },
            None => None,
        };

        let token = match refreshed {
            Some(token) => token,
            None => self.authorize().await?,
        };
        token.save(&self.cache_path)?;
        info!(cache = %self.cache_path.display(), "saved credentials");
        Ok(token)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<StoredToken, AuthError> {
        info!("refreshing access token");
        let resp = self
            .token_request(&[
                ("grant_type", "refresh_token"),
                ("client_id", self.secret.client_id.as_str()),
                ("client_secret", self.secret.client_secret.as_str()),
                ("refresh_token", refresh_token),
            ])
            .await?;
        Ok(resp.into_stored(Utc::now(), Some(refresh_token.to_string())))
    }

    async fn authorize(&self) -> Result<StoredToken, AuthError> {
        let listener = TcpListener::bind(("127.0.0.1", self.redirect_port))
            .await
            .map_err(|e| {
                AuthError::Callback(format!("binding 127.0.0.1:{}: {e}", self.redirect_port))
            })?;
        let redirect_uri = format!("http://127.0.0.1:{}", self.redirect_port);
        let consent = self.authorize_url(&redirect_uri, &self.state)?;

        eprintln!("Please authorize gradebook here:\n{consent}");
        info!(%redirect_uri, "waiting for authorization redirect");

        let code = flow::receive_code(listener, &self.state).await?;
        let resp = self
            .token_request(&[
                ("grant_type", "authorization_code"),
                ("client_id", self.secret.client_id.as_str()),
                ("client_secret", self.secret.client_secret.as_str()),
                ("code", code.as_str()),
                ("redirect_uri", redirect_uri.as_str()),
            ])
            .await?;
        info!("authorization complete");
        Ok(resp.into_stored(Utc::now(), None))
    }

    /// Consent page URL. `access_type=offline` + `prompt=consent` so Google
    /// always hands back a refresh token; `state` comes back on the redirect.
    pub fn authorize_url(&self, redirect_uri: &str, state: &str) -> Result<Url, AuthError> {
        Ok(Url::parse_with_params(
            &self.secret.auth_uri,
            &[
                ("client_id", self.secret.client_id.as_str()),
                ("redirect_uri", redirect_uri),
                ("response_type", "code"),
                ("scope", SHEETS_SCOPE),
                ("access_type", "offline"),
                ("prompt", "consent"),
                ("state", state),
            ],
        )?)
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenResponse, AuthError> {
        let resp = self
            .http
            .post(&self.secret.token_uri)
            .form(form)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AuthError::TokenEndpoint {
                status: status.as_u16(),
                message: token_error_message(&body),
            });
        }
        Ok(resp.json::<TokenResponse>().await?)
    }
}

/// `error: error_description` from an OAuth error body, or the raw text.
fn token_error_message(body: &str) -> String {
    let Ok(v) = serde_json::from_str::<Value>(body) else {
        return body.trim().to_string();
    };
    match (
        v.get("error").and_then(Value::as_str),
        v.get("error_description").and_then(Value::as_str),
    ) {
        (Some(error), Some(desc)) => format!("{error}: {desc}"),
        (Some(error), None) => error.to_string(),
        _ => body.trim().to_string(),
    }
}

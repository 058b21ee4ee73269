// src/auth/secret.rs

use std::{fs, path::Path};

use serde::Deserialize;

use super::AuthError;

const GOOGLE_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// OAuth client registration, as found in a Google `client_secret.json`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ClientSecret {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

#[derive(Deserialize)]
struct SecretFile {
    installed: Option<ClientSecret>,
    web: Option<ClientSecret>,
}

fn default_auth_uri() -> String {
    GOOGLE_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_string()
}

impl ClientSecret {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AuthError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| AuthError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|e| match e {
            AuthError::Json { source, .. } => AuthError::Json {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Accepts either the `installed` or the `web` flavour.
    pub fn from_json(text: &str) -> Result<Self, AuthError> {
        let file: SecretFile = serde_json::from_str(text).map_err(|source| AuthError::Json {
            path: Default::default(),
            source,
        })?;
        file.installed
            .or(file.web)
            .ok_or(AuthError::NoClientSection)
    }
}

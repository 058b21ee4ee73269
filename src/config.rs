// src/config.rs

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("config is missing `{0}`")]
    Missing(&'static str),
}

/// Contents of `gradebook.yaml`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub spreadsheet_id: String,
    #[serde(default = "default_worksheet")]
    pub worksheet: String,
    #[serde(default = "default_header_row")]
    pub header_row: usize,
    #[serde(default)]
    pub columns: ColumnLabels,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ColumnLabels {
    pub first_name: String,
    pub last_name: String,
}

impl Default for ColumnLabels {
    fn default() -> Self {
        Self {
            first_name: "First Name".to_string(),
            last_name: "Last Name".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AuthConfig {
    /// Google OAuth client secret JSON, as downloaded from the cloud console.
    pub client_secret: PathBuf,
    /// Where the access/refresh token is cached between runs.
    pub credential_cache: PathBuf,
    /// Loopback port for the authorization redirect.
    pub redirect_port: u16,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            client_secret: PathBuf::from("client_secret.json"),
            credential_cache: PathBuf::from(".gradebook-token.json"),
            redirect_port: 5000,
        }
    }
}

fn default_worksheet() -> String {
    "Sheet1".to_string()
}

fn default_header_row() -> usize {
    1
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    /// Check the fields that have no usable default.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.spreadsheet_id.trim().is_empty() {
            return Err(ConfigError::Missing("spreadsheet_id"));
        }
        if self.worksheet.trim().is_empty() {
            return Err(ConfigError::Missing("worksheet"));
        }
        if self.header_row == 0 {
            return Err(ConfigError::Missing("header_row (1-indexed)"));
        }
        Ok(())
    }
}

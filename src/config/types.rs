//! Configuration data model.
//!
//! Struct/enum definitions plus default values only; loading and precedence
//! live in `config::mod`.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use super::defaults::{
    DEFAULT_GRAPHQL_URL, DEFAULT_SESSION_COOKIE_ENV, DEFAULT_TIMEOUT_SECS, DEFAULT_TOKEN_ENV,
    DEFAULT_WEB_HOST,
};

/// Which update strategy to run.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Bearer-token structured-query API.
    #[default]
    Api,
    /// Browser-session settings form.
    Session,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Api => "api",
            Self::Session => "session",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "api" | "graphql" => Ok(Self::Api),
            "session" | "web" => Ok(Self::Session),
            other => Err(format!(
                "unknown backend `{other}`: expected `api` or `session`"
            )),
        }
    }
}

/// Top-level runtime configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: BackendKind,
    pub web: WebConfig,
    pub api: ApiConfig,
    pub network: NetworkConfig,
    pub display: DisplayConfig,
}

/// Settings for the session-scrape backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub host: String,
    /// Env var whose value is sent as the initial `Cookie` header, if set.
    pub session_cookie_env: Option<String>,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_WEB_HOST.to_string(),
            session_cookie_env: Some(DEFAULT_SESSION_COOKIE_ENV.to_string()),
        }
    }
}

/// Settings for the token-API backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub graphql_url: String,
    /// Env var holding the bearer token. Required when this backend runs.
    pub token_env: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            graphql_url: DEFAULT_GRAPHQL_URL.to_string(),
            token_env: DEFAULT_TOKEN_ENV.to_string(),
        }
    }
}

/// Network timeout settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Terminal output settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub color: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { color: true }
    }
}

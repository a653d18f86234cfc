//! Error types for configuration loading and queue image updates.

use std::fmt;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors when loading or parsing configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Toml(toml::de::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Toml(e) => write!(f, "toml: {e}"),
            Self::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml(e)
    }
}

// ---------------------------------------------------------------------------
// TransportError
// ---------------------------------------------------------------------------

/// Failures below the application protocol: the request never produced a
/// usable response.
#[derive(Debug)]
pub enum TransportError {
    /// Network / reqwest-level error (DNS, connect, TLS, timeout, body read).
    Http(reqwest::Error),
    /// Non-2xx status where the protocol treats that as infrastructural.
    Status(u16, String),
    /// Response body could not be decoded as the expected format.
    Decode(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "http: {e}"),
            Self::Status(code, body) => write!(f, "status {code}: {body}"),
            Self::Decode(msg) => write!(f, "decode: {msg}"),
        }
    }
}

impl std::error::Error for TransportError {}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

// ---------------------------------------------------------------------------
// UpdateError — top-level
// ---------------------------------------------------------------------------

/// Everything that can stop a queue image update.
#[derive(Debug)]
pub enum UpdateError {
    /// Missing or unusable configuration detected before any network call.
    Configuration(String),
    /// The caller supplied a request that violates its own invariants.
    InvalidRequest(String),
    Transport(TransportError),
    /// The settings page did not yield an anti-forgery token.
    SessionAcquisition(String),
    /// The organization slug did not resolve for this credential.
    OrganizationNotFound {
        slug: String,
        /// Errors reported by the remote, if any.
        detail: Option<String>,
    },
    /// The settings form was submitted and the remote declined it.
    UpdateRejected { status: u16, message: String },
    /// The structured mutation reported errors or returned no data.
    Mutation(String),
}

impl UpdateError {
    /// Stable short label used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::InvalidRequest(_) => "invalid_request",
            Self::Transport(_) => "transport",
            Self::SessionAcquisition(_) => "session_acquisition",
            Self::OrganizationNotFound { .. } => "organization_not_found",
            Self::UpdateRejected { .. } => "update_rejected",
            Self::Mutation(_) => "mutation",
        }
    }

    /// HTTP status attached to the failure, when one was observed.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Transport(TransportError::Status(code, _)) => Some(*code),
            Self::Transport(TransportError::Http(e)) => e.status().map(|s| s.as_u16()),
            Self::UpdateRejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for UpdateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration(msg) => write!(f, "configuration: {msg}"),
            Self::InvalidRequest(msg) => write!(f, "invalid request: {msg}"),
            Self::Transport(e) => write!(f, "transport: {e}"),
            Self::SessionAcquisition(msg) => write!(f, "session: {msg}"),
            Self::OrganizationNotFound { slug, detail } => {
                write!(
                    f,
                    "organization `{slug}` not found or not accessible by this credential"
                )?;
                if let Some(detail) = detail {
                    write!(f, " ({detail})")?;
                }
                Ok(())
            }
            Self::UpdateRejected { status, message } => {
                write!(f, "update rejected (status {status}): {message}")
            }
            Self::Mutation(msg) => write!(f, "mutation failed: {msg}"),
        }
    }
}

impl std::error::Error for UpdateError {}

impl From<TransportError> for UpdateError {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

impl From<reqwest::Error> for UpdateError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(TransportError::Http(e))
    }
}

//! Request, credential, and outcome types shared by both update backends.

use std::fmt;

use serde::Serialize;

use crate::error::UpdateError;

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// One queue image update, as supplied by the caller.
///
/// All identifiers are opaque; nothing is cross-checked against the remote
/// before the update call is made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateRequest {
    pub organization_slug: String,
    pub cluster_id: String,
    pub queue_id: String,
    pub image_reference: String,
}

impl UpdateRequest {
    /// Build a request, trimming the image reference and rejecting blanks.
    pub fn new(
        organization_slug: impl Into<String>,
        cluster_id: impl Into<String>,
        queue_id: impl Into<String>,
        image_reference: impl AsRef<str>,
    ) -> Result<Self, UpdateError> {
        let image_reference = image_reference.as_ref().trim();
        if image_reference.is_empty() {
            return Err(UpdateError::InvalidRequest(
                "image reference must not be empty".to_string(),
            ));
        }
        Ok(Self {
            organization_slug: organization_slug.into(),
            cluster_id: cluster_id.into(),
            queue_id: queue_id.into(),
            image_reference: image_reference.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Anti-forgery token plus the cookies that came with it.
///
/// Lives for exactly one GET/PATCH pair.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCredential {
    pub anti_forgery_token: String,
    /// Outbound `Cookie` header value; empty when the page set no cookies.
    pub cookie_header: String,
}

impl fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCredential")
            .field("anti_forgery_token", &"<redacted>")
            .field("cookie_count", &cookie_count(&self.cookie_header))
            .finish()
    }
}

fn cookie_count(header: &str) -> usize {
    header.split("; ").filter(|pair| !pair.is_empty()).count()
}

/// Bearer token for the structured-query API, fixed at construction.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerCredential {
    token: String,
}

impl BearerCredential {
    /// Wrap a raw token; surrounding whitespace is dropped.
    pub fn new(token: impl AsRef<str>) -> Option<Self> {
        let token = token.as_ref().trim();
        if token.is_empty() {
            None
        } else {
            Some(Self {
                token: token.to_string(),
            })
        }
    }

    /// `Authorization` header value.
    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl fmt::Debug for BearerCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerCredential(<redacted>)")
    }
}

/// Opaque organization id resolved from a slug for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationId(pub String);

impl OrganizationId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrganizationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Result of one update, produced exactly once per [`UpdateRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateOutcome {
    pub succeeded: bool,
    pub message: String,
    /// Final HTTP status of the update call, when one was observed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_status: Option<u16>,
}

impl UpdateOutcome {
    pub fn success(message: impl Into<String>, raw_status: Option<u16>) -> Self {
        Self {
            succeeded: true,
            message: message.into(),
            raw_status,
        }
    }

    /// Fold a backend error into a failed outcome.
    pub fn failure(err: &UpdateError) -> Self {
        Self {
            succeeded: false,
            message: err.to_string(),
            raw_status: err.status_code(),
        }
    }

    /// Process exit code for this outcome: 0 on success, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.succeeded {
            0
        } else {
            1
        }
    }
}

impl From<Result<UpdateOutcome, UpdateError>> for UpdateOutcome {
    fn from(result: Result<UpdateOutcome, UpdateError>) -> Self {
        match result {
            Ok(outcome) => outcome,
            Err(err) => Self::failure(&err),
        }
    }
}

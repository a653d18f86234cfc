//! Success/failure classification for both response flavors.
//!
//! The settings form answers with opaque HTML, so its verdict is a phrase
//! heuristic over status and body. The structured-query API answers with a
//! `data`/`errors` envelope where errors win over any data present.

use serde::Deserialize;

/// Confirmation text rendered after a saved change.
pub const POSITIVE_PHRASE: &str = "Agent image has been updated";
/// Body fragments that mark a rejected submission. Matched case-sensitively.
pub const NEGATIVE_PHRASES: [&str; 2] = ["error", "could not be updated"];

/// Verdict for one settings-form response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormVerdict {
    /// Redirect, or a 2xx body carrying the confirmation phrase.
    Success,
    /// Status outside [200, 400), or a 2xx body with a negative phrase.
    Failure,
    /// 2xx with neither phrase. Treated as success because the remote
    /// normally redirects on success; this is observed behavior, not a
    /// documented contract.
    AmbiguousSuccess,
}

impl FormVerdict {
    pub fn is_success(self) -> bool {
        !matches!(self, Self::Failure)
    }
}

/// Classify a settings-form response from its status and body.
pub fn classify_form_response(status: u16, body: &str) -> FormVerdict {
    if !(200..400).contains(&status) {
        return FormVerdict::Failure;
    }
    if (300..400).contains(&status) || body.contains(POSITIVE_PHRASE) {
        return FormVerdict::Success;
    }
    if NEGATIVE_PHRASES.iter().any(|phrase| body.contains(phrase)) {
        return FormVerdict::Failure;
    }
    FormVerdict::AmbiguousSuccess
}

// ---------------------------------------------------------------------------
// Structured-query envelope
// ---------------------------------------------------------------------------

/// `{ "data": ..., "errors": [...] }` response wrapper.
#[derive(Debug, Deserialize)]
pub struct GraphqlEnvelope<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Option<Vec<GraphqlError>>,
}

/// One entry of the `errors` collection.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphqlError {
    pub message: String,
}

/// Why an envelope was not accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeError {
    /// Non-empty `errors`; messages joined with `", "`.
    Errors(String),
    /// No errors, but the required data was absent.
    MissingData,
}

/// Check `errors` first, then pull the required data out with `extract`.
///
/// `extract` returns `None` when any field the caller depends on is missing.
pub fn validate_graphql_response<T, R, F>(
    envelope: GraphqlEnvelope<T>,
    extract: F,
) -> Result<R, EnvelopeError>
where
    F: FnOnce(T) -> Option<R>,
{
    if let Some(errors) = envelope.errors.filter(|errors| !errors.is_empty()) {
        let messages: Vec<_> = errors.iter().map(|e| e.message.as_str()).collect();
        return Err(EnvelopeError::Errors(messages.join(", ")));
    }
    envelope
        .data
        .and_then(extract)
        .ok_or(EnvelopeError::MissingData)
}

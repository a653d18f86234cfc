//! HTTP client construction and response capture shared by both backends.

use reqwest::header::{HeaderMap, SET_COOKIE};
use reqwest::redirect::Policy;
use std::time::Duration;

use crate::build_info;
use crate::error::{TransportError, UpdateError};

/// Build an HTTP client with the timeout applied and redirects disabled.
///
/// A 3xx from the settings form is itself the success signal, so it must
/// reach the classifier instead of being followed.
pub(crate) fn build_http_client(timeout: Duration) -> Result<reqwest::Client, UpdateError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .redirect(Policy::none())
        .user_agent(format!("queue-image/{}", build_info::short_version()))
        .build()
        .map_err(|e| UpdateError::Configuration(format!("failed to build HTTP client: {e}")))
}

/// Fully buffered response: status, `Set-Cookie` values, and body text.
#[derive(Debug, Clone)]
pub(crate) struct CapturedResponse {
    pub status: u16,
    pub set_cookies: Vec<String>,
    pub body: String,
}

impl CapturedResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Send a built request and read the whole body before returning.
pub(crate) async fn execute(
    http: &reqwest::Client,
    request: reqwest::Request,
) -> Result<CapturedResponse, TransportError> {
    let response = http.execute(request).await?;
    let status = response.status().as_u16();
    let set_cookies = set_cookie_values(response.headers());
    let body = response.text().await?;
    Ok(CapturedResponse {
        status,
        set_cookies,
        body,
    })
}

/// Every `Set-Cookie` value in arrival order.
///
/// Non-ASCII bytes are decoded lossily so the cookie still reaches the next
/// request.
fn set_cookie_values(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
        .collect()
}

/// Shorten a response body for inclusion in an error message.
pub(crate) fn body_excerpt(body: &str, max_chars: usize) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(max_chars).collect();
    format!("{cut}...[truncated]")
}

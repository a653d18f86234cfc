//! Session-scrape backend: settings page GET, then form PATCH.
//!
//! The GET yields the anti-forgery token and session cookies; the PATCH
//! replays both with the new image reference. Nothing survives the call.

pub mod scrape;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT, CONTENT_LENGTH, COOKIE};
use reqwest::Url;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::classify::{classify_form_response, FormVerdict};
use super::transport::{self, body_excerpt, CapturedResponse};
use super::{finish, ImageUpdater};
use crate::config::WebConfig;
use crate::error::UpdateError;
use crate::types::{SessionCredential, UpdateOutcome, UpdateRequest};
use scrape::{collate_cookies, extract_authenticity_token, flash_message, merge_cookie_headers};

/// Trailing path segment of the settings page.
const SETTINGS_SEGMENT: &str = "base_image";
/// Trailing path segment of the form target.
const UPDATE_SEGMENT: &str = "update_base_image_profile";
/// Selected-profile field; sent empty so the custom reference takes effect.
const PROFILE_FIELD: &str = "cluster_queue[agent_image_profile_id]";
/// Custom image reference field.
const IMAGE_FIELD: &str = "cluster_queue[agent_image_ref]";
/// Submit-button marker the form posts alongside its fields.
const COMMIT_FIELD: &str = "commit";
const COMMIT_VALUE: &str = "Save Base Image";

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml";
/// Maximum body characters quoted when no flash message is found.
const MAX_BODY_EXCERPT: usize = 200;

/// Updates a queue image through the web settings form.
pub struct SessionScrapeBackend {
    http: reqwest::Client,
    host: Url,
    /// Cookie header sent on the GET, e.g. an existing browser session.
    seed_cookie: Option<String>,
}

impl SessionScrapeBackend {
    /// Build a backend for `host` with an optional seed session cookie.
    pub fn new(
        host: &str,
        timeout: Duration,
        seed_cookie: Option<String>,
    ) -> Result<Self, UpdateError> {
        let host = Url::parse(host.trim())
            .map_err(|e| UpdateError::Configuration(format!("invalid web host `{host}`: {e}")))?;
        if host.cannot_be_a_base() {
            return Err(UpdateError::Configuration(format!(
                "web host `{host}` cannot carry a path"
            )));
        }
        Ok(Self {
            http: transport::build_http_client(timeout)?,
            host,
            seed_cookie: seed_cookie
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
        })
    }

    /// Build from config, reading the seed cookie through `env_lookup`.
    pub fn from_config<FEnv>(
        web: &WebConfig,
        timeout: Duration,
        env_lookup: FEnv,
    ) -> Result<Self, UpdateError>
    where
        FEnv: Fn(&str) -> Option<String>,
    {
        let seed_cookie = web
            .session_cookie_env
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .and_then(|name| env_lookup(name));
        Self::new(&web.host, timeout, seed_cookie)
    }

    /// `<host>/<org>/clusters/<cluster>/queues/<queue>/<segment>`.
    fn queue_url(&self, request: &UpdateRequest, segment: &str) -> Url {
        let mut url = self.host.clone();
        // Checked in `new`: the host can always be a base.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend([
                request.organization_slug.as_str(),
                "clusters",
                request.cluster_id.as_str(),
                "queues",
                request.queue_id.as_str(),
                segment,
            ]);
        }
        url
    }

    pub(crate) fn build_session_request(
        &self,
        request: &UpdateRequest,
    ) -> Result<reqwest::Request, UpdateError> {
        let mut builder = self
            .http
            .get(self.queue_url(request, SETTINGS_SEGMENT))
            .header(ACCEPT, ACCEPT_HTML);
        if let Some(cookie) = &self.seed_cookie {
            builder = builder.header(COOKIE, cookie);
        }
        Ok(builder.build()?)
    }

    pub(crate) fn build_update_request(
        &self,
        request: &UpdateRequest,
        credential: &SessionCredential,
    ) -> Result<reqwest::Request, UpdateError> {
        let fields = form_fields(&credential.anti_forgery_token, &request.image_reference);
        let mut builder = self
            .http
            .patch(self.queue_url(request, UPDATE_SEGMENT))
            .header(ACCEPT, ACCEPT_HTML)
            .header("X-Requested-With", "XMLHttpRequest")
            .form(&fields);
        if !credential.cookie_header.is_empty() {
            builder = builder.header(COOKIE, &credential.cookie_header);
        }
        let mut built = builder.build()?;
        let length = built
            .body()
            .and_then(reqwest::Body::as_bytes)
            .map(<[u8]>::len);
        if let Some(length) = length {
            built
                .headers_mut()
                .insert(CONTENT_LENGTH, HeaderValue::from(length));
        }
        Ok(built)
    }

    /// Step A: fetch the settings page and derive the session credential.
    #[instrument(skip_all, fields(org = %request.organization_slug, queue = %request.queue_id))]
    pub async fn acquire_session(
        &self,
        request: &UpdateRequest,
    ) -> Result<SessionCredential, UpdateError> {
        let http_request = self.build_session_request(request)?;
        debug!(url = %http_request.url(), "fetching queue settings page");
        let response = transport::execute(&self.http, http_request).await?;
        if !(200..400).contains(&response.status) {
            return Err(UpdateError::SessionAcquisition(format!(
                "settings page returned status {}",
                response.status
            )));
        }

        let anti_forgery_token = extract_authenticity_token(&response.body)?;
        let fresh = collate_cookies(response.set_cookies.iter().map(String::as_str));
        let cookie_header = match &self.seed_cookie {
            Some(seed) => merge_cookie_headers(seed, &fresh),
            None => fresh,
        };
        debug!(
            cookies = response.set_cookies.len(),
            "acquired anti-forgery token"
        );
        Ok(SessionCredential {
            anti_forgery_token,
            cookie_header,
        })
    }

    /// Step B: submit the form and classify the answer.
    #[instrument(skip_all, fields(org = %request.organization_slug, queue = %request.queue_id))]
    pub async fn submit_update(
        &self,
        request: &UpdateRequest,
        credential: SessionCredential,
    ) -> Result<UpdateOutcome, UpdateError> {
        let http_request = self.build_update_request(request, &credential)?;
        drop(credential);
        debug!(url = %http_request.url(), "submitting base image form");
        let response = transport::execute(&self.http, http_request).await?;
        outcome_from_form_response(request, &response)
    }

    /// Run both steps for one request.
    pub async fn update(&self, request: &UpdateRequest) -> Result<UpdateOutcome, UpdateError> {
        let credential = self.acquire_session(request).await?;
        self.submit_update(request, credential).await
    }
}

#[async_trait]
impl ImageUpdater for SessionScrapeBackend {
    fn name(&self) -> &'static str {
        "session"
    }

    async fn update_image_reference(&self, request: &UpdateRequest) -> UpdateOutcome {
        finish(self.name(), request, self.update(request).await)
    }
}

/// Form body in submission order.
fn form_fields<'a>(token: &'a str, image_reference: &'a str) -> [(&'static str, &'a str); 4] {
    [
        (scrape::TOKEN_FIELD, token),
        (PROFILE_FIELD, ""),
        (IMAGE_FIELD, image_reference),
        (COMMIT_FIELD, COMMIT_VALUE),
    ]
}

fn outcome_from_form_response(
    request: &UpdateRequest,
    response: &CapturedResponse,
) -> Result<UpdateOutcome, UpdateError> {
    let applied = format!(
        "queue `{}` base image set to `{}`",
        request.queue_id, request.image_reference
    );
    match classify_form_response(response.status, &response.body) {
        FormVerdict::Success => Ok(UpdateOutcome::success(applied, Some(response.status))),
        FormVerdict::AmbiguousSuccess => {
            warn!(
                status = response.status,
                "no confirmation or error marker in response; assuming success"
            );
            Ok(UpdateOutcome::success(
                format!("{applied} (unconfirmed: response carried no confirmation)"),
                Some(response.status),
            ))
        }
        FormVerdict::Failure => Err(UpdateError::UpdateRejected {
            status: response.status,
            message: rejection_message(response),
        }),
    }
}

fn rejection_message(response: &CapturedResponse) -> String {
    if let Some(flash) = flash_message(&response.body) {
        return format!("base image could not be updated: {flash}");
    }
    let excerpt = body_excerpt(&response.body, MAX_BODY_EXCERPT);
    if excerpt.is_empty() || excerpt.starts_with('<') {
        "base image could not be updated".to_string()
    } else {
        format!("base image could not be updated: {excerpt}")
    }
}

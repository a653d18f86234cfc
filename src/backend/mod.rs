//! Queue image update backends.
//!
//! Two strategies implement [`ImageUpdater`]:
//! - `session`: scrape the settings page for an anti-forgery token and
//!   cookies, then submit the settings form.
//! - `graphql`: resolve the organization with a bearer token, then run the
//!   queue mutation.
//!
//! `classify` holds the response heuristics both rely on; `transport` holds
//! HTTP client construction.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::{BackendKind, Config};
use crate::error::UpdateError;
use crate::types::{UpdateOutcome, UpdateRequest};

pub mod classify;
pub mod graphql;
pub mod session;
mod transport;

pub use graphql::{ConfirmedQueue, TokenApiBackend};
pub use session::SessionScrapeBackend;

/// Capability shared by every backend: apply one image reference update.
///
/// Errors never escape; they are folded into a failed [`UpdateOutcome`].
#[async_trait]
pub trait ImageUpdater: Send + Sync {
    /// Short backend label for logs and output.
    fn name(&self) -> &'static str;

    async fn update_image_reference(&self, request: &UpdateRequest) -> UpdateOutcome;
}

/// Construct the backend selected by `config`.
///
/// Credentials are read once through `env_lookup`; a missing bearer token
/// fails here with [`UpdateError::Configuration`] before any request.
pub fn build_updater<FEnv>(
    config: &Config,
    env_lookup: FEnv,
) -> Result<Box<dyn ImageUpdater>, UpdateError>
where
    FEnv: Fn(&str) -> Option<String>,
{
    let timeout = config.timeout();
    Ok(match config.backend {
        BackendKind::Api => Box::new(TokenApiBackend::from_config(
            &config.api,
            timeout,
            env_lookup,
        )?),
        BackendKind::Session => Box::new(SessionScrapeBackend::from_config(
            &config.web,
            timeout,
            env_lookup,
        )?),
    })
}

/// Log and fold a backend result into its single outcome.
pub(crate) fn finish(
    backend: &'static str,
    request: &UpdateRequest,
    result: Result<UpdateOutcome, UpdateError>,
) -> UpdateOutcome {
    match &result {
        Ok(outcome) => info!(
            backend,
            org = %request.organization_slug,
            queue = %request.queue_id,
            status = outcome.raw_status,
            "queue image updated"
        ),
        Err(err) => warn!(
            backend,
            org = %request.organization_slug,
            queue = %request.queue_id,
            kind = err.kind(),
            error = %err,
            "queue image update failed"
        ),
    }
    UpdateOutcome::from(result)
}

//! Token-API backend: organization lookup, then queue mutation.
//!
//! Application errors arrive with status 200 inside `errors`; a non-2xx
//! status means the request never reached the schema (bad token, rate
//! limit, outage) and is reported as a transport failure.

mod operations;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, instrument};

use super::classify::{validate_graphql_response, EnvelopeError, GraphqlEnvelope};
use super::transport::{self, body_excerpt};
use super::{finish, ImageUpdater};
use crate::config::ApiConfig;
use crate::error::{TransportError, UpdateError};
use crate::types::{BearerCredential, OrganizationId, UpdateOutcome, UpdateRequest};
pub use operations::ConfirmedQueue;
use operations::{
    GraphqlRequest, OrganizationData, OrganizationVariables, QueueImageData, QueueImageVariables,
    ORGANIZATION_QUERY, QUEUE_IMAGE_MUTATION,
};

const JSON: &str = "application/json";
/// Maximum body characters quoted in transport errors.
const MAX_BODY_EXCERPT: usize = 500;

/// Updates a queue image through the structured-query API.
pub struct TokenApiBackend {
    http: reqwest::Client,
    endpoint: Url,
    credential: BearerCredential,
}

impl TokenApiBackend {
    /// Build a backend with an already resolved credential.
    pub fn new(
        endpoint: &str,
        timeout: Duration,
        credential: BearerCredential,
    ) -> Result<Self, UpdateError> {
        let endpoint = Url::parse(endpoint.trim()).map_err(|e| {
            UpdateError::Configuration(format!("invalid GraphQL endpoint `{endpoint}`: {e}"))
        })?;
        Ok(Self {
            http: transport::build_http_client(timeout)?,
            endpoint,
            credential,
        })
    }

    /// Build from config, reading the token once through `env_lookup`.
    ///
    /// A missing or blank token fails here, before any request is made.
    pub fn from_config<FEnv>(
        api: &ApiConfig,
        timeout: Duration,
        env_lookup: FEnv,
    ) -> Result<Self, UpdateError>
    where
        FEnv: Fn(&str) -> Option<String>,
    {
        let name = api.token_env.trim();
        let credential = env_lookup(name)
            .and_then(BearerCredential::new)
            .ok_or_else(|| {
                UpdateError::Configuration(format!(
                    "missing API token: set the `{name}` environment variable"
                ))
            })?;
        Self::new(&api.graphql_url, timeout, credential)
    }

    pub(crate) fn build_request<V: Serialize>(
        &self,
        query: &str,
        variables: V,
    ) -> Result<reqwest::Request, UpdateError> {
        Ok(self
            .http
            .post(self.endpoint.clone())
            .header(AUTHORIZATION, self.credential.header_value())
            .header(CONTENT_TYPE, JSON)
            .header(ACCEPT, JSON)
            .json(&GraphqlRequest { query, variables })
            .build()?)
    }

    /// POST one operation and decode its envelope, keeping the HTTP status.
    async fn execute<V: Serialize, R: DeserializeOwned>(
        &self,
        operation: &'static str,
        query: &'static str,
        variables: V,
    ) -> Result<(u16, GraphqlEnvelope<R>), UpdateError> {
        let request = self.build_request(query, variables)?;
        debug!(operation, endpoint = %self.endpoint, "sending GraphQL operation");
        let response = transport::execute(&self.http, request).await?;
        if !response.is_success() {
            return Err(TransportError::Status(
                response.status,
                body_excerpt(&response.body, MAX_BODY_EXCERPT),
            )
            .into());
        }
        let envelope = serde_json::from_str(&response.body).map_err(|e| {
            TransportError::Decode(format!("{operation} response is not a GraphQL envelope: {e}"))
        })?;
        Ok((response.status, envelope))
    }

    /// Call A: resolve a slug to the opaque organization id.
    #[instrument(skip(self))]
    pub async fn resolve_organization(&self, slug: &str) -> Result<OrganizationId, UpdateError> {
        let (_, envelope): (u16, GraphqlEnvelope<OrganizationData>) = self
            .execute(
                "GetOrganization",
                ORGANIZATION_QUERY,
                OrganizationVariables { slug },
            )
            .await?;
        let organization = validate_graphql_response(envelope, |data| data.organization)
            .map_err(|err| UpdateError::OrganizationNotFound {
                slug: slug.to_string(),
                detail: match err {
                    EnvelopeError::Errors(messages) => Some(messages),
                    EnvelopeError::MissingData => None,
                },
            })?;
        debug!(
            id = %organization.id,
            name = organization.name.as_deref().unwrap_or_default(),
            "resolved organization"
        );
        Ok(OrganizationId(organization.id))
    }

    /// Call B: set the Linux agent image on the queue.
    #[instrument(skip(self, request), fields(queue = %request.queue_id))]
    pub async fn apply_image(
        &self,
        organization: &OrganizationId,
        request: &UpdateRequest,
    ) -> Result<ConfirmedQueue, UpdateError> {
        let (status, envelope): (u16, GraphqlEnvelope<QueueImageData>) = self
            .execute(
                "UpdateQueueAgentImage",
                QUEUE_IMAGE_MUTATION,
                QueueImageVariables {
                    organization_id: organization.as_str(),
                    queue_id: &request.queue_id,
                    agent_image_ref: &request.image_reference,
                },
            )
            .await?;
        validate_graphql_response(envelope, |data| data.into_confirmed(status)).map_err(|err| {
            UpdateError::Mutation(match err {
                EnvelopeError::Errors(messages) => messages,
                EnvelopeError::MissingData => "no data returned".to_string(),
            })
        })
    }

    /// Run both calls for one request. The organization id is not kept.
    pub async fn update(&self, request: &UpdateRequest) -> Result<UpdateOutcome, UpdateError> {
        let organization = self
            .resolve_organization(&request.organization_slug)
            .await?;
        let queue = self.apply_image(&organization, request).await?;
        let label = queue.key.as_deref().unwrap_or(queue.id.as_str());
        let mut message = format!(
            "queue `{label}` agent image set to `{}`",
            queue.agent_image_ref
        );
        if queue.agent_image_ref != request.image_reference {
            message.push_str(&format!(" (requested `{}`)", request.image_reference));
        }
        Ok(UpdateOutcome::success(message, Some(queue.status)))
    }
}

#[async_trait]
impl ImageUpdater for TokenApiBackend {
    fn name(&self) -> &'static str {
        "api"
    }

    async fn update_image_reference(&self, request: &UpdateRequest) -> UpdateOutcome {
        finish(self.name(), request, self.update(request).await)
    }
}

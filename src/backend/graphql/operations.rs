//! Query text and response shapes for the structured-query API.

use serde::{Deserialize, Serialize};

pub(crate) const ORGANIZATION_QUERY: &str = r"
    query GetOrganization($slug: ID!) {
        organization(slug: $slug) {
            id
            name
        }
    }
";

pub(crate) const QUEUE_IMAGE_MUTATION: &str = r"
    mutation UpdateQueueAgentImage($organizationId: ID!, $queueId: ID!, $agentImageRef: String!) {
        clusterQueueUpdate(
            input: {
                organizationId: $organizationId
                id: $queueId
                hostedAgents: { platformSettings: { linux: { agentImageRef: $agentImageRef } } }
            }
        ) {
            clusterQueue {
                id
                key
                hostedAgents {
                    platformSettings {
                        linux {
                            agentImageRef
                        }
                    }
                }
            }
        }
    }
";

/// `{ "query": ..., "variables": ... }` request body.
#[derive(Debug, Serialize)]
pub(crate) struct GraphqlRequest<'a, V: Serialize> {
    pub query: &'a str,
    pub variables: V,
}

#[derive(Debug, Serialize)]
pub(crate) struct OrganizationVariables<'a> {
    pub slug: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QueueImageVariables<'a> {
    pub organization_id: &'a str,
    pub queue_id: &'a str,
    pub agent_image_ref: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OrganizationData {
    pub organization: Option<Organization>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Organization {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QueueImageData {
    pub cluster_queue_update: Option<QueueUpdatePayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QueueUpdatePayload {
    pub cluster_queue: Option<ClusterQueue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ClusterQueue {
    pub id: Option<String>,
    pub key: Option<String>,
    pub hosted_agents: Option<HostedAgents>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HostedAgents {
    pub platform_settings: Option<PlatformSettings>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PlatformSettings {
    pub linux: Option<LinuxSettings>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LinuxSettings {
    pub agent_image_ref: Option<String>,
}

/// Queue identity plus the image reference the remote reports back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmedQueue {
    pub id: String,
    pub key: Option<String>,
    pub agent_image_ref: String,
    /// HTTP status of the mutation response.
    pub status: u16,
}

impl QueueImageData {
    /// Walk to the confirmed queue; `None` if any required level is missing.
    pub(crate) fn into_confirmed(self, status: u16) -> Option<ConfirmedQueue> {
        let queue = self.cluster_queue_update?.cluster_queue?;
        let agent_image_ref = queue
            .hosted_agents?
            .platform_settings?
            .linux?
            .agent_image_ref?;
        Some(ConfirmedQueue {
            id: queue.id?,
            key: queue.key,
            agent_image_ref,
            status,
        })
    }
}

//! Environment overrides applied on top of file configuration.

use crate::error::ConfigError;

use super::{BackendKind, Config};

pub(super) fn apply_runtime_env_overrides<FEnv>(
    config: &mut Config,
    env_lookup: &FEnv,
) -> Result<(), ConfigError>
where
    FEnv: Fn(&str) -> Option<String>,
{
    if let Some(backend) = non_empty(env_lookup, "QUEUE_IMAGE_BACKEND") {
        config.backend = backend
            .parse::<BackendKind>()
            .map_err(|e| ConfigError::Invalid(format!("QUEUE_IMAGE_BACKEND: {e}")))?;
    }
    if let Some(host) = non_empty(env_lookup, "QUEUE_IMAGE_WEB_HOST") {
        config.web.host = host;
    }
    if let Some(url) = non_empty(env_lookup, "QUEUE_IMAGE_GRAPHQL_URL") {
        config.api.graphql_url = url;
    }
    if let Some(timeout) = non_empty(env_lookup, "QUEUE_IMAGE_TIMEOUT_SECS") {
        // Clamp to at least 1 second so a zero never means "no timeout".
        let parsed = timeout.parse::<u64>().map_err(|_| {
            ConfigError::Invalid(format!(
                "invalid QUEUE_IMAGE_TIMEOUT_SECS value `{timeout}`: expected positive integer seconds"
            ))
        })?;
        config.network.timeout_secs = parsed.max(1);
    }
    Ok(())
}

fn non_empty<FEnv>(env_lookup: &FEnv, name: &str) -> Option<String>
where
    FEnv: Fn(&str) -> Option<String>,
{
    env_lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

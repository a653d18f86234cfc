//! Default configuration constants.

/// Web host serving the queue settings pages.
pub(super) const DEFAULT_WEB_HOST: &str = "https://buildkite.com";
/// Env var holding an optional seed session cookie for the web backend.
pub(super) const DEFAULT_SESSION_COOKIE_ENV: &str = "BUILDKITE_SESSION_COOKIE";
/// Structured-query endpoint.
pub(super) const DEFAULT_GRAPHQL_URL: &str = "https://graphql.buildkite.com/v1";
/// Env var holding the API bearer token.
pub(super) const DEFAULT_TOKEN_ENV: &str = "BUILDKITE_API_TOKEN";
/// Default timeout for each HTTP request.
pub(super) const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Config file name looked up locally and under the config root.
pub(super) const CONFIG_FILE_NAME: &str = "queue-image.toml";
/// Directory under the config root holding the global config file.
pub(super) const CONFIG_DIR_NAME: &str = "queue-image";

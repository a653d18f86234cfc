//! Configuration loading from TOML files and environment variables.
//!
//! Config is loaded in this order of precedence (highest wins):
//! 1. Environment variables (`QUEUE_IMAGE_BACKEND`, `QUEUE_IMAGE_WEB_HOST`,
//!    `QUEUE_IMAGE_GRAPHQL_URL`, `QUEUE_IMAGE_TIMEOUT_SECS`)
//! 2. TOML file specified via --config CLI flag
//! 3. ./queue-image.toml in the current directory
//! 4. $XDG_CONFIG_HOME/queue-image/queue-image.toml (or
//!    ~/.config/queue-image/queue-image.toml)
//! 5. Built-in defaults
//!
//! Credentials are never read from config files; the files only name the
//! environment variables that hold them.

use crate::error::ConfigError;
use std::path::{Path, PathBuf};
use std::time::Duration;

mod defaults;
mod env;
mod types;

use defaults::{CONFIG_DIR_NAME, CONFIG_FILE_NAME};
use env::apply_runtime_env_overrides;
pub use types::{ApiConfig, BackendKind, Config, DisplayConfig, NetworkConfig, WebConfig};

impl Config {
    /// Per-request HTTP timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.network.timeout_secs.max(1))
    }
}

/// Load configuration from disk and environment.
///
/// `path_override` is an explicit config file path (from --config flag).
pub fn load_config(path_override: Option<&str>) -> Result<Config, ConfigError> {
    load_config_from_sources(
        path_override,
        |path| std::fs::read_to_string(path),
        |name| std::env::var(name).ok(),
        config_root_dir,
    )
}

fn load_config_from_sources<FRead, FEnv, FRoot>(
    path_override: Option<&str>,
    read_file: FRead,
    env_lookup: FEnv,
    config_root: FRoot,
) -> Result<Config, ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
    FEnv: Fn(&str) -> Option<String>,
    FRoot: Fn() -> Option<PathBuf>,
{
    let text = read_config_text(path_override, &read_file, &config_root)?;
    let mut config: Config = toml::from_str(&text)?;
    apply_runtime_env_overrides(&mut config, &env_lookup)?;
    validate(&config)?;
    Ok(config)
}

fn read_config_text<FRead, FRoot>(
    path_override: Option<&str>,
    read_file: &FRead,
    config_root: &FRoot,
) -> Result<String, ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
    FRoot: Fn() -> Option<PathBuf>,
{
    // An explicit path must exist; implicit locations are best-effort.
    if let Some(p) = path_override {
        return Ok(read_file(Path::new(p))?);
    }
    if let Ok(text) = read_file(Path::new(CONFIG_FILE_NAME)) {
        return Ok(text);
    }
    if let Some(dir) = config_root() {
        let global = dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME);
        if let Ok(text) = read_file(&global) {
            return Ok(text);
        }
    }
    Ok(String::new())
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    for (key, url) in [
        ("web.host", config.web.host.as_str()),
        ("api.graphql_url", config.api.graphql_url.as_str()),
    ] {
        reqwest::Url::parse(url.trim())
            .map_err(|e| ConfigError::Invalid(format!("{key} `{url}` is not a valid URL: {e}")))?;
    }
    if config.api.token_env.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "api.token_env must name an environment variable".to_string(),
        ));
    }
    Ok(())
}

/// Root directory for the global config file.
pub fn config_root_dir() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("XDG_CONFIG_HOME") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }
    dirs::home_dir()
        .map(|home| home.join(".config"))
        .or_else(dirs::config_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io;

    fn load_with(
        path_override: Option<&str>,
        files: &[(&str, &str)],
        env: &[(&str, &str)],
    ) -> Result<Config, ConfigError> {
        let files: HashMap<PathBuf, String> = files
            .iter()
            .map(|(p, t)| (PathBuf::from(p), t.to_string()))
            .collect();
        let env: HashMap<String, String> = env
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        load_config_from_sources(
            path_override,
            |path| {
                files
                    .get(path)
                    .cloned()
                    .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "missing"))
            },
            |name| env.get(name).cloned(),
            || Some(PathBuf::from("/cfg")),
        )
    }

    #[test]
    fn defaults_are_sensible() {
        let c = load_with(None, &[], &[]).unwrap();
        assert_eq!(c.backend, BackendKind::Api);
        assert_eq!(c.web.host, "https://buildkite.com");
        assert_eq!(
            c.web.session_cookie_env.as_deref(),
            Some("BUILDKITE_SESSION_COOKIE")
        );
        assert_eq!(c.api.graphql_url, "https://graphql.buildkite.com/v1");
        assert_eq!(c.api.token_env, "BUILDKITE_API_TOKEN");
        assert_eq!(c.timeout(), Duration::from_secs(30));
        assert!(c.display.color);
    }

    #[test]
    fn parse_partial_toml() {
        let toml = r#"
            backend = "session"

            [web]
            host = "https://ci.example.com"

            [network]
            timeout_secs = 5
        "#;
        let c = load_with(Some("custom.toml"), &[("custom.toml", toml)], &[]).unwrap();
        assert_eq!(c.backend, BackendKind::Session);
        assert_eq!(c.web.host, "https://ci.example.com");
        assert_eq!(c.api.token_env, "BUILDKITE_API_TOKEN");
        assert_eq!(c.network.timeout_secs, 5);
    }

    #[test]
    fn explicit_path_must_exist() {
        let err = load_with(Some("nope.toml"), &[], &[]).unwrap_err();
        assert!(err.to_string().starts_with("io:"), "got: {err}");
    }

    #[test]
    fn local_file_wins_over_global() {
        let c = load_with(
            None,
            &[
                ("queue-image.toml", "backend = \"session\""),
                ("/cfg/queue-image/queue-image.toml", "backend = \"api\""),
            ],
            &[],
        )
        .unwrap();
        assert_eq!(c.backend, BackendKind::Session);
    }

    #[test]
    fn global_file_used_when_no_local() {
        let c = load_with(
            None,
            &[(
                "/cfg/queue-image/queue-image.toml",
                "[api]\ntoken_env = \"CI_TOKEN\"",
            )],
            &[],
        )
        .unwrap();
        assert_eq!(c.api.token_env, "CI_TOKEN");
    }

    #[test]
    fn env_overrides_file_values() {
        let c = load_with(
            Some("c.toml"),
            &[("c.toml", "backend = \"api\"\n[network]\ntimeout_secs = 9")],
            &[
                ("QUEUE_IMAGE_BACKEND", "session"),
                ("QUEUE_IMAGE_GRAPHQL_URL", "http://127.0.0.1:9/graphql"),
                ("QUEUE_IMAGE_TIMEOUT_SECS", "0"),
            ],
        )
        .unwrap();
        assert_eq!(c.backend, BackendKind::Session);
        assert_eq!(c.api.graphql_url, "http://127.0.0.1:9/graphql");
        assert_eq!(c.network.timeout_secs, 1);
    }

    #[test]
    fn invalid_env_values_are_rejected() {
        let err = load_with(None, &[], &[("QUEUE_IMAGE_TIMEOUT_SECS", "soon")]).unwrap_err();
        assert!(err.to_string().contains("QUEUE_IMAGE_TIMEOUT_SECS"), "got: {err}");

        let err = load_with(None, &[], &[("QUEUE_IMAGE_BACKEND", "ftp")]).unwrap_err();
        assert!(err.to_string().contains("unknown backend"), "got: {err}");
    }

    #[test]
    fn invalid_host_is_rejected() {
        let err = load_with(
            Some("c.toml"),
            &[("c.toml", "[web]\nhost = \"not a url\"")],
            &[],
        )
        .unwrap_err();
        assert!(err.to_string().contains("web.host"), "got: {err}");
    }

    #[test]
    fn backend_kind_parses_aliases() {
        assert_eq!("GraphQL".parse::<BackendKind>(), Ok(BackendKind::Api));
        assert_eq!(" web ".parse::<BackendKind>(), Ok(BackendKind::Session));
        assert!("rest".parse::<BackendKind>().is_err());
    }
}

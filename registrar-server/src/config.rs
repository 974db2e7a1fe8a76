use std::net::SocketAddr;
use std::time::Duration;

use registrar_http::DirectoryConfig;

const UPSTREAM_URL: &str = "REGISTRAR_UPSTREAM_URL";
const BIND: &str = "REGISTRAR_BIND";
const SESSION_TOKEN: &str = "REGISTRAR_SESSION_TOKEN";
const UPSTREAM_TIMEOUT_SECS: &str = "REGISTRAR_UPSTREAM_TIMEOUT_SECS";

const DEFAULT_BIND: &str = "127.0.0.1:8080";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("missing environment variable `{0}`")]
    Missing(&'static str),
    #[error("invalid value `{value}` for `{name}`")]
    Invalid { name: &'static str, value: String },
    #[error(transparent)]
    Upstream(#[from] registrar_http::Error),
}

/// Server settings.
#[derive(Debug, Clone)]
pub struct Config {
    pub upstream: DirectoryConfig,
    pub bind: SocketAddr,
    /// Seeds the fallback session used when a request carries no `Authorization` header.
    pub session_token: Option<String>,
}

impl Config {
    /// Reads the settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the settings through `lookup`. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let upstream_url = var(UPSTREAM_URL).ok_or(ConfigError::Missing(UPSTREAM_URL))?;
        let mut upstream = DirectoryConfig::new(&upstream_url)?;
        if let Some(value) = var(UPSTREAM_TIMEOUT_SECS) {
            let secs = value
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::Invalid {
                    name: UPSTREAM_TIMEOUT_SECS,
                    value,
                })?;
            upstream = upstream.with_timeout(Duration::from_secs(secs));
        }

        let bind = var(BIND).unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind: SocketAddr = bind
            .parse()
            .map_err(|_| ConfigError::Invalid { name: BIND, value: bind })?;

        Ok(Self {
            upstream,
            bind,
            session_token: var(SESSION_TOKEN),
        })
    }
}

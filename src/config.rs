//! Application configuration loaded from environment variables.

use serde::Deserialize;
use strum::Display;

use crate::error::AppError;

/// How the `key` query parameter is compared against the configured key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum KeyMatch {
    /// Only the first character of the supplied key is compared against the
    /// configured key. Existing deployments depend on this.
    #[default]
    Legacy,
    /// The full supplied key must equal the configured key.
    Strict,
}

/// What the client sees when a container runtime query fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UpstreamErrors {
    /// Empty 200 response without a body or content type.
    #[default]
    Silent,
    /// 502 with a `RUNTIME_UNAVAILABLE` envelope.
    Envelope,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Authentication ===
    /// Key clients must present as the `key` query parameter.
    pub api_key: String,

    /// Key comparison mode.
    #[serde(default)]
    pub key_match: KeyMatch,

    /// Client-visible behavior on runtime failures.
    #[serde(default)]
    pub upstream_errors: UpstreamErrors,

    // === Server Configuration ===
    /// Address the HTTP server binds to.
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Port for the Prometheus exporter. Disabled when unset.
    #[serde(default)]
    pub metrics_port: Option<u16>,

    // === Container Runtime ===
    /// Docker daemon address (`unix:///...` or `tcp://...`). Local defaults when unset.
    #[serde(default)]
    pub docker_host: Option<String>,

    /// Docker API request timeout in seconds.
    #[serde(default = "default_docker_timeout")]
    pub docker_timeout_secs: u64,

    /// Name or id of the container served by `/api/containers` and `/api/logs`.
    #[serde(default)]
    pub current_container: Option<String>,

    /// Hostname of this process. Inside a container this is the container id.
    #[serde(default)]
    pub hostname: Option<String>,

    /// Number of log lines returned by `/api/logs`, or `all`.
    #[serde(default = "default_log_tail")]
    pub log_tail: String,

    // === Logging ===
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_docker_timeout() -> u64 {
    120
}

fn default_log_tail() -> String {
    "100".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Load configuration and reject invalid settings.
    pub fn load_validated() -> crate::Result<Self> {
        let config = Self::load()?;
        config.validate().map_err(AppError::InvalidConfig)?;
        Ok(config)
    }

    /// Configuration with defaults for everything except the key.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            key_match: KeyMatch::default(),
            upstream_errors: UpstreamErrors::default(),
            host: default_host(),
            port: default_port(),
            metrics_port: None,
            docker_host: None,
            docker_timeout_secs: default_docker_timeout(),
            current_container: None,
            hostname: None,
            log_tail: default_log_tail(),
            rust_log: default_log_level(),
        }
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if self.api_key.is_empty() {
            return Err("API_KEY is required".to_string());
        }

        if self.port == 0 {
            return Err("PORT must be non-zero".to_string());
        }

        if self.log_tail != "all" && self.log_tail.parse::<u64>().is_err() {
            return Err("LOG_TAIL must be a number or \"all\"".to_string());
        }

        Ok(())
    }

    /// Container the runtime resolves as "current", if any.
    pub fn current_container_ref(&self) -> Option<&str> {
        self.current_container
            .as_deref()
            .filter(|name| !name.is_empty())
            .or_else(|| self.hostname.as_deref().filter(|name| !name.is_empty()))
    }
}

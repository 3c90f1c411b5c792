//! Unified error types for the API server.

use serde::Serialize;
use strum::{AsRefStr, Display, EnumString};
use thiserror::Error;

/// Unified error type for the API server.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration loaded but failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Container runtime error.
    #[error("runtime error: {0}")]
    Runtime(#[from] RuntimeError),
}

/// Sentinel codes reported to clients as the envelope `result`.
///
/// The wire form is the SCREAMING_SNAKE_CASE variant name, which existing
/// clients match on verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, EnumString, Serialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Request used a method other than GET.
    MethodNotAllowed,
    /// No usable `key` query parameter was supplied.
    ApiKeyNotFound,
    /// The supplied key does not match the configured one.
    ApiKeyInvalid,
    /// The container runtime failed. Only reported when upstream errors are
    /// surfaced as envelopes.
    RuntimeUnavailable,
}

impl std::error::Error for ErrorCode {}

/// Container runtime query errors.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Neither a configured container nor a hostname identifies the current container.
    #[error("no current container configured")]
    NoCurrentContainer,

    /// The daemon returned no stats sample for the container.
    #[error("no stats returned for container {container}")]
    EmptyStats {
        /// Container the stats were requested for.
        container: String,
    },

    /// Docker Engine API error.
    #[error("docker error: {0}")]
    Docker(#[from] bollard::errors::Error),

    /// Failure injected by the mock runtime.
    #[error("mock runtime failure: {0}")]
    Mock(String),
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn error_codes_use_legacy_wire_names() {
        assert_eq!(ErrorCode::MethodNotAllowed.as_ref(), "METHOD_NOT_ALLOWED");
        assert_eq!(ErrorCode::ApiKeyNotFound.to_string(), "API_KEY_NOT_FOUND");
        assert_eq!(
            serde_json::to_string(&ErrorCode::ApiKeyInvalid).unwrap(),
            "\"API_KEY_INVALID\""
        );
    }

    #[test]
    fn runtime_errors_convert_into_app_errors() {
        let err: AppError = RuntimeError::NoCurrentContainer.into();
        assert_eq!(err.to_string(), "runtime error: no current container configured");
    }

    #[test]
    fn error_codes_parse_from_wire_names() {
        assert_eq!(
            ErrorCode::from_str("RUNTIME_UNAVAILABLE").unwrap(),
            ErrorCode::RuntimeUnavailable
        );
        assert!(ErrorCode::from_str("NOPE").is_err());
    }
}

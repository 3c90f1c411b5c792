//! HTTP API handlers.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::State,
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::{Config, UpstreamErrors};
use crate::error::{ErrorCode, RuntimeError};
use crate::metrics::{self, OUTCOME_OK, OUTCOME_REJECTED, OUTCOME_RUNTIME_ERROR};
use crate::runtime::ContainerRuntime;

use super::auth::ApiKeyGate;
use super::envelope::Envelope;

/// Application state shared with handlers.
///
/// Everything here is fixed at startup.
#[derive(Clone)]
pub struct AppState {
    /// Key check for the authenticated endpoints.
    pub gate: ApiKeyGate,
    /// Container runtime the queries go to.
    pub runtime: Arc<dyn ContainerRuntime>,
    /// Client-visible behavior on runtime failures.
    pub upstream_errors: UpstreamErrors,
}

impl AppState {
    /// Create app state from config and a runtime.
    pub fn new(config: &Config, runtime: Arc<dyn ContainerRuntime>) -> Self {
        Self {
            gate: ApiKeyGate::new(config.api_key.clone(), config.key_match),
            runtime,
            upstream_errors: config.upstream_errors,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("gate", &self.gate)
            .field("upstream_errors", &self.upstream_errors)
            .finish_non_exhaustive()
    }
}

/// Why a request did not produce a result.
#[derive(Debug)]
enum Failure {
    Rejected(ErrorCode),
    Runtime(RuntimeError),
}

/// Status handler - public, GET only.
pub async fn status(State(state): State<AppState>, method: Method, uri: Uri) -> Response {
    let started = Instant::now();
    let outcome = if method == Method::GET {
        Ok(())
    } else {
        Err(Failure::Rejected(ErrorCode::MethodNotAllowed))
    };
    respond(&state, "status", &method, &uri, started, outcome)
}

/// Current container.
pub async fn containers(State(state): State<AppState>, method: Method, uri: Uri) -> Response {
    guarded(&state, "containers", &method, &uri, |runtime| async move {
        runtime.container().await
    })
    .await
}

/// Local images.
pub async fn images(State(state): State<AppState>, method: Method, uri: Uri) -> Response {
    guarded(&state, "images", &method, &uri, |runtime| async move {
        runtime.images().await
    })
    .await
}

/// Volumes.
pub async fn volumes(State(state): State<AppState>, method: Method, uri: Uri) -> Response {
    guarded(&state, "volumes", &method, &uri, |runtime| async move {
        runtime.volumes().await
    })
    .await
}

/// Networks.
pub async fn networks(State(state): State<AppState>, method: Method, uri: Uri) -> Response {
    guarded(&state, "networks", &method, &uri, |runtime| async move {
        runtime.networks().await
    })
    .await
}

/// Resource usage of the current container.
pub async fn stats(State(state): State<AppState>, method: Method, uri: Uri) -> Response {
    guarded(&state, "stats", &method, &uri, |runtime| async move {
        runtime.stats().await
    })
    .await
}

/// Logs of the current container. `logs` is only queried once the container resolved.
pub async fn logs(State(state): State<AppState>, method: Method, uri: Uri) -> Response {
    guarded(&state, "logs", &method, &uri, |runtime| async move {
        let container = runtime.container().await?;
        runtime.logs(&container).await
    })
    .await
}

/// Run the key gate, then `query` against the runtime.
async fn guarded<T, F, Fut>(
    state: &AppState,
    endpoint: &'static str,
    method: &Method,
    uri: &Uri,
    query: F,
) -> Response
where
    T: Serialize,
    F: FnOnce(Arc<dyn ContainerRuntime>) -> Fut,
    Fut: Future<Output = Result<T, RuntimeError>>,
{
    let started = Instant::now();
    let outcome = match state.gate.check(method, uri.query()) {
        Ok(()) => query(Arc::clone(&state.runtime))
            .await
            .map_err(Failure::Runtime),
        Err(code) => Err(Failure::Rejected(code)),
    };
    respond(state, endpoint, method, uri, started, outcome)
}

/// Build the response and write the request's single log line.
///
/// Only the path is logged; the query string carries the key.
fn respond<T: Serialize>(
    state: &AppState,
    endpoint: &'static str,
    method: &Method,
    uri: &Uri,
    started: Instant,
    outcome: Result<T, Failure>,
) -> Response {
    let path = uri.path();

    match outcome {
        Ok(result) => {
            info!("{} {}", method, path);
            metrics::record_request(endpoint, OUTCOME_OK, started);
            Envelope::Ok(result).into_response()
        }
        Err(Failure::Rejected(code)) => {
            warn!("{} {} {}", method, path, code);
            metrics::record_request(endpoint, OUTCOME_REJECTED, started);
            Envelope::<()>::Err(code).into_response()
        }
        Err(Failure::Runtime(err)) => {
            error!("{} {} {}", method, path, err);
            metrics::record_request(endpoint, OUTCOME_RUNTIME_ERROR, started);
            match state.upstream_errors {
                // Nothing beyond the status line; clients see an empty reply.
                UpstreamErrors::Silent => StatusCode::OK.into_response(),
                UpstreamErrors::Envelope => {
                    Envelope::<()>::Err(ErrorCode::RuntimeUnavailable).into_response()
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;

    #[test]
    fn app_state_takes_key_settings_from_config() {
        let mut config = Config::with_api_key("a");
        config.upstream_errors = UpstreamErrors::Envelope;
        let state = AppState::new(&config, Arc::new(MockRuntime::new()));

        assert_eq!(state.upstream_errors, UpstreamErrors::Envelope);
        assert_eq!(state.gate.check(&Method::GET, Some("key=a")), Ok(()));
        assert!(format!("{state:?}").contains("AppState"));
    }

    #[test]
    fn silent_runtime_failure_has_no_body_headers() {
        let state = AppState::new(&Config::with_api_key("a"), Arc::new(MockRuntime::new()));
        let response = respond::<()>(
            &state,
            "images",
            &Method::GET,
            &Uri::from_static("/api/images?key=a"),
            Instant::now(),
            Err(Failure::Runtime(RuntimeError::Mock("down".to_string()))),
        );

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get("content-type").is_none());
    }
}

//! Integration tests against a real Docker daemon.
//!
//! These tests require a reachable Docker daemon (DOCKER_HOST or the local
//! socket) and a CURRENT_CONTAINER naming a running container.
//! Run with: cargo test --test integration -- --ignored

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use dockwatch_api::api::{create_router, AppState};
use dockwatch_api::config::Config;
use dockwatch_api::runtime::{ContainerRuntime, DockerRuntime};
use tower::ServiceExt;

/// Get a test config from environment.
fn test_config() -> Option<Config> {
    dotenvy::dotenv().ok();

    let current = std::env::var("CURRENT_CONTAINER").ok()?;

    let mut config = Config::with_api_key("a");
    config.docker_host = std::env::var("DOCKER_HOST").ok();
    config.current_container = Some(current);
    Some(config)
}

/// The current container resolves and matches its logs target.
#[tokio::test]
#[ignore = "requires a Docker daemon and CURRENT_CONTAINER"]
async fn test_container_and_logs() {
    let config = match test_config() {
        Some(c) => c,
        None => {
            println!("Skipping: CURRENT_CONTAINER not set");
            return;
        }
    };

    let runtime = DockerRuntime::connect(&config).expect("docker client");

    let container = runtime.container().await;
    assert!(container.is_ok(), "Failed to inspect: {:?}", container.err());
    let container = container.unwrap();
    assert!(!container.id.is_empty(), "Container id should be set");

    let logs = runtime.logs(&container).await;
    assert!(logs.is_ok(), "Failed to fetch logs: {:?}", logs.err());
}

/// Listing queries succeed on any daemon.
#[tokio::test]
#[ignore = "requires a Docker daemon and CURRENT_CONTAINER"]
async fn test_list_queries() {
    let config = match test_config() {
        Some(c) => c,
        None => {
            println!("Skipping: CURRENT_CONTAINER not set");
            return;
        }
    };

    let runtime = DockerRuntime::connect(&config).expect("docker client");

    assert!(runtime.images().await.is_ok());
    assert!(runtime.volumes().await.is_ok());

    let networks = runtime.networks().await.expect("networks");
    // Every daemon has the default bridge network.
    assert!(networks.iter().any(|n| n.name == "bridge"), "{networks:?}");
}

/// Stats come back for a running container.
#[tokio::test]
#[ignore = "requires a Docker daemon and CURRENT_CONTAINER"]
async fn test_stats() {
    let config = match test_config() {
        Some(c) => c,
        None => {
            println!("Skipping: CURRENT_CONTAINER not set");
            return;
        }
    };

    let runtime = DockerRuntime::connect(&config).expect("docker client");
    let stats = runtime.stats().await;
    assert!(stats.is_ok(), "Failed to get stats: {:?}", stats.err());
    assert!(stats.unwrap().cpu_percent >= 0.0);
}

/// The full router serves real data.
#[tokio::test]
#[ignore = "requires a Docker daemon and CURRENT_CONTAINER"]
async fn test_router_end_to_end() {
    let config = match test_config() {
        Some(c) => c,
        None => {
            println!("Skipping: CURRENT_CONTAINER not set");
            return;
        }
    };

    let runtime = Arc::new(DockerRuntime::connect(&config).expect("docker client"));
    let app = create_router(AppState::new(&config, runtime));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/containers?key=a")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["ok"], "true");
    assert!(json["result"]["id"].is_string());
}

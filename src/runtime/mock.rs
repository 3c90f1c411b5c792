//! Mock container runtime for unit testing.
//!
//! This module provides a runtime that can be used in tests
//! without a Docker daemon. Every query is recorded in a call journal so
//! tests can assert on ordering.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::RuntimeError;

use super::types::{
    ContainerInfo, ImageInfo, LogData, LogLine, LogStream, NetworkInfo, StatsInfo, VolumeInfo,
};
use super::ContainerRuntime;

/// Configuration for mock runtime behavior.
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// Whether to fail container requests.
    pub fail_container: bool,
    /// Whether to fail image requests.
    pub fail_images: bool,
    /// Whether to fail volume requests.
    pub fail_volumes: bool,
    /// Whether to fail network requests.
    pub fail_networks: bool,
    /// Whether to fail stats requests.
    pub fail_stats: bool,
    /// Whether to fail log requests.
    pub fail_logs: bool,
}

/// Mock container runtime for testing.
#[derive(Debug, Clone)]
pub struct MockRuntime {
    /// Mock configuration.
    config: MockConfig,
    /// Names of the queries made, in call order.
    calls: Arc<Mutex<Vec<&'static str>>>,
    /// Container returned by `container()`.
    container: ContainerInfo,
}

impl MockRuntime {
    /// Create a new mock runtime with default configuration.
    pub fn new() -> Self {
        Self::with_config(MockConfig::default())
    }

    /// Create a mock runtime with custom configuration.
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            config,
            calls: Arc::new(Mutex::new(Vec::new())),
            container: ContainerInfo {
                id: "0123456789ab".to_string(),
                name: "mock".to_string(),
                image: "mock:latest".to_string(),
                state: "running".to_string(),
                running: true,
                created: Some("2024-01-01T00:00:00Z".to_string()),
                started_at: Some("2024-01-01T00:00:01Z".to_string()),
            },
        }
    }

    /// Queries made so far, in call order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    /// Forget recorded calls.
    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    async fn enter(&self, call: &'static str, fail: bool) -> Result<(), RuntimeError> {
        self.calls.lock().unwrap().push(call);

        if fail {
            return Err(RuntimeError::Mock(format!("{call} failure")));
        }
        Ok(())
    }
}

impl Default for MockRuntime {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContainerRuntime for MockRuntime {
    async fn container(&self) -> Result<ContainerInfo, RuntimeError> {
        self.enter("container", self.config.fail_container).await?;
        Ok(self.container.clone())
    }

    async fn images(&self) -> Result<Vec<ImageInfo>, RuntimeError> {
        self.enter("images", self.config.fail_images).await?;
        Ok(vec![ImageInfo {
            id: "sha256:1111".to_string(),
            repo_tags: vec!["mock:latest".to_string()],
            size: 7_340_032,
            created: 1_704_067_200,
        }])
    }

    async fn volumes(&self) -> Result<Vec<VolumeInfo>, RuntimeError> {
        self.enter("volumes", self.config.fail_volumes).await?;
        Ok(vec![VolumeInfo {
            name: "data".to_string(),
            driver: "local".to_string(),
            mountpoint: "/var/lib/docker/volumes/data/_data".to_string(),
            created_at: None,
        }])
    }

    async fn networks(&self) -> Result<Vec<NetworkInfo>, RuntimeError> {
        self.enter("networks", self.config.fail_networks).await?;
        Ok(vec![NetworkInfo {
            id: "n1".to_string(),
            name: "bridge".to_string(),
            driver: "bridge".to_string(),
            scope: "local".to_string(),
            internal: false,
        }])
    }

    async fn stats(&self) -> Result<StatsInfo, RuntimeError> {
        self.enter("stats", self.config.fail_stats).await?;
        Ok(StatsInfo {
            cpu_percent: 12.5,
            memory_usage: 256,
            memory_limit: 1024,
            memory_percent: 25.0,
            network_rx_bytes: 10,
            network_tx_bytes: 20,
            pids: 3,
        })
    }

    async fn logs(&self, container: &ContainerInfo) -> Result<LogData, RuntimeError> {
        self.enter("logs", self.config.fail_logs).await?;
        Ok(LogData(vec![LogLine {
            stream: LogStream::Stdout,
            message: format!("hello from {}", container.name),
        }]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_calls_in_order() {
        let runtime = MockRuntime::new();
        let container = runtime.container().await.unwrap();
        let logs = runtime.logs(&container).await.unwrap();

        assert_eq!(runtime.calls(), vec!["container", "logs"]);
        assert_eq!(logs.0[0].message, "hello from mock");
    }

    #[tokio::test]
    async fn configured_failures_are_returned_and_recorded() {
        let runtime = MockRuntime::with_config(MockConfig {
            fail_images: true,
            ..Default::default()
        });

        assert!(runtime.images().await.is_err());
        assert!(runtime.volumes().await.is_ok());
        assert_eq!(runtime.calls(), vec!["images", "volumes"]);

        runtime.clear();
        assert!(runtime.calls().is_empty());
    }
}

//! Container runtime queries.
//!
//! This module handles:
//! - The `ContainerRuntime` trait the HTTP handlers call into
//! - Result types returned by the queries
//! - Docker Engine backend
//! - Mock backend for testing

pub mod docker;
pub mod mock;
pub mod types;

use async_trait::async_trait;

use crate::error::RuntimeError;

pub use docker::DockerRuntime;
pub use mock::{MockConfig, MockRuntime};
pub use types::{
    ContainerInfo, ImageInfo, LogData, LogLine, LogStream, NetworkInfo, StatsInfo, VolumeInfo,
};

/// Read-only queries against a container runtime.
///
/// Implementations decide what the "current" container is; callers never
/// name one.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Resolve the current container.
    async fn container(&self) -> Result<ContainerInfo, RuntimeError>;

    /// List local images.
    async fn images(&self) -> Result<Vec<ImageInfo>, RuntimeError>;

    /// List volumes.
    async fn volumes(&self) -> Result<Vec<VolumeInfo>, RuntimeError>;

    /// List networks.
    async fn networks(&self) -> Result<Vec<NetworkInfo>, RuntimeError>;

    /// Resource usage of the current container.
    async fn stats(&self) -> Result<StatsInfo, RuntimeError>;

    /// Recent output of `container`.
    async fn logs(&self, container: &ContainerInfo) -> Result<LogData, RuntimeError>;
}

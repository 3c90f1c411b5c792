//! Docker Engine backend.

use std::time::Duration;

use async_trait::async_trait;
use bollard::container::{
    InspectContainerOptions, LogOutput, LogsOptions, Stats, StatsOptions,
};
use bollard::image::ListImagesOptions;
use bollard::models::{ContainerInspectResponse, ImageSummary, Network, Volume};
use bollard::network::ListNetworksOptions;
use bollard::volume::ListVolumesOptions;
use bollard::{Docker, API_DEFAULT_VERSION};
use futures::TryStreamExt;
use tracing::{debug, instrument};

use crate::config::Config;
use crate::error::RuntimeError;

use super::types::{
    ContainerInfo, ImageInfo, LogData, LogLine, LogStream, NetworkInfo, StatsInfo, VolumeInfo,
};
use super::ContainerRuntime;

/// Container runtime backed by a Docker daemon.
#[derive(Debug, Clone)]
pub struct DockerRuntime {
    /// Docker API client.
    docker: Docker,
    /// Name or id of the current container.
    current: Option<String>,
    /// `tail` value passed to the logs endpoint.
    log_tail: String,
}

impl DockerRuntime {
    /// Connect to the daemon named by `docker_host`, or the local defaults.
    pub fn connect(config: &Config) -> Result<Self, RuntimeError> {
        let timeout = config.docker_timeout_secs;

        let docker = match config.docker_host.as_deref() {
            Some(host) if host.starts_with("tcp://") || host.starts_with("http://") => {
                let addr = host.replacen("tcp://", "http://", 1);
                Docker::connect_with_http(&addr, timeout, API_DEFAULT_VERSION)?
            }
            Some(host) => {
                let path = host.trim_start_matches("unix://");
                Docker::connect_with_socket(path, timeout, API_DEFAULT_VERSION)?
            }
            None => Docker::connect_with_local_defaults()?
                .with_timeout(Duration::from_secs(timeout)),
        };

        debug!(host = ?config.docker_host, "Docker client configured");

        Ok(Self {
            docker,
            current: config.current_container_ref().map(str::to_string),
            log_tail: config.log_tail.clone(),
        })
    }

    /// Name or id of the current container.
    fn current(&self) -> Result<&str, RuntimeError> {
        self.current
            .as_deref()
            .ok_or(RuntimeError::NoCurrentContainer)
    }
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    #[instrument(skip(self))]
    async fn container(&self) -> Result<ContainerInfo, RuntimeError> {
        let inspect = self
            .docker
            .inspect_container(self.current()?, None::<InspectContainerOptions>)
            .await?;
        Ok(container_info(inspect))
    }

    #[instrument(skip(self))]
    async fn images(&self) -> Result<Vec<ImageInfo>, RuntimeError> {
        let options = ListImagesOptions::<String> {
            all: false,
            ..Default::default()
        };
        let images = self.docker.list_images(Some(options)).await?;
        Ok(images.into_iter().map(image_info).collect())
    }

    #[instrument(skip(self))]
    async fn volumes(&self) -> Result<Vec<VolumeInfo>, RuntimeError> {
        let response = self
            .docker
            .list_volumes(None::<ListVolumesOptions<String>>)
            .await?;
        Ok(response
            .volumes
            .unwrap_or_default()
            .into_iter()
            .map(volume_info)
            .collect())
    }

    #[instrument(skip(self))]
    async fn networks(&self) -> Result<Vec<NetworkInfo>, RuntimeError> {
        let networks = self
            .docker
            .list_networks(None::<ListNetworksOptions<String>>)
            .await?;
        Ok(networks.into_iter().map(network_info).collect())
    }

    #[instrument(skip(self))]
    async fn stats(&self) -> Result<StatsInfo, RuntimeError> {
        let current = self.current()?;
        // Non-streaming, not one-shot: the daemon waits for a second sample so
        // precpu_stats is populated.
        let options = StatsOptions {
            stream: false,
            one_shot: false,
        };
        let mut stream = Box::pin(self.docker.stats(current, Some(options)));

        match stream.try_next().await? {
            Some(sample) => Ok(stats_info(&sample)),
            None => Err(RuntimeError::EmptyStats {
                container: current.to_string(),
            }),
        }
    }

    #[instrument(skip(self, container), fields(container = %container.name))]
    async fn logs(&self, container: &ContainerInfo) -> Result<LogData, RuntimeError> {
        let target = if container.id.is_empty() {
            container.name.as_str()
        } else {
            container.id.as_str()
        };
        let options = LogsOptions::<String> {
            stdout: true,
            stderr: true,
            tail: self.log_tail.clone(),
            ..Default::default()
        };

        let frames: Vec<LogOutput> = self
            .docker
            .logs(target, Some(options))
            .try_collect()
            .await?;

        Ok(LogData(frames.into_iter().flat_map(log_lines).collect()))
    }
}

fn container_info(inspect: ContainerInspectResponse) -> ContainerInfo {
    let state = inspect.state.unwrap_or_default();
    ContainerInfo {
        id: inspect.id.unwrap_or_default(),
        name: inspect
            .name
            .unwrap_or_default()
            .trim_start_matches('/')
            .to_string(),
        image: inspect
            .config
            .and_then(|config| config.image)
            .or(inspect.image)
            .unwrap_or_default(),
        state: state.status.map(|s| s.to_string()).unwrap_or_default(),
        running: state.running.unwrap_or(false),
        created: inspect.created,
        started_at: state.started_at,
    }
}

fn image_info(image: ImageSummary) -> ImageInfo {
    ImageInfo {
        id: image.id,
        repo_tags: image.repo_tags,
        size: image.size,
        created: image.created,
    }
}

fn volume_info(volume: Volume) -> VolumeInfo {
    VolumeInfo {
        name: volume.name,
        driver: volume.driver,
        mountpoint: volume.mountpoint,
        created_at: volume.created_at,
    }
}

fn network_info(network: Network) -> NetworkInfo {
    NetworkInfo {
        id: network.id.unwrap_or_default(),
        name: network.name.unwrap_or_default(),
        driver: network.driver.unwrap_or_default(),
        scope: network.scope.unwrap_or_default(),
        internal: network.internal.unwrap_or(false),
    }
}

fn stats_info(sample: &Stats) -> StatsInfo {
    let cpu = &sample.cpu_stats;
    let precpu = &sample.precpu_stats;
    let online_cpus = cpu.online_cpus.unwrap_or_else(|| {
        cpu.cpu_usage
            .percpu_usage
            .as_ref()
            .map_or(1, |per_cpu| per_cpu.len() as u64)
    });

    let memory_usage = sample.memory_stats.usage.unwrap_or(0);
    let memory_limit = sample.memory_stats.limit.unwrap_or(0);

    let (network_rx_bytes, network_tx_bytes) = sample
        .networks
        .as_ref()
        .map(|networks| {
            networks.values().fold((0, 0), |(rx, tx), net| {
                (rx + net.rx_bytes, tx + net.tx_bytes)
            })
        })
        .unwrap_or((0, 0));

    StatsInfo {
        cpu_percent: StatsInfo::cpu_percent_of(
            cpu.cpu_usage.total_usage,
            precpu.cpu_usage.total_usage,
            cpu.system_cpu_usage.unwrap_or(0),
            precpu.system_cpu_usage.unwrap_or(0),
            online_cpus,
        ),
        memory_usage,
        memory_limit,
        memory_percent: StatsInfo::memory_percent_of(memory_usage, memory_limit),
        network_rx_bytes,
        network_tx_bytes,
        pids: sample.pids_stats.current.unwrap_or(0),
    }
}

fn log_lines(frame: LogOutput) -> Vec<LogLine> {
    let (stream, message) = match frame {
        LogOutput::StdOut { message } => (LogStream::Stdout, message),
        LogOutput::StdErr { message } => (LogStream::Stderr, message),
        LogOutput::StdIn { message } => (LogStream::Stdin, message),
        LogOutput::Console { message } => (LogStream::Console, message),
    };

    String::from_utf8_lossy(&message)
        .lines()
        .map(|line| LogLine {
            stream,
            message: line.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bollard::models::{ContainerConfig, ContainerState, ContainerStateStatusEnum};

    #[test]
    fn container_info_strips_name_slash_and_prefers_config_image() {
        let inspect = ContainerInspectResponse {
            id: Some("3f2a9c".to_string()),
            name: Some("/web".to_string()),
            image: Some("sha256:abc".to_string()),
            config: Some(ContainerConfig {
                image: Some("nginx:1.27".to_string()),
                ..Default::default()
            }),
            state: Some(ContainerState {
                status: Some(ContainerStateStatusEnum::RUNNING),
                running: Some(true),
                ..Default::default()
            }),
            ..Default::default()
        };

        let info = container_info(inspect);
        assert_eq!(info.id, "3f2a9c");
        assert_eq!(info.name, "web");
        assert_eq!(info.image, "nginx:1.27");
        assert_eq!(info.state, "running");
        assert!(info.running);
    }

    #[test]
    fn network_info_defaults_missing_fields() {
        let info = network_info(Network {
            name: Some("bridge".to_string()),
            ..Default::default()
        });
        assert_eq!(info.name, "bridge");
        assert_eq!(info.id, "");
        assert!(!info.internal);
    }

    #[test]
    fn log_frames_split_into_lines() {
        let lines = log_lines(LogOutput::StdErr {
            message: "first\nsecond\n".into(),
        });
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].stream, LogStream::Stderr);
        assert_eq!(lines[1].message, "second");
    }

    #[test]
    fn missing_current_container_is_reported() {
        let runtime = DockerRuntime {
            docker: Docker::connect_with_http("http://127.0.0.1:2375", 5, API_DEFAULT_VERSION)
                .unwrap(),
            current: None,
            log_tail: "100".to_string(),
        };
        assert!(matches!(
            runtime.current(),
            Err(RuntimeError::NoCurrentContainer)
        ));
    }
}

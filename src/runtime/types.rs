//! Data returned by container runtime queries.

use serde::{Deserialize, Serialize};

/// The current container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerInfo {
    /// Full container id.
    pub id: String,
    /// Container name without the leading slash.
    pub name: String,
    /// Image reference the container was created from.
    pub image: String,
    /// Lifecycle state (`running`, `exited`, ...).
    pub state: String,
    /// Whether the container is running.
    pub running: bool,
    /// Creation timestamp (RFC 3339).
    pub created: Option<String>,
    /// Last start timestamp (RFC 3339).
    pub started_at: Option<String>,
}

/// A locally stored image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageInfo {
    /// Image id (`sha256:...`).
    pub id: String,
    /// Repository tags.
    pub repo_tags: Vec<String>,
    /// Size in bytes.
    pub size: i64,
    /// Creation time as a unix timestamp.
    pub created: i64,
}

/// A named volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeInfo {
    /// Volume name.
    pub name: String,
    /// Volume driver.
    pub driver: String,
    /// Mount point on the host.
    pub mountpoint: String,
    /// Creation timestamp.
    pub created_at: Option<String>,
}

/// A network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkInfo {
    /// Network id.
    pub id: String,
    /// Network name.
    pub name: String,
    /// Network driver (`bridge`, `overlay`, ...).
    pub driver: String,
    /// Scope (`local`, `swarm`, `global`).
    pub scope: String,
    /// Whether the network is internal only.
    pub internal: bool,
}

/// Resource usage snapshot of the current container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsInfo {
    /// CPU usage across all cores, 0-100 per core.
    pub cpu_percent: f64,
    /// Memory usage in bytes.
    pub memory_usage: u64,
    /// Memory limit in bytes.
    pub memory_limit: u64,
    /// Memory usage relative to the limit.
    pub memory_percent: f64,
    /// Bytes received over all interfaces.
    pub network_rx_bytes: u64,
    /// Bytes sent over all interfaces.
    pub network_tx_bytes: u64,
    /// Number of processes.
    pub pids: u64,
}

/// Output stream a log line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStream {
    Stdout,
    Stderr,
    Stdin,
    Console,
}

/// One line of container output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogLine {
    /// Source stream.
    pub stream: LogStream,
    /// Line content.
    pub message: String,
}

/// Recent output of a container, oldest line first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogData(pub Vec<LogLine>);

impl LogData {
    /// Number of lines.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there is no output.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl StatsInfo {
    /// Memory usage as a percentage of the limit. Zero when there is no limit.
    pub fn memory_percent_of(usage: u64, limit: u64) -> f64 {
        if limit == 0 {
            return 0.0;
        }
        usage as f64 / limit as f64 * 100.0
    }

    /// CPU percentage from two consecutive samples, the way `docker stats` computes it.
    pub fn cpu_percent_of(
        total_usage: u64,
        prev_total_usage: u64,
        system_usage: u64,
        prev_system_usage: u64,
        online_cpus: u64,
    ) -> f64 {
        let cpu_delta = total_usage.saturating_sub(prev_total_usage);
        let system_delta = system_usage.saturating_sub(prev_system_usage);
        if cpu_delta == 0 || system_delta == 0 {
            return 0.0;
        }
        cpu_delta as f64 / system_delta as f64 * online_cpus.max(1) as f64 * 100.0
    }
}

//! Configuration loading and types.
//!
//! A single YAML file describes one process: the `node` section is required
//! when running a cluster member, `monitor` when running the failure detector.
//! Every field except the node id and listen address has a default.

use crate::membership::{NodeId, PeerTable};
use crate::node::NodeSettings;
use crate::node::types::{DEFAULT_ELECTION_GRACE, DEFAULT_HEARTBEAT_INTERVAL};
use crate::monitor::DEFAULT_HEARTBEAT_TIMEOUT;
use crate::transport::http::DEFAULT_REQUEST_TIMEOUT;

use anyhow::{Context, bail};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Cluster member settings. Absent for a monitor-only process.
    #[serde(default)]
    pub node: Option<NodeConfig>,

    #[serde(default)]
    pub monitor: MonitorConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeConfig {
    pub id: NodeId,

    /// Address the node's HTTP server binds to. Peers must reach it as listed
    /// in their own `peers` tables.
    pub listen: String,

    /// Every other member, keyed by id.
    #[serde(default)]
    pub peers: BTreeMap<NodeId, String>,

    /// Monitor address. Heartbeats are disabled when unset.
    #[serde(default)]
    pub monitor: Option<String>,

    #[serde(default = "default_heartbeat_interval_ms")]
    pub heartbeat_interval_ms: u64,

    #[serde(default = "default_election_grace_ms")]
    pub election_grace_ms: u64,

    /// Upper bound on every outbound peer call.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl NodeConfig {
    /// Rejects a peer table that lists the node itself, and zero durations
    /// that would stop heartbeats or fail every peer call.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.peers.contains_key(&self.id) {
            bail!("node {} lists itself in its peer table", self.id);
        }
        if self.heartbeat_interval_ms == 0 {
            bail!("node {}: heartbeat_interval_ms must be greater than zero", self.id);
        }
        if self.request_timeout_ms == 0 {
            bail!("node {}: request_timeout_ms must be greater than zero", self.id);
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn settings(&self) -> NodeSettings {
        let peers = PeerTable::new(
            self.id,
            self.peers.iter().map(|(id, addr)| (*id, addr.clone())),
        );

        let settings = NodeSettings::new(self.id, peers)
            .with_heartbeat_interval(Duration::from_millis(self.heartbeat_interval_ms))
            .with_election_grace(Duration::from_millis(self.election_grace_ms));

        match &self.monitor {
            Some(monitor) => settings.with_monitor(monitor.clone()),
            None => settings,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    #[serde(default = "default_monitor_listen")]
    pub listen: String,

    /// A node whose last heartbeat is older than this is reported as failed.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl MonitorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            listen: default_monitor_listen(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_heartbeat_interval_ms() -> u64 {
    DEFAULT_HEARTBEAT_INTERVAL.as_millis() as u64
}

fn default_election_grace_ms() -> u64 {
    DEFAULT_ELECTION_GRACE.as_millis() as u64
}

fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT.as_millis() as u64
}

fn default_monitor_listen() -> String {
    "127.0.0.1:8004".to_string()
}

fn default_timeout_ms() -> u64 {
    DEFAULT_HEARTBEAT_TIMEOUT.as_millis() as u64
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Reads and validates a YAML configuration file.
pub fn load_config<P: AsRef<Path>>(path: P) -> anyhow::Result<Config> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;

    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let config: Config = serde_yaml::from_str(contents)?;

    if let Some(node) = &config.node {
        node.validate()?;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NODE_YAML: &str = r#"
node:
  id: 1
  listen: "127.0.0.1:8001"
  peers:
    2: "127.0.0.1:8002"
    3: "127.0.0.1:8003"
  monitor: "127.0.0.1:8004"
  election_grace_ms: 500
logging:
  level: debug
"#;

    #[test]
    fn test_node_config_with_defaults() {
        let config = parse_config(NODE_YAML).unwrap();
        let node = config.node.unwrap();

        assert_eq!(node.id, NodeId(1));
        assert_eq!(node.peers.len(), 2);
        assert_eq!(node.heartbeat_interval_ms, 2000);
        assert_eq!(node.election_grace_ms, 500);
        assert_eq!(node.request_timeout(), Duration::from_secs(1));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.monitor.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_node_settings_conversion() {
        let settings = parse_config(NODE_YAML).unwrap().node.unwrap().settings();

        assert_eq!(settings.id, NodeId(1));
        assert_eq!(settings.peers.address(NodeId(3)), Some("127.0.0.1:8003"));
        assert_eq!(settings.monitor.as_deref(), Some("127.0.0.1:8004"));
        assert_eq!(settings.election_grace, Duration::from_millis(500));
    }

    #[test]
    fn test_self_in_peer_table_is_rejected() {
        let yaml = r#"
node:
  id: 2
  listen: "127.0.0.1:8002"
  peers:
    1: "127.0.0.1:8001"
    2: "127.0.0.1:8002"
"#;

        let err = parse_config(yaml).unwrap_err();
        assert!(err.to_string().contains("lists itself"));
    }

    #[test]
    fn test_zero_durations_are_rejected() {
        let base = "node:\n  id: 1\n  listen: \"127.0.0.1:8001\"\n";

        let err = parse_config(&format!("{}  heartbeat_interval_ms: 0\n", base)).unwrap_err();
        assert!(err.to_string().contains("heartbeat_interval_ms"));

        let err = parse_config(&format!("{}  request_timeout_ms: 0\n", base)).unwrap_err();
        assert!(err.to_string().contains("request_timeout_ms"));

        assert!(parse_config(&format!("{}  election_grace_ms: 0\n", base)).is_ok());
    }

    #[test]
    fn test_monitor_only_config() {
        let config = parse_config("monitor:\n  listen: \"0.0.0.0:9000\"\n").unwrap();

        assert!(config.node.is_none());
        assert_eq!(config.monitor.listen, "0.0.0.0:9000");
        assert_eq!(config.monitor.timeout_ms, 5000);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_missing_node_id_fails() {
        assert!(parse_config("node:\n  listen: \"127.0.0.1:8001\"\n").is_err());
    }
}

//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::net::PeerIdentity;
use crate::tracker::retry::{AcceptPolicy, RetryBudget};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PeerlinkConfig {
    /// Listener configuration (bind address, expected peers).
    pub listener: ListenerConfig,

    /// Accept timeout and retry budget.
    pub accept: AcceptConfig,

    /// Outbound client settings.
    pub client: ClientConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:7878").
    pub bind_address: String,

    /// Number of slots of a multi-client server.
    pub clients: usize,

    /// Peers expected in advance, by IP. Index-aligned with the slots; the
    /// single-client server uses the first entry only.
    pub expected_peers: Vec<String>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:7878".to_string(),
            clients: 1,
            expected_peers: Vec::new(),
        }
    }
}

impl ListenerConfig {
    /// Expected peers as identities. Blank entries leave their slot unset.
    pub fn expected_identities(&self) -> Vec<Option<PeerIdentity>> {
        self.expected_peers
            .iter()
            .map(|raw| PeerIdentity::parse(raw))
            .collect()
    }
}

/// Accept settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AcceptConfig {
    /// Timeout for one accept call in milliseconds.
    pub timeout_ms: u64,

    /// Re-accept attempts after a rejected peer; -1 retries forever.
    pub max_retries: RetryBudget,
}

impl Default for AcceptConfig {
    fn default() -> Self {
        let policy = AcceptPolicy::default();
        Self {
            timeout_ms: policy.accept_timeout_ms(),
            max_retries: policy.retry_budget,
        }
    }
}

impl AcceptConfig {
    pub fn policy(&self) -> AcceptPolicy {
        AcceptPolicy {
            accept_timeout: Duration::from_millis(self.timeout_ms),
            retry_budget: self.max_retries,
        }
    }
}

/// Client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Connection establishment timeout in milliseconds.
    pub connect_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 10_000,
        }
    }
}

impl ClientConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

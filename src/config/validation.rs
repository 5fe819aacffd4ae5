//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, at least one slot)
//! - Check that addresses parse
//! - Each expected peer may be bound to one slot only
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: PeerlinkConfig → Result<(), Vec<ValidationError>>

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::PeerlinkConfig;
use crate::net::PeerIdentity;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a socket address")]
    BindAddress(String),
    #[error("listener.clients must be at least 1")]
    NoClients,
    #[error("listener.expected_peers lists {peers} peers but only {clients} clients are allowed")]
    TooManyExpectedPeers { peers: usize, clients: usize },
    #[error("listener.expected_peers lists {0} more than once")]
    DuplicateExpectedPeer(String),
    #[error("accept.timeout_ms must be greater than 0")]
    ZeroAcceptTimeout,
    #[error("client.connect_timeout_ms must be greater than 0")]
    ZeroConnectTimeout,
    #[error("observability.metrics_address {0:?} is not a socket address")]
    MetricsAddress(String),
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &PeerlinkConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }
    if config.listener.clients == 0 {
        errors.push(ValidationError::NoClients);
    }
    if config.listener.expected_peers.len() > config.listener.clients {
        errors.push(ValidationError::TooManyExpectedPeers {
            peers: config.listener.expected_peers.len(),
            clients: config.listener.clients,
        });
    }
    let mut seen = HashSet::new();
    for identity in config.listener.expected_peers.iter().filter_map(|raw| PeerIdentity::parse(raw)) {
        if !seen.insert(identity.clone()) {
            errors.push(ValidationError::DuplicateExpectedPeer(identity.to_string()));
        }
    }
    if config.accept.timeout_ms == 0 {
        errors.push(ValidationError::ZeroAcceptTimeout);
    }
    if config.client.connect_timeout_ms == 0 {
        errors.push(ValidationError::ZeroConnectTimeout);
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

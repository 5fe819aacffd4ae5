//! Shared utilities for integration tests.

use std::time::Duration;

use peerlink::config::PeerlinkConfig;
use peerlink::RetryBudget;

/// Config for a server on `127.0.0.1:<port>` with short timeouts.
pub fn server_config(port: u16, clients: usize) -> PeerlinkConfig {
    let mut config = PeerlinkConfig::default();
    config.listener.bind_address = format!("127.0.0.1:{}", port);
    config.listener.clients = clients;
    config.accept.timeout_ms = 2_000;
    config.accept.max_retries = RetryBudget::Limited(3);
    config.client.connect_timeout_ms = 2_000;
    config
}

/// Give a spawned server time to reach its accept call.
#[allow(dead_code)]
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(100)).await;
}

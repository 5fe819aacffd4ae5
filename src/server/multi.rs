//! Server that talks to a fixed number of clients, one after another.

use std::net::SocketAddr;

use async_trait::async_trait;

use crate::config::PeerlinkConfig;
use crate::endpoint::Endpoint;
use crate::error::Result;
use crate::net::{exchange, Acceptor, TcpAcceptor};
use crate::tracker::MultiConnectionTracker;

pub struct MultiClientServer<A: Acceptor = TcpAcceptor> {
    tracker: MultiConnectionTracker<A>,
}

impl MultiClientServer<TcpAcceptor> {
    /// Bind the listener and size the tracker from configuration.
    pub async fn bind(config: &PeerlinkConfig) -> Result<Self> {
        let acceptor = TcpAcceptor::bind(&config.listener.bind_address).await?;
        let tracker = MultiConnectionTracker::expecting(
            acceptor,
            config.accept.policy(),
            config.listener.clients,
            config.listener.expected_identities(),
        );

        tracing::info!(clients = config.listener.clients, "Multi-client server ready");
        Ok(Self { tracker })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.tracker.acceptor().local_addr()
    }
}

impl<A: Acceptor> MultiClientServer<A> {
    pub fn with_tracker(tracker: MultiConnectionTracker<A>) -> Self {
        Self { tracker }
    }

    pub fn tracker(&self) -> &MultiConnectionTracker<A> {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut MultiConnectionTracker<A> {
        &mut self.tracker
    }

    /// Close every client connection and release the listener.
    pub fn stop(self) {
        drop(self.tracker.into_acceptor());
        tracing::info!("Multi-client server stopped");
    }
}

#[async_trait]
impl<A: Acceptor> Endpoint for MultiClientServer<A> {
    /// Bytes read from each occupied slot, keyed by slot index.
    type Inbound = Vec<(usize, Vec<u8>)>;

    async fn connect(&mut self) -> Result<()> {
        self.tracker.connect().await?;
        Ok(())
    }

    /// Send the same payload to every connected client.
    async fn write(&mut self, payload: &[u8]) -> Result<()> {
        for (index, slot) in self.tracker.slots_mut() {
            if slot.is_occupied() {
                exchange::write_to(slot, payload).await?;
                tracing::debug!(index, bytes = payload.len(), "Wrote to client");
            }
        }
        Ok(())
    }

    async fn read(&mut self) -> Result<Vec<(usize, Vec<u8>)>> {
        let mut inbound = Vec::new();
        for (index, slot) in self.tracker.slots_mut() {
            if slot.is_occupied() {
                let data = exchange::read_from(slot).await?;
                tracing::debug!(index, bytes = data.len(), "Read from client");
                inbound.push((index, data));
            }
        }
        Ok(inbound)
    }

    fn disconnect(&mut self) {
        self.tracker.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::testing::ScriptedAcceptor;
    use crate::tracker::{AcceptPolicy, RetryBudget};
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn server(peers: &[&str], capacity: usize) -> (MultiClientServer<ScriptedAcceptor>, ScriptedEnds) {
        let acceptor = ScriptedAcceptor::peers(peers);
        let ends = acceptor.remote_ends();
        let policy = AcceptPolicy {
            accept_timeout: Duration::from_millis(50),
            retry_budget: RetryBudget::Limited(peers.len() as u32),
        };
        let tracker = MultiConnectionTracker::new(acceptor, policy, capacity);
        (MultiClientServer::with_tracker(tracker), ends)
    }

    type ScriptedEnds = std::sync::Arc<std::sync::Mutex<Vec<(SocketAddr, tokio::io::DuplexStream)>>>;

    #[tokio::test]
    async fn write_broadcasts_to_every_client() {
        let (mut server, ends) = server(&["10.2.0.1:1", "10.2.0.2:1"], 2);
        server.connect().await.unwrap();
        server.write(b"tick").await.unwrap();
        assert_eq!(server.tracker().occupied_count(), 0);

        let remotes: Vec<_> = ends.lock().unwrap().drain(..).collect();
        for (_, mut remote) in remotes {
            let mut received = Vec::new();
            remote.read_to_end(&mut received).await.unwrap();
            assert_eq!(received, b"tick");
        }
    }

    #[tokio::test]
    async fn read_is_keyed_by_slot_index() {
        let (mut server, ends) = server(&["10.2.0.1:1", "10.2.0.2:1"], 3);
        server.connect().await.unwrap();
        assert_eq!(server.tracker().occupied_count(), 2);

        let remotes: Vec<_> = ends.lock().unwrap().drain(..).collect();
        for (addr, mut remote) in remotes {
            remote.write_all(addr.ip().to_string().as_bytes()).await.unwrap();
            remote.shutdown().await.unwrap();
        }

        let inbound = server.read().await.unwrap();
        assert_eq!(
            inbound,
            vec![(0, b"10.2.0.1".to_vec()), (1, b"10.2.0.2".to_vec())]
        );
        server.stop();
    }
}

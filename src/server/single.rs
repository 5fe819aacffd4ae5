//! Server that talks to exactly one client at a time.

use std::net::SocketAddr;

use async_trait::async_trait;

use crate::config::PeerlinkConfig;
use crate::endpoint::Endpoint;
use crate::error::Result;
use crate::net::{exchange, Acceptor, TcpAcceptor};
use crate::tracker::SingleConnectionTracker;

pub struct SingleClientServer<A: Acceptor = TcpAcceptor> {
    tracker: SingleConnectionTracker<A>,
}

impl SingleClientServer<TcpAcceptor> {
    /// Bind the listener and set up the tracker from configuration.
    ///
    /// The first entry of `listener.expected_peers`, if set, becomes the only
    /// admitted peer.
    pub async fn bind(config: &PeerlinkConfig) -> Result<Self> {
        let acceptor = TcpAcceptor::bind(&config.listener.bind_address).await?;
        let policy = config.accept.policy();
        let expected = config
            .listener
            .expected_identities()
            .into_iter()
            .next()
            .flatten();

        let tracker = match expected {
            Some(identity) => SingleConnectionTracker::expecting(acceptor, policy, identity),
            None => SingleConnectionTracker::new(acceptor, policy),
        };
        Ok(Self { tracker })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.tracker.acceptor().local_addr()
    }
}

impl<A: Acceptor> SingleClientServer<A> {
    pub fn with_tracker(tracker: SingleConnectionTracker<A>) -> Self {
        Self { tracker }
    }

    pub fn tracker(&self) -> &SingleConnectionTracker<A> {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut SingleConnectionTracker<A> {
        &mut self.tracker
    }

    pub fn is_connected(&self) -> bool {
        self.tracker.is_connected()
    }

    /// Close the client connection and release the listener.
    pub fn stop(self) {
        drop(self.tracker.into_acceptor());
        tracing::info!("Single-client server stopped");
    }
}

#[async_trait]
impl<A: Acceptor> Endpoint for SingleClientServer<A> {
    type Inbound = Vec<u8>;

    async fn connect(&mut self) -> Result<()> {
        self.tracker.connect().await?;
        Ok(())
    }

    async fn write(&mut self, payload: &[u8]) -> Result<()> {
        exchange::write_to(self.tracker.slot_mut(), payload).await?;
        Ok(())
    }

    async fn read(&mut self) -> Result<Vec<u8>> {
        Ok(exchange::read_from(self.tracker.slot_mut()).await?)
    }

    fn disconnect(&mut self) {
        self.tracker.disconnect();
    }
}

//! Scripted acceptor for driving trackers without sockets.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::io::DuplexStream;

use crate::net::{AcceptError, Acceptor, Connection};

/// Hands out in-memory connections from a fixed list of peer addresses.
///
/// `None` entries fail the accept call. Once the script runs out the acceptor
/// blocks forever, like a listener nobody connects to.
pub struct ScriptedAcceptor {
    script: VecDeque<Option<SocketAddr>>,
    remote_ends: Arc<Mutex<Vec<(SocketAddr, DuplexStream)>>>,
}

impl ScriptedAcceptor {
    pub fn idle() -> Self {
        Self {
            script: VecDeque::new(),
            remote_ends: Arc::default(),
        }
    }

    pub fn failing() -> Self {
        let mut acceptor = Self::idle();
        acceptor.script.push_back(None);
        acceptor
    }

    pub fn peers(addrs: &[&str]) -> Self {
        let mut acceptor = Self::idle();
        acceptor.push_peers(addrs);
        acceptor
    }

    pub fn push_peers(&mut self, addrs: &[&str]) {
        for addr in addrs {
            self.script.push_back(Some(addr.parse().expect("scripted peer address")));
        }
    }

    /// Peer-side halves of every connection handed out so far.
    pub fn remote_ends(&self) -> Arc<Mutex<Vec<(SocketAddr, DuplexStream)>>> {
        Arc::clone(&self.remote_ends)
    }
}

#[async_trait]
impl Acceptor for ScriptedAcceptor {
    type Stream = DuplexStream;

    async fn accept(&mut self) -> Result<Connection<DuplexStream>, AcceptError> {
        match self.script.pop_front() {
            Some(Some(addr)) => {
                let (ours, theirs) = tokio::io::duplex(4096);
                self.remote_ends.lock().unwrap().push((addr, theirs));
                Ok(Connection::new(ours, addr))
            }
            Some(None) => Err(AcceptError::Accept(std::io::Error::new(
                std::io::ErrorKind::ConnectionAborted,
                "scripted accept failure",
            ))),
            None => std::future::pending().await,
        }
    }
}

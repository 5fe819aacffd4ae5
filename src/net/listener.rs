//! TCP listener and the accept primitive the trackers consume.
//!
//! # Responsibilities
//! - Bind to the configured address
//! - Accept incoming TCP connections one at a time
//! - Hand each accepted stream over as an owned [`Connection`]
//!
//! The accept timeout is not applied here; the bounded retry acceptor in
//! `tracker::retry` wraps every call with it.

use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, TcpStream};

use crate::net::connection::Connection;

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum AcceptError {
    /// Failed to bind to address.
    #[error("Failed to bind: {0}")]
    Bind(#[source] std::io::Error),
    /// Failed to accept connection.
    #[error("Failed to accept: {0}")]
    Accept(#[source] std::io::Error),
    /// No peer connected within the accept timeout.
    #[error("No connection accepted within {0:?}")]
    TimedOut(Duration),
}

/// Source of inbound connections.
#[async_trait]
pub trait Acceptor: Send {
    /// Stream type of accepted connections.
    type Stream: AsyncRead + AsyncWrite + Unpin + Send;

    /// Block until the next inbound connection arrives.
    async fn accept(&mut self) -> Result<Connection<Self::Stream>, AcceptError>;
}

/// Accepts TCP connections from a bound listener.
#[derive(Debug)]
pub struct TcpAcceptor {
    inner: TcpListener,
}

impl TcpAcceptor {
    /// Bind to the given address.
    pub async fn bind(bind_address: &str) -> Result<Self, AcceptError> {
        let addr: SocketAddr = bind_address.parse().map_err(|e| {
            AcceptError::Bind(std::io::Error::new(std::io::ErrorKind::InvalidInput, e))
        })?;

        let listener = TcpListener::bind(addr).await.map_err(AcceptError::Bind)?;
        let local_addr = listener.local_addr().map_err(AcceptError::Bind)?;

        tracing::info!(address = %local_addr, "Listener bound");

        Ok(Self { inner: listener })
    }

    /// Get the local address this listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.inner.local_addr()
    }
}

#[async_trait]
impl Acceptor for TcpAcceptor {
    type Stream = TcpStream;

    async fn accept(&mut self) -> Result<Connection<TcpStream>, AcceptError> {
        let (stream, addr) = self.inner.accept().await.map_err(AcceptError::Accept)?;
        let connection = Connection::new(stream, addr);

        tracing::debug!(
            connection_id = %connection.id(),
            peer_addr = %addr,
            "Connection accepted"
        );

        Ok(connection)
    }
}

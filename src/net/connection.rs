//! Accepted peer connections and the identity derived from them.
//!
//! # Responsibilities
//! - Own one bidirectional byte stream to a peer
//! - Derive the peer identity used for re-recognition across reconnects
//! - Generate unique connection IDs for tracing
//! - Close idempotently

use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicU64, Ordering};

/// Global atomic counter for connection IDs.
/// Using relaxed ordering is sufficient since we only need uniqueness, not synchronization.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generate a new unique connection ID.
    pub fn new() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Identity of a peer, derived from its IP address.
///
/// The port is not part of the identity: a reconnecting peer
/// arrives from a fresh ephemeral port but must still be recognized.
/// IPv4-mapped IPv6 addresses (`::ffff:a.b.c.d`), as seen by a dual-stack
/// listener, are reduced to their IPv4 form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PeerIdentity(String);

impl PeerIdentity {
    /// Parse a remembered identity. Blank input is not an identity.
    ///
    /// Input that parses as an IP address is normalized the same way as
    /// [`of`](Self::of); anything else is kept as written.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        match trimmed.parse::<IpAddr>() {
            Ok(ip) => Some(Self::from_ip(ip)),
            Err(_) => Some(Self(trimmed.to_string())),
        }
    }

    /// Derive the identity of a peer from its socket address.
    pub fn of(addr: &SocketAddr) -> Self {
        Self::from_ip(addr.ip())
    }

    fn from_ip(ip: IpAddr) -> Self {
        Self(ip.to_canonical().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PeerIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An accepted connection to a peer.
///
/// Closing drops the stream, which releases the socket. The peer address is
/// kept after close so the identity can still be reported.
#[derive(Debug)]
pub struct Connection<S> {
    id: ConnectionId,
    peer_addr: SocketAddr,
    stream: Option<S>,
}

impl<S> Connection<S> {
    /// Wrap an accepted stream.
    pub fn new(stream: S, peer_addr: SocketAddr) -> Self {
        Self {
            id: ConnectionId::new(),
            peer_addr,
            stream: Some(stream),
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Identity derived from the peer address.
    pub fn identity(&self) -> PeerIdentity {
        PeerIdentity::of(&self.peer_addr)
    }

    /// The underlying stream, or `None` once closed.
    pub fn stream_mut(&mut self) -> Option<&mut S> {
        self.stream.as_mut()
    }

    /// Close the connection. Closing twice is a no-op.
    pub fn close(&mut self) {
        if self.stream.take().is_some() {
            tracing::trace!(connection_id = %self.id, peer_addr = %self.peer_addr, "Connection closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.stream.is_none()
    }
}

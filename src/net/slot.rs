//! Connection slot: a fixed-position holder for at most one peer.
//!
//! A slot pairs the live connection with the identity remembered for that
//! position. Closing the connection never clears the remembered identity, so a
//! later reconnect from the same peer can reclaim the slot.

use crate::net::connection::{Connection, PeerIdentity};

/// One slot of a connection tracker.
#[derive(Debug)]
pub struct ConnectionSlot<S> {
    remembered: Option<PeerIdentity>,
    connection: Option<Connection<S>>,
}

impl<S> Default for ConnectionSlot<S> {
    fn default() -> Self {
        Self {
            remembered: None,
            connection: None,
        }
    }
}

impl<S> ConnectionSlot<S> {
    /// Create an empty slot with nothing remembered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty slot that expects the given peer.
    pub fn expecting(identity: Option<PeerIdentity>) -> Self {
        Self {
            remembered: identity,
            connection: None,
        }
    }

    /// True iff a connection is present and not closed.
    pub fn is_occupied(&self) -> bool {
        self.connection.as_ref().is_some_and(|c| !c.is_closed())
    }

    /// Identity of the peer currently held, if any.
    pub fn identity(&self) -> Option<PeerIdentity> {
        self.connection.as_ref().map(Connection::identity)
    }

    pub fn remembered(&self) -> Option<&PeerIdentity> {
        self.remembered.as_ref()
    }

    pub fn remember(&mut self, identity: PeerIdentity) {
        self.remembered = Some(identity);
    }

    pub fn forget(&mut self) {
        self.remembered = None;
    }

    /// Whether the remembered identity matches `identity`.
    pub fn expects(&self, identity: &PeerIdentity) -> bool {
        self.remembered.as_ref() == Some(identity)
    }

    /// Move a connection into this slot, closing whatever it held before.
    pub fn occupy(&mut self, connection: Connection<S>) {
        self.close();
        self.connection = Some(connection);
    }

    /// Close the held connection and clear the reference. No-op when empty.
    pub fn close(&mut self) {
        if let Some(mut connection) = self.connection.take() {
            connection.close();
        }
    }

    pub fn connection_mut(&mut self) -> Option<&mut Connection<S>> {
        self.connection.as_mut()
    }
}

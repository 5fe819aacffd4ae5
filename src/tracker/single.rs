//! Single-peer connection tracker.
//!
//! # States
//! ```text
//! Empty → Occupied: connect() admits a peer
//! Occupied → Empty: disconnect(), or an exchange closed the connection
//! ```
//!
//! With no remembered identity any peer is admitted. With one, only a peer
//! from that address is; everyone else is closed and counted against the
//! retry budget. Connecting while occupied replaces the current peer.

use crate::net::{AcceptError, Acceptor, ConnectionSlot, PeerIdentity};
use crate::observability::metrics;
use crate::tracker::retry::{AcceptPolicy, BoundedAcceptor};

/// Tracks exactly one peer connection.
#[derive(Debug)]
pub struct SingleConnectionTracker<A: Acceptor> {
    accept: BoundedAcceptor<A>,
    slot: ConnectionSlot<A::Stream>,
}

impl<A: Acceptor> SingleConnectionTracker<A> {
    pub fn new(acceptor: A, policy: AcceptPolicy) -> Self {
        Self {
            accept: BoundedAcceptor::new(acceptor, policy),
            slot: ConnectionSlot::new(),
        }
    }

    /// Create a tracker that only admits the given peer.
    pub fn expecting(acceptor: A, policy: AcceptPolicy, identity: PeerIdentity) -> Self {
        Self {
            accept: BoundedAcceptor::new(acceptor, policy),
            slot: ConnectionSlot::expecting(Some(identity)),
        }
    }

    /// Accept peers until one is admitted or the retry budget runs out.
    ///
    /// Running out of budget is not an error; check [`is_connected`](Self::is_connected)
    /// afterwards.
    pub async fn connect(&mut self) -> Result<(), AcceptError> {
        let mut retries = self.accept.counter();

        while !self.accept.give_up(&retries) {
            let Some(mut connection) = self.accept.accept(&mut retries).await? else {
                continue;
            };

            let identity = connection.identity();
            if self.admits(&identity) {
                tracing::info!(
                    connection_id = %connection.id(),
                    peer = %identity,
                    "Peer admitted"
                );
                self.slot.occupy(connection);
                return Ok(());
            }

            tracing::warn!(
                peer = %identity,
                expected = ?self.slot.remembered().map(PeerIdentity::as_str),
                retries = retries.count(),
                "Rejected unexpected peer"
            );
            metrics::record_rejected();
            connection.close();
            retries.record();
        }

        Ok(())
    }

    /// Close the current connection. The remembered identity is kept.
    pub fn disconnect(&mut self) {
        self.slot.close();
    }

    fn admits(&self, identity: &PeerIdentity) -> bool {
        match self.slot.remembered() {
            None => true,
            Some(expected) => expected == identity,
        }
    }

    pub fn remember(&mut self, identity: PeerIdentity) {
        self.slot.remember(identity);
    }

    /// Forget the remembered peer so the next connect admits anyone.
    pub fn forget_client(&mut self) {
        self.slot.forget();
    }

    pub fn remembered_identity(&self) -> Option<&PeerIdentity> {
        self.slot.remembered()
    }

    pub fn is_connected(&self) -> bool {
        self.slot.is_occupied()
    }

    pub fn slot(&self) -> &ConnectionSlot<A::Stream> {
        &self.slot
    }

    pub fn slot_mut(&mut self) -> &mut ConnectionSlot<A::Stream> {
        &mut self.slot
    }

    pub fn policy(&self) -> AcceptPolicy {
        self.accept.policy()
    }

    pub fn acceptor(&self) -> &A {
        self.accept.acceptor()
    }

    /// Close the connection and hand back the acceptor.
    pub fn into_acceptor(mut self) -> A {
        self.slot.close();
        self.accept.into_inner()
    }
}

//! Multi-peer connection tracker.
//!
//! # Placement rules
//! ```text
//! accepted peer
//!     → identity remembered at index i?   → slot i (previous occupant closed)
//!     → free index (nothing remembered,
//!       nothing open)?                    → lowest such index, identity recorded
//!     → otherwise                         → closed and dropped
//! ```
//!
//! Capacity is fixed at construction. Every accept, whatever its outcome,
//! counts against the retry budget of the current `connect` call.

use crate::net::{AcceptError, Acceptor, Connection, ConnectionSlot, PeerIdentity};
use crate::observability::metrics;
use crate::tracker::retry::{AcceptPolicy, BoundedAcceptor};

/// Tracks a fixed number of peer connections by remembered identity.
#[derive(Debug)]
pub struct MultiConnectionTracker<A: Acceptor> {
    accept: BoundedAcceptor<A>,
    slots: Vec<ConnectionSlot<A::Stream>>,
}

impl<A: Acceptor> MultiConnectionTracker<A> {
    /// Create a tracker with `capacity` empty slots.
    pub fn new(acceptor: A, policy: AcceptPolicy, capacity: usize) -> Self {
        Self {
            accept: BoundedAcceptor::new(acceptor, policy),
            slots: (0..capacity).map(|_| ConnectionSlot::new()).collect(),
        }
    }

    /// Create a tracker whose slots expect the given peers, index by index.
    ///
    /// `None` leaves a slot open to new peers. Entries beyond `capacity` are
    /// ignored, and so is any repeat of an identity already bound to an
    /// earlier slot.
    pub fn expecting(
        acceptor: A,
        policy: AcceptPolicy,
        capacity: usize,
        expected: impl IntoIterator<Item = Option<PeerIdentity>>,
    ) -> Self {
        let mut tracker = Self::new(acceptor, policy, capacity);
        for (index, identity) in expected.into_iter().enumerate().take(capacity) {
            let Some(identity) = identity else {
                continue;
            };
            if let Some(bound) = tracker.index_of(&identity) {
                tracing::warn!(peer = %identity, index, bound, "Duplicate expected peer ignored");
                continue;
            }
            tracker.slots[index].remember(identity);
        }
        tracker
    }

    /// Accept peers until every slot is occupied or the retry budget runs out.
    pub async fn connect(&mut self) -> Result<(), AcceptError> {
        let mut retries = self.accept.counter();

        loop {
            if self.all_slots_full() {
                tracing::debug!(capacity = self.capacity(), "All slots occupied");
                return Ok(());
            }
            if self.accept.give_up(&retries) {
                return Ok(());
            }

            let Some(connection) = self.accept.accept(&mut retries).await? else {
                continue;
            };
            self.place(connection);
            retries.record();
        }
    }

    fn place(&mut self, mut connection: Connection<A::Stream>) {
        let identity = connection.identity();

        if let Some(index) = self.index_of(&identity) {
            let superseded = self.slots[index].is_occupied();
            tracing::info!(
                connection_id = %connection.id(),
                peer = %identity,
                index,
                superseded,
                "Known peer re-placed"
            );
            self.slots[index].occupy(connection);
            return;
        }

        let free = self
            .slots
            .iter()
            .position(|slot| slot.remembered().is_none() && !slot.is_occupied());
        if let Some(index) = free {
            tracing::info!(
                connection_id = %connection.id(),
                peer = %identity,
                index,
                "New peer assigned"
            );
            let slot = &mut self.slots[index];
            slot.remember(identity);
            slot.occupy(connection);
            return;
        }

        tracing::warn!(
            connection_id = %connection.id(),
            peer = %identity,
            "No slot for unknown peer, dropping"
        );
        metrics::record_dropped();
        connection.close();
    }

    /// Close every open connection. Remembered identities are kept.
    pub fn disconnect(&mut self) {
        for slot in &mut self.slots {
            slot.close();
        }
    }

    /// Forget every remembered identity.
    pub fn forget_all_addresses(&mut self) {
        for slot in &mut self.slots {
            slot.forget();
        }
    }

    /// Pre-assign `identity` to slot `index`. Returns false if out of range.
    ///
    /// An identity remembered at another index moves here; a connection
    /// already open there stays until it is closed.
    pub fn remember(&mut self, index: usize, identity: PeerIdentity) -> bool {
        if index >= self.slots.len() {
            return false;
        }
        if let Some(previous) = self.index_of(&identity).filter(|&previous| previous != index) {
            tracing::debug!(peer = %identity, from = previous, to = index, "Remembered peer moved");
            self.slots[previous].forget();
        }
        self.slots[index].remember(identity);
        true
    }

    /// Index of the slot remembering `identity`.
    fn index_of(&self, identity: &PeerIdentity) -> Option<usize> {
        self.slots.iter().position(|slot| slot.expects(identity))
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn occupied_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_occupied()).count()
    }

    pub fn all_slots_full(&self) -> bool {
        self.slots.iter().all(ConnectionSlot::is_occupied)
    }

    pub fn all_identities_recorded(&self) -> bool {
        self.slots.iter().all(|slot| slot.remembered().is_some())
    }

    pub fn remembered_identities(&self) -> Vec<Option<&PeerIdentity>> {
        self.slots.iter().map(ConnectionSlot::remembered).collect()
    }

    pub fn slot(&self, index: usize) -> Option<&ConnectionSlot<A::Stream>> {
        self.slots.get(index)
    }

    pub fn slots_mut(&mut self) -> impl Iterator<Item = (usize, &mut ConnectionSlot<A::Stream>)> {
        self.slots.iter_mut().enumerate()
    }

    pub fn policy(&self) -> AcceptPolicy {
        self.accept.policy()
    }

    pub fn acceptor(&self) -> &A {
        self.accept.acceptor()
    }

    /// Close every connection and hand back the acceptor.
    pub fn into_acceptor(mut self) -> A {
        self.disconnect();
        self.accept.into_inner()
    }
}

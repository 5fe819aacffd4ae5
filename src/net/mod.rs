//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept primitive)
//!     → connection.rs (owned stream + peer identity)
//!     → slot.rs (placed by a tracker, identity remembered)
//!     → exchange.rs (write or read, then close)
//!
//! Slot States:
//!     Empty → Occupied → Empty (closed, identity kept)
//! ```
//!
//! # Design Decisions
//! - One connection per slot, moved in rather than copied
//! - Identity is the peer IP, so reconnects from new ports are recognized
//! - Every exchange closes the connection afterwards

pub mod connection;
pub mod exchange;
pub mod listener;
pub mod slot;

pub use connection::{Connection, ConnectionId, PeerIdentity};
pub use exchange::ExchangeError;
pub use listener::{AcceptError, Acceptor, TcpAcceptor};
pub use slot::ConnectionSlot;

//! Server endpoints.
//!
//! # Data Flow
//! ```text
//! bind(config)
//!     → TcpAcceptor (listener)
//!     → tracker (single or multi, AcceptPolicy from config)
//!
//! connect() → tracker fills slot(s)
//! write()   → every occupied slot, in index order, then closed
//! read()    → every occupied slot, in index order, then closed
//! stop()    → all slots closed, listener released
//! ```
//!
//! # Design Decisions
//! - Peers are served sequentially; a silent peer delays the rest
//! - Servers are generic over the acceptor so trackers can be driven in tests

pub mod multi;
pub mod single;

pub use multi::MultiClientServer;
pub use single::SingleClientServer;

//! peerlink: accept expected peers, recognize them by address, exchange bytes.
//!
//! # Architecture Overview
//!
//! ```text
//!   Client ──TCP──▶ net::listener ──▶ tracker::retry ──▶ tracker::{single, multi}
//!                   (accept)          (timeout, budget)   (identity → slot)
//!                                                               │
//!                                                               ▼
//!   runner ◀── server::{single, multi} ◀── net::exchange ◀── net::slot
//!   (read/write order)  (Endpoint)         (bytes, then close)
//!
//!   codec: typed values ⇄ bytes for runner payloads
//!   config, observability: cross-cutting
//! ```

pub mod client;
pub mod codec;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod net;
pub mod observability;
pub mod runner;
pub mod server;
pub mod tracker;

pub use client::Client;
pub use config::PeerlinkConfig;
pub use endpoint::Endpoint;
pub use error::{Error, Result};
pub use runner::Runner;
pub use server::{MultiClientServer, SingleClientServer};
pub use tracker::{AcceptPolicy, MultiConnectionTracker, RetryBudget, SingleConnectionTracker};

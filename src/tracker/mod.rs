//! Connection tracking subsystem.
//!
//! # Data Flow
//! ```text
//! connect()
//!     → retry.rs (budget check, accept with timeout)
//!     → single.rs / multi.rs (classify peer by identity)
//!     → slot (connection moved in) or closed and retried
//! ```
//!
//! # Design Decisions
//! - Retries are an explicit loop bounded by the budget, never recursion
//! - Exhausting the budget returns quietly; callers poll occupancy
//! - Accept faults are never swallowed
//! - All mutation goes through `&mut self`; one logical thread of control

pub mod multi;
pub mod retry;
pub mod single;

#[cfg(test)]
pub(crate) mod testing;

pub use multi::MultiConnectionTracker;
pub use retry::{AcceptPolicy, BoundedAcceptor, RetryBudget, RetryCounter};
pub use single::SingleConnectionTracker;

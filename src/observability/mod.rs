//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Trackers, exchange and runners produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (accept/reject/drop counters)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//!     → Prometheus scrape (optional)
//! ```
//!
//! # Design Decisions
//! - Library code only emits events; the binary installs subscribers
//! - Counters are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;

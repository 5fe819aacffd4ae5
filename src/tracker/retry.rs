//! Bounded retry acceptor.
//!
//! # Responsibilities
//! - Enforce the accept timeout on every accept call
//! - Count rejected attempts against the retry budget
//! - Decide when `connect` gives up
//!
//! # Budget semantics
//! ```text
//! Limited(n): attempts continue while retries <= n, so at most n + 1 accepts
//! Unlimited:  never exhausted; only the accept timeout bounds the wait
//! ```
//!
//! A timed-out accept counts as one spent attempt under a limited budget. Under
//! an unlimited budget it surfaces as [`AcceptError::TimedOut`], otherwise an
//! idle listener would keep `connect` waiting forever.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::net::{AcceptError, Acceptor, Connection};
use crate::observability::metrics;

/// Value of `max_retries` that means "retry forever".
pub const UNLIMITED_RETRIES: i64 = -1;

pub const DEFAULT_ACCEPT_TIMEOUT: Duration = Duration::from_millis(10_000);
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Maximum number of re-accept attempts after a rejected peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum RetryBudget {
    Unlimited,
    Limited(u32),
}

impl Default for RetryBudget {
    fn default() -> Self {
        RetryBudget::Limited(DEFAULT_MAX_RETRIES)
    }
}

impl TryFrom<i64> for RetryBudget {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value == UNLIMITED_RETRIES {
            return Ok(RetryBudget::Unlimited);
        }
        u32::try_from(value)
            .map(RetryBudget::Limited)
            .map_err(|_| format!("max_retries must be -1 (unlimited) or between 0 and {}, got {}", u32::MAX, value))
    }
}

impl From<RetryBudget> for i64 {
    fn from(budget: RetryBudget) -> Self {
        match budget {
            RetryBudget::Unlimited => UNLIMITED_RETRIES,
            RetryBudget::Limited(n) => i64::from(n),
        }
    }
}

/// Immutable accept settings handed to a tracker at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcceptPolicy {
    /// Bound on each blocking accept call.
    pub accept_timeout: Duration,
    /// Bound on rejection-triggered re-accepts within one `connect`.
    pub retry_budget: RetryBudget,
}

impl AcceptPolicy {
    /// The accept timeout in whole milliseconds, saturating at `u64::MAX`.
    pub fn accept_timeout_ms(&self) -> u64 {
        u64::try_from(self.accept_timeout.as_millis()).unwrap_or(u64::MAX)
    }
}

impl Default for AcceptPolicy {
    fn default() -> Self {
        Self {
            accept_timeout: DEFAULT_ACCEPT_TIMEOUT,
            retry_budget: RetryBudget::default(),
        }
    }
}

/// Per-call retry counter.
#[derive(Debug, Clone, Copy)]
pub struct RetryCounter {
    budget: RetryBudget,
    retries: u32,
}

impl RetryCounter {
    pub fn new(budget: RetryBudget) -> Self {
        Self { budget, retries: 0 }
    }

    pub fn exhausted(&self) -> bool {
        match self.budget {
            RetryBudget::Unlimited => false,
            RetryBudget::Limited(max) => self.retries > max,
        }
    }

    pub fn record(&mut self) {
        self.retries = self.retries.saturating_add(1);
    }

    pub fn count(&self) -> u32 {
        self.retries
    }
}

/// Accept loop control shared by the trackers.
#[derive(Debug)]
pub struct BoundedAcceptor<A> {
    acceptor: A,
    policy: AcceptPolicy,
}

impl<A: Acceptor> BoundedAcceptor<A> {
    pub fn new(acceptor: A, policy: AcceptPolicy) -> Self {
        Self { acceptor, policy }
    }

    pub fn policy(&self) -> AcceptPolicy {
        self.policy
    }

    pub fn acceptor(&self) -> &A {
        &self.acceptor
    }

    pub fn into_inner(self) -> A {
        self.acceptor
    }

    /// Start counting attempts for one `connect` call.
    pub fn counter(&self) -> RetryCounter {
        RetryCounter::new(self.policy.retry_budget)
    }

    /// Check the budget, logging when it has run out.
    pub fn give_up(&self, retries: &RetryCounter) -> bool {
        if retries.exhausted() {
            tracing::debug!(retries = retries.count(), "Retry budget exhausted, giving up");
            metrics::record_retry_exhausted();
            return true;
        }
        false
    }

    /// Accept one connection within the accept timeout.
    ///
    /// Returns `Ok(None)` when the timeout elapsed and was charged to the
    /// budget instead of being raised.
    pub async fn accept(
        &mut self,
        retries: &mut RetryCounter,
    ) -> Result<Option<Connection<A::Stream>>, AcceptError> {
        let timeout = self.policy.accept_timeout;
        match tokio::time::timeout(timeout, self.acceptor.accept()).await {
            Ok(Ok(connection)) => {
                metrics::record_accepted();
                Ok(Some(connection))
            }
            Ok(Err(e)) => Err(e),
            Err(_) if self.policy.retry_budget == RetryBudget::Unlimited => {
                Err(AcceptError::TimedOut(timeout))
            }
            Err(_) => {
                tracing::debug!(timeout_ms = self.policy.accept_timeout_ms(), "Accept timed out");
                retries.record();
                Ok(None)
            }
        }
    }
}

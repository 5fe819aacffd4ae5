//! Crate-level error type for endpoint operations.

use std::time::Duration;

use thiserror::Error;

use crate::net::{AcceptError, ExchangeError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Accept(#[from] AcceptError),

    #[error(transparent)]
    Exchange(#[from] ExchangeError),

    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("connecting to {addr} timed out after {timeout:?}")]
    ConnectTimedOut { addr: String, timeout: Duration },
}

pub type Result<T> = std::result::Result<T, Error>;

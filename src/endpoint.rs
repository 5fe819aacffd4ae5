//! The four operations every communicating endpoint offers.

use async_trait::async_trait;

use crate::error::Result;

/// A server or client that can connect, exchange bytes and disconnect.
///
/// `write` and `read` each close the underlying connection when they are
/// done, so a `connect` is needed before every operation.
#[async_trait]
pub trait Endpoint: Send {
    /// What one `read` yields.
    type Inbound: Send;

    async fn connect(&mut self) -> Result<()>;

    async fn write(&mut self, payload: &[u8]) -> Result<()>;

    async fn read(&mut self) -> Result<Self::Inbound>;

    /// Close any open connection. Safe to call repeatedly.
    fn disconnect(&mut self);
}

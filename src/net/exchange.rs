//! Byte exchange over an occupied slot.
//!
//! Both operations close the slot's connection once they finish, whether they
//! succeed or not. The peer sees EOF after a write, and the slot must be
//! reconnected before it can be used again.

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::net::slot::ConnectionSlot;

/// Errors raised while exchanging bytes with a peer.
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("slot holds no open connection")]
    NotConnected,
    #[error("I/O error during exchange: {0}")]
    Io(#[from] std::io::Error),
}

/// Write `payload` to the slot's peer, flush, signal EOF and close.
pub async fn write_to<S>(slot: &mut ConnectionSlot<S>, payload: &[u8]) -> Result<(), ExchangeError>
where
    S: AsyncWrite + Unpin,
{
    let result = match slot.connection_mut().and_then(|c| c.stream_mut()) {
        Some(stream) => write_all(stream, payload).await,
        None => return Err(ExchangeError::NotConnected),
    };
    slot.close();
    result?;

    tracing::trace!(bytes = payload.len(), "Payload written");
    Ok(())
}

/// Read everything the slot's peer sends until EOF, then close.
pub async fn read_from<S>(slot: &mut ConnectionSlot<S>) -> Result<Vec<u8>, ExchangeError>
where
    S: AsyncRead + Unpin,
{
    let mut buffer = Vec::new();
    let result = match slot.connection_mut().and_then(|c| c.stream_mut()) {
        Some(stream) => stream.read_to_end(&mut buffer).await,
        None => return Err(ExchangeError::NotConnected),
    };
    slot.close();
    result?;

    tracing::trace!(bytes = buffer.len(), "Payload read");
    Ok(buffer)
}

pub(crate) async fn write_all<S>(stream: &mut S, payload: &[u8]) -> std::io::Result<()>
where
    S: AsyncWrite + Unpin,
{
    stream.write_all(payload).await?;
    stream.flush().await?;
    stream.shutdown().await
}

//! Exchange sequencing over an endpoint.
//!
//! # Sequences
//! ```text
//! read-first:  connect → read  → disconnect → connect → write → disconnect
//! write-first: connect → write → disconnect → connect → read  → disconnect
//! ```
//!
//! A server typically runs read-first against a client running write-first.
//! Each step closes the connection, hence the reconnect in between.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::codec::{Codec, CodecError};
use crate::endpoint::Endpoint;
use crate::error::Error;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error(transparent)]
    Endpoint(#[from] Error),
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Drives an endpoint through one exchange, writing `W` and reading `R`.
pub struct Runner<E, W, R> {
    endpoint: E,
    _payloads: PhantomData<fn(W) -> R>,
}

impl<E: Endpoint, W, R> Runner<E, W, R> {
    pub fn new(endpoint: E) -> Self {
        Self {
            endpoint,
            _payloads: PhantomData,
        }
    }

    pub fn endpoint(&self) -> &E {
        &self.endpoint
    }

    pub fn endpoint_mut(&mut self) -> &mut E {
        &mut self.endpoint
    }

    pub fn into_endpoint(self) -> E {
        self.endpoint
    }

    /// Read first, then answer with `payload`.
    pub async fn run_read_first_raw(&mut self, payload: &[u8]) -> Result<E::Inbound, RunnerError> {
        let result = self.read_first(payload).await;
        self.finish("read-first", result)
    }

    /// Send `payload` first, then read the answer.
    pub async fn run_write_first_raw(&mut self, payload: &[u8]) -> Result<E::Inbound, RunnerError> {
        let result = self.write_first(payload).await;
        self.finish("write-first", result)
    }

    /// Close the endpoint's connection.
    pub fn stop(&mut self) {
        self.endpoint.disconnect();
    }

    async fn read_first(&mut self, payload: &[u8]) -> Result<E::Inbound, Error> {
        self.endpoint.connect().await?;
        let inbound = self.endpoint.read().await?;
        self.endpoint.disconnect();

        self.endpoint.connect().await?;
        self.endpoint.write(payload).await?;
        self.endpoint.disconnect();
        Ok(inbound)
    }

    async fn write_first(&mut self, payload: &[u8]) -> Result<E::Inbound, Error> {
        self.endpoint.connect().await?;
        self.endpoint.write(payload).await?;
        self.endpoint.disconnect();

        self.endpoint.connect().await?;
        let inbound = self.endpoint.read().await?;
        self.endpoint.disconnect();
        Ok(inbound)
    }

    fn finish<T>(&mut self, sequence: &str, result: Result<T, Error>) -> Result<T, RunnerError> {
        if let Err(e) = &result {
            tracing::warn!(sequence, error = %e, "Exchange failed");
            self.endpoint.disconnect();
        }
        Ok(result?)
    }
}

/// Inbound endpoint data that decodes into typed values.
///
/// Single-peer endpoints decode one value; a multi-peer server decodes one
/// value per slot, keeping the slot index.
pub trait DecodeInbound<R> {
    type Decoded;

    fn decode_with(self, codec: Codec<R>) -> Result<Self::Decoded, CodecError>;
}

impl<R: DeserializeOwned> DecodeInbound<R> for Vec<u8> {
    type Decoded = R;

    fn decode_with(self, codec: Codec<R>) -> Result<R, CodecError> {
        codec.decode(&self)
    }
}

impl<R: DeserializeOwned> DecodeInbound<R> for Vec<(usize, Vec<u8>)> {
    type Decoded = Vec<(usize, R)>;

    fn decode_with(self, codec: Codec<R>) -> Result<Vec<(usize, R)>, CodecError> {
        self.into_iter()
            .map(|(index, bytes)| Ok((index, codec.decode(&bytes)?)))
            .collect()
    }
}

impl<E, W, R> Runner<E, W, R>
where
    E: Endpoint,
    E::Inbound: DecodeInbound<R>,
    W: Serialize,
{
    /// Read an `R` (one per peer on a multi-peer server), then answer with `outgoing`.
    pub async fn run_read_first(
        &mut self,
        outgoing: &W,
    ) -> Result<<E::Inbound as DecodeInbound<R>>::Decoded, RunnerError> {
        let payload = Codec::<W>::new().encode(outgoing)?;
        let inbound = self.run_read_first_raw(&payload).await?;
        Self::decode(inbound)
    }

    /// Send `outgoing`, then read an `R` (one per peer on a multi-peer server).
    pub async fn run_write_first(
        &mut self,
        outgoing: &W,
    ) -> Result<<E::Inbound as DecodeInbound<R>>::Decoded, RunnerError> {
        let payload = Codec::<W>::new().encode(outgoing)?;
        let inbound = self.run_write_first_raw(&payload).await?;
        Self::decode(inbound)
    }

    fn decode(inbound: E::Inbound) -> Result<<E::Inbound as DecodeInbound<R>>::Decoded, RunnerError> {
        inbound.decode_with(Codec::new()).map_err(|e| {
            tracing::warn!(error = %e, "Could not decode inbound payload");
            RunnerError::Codec(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use async_trait::async_trait;

    /// Endpoint that records calls and answers reads from a queue.
    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
        inbound: Vec<Vec<u8>>,
        fail_connect: bool,
    }

    #[async_trait]
    impl Endpoint for Recorder {
        type Inbound = Vec<u8>;

        async fn connect(&mut self) -> Result<()> {
            self.calls.push("connect".into());
            if self.fail_connect {
                return Err(Error::ConnectTimedOut {
                    addr: "test".into(),
                    timeout: std::time::Duration::from_millis(1),
                });
            }
            Ok(())
        }

        async fn write(&mut self, payload: &[u8]) -> Result<()> {
            self.calls.push(format!("write:{}", payload.len()));
            Ok(())
        }

        async fn read(&mut self) -> Result<Vec<u8>> {
            self.calls.push("read".into());
            Ok(self.inbound.pop().unwrap_or_default())
        }

        fn disconnect(&mut self) {
            self.calls.push("disconnect".into());
        }
    }

    #[tokio::test]
    async fn read_first_order() {
        let mut runner: Runner<_, (), ()> = Runner::new(Recorder::default());
        runner.run_read_first_raw(b"abc").await.unwrap();
        assert_eq!(
            runner.endpoint().calls,
            ["connect", "read", "disconnect", "connect", "write:3", "disconnect"]
        );
    }

    #[tokio::test]
    async fn write_first_order() {
        let mut runner: Runner<_, (), ()> = Runner::new(Recorder::default());
        runner.run_write_first_raw(b"ab").await.unwrap();
        assert_eq!(
            runner.endpoint().calls,
            ["connect", "write:2", "disconnect", "connect", "read", "disconnect"]
        );
    }

    #[tokio::test]
    async fn typed_exchange_decodes_reply() {
        let reply = crate::codec::encode(&vec![1u16, 2, 3]).unwrap();
        let recorder = Recorder {
            inbound: vec![reply],
            ..Default::default()
        };
        let mut runner: Runner<_, String, Vec<u16>> = Runner::new(recorder);
        let answer = runner.run_write_first(&"numbers please".to_string()).await.unwrap();
        assert_eq!(answer, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn wrong_reply_type_is_codec_error() {
        let reply = crate::codec::encode(&"text".to_string()).unwrap();
        let recorder = Recorder {
            inbound: vec![reply],
            ..Default::default()
        };
        let mut runner: Runner<_, u8, u64> = Runner::new(recorder);
        let err = runner.run_read_first(&7).await.unwrap_err();
        assert!(matches!(err, RunnerError::Codec(CodecError::TypeMismatch { .. })));
    }

    /// Multi-peer endpoint answering reads with per-slot payloads.
    #[derive(Default)]
    struct SlotRecorder {
        writes: Vec<Vec<u8>>,
        inbound: Vec<(usize, Vec<u8>)>,
    }

    #[async_trait]
    impl Endpoint for SlotRecorder {
        type Inbound = Vec<(usize, Vec<u8>)>;

        async fn connect(&mut self) -> Result<()> {
            Ok(())
        }

        async fn write(&mut self, payload: &[u8]) -> Result<()> {
            self.writes.push(payload.to_vec());
            Ok(())
        }

        async fn read(&mut self) -> Result<Vec<(usize, Vec<u8>)>> {
            Ok(std::mem::take(&mut self.inbound))
        }

        fn disconnect(&mut self) {}
    }

    #[tokio::test]
    async fn multi_peer_replies_decode_per_slot() {
        let recorder = SlotRecorder {
            inbound: vec![
                (0, crate::codec::encode(&10u32).unwrap()),
                (2, crate::codec::encode(&30u32).unwrap()),
            ],
            ..Default::default()
        };
        let mut runner: Runner<_, String, u32> = Runner::new(recorder);
        let answers = runner.run_read_first(&"total".to_string()).await.unwrap();
        assert_eq!(answers, vec![(0, 10), (2, 30)]);

        let sent = &runner.endpoint().writes;
        assert_eq!(sent.len(), 1);
        assert_eq!(crate::codec::decode::<String>(&sent[0]).unwrap(), "total");
    }

    #[tokio::test]
    async fn one_bad_slot_fails_the_multi_peer_decode() {
        let recorder = SlotRecorder {
            inbound: vec![
                (0, crate::codec::encode(&1u32).unwrap()),
                (1, crate::codec::encode(&"nope".to_string()).unwrap()),
            ],
            ..Default::default()
        };
        let mut runner: Runner<_, (), u32> = Runner::new(recorder);
        let err = runner.run_write_first(&()).await.unwrap_err();
        assert!(matches!(err, RunnerError::Codec(CodecError::TypeMismatch { .. })));
    }

    #[tokio::test]
    async fn failure_disconnects() {
        let recorder = Recorder {
            fail_connect: true,
            ..Default::default()
        };
        let mut runner: Runner<_, (), ()> = Runner::new(recorder);
        let err = runner.run_write_first_raw(b"x").await.unwrap_err();
        assert!(matches!(err, RunnerError::Endpoint(Error::ConnectTimedOut { .. })));
        assert_eq!(runner.endpoint().calls, ["connect", "disconnect"]);
    }
}

//! Typed value to byte conversion.
//!
//! Encoded bytes are a bincode envelope holding the Rust type name of the
//! value and the bincode payload. Decoding checks the name first, so asking
//! for the wrong type fails with [`CodecError::TypeMismatch`] rather than a
//! garbled value or a generic decode failure.
//!
//! Type names come from [`std::any::type_name`], so both ends must be built
//! from the same definitions.

use std::marker::PhantomData;

use bincode::Options;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from the byte codec.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to encode value: {0}")]
    Encode(#[source] bincode::Error),
    #[error("malformed payload: {0}")]
    Decode(#[source] bincode::Error),
    #[error("payload holds {found}, expected {expected}")]
    TypeMismatch { expected: String, found: String },
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    type_tag: &'a str,
    payload: Vec<u8>,
}

#[derive(Deserialize)]
struct Envelope {
    type_tag: String,
    payload: Vec<u8>,
}

fn options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .reject_trailing_bytes()
}

/// Encode `value` into bytes that [`decode`] turns back into an equal value.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, CodecError> {
    let payload = options().serialize(value).map_err(CodecError::Encode)?;
    let envelope = EnvelopeRef {
        type_tag: std::any::type_name::<T>(),
        payload,
    };
    options().serialize(&envelope).map_err(CodecError::Encode)
}

/// Decode bytes produced by [`encode`] for the same type.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    let envelope: Envelope = options().deserialize(bytes).map_err(CodecError::Decode)?;

    let expected = std::any::type_name::<T>();
    if envelope.type_tag != expected {
        return Err(CodecError::TypeMismatch {
            expected: expected.to_string(),
            found: envelope.type_tag,
        });
    }

    options()
        .deserialize(&envelope.payload)
        .map_err(CodecError::Decode)
}

/// Codec bound to one value type.
#[derive(Debug)]
pub struct Codec<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> Codec<T> {
    pub fn new() -> Self {
        Self { _marker: PhantomData }
    }
}

impl<T> Default for Codec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Codec<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Codec<T> {}

impl<T: Serialize> Codec<T> {
    pub fn encode(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        encode(value)
    }
}

impl<T: DeserializeOwned> Codec<T> {
    pub fn decode(&self, bytes: &[u8]) -> Result<T, CodecError> {
        decode(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Reading {
        sensor: String,
        values: Vec<f64>,
        tags: BTreeMap<String, u32>,
        status: Status,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    enum Status {
        Ok,
        Degraded { reason: String },
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Other {
        sensor: String,
    }

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("cannot serialize this value"))
        }
    }

    fn sample() -> Reading {
        let mut tags = BTreeMap::new();
        tags.insert("floor".to_string(), 3);
        Reading {
            sensor: "north-wall".to_string(),
            values: vec![20.5, 21.0, -3.25],
            tags,
            status: Status::Degraded {
                reason: "drift".to_string(),
            },
        }
    }

    #[test]
    fn round_trip_preserves_value() {
        let value = sample();
        let bytes = encode(&value).unwrap();
        assert_eq!(decode::<Reading>(&bytes).unwrap(), value);

        let codec = Codec::<Vec<Option<String>>>::new();
        let list = vec![Some("a".to_string()), None, Some(String::new())];
        assert_eq!(codec.decode(&codec.encode(&list).unwrap()).unwrap(), list);
    }

    #[test]
    fn wrong_type_is_a_type_mismatch() {
        let bytes = encode(&sample()).unwrap();
        match decode::<Other>(&bytes) {
            Err(CodecError::TypeMismatch { expected, found }) => {
                assert!(expected.ends_with("Other"));
                assert!(found.ends_with("Reading"));
            }
            other => panic!("expected type mismatch, got {:?}", other),
        }
    }

    #[test]
    fn truncated_bytes_are_malformed() {
        let bytes = encode(&sample()).unwrap();
        let err = decode::<Reading>(&bytes[..bytes.len() - 3]).unwrap_err();
        assert!(matches!(err, CodecError::Decode(_)));

        assert!(matches!(decode::<Reading>(&[]), Err(CodecError::Decode(_))));
    }

    #[test]
    fn trailing_bytes_are_malformed() {
        let mut bytes = encode(&42u32).unwrap();
        bytes.push(0);
        assert!(matches!(decode::<u32>(&bytes), Err(CodecError::Decode(_))));
    }

    #[test]
    fn unserializable_value_fails_to_encode() {
        assert!(matches!(encode(&Unserializable), Err(CodecError::Encode(_))));
    }

    fn status() -> impl Strategy<Value = Status> {
        prop_oneof![
            Just(Status::Ok),
            ".*".prop_map(|reason| Status::Degraded { reason }),
        ]
    }

    fn reading() -> impl Strategy<Value = Reading> {
        (
            any::<String>(),
            prop::collection::vec(-1.0e12f64..1.0e12, 0..16),
            prop::collection::btree_map(any::<String>(), any::<u32>(), 0..8),
            status(),
        )
            .prop_map(|(sensor, values, tags, status)| Reading {
                sensor,
                values,
                tags,
                status,
            })
    }

    proptest! {
        #[test]
        fn any_reading_round_trips(value in reading()) {
            let bytes = encode(&value).unwrap();
            prop_assert_eq!(decode::<Reading>(&bytes).unwrap(), value);
        }

        #[test]
        fn any_nested_collection_round_trips(
            value in prop::collection::vec(
                prop::option::of((any::<i64>(), any::<String>(), any::<Vec<u8>>())),
                0..16,
            )
        ) {
            let bytes = encode(&value).unwrap();
            prop_assert_eq!(decode::<Vec<Option<(i64, String, Vec<u8>)>>>(&bytes).unwrap(), value);
        }

        #[test]
        fn decoding_as_another_type_is_a_mismatch(value in reading(), text in any::<String>()) {
            let bytes = encode(&value).unwrap();
            let is_mismatch = matches!(decode::<Other>(&bytes), Err(CodecError::TypeMismatch { .. }));
            prop_assert!(is_mismatch);

            let bytes = encode(&text).unwrap();
            let is_mismatch = matches!(decode::<Vec<u8>>(&bytes), Err(CodecError::TypeMismatch { .. }));
            prop_assert!(is_mismatch);
        }
    }
}

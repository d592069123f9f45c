//! Bincode codec for tonic
//!
//! Gateway messages are serde types, so the gRPC framing carries bincode
//! payloads instead of protobuf.

use bytes::{Buf, BufMut};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use tonic::codec::{Codec, DecodeBuf, Decoder, EncodeBuf, Encoder};
use tonic::Status;

/// Codec that encodes `E` and decodes `D` with bincode
#[derive(Debug)]
pub struct BincodeCodec<E, D> {
    _marker: PhantomData<fn(E) -> D>,
}

impl<E, D> Default for BincodeCodec<E, D> {
    fn default() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<E, D> Codec for BincodeCodec<E, D>
where
    E: Serialize + Send + 'static,
    D: DeserializeOwned + Send + 'static,
{
    type Encode = E;
    type Decode = D;
    type Encoder = BincodeEncoder<E>;
    type Decoder = BincodeDecoder<D>;

    fn encoder(&mut self) -> Self::Encoder {
        BincodeEncoder(PhantomData)
    }

    fn decoder(&mut self) -> Self::Decoder {
        BincodeDecoder(PhantomData)
    }
}

#[derive(Debug)]
pub struct BincodeEncoder<E>(PhantomData<fn(E)>);

impl<E: Serialize> Encoder for BincodeEncoder<E> {
    type Item = E;
    type Error = Status;

    fn encode(&mut self, item: Self::Item, dst: &mut EncodeBuf<'_>) -> Result<(), Self::Error> {
        bincode::serialize_into(dst.writer(), &item)
            .map_err(|e| Status::internal(format!("Failed to encode message: {}", e)))
    }
}

#[derive(Debug)]
pub struct BincodeDecoder<D>(PhantomData<fn() -> D>);

impl<D: DeserializeOwned> Decoder for BincodeDecoder<D> {
    type Item = D;
    type Error = Status;

    fn decode(&mut self, src: &mut DecodeBuf<'_>) -> Result<Option<Self::Item>, Self::Error> {
        let bytes = src.copy_to_bytes(src.remaining());
        bincode::deserialize(&bytes)
            .map(Some)
            .map_err(|e| Status::internal(format!("Failed to decode message: {}", e)))
    }
}

//! Protobuf definitions and codec for the `proto.v1` HTTP envelope messages.
//!
//! The messages carry an HTTP request from a gateway to a sandboxed runtime
//! ([`HttpRequest`]) and the result back ([`HttpResponse`]). Both are encoded
//! with the protobuf binary wire format by a single table-driven codec; see
//! [`schema`] for the field tables and [`codec`] for the encoder and decoder.

use bytes::BufMut;

pub mod codec;
mod convert;
mod error;
pub mod framing;
pub mod sandbox;
pub mod schema;
mod types;

pub use convert::HttpConversionError;
pub use error::{DecodeError, DecodeErrorKind};
pub use framing::{FrameError, SandboxOutput};
pub use schema::{FieldDescriptor, FieldKind, MessageDescriptor};
pub use types::{HeaderFields, HttpRequest, HttpResponse};

/// Trait implemented by the `proto.v1` record types.
///
/// Implementors only describe where their fields live; encoding and decoding
/// are provided by the generic [`codec`].
pub trait Message: Default + Sized {
    /// Gets the schema table of the message.
    fn descriptor() -> &'static MessageDescriptor;

    /// Gets a view of the storage for the given field number.
    fn field(&self, number: u32) -> Option<schema::FieldRef<'_>>;

    /// Gets a mutable view of the storage for the given field number.
    fn field_mut(&mut self, number: u32) -> Option<schema::FieldMut<'_>>;

    /// Encodes the message into the given buffer.
    fn encode(&self, buf: &mut impl BufMut) {
        codec::encode(self, buf)
    }

    /// Encodes the message into a new byte vector.
    fn encode_to_vec(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        self.encode(&mut buf);
        buf
    }

    /// Gets the length of the message's encoding.
    fn encoded_len(&self) -> usize {
        codec::encoded_len(self)
    }

    /// Decodes a message from bytes.
    ///
    /// Fields absent from `bytes` take their zero values.
    fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut message = Self::default();
        message.merge(bytes)?;
        Ok(message)
    }

    /// Merges encoded bytes into this message.
    fn merge(&mut self, bytes: &[u8]) -> Result<(), DecodeError> {
        codec::merge(self, bytes)
    }
}

use prost::encoding::WireType;
use std::borrow::Cow;
use thiserror::Error;

/// The kind of a [`DecodeError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DecodeErrorKind {
    /// The input does not follow the tag/length/value structure.
    MalformedInput,
    /// A known field was present with an incompatible wire type.
    FieldTypeMismatch,
}

/// Errors that occur while decoding a message from bytes.
///
/// A decode error is terminal for the message being decoded; no partially
/// decoded record is ever returned alongside it.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("malformed `{message}` input: {reason}")]
    MalformedInput {
        /// The fully-qualified name of the message being decoded.
        message: &'static str,
        /// A description of what was wrong with the input.
        reason: Cow<'static, str>,
    },

    #[error(
        "field `{field}` (#{number}) of `{message}` expects wire type {expected:?} but found {found:?}"
    )]
    FieldTypeMismatch {
        /// The fully-qualified name of the message being decoded.
        message: &'static str,
        /// The name of the offending field.
        field: &'static str,
        /// The number of the offending field.
        number: u32,
        /// The wire type implied by the field's declared kind.
        expected: WireType,
        /// The wire type found on the wire.
        found: WireType,
    },
}

impl DecodeError {
    pub(crate) fn malformed(message: &'static str, reason: impl Into<Cow<'static, str>>) -> Self {
        Self::MalformedInput {
            message,
            reason: reason.into(),
        }
    }

    /// Gets the kind of the error.
    pub fn kind(&self) -> DecodeErrorKind {
        match self {
            Self::MalformedInput { .. } => DecodeErrorKind::MalformedInput,
            Self::FieldTypeMismatch { .. } => DecodeErrorKind::FieldTypeMismatch,
        }
    }

    /// Gets the fully-qualified name of the message that failed to decode.
    pub fn message_name(&self) -> &'static str {
        match self {
            Self::MalformedInput { message, .. } | Self::FieldTypeMismatch { message, .. } => {
                message
            }
        }
    }
}

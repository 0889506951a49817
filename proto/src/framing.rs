//! Framing of a sandboxed handler's stdout.
//!
//! A handler running inside the sandbox shares stdout between its own log
//! output and its reply. The reply is written last: the encoded
//! [`HttpResponse`] followed by a two byte little-endian trailer holding the
//! length of the encoding.
//!
//! ```text
//! | logs ... | encoded HTTPResponse | len: u16 LE |
//! ```
//!
//! Older handlers ended their output with an eight byte trailer of a `u32`
//! status and a `u32` body length instead. That format carries no encoded
//! response and is not parsed here.

use crate::{DecodeError, HttpResponse, Message};
use bytes::{Buf, BufMut};
use std::borrow::Cow;
use thiserror::Error;

/// The size of the length trailer in bytes.
pub const TRAILER_LEN: usize = 2;

/// Errors that occur while framing or unframing sandbox output.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("encoded response of {len} bytes exceeds the maximum frame size of {max} bytes", max = u16::MAX)]
    MessageTooLarge { len: usize },

    #[error(
        "expected at least {expected} trailer bytes in sandbox output, found {len}",
        expected = TRAILER_LEN
    )]
    MissingTrailer { len: usize },

    #[error("trailer declares a {declared} byte response but only {available} bytes precede it")]
    LengthOutOfBounds { declared: usize, available: usize },

    #[error("failed to decode the sandbox response")]
    Decode(#[from] DecodeError),
}

/// Encodes a response and appends the length trailer.
pub fn frame_response(response: &HttpResponse) -> Result<Vec<u8>, FrameError> {
    let len = response.encoded_len();
    let trailer = u16::try_from(len).map_err(|_| FrameError::MessageTooLarge { len })?;

    let mut buf = Vec::with_capacity(len + TRAILER_LEN);
    response.encode(&mut buf);
    buf.put_u16_le(trailer);
    Ok(buf)
}

/// Sandbox output split into the handler's logs and the framed message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SandboxOutput<'a> {
    /// Everything written before the response.
    pub logs: &'a [u8],
    /// The encoded response.
    pub message: &'a [u8],
}

impl<'a> SandboxOutput<'a> {
    /// Iterates the log output line by line, replacing invalid UTF-8.
    pub fn log_lines(&self) -> impl Iterator<Item = Cow<'a, str>> {
        self.logs
            .split(|b| *b == b'\n')
            .filter(|line| !line.is_empty())
            .map(String::from_utf8_lossy)
    }
}

/// Splits sandbox output into logs and the framed message bytes.
pub fn split_output(output: &[u8]) -> Result<SandboxOutput<'_>, FrameError> {
    let Some(available) = output.len().checked_sub(TRAILER_LEN) else {
        return Err(FrameError::MissingTrailer { len: output.len() });
    };

    let mut trailer = &output[available..];
    let declared = usize::from(trailer.get_u16_le());
    if declared > available {
        return Err(FrameError::LengthOutOfBounds {
            declared,
            available,
        });
    }

    let (logs, message) = output[..available].split_at(available - declared);
    Ok(SandboxOutput { logs, message })
}

/// Splits sandbox output and decodes the framed response.
pub fn parse_output(output: &[u8]) -> Result<(SandboxOutput<'_>, HttpResponse), FrameError> {
    let output = split_output(output)?;
    let response = HttpResponse::decode(output.message)?;
    tracing::debug!(
        log_bytes = output.logs.len(),
        message_bytes = output.message.len(),
        code = response.code,
        "parsed sandbox output"
    );
    Ok((output, response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DecodeErrorKind, HeaderFields};
    use pretty_assertions::assert_eq;

    fn response() -> HttpResponse {
        HttpResponse {
            body: b"hello".to_vec(),
            code: 200,
            request_id: String::new(),
            header: [("Content-Type".to_string(), HeaderFields::new(["text/plain"]))]
                .into_iter()
                .collect(),
        }
    }

    #[test]
    fn frames_with_little_endian_length() {
        let framed = frame_response(&response()).unwrap();
        let len = response().encoded_len();
        assert_eq!(framed.len(), len + TRAILER_LEN);
        assert_eq!(&framed[len..], &(len as u16).to_le_bytes());
        assert_eq!(&framed[..len], response().encode_to_vec().as_slice());
    }

    #[test]
    fn parses_output_with_logs() {
        let mut output = b"starting handler\nhandled GET /\n".to_vec();
        output.extend(frame_response(&response()).unwrap());

        let (split, decoded) = parse_output(&output).unwrap();
        assert_eq!(decoded, response());
        assert_eq!(
            split.log_lines().collect::<Vec<_>>(),
            ["starting handler", "handled GET /"]
        );
    }

    #[test]
    fn empty_response_frame() {
        let framed = frame_response(&HttpResponse::default()).unwrap();
        assert_eq!(framed, [0u8, 0]);

        let (split, decoded) = parse_output(b"log\x00\x00").unwrap();
        assert_eq!(split.logs, b"log");
        assert!(split.message.is_empty());
        assert_eq!(decoded, HttpResponse::default());
    }

    #[test]
    fn rejects_oversized_responses() {
        let response = HttpResponse {
            body: vec![0; usize::from(u16::MAX)],
            ..Default::default()
        };
        assert!(matches!(
            frame_response(&response),
            Err(FrameError::MessageTooLarge { .. })
        ));
    }

    #[test]
    fn rejects_bad_trailers() {
        assert!(matches!(
            split_output(b"x"),
            Err(FrameError::MissingTrailer { len: 1 })
        ));
        assert!(matches!(
            split_output(b"ab\x05\x00"),
            Err(FrameError::LengthOutOfBounds {
                declared: 5,
                available: 2
            })
        ));

        // a length pointing into the middle of the logs yields garbage that
        // must fail to decode instead of producing a response
        let err = parse_output(b"\x10\xC8\x01\x01\x00").unwrap_err();
        match err {
            FrameError::Decode(e) => assert_eq!(e.kind(), DecodeErrorKind::MalformedInput),
            other => panic!("unexpected error: {other}"),
        }
    }
}

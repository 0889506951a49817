//! The generic, table-driven protobuf codec.
//!
//! Encoding walks a message's [`MessageDescriptor`] in field number order and
//! writes every non-zero field. Map entries are written in ascending key order
//! so the same record always produces the same bytes.
//!
//! Decoding reads tag/value pairs until the input is exhausted, dispatching on
//! the field table. Unknown fields are skipped.

use crate::error::DecodeError;
use crate::schema::{FieldDescriptor, FieldMut, FieldRef, MessageDescriptor};
use crate::types::HeaderFields;
use crate::Message;
use bytes::{Buf, BufMut};
use prost::encoding::{
    decode_key, decode_varint, encode_key, encode_varint, encoded_len_varint, key_len,
    skip_field, DecodeContext, WireType,
};
use std::collections::HashMap;

/// Field number of a map entry's key.
const ENTRY_KEY: u32 = 1;
/// Field number of a map entry's value.
const ENTRY_VALUE: u32 = 2;

/// Encodes a message into the given buffer.
pub fn encode<M: Message>(message: &M, buf: &mut impl BufMut) {
    for field in M::descriptor().fields {
        if let Some(value) = message.field(field.number) {
            encode_field(field.number, value, buf);
        }
    }
}

/// Gets the exact number of bytes [`encode`] writes for a message.
pub fn encoded_len<M: Message>(message: &M) -> usize {
    M::descriptor()
        .fields
        .iter()
        .filter_map(|field| {
            message
                .field(field.number)
                .map(|value| field_len(field.number, value))
        })
        .sum()
}

/// Merges the encoded bytes into an existing message.
///
/// Singular fields present in `bytes` overwrite the current values, repeated
/// fields are appended and map entries replace existing entries with the same
/// key. On error the message may have been partially updated.
pub fn merge<M: Message>(message: &mut M, mut buf: &[u8]) -> Result<(), DecodeError> {
    let descriptor = M::descriptor();
    while buf.has_remaining() {
        let (number, wire_type) = decode_key(&mut buf)
            .map_err(|e| DecodeError::malformed(descriptor.name, e.to_string()))?;

        let Some(field) = descriptor.field(number) else {
            tracing::trace!(
                name = descriptor.name,
                number,
                ?wire_type,
                "skipping unknown field"
            );
            skip_field(wire_type, number, &mut buf, DecodeContext::default())
                .map_err(|e| DecodeError::malformed(descriptor.name, e.to_string()))?;
            continue;
        };

        check_wire_type(descriptor, field, field.kind.wire_type(), wire_type)?;

        let slot = message.field_mut(number).ok_or_else(|| {
            DecodeError::malformed(
                descriptor.name,
                format!("message has no storage for field `{}`", field.name),
            )
        })?;
        merge_field(descriptor, field, slot, &mut buf)?;
    }

    Ok(())
}

fn encode_field(number: u32, value: FieldRef<'_>, buf: &mut impl BufMut) {
    match value {
        FieldRef::Bytes(v) if !v.is_empty() => encode_delimited(number, v, buf),
        FieldRef::String(v) if !v.is_empty() => encode_delimited(number, v.as_bytes(), buf),
        FieldRef::Int32(v) if v != 0 => {
            encode_key(number, WireType::Varint, buf);
            encode_varint(int32_to_varint(v), buf);
        }
        FieldRef::RepeatedString(values) => {
            for v in values {
                encode_delimited(number, v.as_bytes(), buf);
            }
        }
        FieldRef::StringMap(map) => {
            for (key, value) in sorted_entries(map) {
                encode_key(number, WireType::LengthDelimited, buf);
                encode_varint(
                    (delimited_len(ENTRY_KEY, key.len()) + delimited_len(ENTRY_VALUE, value.len()))
                        as u64,
                    buf,
                );
                encode_delimited(ENTRY_KEY, key.as_bytes(), buf);
                encode_delimited(ENTRY_VALUE, value.as_bytes(), buf);
            }
        }
        FieldRef::HeaderMap(map) => {
            for (key, value) in sorted_entries(map) {
                let value_len = value.encoded_len();
                encode_key(number, WireType::LengthDelimited, buf);
                encode_varint(
                    (delimited_len(ENTRY_KEY, key.len()) + delimited_len(ENTRY_VALUE, value_len))
                        as u64,
                    buf,
                );
                encode_delimited(ENTRY_KEY, key.as_bytes(), buf);
                encode_key(ENTRY_VALUE, WireType::LengthDelimited, buf);
                encode_varint(value_len as u64, buf);
                encode(value, buf);
            }
        }
        // Zero-valued scalars are elided.
        FieldRef::Bytes(_) | FieldRef::String(_) | FieldRef::Int32(_) => {}
    }
}

fn field_len(number: u32, value: FieldRef<'_>) -> usize {
    if value.is_zero() {
        return 0;
    }

    match value {
        FieldRef::Bytes(v) => delimited_len(number, v.len()),
        FieldRef::String(v) => delimited_len(number, v.len()),
        FieldRef::Int32(v) => key_len(number) + encoded_len_varint(int32_to_varint(v)),
        FieldRef::RepeatedString(values) => values
            .iter()
            .map(|v| delimited_len(number, v.len()))
            .sum(),
        FieldRef::StringMap(map) => map
            .iter()
            .map(|(key, value)| {
                delimited_len(
                    number,
                    delimited_len(ENTRY_KEY, key.len()) + delimited_len(ENTRY_VALUE, value.len()),
                )
            })
            .sum(),
        FieldRef::HeaderMap(map) => map
            .iter()
            .map(|(key, value)| {
                delimited_len(
                    number,
                    delimited_len(ENTRY_KEY, key.len())
                        + delimited_len(ENTRY_VALUE, value.encoded_len()),
                )
            })
            .sum(),
    }
}

fn merge_field(
    descriptor: &'static MessageDescriptor,
    field: &FieldDescriptor,
    slot: FieldMut<'_>,
    buf: &mut &[u8],
) -> Result<(), DecodeError> {
    match slot {
        FieldMut::Bytes(v) => {
            let data = read_delimited(descriptor, buf)?;
            v.clear();
            v.extend_from_slice(data);
        }
        FieldMut::String(v) => {
            let data = read_delimited(descriptor, buf)?;
            *v = read_string(descriptor, field, data)?;
        }
        FieldMut::Int32(v) => {
            let value = decode_varint(buf)
                .map_err(|e| DecodeError::malformed(descriptor.name, e.to_string()))?;
            // `int32` values are truncated to their low 32 bits.
            *v = value as i32;
        }
        FieldMut::RepeatedString(values) => {
            let data = read_delimited(descriptor, buf)?;
            values.push(read_string(descriptor, field, data)?);
        }
        FieldMut::StringMap(map) => {
            let entry = read_delimited(descriptor, buf)?;
            let (key, value) = merge_entry(descriptor, field, entry, |value: &mut String, data| {
                *value = read_string(descriptor, field, data)?;
                Ok(())
            })?;
            map.insert(key, value);
        }
        FieldMut::HeaderMap(map) => {
            let entry = read_delimited(descriptor, buf)?;
            let (key, value) =
                merge_entry(descriptor, field, entry, |value: &mut HeaderFields, data| {
                    merge(value, data)
                })?;
            map.insert(key, value);
        }
    }

    Ok(())
}

/// Decodes a single map entry; both key and value default when absent.
fn merge_entry<V: Default>(
    descriptor: &'static MessageDescriptor,
    field: &FieldDescriptor,
    mut entry: &[u8],
    mut merge_value: impl FnMut(&mut V, &[u8]) -> Result<(), DecodeError>,
) -> Result<(String, V), DecodeError> {
    let mut key = String::new();
    let mut value = V::default();

    while entry.has_remaining() {
        let (number, wire_type) = decode_key(&mut entry)
            .map_err(|e| DecodeError::malformed(descriptor.name, e.to_string()))?;
        match number {
            ENTRY_KEY | ENTRY_VALUE => {
                check_wire_type(descriptor, field, WireType::LengthDelimited, wire_type)?;
                let data = read_delimited(descriptor, &mut entry)?;
                if number == ENTRY_KEY {
                    key = read_string(descriptor, field, data)?;
                } else {
                    merge_value(&mut value, data)?;
                }
            }
            _ => skip_field(wire_type, number, &mut entry, DecodeContext::default())
                .map_err(|e| DecodeError::malformed(descriptor.name, e.to_string()))?,
        }
    }

    Ok((key, value))
}

fn check_wire_type(
    descriptor: &'static MessageDescriptor,
    field: &FieldDescriptor,
    expected: WireType,
    found: WireType,
) -> Result<(), DecodeError> {
    if expected == found {
        return Ok(());
    }

    Err(DecodeError::FieldTypeMismatch {
        message: descriptor.name,
        field: field.name,
        number: field.number,
        expected,
        found,
    })
}

fn read_delimited<'a>(
    descriptor: &'static MessageDescriptor,
    buf: &mut &'a [u8],
) -> Result<&'a [u8], DecodeError> {
    let len =
        decode_varint(buf).map_err(|e| DecodeError::malformed(descriptor.name, e.to_string()))?;
    let remaining = buf.len();
    if len > remaining as u64 {
        return Err(DecodeError::malformed(
            descriptor.name,
            format!("length prefix of {len} bytes exceeds the {remaining} bytes remaining"),
        ));
    }

    let input: &'a [u8] = buf;
    let (data, rest) = input.split_at(len as usize);
    *buf = rest;
    Ok(data)
}

fn read_string(
    descriptor: &'static MessageDescriptor,
    field: &FieldDescriptor,
    data: &[u8],
) -> Result<String, DecodeError> {
    std::str::from_utf8(data).map(str::to_owned).map_err(|e| {
        DecodeError::malformed(
            descriptor.name,
            format!("field `{}` is not valid UTF-8: {e}", field.name),
        )
    })
}

fn encode_delimited(number: u32, data: &[u8], buf: &mut impl BufMut) {
    encode_key(number, WireType::LengthDelimited, buf);
    encode_varint(data.len() as u64, buf);
    buf.put_slice(data);
}

fn delimited_len(number: u32, len: usize) -> usize {
    key_len(number) + encoded_len_varint(len as u64) + len
}

/// Negative values are sign-extended to ten bytes, as every protobuf runtime
/// does for `int32`.
fn int32_to_varint(value: i32) -> u64 {
    value as i64 as u64
}

fn sorted_entries<V>(map: &HashMap<String, V>) -> Vec<(&String, &V)> {
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
    entries
}

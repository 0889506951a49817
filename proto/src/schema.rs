//! Schema tables for the `proto.v1` messages.
//!
//! Every message is described as data: a list of field numbers, names and
//! kinds. The generic codec in [`crate::codec`] walks these tables instead of
//! relying on per-message encode/decode code.

use crate::types::HeaderFields;
use prost::encoding::WireType;
use std::collections::HashMap;
use std::fmt;

/// The declared kind of a message field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// `bytes`
    Bytes,
    /// `string`
    String,
    /// `int32`
    Int32,
    /// `repeated string`
    RepeatedString,
    /// `map<string, string>`
    StringMap,
    /// `map<string, HeaderFields>`
    HeaderMap,
}

impl FieldKind {
    /// Gets the wire type every occurrence of a field of this kind must use.
    pub fn wire_type(self) -> WireType {
        match self {
            FieldKind::Int32 => WireType::Varint,
            FieldKind::Bytes
            | FieldKind::String
            | FieldKind::RepeatedString
            | FieldKind::StringMap
            | FieldKind::HeaderMap => WireType::LengthDelimited,
        }
    }

    /// Gets the protobuf type name of the kind.
    pub fn type_name(self) -> &'static str {
        match self {
            FieldKind::Bytes => "bytes",
            FieldKind::String => "string",
            FieldKind::Int32 => "int32",
            FieldKind::RepeatedString => "repeated string",
            FieldKind::StringMap => "map<string, string>",
            FieldKind::HeaderMap => "map<string, proto.v1.HeaderFields>",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Describes a single field of a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// The field number used as the wire tag.
    pub number: u32,
    /// The field name as declared in the schema.
    pub name: &'static str,
    /// The declared kind of the field.
    pub kind: FieldKind,
}

/// Describes a message: its fully-qualified name and its fields.
///
/// Fields are listed in ascending field number order, which is also the order
/// the codec emits them in.
#[derive(Debug, PartialEq, Eq)]
pub struct MessageDescriptor {
    /// The fully-qualified protobuf name of the message.
    pub name: &'static str,
    /// The fields of the message.
    pub fields: &'static [FieldDescriptor],
}

impl MessageDescriptor {
    /// Looks up a field by its number.
    pub fn field(&self, number: u32) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.number == number)
    }

    /// Looks up a field by its declared name.
    pub fn field_by_name(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Gets the short name of the message (without the package).
    pub fn short_name(&self) -> &'static str {
        self.name.rsplit('.').next().unwrap_or(self.name)
    }
}

const fn field(number: u32, name: &'static str, kind: FieldKind) -> FieldDescriptor {
    FieldDescriptor { number, name, kind }
}

/// Schema of `proto.v1.HTTPRequest`.
pub static HTTP_REQUEST: MessageDescriptor = MessageDescriptor {
    name: "proto.v1.HTTPRequest",
    fields: &[
        field(1, "body", FieldKind::Bytes),
        field(2, "method", FieldKind::String),
        field(3, "url", FieldKind::String),
        field(4, "endpoint_id", FieldKind::String),
        field(5, "env", FieldKind::StringMap),
        field(6, "header", FieldKind::HeaderMap),
        field(7, "runtime", FieldKind::String),
        field(8, "deployment_id", FieldKind::String),
        field(9, "id", FieldKind::String),
    ],
};

/// Schema of `proto.v1.HeaderFields`.
pub static HEADER_FIELDS: MessageDescriptor = MessageDescriptor {
    name: "proto.v1.HeaderFields",
    fields: &[field(1, "fields", FieldKind::RepeatedString)],
};

/// Schema of `proto.v1.HTTPResponse`.
pub static HTTP_RESPONSE: MessageDescriptor = MessageDescriptor {
    name: "proto.v1.HTTPResponse",
    fields: &[
        field(1, "body", FieldKind::Bytes),
        field(2, "code", FieldKind::Int32),
        field(3, "request_id", FieldKind::String),
        field(4, "header", FieldKind::HeaderMap),
    ],
};

/// A shared view of a field's storage.
#[derive(Debug, Clone, Copy)]
pub enum FieldRef<'a> {
    Bytes(&'a [u8]),
    String(&'a str),
    Int32(i32),
    RepeatedString(&'a [String]),
    StringMap(&'a HashMap<String, String>),
    HeaderMap(&'a HashMap<String, HeaderFields>),
}

impl FieldRef<'_> {
    /// Gets the kind of the referenced storage.
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldRef::Bytes(_) => FieldKind::Bytes,
            FieldRef::String(_) => FieldKind::String,
            FieldRef::Int32(_) => FieldKind::Int32,
            FieldRef::RepeatedString(_) => FieldKind::RepeatedString,
            FieldRef::StringMap(_) => FieldKind::StringMap,
            FieldRef::HeaderMap(_) => FieldKind::HeaderMap,
        }
    }

    /// Determines if the field holds its zero value and can be elided.
    pub fn is_zero(&self) -> bool {
        match self {
            FieldRef::Bytes(v) => v.is_empty(),
            FieldRef::String(v) => v.is_empty(),
            FieldRef::Int32(v) => *v == 0,
            FieldRef::RepeatedString(v) => v.is_empty(),
            FieldRef::StringMap(v) => v.is_empty(),
            FieldRef::HeaderMap(v) => v.is_empty(),
        }
    }
}

/// A mutable view of a field's storage, used while decoding.
#[derive(Debug)]
pub enum FieldMut<'a> {
    Bytes(&'a mut Vec<u8>),
    String(&'a mut String),
    Int32(&'a mut i32),
    RepeatedString(&'a mut Vec<String>),
    StringMap(&'a mut HashMap<String, String>),
    HeaderMap(&'a mut HashMap<String, HeaderFields>),
}

impl FieldMut<'_> {
    /// Gets the kind of the referenced storage.
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldMut::Bytes(_) => FieldKind::Bytes,
            FieldMut::String(_) => FieldKind::String,
            FieldMut::Int32(_) => FieldKind::Int32,
            FieldMut::RepeatedString(_) => FieldKind::RepeatedString,
            FieldMut::StringMap(_) => FieldKind::StringMap,
            FieldMut::HeaderMap(_) => FieldKind::HeaderMap,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HttpRequest, HttpResponse, Message};

    fn assert_accessors_match<M: Message>() {
        let mut message = M::default();
        for descriptor in M::descriptor().fields {
            let shared = message
                .field(descriptor.number)
                .unwrap_or_else(|| panic!("missing storage for `{}`", descriptor.name));
            assert_eq!(shared.kind(), descriptor.kind, "field `{}`", descriptor.name);
            assert!(shared.is_zero());

            let kind = message.field_mut(descriptor.number).map(|f| f.kind());
            assert_eq!(kind, Some(descriptor.kind), "field `{}`", descriptor.name);
        }

        assert!(message.field(0).is_none());
        assert!(message.field_mut(100).is_none());
    }

    #[test]
    fn accessors_agree_with_tables() {
        assert_accessors_match::<HttpRequest>();
        assert_accessors_match::<HttpResponse>();
        assert_accessors_match::<HeaderFields>();
    }

    #[test]
    fn fields_are_sorted_and_unique() {
        for descriptor in [&HTTP_REQUEST, &HEADER_FIELDS, &HTTP_RESPONSE] {
            assert!(
                descriptor
                    .fields
                    .windows(2)
                    .all(|w| w[0].number < w[1].number),
                "{} fields must be in ascending order",
                descriptor.name
            );
        }
    }

    #[test]
    fn lookup() {
        assert_eq!(HTTP_REQUEST.field(9).map(|f| f.name), Some("id"));
        assert_eq!(
            HTTP_RESPONSE.field_by_name("code").map(|f| f.number),
            Some(2)
        );
        assert!(HTTP_RESPONSE.field(5).is_none());
        assert_eq!(HTTP_REQUEST.short_name(), "HTTPRequest");
        assert_eq!(FieldKind::Int32.wire_type(), WireType::Varint);
        assert_eq!(
            FieldKind::HeaderMap.to_string(),
            "map<string, proto.v1.HeaderFields>"
        );
    }
}

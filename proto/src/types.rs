//! The `proto.v1` record types.

use crate::schema::{self, FieldMut, FieldRef, MessageDescriptor};
use crate::Message;
use serde::{Deserialize, Serialize};
use serde_with::{base64::Base64, serde_as};
use std::collections::HashMap;

/// All values sent for a single header name, in transmission order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderFields {
    /// The header values; duplicates are permitted.
    pub fields: Vec<String>,
}

impl HeaderFields {
    /// Creates header fields from the given values.
    pub fn new(fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Iterates the values in transmission order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<Vec<String>> for HeaderFields {
    fn from(fields: Vec<String>) -> Self {
        Self { fields }
    }
}

impl FromIterator<String> for HeaderFields {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl Message for HeaderFields {
    fn descriptor() -> &'static MessageDescriptor {
        &schema::HEADER_FIELDS
    }

    fn field(&self, number: u32) -> Option<FieldRef<'_>> {
        match number {
            1 => Some(FieldRef::RepeatedString(&self.fields)),
            _ => None,
        }
    }

    fn field_mut(&mut self, number: u32) -> Option<FieldMut<'_>> {
        match number {
            1 => Some(FieldMut::RepeatedString(&mut self.fields)),
            _ => None,
        }
    }
}

/// An HTTP request relayed across a process boundary.
#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpRequest {
    /// The request payload.
    #[serde_as(as = "Base64")]
    pub body: Vec<u8>,
    /// The HTTP method token, e.g. `GET`.
    pub method: String,
    /// The full request URL.
    pub url: String,
    /// The identifier of the endpoint being invoked.
    pub endpoint_id: String,
    /// Environment variables for the invocation.
    pub env: HashMap<String, String>,
    /// Request headers keyed by header name.
    pub header: HashMap<String, HeaderFields>,
    /// The runtime expected to execute the request.
    pub runtime: String,
    /// The identifier of the deployment to invoke.
    pub deployment_id: String,
    /// The identifier correlating the request with its response.
    ///
    /// Uniqueness among in-flight requests is up to the sender.
    pub id: String,
}

impl HttpRequest {
    /// Creates a response to this request with the given status and body.
    pub fn respond(&self, code: i32, body: impl Into<Vec<u8>>) -> HttpResponse {
        HttpResponse {
            body: body.into(),
            code,
            request_id: self.id.clone(),
            header: HashMap::new(),
        }
    }
}

impl Message for HttpRequest {
    fn descriptor() -> &'static MessageDescriptor {
        &schema::HTTP_REQUEST
    }

    fn field(&self, number: u32) -> Option<FieldRef<'_>> {
        Some(match number {
            1 => FieldRef::Bytes(&self.body),
            2 => FieldRef::String(&self.method),
            3 => FieldRef::String(&self.url),
            4 => FieldRef::String(&self.endpoint_id),
            5 => FieldRef::StringMap(&self.env),
            6 => FieldRef::HeaderMap(&self.header),
            7 => FieldRef::String(&self.runtime),
            8 => FieldRef::String(&self.deployment_id),
            9 => FieldRef::String(&self.id),
            _ => return None,
        })
    }

    fn field_mut(&mut self, number: u32) -> Option<FieldMut<'_>> {
        Some(match number {
            1 => FieldMut::Bytes(&mut self.body),
            2 => FieldMut::String(&mut self.method),
            3 => FieldMut::String(&mut self.url),
            4 => FieldMut::String(&mut self.endpoint_id),
            5 => FieldMut::StringMap(&mut self.env),
            6 => FieldMut::HeaderMap(&mut self.header),
            7 => FieldMut::String(&mut self.runtime),
            8 => FieldMut::String(&mut self.deployment_id),
            9 => FieldMut::String(&mut self.id),
            _ => return None,
        })
    }
}

/// The outcome of processing an [`HttpRequest`].
#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpResponse {
    /// The response payload.
    #[serde_as(as = "Base64")]
    pub body: Vec<u8>,
    /// The HTTP status code.
    pub code: i32,
    /// The `id` of the originating request.
    pub request_id: String,
    /// Response headers keyed by header name.
    pub header: HashMap<String, HeaderFields>,
}

impl HttpResponse {
    /// Creates an error response carrying `message` as its body.
    pub fn error(request_id: impl Into<String>, code: i32, message: impl Into<String>) -> Self {
        Self {
            body: message.into().into_bytes(),
            code,
            request_id: request_id.into(),
            header: HashMap::new(),
        }
    }

    /// Stamps the id of the originating request onto the response.
    pub fn correlate(mut self, request: &HttpRequest) -> Self {
        self.request_id.clone_from(&request.id);
        self
    }

    /// Determines if this response answers the given request.
    pub fn answers(&self, request: &HttpRequest) -> bool {
        self.request_id == request.id
    }
}

impl Message for HttpResponse {
    fn descriptor() -> &'static MessageDescriptor {
        &schema::HTTP_RESPONSE
    }

    fn field(&self, number: u32) -> Option<FieldRef<'_>> {
        Some(match number {
            1 => FieldRef::Bytes(&self.body),
            2 => FieldRef::Int32(self.code),
            3 => FieldRef::String(&self.request_id),
            4 => FieldRef::HeaderMap(&self.header),
            _ => return None,
        })
    }

    fn field_mut(&mut self, number: u32) -> Option<FieldMut<'_>> {
        Some(match number {
            1 => FieldMut::Bytes(&mut self.body),
            2 => FieldMut::Int32(&mut self.code),
            3 => FieldMut::String(&mut self.request_id),
            4 => FieldMut::HeaderMap(&mut self.header),
            _ => return None,
        })
    }
}

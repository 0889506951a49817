//! The JSON form exchanged with runtimes that have no protobuf support.
//!
//! Such runtimes receive the [`HttpRequest`] serialized as JSON (see the serde
//! implementations on the record types) and answer with a
//! [`SandboxResponse`].

use crate::{HeaderFields, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The response a JSON runtime writes back.
///
/// Unlike [`HttpResponse`], the body is plain text and header values are bare
/// lists.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxResponse {
    pub body: String,
    pub code: i32,
    pub request_id: String,
    pub header: HashMap<String, Vec<String>>,
}

impl SandboxResponse {
    /// Converts into an [`HttpResponse`] answering `request`.
    ///
    /// The request id reported by the sandbox is ignored; the response is
    /// always correlated with the request that was dispatched.
    pub fn into_response(self, request: &HttpRequest) -> HttpResponse {
        HttpResponse {
            body: self.body.into_bytes(),
            code: self.code,
            request_id: request.id.clone(),
            header: self
                .header
                .into_iter()
                .map(|(name, values)| (name, HeaderFields::from(values)))
                .collect(),
        }
    }
}

impl From<&HttpResponse> for SandboxResponse {
    fn from(response: &HttpResponse) -> Self {
        Self {
            body: String::from_utf8_lossy(&response.body).into_owned(),
            code: response.code,
            request_id: response.request_id.clone(),
            header: response
                .header
                .iter()
                .map(|(name, values)| (name.clone(), values.fields.clone()))
                .collect(),
        }
    }
}

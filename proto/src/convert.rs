//! Conversions between the envelope records and `http` crate types.

use crate::{HeaderFields, HttpRequest, HttpResponse};
use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::{Method, StatusCode, Uri};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that occur when converting a record into an `http` type.
#[derive(Debug, Error)]
pub enum HttpConversionError {
    #[error("invalid HTTP method `{0}`")]
    InvalidMethod(String),

    #[error("invalid request URL `{url}`")]
    InvalidUri {
        url: String,
        #[source]
        source: http::uri::InvalidUri,
    },

    #[error("invalid header name `{0}`")]
    InvalidHeaderName(String),

    #[error("invalid value for header `{0}`")]
    InvalidHeaderValue(String),

    #[error("status code {0} is not a valid HTTP status")]
    InvalidStatus(i32),

    #[error(transparent)]
    Http(#[from] http::Error),
}

impl HttpRequest {
    /// Creates a request envelope from an HTTP request.
    ///
    /// Only the method, URL, headers and body are filled in; routing fields
    /// such as `endpoint_id` and `id` are left for the caller.
    pub fn from_http(request: http::Request<Vec<u8>>) -> Self {
        let (parts, body) = request.into_parts();
        Self {
            body,
            method: parts.method.as_str().to_owned(),
            url: parts.uri.to_string(),
            header: header_fields(&parts.headers),
            ..Default::default()
        }
    }

    /// Rebuilds the HTTP request carried by the envelope.
    ///
    /// An empty method is treated as `GET`.
    pub fn to_http(&self) -> Result<http::Request<Vec<u8>>, HttpConversionError> {
        let method = if self.method.is_empty() {
            Method::GET
        } else {
            Method::from_bytes(self.method.as_bytes())
                .map_err(|_| HttpConversionError::InvalidMethod(self.method.clone()))?
        };

        let uri = self
            .url
            .parse::<Uri>()
            .map_err(|source| HttpConversionError::InvalidUri {
                url: self.url.clone(),
                source,
            })?;

        let mut request = http::Request::builder()
            .method(method)
            .uri(uri)
            .body(self.body.clone())?;
        *request.headers_mut() = header_map(&self.header)?;
        Ok(request)
    }
}

impl HttpResponse {
    /// Creates a response envelope answering the request with the given id.
    pub fn from_http(response: http::Response<Vec<u8>>, request_id: impl Into<String>) -> Self {
        let (parts, body) = response.into_parts();
        Self {
            body,
            code: i32::from(parts.status.as_u16()),
            request_id: request_id.into(),
            header: header_fields(&parts.headers),
        }
    }

    /// Rebuilds the HTTP response carried by the envelope.
    ///
    /// A zero code means the handler never set a status and maps to `200 OK`.
    pub fn to_http(&self) -> Result<http::Response<Vec<u8>>, HttpConversionError> {
        let status = match self.code {
            0 => StatusCode::OK,
            code => u16::try_from(code)
                .ok()
                .and_then(|c| StatusCode::from_u16(c).ok())
                .ok_or(HttpConversionError::InvalidStatus(code))?,
        };

        let mut response = http::Response::builder()
            .status(status)
            .body(self.body.clone())?;
        *response.headers_mut() = header_map(&self.header)?;
        Ok(response)
    }
}

/// Groups header values by name, keeping the order values were added in.
fn header_fields(headers: &HeaderMap) -> HashMap<String, HeaderFields> {
    let mut fields: HashMap<String, HeaderFields> = HashMap::new();
    for (name, value) in headers {
        fields
            .entry(name.as_str().to_owned())
            .or_default()
            .fields
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    fields
}

fn header_map(header: &HashMap<String, HeaderFields>) -> Result<HeaderMap, HttpConversionError> {
    let mut map = HeaderMap::new();
    for (name, fields) in header {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| HttpConversionError::InvalidHeaderName(name.clone()))?;
        for field in fields.iter() {
            let value = HeaderValue::from_str(field)
                .map_err(|_| HttpConversionError::InvalidHeaderValue(name.to_string()))?;
            map.append(name.clone(), value);
        }
    }
    Ok(map)
}

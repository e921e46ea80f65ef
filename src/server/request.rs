//! Request-side helpers shared by both transports: the body reader and the
//! transport-neutral request head.

use crate::error::ApiError;
use crate::ids::RequestId;
use may_minihttp::Request;
use serde_json::Value;
use std::io::Read;
use tracing::debug;

/// Header carrying a caller-supplied correlation id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Method, path and correlation id of an incoming request.
///
/// Built before the body is touched so routing never waits on the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHead {
    pub method: String,
    /// Path with the query string removed
    pub path: String,
    pub request_id: RequestId,
}

impl RequestHead {
    pub fn new(method: &str, raw_path: &str, request_id_header: Option<&str>) -> Self {
        Self {
            method: method.to_string(),
            path: strip_query(raw_path).to_string(),
            request_id: RequestId::from_header_or_new(request_id_header),
        }
    }

    /// Extract the head of a `may_minihttp` request without reading its body.
    pub fn from_minihttp(req: &Request) -> Self {
        let request_id = req
            .headers()
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(REQUEST_ID_HEADER))
            .and_then(|h| std::str::from_utf8(h.value).ok());
        Self::new(req.method(), req.path(), request_id)
    }
}

/// Drop everything from the first `?` on.
#[must_use]
pub fn strip_query(raw_path: &str) -> &str {
    raw_path
        .split_once('?')
        .map_or(raw_path, |(path, _)| path)
}

/// Read a request body to its end and decode it as a JSON object.
///
/// The read blocks the calling coroutine until every byte has arrived;
/// nothing is decoded from a partial body.
///
/// # Errors
///
/// [`ApiError::MalformedBody`] when the read fails, or the bytes are empty,
/// not JSON, or JSON other than an object.
pub fn read_json_body<R: Read + ?Sized>(reader: &mut R) -> Result<Value, ApiError> {
    let mut buf = Vec::new();
    if let Err(e) = reader.read_to_end(&mut buf) {
        debug!(error = %e, "Request body read failed");
        return Err(ApiError::MalformedBody);
    }

    match serde_json::from_slice::<Value>(&buf) {
        Ok(value) if value.is_object() => {
            debug!(body_size_bytes = buf.len(), "JSON body parsed");
            Ok(value)
        }
        Ok(_) => {
            debug!(body_size_bytes = buf.len(), "JSON body is not an object");
            Err(ApiError::MalformedBody)
        }
        Err(e) => {
            debug!(body_size_bytes = buf.len(), error = %e, "JSON body parse failed");
            Err(ApiError::MalformedBody)
        }
    }
}

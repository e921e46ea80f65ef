//! The single emission point for responses.
//!
//! Both transports call into this module, so every reply carries the same
//! header set: `Content-Type: application/json` when there is a body, plus
//! the three fixed CORS headers.

use crate::dispatcher::HandlerResponse;
use may_minihttp::Response;
use std::io::{self, Write};

/// Fixed CORS headers sent with every response
pub const CORS_HEADERS: [(&str, &str); 3] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "GET, POST, PUT, DELETE"),
    ("Access-Control-Allow-Headers", "Content-Type"),
];

const CORS_HEADER_LINES: [&str; 3] = [
    "Access-Control-Allow-Origin: *",
    "Access-Control-Allow-Methods: GET, POST, PUT, DELETE",
    "Access-Control-Allow-Headers: Content-Type",
];

const CONTENT_TYPE_JSON: &str = "Content-Type: application/json";

pub(crate) fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        400 => "Bad Request",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "OK",
    }
}

/// Serialized body bytes; empty when the response has no payload.
#[must_use]
pub fn encode_body(resp: &HandlerResponse) -> Vec<u8> {
    resp.body
        .as_ref()
        .map(|v| v.to_string().into_bytes())
        .unwrap_or_default()
}

/// Write a response through `may_minihttp`.
pub fn write_response(res: &mut Response, resp: &HandlerResponse) {
    res.status_code(resp.status as usize, status_reason(resp.status));
    if resp.body.is_some() {
        res.header(CONTENT_TYPE_JSON);
    }
    for line in CORS_HEADER_LINES {
        res.header(line);
    }
    res.body_vec(encode_body(resp));
}

/// Write a complete HTTP/1.1 response to a raw stream.
///
/// # Errors
///
/// Propagates I/O errors from `out`.
pub fn write_to<W: Write + ?Sized>(
    out: &mut W,
    resp: &HandlerResponse,
    keep_alive: bool,
) -> io::Result<()> {
    let body = encode_body(resp);
    let mut head = format!(
        "HTTP/1.1 {} {}\r\n",
        resp.status,
        status_reason(resp.status)
    );
    if resp.body.is_some() {
        head.push_str(CONTENT_TYPE_JSON);
        head.push_str("\r\n");
    }
    for line in CORS_HEADER_LINES {
        head.push_str(line);
        head.push_str("\r\n");
    }
    head.push_str(&format!("Content-Length: {}\r\n", body.len()));
    head.push_str(if keep_alive {
        "Connection: keep-alive\r\n\r\n"
    } else {
        "Connection: close\r\n\r\n"
    });

    out.write_all(head.as_bytes())?;
    out.write_all(&body)?;
    out.flush()
}

//! HTTPS transport.
//!
//! `may_minihttp` speaks plain TCP only, so TLS connections get their own
//! accept loop: each connection runs in a coroutine that wraps the socket in
//! a rustls [`StreamOwned`], parses request heads with `httparse`, and hands
//! the body to [`AppService::handle`] as a lazily-read stream.

use super::http_server::ServerHandle;
use super::request::{RequestHead, REQUEST_ID_HEADER};
use super::response::write_to;
use super::service::AppService;
use crate::dispatcher::HandlerResponse;
use crate::runtime_config::RuntimeConfig;
use anyhow::{bail, Context};
use may::coroutine;
use may::net::{TcpListener, TcpStream};
use rustls::{ServerConfig, ServerConnection, StreamOwned};
use rustls_pki_types::pem::PemObject;
use rustls_pki_types::{CertificateDer, PrivateKeyDer};
use std::io::{self, Cursor, Read, Write};
use std::net::ToSocketAddrs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Largest request head (request line + headers) accepted.
const MAX_HEAD_BYTES: usize = 16 * 1024;
const MAX_HEADERS: usize = 32;

/// Load a PEM certificate chain and private key into a rustls server config.
///
/// # Errors
///
/// Fails when either file cannot be read, holds no usable PEM item, or the
/// key does not match the certificate.
pub fn load_server_config(cert_path: &Path, key_path: &Path) -> anyhow::Result<Arc<ServerConfig>> {
    let certs = CertificateDer::pem_file_iter(cert_path)
        .with_context(|| format!("reading certificate file {}", cert_path.display()))?
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("parsing certificates in {}", cert_path.display()))?;
    if certs.is_empty() {
        bail!("no certificates found in {}", cert_path.display());
    }

    let key = PrivateKeyDer::from_pem_file(key_path)
        .with_context(|| format!("reading private key from {}", key_path.display()))?;

    let config = ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .context("building TLS server config")?;

    info!(
        cert_path = %cert_path.display(),
        key_path = %key_path.display(),
        "TLS certificate loaded"
    );
    Ok(Arc::new(config))
}

/// HTTPS server: TLS accept loop feeding an [`AppService`].
pub struct TlsServer {
    service: AppService,
    tls_config: Arc<ServerConfig>,
    runtime: RuntimeConfig,
}

impl TlsServer {
    pub fn new(service: AppService, tls_config: Arc<ServerConfig>, runtime: RuntimeConfig) -> Self {
        Self {
            service,
            tls_config,
            runtime,
        }
    }

    /// Bind `addr` and start accepting in a background coroutine.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid or cannot be bound.
    pub fn start<A: ToSocketAddrs>(self, addr: A) -> io::Result<ServerHandle> {
        let addr = addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid address"))?;
        let listener = TcpListener::bind(addr)?;
        let local_addr = listener.local_addr()?;
        info!(addr = %local_addr, "TLS listener bound");

        // SAFETY: spawning requires an initialised may runtime, which `may`
        // sets up lazily on first use; the closure owns everything it uses.
        let handle = unsafe {
            coroutine::Builder::new()
                .name("tls-accept".to_string())
                .spawn(move || self.accept_loop(listener))
        }?;
        Ok(ServerHandle::new(local_addr, handle))
    }

    fn accept_loop(self, listener: TcpListener) {
        for stream in listener.incoming() {
            let stream = match stream {
                Ok(s) => s,
                Err(e) => {
                    warn!(error = %e, "Accept failed");
                    continue;
                }
            };
            let peer = stream.peer_addr().ok();
            if let Err(e) = stream.set_read_timeout(self.runtime.read_timeout) {
                warn!(error = %e, "Failed to set read timeout");
            }

            let service = self.service.clone();
            let tls_config = Arc::clone(&self.tls_config);
            // SAFETY: see `start`; the connection coroutine owns its stream.
            let spawned = unsafe {
                coroutine::Builder::new()
                    .stack_size(self.runtime.stack_size)
                    .spawn(move || {
                        match serve_connection(&service, tls_config, stream) {
                            Ok(()) => debug!(peer = ?peer, "Connection closed"),
                            Err(e) if is_disconnect(&e) => {
                                debug!(peer = ?peer, error = %e, "Client disconnected")
                            }
                            Err(e) => warn!(peer = ?peer, error = %e, "Connection error"),
                        }
                    })
            };
            if let Err(e) = spawned {
                error!(
                    error = %e,
                    stack_size = self.runtime.stack_size,
                    "Failed to spawn connection coroutine - CRITICAL"
                );
            }
        }
    }
}

fn is_disconnect(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::UnexpectedEof
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
    )
}

/// Request-line and header facts needed to frame one request.
#[derive(Debug, PartialEq, Eq)]
struct FramedHead {
    head: RequestHead,
    content_length: usize,
    chunked: bool,
    keep_alive: bool,
}

fn parse_head(bytes: &[u8]) -> io::Result<FramedHead> {
    let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
    let mut req = httparse::Request::new(&mut headers);
    match req.parse(bytes) {
        Ok(httparse::Status::Complete(_)) => {}
        Ok(httparse::Status::Partial) => {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "incomplete request head"))
        }
        Err(e) => return Err(io::Error::new(io::ErrorKind::InvalidData, e)),
    }

    let header = |name: &str| {
        req.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .and_then(|h| std::str::from_utf8(h.value).ok())
            .map(str::trim)
    };

    let content_length = match header("content-length") {
        Some(v) => v
            .parse::<usize>()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?,
        None => 0,
    };
    let chunked = header("transfer-encoding")
        .is_some_and(|v| v.to_ascii_lowercase().contains("chunked"));
    let connection = header("connection").map(str::to_ascii_lowercase);
    let keep_alive = match req.version {
        Some(1) => connection.as_deref() != Some("close"),
        _ => connection.as_deref() == Some("keep-alive"),
    };

    let head = RequestHead::new(
        req.method.unwrap_or(""),
        req.path.unwrap_or("/"),
        header(REQUEST_ID_HEADER),
    );
    Ok(FramedHead {
        head,
        content_length,
        chunked,
        keep_alive,
    })
}

/// Read until `buf` holds a full request head; returns its length.
///
/// `Ok(None)` means the peer closed cleanly between requests.
fn read_head<S: Read>(stream: &mut S, buf: &mut Vec<u8>) -> io::Result<Option<usize>> {
    let mut chunk = [0u8; 4096];
    loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            return Ok(Some(pos + 4));
        }
        if buf.len() > MAX_HEAD_BYTES {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "request head too large"));
        }
        let n = stream.read(&mut chunk)?;
        if n == 0 {
            return if buf.is_empty() {
                Ok(None)
            } else {
                Err(io::Error::new(io::ErrorKind::UnexpectedEof, "truncated request head"))
            };
        }
        buf.extend_from_slice(&chunk[..n]);
    }
}

/// Serve requests on one connection until it closes.
fn serve_connection<S: Read + Write>(
    service: &AppService,
    tls_config: Arc<ServerConfig>,
    stream: S,
) -> io::Result<()> {
    let conn = ServerConnection::new(tls_config).map_err(io::Error::other)?;
    let mut tls = StreamOwned::new(conn, stream);
    let mut buf = Vec::with_capacity(4096);

    loop {
        let Some(head_len) = read_head(&mut tls, &mut buf)? else {
            return Ok(());
        };
        let framed = parse_head(&buf[..head_len])?;
        let mut carried = buf.split_off(head_len);

        if framed.chunked {
            let resp = HandlerResponse::error(400, "Chunked request bodies are not supported");
            write_to(&mut tls, &resp, false)?;
            tls.conn.send_close_notify();
            return tls.flush();
        }

        // Bytes past this request's body belong to the next pipelined request.
        let pipelined = carried.split_off(carried.len().min(framed.content_length));
        let remaining = (framed.content_length - carried.len()) as u64;

        let resp = {
            let mut body = Cursor::new(carried).chain((&mut tls).take(remaining));
            let resp = service.handle(framed.head, &mut body);
            // Drain whatever the handler left unread so the stream stays framed.
            io::copy(&mut body, &mut io::sink())?;
            resp
        };

        write_to(&mut tls, &resp, framed.keep_alive)?;
        if !framed.keep_alive {
            tls.conn.send_close_notify();
            return tls.flush();
        }
        buf = pipelined;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_head_defaults() {
        let framed = parse_head(b"GET /api/users?x=1 HTTP/1.1\r\nHost: a\r\n\r\n").unwrap();
        assert_eq!(framed.head.method, "GET");
        assert_eq!(framed.head.path, "/api/users");
        assert_eq!(framed.content_length, 0);
        assert!(!framed.chunked);
        assert!(framed.keep_alive);
    }

    #[test]
    fn test_parse_head_connection_handling() {
        let close = parse_head(b"GET / HTTP/1.1\r\nConnection: close\r\n\r\n").unwrap();
        assert!(!close.keep_alive);
        let old = parse_head(b"GET / HTTP/1.0\r\n\r\n").unwrap();
        assert!(!old.keep_alive);
        let old_keep = parse_head(b"GET / HTTP/1.0\r\nConnection: Keep-Alive\r\n\r\n").unwrap();
        assert!(old_keep.keep_alive);
    }

    #[test]
    fn test_parse_head_body_framing() {
        let framed =
            parse_head(b"POST /api/users HTTP/1.1\r\nContent-Length: 12\r\n\r\n").unwrap();
        assert_eq!(framed.content_length, 12);
        let chunked =
            parse_head(b"POST /api/users HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n").unwrap();
        assert!(chunked.chunked);
        assert!(parse_head(b"POST / HTTP/1.1\r\nContent-Length: x\r\n\r\n").is_err());
    }

    #[test]
    fn test_read_head_across_chunks() {
        let mut input = Cursor::new(b"GET / HTTP/1.1\r\nHost: a\r\n\r\n{\"a\":1}".to_vec());
        let mut buf = Vec::new();
        let len = read_head(&mut input, &mut buf).unwrap().unwrap();
        assert_eq!(&buf[len..], b"{\"a\":1}");
    }

    #[test]
    fn test_read_head_clean_eof() {
        let mut input = Cursor::new(Vec::new());
        let mut buf = Vec::new();
        assert!(read_head(&mut input, &mut buf).unwrap().is_none());

        let mut truncated = Cursor::new(b"GET / HT".to_vec());
        let err = read_head(&mut truncated, &mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_load_server_config_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_server_config(&dir.path().join("cert.pem"), &dir.path().join("key.pem"))
            .unwrap_err();
        assert!(format!("{err:#}").contains("cert.pem"));
    }

    #[test]
    fn test_load_server_config_empty_cert() {
        let dir = tempfile::tempdir().unwrap();
        let cert = dir.path().join("cert.pem");
        std::fs::write(&cert, "no pem here").unwrap();
        let err = load_server_config(&cert, &dir.path().join("key.pem")).unwrap_err();
        assert!(err.to_string().contains("no certificates"));
    }
}

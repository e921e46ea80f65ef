//! End-to-end tests for the HTTPS transport.
//!
//! The server loads the self-signed PEM pair in `tests/fixtures/`; the
//! client skips certificate verification and only checks the API.

use firstapp::handlers::AppState;
use firstapp::registry::build_service;
use firstapp::runtime_config::RuntimeConfig;
use firstapp::server::{load_server_config, ServerHandle, TlsServer};
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, ClientConnection, DigitallySignedStruct, Error, SignatureScheme, StreamOwned};
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

mod common;
use common::{free_addr, read_response, request, setup_may_runtime};

type TlsStream = StreamOwned<ClientConnection, TcpStream>;

/// Accepts the self-signed fixture certificate.
#[derive(Debug)]
struct SkipCertVerification;

impl ServerCertVerifier for SkipCertVerification {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, Error> {
        rustls::crypto::verify_tls12_signature(
            message,
            cert,
            dss,
            &rustls::crypto::ring::default_provider().signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, Error> {
        rustls::crypto::verify_tls13_signature(
            message,
            cert,
            dss,
            &rustls::crypto::ring::default_provider().signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        rustls::crypto::ring::default_provider()
            .signature_verification_algorithms
            .supported_schemes()
    }
}

struct TlsTestServer {
    handle: Option<ServerHandle>,
    addr: SocketAddr,
    client_config: Arc<ClientConfig>,
}

impl TlsTestServer {
    fn new() -> Self {
        setup_may_runtime();
        let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
        let tls_config =
            load_server_config(&fixtures.join("cert.pem"), &fixtures.join("key.pem")).unwrap();
        let service = build_service(&AppState::seeded()).unwrap();
        let handle = TlsServer::new(service, tls_config, RuntimeConfig::default())
            .start(free_addr())
            .unwrap();
        handle.wait_ready().unwrap();
        let addr = handle.addr();

        let client_config = ClientConfig::builder()
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(SkipCertVerification))
            .with_no_client_auth();

        Self {
            handle: Some(handle),
            addr,
            client_config: Arc::new(client_config),
        }
    }

    fn connect(&self) -> TlsStream {
        let tcp = TcpStream::connect(self.addr).unwrap();
        tcp.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
        let name = ServerName::try_from("localhost").unwrap();
        let conn = ClientConnection::new(Arc::clone(&self.client_config), name).unwrap();
        StreamOwned::new(conn, tcp)
    }
}

impl Drop for TlsTestServer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.stop();
        }
    }
}

#[test]
fn test_https_crud_on_one_connection() {
    let server = TlsTestServer::new();
    let mut tls = server.connect();

    tls.write_all(request("GET", "/api/users", None).as_bytes())
        .unwrap();
    let list = read_response(&mut tls);
    assert_eq!(list.status, 200);
    assert_eq!(list.header("connection"), Some("keep-alive"));
    list.assert_cors();
    assert_eq!(list.json()["data"].as_array().unwrap().len(), 2);

    tls.write_all(
        request("POST", "/api/users", Some(r#"{"name":"A","email":"a@x"}"#)).as_bytes(),
    )
    .unwrap();
    let created = read_response(&mut tls);
    assert_eq!(created.status, 201);
    assert_eq!(created.json()["data"]["id"], 3);

    tls.write_all(request("PUT", "/api/users/3", Some(r#"{"name":"B"}"#)).as_bytes())
        .unwrap();
    let updated = read_response(&mut tls);
    assert_eq!(updated.status, 200);
    assert_eq!(updated.json()["data"]["name"], "B");
    assert_eq!(updated.json()["data"]["email"], "a@x");

    tls.write_all(request("DELETE", "/api/users/3", None).as_bytes())
        .unwrap();
    assert_eq!(read_response(&mut tls).status, 200);
}

#[test]
fn test_https_pipelined_requests() {
    let server = TlsTestServer::new();
    let mut tls = server.connect();

    let both = format!(
        "{}{}",
        request("POST", "/api/users", Some(r#"{"name":"A","email":"a@x"}"#)),
        request("GET", "/api/users/3", None)
    );
    tls.write_all(both.as_bytes()).unwrap();

    assert_eq!(read_response(&mut tls).status, 201);
    let fetched = read_response(&mut tls);
    assert_eq!(fetched.status, 200);
    assert_eq!(fetched.json()["data"]["name"], "A");
}

#[test]
fn test_https_unread_body_is_drained() {
    let server = TlsTestServer::new();
    let mut tls = server.connect();

    // 404 before the body is read; the next request must still parse.
    tls.write_all(request("PUT", "/api/users/99", Some("{garbage")).as_bytes())
        .unwrap();
    assert_eq!(read_response(&mut tls).status, 404);

    tls.write_all(request("GET", "/api/health", None).as_bytes())
        .unwrap();
    let health = read_response(&mut tls);
    assert_eq!(health.status, 200);
    assert_eq!(health.json()["status"], "healthy");
}

#[test]
fn test_https_connection_close() {
    let server = TlsTestServer::new();
    let mut tls = server.connect();

    tls.write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .unwrap();
    let resp = read_response(&mut tls);
    assert_eq!(resp.status, 200);
    assert_eq!(resp.header("connection"), Some("close"));
    assert_eq!(resp.json()["message"], "Welcome to First App API");

    let mut rest = Vec::new();
    let n = tls.read_to_end(&mut rest).unwrap_or(0);
    assert_eq!(n, 0);
}

#[test]
fn test_https_chunked_body_rejected() {
    let server = TlsTestServer::new();
    let mut tls = server.connect();

    tls.write_all(
        b"POST /api/users HTTP/1.1\r\nHost: localhost\r\nTransfer-Encoding: chunked\r\n\r\n",
    )
    .unwrap();
    let resp = read_response(&mut tls);
    assert_eq!(resp.status, 400);
    assert_eq!(resp.header("connection"), Some("close"));
    resp.assert_cors();
}

#[test]
fn test_https_preflight() {
    let server = TlsTestServer::new();
    let mut tls = server.connect();
    tls.write_all(request("OPTIONS", "/anything", None).as_bytes())
        .unwrap();
    let resp = read_response(&mut tls);
    assert_eq!(resp.status, 200);
    assert!(resp.body.is_empty());
    resp.assert_cors();
}

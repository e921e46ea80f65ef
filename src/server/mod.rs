//! # Server Module
//!
//! Request pipeline and the two transports that feed it.
//!
//! - [`AppService`] answers CORS preflights, routes, and dispatches. It is
//!   transport-neutral through [`AppService::handle`] and also implements
//!   `may_minihttp::HttpService`.
//! - [`HttpServer`] serves plain HTTP through `may_minihttp`.
//! - [`TlsServer`] serves HTTPS through rustls on `may` sockets.
//! - [`request`] holds the body reader, [`response`] the response writer.

pub mod http_server;
pub mod request;
pub mod response;
pub mod service;
pub mod tls;

pub use http_server::{HttpServer, ServerHandle};
pub use request::{read_json_body, RequestHead};
pub use service::AppService;
pub use tls::{load_server_config, TlsServer};

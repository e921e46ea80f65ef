//! # firstapp
//!
//! A small HTTPS JSON API serving CRUD operations over in-memory user
//! records, built on the `may` coroutine runtime.
//!
//! ## Request flow
//!
//! ```text
//! TLS / plain socket
//!   -> server::AppService   OPTIONS preflight short-circuit
//!   -> router::Router       ordered (method, path) table, first match wins
//!   -> dispatcher           middleware, handler lookup, panic recovery
//!   -> handlers             body reader + store + response writer
//! ```
//!
//! ## Modules
//!
//! - [`store`] - user records and id assignment
//! - [`router`] - route table compiled to anchored regexes
//! - [`dispatcher`] - handler registry and invocation
//! - [`handlers`] - one function per route
//! - [`registry`] - the route table and its wiring
//! - [`server`] - service, body reader, response writer, HTTP and HTTPS transports
//! - [`middleware`] - before/after hooks around handlers
//! - [`error`] - the API error taxonomy
//! - [`logging`], [`runtime_config`], [`cli`] - process setup
//!
//! ## Quick start
//!
//! ```no_run
//! use firstapp::handlers::AppState;
//! use firstapp::registry::build_service;
//! use firstapp::server::HttpServer;
//!
//! let service = build_service(&AppState::seeded())?;
//! let handle = HttpServer(service).start("127.0.0.1:8080")?;
//! handle.join().ok();
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Runtime considerations
//!
//! Requests run in `may` coroutines, not on tokio. Coroutine stack size is
//! set from `FIRSTAPP_STACK_SIZE`; blocking reads inside a handler park the
//! coroutine rather than an OS thread.

pub mod cli;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod ids;
pub mod logging;
pub mod middleware;
pub mod registry;
pub mod router;
pub mod runtime_config;
pub mod server;
pub mod store;

pub use error::ApiError;

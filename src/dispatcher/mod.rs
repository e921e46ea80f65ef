//! # Dispatcher Module
//!
//! Invokes the handler registered for a matched route.
//!
//! ## Overview
//!
//! The dispatcher keeps a registry of handler names to handler functions and
//! an ordered list of [`Middleware`](crate::middleware::Middleware). For each
//! matched route it:
//!
//! 1. Builds a [`HandlerRequest`] carrying the path parameters and the
//!    still-unread request body
//! 2. Runs every middleware `before` hook (the first early response wins)
//! 3. Calls the handler, converting a panic into a 500 response
//! 4. Runs every middleware `after` hook with the measured latency
//!
//! The body is handed to the handler unread. A handler decides whether and
//! when to read it, so `update_user` can reject an unknown id before waiting
//! for the body to arrive.
//!
//! ## Handler Registration
//!
//! ```rust
//! use firstapp::dispatcher::{Dispatcher, HandlerResponse};
//! use serde_json::json;
//!
//! let mut dispatcher = Dispatcher::new();
//! dispatcher.register_handler("ping", |_req| {
//!     HandlerResponse::json(200, json!({ "pong": true }))
//! });
//! assert!(dispatcher.has_handler("ping"));
//! ```

mod core;

pub use core::{Dispatcher, Handler, HandlerRequest, HandlerResponse};

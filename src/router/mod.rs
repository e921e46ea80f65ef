//! # Router Module
//!
//! Maps an incoming `(method, path)` pair to a registered route.
//!
//! ## Overview
//!
//! The router holds an ordered table of `(method, compiled pattern, route)`
//! entries. Matching walks the table top to bottom and the **first** entry
//! whose method and pattern both match wins. Patterns are not ranked by
//! specificity; table order is the only priority.
//!
//! ## Architecture
//!
//! 1. **Compilation**: at startup each path pattern (e.g. `/api/users/{id}`)
//!    becomes an anchored regex (`^/api/users/([^/]+)$`) plus the list of
//!    parameter names in segment order. A trailing `{name*}` captures the
//!    rest of the path instead (`/api/users/{id*}` → `^/api/users/(.*)$`).
//!
//! 2. **Matching**: for each request the path (query string already
//!    stripped) is tested against the table; on success the captured
//!    segments are paired with their parameter names.
//!
//! ## Example
//!
//! ```rust
//! use firstapp::router::{RouteMeta, Router};
//! use http::Method;
//!
//! let router = Router::new(vec![
//!     RouteMeta::new(Method::GET, "/api/users/{id}", "get_user"),
//! ])
//! .unwrap();
//!
//! let m = router.route(&Method::GET, "/api/users/7").unwrap();
//! assert_eq!(m.handler_name, "get_user");
//! assert_eq!(m.get_path_param("id"), Some("7"));
//! ```

mod core;

pub use core::{ParamVec, RouteMatch, RouteMeta, Router, MAX_INLINE_PARAMS};

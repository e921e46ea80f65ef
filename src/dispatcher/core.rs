use crate::error::ApiError;
use crate::ids::RequestId;
use crate::middleware::Middleware;
use crate::router::{ParamVec, RouteMatch};
use crate::server::request::read_json_body;
use http::Method;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Request data passed to a handler.
///
/// The body is not read yet; call [`HandlerRequest::read_json_body`] to
/// consume it.
pub struct HandlerRequest<'a> {
    /// Correlation id for logs
    pub request_id: RequestId,
    pub method: Method,
    /// Request path without the query string
    pub path: String,
    pub handler_name: String,
    /// Path parameters extracted by the router
    pub path_params: ParamVec,
    body: &'a mut dyn Read,
}

impl fmt::Debug for HandlerRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRequest")
            .field("request_id", &self.request_id)
            .field("method", &self.method)
            .field("path", &self.path)
            .field("handler_name", &self.handler_name)
            .field("path_params", &self.path_params)
            .finish_non_exhaustive()
    }
}

impl<'a> HandlerRequest<'a> {
    pub fn new(
        request_id: RequestId,
        method: Method,
        path: String,
        route_match: RouteMatch,
        body: &'a mut dyn Read,
    ) -> Self {
        Self {
            request_id,
            method,
            path,
            handler_name: route_match.handler_name,
            path_params: route_match.path_params,
            body,
        }
    }

    /// Get a path parameter by name (last occurrence wins)
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Read the whole body and decode it as a JSON object.
    ///
    /// Blocks the current coroutine until the body has fully arrived.
    ///
    /// # Errors
    ///
    /// [`ApiError::MalformedBody`] if the body is not a JSON object.
    pub fn read_json_body(&mut self) -> Result<Value, ApiError> {
        read_json_body(&mut *self.body)
    }
}

/// Result of a handler: status plus optional JSON payload.
///
/// Headers are not set here; the response writer adds the fixed set.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerResponse {
    pub status: u16,
    /// `None` for an empty body (CORS preflight)
    pub body: Option<Value>,
}

impl HandlerResponse {
    /// Response with a JSON body
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: Some(body),
        }
    }

    /// `{ "success": true, "data": ... }` with the given status
    #[must_use]
    pub fn success(status: u16, data: Value) -> Self {
        Self::json(status, json!({ "success": true, "data": data }))
    }

    /// `{ "success": false, "message": ... }` with the given status
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, json!({ "success": false, "message": message }))
    }

    /// Empty 200 reply to a CORS preflight
    #[must_use]
    pub fn preflight() -> Self {
        Self {
            status: 200,
            body: None,
        }
    }
}

/// A registered handler function
pub type Handler = Arc<dyn Fn(&mut HandlerRequest<'_>) -> HandlerResponse + Send + Sync>;

/// Registry of named handlers plus the middleware chain
#[derive(Clone, Default)]
pub struct Dispatcher {
    handlers: HashMap<String, Handler>,
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl Dispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler_fn` under `name`, replacing any previous handler.
    pub fn register_handler<F>(&mut self, name: &str, handler_fn: F)
    where
        F: Fn(&mut HandlerRequest<'_>) -> HandlerResponse + Send + Sync + 'static,
    {
        let replaced = self
            .handlers
            .insert(name.to_string(), Arc::new(handler_fn))
            .is_some();
        info!(
            handler_name = %name,
            replaced = replaced,
            total_handlers = self.handlers.len(),
            "Handler registered"
        );
    }

    /// Append middleware; hooks run in insertion order.
    pub fn add_middleware(&mut self, mw: Arc<dyn Middleware>) {
        self.middlewares.push(mw);
    }

    #[must_use]
    pub fn has_handler(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Run the handler for `route_match` with middleware and panic recovery.
    ///
    /// An unregistered handler or a panicking handler yields a 500 response.
    pub fn dispatch(
        &self,
        route_match: RouteMatch,
        request_id: RequestId,
        method: Method,
        path: String,
        body: &mut dyn Read,
    ) -> HandlerResponse {
        let Some(handler) = self.handlers.get(&route_match.handler_name) else {
            let available: Vec<&String> = self.handlers.keys().collect();
            error!(
                request_id = %request_id,
                handler_name = %route_match.handler_name,
                available_handlers = ?available,
                "Handler not found - CRITICAL"
            );
            return HandlerResponse::error(500, "Internal server error");
        };

        let mut request = HandlerRequest::new(request_id, method, path, route_match, body);

        let mut early: Option<HandlerResponse> = None;
        for mw in &self.middlewares {
            let resp = mw.before(&request);
            if early.is_none() {
                early = resp;
            }
        }

        let (mut resp, latency) = match early {
            Some(r) => {
                debug!(request_id = %request_id, "Middleware returned early response");
                (r, Duration::ZERO)
            }
            None => {
                debug!(
                    request_id = %request_id,
                    handler_name = %request.handler_name,
                    "Request dispatched to handler"
                );
                let start = Instant::now();
                let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                    handler(&mut request)
                }));
                let resp = match outcome {
                    Ok(resp) => resp,
                    Err(panic) => {
                        let panic_message = panic
                            .downcast_ref::<&str>()
                            .map(|s| (*s).to_string())
                            .or_else(|| panic.downcast_ref::<String>().cloned())
                            .unwrap_or_else(|| "unknown panic".to_string());
                        error!(
                            request_id = %request_id,
                            handler_name = %request.handler_name,
                            panic_message = %panic_message,
                            "Handler panicked - CRITICAL"
                        );
                        HandlerResponse::error(500, "Internal server error")
                    }
                };
                (resp, start.elapsed())
            }
        };

        for mw in &self.middlewares {
            mw.after(&request, &mut resp, latency);
        }

        resp
    }
}

use std::time::Duration;

use crate::dispatcher::{HandlerRequest, HandlerResponse};

/// Hooks the dispatcher runs around every handler call.
pub trait Middleware: Send + Sync {
    /// Return `Some` to answer the request without running the handler.
    fn before(&self, _req: &HandlerRequest<'_>) -> Option<HandlerResponse> {
        None
    }
    fn after(&self, _req: &HandlerRequest<'_>, _res: &mut HandlerResponse, _latency: Duration) {}
}

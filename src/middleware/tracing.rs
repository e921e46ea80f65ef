use std::time::Duration;

use tracing::{info, warn};

use super::Middleware;
use crate::dispatcher::{HandlerRequest, HandlerResponse};

/// Logs one structured line per handled request.
///
/// Client errors (4xx) are logged at `info` like successes; only 5xx
/// responses are raised to `warn`.
pub struct TracingMiddleware;

impl Middleware for TracingMiddleware {
    fn after(&self, req: &HandlerRequest<'_>, res: &mut HandlerResponse, latency: Duration) {
        let latency_ms = latency.as_secs_f64() * 1000.0;
        if res.status >= 500 {
            warn!(
                request_id = %req.request_id,
                method = %req.method,
                path = %req.path,
                handler_name = %req.handler_name,
                status = res.status,
                latency_ms = latency_ms,
                "Request failed"
            );
        } else {
            info!(
                request_id = %req.request_id,
                method = %req.method,
                path = %req.path,
                handler_name = %req.handler_name,
                status = res.status,
                latency_ms = latency_ms,
                "Request handled"
            );
        }
    }
}

use super::AppState;
use crate::dispatcher::{HandlerRequest, HandlerResponse};
use chrono::{SecondsFormat, Utc};
use serde_json::json;

/// Human-readable endpoint list returned by `GET /`
pub const ENDPOINTS: [&str; 7] = [
    "GET / - Home",
    "GET /api/users - Get all users",
    "GET /api/users/:id - Get user by ID",
    "POST /api/users - Create new user",
    "PUT /api/users/:id - Update user",
    "DELETE /api/users/:id - Delete user",
    "GET /api/health - Health check",
];

/// `GET /`
pub fn describe_api(_req: &mut HandlerRequest<'_>) -> HandlerResponse {
    HandlerResponse::json(
        200,
        json!({
            "message": "Welcome to First App API",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": ENDPOINTS,
        }),
    )
}

/// `GET /api/health`
pub fn health_check(state: &AppState, _req: &mut HandlerRequest<'_>) -> HandlerResponse {
    HandlerResponse::json(
        200,
        json!({
            "success": true,
            "status": "healthy",
            "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            "uptime": state.started_at.elapsed().as_secs_f64(),
        }),
    )
}

//! Application-level error taxonomy.
//!
//! Every variant maps to a fixed HTTP status and a human-readable message.
//! Handlers never let these escape: the dispatcher turns them into the
//! `{ "success": false, "message": ... }` body through [`ApiError::into_response`].

use crate::dispatcher::HandlerResponse;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Request body was empty, not UTF-8, not JSON, or not a JSON object.
    #[error("Invalid JSON")]
    MalformedBody,
    /// `name` or `email` missing (or empty) on create.
    #[error("Name and email are required")]
    Validation,
    /// No user with the requested id.
    #[error("User not found")]
    NotFound,
    /// No route predicate matched the method and path.
    #[error("Route not found")]
    RouteNotFound,
}

impl ApiError {
    /// HTTP status code for this error.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            ApiError::MalformedBody | ApiError::Validation => 400,
            ApiError::NotFound | ApiError::RouteNotFound => 404,
        }
    }

    /// Structured JSON error response for this error.
    #[must_use]
    pub fn into_response(self) -> HandlerResponse {
        HandlerResponse::error(self.status(), &self.to_string())
    }
}

impl From<ApiError> for HandlerResponse {
    fn from(err: ApiError) -> Self {
        err.into_response()
    }
}

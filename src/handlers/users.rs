use super::AppState;
use crate::dispatcher::{HandlerRequest, HandlerResponse};
use crate::error::ApiError;
use crate::store::{lock, non_empty_field, UserPatch};
use serde_json::json;
use tracing::debug;

/// The user id named by the first segment after `/api/users/`.
///
/// Only the segment's leading digits count (`/api/users/7/extra` and
/// `/api/users/7x` both name user 7). A segment without them names no user,
/// so it surfaces as [`ApiError::NotFound`] rather than a parse error.
fn path_user_id(req: &HandlerRequest<'_>) -> Result<u64, ApiError> {
    let rest = req.get_path_param("id").unwrap_or_default();
    let segment = rest.split('/').next().unwrap_or_default();
    let digits = segment
        .find(|c: char| !c.is_ascii_digit())
        .map_or(segment, |end| &segment[..end]);
    digits.parse::<u64>().map_err(|_| ApiError::NotFound)
}

/// `GET /api/users`
pub fn list_users(state: &AppState, _req: &mut HandlerRequest<'_>) -> HandlerResponse {
    let store = lock(&state.store);
    HandlerResponse::success(200, json!(store.list()))
}

/// `GET /api/users/{id}`
pub fn get_user(state: &AppState, req: &mut HandlerRequest<'_>) -> HandlerResponse {
    try_get_user(state, req).unwrap_or_else(ApiError::into_response)
}

fn try_get_user(state: &AppState, req: &HandlerRequest<'_>) -> Result<HandlerResponse, ApiError> {
    let id = path_user_id(req)?;
    let store = lock(&state.store);
    let user = store.get(id)?;
    Ok(HandlerResponse::success(200, json!(user)))
}

/// `POST /api/users`
pub fn create_user(state: &AppState, req: &mut HandlerRequest<'_>) -> HandlerResponse {
    try_create_user(state, req).unwrap_or_else(ApiError::into_response)
}

fn try_create_user(
    state: &AppState,
    req: &mut HandlerRequest<'_>,
) -> Result<HandlerResponse, ApiError> {
    let body = req.read_json_body()?;
    let user = lock(&state.store).create(
        non_empty_field(&body, "name"),
        non_empty_field(&body, "email"),
    )?;
    Ok(HandlerResponse::success(201, json!(user)))
}

/// `PUT /api/users/{id}`
///
/// The id is checked before the body is read, so an unknown id answers 404
/// even when the body is malformed.
pub fn update_user(state: &AppState, req: &mut HandlerRequest<'_>) -> HandlerResponse {
    try_update_user(state, req).unwrap_or_else(ApiError::into_response)
}

fn try_update_user(
    state: &AppState,
    req: &mut HandlerRequest<'_>,
) -> Result<HandlerResponse, ApiError> {
    let id = path_user_id(req)?;
    if !lock(&state.store).contains(id) {
        return Err(ApiError::NotFound);
    }

    let body = req.read_json_body()?;
    let patch = UserPatch::from_json(&body);
    if patch.is_empty() {
        debug!(request_id = %req.request_id, user_id = id, "Update carries no fields");
    }
    // The record may have been deleted while the body was in flight.
    let user = lock(&state.store).update(id, patch)?;
    Ok(HandlerResponse::success(200, json!(user)))
}

/// `DELETE /api/users/{id}`
pub fn delete_user(state: &AppState, req: &mut HandlerRequest<'_>) -> HandlerResponse {
    try_delete_user(state, req).unwrap_or_else(ApiError::into_response)
}

fn try_delete_user(state: &AppState, req: &HandlerRequest<'_>) -> Result<HandlerResponse, ApiError> {
    let id = path_user_id(req)?;
    let removed = lock(&state.store).delete(id)?;
    Ok(HandlerResponse::json(
        200,
        json!({ "success": true, "message": "User deleted", "data": removed }),
    ))
}

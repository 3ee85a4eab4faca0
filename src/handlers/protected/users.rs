use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Extension, Path, State,
    },
    Json,
};
use serde_json::{json, Value};

use crate::database::models::{User, UserUpdate};
use crate::error::ApiError;
use crate::handlers::utils::{path_params, validated_body};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::AppState;

/// GET /users/:username - user details with applied job ids
pub async fn get(State(state): State<AppState>, Path(username): Path<String>) -> ApiResult<Value> {
    let user = User::get(&state.pool, &username).await?;
    Ok(ApiResponse::success(json!({ "user": user })))
}

/// PATCH /users/:username - partial update; only admins may change `isAdmin`
pub async fn patch(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Extension(auth_user): Extension<AuthUser>,
    payload: Result<Json<UserUpdate>, JsonRejection>,
) -> ApiResult<Value> {
    let update = validated_body(payload)?;
    if update.is_admin.is_some() && !auth_user.is_admin {
        tracing::warn!("User '{}' tried to change admin status of '{}'", auth_user.username, username);
        return Err(ApiError::unauthorized("Only admins may change isAdmin"));
    }

    let user = User::update(&state.pool, &username, &update.into_fields()).await?;
    Ok(ApiResponse::success(json!({ "user": user })))
}

/// DELETE /users/:username
pub async fn delete(State(state): State<AppState>, Path(username): Path<String>) -> ApiResult<Value> {
    User::remove(&state.pool, &username).await?;
    Ok(ApiResponse::success(json!({ "deleted": username })))
}

/// POST /users/:username/jobs/:id - apply for a job
pub async fn apply(
    State(state): State<AppState>,
    path: Result<Path<(String, i32)>, PathRejection>,
) -> ApiResult<Value> {
    let (username, job_id) = path_params(path)?;
    User::apply_to_job(&state.pool, &username, job_id).await?;
    Ok(ApiResponse::created(json!({ "applied": job_id })))
}

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use serde_json::{json, Value};

use crate::database::models::{Job, JobNew, JobUpdate};
use crate::handlers::utils::{path_params, validated_body};
use crate::middleware::{ApiResponse, ApiResult};
use crate::AppState;

/// POST /jobs
pub async fn post(State(state): State<AppState>, payload: Result<Json<JobNew>, JsonRejection>) -> ApiResult<Value> {
    let data = validated_body(payload)?;
    let job = Job::create(&state.pool, &data).await?;
    Ok(ApiResponse::created(json!({ "job": job })))
}

/// PATCH /jobs/:id - fields: title, salary, equity
pub async fn patch(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<JobUpdate>, JsonRejection>,
) -> ApiResult<Value> {
    let id = path_params(path)?;
    let update = validated_body(payload)?;
    let job = Job::update(&state.pool, id, &update.into_fields()).await?;
    Ok(ApiResponse::success(json!({ "job": job })))
}

/// DELETE /jobs/:id
pub async fn delete(State(state): State<AppState>, path: Result<Path<i32>, PathRejection>) -> ApiResult<Value> {
    let id = path_params(path)?;
    Job::remove(&state.pool, id).await?;
    Ok(ApiResponse::success(json!({ "deleted": id })))
}

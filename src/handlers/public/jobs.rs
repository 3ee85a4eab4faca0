use axum::extract::{rejection::PathRejection, Path, Query, State};
use serde_json::{json, Value};

use crate::database::models::job::{Job, JOB_FILTERS};
use crate::handlers::utils::{filter_params, path_params};
use crate::middleware::{ApiResponse, ApiResult};
use crate::AppState;

/// GET /jobs - list jobs, optionally filtered by `titleLike`, `minSalary`, `hasEquity`, `companyHandle`
pub async fn list(State(state): State<AppState>, Query(pairs): Query<Vec<(String, String)>>) -> ApiResult<Value> {
    let filters = filter_params(&pairs, &JOB_FILTERS)?;
    let jobs = Job::find_all(&state.pool, filters.as_ref()).await?;
    Ok(ApiResponse::success(json!({ "jobs": jobs })))
}

/// GET /jobs/:id - one job with its company
pub async fn get(State(state): State<AppState>, path: Result<Path<i32>, PathRejection>) -> ApiResult<Value> {
    let id = path_params(path)?;
    let job = Job::get(&state.pool, id).await?;
    Ok(ApiResponse::success(json!({ "job": job })))
}

use axum::extract::{Path, Query, State};
use serde_json::{json, Value};

use crate::database::models::company::{Company, COMPANY_FILTERS};
use crate::handlers::utils::filter_params;
use crate::middleware::{ApiResponse, ApiResult};
use crate::AppState;

/// GET /companies - list companies, optionally filtered by `nameLike`, `minEmployees`, `maxEmployees`
pub async fn list(State(state): State<AppState>, Query(pairs): Query<Vec<(String, String)>>) -> ApiResult<Value> {
    let filters = filter_params(&pairs, &COMPANY_FILTERS)?;
    let companies = Company::find_all(&state.pool, filters.as_ref()).await?;
    Ok(ApiResponse::success(json!({ "companies": companies })))
}

/// GET /companies/:handle - one company and its jobs
pub async fn get(State(state): State<AppState>, Path(handle): Path<String>) -> ApiResult<Value> {
    let company = Company::get(&state.pool, &handle).await?;
    Ok(ApiResponse::success(json!({ "company": company })))
}

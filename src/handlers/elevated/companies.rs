use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::database::models::{Company, CompanyNew, CompanyUpdate};
use crate::handlers::utils::validated_body;
use crate::middleware::{ApiResponse, ApiResult};
use crate::AppState;

/// POST /companies
pub async fn post(State(state): State<AppState>, payload: Result<Json<CompanyNew>, JsonRejection>) -> ApiResult<Value> {
    let data = validated_body(payload)?;
    let company = Company::create(&state.pool, &data).await?;
    Ok(ApiResponse::created(json!({ "company": company })))
}

/// PATCH /companies/:handle - fields: name, description, numEmployees, logoUrl
pub async fn patch(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    payload: Result<Json<CompanyUpdate>, JsonRejection>,
) -> ApiResult<Value> {
    let update = validated_body(payload)?;
    let company = Company::update(&state.pool, &handle, &update.into_fields()).await?;
    Ok(ApiResponse::success(json!({ "company": company })))
}

/// DELETE /companies/:handle
pub async fn delete(State(state): State<AppState>, Path(handle): Path<String>) -> ApiResult<Value> {
    Company::remove(&state.pool, &handle).await?;
    Ok(ApiResponse::success(json!({ "deleted": handle })))
}

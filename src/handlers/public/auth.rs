use axum::{extract::{rejection::JsonRejection, State}, Json};
use serde_json::{json, Value};

use crate::auth::create_token;
use crate::database::models::{User, UserAuth, UserNew};
use crate::error::ApiError;
use crate::handlers::utils::validated_body;
use crate::middleware::{ApiResponse, ApiResult};
use crate::AppState;

/// POST /auth/token - exchange username/password for a JWT
pub async fn token(State(state): State<AppState>, payload: Result<Json<UserAuth>, JsonRejection>) -> ApiResult<Value> {
    let creds = validated_body(payload)?;

    let user = User::authenticate(&state.pool, &creds.username, &creds.password)
        .await?
        .ok_or_else(|| {
            tracing::warn!("Failed login for '{}'", creds.username);
            ApiError::unauthorized("Invalid username/password")
        })?;

    let token = create_token(&user.username, user.is_admin)?;
    Ok(ApiResponse::success(json!({ "token": token })))
}

/// POST /auth/register - create a regular (non-admin) user and log them in
pub async fn register(State(state): State<AppState>, payload: Result<Json<UserNew>, JsonRejection>) -> ApiResult<Value> {
    let mut data = validated_body(payload)?;
    data.is_admin = false;

    let user = User::register(&state.pool, &data).await?;
    tracing::info!("Registered user '{}'", user.username);

    let token = create_token(&user.username, user.is_admin)?;
    Ok(ApiResponse::created(json!({ "token": token })))
}

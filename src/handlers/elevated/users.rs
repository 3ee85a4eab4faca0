use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::{json, Value};

use crate::auth::create_token;
use crate::database::models::{User, UserNew};
use crate::handlers::utils::validated_body;
use crate::middleware::{ApiResponse, ApiResult};
use crate::AppState;

/// POST /users - admin-created user, which may itself be an admin
pub async fn post(State(state): State<AppState>, payload: Result<Json<UserNew>, JsonRejection>) -> ApiResult<Value> {
    let data = validated_body(payload)?;
    let user = User::register(&state.pool, &data).await?;
    let token = create_token(&user.username, user.is_admin)?;
    Ok(ApiResponse::created(json!({ "user": user, "token": token })))
}

/// GET /users
pub async fn list(State(state): State<AppState>) -> ApiResult<Value> {
    let users = User::find_all(&state.pool).await?;
    Ok(ApiResponse::success(json!({ "users": users })))
}

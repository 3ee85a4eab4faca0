pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod middleware;

use axum::{
    extract::State,
    http::StatusCode,
    middleware::from_fn,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use sqlx::PgPool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::handlers::{elevated, protected, public};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Full application router: public, protected and elevated tiers plus global layers.
pub fn app(state: AppState) -> Router {
    let router = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(public_routes())
        .merge(protected_routes())
        .merge(elevated_routes())
        .fallback(not_found)
        .layer(from_fn(middleware::authenticate_jwt))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if config::config().security.enable_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/token", post(public::auth::token))
        .route("/auth/register", post(public::auth::register))
        .route("/companies", get(public::companies::list))
        .route("/companies/:handle", get(public::companies::get))
        .route("/jobs", get(public::jobs::list))
        .route("/jobs/:id", get(public::jobs::get))
}

fn protected_routes() -> Router<AppState> {
    use protected::users;

    Router::new()
        .route("/users/:username", get(users::get).patch(users::patch).delete(users::delete))
        .route("/users/:username/jobs/:id", post(users::apply))
        .route_layer(from_fn(middleware::ensure_correct_user_or_admin))
        .route_layer(from_fn(middleware::ensure_logged_in))
}

fn elevated_routes() -> Router<AppState> {
    Router::new()
        .route("/companies", post(elevated::companies::post))
        .route(
            "/companies/:handle",
            axum::routing::patch(elevated::companies::patch).delete(elevated::companies::delete),
        )
        .route("/jobs", post(elevated::jobs::post))
        .route("/jobs/:id", axum::routing::patch(elevated::jobs::patch).delete(elevated::jobs::delete))
        .route("/users", get(elevated::users::list).post(elevated::users::post))
        .route_layer(from_fn(middleware::ensure_admin))
}

async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Jobly API",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "auth": "/auth/token, /auth/register (public)",
                "companies": "/companies[/:handle] (read public, write admin)",
                "jobs": "/jobs[/:id] (read public, write admin)",
                "users": "/users (admin), /users/:username[/jobs/:id] (self or admin)",
                "health": "/health (public)"
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check(&state.pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "error": true,
                    "message": "database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}

async fn not_found() -> ApiError {
    ApiError::not_found("Not Found")
}

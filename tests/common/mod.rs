#![allow(dead_code)]

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use once_cell::sync::Lazy;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

use jobly_api::auth::{create_token, hash_password};
use jobly_api::config;
use jobly_api::database::DatabaseManager;
use jobly_api::{app, AppState};

/// Serialises tests that reseed the shared database
pub static DB_LOCK: Lazy<tokio::sync::Mutex<()>> = Lazy::new(|| tokio::sync::Mutex::new(()));

/// Router over a pool that never connects unless a handler reaches the database.
/// Good for auth, validation and routing paths.
pub fn lazy_app() -> Router {
    let pool = DatabaseManager::connect_lazy(&config::config().database).expect("valid database url");
    app(AppState::new(pool))
}

/// Router over a migrated, freshly seeded database (`TEST_DATABASE_URL` under `APP_ENV=test`).
pub async fn db_app() -> Result<(Router, PgPool)> {
    let pool = DatabaseManager::connect(&config::config().database)
        .await
        .context("database must be reachable for ignored tests")?;
    DatabaseManager::migrate(&pool).await?;
    seed(&pool).await?;
    Ok((app(AppState::new(pool.clone())), pool))
}

/// c1..c3 with 1..3 employees, three jobs, users u1 (admin) and u2, and one application.
pub async fn seed(pool: &PgPool) -> Result<()> {
    sqlx::query("TRUNCATE applications, jobs, users, companies RESTART IDENTITY CASCADE")
        .execute(pool)
        .await?;

    sqlx::query(
        "INSERT INTO companies (handle, name, num_employees, description, logo_url)
         VALUES ('c1', 'C1', 1, 'Desc1', 'http://c1.img'),
                ('c2', 'C2', 2, 'Desc2', 'http://c2.img'),
                ('c3', 'C3', 3, 'Desc3', 'http://c3.img')",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "INSERT INTO jobs (title, salary, equity, company_handle)
         VALUES ('J1', 1, 0.1, 'c1'),
                ('J2', 2, 0.2, 'c1'),
                ('J3', 3, 0, 'c1'),
                ('J4', NULL, NULL, 'c1')",
    )
    .execute(pool)
    .await?;

    for (username, is_admin) in [("u1", true), ("u2", false)] {
        sqlx::query(
            "INSERT INTO users (username, password, first_name, last_name, email, is_admin)
             VALUES ($1, $2, $3, 'L', $4, $5)",
        )
        .bind(username)
        .bind(hash_password(&format!("password-{}", username)))
        .bind(format!("F{}", username))
        .bind(format!("{}@email.com", username))
        .bind(is_admin)
        .execute(pool)
        .await?;
    }

    sqlx::query("INSERT INTO applications (username, job_id) VALUES ('u2', 1)")
        .execute(pool)
        .await?;
    Ok(())
}

pub fn admin_token() -> String {
    create_token("u1", true).expect("token")
}

pub fn user_token(username: &str) -> String {
    create_token(username, false).expect("token")
}

/// Drive one request through the router; non-JSON bodies come back as `Value::Null`.
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&json)?))?,
        None => builder.body(Body::empty())?,
    };

    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    Ok((status, value))
}

pub async fn get(app: &Router, uri: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
    send(app, Method::GET, uri, token, None).await
}

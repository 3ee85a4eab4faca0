use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::{FromRow, PgPool};

use crate::auth;
use crate::database::manager::DatabaseError;
use crate::database::models::patch;
use crate::database::query_builder::{self, QueryBuilder};
use crate::filter::{ColumnMap, FilterSet, SqlResult};

pub const USER_COLUMNS: &[&str] = &["username", "first_name", "last_name", "email", "is_admin"];

pub const USER_UPDATE_COLUMNS: &ColumnMap = &[
    ("firstName", "first_name"),
    ("lastName", "last_name"),
    ("isAdmin", "is_admin"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
}

/// A user plus the ids of the jobs they applied to
#[derive(Debug, Clone, Serialize)]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: User,
    pub jobs: Vec<i32>,
}

#[derive(FromRow)]
struct UserCredentials {
    username: String,
    password: String,
    first_name: String,
    last_name: String,
    email: String,
    is_admin: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserNew {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
}

impl UserNew {
    pub fn validate(&self) -> Result<(), String> {
        validate_username(&self.username)?;
        validate_password(&self.password)?;
        validate_person_name("firstName", &self.first_name)?;
        validate_person_name("lastName", &self.last_name)?;
        validate_email(&self.email)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserAuth {
    pub username: String,
    pub password: String,
}

/// Patchable user fields. `isAdmin` is only honoured for admins (enforced by the route).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserUpdate {
    #[serde(default, deserialize_with = "patch::required")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "patch::required")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "patch::required")]
    pub password: Option<String>,
    #[serde(default, deserialize_with = "patch::required")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "patch::required")]
    pub is_admin: Option<bool>,
}

impl UserUpdate {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(v) = &self.first_name {
            validate_person_name("firstName", v)?;
        }
        if let Some(v) = &self.last_name {
            validate_person_name("lastName", v)?;
        }
        if let Some(v) = &self.password {
            validate_password(v)?;
        }
        if let Some(v) = &self.email {
            validate_email(v)?;
        }
        Ok(())
    }

    /// Supplied fields keyed by their API names, in declaration order. The password is
    /// still plain text; [`User::update`] hashes it.
    pub fn into_fields(self) -> Map<String, Value> {
        let mut fields = Map::new();
        if let Some(v) = self.first_name {
            fields.insert("firstName".into(), Value::String(v));
        }
        if let Some(v) = self.last_name {
            fields.insert("lastName".into(), Value::String(v));
        }
        if let Some(v) = self.password {
            fields.insert("password".into(), Value::String(v));
        }
        if let Some(v) = self.email {
            fields.insert("email".into(), Value::String(v));
        }
        if let Some(v) = self.is_admin {
            fields.insert("isAdmin".into(), Value::Bool(v));
        }
        fields
    }
}

fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() || username.len() > 25 {
        return Err("username must be 1-25 characters".to_string());
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), String> {
    if password.len() < 5 || password.len() > 20 {
        return Err("password must be 5-20 characters".to_string());
    }
    Ok(())
}

fn validate_person_name(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() || value.chars().count() > 30 {
        return Err(format!("{} must be 1-30 characters", field));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), String> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.'),
        None => false,
    };
    if !valid || email.len() < 6 || email.len() > 60 {
        return Err(format!("email is not valid: {}", email));
    }
    Ok(())
}

impl User {
    /// Look up `username` and check `password`; `None` when either does not match.
    pub async fn authenticate(pool: &PgPool, username: &str, password: &str) -> Result<Option<User>, DatabaseError> {
        let row = sqlx::query_as::<_, UserCredentials>(
            "SELECT username, password, first_name, last_name, email, is_admin
             FROM users
             WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(pool)
        .await?;

        let Some(r) = row else {
            return Ok(None);
        };
        if !auth::verify_password_blocking(password, &r.password).await? {
            return Ok(None);
        }
        Ok(Some(User {
            username: r.username,
            first_name: r.first_name,
            last_name: r.last_name,
            email: r.email,
            is_admin: r.is_admin,
        }))
    }

    pub async fn register(pool: &PgPool, data: &UserNew) -> Result<User, DatabaseError> {
        let hashed = auth::hash_password_blocking(&data.password).await?;
        sqlx::query_as::<_, User>(
            "INSERT INTO users (username, password, first_name, last_name, email, is_admin)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING username, first_name, last_name, email, is_admin",
        )
        .bind(&data.username)
        .bind(&hashed)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(&data.email)
        .bind(data.is_admin)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            DatabaseError::from_constraint(
                e,
                || format!("Duplicate username: {}", data.username),
                || format!("Invalid user: {}", data.username),
            )
        })
    }

    pub async fn find_all(pool: &PgPool) -> Result<Vec<User>, DatabaseError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT username, first_name, last_name, email, is_admin
             FROM users
             ORDER BY username",
        )
        .fetch_all(pool)
        .await?;
        Ok(users)
    }

    pub async fn get(pool: &PgPool, username: &str) -> Result<UserDetail, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT username, first_name, last_name, email, is_admin
             FROM users
             WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("No user: {}", username)))?;

        let jobs: Vec<i32> = sqlx::query_scalar(
            "SELECT job_id FROM applications WHERE username = $1 ORDER BY job_id",
        )
        .bind(username)
        .fetch_all(pool)
        .await?;

        Ok(UserDetail { user, jobs })
    }

    /// Partial update; only the supplied fields change. A plain-text `password` is hashed
    /// before it is stored.
    pub async fn update(pool: &PgPool, username: &str, fields: &Map<String, Value>) -> Result<User, DatabaseError> {
        let fields = hash_password_field(fields.clone()).await?;
        let set = FilterSet::generate(&fields, USER_UPDATE_COLUMNS)?;
        let query = format!(
            "UPDATE users SET {} WHERE username = ${} RETURNING {}",
            set.query,
            set.next_param_index(),
            USER_COLUMNS.join(", ")
        );
        let mut params = set.params;
        params.push(Value::String(username.to_string()));

        QueryBuilder::<User>::new(SqlResult { query, params })
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("No user: {}", username)))
    }

    pub async fn remove(pool: &PgPool, username: &str) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM users WHERE username = $1")
            .bind(username)
            .execute(pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("No user: {}", username)));
        }
        Ok(())
    }

    /// Record an application of `username` to job `job_id`.
    pub async fn apply_to_job(pool: &PgPool, username: &str, job_id: i32) -> Result<(), DatabaseError> {
        let sql = SqlResult {
            query: "INSERT INTO applications (job_id, username) VALUES ($1, $2)".to_string(),
            params: vec![Value::from(job_id), Value::String(username.to_string())],
        };
        query_builder::execute(&sql, pool).await.map_err(|e| {
            DatabaseError::from_constraint(
                e,
                || format!("Already applied to job: {}", job_id),
                || format!("No such user or job: {} / {}", username, job_id),
            )
        })?;
        Ok(())
    }
}

async fn hash_password_field(mut fields: Map<String, Value>) -> Result<Map<String, Value>, DatabaseError> {
    if let Some(Value::String(plain)) = fields.get_mut("password") {
        let hashed = auth::hash_password_blocking(plain).await?;
        *plain = hashed;
    }
    Ok(fields)
}

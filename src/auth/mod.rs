use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::task::JoinError;
use uuid::Uuid;

use crate::config;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub username: String,
    pub is_admin: bool,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(username: impl Into<String>, is_admin: bool) -> Self {
        let now = Utc::now();
        let expiry_hours = i64::try_from(config::config().security.jwt_expiry_hours).unwrap_or(24);
        let exp = (now + Duration::hours(expiry_hours)).timestamp();

        Self {
            username: username.into(),
            is_admin,
            exp,
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),

    #[error("JWT secret not configured")]
    InvalidSecret,
}

/// Sign a token for `username` with the configured secret.
pub fn create_token(username: &str, is_admin: bool) -> Result<String, JwtError> {
    generate_jwt(&Claims::new(username, is_admin), &config::config().security.secret_key)
}

pub fn generate_jwt(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key).map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

pub fn validate_jwt(token: &str, secret: &str) -> Result<Claims, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())
        .map_err(|e| JwtError::InvalidToken(e.to_string()))?;

    Ok(token_data.claims)
}

/// Salted, iterated SHA-256, stored as `rounds$salt$hex`.
pub fn hash_password(password: &str) -> String {
    let rounds = config::config().security.password_hash_rounds.max(1);
    let salt = Uuid::new_v4().simple().to_string();
    format!("{}${}${}", rounds, salt, digest(password, &salt, rounds))
}

pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.splitn(3, '$');
    let (Some(rounds), Some(salt), Some(expected)) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    let Ok(rounds) = rounds.parse::<u32>() else {
        return false;
    };
    let actual = digest(password, salt, rounds);
    // Compare every byte so timing does not depend on the first mismatch
    actual.len() == expected.len()
        && actual.bytes().zip(expected.bytes()).fold(0u8, |acc, (a, b)| acc | (a ^ b)) == 0
}

/// Runs [`hash_password`] on tokio's blocking pool.
pub async fn hash_password_blocking(password: &str) -> Result<String, JoinError> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || hash_password(&password)).await
}

/// Runs [`verify_password`] on tokio's blocking pool.
pub async fn verify_password_blocking(password: &str, stored: &str) -> Result<bool, JoinError> {
    let (password, stored) = (password.to_owned(), stored.to_owned());
    tokio::task::spawn_blocking(move || verify_password(&password, &stored)).await
}

fn digest(password: &str, salt: &str, rounds: u32) -> String {
    let mut hash = Sha256::new().chain_update(salt.as_bytes()).chain_update(password.as_bytes()).finalize();
    for _ in 1..rounds {
        hash = Sha256::new().chain_update(hash).chain_update(salt.as_bytes()).finalize();
    }
    format!("{:x}", hash)
}

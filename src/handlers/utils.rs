use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path,
    },
    Json,
};
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::filter::{parse_query_pairs, FilterSpec};

/// Types that check their own field constraints after deserialization
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

/// Unwrap a JSON body and run its field validation.
pub fn validated_body<T: Validate>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    let Json(body) = payload?;
    body.validate().map_err(ApiError::validation_error)?;
    Ok(body)
}

/// Unwrap path parameters, turning a malformed segment into a 400 envelope.
pub fn path_params<T>(path: Result<Path<T>, PathRejection>) -> Result<T, ApiError> {
    let Path(params) = path?;
    Ok(params)
}

/// Query-string pairs to a typed filter map; no pairs means no filtering.
pub fn filter_params(pairs: &[(String, String)], spec: &FilterSpec) -> Result<Option<Map<String, Value>>, ApiError> {
    if pairs.is_empty() {
        return Ok(None);
    }
    Ok(Some(parse_query_pairs(pairs, spec)?))
}

macro_rules! impl_validate {
    ($($ty:ty),* $(,)?) => {
        $(impl Validate for $ty {
            fn validate(&self) -> Result<(), String> {
                <$ty>::validate(self)
            }
        })*
    };
}

impl_validate!(
    crate::database::models::CompanyNew,
    crate::database::models::CompanyUpdate,
    crate::database::models::JobNew,
    crate::database::models::JobUpdate,
    crate::database::models::UserNew,
    crate::database::models::UserUpdate,
);

impl Validate for crate::database::models::UserAuth {
    fn validate(&self) -> Result<(), String> {
        if self.username.is_empty() || self.password.is_empty() {
            return Err("username and password are required".to_string());
        }
        Ok(())
    }
}

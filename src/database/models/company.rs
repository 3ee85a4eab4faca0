use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::{FromRow, PgPool};

use crate::database::manager::DatabaseError;
use crate::database::models::job::JobSummary;
use crate::database::query_builder::QueryBuilder;
use crate::database::models::patch;
use crate::filter::{ColumnMap, ColumnTypes, Filter, FilterOp, FilterRule, FilterSet, FilterSpec, SortDirection, SqlResult};

pub const COMPANY_COLUMNS: &[&str] = &["handle", "name", "description", "num_employees", "logo_url"];

pub const COMPANY_UPDATE_COLUMNS: &ColumnMap = &[("numEmployees", "num_employees"), ("logoUrl", "logo_url")];

pub const COMPANY_COLUMN_TYPES: &ColumnTypes = &[("num_employees", "integer")];

pub static COMPANY_FILTERS: Lazy<FilterSpec> = Lazy::new(|| {
    FilterSpec::new(vec![
        FilterRule::new("nameLike", FilterOp::PartialMatch("name")),
        FilterRule::new("minEmployees", FilterOp::MinBound("num_employees")),
        FilterRule::new("maxEmployees", FilterOp::MaxBound("num_employees")),
    ])
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

/// A company together with the jobs it posts
#[derive(Debug, Clone, Serialize)]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: Company,
    pub jobs: Vec<JobSummary>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyNew {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

impl CompanyNew {
    pub fn validate(&self) -> Result<(), String> {
        validate_handle(&self.handle)?;
        validate_name(&self.name)?;
        validate_description(&self.description)?;
        if let Some(n) = self.num_employees {
            validate_num_employees(n)?;
        }
        if let Some(url) = &self.logo_url {
            validate_logo_url(url)?;
        }
        Ok(())
    }
}

/// Patchable company fields. `handle` is the identity and cannot change.
/// `numEmployees` and `logoUrl` may be set to `null`; the other fields may not.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyUpdate {
    #[serde(default, deserialize_with = "patch::required")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "patch::required")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "patch::nullable")]
    pub num_employees: Option<Option<i32>>,
    #[serde(default, deserialize_with = "patch::nullable")]
    pub logo_url: Option<Option<String>>,
}

impl CompanyUpdate {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(description) = &self.description {
            validate_description(description)?;
        }
        if let Some(Some(n)) = self.num_employees {
            validate_num_employees(n)?;
        }
        if let Some(Some(url)) = &self.logo_url {
            validate_logo_url(url)?;
        }
        Ok(())
    }

    /// Supplied fields keyed by their API names, in declaration order. Explicit nulls
    /// become `Value::Null`.
    pub fn into_fields(self) -> Map<String, Value> {
        let mut fields = Map::new();
        if let Some(v) = self.name {
            fields.insert("name".into(), Value::String(v));
        }
        if let Some(v) = self.description {
            fields.insert("description".into(), Value::String(v));
        }
        if let Some(v) = self.num_employees {
            fields.insert("numEmployees".into(), v.map_or(Value::Null, Value::from));
        }
        if let Some(v) = self.logo_url {
            fields.insert("logoUrl".into(), v.map_or(Value::Null, Value::String));
        }
        fields
    }
}

fn validate_handle(handle: &str) -> Result<(), String> {
    if handle.is_empty() || handle.len() > 25 {
        return Err("handle must be 1-25 characters".to_string());
    }
    if !handle.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_') {
        return Err("handle may only contain lowercase letters, digits, '-' and '_'".to_string());
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() || name.chars().count() > 50 {
        return Err("name must be 1-50 characters".to_string());
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), String> {
    if description.trim().is_empty() {
        return Err("description must not be empty".to_string());
    }
    Ok(())
}

fn validate_num_employees(n: i32) -> Result<(), String> {
    if n < 0 {
        return Err("numEmployees must be >= 0".to_string());
    }
    Ok(())
}

fn validate_logo_url(raw: &str) -> Result<(), String> {
    url::Url::parse(raw).map(|_| ()).map_err(|_| format!("logoUrl is not a valid URL: {}", raw))
}

impl Company {
    pub async fn create(pool: &PgPool, data: &CompanyNew) -> Result<Company, DatabaseError> {
        sqlx::query_as::<_, Company>(
            "INSERT INTO companies (handle, name, description, num_employees, logo_url)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING handle, name, description, num_employees, logo_url",
        )
        .bind(&data.handle)
        .bind(&data.name)
        .bind(&data.description)
        .bind(data.num_employees)
        .bind(&data.logo_url)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            DatabaseError::from_constraint(
                e,
                || format!("Duplicate company: {}", data.handle),
                || format!("Invalid company: {}", data.handle),
            )
        })
    }

    /// List companies ordered by name, narrowed by the `COMPANY_FILTERS` keys.
    pub async fn find_all(pool: &PgPool, filters: Option<&Map<String, Value>>) -> Result<Vec<Company>, DatabaseError> {
        if let Some(fields) = filters {
            check_employee_range(fields)?;
        }

        let mut filter = Filter::new("companies")?;
        filter
            .select(COMPANY_COLUMNS)?
            .where_spec(filters, &COMPANY_FILTERS)?
            .order("name", SortDirection::Asc)?;

        QueryBuilder::<Company>::new(filter.to_sql()).fetch_all(pool).await
    }

    pub async fn find(pool: &PgPool, handle: &str) -> Result<Company, DatabaseError> {
        sqlx::query_as::<_, Company>(
            "SELECT handle, name, description, num_employees, logo_url
             FROM companies
             WHERE handle = $1",
        )
        .bind(handle)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("No company: {}", handle)))
    }

    pub async fn get(pool: &PgPool, handle: &str) -> Result<CompanyDetail, DatabaseError> {
        let company = Self::find(pool, handle).await?;
        let jobs = JobSummary::for_company(pool, handle).await?;
        Ok(CompanyDetail { company, jobs })
    }

    /// Partial update; only the supplied fields change.
    pub async fn update(pool: &PgPool, handle: &str, fields: &Map<String, Value>) -> Result<Company, DatabaseError> {
        let set = FilterSet::generate_typed(fields, COMPANY_UPDATE_COLUMNS, COMPANY_COLUMN_TYPES)?;
        let query = format!(
            "UPDATE companies SET {} WHERE handle = ${} RETURNING {}",
            set.query,
            set.next_param_index(),
            COMPANY_COLUMNS.join(", ")
        );
        let mut params = set.params;
        params.push(Value::String(handle.to_string()));

        QueryBuilder::<Company>::new(SqlResult { query, params })
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("No company: {}", handle)))
    }

    pub async fn remove(pool: &PgPool, handle: &str) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM companies WHERE handle = $1")
            .bind(handle)
            .execute(pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("No company: {}", handle)));
        }
        Ok(())
    }
}

fn check_employee_range(fields: &Map<String, Value>) -> Result<(), DatabaseError> {
    let min = fields.get("minEmployees").and_then(Value::as_i64);
    let max = fields.get("maxEmployees").and_then(Value::as_i64);
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(DatabaseError::Invalid(
                "Min employees cannot be greater than max".to_string(),
            ));
        }
    }
    Ok(())
}

use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::{FromRow, PgPool};

use crate::database::manager::DatabaseError;
use crate::database::models::company::Company;
use crate::database::models::patch;
use crate::database::query_builder::QueryBuilder;
use crate::filter::{ColumnMap, ColumnTypes, Filter, FilterOp, FilterRule, FilterSet, FilterSpec, SortDirection, SqlResult};

pub const JOB_COLUMNS: &[&str] = &["id", "title", "salary", "equity", "company_handle"];

/// Job fields share their column names
pub const JOB_UPDATE_COLUMNS: &ColumnMap = &[];

/// Equity travels as its decimal string and is cast server-side
pub const JOB_COLUMN_TYPES: &ColumnTypes = &[("salary", "integer"), ("equity", "numeric")];

pub static JOB_FILTERS: Lazy<FilterSpec> = Lazy::new(|| {
    FilterSpec::new(vec![
        FilterRule::new("titleLike", FilterOp::PartialMatch("title")),
        FilterRule::new("minSalary", FilterOp::MinBound("salary")),
        // hasEquity=false leaves equity unfiltered rather than selecting zero-equity jobs
        FilterRule::new(
            "hasEquity",
            FilterOp::ConditionalPresence {
                trigger: Value::Bool(true),
                fragment: "equity IS NOT NULL AND equity != 0",
            },
        ),
        FilterRule::new("companyHandle", FilterOp::ExactMatch("company_handle")),
    ])
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

/// Job as listed under its company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct JobSummary {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
}

impl JobSummary {
    pub async fn for_company(pool: &PgPool, handle: &str) -> Result<Vec<JobSummary>, DatabaseError> {
        let jobs = sqlx::query_as::<_, JobSummary>(
            "SELECT id, title, salary, equity
             FROM jobs
             WHERE company_handle = $1
             ORDER BY id",
        )
        .bind(handle)
        .fetch_all(pool)
        .await?;
        Ok(jobs)
    }
}

/// A job together with the company that posts it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDetail {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company: Company,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobNew {
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

impl JobNew {
    pub fn validate(&self) -> Result<(), String> {
        validate_title(&self.title)?;
        if let Some(salary) = self.salary {
            validate_salary(salary)?;
        }
        if let Some(equity) = self.equity {
            validate_equity(equity)?;
        }
        if self.company_handle.is_empty() {
            return Err("companyHandle must not be empty".to_string());
        }
        Ok(())
    }
}

/// Patchable job fields. `id` and `companyHandle` cannot change.
/// `salary` and `equity` may be set to `null`; `title` may not.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobUpdate {
    #[serde(default, deserialize_with = "patch::required")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "patch::nullable")]
    pub salary: Option<Option<i32>>,
    #[serde(default, deserialize_with = "patch::nullable")]
    pub equity: Option<Option<Decimal>>,
}

impl JobUpdate {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(Some(salary)) = self.salary {
            validate_salary(salary)?;
        }
        if let Some(Some(equity)) = self.equity {
            validate_equity(equity)?;
        }
        Ok(())
    }

    /// Supplied fields keyed by their API names, in declaration order. Equity is kept
    /// as its exact decimal text; explicit nulls become `Value::Null`.
    pub fn into_fields(self) -> Map<String, Value> {
        let mut fields = Map::new();
        if let Some(v) = self.title {
            fields.insert("title".into(), Value::String(v));
        }
        if let Some(v) = self.salary {
            fields.insert("salary".into(), v.map_or(Value::Null, Value::from));
        }
        if let Some(v) = self.equity {
            fields.insert("equity".into(), v.map_or(Value::Null, |d| Value::String(d.to_string())));
        }
        fields
    }
}

fn validate_title(title: &str) -> Result<(), String> {
    if title.trim().is_empty() {
        return Err("title must not be empty".to_string());
    }
    Ok(())
}

fn validate_salary(salary: i32) -> Result<(), String> {
    if salary < 0 {
        return Err("salary must be >= 0".to_string());
    }
    Ok(())
}

fn validate_equity(equity: Decimal) -> Result<(), String> {
    if equity.is_sign_negative() || equity > Decimal::ONE {
        return Err("equity must be between 0 and 1".to_string());
    }
    Ok(())
}

impl Job {
    pub async fn create(pool: &PgPool, data: &JobNew) -> Result<Job, DatabaseError> {
        sqlx::query_as::<_, Job>(
            "INSERT INTO jobs (title, salary, equity, company_handle)
             VALUES ($1, $2, $3, $4)
             RETURNING id, title, salary, equity, company_handle",
        )
        .bind(&data.title)
        .bind(data.salary)
        .bind(data.equity)
        .bind(&data.company_handle)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            DatabaseError::from_constraint(
                e,
                || format!("Duplicate job: {}", data.title),
                || format!("No company: {}", data.company_handle),
            )
        })
    }

    /// List jobs ordered by title, narrowed by the `JOB_FILTERS` keys.
    pub async fn find_all(pool: &PgPool, filters: Option<&Map<String, Value>>) -> Result<Vec<Job>, DatabaseError> {
        let mut filter = Filter::new("jobs")?;
        filter
            .select(JOB_COLUMNS)?
            .where_spec(filters, &JOB_FILTERS)?
            .order("title", SortDirection::Asc)?;

        QueryBuilder::<Job>::new(filter.to_sql()).fetch_all(pool).await
    }

    pub async fn get(pool: &PgPool, id: i32) -> Result<JobDetail, DatabaseError> {
        let job = sqlx::query_as::<_, Job>(
            "SELECT id, title, salary, equity, company_handle
             FROM jobs
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("No job: {}", id)))?;

        let company = Company::find(pool, &job.company_handle).await?;
        Ok(JobDetail {
            id: job.id,
            title: job.title,
            salary: job.salary,
            equity: job.equity,
            company,
        })
    }

    /// Partial update; only the supplied fields change.
    pub async fn update(pool: &PgPool, id: i32, fields: &Map<String, Value>) -> Result<Job, DatabaseError> {
        let set = FilterSet::generate_typed(fields, JOB_UPDATE_COLUMNS, JOB_COLUMN_TYPES)?;
        let query = format!(
            "UPDATE jobs SET {} WHERE id = ${} RETURNING {}",
            set.query,
            set.next_param_index(),
            JOB_COLUMNS.join(", ")
        );
        let mut params = set.params;
        params.push(Value::from(id));

        QueryBuilder::<Job>::new(SqlResult { query, params })
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("No job: {}", id)))
    }

    pub async fn remove(pool: &PgPool, id: i32) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("No job: {}", id)));
        }
        Ok(())
    }
}

use serde_json::{Map, Value};

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{FilterOrderInfo, FilterSpec, SortDirection, SqlResult};

/// Composes a `SELECT` for a resource list: columns, optional filters, ordering.
pub struct Filter {
    table_name: String,
    select_columns: Vec<String>,
    where_result: SqlResult,
    order_data: Vec<FilterOrderInfo>,
}

impl Filter {
    pub fn new(table_name: impl Into<String>) -> Result<Self, FilterError> {
        let table_name = table_name.into();
        Self::validate_identifier(&table_name).map_err(FilterError::InvalidTableName)?;
        Ok(Self {
            table_name,
            select_columns: vec![],
            where_result: SqlResult::default(),
            order_data: vec![],
        })
    }

    pub fn select(&mut self, columns: &[&str]) -> Result<&mut Self, FilterError> {
        for column in columns {
            Self::validate_identifier(column).map_err(FilterError::InvalidColumn)?;
        }
        self.select_columns = columns.iter().map(|c| c.to_string()).collect();
        Ok(self)
    }

    pub fn where_spec(&mut self, fields: Option<&Map<String, Value>>, spec: &FilterSpec) -> Result<&mut Self, FilterError> {
        self.where_result = FilterWhere::generate(fields, spec)?;
        Ok(self)
    }

    pub fn order(&mut self, column: &str, sort: SortDirection) -> Result<&mut Self, FilterError> {
        Self::validate_identifier(column).map_err(FilterError::InvalidColumn)?;
        self.order_data.push(FilterOrderInfo { column: column.to_string(), sort });
        Ok(self)
    }

    pub fn to_sql(&self) -> SqlResult {
        let query = [
            format!("SELECT {}", self.build_select_clause()),
            format!("FROM \"{}\"", self.table_name),
            self.where_result.query.clone(),
            FilterOrder::generate(&self.order_data),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        SqlResult { query, params: self.where_result.params.clone() }
    }

    /// Accepts `[A-Za-z_][A-Za-z0-9_]*`; returns the offending name on failure.
    pub fn validate_identifier(name: &str) -> Result<(), String> {
        let mut chars = name.chars();
        let valid_start = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_');
        if valid_start && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            Ok(())
        } else {
            Err(name.to_string())
        }
    }

    fn build_select_clause(&self) -> String {
        if self.select_columns.is_empty() {
            "*".to_string()
        } else {
            self.select_columns.iter().map(|c| format!("\"{}\"", c)).collect::<Vec<_>>().join(", ")
        }
    }
}

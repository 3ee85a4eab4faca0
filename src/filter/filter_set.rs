use serde_json::{Map, Value};

use super::error::FilterError;
use super::filter::Filter;
use super::types::{ColumnMap, ColumnTypes, SqlResult};

/// Builds the `SET` part of a partial UPDATE.
pub struct FilterSet;

impl FilterSet {
    /// Generate `"col"=$1, "col"=$2, ...` for every entry of `fields`, in order.
    ///
    /// `column_map` translates field names to columns; unmapped names are used as-is.
    /// Fails with [`FilterError::NoDataSupplied`] when `fields` is empty.
    pub fn generate(fields: &Map<String, Value>, column_map: &ColumnMap) -> Result<SqlResult, FilterError> {
        Self::generate_typed(fields, column_map, &[])
    }

    /// Like [`FilterSet::generate`], casting the placeholder of every column listed in
    /// `column_types`, e.g. `"salary"=$2::integer`.
    pub fn generate_typed(
        fields: &Map<String, Value>,
        column_map: &ColumnMap,
        column_types: &ColumnTypes,
    ) -> Result<SqlResult, FilterError> {
        if fields.is_empty() {
            return Err(FilterError::NoDataSupplied);
        }

        let mut fragments = Vec::with_capacity(fields.len());
        let mut params = Vec::with_capacity(fields.len());
        for (idx, (field, value)) in fields.iter().enumerate() {
            let column = Self::column_for(field, column_map);
            Filter::validate_identifier(column).map_err(FilterError::InvalidColumn)?;
            let cast = match column_types.iter().find(|(name, _)| *name == column) {
                Some((_, sql_type)) => {
                    Filter::validate_identifier(sql_type).map_err(FilterError::InvalidColumn)?;
                    format!("::{}", sql_type)
                }
                None => String::new(),
            };
            fragments.push(format!("\"{}\"=${}{}", column, idx + 1, cast));
            params.push(value.clone());
        }

        Ok(SqlResult { query: fragments.join(", "), params })
    }

    fn column_for<'a>(field: &'a str, column_map: &ColumnMap) -> &'a str {
        column_map
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, column)| *column)
            .unwrap_or(field)
    }
}

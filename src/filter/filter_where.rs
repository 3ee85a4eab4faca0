use serde_json::{Map, Value};

use super::error::FilterError;
use super::types::{FilterOp, FilterSpec, SqlResult};

/// Builds `WHERE ...` clauses from a flat map of filter keys, driven by a [`FilterSpec`].
pub struct FilterWhere<'a> {
    spec: &'a FilterSpec,
    param_values: Vec<Value>,
    param_index: usize,
    conditions: Vec<String>,
}

impl<'a> FilterWhere<'a> {
    pub fn new(spec: &'a FilterSpec) -> Self {
        Self {
            spec,
            param_values: vec![],
            param_index: 0,
            conditions: vec![],
        }
    }

    /// Generate the WHERE clause for `fields`.
    ///
    /// Keys are visited in the map's insertion order. An absent or empty map yields an
    /// empty clause with no params. Keys missing from `spec` are rejected, as are
    /// null, array and object values for keys that bind a parameter.
    pub fn generate(fields: Option<&Map<String, Value>>, spec: &FilterSpec) -> Result<SqlResult, FilterError> {
        let Some(fields) = fields else {
            return Ok(SqlResult::default());
        };
        let mut filter_where = FilterWhere::new(spec);
        filter_where.build(fields)
    }

    fn build(&mut self, fields: &Map<String, Value>) -> Result<SqlResult, FilterError> {
        let spec = self.spec;
        for (key, value) in fields {
            let rule = spec
                .rule(key)
                .ok_or_else(|| FilterError::UnrecognizedFilterKey(key.clone()))?;
            if let Some(sql) = self.build_condition(key, &rule.op, value)? {
                self.conditions.push(sql);
            }
        }

        if self.conditions.is_empty() {
            return Ok(SqlResult::default());
        }

        Ok(SqlResult {
            query: format!("WHERE {}", self.conditions.join(" AND ")),
            params: std::mem::take(&mut self.param_values),
        })
    }

    fn build_condition(&mut self, key: &str, op: &FilterOp, value: &Value) -> Result<Option<String>, FilterError> {
        let sql = match op {
            FilterOp::PartialMatch(column) => {
                let pattern = Value::String(format!("%{}%", Self::as_text(Self::scalar(key, value)?)));
                format!("{} ILIKE {}", column, self.param(pattern))
            }
            FilterOp::MinBound(column) => {
                let value = Self::scalar(key, value)?.clone();
                format!("{} >= {}", column, self.param(value))
            }
            FilterOp::MaxBound(column) => {
                let value = Self::scalar(key, value)?.clone();
                format!("{} <= {}", column, self.param(value))
            }
            FilterOp::ExactMatch(column) => {
                let value = Self::scalar(key, value)?.clone();
                format!("{} = {}", column, self.param(value))
            }
            FilterOp::ConditionalPresence { trigger, fragment } => {
                // Non-trigger values are a no-op, not a negation.
                return Ok((value == trigger).then(|| fragment.to_string()));
            }
        };
        Ok(Some(sql))
    }

    fn scalar<'v>(key: &str, value: &'v Value) -> Result<&'v Value, FilterError> {
        let kind = match value {
            Value::Null => "null",
            Value::Array(_) => "an array",
            Value::Object(_) => "an object",
            _ => return Ok(value),
        };
        Err(FilterError::InvalidFilterValue {
            key: key.to_string(),
            reason: format!("expected a string, number or boolean, got {}", kind),
        })
    }

    fn as_text(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    fn param(&mut self, value: Value) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}

use serde_json::{Map, Number, Value};

use super::error::FilterError;
use super::types::{FilterSpec, ValueKind};

/// Turn raw query-string pairs into a typed filter map, keeping their order.
///
/// Each value is coerced to the shape its rule expects (`minSalary=10` becomes a
/// number, `hasEquity=true` a boolean). Unknown keys are rejected here as well so
/// the client hears about them before any SQL is built.
pub fn parse_query_pairs(pairs: &[(String, String)], spec: &FilterSpec) -> Result<Map<String, Value>, FilterError> {
    let mut fields = Map::new();
    for (key, raw) in pairs {
        let rule = spec
            .rule(key)
            .ok_or_else(|| FilterError::UnrecognizedFilterKey(key.clone()))?;
        let value = coerce(key, raw, rule.op.value_kind())?;
        fields.insert(key.clone(), value);
    }
    Ok(fields)
}

fn coerce(key: &str, raw: &str, kind: ValueKind) -> Result<Value, FilterError> {
    let invalid = |reason: &str| FilterError::InvalidFilterValue {
        key: key.to_string(),
        reason: reason.to_string(),
    };
    match kind {
        ValueKind::Text => {
            if raw.is_empty() {
                return Err(invalid("must not be empty"));
            }
            Ok(Value::String(raw.to_string()))
        }
        ValueKind::Integer => raw
            .trim()
            .parse::<i64>()
            .map(|n| Value::Number(Number::from(n)))
            .map_err(|_| invalid("must be an integer")),
        ValueKind::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(invalid("must be true or false")),
        },
    }
}

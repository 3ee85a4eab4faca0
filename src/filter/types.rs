use serde_json::Value;

/// How a recognized filter key turns into a WHERE fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOp {
    /// `column ILIKE $N`, value bound as `%value%`
    PartialMatch(&'static str),
    /// `column >= $N`
    MinBound(&'static str),
    /// `column <= $N`
    MaxBound(&'static str),
    /// `column = $N`
    ExactMatch(&'static str),
    /// Emits `fragment` with no bound value, and only when the value equals `trigger`.
    /// Any other value skips the key entirely; `false` does not mean "the complement".
    ConditionalPresence {
        trigger: Value,
        fragment: &'static str,
    },
}

impl FilterOp {
    /// Shape of the raw value this operator expects from a query string.
    pub fn value_kind(&self) -> ValueKind {
        match self {
            FilterOp::PartialMatch(_) | FilterOp::ExactMatch(_) => ValueKind::Text,
            FilterOp::MinBound(_) | FilterOp::MaxBound(_) => ValueKind::Integer,
            FilterOp::ConditionalPresence { trigger, .. } => match trigger {
                Value::Bool(_) => ValueKind::Boolean,
                Value::Number(_) => ValueKind::Integer,
                _ => ValueKind::Text,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Integer,
    Boolean,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterRule {
    pub key: &'static str,
    pub op: FilterOp,
}

impl FilterRule {
    pub fn new(key: &'static str, op: FilterOp) -> Self {
        Self { key, op }
    }
}

/// Per-resource table of recognized filter keys.
#[derive(Debug, Clone, Default)]
pub struct FilterSpec {
    rules: Vec<FilterRule>,
}

impl FilterSpec {
    pub fn new(rules: Vec<FilterRule>) -> Self {
        Self { rules }
    }

    pub fn rule(&self, key: &str) -> Option<&FilterRule> {
        self.rules.iter().find(|r| r.key == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|r| r.key)
    }
}

/// Field-name to storage-column translation for UPDATE statements.
/// Field names missing from the table are used verbatim.
pub type ColumnMap = [(&'static str, &'static str)];

/// Storage column to SQL type. Placeholders for listed columns get an explicit
/// `::type` cast so NULLs and decimal strings land in non-text columns.
pub type ColumnTypes = [(&'static str, &'static str)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterOrderInfo {
    pub column: String,
    pub sort: SortDirection,
}

/// Clause text with `$N` placeholders plus the values bound to them, in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<Value>,
}

impl SqlResult {
    pub fn is_empty(&self) -> bool {
        self.query.is_empty()
    }

    /// Placeholder number the caller should use for its next appended value.
    pub fn next_param_index(&self) -> usize {
        self.params.len() + 1
    }
}

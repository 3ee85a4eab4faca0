use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("No data")]
    NoDataSupplied,

    #[error("Unrecognized filter: {0}")]
    UnrecognizedFilterKey(String),

    #[error("Invalid value for filter '{key}': {reason}")]
    InvalidFilterValue { key: String, reason: String },

    #[error("Invalid table name: {0}")]
    InvalidTableName(String),

    #[error("Invalid column name: {0}")]
    InvalidColumn(String),
}

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SimError>;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("missing required field `{field}`")]
    MissingField { field: &'static str },

    #[error("row {row}: empty value for required field `{field}`")]
    MissingValue { row: usize, field: &'static str },

    #[error("row {row}: cannot parse `{value}` as a number for field `{field}`")]
    InvalidValue {
        row: usize,
        field: &'static str,
        value: String,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Reducer called on an empty (or too small) result set.
    #[error("no data: {0}")]
    NoData(&'static str),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

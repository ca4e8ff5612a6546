use std::io;

/// Everything the inference, extent and mapping routines can fail with.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] io::Error),

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row} has {found} cells but the header only has {expected}")]
    RowTooLong {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("cannot parse {value:?} as a date: {reason}")]
    DateParse { value: String, reason: String },

    #[error("column {column} holds no dates")]
    NoDates { column: usize },

    #[error("column {column} mixes offset-naive and offset-aware datetimes")]
    MixedTimezones { column: usize },

    #[error("column index must be an integer, got {0:?}")]
    InvalidColumnIndex(String),

    #[error("column index {index} out of range for {columns} columns")]
    ColumnOutOfRange { index: usize, columns: usize },

    #[error("missing key: {0}")]
    MissingKey(String),

    #[error("two inputs would both be stored as {0}")]
    DuplicateEntry(String),

    #[error("{key}: expected {expected}")]
    UnexpectedType { key: String, expected: &'static str },

    #[error(transparent)]
    Arrow(#[from] arrow::error::ArrowError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),

    #[error(transparent)]
    Glob(#[from] glob::PatternError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub(crate) fn date(value: &str, reason: impl Into<String>) -> Self {
        Error::DateParse {
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

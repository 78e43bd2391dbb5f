use std::path::PathBuf;

/// Fatal errors raised while loading the booking dataset.
///
/// Any of these means the process must not start serving charts.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to read dataset '{}': {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Dataset is missing required columns: {missing:?}")]
    Schema { missing: Vec<String> },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// A raw cell that could not be coerced to its column's type.
///
/// Kept on the record at load time and only reported when a filter or
/// aggregation actually reads it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("could not parse '{raw}' in column '{column}' (line {line})")]
pub struct MalformedValue {
    pub column: &'static str,
    pub raw: String,
    pub line: usize,
}

/// Per-request failure inside filtering or aggregation.
///
/// Never returned to callers of `Dashboard::compute`; it is folded into the
/// placeholder chart instead.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AggregateError {
    #[error(transparent)]
    Malformed(#[from] MalformedValue),
}

pub type Result<T> = std::result::Result<T, DatasetError>;

//! Typed errors for the core operations.
//!
//! No-match retrieval is not an error: [`retrieve`](crate::retrieve::retrieve)
//! returns `None` instead, so there is no variant for an empty corpus.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// No classifier was loaded at startup.
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    /// A required dataset column is absent.
    #[error("missing '{column}' column in dataset")]
    SchemaError { column: String },

    /// The dataset has no rows to aggregate.
    #[error("no valid customers found in the data")]
    EmptyDataset,

    #[error("customer not found: {0}")]
    NotFound(String),

    /// The model artifact parsed but failed validation.
    #[error("invalid model artifact: {0}")]
    InvalidModel(String),

    #[error("feature vector has {got} values, model expects {expected}")]
    FeatureCount { expected: usize, got: usize },

    #[error("row {row} has {got} fields, header has {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        got: usize,
    },
}

impl CoreError {
    pub fn missing_column(column: &str) -> Self {
        CoreError::SchemaError {
            column: column.to_string(),
        }
    }
}

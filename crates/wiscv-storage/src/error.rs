use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("patient not found: {0}")]
    PatientNotFound(Uuid),

    #[error("evaluation not found: {0}")]
    EvaluationNotFound(Uuid),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("stored value in column '{column}' is corrupt: {message}")]
    Decode { column: &'static str, message: String },

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl StorageError {
    pub(crate) fn decode(column: &'static str, err: impl std::fmt::Display) -> Self {
        StorageError::Decode {
            column,
            message: err.to_string(),
        }
    }
}

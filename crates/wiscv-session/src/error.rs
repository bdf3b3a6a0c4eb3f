use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Storage(#[from] wiscv_storage::StorageError),

    #[error(transparent)]
    Norm(#[from] wiscv_norms::error::NormError),

    #[error(transparent)]
    Report(#[from] wiscv_report::ReportError),

    #[error(transparent)]
    Predict(#[from] wiscv_predict::PredictError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid age '{0}': expected 'years:months' with months in 0..=11")]
    InvalidAge(String),

    #[error("unknown subtest code: {0}")]
    UnknownSubtest(String),

    #[error("unknown composite index: {0}")]
    UnknownIndex(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid uuid: {0}")]
    InvalidUuid(#[from] uuid::Error),
}

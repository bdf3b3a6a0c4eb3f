use thiserror::Error;

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("predictor has not been trained")]
    NotTrained,

    #[error("not enough training data: {pairs} pairs, {required} required")]
    InsufficientData { pairs: usize, required: usize },

    #[error("latest evaluation is missing one or more composite scores")]
    IncompleteProfile,

    #[error("model fit failed: {0}")]
    Fit(String),
}

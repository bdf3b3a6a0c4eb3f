//! wiscv-predict
//!
//! Longitudinal forecasting of composite scores: ridge-regularized linear
//! models over consecutive-evaluation pairs. Peripheral to scoring: the
//! predictor never feeds back into conversion.

pub mod error;
mod features;
mod model;
pub mod predictor;

pub use error::PredictError;
pub use features::{INDEX_ORDER, MAX_GAP_MONTHS, MIN_GAP_MONTHS};
pub use predictor::{EvolutionPredictor, MIN_TRAINING_PAIRS, Prognosis, Trend};

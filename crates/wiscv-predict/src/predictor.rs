//! The evolution predictor: one regression head for the Full Scale
//! composite and five independent heads for the primary indices, fit over
//! consecutive-evaluation pairs.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::info;

use wiscv_core::CompositeIndex;
use wiscv_core::models::Evaluation;

use crate::error::PredictError;
use crate::features::{INDEX_ORDER, TARGET_COUNT, prediction_features, training_pairs};
use crate::model::{RidgeHead, Standardizer};

/// Below this many pairs the fit is noise, not a model.
pub const MIN_TRAINING_PAIRS: usize = 10;

const RIDGE_LAMBDA: f64 = 1.0;
const TREND_THRESHOLD: f64 = 3.0;
const MIN_CONFIDENCE: f64 = 60.0;
const MAX_CONFIDENCE: f64 = 95.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Stable,
    Declining,
}

#[derive(Debug, Clone, Serialize)]
pub struct Prognosis {
    pub horizon_months: u32,
    pub predicted: BTreeMap<CompositeIndex, u8>,
    pub trend: Trend,
    pub confidence_percent: u8,
    pub recommendations: Vec<String>,
}

pub struct EvolutionPredictor {
    standardizer: Standardizer,
    heads: [RidgeHead; TARGET_COUNT],
}

impl EvolutionPredictor {
    /// Fit from per-patient histories (each sorted oldest first).
    pub fn train(histories: &[Vec<Evaluation>]) -> Result<Self, PredictError> {
        let pairs = training_pairs(histories);
        if pairs.len() < MIN_TRAINING_PAIRS {
            return Err(PredictError::InsufficientData {
                pairs: pairs.len(),
                required: MIN_TRAINING_PAIRS,
            });
        }

        let feature_refs: Vec<&[f64]> = pairs.iter().map(|p| p.features.as_slice()).collect();
        let standardizer = Standardizer::fit(&feature_refs);
        let x: Vec<Vec<f64>> = pairs
            .iter()
            .map(|p| standardizer.transform(&p.features))
            .collect();

        let mut heads = Vec::with_capacity(TARGET_COUNT);
        for target in 0..TARGET_COUNT {
            let y: Vec<f64> = pairs.iter().map(|p| p.targets[target]).collect();
            heads.push(RidgeHead::fit(&x, &y, RIDGE_LAMBDA)?);
        }
        let heads: [RidgeHead; TARGET_COUNT] = heads
            .try_into()
            .map_err(|_| PredictError::Fit("head count mismatch".into()))?;

        info!(pairs = pairs.len(), "evolution predictor trained");
        Ok(EvolutionPredictor { standardizer, heads })
    }

    fn mean_r_squared(&self) -> f64 {
        self.heads.iter().map(|h| h.r_squared).sum::<f64>() / TARGET_COUNT as f64
    }

    /// Forecast the six composites `horizon_months` after the latest
    /// evaluation in `history`.
    pub fn predict(
        &self,
        history: &[Evaluation],
        horizon_months: u32,
    ) -> Result<Prognosis, PredictError> {
        let current = history.last().ok_or(PredictError::IncompleteProfile)?;
        let features = prediction_features(current, f64::from(horizon_months))
            .ok_or(PredictError::IncompleteProfile)?;
        let standardized = self.standardizer.transform(&features);

        let mut predicted = BTreeMap::new();
        for (index, head) in INDEX_ORDER.into_iter().zip(&self.heads) {
            let value = head.predict(&standardized).round().clamp(40.0, 160.0) as u8;
            predicted.insert(index, value);
        }

        let current_cit = current
            .composite(CompositeIndex::Cit)
            .ok_or(PredictError::IncompleteProfile)?;
        let delta = f64::from(predicted[&CompositeIndex::Cit]) - f64::from(current_cit);
        let trend = if delta > TREND_THRESHOLD {
            Trend::Improving
        } else if delta < -TREND_THRESHOLD {
            Trend::Declining
        } else {
            Trend::Stable
        };

        let confidence_percent = (self.mean_r_squared().max(0.0) * 100.0)
            .clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
            .round() as u8;

        Ok(Prognosis {
            horizon_months,
            recommendations: recommendations(&predicted),
            trend,
            confidence_percent,
            predicted,
        })
    }
}

fn recommendations(predicted: &BTreeMap<CompositeIndex, u8>) -> Vec<String> {
    let primary: Vec<(CompositeIndex, u8)> = CompositeIndex::PRIMARY
        .iter()
        .filter_map(|i| predicted.get(i).map(|v| (*i, *v)))
        .collect();
    let mut out = Vec::new();

    if let Some(&(index, value)) = primary.iter().min_by_key(|(_, v)| *v)
        && value < 90
    {
        out.push(format!(
            "Reinforce {} ({}): projected score {} is below the average range.",
            index.name(),
            index.abbreviation(),
            value
        ));
        match index {
            CompositeIndex::Imt => {
                out.push("Consider working-memory exercises (digit and picture span games).".into())
            }
            CompositeIndex::Ivp => out.push(
                "Consider timed visual-scanning activities to build processing speed.".into(),
            ),
            CompositeIndex::Irf => {
                out.push("Consider pattern and matrix puzzles to exercise fluid reasoning.".into())
            }
            _ => {}
        }
    }

    if let Some(&(index, value)) = primary.iter().max_by_key(|(_, v)| *v)
        && value > 110
    {
        out.push(format!(
            "{} ({}) is a projected strength at {}; build on it in enrichment work.",
            index.name(),
            index.abbreviation(),
            value
        ));
    }

    if out.is_empty() {
        out.push(
            "Profile is projected to stay balanced; continue the current support plan.".into(),
        );
    }
    out
}

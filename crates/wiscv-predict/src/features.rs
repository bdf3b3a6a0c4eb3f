//! Feature construction from longitudinal evaluation history.
//!
//! One training pair per consecutive evaluation of the same patient:
//! features are the time gap, the age at the earlier administration, and its
//! six composite scores; targets are the six later composite scores.

use wiscv_core::CompositeIndex;
use wiscv_core::models::Evaluation;

/// Composite ordering shared by feature vectors and prediction output.
pub const INDEX_ORDER: [CompositeIndex; 6] = [
    CompositeIndex::Icv,
    CompositeIndex::Ive,
    CompositeIndex::Irf,
    CompositeIndex::Imt,
    CompositeIndex::Ivp,
    CompositeIndex::Cit,
];

pub const FEATURE_COUNT: usize = 8;
pub const TARGET_COUNT: usize = 6;

/// Gaps outside this window carry no usable signal for a school-age norm.
pub const MIN_GAP_MONTHS: f64 = 1.0;
pub const MAX_GAP_MONTHS: f64 = 36.0;

const SECONDS_PER_MONTH: f64 = 30.44 * 86_400.0;

#[derive(Debug, Clone)]
pub(crate) struct TrainingPair {
    pub features: [f64; FEATURE_COUNT],
    pub targets: [f64; TARGET_COUNT],
}

pub(crate) fn months_between(earlier: &Evaluation, later: &Evaluation) -> f64 {
    let seconds = (later.administered_at.as_second() - earlier.administered_at.as_second()) as f64;
    seconds / SECONDS_PER_MONTH
}

fn composite_vector(evaluation: &Evaluation) -> Option<[f64; TARGET_COUNT]> {
    let mut out = [0.0; TARGET_COUNT];
    for (slot, index) in out.iter_mut().zip(INDEX_ORDER) {
        *slot = f64::from(evaluation.composite(index)?);
    }
    Some(out)
}

/// Feature vector for predicting `horizon_months` ahead of `current`.
/// `None` when the evaluation lacks any of the six composites.
pub(crate) fn prediction_features(
    current: &Evaluation,
    horizon_months: f64,
) -> Option<[f64; FEATURE_COUNT]> {
    let scores = composite_vector(current)?;
    let mut features = [0.0; FEATURE_COUNT];
    features[0] = horizon_months;
    features[1] = f64::from(current.record.age.total_months());
    features[2..].copy_from_slice(&scores);
    Some(features)
}

/// Build training pairs from per-patient histories (each sorted oldest
/// first). Pairs with out-of-window gaps or incomplete profiles are skipped.
pub(crate) fn training_pairs(histories: &[Vec<Evaluation>]) -> Vec<TrainingPair> {
    let mut pairs = Vec::new();
    for history in histories {
        for window in history.windows(2) {
            let (earlier, later) = (&window[0], &window[1]);
            let gap = months_between(earlier, later);
            if !(MIN_GAP_MONTHS..=MAX_GAP_MONTHS).contains(&gap) {
                continue;
            }
            let (Some(features), Some(targets)) =
                (prediction_features(earlier, gap), composite_vector(later))
            else {
                continue;
            };
            pairs.push(TrainingPair { features, targets });
        }
    }
    pairs
}

/// Synthetic evaluation builder shared by tests across the crate.
#[cfg(test)]
pub(crate) fn synthetic_evaluation(
    when: &str,
    age: wiscv_core::Age,
    scores: [u8; 6],
) -> Evaluation {
    use std::collections::BTreeMap;
    use wiscv_core::models::{CompositeResult, CompositeScore, EvaluationRecord};

    let mut composites = BTreeMap::new();
    for (index, value) in INDEX_ORDER.into_iter().zip(scores) {
        composites.insert(
            index,
            CompositeResult {
                sum: 20,
                score: CompositeScore {
                    value,
                    percentile: "50".to_string(),
                    conf_90: String::new(),
                    conf_95: String::new(),
                },
            },
        );
    }
    let mut e = Evaluation::new(
        uuid::Uuid::new_v4(),
        EvaluationRecord {
            age,
            confidence: Default::default(),
            subtests: BTreeMap::new(),
            composites,
            observations: None,
        },
    );
    e.administered_at = when.parse().unwrap();
    e
}

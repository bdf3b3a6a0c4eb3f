//! Whole-form scoring: convert every entered raw score, then derive the
//! composites that have member subtests available.
//!
//! Individual subtest failures do not abort the rest of the form; they are
//! collected by name so the caller can surface them next to the field.

use std::collections::BTreeMap;

use wiscv_core::models::{CompositeResult, ConfidenceLevel, EvaluationRecord, SubtestEntry};
use wiscv_core::{Age, CompositeIndex, Subtest};

use crate::NormSet;
use crate::error::NormError;

/// A conversion failure attributed to the subtest or index that caused it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreFailure {
    /// Subtest code or index abbreviation the failure belongs to.
    pub context: String,
    pub message: String,
}

impl ScoreFailure {
    fn new(context: impl Into<String>, err: &NormError) -> Self {
        ScoreFailure {
            context: context.into(),
            message: err.to_string(),
        }
    }
}

/// The outcome of scoring one form of raw scores.
#[derive(Debug, Clone)]
pub struct ScoredProfile {
    pub age: Age,
    pub confidence: ConfidenceLevel,
    pub subtests: BTreeMap<Subtest, SubtestEntry>,
    pub composites: BTreeMap<CompositeIndex, CompositeResult>,
    pub failures: Vec<ScoreFailure>,
}

impl ScoredProfile {
    pub fn into_record(self, observations: Option<String>) -> EvaluationRecord {
        EvaluationRecord {
            age: self.age,
            confidence: self.confidence,
            subtests: self.subtests,
            composites: self.composites,
            observations,
        }
    }

    /// Composite values keyed by abbreviation, the shape chart rendering
    /// takes.
    pub fn composite_values(&self) -> BTreeMap<CompositeIndex, u8> {
        self.composites
            .iter()
            .map(|(index, result)| (*index, result.score.value))
            .collect()
    }
}

/// Score a full form. Subtests that fail conversion are reported in
/// `failures` and excluded from composite sums; an index is computed from
/// whichever of its members converted. The full-scale composite is computed
/// only when all 7 designated subtests are present.
pub fn score_profile(
    norms: &NormSet,
    age: Age,
    raw_scores: &BTreeMap<Subtest, u32>,
    confidence: ConfidenceLevel,
) -> ScoredProfile {
    let mut subtests = BTreeMap::new();
    let mut failures = Vec::new();

    for (&subtest, &raw) in raw_scores {
        match norms.scaled_score(age, subtest, raw) {
            Ok(scaled) => {
                subtests.insert(subtest, SubtestEntry { raw, scaled });
            }
            Err(err) => failures.push(ScoreFailure::new(subtest.code(), &err)),
        }
    }

    let scaled: BTreeMap<Subtest, u8> = subtests
        .iter()
        .map(|(&s, entry)| (s, entry.scaled))
        .collect();

    let mut composites = BTreeMap::new();
    for index in CompositeIndex::PRIMARY {
        let members: Vec<u8> = index
            .subtests()
            .iter()
            .filter_map(|s| scaled.get(s).copied())
            .collect();
        if members.is_empty() {
            continue;
        }
        let sum: u16 = members.iter().map(|&v| u16::from(v)).sum();
        match norms.composite(index, sum) {
            Ok(score) => {
                composites.insert(index, CompositeResult { sum, score });
            }
            Err(err) => failures.push(ScoreFailure::new(index.abbreviation(), &err)),
        }
    }

    // Full scale only when the form is complete for the 7 core subtests.
    match norms.fsiq_from_scores(&scaled) {
        Ok((sum, score)) => {
            composites.insert(CompositeIndex::Cit, CompositeResult { sum, score });
        }
        Err(NormError::IncompleteFsiq { .. }) => {}
        Err(err) => failures.push(ScoreFailure::new(CompositeIndex::Cit.abbreviation(), &err)),
    }

    ScoredProfile {
        age,
        confidence,
        subtests,
        composites,
        failures,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn age(s: &str) -> Age {
        s.parse().unwrap()
    }

    #[test]
    fn partial_forms_score_what_they_can() {
        let norms = NormSet::bundled();
        let mut raw = BTreeMap::new();
        raw.insert(Subtest::Cc, 25); // scaled 12
        raw.insert(Subtest::Bal, 23); // scaled 15

        let profile = score_profile(&norms, age("8:6"), &raw, ConfidenceLevel::NinetyFive);
        assert!(profile.failures.is_empty());
        assert_eq!(profile.subtests[&Subtest::Cc].scaled, 12);
        assert_eq!(profile.subtests[&Subtest::Bal].scaled, 15);

        // CC alone feeds IVE; BAL alone feeds IRF; CIT needs all 7.
        assert_eq!(profile.composites[&CompositeIndex::Ive].sum, 12);
        assert_eq!(profile.composites[&CompositeIndex::Irf].sum, 15);
        assert!(!profile.composites.contains_key(&CompositeIndex::Cit));
        assert!(!profile.composites.contains_key(&CompositeIndex::Icv));
    }

    #[test]
    fn failing_subtests_are_named_without_aborting_the_form() {
        let norms = NormSet::bundled();
        let mut raw = BTreeMap::new();
        raw.insert(Subtest::Cc, 25);
        raw.insert(Subtest::Bal, 18); // gap in the BAL column
        raw.insert(Subtest::Voc, 30); // no VOC column in the bundled band

        let profile = score_profile(&norms, age("8:6"), &raw, ConfidenceLevel::Ninety);
        assert_eq!(profile.subtests.len(), 1);
        assert_eq!(profile.failures.len(), 2);
        let contexts: Vec<&str> = profile.failures.iter().map(|f| f.context.as_str()).collect();
        assert!(contexts.contains(&"BAL"));
        assert!(contexts.contains(&"VOC"));
    }

    #[test]
    fn profile_converts_into_an_evaluation_record() {
        let norms = NormSet::bundled();
        let mut raw = BTreeMap::new();
        raw.insert(Subtest::Cc, 25);
        let profile = score_profile(&norms, age("8:6"), &raw, ConfidenceLevel::NinetyFive);
        let record = profile.into_record(Some("settled quickly".to_string()));
        assert_eq!(record.subtests[&Subtest::Cc].raw, 25);
        assert_eq!(record.observations.as_deref(), Some("settled quickly"));
    }
}

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::age::Age;
use crate::models::score::{CompositeResult, ConfidenceLevel, SubtestEntry};
use crate::subtest::{CompositeIndex, Subtest};

/// A stored testing session. Immutable once persisted: corrections are a
/// new evaluation, never an update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub administered_at: jiff::Timestamp,
    pub record: EvaluationRecord,
}

/// The structured payload of an evaluation: everything the form computed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub age: Age,
    #[serde(default)]
    pub confidence: ConfidenceLevel,
    pub subtests: BTreeMap<Subtest, SubtestEntry>,
    pub composites: BTreeMap<CompositeIndex, CompositeResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observations: Option<String>,
}

impl Evaluation {
    pub fn new(patient_id: Uuid, record: EvaluationRecord) -> Self {
        Evaluation {
            id: Uuid::new_v4(),
            patient_id,
            administered_at: jiff::Timestamp::now(),
            record,
        }
    }

    /// Composite value for an index, if this evaluation produced one.
    pub fn composite(&self, index: CompositeIndex) -> Option<u8> {
        self.record.composites.get(&index).map(|r| r.score.value)
    }
}

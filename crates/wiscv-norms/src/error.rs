use thiserror::Error;

use wiscv_core::{Age, CompositeIndex, Subtest};

use crate::age_band::AgeBand;

#[derive(Debug, Error)]
pub enum NormError {
    #[error("age {age} outside the supported range 6:0-16:11")]
    AgeOutOfRange { age: Age },

    #[error("no raw-score table loaded for age band {band}")]
    BandNotLoaded { band: AgeBand },

    #[error("subtest {subtest} has no column in the table for band {band}")]
    UnknownSubtest { subtest: Subtest, band: AgeBand },

    #[error("raw score {raw} outside all defined ranges for {subtest} in band {band}")]
    RawScoreOutOfRange {
        subtest: Subtest,
        raw: u32,
        band: AgeBand,
    },

    #[error("no conversion table for index {index}")]
    UnknownIndex { index: CompositeIndex },

    #[error("full-scale sum requires all 7 core subtests; missing: {}",
        missing.iter().map(|s| s.code()).collect::<Vec<_>>().join(", "))]
    IncompleteFsiq { missing: Vec<Subtest> },

    #[error("conversion table '{table}' is empty")]
    EmptyTable { table: String },

    #[error("invalid table '{table}': {reason}")]
    InvalidTable { table: String, reason: String },

    #[error("I/O error reading norm tables: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed norm table: {0}")]
    Parse(#[from] serde_json::Error),
}

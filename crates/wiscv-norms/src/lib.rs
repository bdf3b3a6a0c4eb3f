//! wiscv-norms
//!
//! The score-conversion core: normative lookup tables (typed, validated at
//! load) and the three converters: raw→scaled per age band, scaled-sum→
//! composite per index, and the 7-subtest sum→full-scale (CIT).
//!
//! There is no global table instance; callers construct a [`NormSet`] and
//! pass it where needed.

pub mod age_band;
mod convert;
pub mod error;
pub mod profile;
pub mod tables;

use std::collections::BTreeMap;
use std::path::Path;

use tracing::info;

use wiscv_core::models::CompositeScore;
use wiscv_core::subtest::FSIQ_SUBTESTS;
use wiscv_core::{Age, CompositeIndex, Subtest};

use crate::age_band::AgeBand;
use crate::error::NormError;
use crate::tables::{CompositeTable, CompositeTableFile, FsiqTable, RawScoreTable};

pub use convert::{COMPOSITE_MAX, COMPOSITE_MIN, HIGH_EXTRAPOLATION_DAMPING};
pub use profile::{ScoreFailure, ScoredProfile, score_profile};

const COMPOSITES_FILE: &str = "composites.json";
const FSIQ_FILE: &str = "cit.json";

const BUNDLED_RAW_8_6: &str = include_str!("../data/8_6-8_11.json");
const BUNDLED_COMPOSITES: &str = include_str!("../data/composites.json");
const BUNDLED_FSIQ: &str = include_str!("../data/cit.json");

/// The complete set of conversion tables used by one scoring session.
#[derive(Debug, Clone)]
pub struct NormSet {
    raw_tables: BTreeMap<AgeBand, RawScoreTable>,
    composites: BTreeMap<CompositeIndex, CompositeTable>,
    fsiq: FsiqTable,
}

impl NormSet {
    /// Load a table set from a directory: one `<band>.json` per age band
    /// (at least one required), `composites.json`, and `cit.json`. Every
    /// table is validated before the set is returned.
    pub fn load(dir: &Path) -> Result<Self, NormError> {
        let mut raw_tables = BTreeMap::new();
        for band in AgeBand::all() {
            let path = dir.join(format!("{}.json", band.file_stem()));
            if !path.exists() {
                continue;
            }
            let table: RawScoreTable = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
            if table.band != band {
                return Err(NormError::InvalidTable {
                    table: path.display().to_string(),
                    reason: format!("file is named {band} but declares band {}", table.band),
                });
            }
            table.validate()?;
            raw_tables.insert(band, table);
        }
        if raw_tables.is_empty() {
            return Err(NormError::InvalidTable {
                table: dir.display().to_string(),
                reason: "no age-band raw-score tables found".to_string(),
            });
        }

        let composites: CompositeTableFile =
            serde_json::from_str(&std::fs::read_to_string(dir.join(COMPOSITES_FILE))?)?;
        let fsiq: FsiqTable =
            serde_json::from_str(&std::fs::read_to_string(dir.join(FSIQ_FILE))?)?;

        let set = NormSet::assemble(raw_tables, composites.tables, fsiq)?;
        info!(
            dir = %dir.display(),
            bands = set.raw_tables.len(),
            indices = set.composites.len(),
            "norm tables loaded"
        );
        Ok(set)
    }

    /// The minimal built-in table set, used when no table directory is
    /// available. Covers one age band (8:6-8:11, CC and BAL) plus the five
    /// index tables and the full-scale table.
    ///
    /// # Panics
    ///
    /// Panics if the compiled-in assets are malformed; that is a build
    /// defect, not a runtime condition.
    pub fn bundled() -> Self {
        let raw: RawScoreTable =
            serde_json::from_str(BUNDLED_RAW_8_6).expect("bundled raw table is valid");
        let composites: CompositeTableFile =
            serde_json::from_str(BUNDLED_COMPOSITES).expect("bundled composites are valid");
        let fsiq: FsiqTable =
            serde_json::from_str(BUNDLED_FSIQ).expect("bundled full-scale table is valid");
        let mut raw_tables = BTreeMap::new();
        raw_tables.insert(raw.band, raw);
        NormSet::assemble(raw_tables, composites.tables, fsiq)
            .expect("bundled tables pass validation")
    }

    fn assemble(
        raw_tables: BTreeMap<AgeBand, RawScoreTable>,
        composites: BTreeMap<CompositeIndex, CompositeTable>,
        fsiq: FsiqTable,
    ) -> Result<Self, NormError> {
        for table in raw_tables.values() {
            table.validate()?;
        }
        for (index, table) in &composites {
            if *index == CompositeIndex::Cit {
                return Err(NormError::InvalidTable {
                    table: "composites".to_string(),
                    reason: "CIT belongs in the full-scale table, not the index tables"
                        .to_string(),
                });
            }
            tables::validate_sum_rows(index.abbreviation(), &table.rows)?;
        }
        tables::validate_sum_rows("CIT", &fsiq.rows)?;
        Ok(NormSet {
            raw_tables,
            composites,
            fsiq,
        })
    }

    /// Age bands with a loaded raw-score table.
    pub fn loaded_bands(&self) -> impl Iterator<Item = AgeBand> + '_ {
        self.raw_tables.keys().copied()
    }

    /// Raw→scaled conversion for one subtest. Exact band containment only,
    /// no interpolation between bands.
    pub fn scaled_score(&self, age: Age, subtest: Subtest, raw: u32) -> Result<u8, NormError> {
        let band = AgeBand::containing(age).ok_or(NormError::AgeOutOfRange { age })?;
        let table = self
            .raw_tables
            .get(&band)
            .ok_or(NormError::BandNotLoaded { band })?;
        if !table.has_column(subtest) {
            return Err(NormError::UnknownSubtest { subtest, band });
        }
        table
            .lookup(subtest, raw)
            .ok_or(NormError::RawScoreOutOfRange { subtest, raw, band })
    }

    /// Scaled-sum→composite conversion for one of the five index scales.
    pub fn composite(&self, index: CompositeIndex, sum: u16) -> Result<CompositeScore, NormError> {
        let table = self
            .composites
            .get(&index)
            .ok_or(NormError::UnknownIndex { index })?;
        Ok(convert::convert_composite(&table.rows, sum))
    }

    /// Full-scale (CIT) conversion from the 7-subtest scaled-score sum.
    pub fn fsiq(&self, sum: u16) -> Result<CompositeScore, NormError> {
        Ok(convert::convert_fsiq(&self.fsiq.rows, sum))
    }

    /// Sum the 7 designated subtests and convert. Errors if any is missing.
    pub fn fsiq_from_scores(
        &self,
        scaled: &BTreeMap<Subtest, u8>,
    ) -> Result<(u16, CompositeScore), NormError> {
        let missing: Vec<Subtest> = FSIQ_SUBTESTS
            .iter()
            .filter(|s| !scaled.contains_key(s))
            .copied()
            .collect();
        if !missing.is_empty() {
            return Err(NormError::IncompleteFsiq { missing });
        }
        let sum: u16 = FSIQ_SUBTESTS
            .iter()
            .map(|s| u16::from(scaled[s]))
            .sum();
        Ok((sum, self.fsiq(sum)?))
    }
}

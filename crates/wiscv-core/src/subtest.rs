//! WISC-V subtests and composite indices.
//!
//! Subtests produce scaled scores (mean 10, SD 3, range 1–19). Composite
//! indices are standard scores (mean 100, SD 15, range 40–160) derived from
//! sums of member subtest scaled scores.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The 15 WISC-V subtests, identified by their record-form codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Subtest {
    /// Block Design
    Cc,
    /// Similarities
    An,
    /// Matrix Reasoning
    Mr,
    /// Digit Span
    Rd,
    /// Coding
    Cla,
    /// Vocabulary
    Voc,
    /// Figure Weights
    Bal,
    /// Visual Puzzles
    Rv,
    /// Picture Span
    Ri,
    /// Symbol Search
    Bs,
    /// Information. Older record forms used the code `INF`
    #[serde(alias = "INF")]
    In,
    /// Letter-Number Sequencing
    Sln,
    /// Cancellation
    Can,
    /// Comprehension
    Com,
    /// Arithmetic
    Ari,
}

impl Subtest {
    pub const ALL: [Subtest; 15] = [
        Subtest::Cc,
        Subtest::An,
        Subtest::Mr,
        Subtest::Rd,
        Subtest::Cla,
        Subtest::Voc,
        Subtest::Bal,
        Subtest::Rv,
        Subtest::Ri,
        Subtest::Bs,
        Subtest::In,
        Subtest::Sln,
        Subtest::Can,
        Subtest::Com,
        Subtest::Ari,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Subtest::Cc => "CC",
            Subtest::An => "AN",
            Subtest::Mr => "MR",
            Subtest::Rd => "RD",
            Subtest::Cla => "CLA",
            Subtest::Voc => "VOC",
            Subtest::Bal => "BAL",
            Subtest::Rv => "RV",
            Subtest::Ri => "RI",
            Subtest::Bs => "BS",
            Subtest::In => "IN",
            Subtest::Sln => "SLN",
            Subtest::Can => "CAN",
            Subtest::Com => "COM",
            Subtest::Ari => "ARI",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Subtest::Cc => "Block Design",
            Subtest::An => "Similarities",
            Subtest::Mr => "Matrix Reasoning",
            Subtest::Rd => "Digit Span",
            Subtest::Cla => "Coding",
            Subtest::Voc => "Vocabulary",
            Subtest::Bal => "Figure Weights",
            Subtest::Rv => "Visual Puzzles",
            Subtest::Ri => "Picture Span",
            Subtest::Bs => "Symbol Search",
            Subtest::In => "Information",
            Subtest::Sln => "Letter-Number Sequencing",
            Subtest::Can => "Cancellation",
            Subtest::Com => "Comprehension",
            Subtest::Ari => "Arithmetic",
        }
    }
}

impl FromStr for Subtest {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // `INF` is a legacy alias for Information; some record forms use it.
        if s.eq_ignore_ascii_case("INF") {
            return Ok(Subtest::In);
        }
        Subtest::ALL
            .iter()
            .find(|t| t.code().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| CoreError::UnknownSubtest(s.to_string()))
    }
}

impl fmt::Display for Subtest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// The five primary indices plus the Full Scale composite (CIT).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CompositeIndex {
    Icv,
    Ive,
    Irf,
    Imt,
    Ivp,
    Cit,
}

/// The 7 subtests whose scaled-score sum yields the Full Scale composite.
pub const FSIQ_SUBTESTS: [Subtest; 7] = [
    Subtest::Cc,
    Subtest::An,
    Subtest::Mr,
    Subtest::Rd,
    Subtest::Cla,
    Subtest::Voc,
    Subtest::Bal,
];

impl CompositeIndex {
    pub const ALL: [CompositeIndex; 6] = [
        CompositeIndex::Icv,
        CompositeIndex::Ive,
        CompositeIndex::Irf,
        CompositeIndex::Imt,
        CompositeIndex::Ivp,
        CompositeIndex::Cit,
    ];

    /// The five index scales, excluding the Full Scale composite.
    pub const PRIMARY: [CompositeIndex; 5] = [
        CompositeIndex::Icv,
        CompositeIndex::Ive,
        CompositeIndex::Irf,
        CompositeIndex::Imt,
        CompositeIndex::Ivp,
    ];

    pub fn abbreviation(&self) -> &'static str {
        match self {
            CompositeIndex::Icv => "ICV",
            CompositeIndex::Ive => "IVE",
            CompositeIndex::Irf => "IRF",
            CompositeIndex::Imt => "IMT",
            CompositeIndex::Ivp => "IVP",
            CompositeIndex::Cit => "CIT",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CompositeIndex::Icv => "Verbal Comprehension",
            CompositeIndex::Ive => "Visual Spatial",
            CompositeIndex::Irf => "Fluid Reasoning",
            CompositeIndex::Imt => "Working Memory",
            CompositeIndex::Ivp => "Processing Speed",
            CompositeIndex::Cit => "Full Scale",
        }
    }

    /// Member subtests whose scaled scores sum into this composite.
    pub fn subtests(&self) -> &'static [Subtest] {
        match self {
            CompositeIndex::Icv => &[Subtest::An, Subtest::Voc],
            CompositeIndex::Ive => &[Subtest::Cc, Subtest::Rv],
            CompositeIndex::Irf => &[Subtest::Mr, Subtest::Bal],
            CompositeIndex::Imt => &[Subtest::Ri, Subtest::Rd],
            CompositeIndex::Ivp => &[Subtest::Cla, Subtest::Bs],
            CompositeIndex::Cit => &FSIQ_SUBTESTS,
        }
    }
}

impl FromStr for CompositeIndex {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CompositeIndex::ALL
            .iter()
            .find(|i| i.abbreviation().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| CoreError::UnknownIndex(s.to_string()))
    }
}

impl fmt::Display for CompositeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_information_alias_resolves() {
        assert_eq!("INF".parse::<Subtest>().unwrap(), Subtest::In);
        assert_eq!("IN".parse::<Subtest>().unwrap(), Subtest::In);
    }

    #[test]
    fn unknown_code_is_an_error() {
        assert!("XYZ".parse::<Subtest>().is_err());
    }

    #[test]
    fn fsiq_members_are_the_seven_core_subtests() {
        assert_eq!(CompositeIndex::Cit.subtests().len(), 7);
        for index in CompositeIndex::PRIMARY {
            assert_eq!(index.subtests().len(), 2);
        }
    }

    #[test]
    fn codes_round_trip_through_serde() {
        let json = serde_json::to_string(&Subtest::Cla).unwrap();
        assert_eq!(json, "\"CLA\"");
        let back: Subtest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Subtest::Cla);
        let legacy: Subtest = serde_json::from_str("\"INF\"").unwrap();
        assert_eq!(legacy, Subtest::In);
    }
}

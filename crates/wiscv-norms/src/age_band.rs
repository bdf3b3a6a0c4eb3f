//! The 22 fixed normative age bands.
//!
//! Each band spans six months; together they cover 6:0 through 16:11
//! (72..=203 total months) with no gaps and no overlap. Band membership is
//! the only age logic in score conversion; there is no interpolation
//! between bands.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use wiscv_core::Age;

/// Total months covered: ages 6:0 (72 months) through 16:11 (203 months).
pub const MIN_TOTAL_MONTHS: u16 = 72;
pub const MAX_TOTAL_MONTHS: u16 = 203;

const BAND_WIDTH_MONTHS: u16 = 6;
const BAND_COUNT: u8 = 22;

/// One of the 22 normative age bands, e.g. `8:6-8:11`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AgeBand(u8);

impl AgeBand {
    /// The band containing `age`, or `None` outside 6:0-16:11.
    pub fn containing(age: Age) -> Option<AgeBand> {
        let months = age.total_months();
        if !(MIN_TOTAL_MONTHS..=MAX_TOTAL_MONTHS).contains(&months) {
            return None;
        }
        Some(AgeBand(((months - MIN_TOTAL_MONTHS) / BAND_WIDTH_MONTHS) as u8))
    }

    pub fn all() -> impl Iterator<Item = AgeBand> {
        (0..BAND_COUNT).map(AgeBand)
    }

    pub fn index(&self) -> u8 {
        self.0
    }

    fn start_months(&self) -> u16 {
        MIN_TOTAL_MONTHS + u16::from(self.0) * BAND_WIDTH_MONTHS
    }

    fn bounds(&self) -> ((u16, u16), (u16, u16)) {
        let start = self.start_months();
        let end = start + BAND_WIDTH_MONTHS - 1;
        ((start / 12, start % 12), (end / 12, end % 12))
    }

    /// The band's label as printed on the normative tables, e.g. `8:6-8:11`.
    pub fn label(&self) -> String {
        let ((sy, sm), (ey, em)) = self.bounds();
        format!("{sy}:{sm}-{ey}:{em}")
    }

    /// Filesystem-safe form of the label, used for table file names.
    pub fn file_stem(&self) -> String {
        self.label().replace(':', "_")
    }
}

impl fmt::Display for AgeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl FromStr for AgeBand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.replace('_', ":");
        AgeBand::all()
            .find(|b| b.label() == normalized)
            .ok_or_else(|| format!("unknown age band '{s}'"))
    }
}

impl Serialize for AgeBand {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label())
    }
}

impl<'de> Deserialize<'de> for AgeBand {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn age(years: u8, months: u8) -> Age {
        Age::new(years, months).unwrap()
    }

    #[test]
    fn every_supported_month_resolves_to_exactly_one_band() {
        for months in MIN_TOTAL_MONTHS..=MAX_TOTAL_MONTHS {
            let a = age((months / 12) as u8, (months % 12) as u8);
            let band = AgeBand::containing(a).expect("month within supported range");
            let matches = AgeBand::all()
                .filter(|b| {
                    let start = b.start_months();
                    (start..start + BAND_WIDTH_MONTHS).contains(&months)
                })
                .count();
            assert_eq!(matches, 1, "month {months} matched {matches} bands");
            let start = band.start_months();
            assert!((start..start + BAND_WIDTH_MONTHS).contains(&months));
        }
    }

    #[test]
    fn ages_outside_the_range_do_not_resolve() {
        assert!(AgeBand::containing(age(5, 11)).is_none());
        assert!(AgeBand::containing(age(17, 0)).is_none());
    }

    #[test]
    fn labels_match_the_printed_tables() {
        assert_eq!(AgeBand::containing(age(6, 0)).unwrap().label(), "6:0-6:5");
        assert_eq!(AgeBand::containing(age(8, 6)).unwrap().label(), "8:6-8:11");
        assert_eq!(
            AgeBand::containing(age(16, 11)).unwrap().label(),
            "16:6-16:11"
        );
    }

    #[test]
    fn file_stems_round_trip() {
        for band in AgeBand::all() {
            assert_eq!(band.file_stem().parse::<AgeBand>().unwrap(), band);
            assert_eq!(band.label().parse::<AgeBand>().unwrap(), band);
        }
    }
}

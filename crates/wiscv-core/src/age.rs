//! Chronological age handling.
//!
//! Ages are expressed as whole years plus months (`"8:6"` = 8 years,
//! 6 months), the granularity of the normative tables.

use std::fmt;
use std::str::FromStr;

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Age {
    years: u8,
    months: u8,
}

impl Age {
    pub fn new(years: u8, months: u8) -> Result<Self, CoreError> {
        if months > 11 {
            return Err(CoreError::InvalidAge(format!("{years}:{months}")));
        }
        Ok(Age { years, months })
    }

    /// Chronological age at `on`, in whole years and months.
    pub fn at(birth_date: Date, on: Date) -> Result<Self, CoreError> {
        let span = birth_date
            .until((jiff::Unit::Year, on))
            .map_err(|e| CoreError::InvalidAge(e.to_string()))?;
        let years = span.get_years();
        let months = span.get_months();
        if years < 0 || months < 0 {
            return Err(CoreError::InvalidAge(format!(
                "birth date {birth_date} is after {on}"
            )));
        }
        Age::new(years as u8, months as u8)
    }

    pub fn years(&self) -> u8 {
        self.years
    }

    pub fn months(&self) -> u8 {
        self.months
    }

    pub fn total_months(&self) -> u16 {
        u16::from(self.years) * 12 + u16::from(self.months)
    }
}

impl FromStr for Age {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (years, months) = s
            .split_once(':')
            .ok_or_else(|| CoreError::InvalidAge(s.to_string()))?;
        let years: u8 = years
            .trim()
            .parse()
            .map_err(|_| CoreError::InvalidAge(s.to_string()))?;
        let months: u8 = months
            .trim()
            .parse()
            .map_err(|_| CoreError::InvalidAge(s.to_string()))?;
        Age::new(years, months)
    }
}

impl fmt::Display for Age {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.years, self.months)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;

    #[test]
    fn parses_years_and_months() {
        let age: Age = "8:6".parse().unwrap();
        assert_eq!(age.years(), 8);
        assert_eq!(age.months(), 6);
        assert_eq!(age.total_months(), 102);
    }

    #[test]
    fn rejects_malformed_input() {
        assert!("8".parse::<Age>().is_err());
        assert!("8:12".parse::<Age>().is_err());
        assert!("eight:two".parse::<Age>().is_err());
    }

    #[test]
    fn age_at_counts_whole_months() {
        let birth = date(2017, 3, 15);
        let age = Age::at(birth, date(2025, 9, 20)).unwrap();
        assert_eq!((age.years(), age.months()), (8, 6));

        // One day short of the month boundary does not round up.
        let age = Age::at(birth, date(2025, 9, 14)).unwrap();
        assert_eq!((age.years(), age.months()), (8, 5));
    }

    #[test]
    fn birth_after_reference_date_is_an_error() {
        assert!(Age::at(date(2030, 1, 1), date(2025, 1, 1)).is_err());
    }
}

//! Lookback period selection.

use chrono::{Datelike, Months, NaiveDate};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Period {
    Ytd,
    ThreeMonths,
    SixMonths,
    #[default]
    OneYear,
    TwoYears,
    Max,
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown period '{0}' (expected one of YTD, 3mo, 6mo, 1y, 2y, max)")]
pub struct ParsePeriodError(pub String);

impl Period {
    pub const ALL: [Period; 6] = [
        Period::Ytd,
        Period::ThreeMonths,
        Period::SixMonths,
        Period::OneYear,
        Period::TwoYears,
        Period::Max,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Ytd => "YTD",
            Period::ThreeMonths => "3mo",
            Period::SixMonths => "6mo",
            Period::OneYear => "1y",
            Period::TwoYears => "2y",
            Period::Max => "max",
        }
    }

    /// Inclusive lower bound of the window ending at `as_of`; `None` means unbounded.
    pub fn start_date(&self, as_of: NaiveDate) -> Option<NaiveDate> {
        match self {
            Period::Ytd => NaiveDate::from_ymd_opt(as_of.year(), 1, 1),
            Period::ThreeMonths => as_of.checked_sub_months(Months::new(3)),
            Period::SixMonths => as_of.checked_sub_months(Months::new(6)),
            Period::OneYear => as_of.checked_sub_months(Months::new(12)),
            Period::TwoYears => as_of.checked_sub_months(Months::new(24)),
            Period::Max => None,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = ParsePeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ytd" => Ok(Period::Ytd),
            "3mo" => Ok(Period::ThreeMonths),
            "6mo" => Ok(Period::SixMonths),
            "1y" => Ok(Period::OneYear),
            "2y" => Ok(Period::TwoYears),
            "max" => Ok(Period::Max),
            _ => Err(ParsePeriodError(s.to_string())),
        }
    }
}

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::BizPlanError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const MONTHS_PER_YEAR: u32 = 12;

/// First month of the planning horizon (November of the planning year).
const PLANNING_START_MONTH: u32 = 11;

// ---------------------------------------------------------------------------
// Month period
// ---------------------------------------------------------------------------

/// A calendar month, rendered as `YYYY-MM`.
///
/// Ordering follows `(year, month)`, which matches the lexicographic order of
/// the zero-padded string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthPeriod {
    year: i32,
    month: u32,
}

impl MonthPeriod {
    pub fn new(year: i32, month: u32) -> Result<Self, BizPlanError> {
        if !(1..=MONTHS_PER_YEAR).contains(&month) {
            return Err(BizPlanError::DateError(format!(
                "Month must be between 1 and 12, got {month}"
            )));
        }
        Ok(Self { year, month })
    }

    /// January of `year`.
    pub fn january(year: i32) -> Self {
        Self { year, month: 1 }
    }

    /// The month containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The following calendar month; December rolls over to January.
    pub fn succ(&self) -> Self {
        if self.month == MONTHS_PER_YEAR {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }
}

impl fmt::Display for MonthPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthPeriod {
    type Err = BizPlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| BizPlanError::DateError(format!("Expected YYYY-MM, got '{s}'")))?;
        let year: i32 = year
            .parse()
            .map_err(|_| BizPlanError::DateError(format!("Invalid year in '{s}'")))?;
        let month: u32 = month
            .parse()
            .map_err(|_| BizPlanError::DateError(format!("Invalid month in '{s}'")))?;
        MonthPeriod::new(year, month)
    }
}

impl TryFrom<String> for MonthPeriod {
    type Error = BizPlanError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthPeriod> for String {
    fn from(p: MonthPeriod) -> Self {
        p.to_string()
    }
}

// ---------------------------------------------------------------------------
// Month sequence
// ---------------------------------------------------------------------------

/// Lazy, finite run of consecutive months. Cloning restarts from the clone
/// point, so a fresh sequence can be replayed any number of times.
#[derive(Debug, Clone)]
pub struct MonthSeq {
    next: MonthPeriod,
    remaining: usize,
}

impl MonthSeq {
    pub fn new(start: MonthPeriod, count: usize) -> Self {
        Self {
            next: start,
            remaining: count,
        }
    }
}

impl Iterator for MonthSeq {
    type Item = MonthPeriod;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.next;
        self.next = current.succ();
        self.remaining -= 1;
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for MonthSeq {}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// `12 * years` months starting with the month after `today`. The count
/// saturates at `usize::MAX`; the sequence is lazy, so only consumed months
/// are generated.
pub fn months_after(today: NaiveDate, years: u32) -> MonthSeq {
    let start = MonthPeriod::containing(today).succ();
    MonthSeq::new(start, (years as usize).saturating_mul(MONTHS_PER_YEAR as usize))
}

/// Fixed planning horizon: November and December of `plan_year`, then every
/// month of the two following years.
pub fn planning_horizon(plan_year: i32) -> MonthSeq {
    let start = MonthPeriod {
        year: plan_year,
        month: PLANNING_START_MONTH,
    };
    let count = (MONTHS_PER_YEAR - PLANNING_START_MONTH + 1) + 2 * MONTHS_PER_YEAR;
    MonthSeq::new(start, count as usize)
}

/// Year key of a period string: everything before the first `-`, or the
/// whole string when there is none.
pub fn year_key(period: &str) -> &str {
    match period.split_once('-') {
        Some((year, _)) => year,
        None => period,
    }
}

/// Parsed year of a period string, if it starts with a number.
pub fn year_of(period: &str) -> Option<i32> {
    year_key(period).trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_months_after_starts_next_month() {
        let labels: Vec<String> = months_after(date(2025, 3, 15), 1)
            .map(|p| p.to_string())
            .collect();
        assert_eq!(labels.len(), 12);
        assert_eq!(labels[0], "2025-04");
        assert_eq!(labels[11], "2026-03");
    }

    #[test]
    fn test_month_rollover_increments_year() {
        let labels: Vec<String> = months_after(date(2025, 11, 30), 1)
            .map(|p| p.to_string())
            .collect();
        assert_eq!(labels[0], "2025-12");
        assert_eq!(labels[1], "2026-01");
    }

    #[test]
    fn test_december_reference_starts_in_january() {
        let first = months_after(date(2024, 12, 31), 2).next().unwrap();
        assert_eq!(first.to_string(), "2025-01");
    }

    #[test]
    fn test_sequence_is_restartable() {
        let seq = months_after(date(2025, 1, 1), 3);
        let a: Vec<MonthPeriod> = seq.clone().collect();
        let b: Vec<MonthPeriod> = seq.collect();
        assert_eq!(a, b);
        assert_eq!(a.len(), 36);
    }

    #[test]
    fn test_zero_years_is_empty() {
        assert_eq!(months_after(date(2025, 1, 1), 0).count(), 0);
    }

    #[test]
    fn test_planning_horizon_shape() {
        let labels: Vec<String> = planning_horizon(2025).map(|p| p.to_string()).collect();
        assert_eq!(labels.len(), 26);
        assert_eq!(labels[0], "2025-11");
        assert_eq!(labels[1], "2025-12");
        assert_eq!(labels[2], "2026-01");
        assert_eq!(labels[25], "2027-12");
    }

    #[test]
    fn test_labels_sort_chronologically() {
        let labels: Vec<String> = months_after(date(2025, 6, 1), 2)
            .map(|p| p.to_string())
            .collect();
        let mut sorted = labels.clone();
        sorted.sort();
        assert_eq!(labels, sorted);
    }

    #[test]
    fn test_parse_rejects_bad_month() {
        assert!("2025-13".parse::<MonthPeriod>().is_err());
        assert!("2025-00".parse::<MonthPeriod>().is_err());
        assert!("2025".parse::<MonthPeriod>().is_err());
        assert_eq!(
            "2025-07".parse::<MonthPeriod>().unwrap(),
            MonthPeriod::new(2025, 7).unwrap()
        );
    }

    #[test]
    fn test_year_key() {
        assert_eq!(year_key("2025-07"), "2025");
        assert_eq!(year_key("2025"), "2025");
        assert_eq!(year_of("2026-01"), Some(2026));
        assert_eq!(year_of(""), None);
    }

    #[test]
    fn test_months_after_huge_horizon_is_lazy() {
        let today = NaiveDate::from_ymd_opt(2025, 10, 19).unwrap();
        let mut seq = months_after(today, u32::MAX);
        assert_eq!(seq.len(), (u32::MAX as usize).saturating_mul(12));
        assert_eq!(seq.next().map(|p| p.to_string()), Some("2025-11".to_string()));
    }
}

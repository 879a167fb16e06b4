//! Date normalization onto a single numeric timeline.
//!
//! Feature dates come in several precisions (`1815`, `1815:06`,
//! `1815:06:09`, `present`, `44BC`). A range written with a coarse date is
//! taken to cover the whole implied span, so `1815` as an end date reaches
//! the last moment of 1815 and still overlaps a neighbor starting `1815:12`.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{CheckError, CheckResult};
use crate::models::Feature;

/// Timeline position used for the `present` sentinel
pub const PRESENT_YEAR: f64 = 2100.0;

const YEAR_END: f64 = 0.9999;
const BC_YEAR_END: f64 = 0.99999;
const MONTH_END_EPSILON: f64 = 1e-6;

static BC_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s*BC$").expect("static regex"));
static CALENDAR_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(-?\d+)(?::(\d{1,2})(?::(\d{1,2}))?)?$").expect("static regex")
});

/// A point on the continuous timeline, monotonic with chronological order
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct TimelineValue(pub f64);

impl TimelineValue {
    pub fn value(&self) -> f64 {
        self.0
    }
}

/// Normalize a date string. `is_start` selects the opening or closing edge
/// of the span a coarse date implies.
pub fn normalize(date: &str, is_start: bool) -> CheckResult<TimelineValue> {
    let date = date.trim();

    if date == "present" {
        return Ok(TimelineValue(PRESENT_YEAR));
    }

    if let Some(caps) = BC_DATE.captures(date) {
        let year: f64 = caps[1]
            .parse()
            .map_err(|_| CheckError::malformed_date(date))?;
        let value = if is_start { -year } else { -year + BC_YEAR_END };
        return Ok(TimelineValue(value));
    }

    let caps = CALENDAR_DATE
        .captures(date)
        .ok_or_else(|| CheckError::malformed_date(date))?;

    let year: f64 = caps[1]
        .parse()
        .map_err(|_| CheckError::malformed_date(date))?;
    let month = caps
        .get(2)
        .map(|m| parse_bounded(m.as_str(), 12, date))
        .transpose()?;
    let day = caps
        .get(3)
        .map(|d| parse_bounded(d.as_str(), 31, date))
        .transpose()?;

    let value = match (month, day) {
        (None, _) => {
            if is_start {
                year
            } else {
                year + YEAR_END
            }
        }
        (Some(month), None) => {
            if is_start {
                year + (month - 1.0) / 12.0
            } else {
                year + month / 12.0 - MONTH_END_EPSILON
            }
        }
        (Some(month), Some(day)) => year + (month - 1.0) / 12.0 + (day - 1.0) / 366.0,
    };

    Ok(TimelineValue(value))
}

fn parse_bounded(field: &str, max: u32, date: &str) -> CheckResult<f64> {
    match field.parse::<u32>() {
        Ok(n) if (1..=max).contains(&n) => Ok(f64::from(n)),
        _ => Err(CheckError::malformed_date(date)),
    }
}

/// Closed validity interval of a feature on the timeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeRange {
    pub start: TimelineValue,
    pub end: TimelineValue,
}

impl TimeRange {
    pub fn parse(start: &str, end: &str) -> CheckResult<Self> {
        Ok(Self {
            start: normalize(start, true)?,
            end: normalize(end, false)?,
        })
    }

    pub fn of_feature(feature: &Feature) -> CheckResult<Self> {
        Self::parse(&feature.start_date, &feature.end_date)
    }

    /// Ranges overlap unless one ends strictly before the other starts
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        !(self.end < other.start || other.end < self.start)
    }

    pub fn contains(&self, t: TimelineValue) -> bool {
        self.start <= t && t <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start(d: &str) -> f64 {
        normalize(d, true).unwrap().value()
    }

    fn end(d: &str) -> f64 {
        normalize(d, false).unwrap().value()
    }

    #[test]
    fn test_plain_years() {
        assert_eq!(start("1815"), 1815.0);
        assert!((end("1815") - 1815.9999).abs() < 1e-9);
        assert!(start("1700") <= start("1815"));
        assert!(start("1815") <= start("1815"));
    }

    #[test]
    fn test_present_is_after_any_historical_year() {
        assert_eq!(start("present"), 2100.0);
        assert_eq!(end("present"), 2100.0);
        assert!(start("present") > end("2024"));
        assert!(start("present") > end("1999"));
    }

    #[test]
    fn test_bc_years() {
        assert_eq!(start("100BC"), -100.0);
        assert!((end("100BC") - (-99.00001)).abs() < 1e-9);
        assert!(start("100BC") < start("44BC"));
        assert!(end("44BC") < start("1"));
    }

    #[test]
    fn test_year_month() {
        assert!((start("1815:06") - (1815.0 + 5.0 / 12.0)).abs() < 1e-9);
        let close = end("1815:06");
        assert!(close < 1815.0 + 6.0 / 12.0);
        assert!(close > start("1815:06:30"));
        assert!(end("1815:12") < start("1816"));
    }

    #[test]
    fn test_full_dates_are_edge_independent() {
        assert_eq!(start("1815:06:09"), end("1815:06:09"));
        let expected = 1815.0 + 5.0 / 12.0 + 8.0 / 366.0;
        assert!((start("1815:06:09") - expected).abs() < 1e-9);
    }

    #[test]
    fn test_malformed_dates() {
        for bad in ["", "soon", "1815:13", "1815:00", "1815:06:32", "18x5", "1815:6:1:1"] {
            assert!(
                matches!(normalize(bad, true), Err(CheckError::MalformedDate { .. })),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_range_overlap() {
        let napoleonic = TimeRange::parse("1805", "1815").unwrap();
        let vienna = TimeRange::parse("1815:06:09", "1866").unwrap();
        let german_empire = TimeRange::parse("1871", "1918").unwrap();

        assert!(napoleonic.overlaps(&vienna));
        assert!(vienna.overlaps(&napoleonic));
        assert!(!napoleonic.overlaps(&german_empire));
        assert!(!german_empire.overlaps(&vienna));

        let inner = TimeRange::parse("1810", "1811").unwrap();
        assert!(napoleonic.overlaps(&inner));
        assert!(inner.overlaps(&napoleonic));
    }

    #[test]
    fn test_coarse_end_overlaps_finer_start() {
        let a = TimeRange::parse("1800", "1815").unwrap();
        let b = TimeRange::parse("1815:12", "1820").unwrap();
        assert!(a.overlaps(&b));
    }
}

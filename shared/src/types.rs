//! Common types used across the platform

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Inclusive calendar date range for queries
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, &'static str> {
        if start > end {
            return Err("start_date must not be after end_date");
        }
        Ok(Self { start, end })
    }

    /// Parse two `YYYY-MM-DD` strings
    pub fn parse(start: &str, end: &str) -> Result<Self, &'static str> {
        let start = NaiveDate::parse_from_str(start.trim(), "%Y-%m-%d")
            .map_err(|_| "Dates must use the YYYY-MM-DD format")?;
        let end = NaiveDate::parse_from_str(end.trim(), "%Y-%m-%d")
            .map_err(|_| "Dates must use the YYYY-MM-DD format")?;
        Self::new(start, end)
    }

    /// Range covering a single day
    pub fn day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// Range covering the calendar month containing `date`
    pub fn month_of(date: NaiveDate) -> Self {
        use chrono::Datelike;

        let start = date.with_day(1).unwrap_or(date);
        let next_month = if start.month() == 12 {
            NaiveDate::from_ymd_opt(start.year() + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(start.year(), start.month() + 1, 1)
        };
        let end = next_month
            .and_then(|d| d.pred_opt())
            .unwrap_or(start);
        Self { start, end }
    }

    /// Half-open timestamp bounds `[start 00:00, end+1 00:00)`
    pub fn bounds(&self) -> (NaiveDateTime, NaiveDateTime) {
        let lower = self.start.and_time(NaiveTime::MIN);
        let upper = self
            .end
            .succ_opt()
            .unwrap_or(self.end)
            .and_time(NaiveTime::MIN);
        (lower, upper)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_valid_range() {
        let range = DateRange::parse("2025-01-05", "2025-01-20").unwrap();
        assert_eq!(range.start, date(2025, 1, 5));
        assert_eq!(range.end, date(2025, 1, 20));
    }

    #[test]
    fn test_parse_rejects_bad_format_and_order() {
        assert!(DateRange::parse("05/01/2025", "2025-01-20").is_err());
        assert!(DateRange::parse("2025-02-01", "2025-01-01").is_err());
    }

    #[test]
    fn test_month_of_december() {
        let range = DateRange::month_of(date(2024, 12, 17));
        assert_eq!(range.start, date(2024, 12, 1));
        assert_eq!(range.end, date(2024, 12, 31));
    }

    #[test]
    fn test_month_of_leap_february() {
        let range = DateRange::month_of(date(2024, 2, 10));
        assert_eq!(range.end, date(2024, 2, 29));
    }

    #[test]
    fn test_bounds_are_half_open_over_whole_days() {
        let (lower, upper) = DateRange::day(date(2025, 3, 9)).bounds();
        assert_eq!(lower, date(2025, 3, 9).and_hms_opt(0, 0, 0).unwrap());
        assert_eq!(upper, date(2025, 3, 10).and_hms_opt(0, 0, 0).unwrap());
    }
}

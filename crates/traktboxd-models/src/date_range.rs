use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Inclusive calendar-day bounds for a history lookup. Either side may be open.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// No bounds at all.
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Start after end. Trakt answers such a range with an empty list
    /// rather than an error.
    pub fn is_inverted(&self) -> bool {
        matches!((self.start, self.end), (Some(start), Some(end)) if start > end)
    }

    /// First instant of the start day, UTC.
    pub fn start_instant(&self) -> Option<DateTime<Utc>> {
        self.start
            .and_then(|d| NaiveTime::from_hms_opt(0, 0, 0).map(|t| d.and_time(t).and_utc()))
    }

    /// Last millisecond of the end day, UTC, so the end day is included.
    pub fn end_instant(&self) -> Option<DateTime<Utc>> {
        self.end.and_then(|d| {
            NaiveTime::from_hms_milli_opt(23, 59, 59, 999).map(|t| d.and_time(t).and_utc())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_inverted_range() {
        assert!(DateRange::new(Some(date(2021, 1, 2)), Some(date(2021, 1, 1))).is_inverted());
        assert!(!DateRange::new(Some(date(2021, 1, 1)), Some(date(2021, 1, 1))).is_inverted());
        assert!(!DateRange::new(Some(date(2021, 1, 2)), None).is_inverted());
        assert!(!DateRange::unbounded().is_inverted());
    }

    #[test]
    fn test_instants_cover_whole_days() {
        let range = DateRange::new(Some(date(2020, 1, 1)), Some(date(2020, 12, 31)));
        assert_eq!(
            range.start_instant().unwrap().to_rfc3339(),
            "2020-01-01T00:00:00+00:00"
        );
        assert_eq!(
            range.end_instant().unwrap().to_rfc3339(),
            "2020-12-31T23:59:59.999+00:00"
        );
        assert!(DateRange::unbounded().start_instant().is_none());
        assert!(DateRange::unbounded().end_instant().is_none());
    }
}

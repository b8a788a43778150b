use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// A start/end pair; `end` is missing while the interval is still open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Interval {
    pub start: NaiveDateTime,
    pub end: Option<NaiveDateTime>,
}

impl Interval {
    pub fn new(start: NaiveDateTime, end: Option<NaiveDateTime>) -> Self {
        Self { start, end }
    }

    /// Closed length in minutes; open or inverted intervals count as zero.
    pub fn minutes(&self) -> i64 {
        match self.end {
            Some(end) if end > self.start => (end - self.start).num_minutes(),
            _ => 0,
        }
    }

    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisitInterval {
    pub lead_id: String,
    pub interval: Interval,
}

/// One historical day as returned by the report endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceHistoryRecord {
    pub date: NaiveDate,
    pub login: Option<NaiveDateTime>,
    pub logout: Option<NaiveDateTime>,
    pub breaks: Vec<Interval>,
    pub visits: Vec<VisitInterval>,
}

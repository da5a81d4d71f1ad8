//! Closed-interval time range predicate over heterogeneous timestamp text.
//!
//! Bounds come from caller-supplied text in the calculator layouts; instants
//! under test may also arrive in the persisted-store representation
//! (`YYYY-MM-DD HH:MM:SS`, ISO `T`-separated, with optional fractional
//! seconds). Both normalize to [`NaiveDateTime`] before the
//! `start <= ts <= end` test.

use chrono::{NaiveDate, NaiveDateTime};
use ganzhi_calendar::parse_datetime;
use tracing::warn;

use crate::error::Error;

/// A parsed, closed time interval.
///
/// An open start defaults to day-start (00:00:00), an open end to day-end
/// widened componentwise (23 / 59 / 59), so a date-only end bound is
/// inclusive of the entire day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl TimeRange {
    /// Parse both bounds. A malformed bound is fatal to the call that owns
    /// the strings.
    pub fn parse(start_text: &str, end_text: &str) -> Result<Self, Error> {
        let start = parse_datetime(start_text)?.floor_instant();
        let end = parse_datetime(end_text)?.ceil_instant();
        Ok(Self { start, end })
    }

    /// Interval start.
    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// Interval end.
    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// Closed-interval membership for an already-parsed instant.
    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        self.start <= ts && ts <= self.end
    }

    /// Closed-interval membership for persisted timestamp text.
    ///
    /// Never raises: a malformed instant logs a warning and filters the row
    /// out, because this runs inside bulk scans where one bad row must not
    /// abort the batch.
    pub fn contains_text(&self, ts_text: &str) -> bool {
        match parse_store_timestamp(ts_text) {
            Some(ts) => self.contains(ts),
            None => {
                warn!(ts = ts_text, "unparseable persisted timestamp, row skipped");
                false
            }
        }
    }
}

/// Normalize a persisted-store timestamp to an instant.
///
/// Accepts ISO `T`-separated and space-separated date+time (with optional
/// fractional seconds), plus every calculator layout (missing time-of-day
/// floors to 00:00:00). Returns `None` when nothing matches.
pub fn parse_store_timestamp(text: &str) -> Option<NaiveDateTime> {
    let trimmed = text.trim();
    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y/%m/%d %H:%M:%S%.f",
    ] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(ts);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?);
    }
    parse_datetime(trimmed).ok().map(|p| p.floor_instant())
}

/// One-shot form of the predicate: parse bounds and test the instant.
///
/// Returns `false` instead of raising on any malformed input, matching the
/// bulk-scan contract. Callers that own the bound strings should prefer
/// [`TimeRange::parse`] so bound errors surface once.
pub fn in_range(ts_text: &str, start_text: &str, end_text: &str) -> bool {
    match TimeRange::parse(start_text, end_text) {
        Ok(range) => range.contains_text(ts_text),
        Err(err) => {
            warn!(
                start = start_text,
                end = end_text,
                %err,
                "unparseable range bound, row treated as out of range"
            );
            false
        }
    }
}

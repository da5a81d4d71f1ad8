//! Domain models: bars, series identity, and the gan-zhi cache entries.

use chrono::NaiveDateTime;
use ganzhi_calendar::parse_datetime;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// One observed OHLCV data point. Immutable once read.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Kbar {
    /// Bar instant (exchange-local, full date+time resolution).
    pub ts: NaiveDateTime,
    /// Opening price.
    pub open: f64,
    /// Highest price during the bar interval.
    pub high: f64,
    /// Lowest price during the bar interval.
    pub low: f64,
    /// Closing price.
    pub close: f64,
    /// Volume traded during the bar interval.
    pub volume: f64,
    /// Trade value during the bar interval.
    pub amount: f64,
}

/// Identity of one time series: (symbol, exchange, period).
///
/// Equality and hashing are structural; this is the primary grouping key for
/// persisted rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KbarSeriesKey {
    /// Exchange-qualified instrument code, e.g. `000001.SZ`.
    pub symbol: String,
    /// Venue code, e.g. `SZSE`.
    pub exchange: String,
    /// Bar interval label, e.g. `1d` or `1h`.
    pub period: String,
}

impl KbarSeriesKey {
    /// Build a key from its three parts.
    pub fn new(
        symbol: impl Into<String>,
        exchange: impl Into<String>,
        period: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            exchange: exchange.into(),
            period: period.into(),
        }
    }
}

impl std::fmt::Display for KbarSeriesKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}-{}", self.symbol, self.exchange, self.period)
    }
}

/// An ordered sequence of bars sharing one key.
///
/// Ordering is by instant ascending; duplicate instants are the caller's
/// responsibility to avoid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KbarSeries {
    /// Series identity.
    pub key: KbarSeriesKey,
    /// The bars, ascending by `ts`.
    pub bars: Vec<Kbar>,
}

impl KbarSeries {
    /// A series from an already-built bar list.
    pub fn new(key: KbarSeriesKey, bars: Vec<Kbar>) -> Self {
        Self { key, bars }
    }

    /// Build a series from the keyed 7-tuple input shape:
    /// `(ts_text, open, high, low, close, volume, amount)`.
    ///
    /// Timestamp texts must match one of the accepted layouts; missing
    /// time-of-day components floor to zero. The first bad timestamp fails
    /// the whole conversion, before any I/O happens downstream.
    pub fn from_tuples(
        key: KbarSeriesKey,
        rows: &[(String, f64, f64, f64, f64, f64, f64)],
    ) -> Result<Self, Error> {
        let mut bars = Vec::with_capacity(rows.len());
        for (ts_text, open, high, low, close, volume, amount) in rows {
            let ts = parse_datetime(ts_text)?.floor_instant();
            bars.push(Kbar {
                ts,
                open: *open,
                high: *high,
                low: *low,
                close: *close,
                volume: *volume,
                amount: *amount,
            });
        }
        Ok(Self { key, bars })
    }
}

/// One series key paired with its composite label strings, one per retained
/// bar, each formatted as `year-month-day-hour`. The externally visible
/// cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KbarSeriesGanZhi {
    /// Series identity.
    pub key: KbarSeriesKey,
    /// Composite label strings, aligned with the row sequence.
    pub labels: Vec<String>,
}

impl KbarSeriesGanZhi {
    /// A cache entry from a key and its label strings.
    pub fn new(key: KbarSeriesKey, labels: Vec<String>) -> Self {
        Self { key, labels }
    }
}

/// Cache entries for every distinct series key a query encountered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KbarSeriesGanZhiList {
    /// One entry per series key with at least one labeled in-range row.
    pub series: Vec<KbarSeriesGanZhi>,
}

impl KbarSeriesGanZhiList {
    /// An empty list (the "store holds nothing" result, not an error).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of series in the list.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Whether the list carries no series at all.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// The three accepted series-input shapes, resolved once at the call
/// boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesInput {
    /// No series given: scan every persisted series.
    Absent,
    /// An identifying triple: look up persisted rows for that key.
    Key(KbarSeriesKey),
    /// A value-bearing series: compute in memory and upsert missing rows.
    Series(KbarSeries),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_equality_is_structural() {
        let a = KbarSeriesKey::new("000001.SZ", "SZSE", "1d");
        let b = KbarSeriesKey::new("000001.SZ", "SZSE", "1d");
        assert_eq!(a, b);

        let mut set = std::collections::HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn from_tuples_parses_and_floors_timestamps() {
        let key = KbarSeriesKey::new("000001.SZ", "SZSE", "1d");
        let rows = vec![(
            "2023/10/10".to_string(),
            10.0,
            11.0,
            9.5,
            10.5,
            1_000.0,
            10_500.0,
        )];
        let series = KbarSeries::from_tuples(key, &rows).unwrap();
        assert_eq!(series.bars.len(), 1);
        assert_eq!(series.bars[0].ts.to_string(), "2023-10-10 00:00:00");
    }

    #[test]
    fn cache_entries_serialize_with_their_key() {
        let entry = KbarSeriesGanZhi::new(
            KbarSeriesKey::new("000001.SZ", "SZSE", "1d"),
            vec!["癸卯-壬戌-辛丑-乙未".to_string()],
        );
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["key"]["symbol"], "000001.SZ");
        assert_eq!(json["labels"][0], "癸卯-壬戌-辛丑-乙未");

        let back: KbarSeriesGanZhi = serde_json::from_value(json).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn from_tuples_rejects_bad_timestamps() {
        let key = KbarSeriesKey::new("000001.SZ", "SZSE", "1d");
        let rows = vec![("not-a-date".to_string(), 0.0, 0.0, 0.0, 0.0, 0.0, 0.0)];
        match KbarSeries::from_tuples(key, &rows) {
            Err(Error::Parse { .. }) => {}
            other => panic!("expected Parse error, got {other:?}"),
        }
    }
}

//! Row structs and queries over the `kbar_data` table.
//!
//! Transactions are owned by the caller: the orchestrator stages a whole
//! batch and commits it in one scope, so these functions only compose
//! queries.

use std::collections::HashSet;

use diesel::prelude::*;
use ganzhi_calendar::DateTimeGanZhi;

use crate::models::{Kbar, KbarSeriesKey};
use crate::schema::kbar_data;
use crate::schema::kbar_data::dsl as kd;

/// One persisted bar with its eight nullable stem-branch columns.
#[derive(Debug, Clone, Queryable)]
pub struct KbarRow {
    /// Rowid.
    pub id: Option<i32>,
    /// Instrument code.
    pub symbol: String,
    /// Venue code.
    pub exchange: String,
    /// Bar interval label.
    pub period: String,
    /// Persisted instant text.
    pub ts: String,
    /// Opening price.
    pub open: f64,
    /// Highest price.
    pub high: f64,
    /// Lowest price.
    pub low: f64,
    /// Closing price.
    pub close: f64,
    /// Volume traded.
    pub volume: f64,
    /// Trade value.
    pub amount: f64,
    /// Year stem.
    pub year_gan: Option<String>,
    /// Year branch.
    pub year_zhi: Option<String>,
    /// Month stem.
    pub month_gan: Option<String>,
    /// Month branch.
    pub month_zhi: Option<String>,
    /// Day stem.
    pub day_gan: Option<String>,
    /// Day branch.
    pub day_zhi: Option<String>,
    /// Hour stem.
    pub hour_gan: Option<String>,
    /// Hour branch.
    pub hour_zhi: Option<String>,
}

impl KbarRow {
    /// The series key this row belongs to.
    pub fn key(&self) -> KbarSeriesKey {
        KbarSeriesKey::new(
            self.symbol.clone(),
            self.exchange.clone(),
            self.period.clone(),
        )
    }

    fn label_columns(&self) -> [&Option<String>; 8] {
        [
            &self.year_gan,
            &self.year_zhi,
            &self.month_gan,
            &self.month_zhi,
            &self.day_gan,
            &self.day_zhi,
            &self.hour_gan,
            &self.hour_zhi,
        ]
    }

    /// True when any stem-branch column still needs computation.
    ///
    /// NULL and the empty string both count as missing; under the
    /// all-or-nothing fill rule the two are interchangeable.
    pub fn labels_missing(&self) -> bool {
        self.label_columns()
            .iter()
            .any(|col| col.as_deref().is_none_or(str::is_empty))
    }

    /// True when the row carries labels; a non-empty year stem is the
    /// "has labels" sentinel.
    pub fn labels_present(&self) -> bool {
        self.year_gan.as_deref().is_some_and(|g| !g.is_empty())
    }

    /// Composite label string `year-month-day-hour`; missing sub-labels
    /// render as the empty string.
    pub fn composite(&self) -> String {
        let part = |g: &Option<String>, z: &Option<String>| {
            format!("{}{}", g.as_deref().unwrap_or(""), z.as_deref().unwrap_or(""))
        };
        format!(
            "{}-{}-{}-{}",
            part(&self.year_gan, &self.year_zhi),
            part(&self.month_gan, &self.month_zhi),
            part(&self.day_gan, &self.day_zhi),
            part(&self.hour_gan, &self.hour_zhi),
        )
    }
}

/// A staged insert: one bar plus its derived label columns.
#[derive(Debug, Insertable)]
#[diesel(table_name = kbar_data)]
pub struct NewKbarRow {
    pub(crate) symbol: String,
    pub(crate) exchange: String,
    pub(crate) period: String,
    pub(crate) ts: String,
    pub(crate) open: f64,
    pub(crate) high: f64,
    pub(crate) low: f64,
    pub(crate) close: f64,
    pub(crate) volume: f64,
    pub(crate) amount: f64,
    pub(crate) year_gan: String,
    pub(crate) year_zhi: String,
    pub(crate) month_gan: String,
    pub(crate) month_zhi: String,
    pub(crate) day_gan: String,
    pub(crate) day_zhi: String,
    pub(crate) hour_gan: String,
    pub(crate) hour_zhi: String,
}

impl NewKbarRow {
    /// Stage a bar for insertion with all eight label columns populated
    /// (an absent hour still writes empty strings, keeping the
    /// all-or-nothing shape).
    pub fn from_bar(key: &KbarSeriesKey, bar: &Kbar, ts: String, gz: &DateTimeGanZhi) -> Self {
        let (hour_gan, hour_zhi) = match gz.hour {
            Some(h) => (h.gan_symbol().to_string(), h.zhi_symbol().to_string()),
            None => (String::new(), String::new()),
        };
        Self {
            symbol: key.symbol.clone(),
            exchange: key.exchange.clone(),
            period: key.period.clone(),
            ts,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
            amount: bar.amount,
            year_gan: gz.year.gan_symbol().to_string(),
            year_zhi: gz.year.zhi_symbol().to_string(),
            month_gan: gz.month.gan_symbol().to_string(),
            month_zhi: gz.month.zhi_symbol().to_string(),
            day_gan: gz.day.gan_symbol().to_string(),
            day_zhi: gz.day.zhi_symbol().to_string(),
            hour_gan,
            hour_zhi,
        }
    }
}

/// Every persisted row, ordered by series key then instant.
pub fn load_all(conn: &mut SqliteConnection) -> QueryResult<Vec<KbarRow>> {
    kd::kbar_data
        .order((kd::symbol, kd::exchange, kd::period, kd::ts))
        .load::<KbarRow>(conn)
}

/// All rows for one series key, ordered by instant.
pub fn load_by_key(conn: &mut SqliteConnection, key: &KbarSeriesKey) -> QueryResult<Vec<KbarRow>> {
    kd::kbar_data
        .filter(
            kd::symbol
                .eq(&key.symbol)
                .and(kd::exchange.eq(&key.exchange))
                .and(kd::period.eq(&key.period)),
        )
        .order(kd::ts)
        .load::<KbarRow>(conn)
}

/// Persisted instants for one series key, fetched in a single query so the
/// compute-and-upsert path never probes existence row by row.
pub fn existing_instants(
    conn: &mut SqliteConnection,
    key: &KbarSeriesKey,
) -> QueryResult<HashSet<String>> {
    let instants: Vec<String> = kd::kbar_data
        .filter(
            kd::symbol
                .eq(&key.symbol)
                .and(kd::exchange.eq(&key.exchange))
                .and(kd::period.eq(&key.period)),
        )
        .select(kd::ts)
        .load(conn)?;
    Ok(instants.into_iter().collect())
}

/// Overwrite all eight stem-branch columns of one row.
///
/// Idempotent: the labels are a pure function of the instant, so refilling
/// writes the same values.
pub fn fill_labels(
    conn: &mut SqliteConnection,
    row_id: Option<i32>,
    gz: &DateTimeGanZhi,
) -> QueryResult<usize> {
    let (hour_gan, hour_zhi) = match gz.hour {
        Some(h) => (h.gan_symbol(), h.zhi_symbol()),
        None => ("", ""),
    };
    diesel::update(kd::kbar_data.filter(kd::id.eq(row_id)))
        .set((
            kd::year_gan.eq(gz.year.gan_symbol()),
            kd::year_zhi.eq(gz.year.zhi_symbol()),
            kd::month_gan.eq(gz.month.gan_symbol()),
            kd::month_zhi.eq(gz.month.zhi_symbol()),
            kd::day_gan.eq(gz.day.gan_symbol()),
            kd::day_zhi.eq(gz.day.zhi_symbol()),
            kd::hour_gan.eq(hour_gan),
            kd::hour_zhi.eq(hour_zhi),
        ))
        .execute(conn)
}

/// Bulk-insert staged rows. Callers wrap this in their batch transaction.
pub fn insert_rows(conn: &mut SqliteConnection, rows: &[NewKbarRow]) -> QueryResult<usize> {
    diesel::insert_into(kbar_data::table)
        .values(rows)
        .execute(conn)
}

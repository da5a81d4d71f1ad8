//! The cache-aside orchestrator for kbar gan-zhi series.
//!
//! One entry point, three strategies selected by input shape:
//! - no series given: scan every persisted row, fill missing labels, return
//!   one cache entry per series key;
//! - a series key with `use_cache = true`: fetch that key's rows, fill
//!   missing labels, return one cache entry;
//! - a value-bearing series with `use_cache = false`: compute labels in
//!   memory and insert rows the store does not have yet.
//!
//! Fills and inserts are staged per call and committed in a single
//! transaction. Per-row failures inside a batch are isolated into the
//! [`FillReport`] rather than aborting the batch; a mid-batch crash leaves
//! some rows filled and others not, which is acceptable because fills are
//! idempotent and resume on the next call.

use std::collections::HashSet;

use chrono::{NaiveDateTime, Timelike};
use diesel::prelude::*;
use ganzhi_calendar::{DateTimeGanZhi, datetime_ganzhi};
use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::config::StoreConfig;
use crate::db::connection::connect_sqlite;
use crate::error::Error;
use crate::models::{
    KbarSeries, KbarSeriesGanZhi, KbarSeriesGanZhiList, KbarSeriesKey, SeriesInput,
};
use crate::range::{TimeRange, parse_store_timestamp};
use crate::repo::{self, KbarRow, NewKbarRow};

/// Label string recorded for a bar whose label computation failed on the
/// compute-and-upsert path (the series keeps its length instead of dropping
/// the bar).
pub const LABEL_COMPUTE_FAILED: &str = "computation-failed";

/// Timestamp form handed to the calculator when converting persisted or
/// in-memory instants.
const CALC_TS_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Timestamp form written to the store.
const STORE_TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Result shape of [`GanZhiCache::resolve`]: one cache entry for keyed
/// queries, a list for store-wide scans.
#[derive(Debug, Clone, PartialEq)]
pub enum GanZhiResolution {
    /// One series (key-lookup and compute-and-upsert strategies).
    Single(KbarSeriesGanZhi),
    /// One entry per encountered series key (scan-all strategy).
    Many(KbarSeriesGanZhiList),
}

/// One isolated per-row failure inside a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFailure {
    /// Persisted or formatted instant text of the failed row.
    pub ts: String,
    /// Why the labels could not be computed.
    pub reason: String,
}

/// Diagnostics for one orchestrator call.
///
/// Lets callers distinguish "empty because nothing matched" from "empty
/// because everything failed"; not part of the result value contract.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FillReport {
    /// Rows/bars whose labels this call tried to compute.
    pub attempted: usize,
    /// Successful label computations.
    pub succeeded: usize,
    /// New rows inserted by the compute-and-upsert strategy.
    pub inserted: usize,
    /// Per-row failures, skipped rather than fatal.
    pub failures: Vec<RowFailure>,
}

impl FillReport {
    fn record_failure(&mut self, ts: &str, reason: String) {
        self.failures.push(RowFailure {
            ts: ts.to_string(),
            reason,
        });
    }

    /// Emit the report through `tracing`: one warning per failed row, one
    /// summary line per call.
    pub fn log(&self) {
        for failure in &self.failures {
            warn!(ts = %failure.ts, reason = %failure.reason, "stem-branch fill skipped a row");
        }
        info!(
            attempted = self.attempted,
            succeeded = self.succeeded,
            inserted = self.inserted,
            failed = self.failures.len(),
            "gan-zhi resolve finished"
        );
    }
}

/// The cache-aside orchestrator. Holds the explicit store configuration;
/// each call opens and closes its own connection.
#[derive(Debug, Clone)]
pub struct GanZhiCache {
    config: StoreConfig,
}

impl GanZhiCache {
    /// An orchestrator over the given store.
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    /// The configuration this orchestrator was built with.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Resolve gan-zhi series for the query range, logging the batch report.
    ///
    /// See [`Self::resolve_with_report`] for the full contract.
    pub fn resolve(
        &self,
        start_text: &str,
        end_text: &str,
        input: SeriesInput,
        use_cache: bool,
    ) -> Result<GanZhiResolution, Error> {
        let (resolution, report) = self.resolve_with_report(start_text, end_text, input, use_cache)?;
        report.log();
        Ok(resolution)
    }

    /// Resolve gan-zhi series and return the per-call diagnostics.
    ///
    /// Precondition order: the store check runs first and unconditionally
    /// (a misconfigured store fails before the input shape is inspected),
    /// then the input shape is validated, then the range bounds are parsed.
    /// Only after all three does any store I/O happen.
    pub fn resolve_with_report(
        &self,
        start_text: &str,
        end_text: &str,
        input: SeriesInput,
        use_cache: bool,
    ) -> Result<(GanZhiResolution, FillReport), Error> {
        self.config.ensure_reachable()?;

        match (&input, use_cache) {
            (SeriesInput::Key(_), false) => {
                return Err(Error::InvalidInput(
                    "a bare series key requires use_cache = true".to_string(),
                ));
            }
            (SeriesInput::Series(_), true) => {
                return Err(Error::InvalidInput(
                    "a value-bearing series requires use_cache = false".to_string(),
                ));
            }
            _ => {}
        }

        let range = TimeRange::parse(start_text, end_text)?;
        let mut conn = connect_sqlite(&self.config.database_url())?;

        match input {
            SeriesInput::Absent => {
                let (list, report) = scan_all(&mut conn, range)?;
                Ok((GanZhiResolution::Many(list), report))
            }
            SeriesInput::Key(key) => {
                let (series, report) = key_lookup(&mut conn, range, key)?;
                Ok((GanZhiResolution::Single(series), report))
            }
            SeriesInput::Series(series) => {
                let (series, report) = compute_upsert(&mut conn, range, series)?;
                Ok((GanZhiResolution::Single(series), report))
            }
        }
    }
}

/// Labels for a persisted instant: normalize the stored text to the
/// calculator's layout, then compute.
fn labels_for_store_ts(ts_text: &str) -> Result<DateTimeGanZhi, String> {
    let instant = parse_store_timestamp(ts_text)
        .ok_or_else(|| format!("unparseable persisted timestamp {ts_text:?}"))?;
    datetime_ganzhi(&instant.format(CALC_TS_FORMAT).to_string()).map_err(|e| e.to_string())
}

/// Compute labels for every staged row and commit the fills in one
/// transaction. Per-row failures are recorded and skipped.
fn fill_missing<'a>(
    conn: &mut SqliteConnection,
    rows: impl Iterator<Item = &'a KbarRow>,
    report: &mut FillReport,
) -> Result<(), Error> {
    let mut staged: Vec<(Option<i32>, DateTimeGanZhi)> = Vec::new();
    for row in rows {
        report.attempted += 1;
        match labels_for_store_ts(&row.ts) {
            Ok(gz) => {
                staged.push((row.id, gz));
                report.succeeded += 1;
            }
            Err(reason) => report.record_failure(&row.ts, reason),
        }
    }
    if staged.is_empty() {
        return Ok(());
    }

    conn.transaction::<_, diesel::result::Error, _>(|conn| {
        for (row_id, gz) in &staged {
            repo::fill_labels(conn, *row_id, gz)?;
        }
        Ok(())
    })?;
    info!(filled = staged.len(), "persisted stem-branch columns");
    Ok(())
}

/// Scan-all strategy: fill every in-range row with missing labels, then
/// assemble one cache entry per series key from labeled, in-range rows.
fn scan_all(
    conn: &mut SqliteConnection,
    range: TimeRange,
) -> Result<(KbarSeriesGanZhiList, FillReport), Error> {
    let mut report = FillReport::default();

    let rows = repo::load_all(conn)?;
    if rows.is_empty() {
        debug!("store holds no kbar rows");
        return Ok((KbarSeriesGanZhiList::empty(), report));
    }

    fill_missing(
        conn,
        rows.iter()
            .filter(|r| range.contains_text(&r.ts) && r.labels_missing()),
        &mut report,
    )?;

    let rows = repo::load_all(conn)?;
    let mut grouped: IndexMap<KbarSeriesKey, Vec<String>> = IndexMap::new();
    for row in &rows {
        if range.contains_text(&row.ts) && row.labels_present() {
            grouped.entry(row.key()).or_default().push(row.composite());
        }
    }

    let series = grouped
        .into_iter()
        .map(|(key, labels)| KbarSeriesGanZhi::new(key, labels))
        .collect();
    Ok((KbarSeriesGanZhiList { series }, report))
}

/// Key-lookup strategy: fetch rows for one key, fill in-range rows with
/// missing labels, and return the composite strings of the in-range rows.
fn key_lookup(
    conn: &mut SqliteConnection,
    range: TimeRange,
    key: KbarSeriesKey,
) -> Result<(KbarSeriesGanZhi, FillReport), Error> {
    let mut report = FillReport::default();

    let rows = repo::load_by_key(conn, &key)?;
    if rows.is_empty() {
        debug!(%key, "no persisted rows for series key");
        return Ok((KbarSeriesGanZhi::new(key, Vec::new()), report));
    }

    fill_missing(
        conn,
        rows.iter()
            .filter(|r| range.contains_text(&r.ts) && r.labels_missing()),
        &mut report,
    )?;

    // Rows whose fill failed keep their slot: their composite renders with
    // empty components, keeping the sequence aligned with the row sequence.
    let rows = repo::load_by_key(conn, &key)?;
    let labels = rows
        .iter()
        .filter(|r| range.contains_text(&r.ts))
        .map(KbarRow::composite)
        .collect();
    Ok((KbarSeriesGanZhi::new(key, labels), report))
}

/// Compute-and-upsert strategy: label every in-range bar in memory, stage
/// rows the store lacks, and insert them in one transaction. Existence is
/// decided on normalized instants (one batched query up front), so a row
/// persisted in another accepted timestamp form still counts as present.
fn compute_upsert(
    conn: &mut SqliteConnection,
    range: TimeRange,
    series: KbarSeries,
) -> Result<(KbarSeriesGanZhi, FillReport), Error> {
    let mut report = FillReport::default();

    let existing: HashSet<NaiveDateTime> = repo::existing_instants(conn, &series.key)?
        .iter()
        .filter_map(|ts| parse_store_timestamp(ts))
        .collect();
    let mut labels = Vec::new();
    let mut staged: Vec<NewKbarRow> = Vec::new();

    for bar in series.bars.iter().filter(|b| range.contains(b.ts)) {
        report.attempted += 1;
        let calc_text = bar.ts.format(CALC_TS_FORMAT).to_string();
        match datetime_ganzhi(&calc_text) {
            Ok(gz) => {
                report.succeeded += 1;
                labels.push(gz.composite());
                // stored instants have second precision
                let instant = bar.ts.with_nanosecond(0).unwrap_or(bar.ts);
                if !existing.contains(&instant) {
                    let ts_text = instant.format(STORE_TS_FORMAT).to_string();
                    staged.push(NewKbarRow::from_bar(&series.key, bar, ts_text, &gz));
                }
            }
            Err(err) => {
                labels.push(LABEL_COMPUTE_FAILED.to_string());
                report.record_failure(&calc_text, err.to_string());
            }
        }
    }

    if !staged.is_empty() {
        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            repo::insert_rows(conn, &staged)?;
            Ok(())
        })?;
        report.inserted = staged.len();
        info!(inserted = staged.len(), key = %series.key, "inserted labeled kbar rows");
    }

    Ok((KbarSeriesGanZhi::new(series.key, labels), report))
}

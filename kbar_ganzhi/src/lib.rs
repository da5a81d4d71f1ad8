//! Cache-aside gan-zhi layer over a single-file kbar store.
//!
//! The crate pairs the pure [`ganzhi_calendar`] calculator with a
//! Diesel/SQLite store so that stem-branch labels for time-series bars are
//! computed once and reused. The entry point is [`series::GanZhiCache`];
//! [`stock_meta::listing_date_ganzhi`] provides the per-symbol listing-date
//! convenience lookup.
//!
//! Concurrency model: single-threaded, blocking I/O. Each call opens its own
//! connection, batches its mutations, and commits them together.

#![deny(missing_docs)]

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod range;
pub mod repo;
pub mod schema;
pub mod series;
pub mod stock_meta;

pub use config::StoreConfig;
pub use error::Error;
pub use models::{
    Kbar, KbarSeries, KbarSeriesGanZhi, KbarSeriesGanZhiList, KbarSeriesKey, SeriesInput,
};
pub use range::{TimeRange, in_range};
pub use series::{FillReport, GanZhiCache, GanZhiResolution, LABEL_COMPUTE_FAILED};

//! The unified error type for the `kbar_ganzhi` crate.

use std::path::PathBuf;

use ganzhi_calendar::CalendarError;
use thiserror::Error;

/// Errors surfaced by the store-facing layer.
///
/// Single-item operations propagate these to the caller. Batch fills isolate
/// per-row parse/date failures into a [`crate::series::FillReport`] instead;
/// only store-level failures abort a batch.
#[derive(Debug, Error)]
pub enum Error {
    /// The store file is missing or not usable; raised before any query runs.
    #[error("kbar store unavailable at {path}: {reason}")]
    StoreUnavailable {
        /// Configured store path.
        path: PathBuf,
        /// Why the path was rejected.
        reason: String,
    },

    /// Timestamp text matched none of the accepted layouts.
    #[error("unrecognized datetime layout: {input:?}")]
    Parse {
        /// The offending input text.
        input: String,
    },

    /// Timestamp text matched a layout but names an impossible calendar value.
    #[error("invalid calendar value in {input:?}: {detail}")]
    InvalidDate {
        /// The offending input text.
        input: String,
        /// Which component was rejected and why.
        detail: String,
    },

    /// The series input does not fit the requested strategy.
    #[error("invalid series input: {0}")]
    InvalidInput(String),

    /// No `stock_meta` row exists for the requested symbol.
    #[error("unknown symbol in stock_meta: {0}")]
    UnknownSymbol(String),

    /// A query against the store failed.
    #[error("store query failed")]
    Db(#[from] diesel::result::Error),

    /// Opening the store connection failed.
    #[error("store connection failed")]
    Connection(#[from] diesel::ConnectionError),
}

impl From<CalendarError> for Error {
    fn from(err: CalendarError) -> Self {
        match err {
            CalendarError::Parse { input } => Error::Parse { input },
            CalendarError::InvalidDate { input, detail } => Error::InvalidDate { input, detail },
        }
    }
}

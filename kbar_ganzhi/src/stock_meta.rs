//! Listing-date gan-zhi lookup over the `stock_meta` table.
//!
//! Cache-aside per symbol: read the six stem-branch columns if they are all
//! populated, otherwise compute them from the listing date and fill the row
//! in place exactly once.

use diesel::prelude::*;
use ganzhi_calendar::datetime_ganzhi;
use serde::Serialize;
use tracing::debug;

use crate::error::Error;
use crate::schema::stock_meta::dsl as sm;

#[derive(Debug, Queryable)]
struct StockMetaRow {
    symbol: String,
    name: String,
    exchange: String,
    list_date: String,
    year_gan: Option<String>,
    year_zhi: Option<String>,
    month_gan: Option<String>,
    month_zhi: Option<String>,
    day_gan: Option<String>,
    day_zhi: Option<String>,
}

/// Gan-zhi labels of an instrument's listing date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingGanZhi {
    /// Instrument code.
    pub symbol: String,
    /// Instrument name.
    pub name: String,
    /// Venue code.
    pub exchange: String,
    /// Listing date as stored (typically `YYYYMMDD`).
    pub list_date: String,
    /// Year pillar label.
    pub year: String,
    /// Month pillar label.
    pub month: String,
    /// Day pillar label.
    pub day: String,
}

fn cached_labels(row: &StockMetaRow) -> Option<(String, String, String)> {
    let pair = |g: &Option<String>, z: &Option<String>| match (g.as_deref(), z.as_deref()) {
        (Some(g), Some(z)) if !g.is_empty() && !z.is_empty() => Some(format!("{g}{z}")),
        _ => None,
    };
    Some((
        pair(&row.year_gan, &row.year_zhi)?,
        pair(&row.month_gan, &row.month_zhi)?,
        pair(&row.day_gan, &row.day_zhi)?,
    ))
}

/// Look up (and on a miss, compute and persist) the listing-date gan-zhi for
/// one symbol.
///
/// An unknown symbol is [`Error::UnknownSymbol`]; a listing date that does
/// not parse surfaces as a parse/date error, since this is a single-item
/// operation.
pub fn listing_date_ganzhi(conn: &mut SqliteConnection, symbol: &str) -> Result<ListingGanZhi, Error> {
    let row: StockMetaRow = sm::stock_meta
        .find(symbol)
        .first(conn)
        .optional()?
        .ok_or_else(|| Error::UnknownSymbol(symbol.to_string()))?;

    if let Some((year, month, day)) = cached_labels(&row) {
        debug!(symbol, "listing-date gan-zhi served from cache");
        return Ok(ListingGanZhi {
            symbol: row.symbol,
            name: row.name,
            exchange: row.exchange,
            list_date: row.list_date,
            year,
            month,
            day,
        });
    }

    let gz = datetime_ganzhi(&row.list_date)?;
    diesel::update(sm::stock_meta.find(symbol))
        .set((
            sm::year_gan.eq(gz.year.gan_symbol()),
            sm::year_zhi.eq(gz.year.zhi_symbol()),
            sm::month_gan.eq(gz.month.gan_symbol()),
            sm::month_zhi.eq(gz.month.zhi_symbol()),
            sm::day_gan.eq(gz.day.gan_symbol()),
            sm::day_zhi.eq(gz.day.zhi_symbol()),
        ))
        .execute(conn)?;
    debug!(symbol, "listing-date gan-zhi computed and persisted");

    Ok(ListingGanZhi {
        symbol: row.symbol,
        name: row.name,
        exchange: row.exchange,
        list_date: row.list_date,
        year: gz.year.to_string(),
        month: gz.month.to_string(),
        day: gz.day.to_string(),
    })
}

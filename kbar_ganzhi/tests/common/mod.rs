#![allow(dead_code)]

use std::path::PathBuf;

use diesel::prelude::*;
use kbar_ganzhi::db::{connection, migrate};
use kbar_ganzhi::schema::kbar_data::dsl as kd;
use kbar_ganzhi::schema::stock_meta::dsl as sm;
use tempfile::TempDir;

pub struct TestDb {
    _dir: TempDir, // keep alive for the life of the test
    pub path: String,
}

pub fn setup_db() -> (TestDb, SqliteConnection) {
    let dir = TempDir::new().expect("tempdir");
    let mut p = PathBuf::from(dir.path());
    p.push("kbar.db");
    let path = p.to_string_lossy().to_string();

    migrate::run_sqlite(&path).expect("migrations");
    let conn = connection::connect_sqlite(&path).expect("connect");
    (TestDb { _dir: dir, path }, conn)
}

/// Insert one bar row with empty stem-branch columns.
pub fn seed_bare_row(
    conn: &mut SqliteConnection,
    symbol: &str,
    exchange: &str,
    period: &str,
    ts: &str,
) {
    diesel::insert_into(kd::kbar_data)
        .values((
            kd::symbol.eq(symbol),
            kd::exchange.eq(exchange),
            kd::period.eq(period),
            kd::ts.eq(ts),
            kd::open.eq(10.0),
            kd::high.eq(11.0),
            kd::low.eq(9.5),
            kd::close.eq(10.5),
            kd::volume.eq(1_000.0),
            kd::amount.eq(10_500.0),
        ))
        .execute(conn)
        .expect("seed kbar row");
}

/// Insert one stock_meta row with empty stem-branch columns.
pub fn seed_stock_meta(
    conn: &mut SqliteConnection,
    symbol: &str,
    name: &str,
    exchange: &str,
    list_date: &str,
) {
    diesel::insert_into(sm::stock_meta)
        .values((
            sm::symbol.eq(symbol),
            sm::name.eq(name),
            sm::exchange.eq(exchange),
            sm::list_date.eq(list_date),
        ))
        .execute(conn)
        .expect("seed stock_meta row");
}

/// All label columns of every row, for invariant checks.
pub fn load_label_columns(
    conn: &mut SqliteConnection,
) -> Vec<(String, [Option<String>; 8])> {
    let rows: Vec<(
        String,
        Option<String>,
        Option<String>,
        Option<String>,
        Option<String>,
        Option<String>,
        Option<String>,
        Option<String>,
        Option<String>,
    )> = kd::kbar_data
        .select((
            kd::ts,
            kd::year_gan,
            kd::year_zhi,
            kd::month_gan,
            kd::month_zhi,
            kd::day_gan,
            kd::day_zhi,
            kd::hour_gan,
            kd::hour_zhi,
        ))
        .order(kd::ts)
        .load(conn)
        .expect("label columns");
    rows.into_iter()
        .map(|(ts, a, b, c, d, e, f, g, h)| (ts, [a, b, c, d, e, f, g, h]))
        .collect()
}

/// Assert the all-or-nothing stem-branch invariant over the whole store:
/// every row has either all eight columns populated and non-empty, or none.
pub fn assert_all_or_nothing(conn: &mut SqliteConnection) {
    for (ts, cols) in load_label_columns(conn) {
        let populated = cols
            .iter()
            .filter(|c| c.as_deref().is_some_and(|s| !s.is_empty()))
            .count();
        // an absent hour pillar writes empty strings, never NULLs, so a
        // filled row has eight non-null columns of which at least six are
        // non-empty
        let non_null = cols.iter().filter(|c| c.is_some()).count();
        assert!(
            non_null == 0 || (non_null == 8 && populated >= 6),
            "row {ts} has partially populated labels: {cols:?}"
        );
    }
}

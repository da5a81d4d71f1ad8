//! SQLite connection helpers.

use diesel::{Connection, RunQueryDsl, SqliteConnection, sql_query};

use crate::error::Error;

/// Open a SQLite connection to the store and apply connection-wide PRAGMAs.
pub fn connect_sqlite(database_path: &str) -> Result<SqliteConnection, Error> {
    let mut conn = SqliteConnection::establish(database_path)?;

    sql_query("PRAGMA journal_mode=WAL;").execute(&mut conn)?;
    sql_query("PRAGMA foreign_keys=ON;").execute(&mut conn)?;
    sql_query("PRAGMA busy_timeout=5000;").execute(&mut conn)?;
    Ok(conn)
}

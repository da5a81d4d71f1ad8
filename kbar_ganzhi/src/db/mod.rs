//! Database utilities for connections and schema migrations.
//!
//! - [`connection::connect_sqlite`] opens the single-file store and applies
//!   WAL, foreign_keys=ON, and a 5000ms busy_timeout.
//! - [`migrate::run_sqlite`] applies the embedded Diesel migrations that
//!   create `kbar_data` and `stock_meta`.

pub mod connection;
pub mod migrate;

//! Sexagenary-cycle ("gan-zhi") calendar arithmetic for timestamp labelling.
//!
//! The crate is a pure leaf: no I/O, no shared state. It provides
//! - the ten-stem / twelve-branch symbol tables and the [`GanZhi`] pair type,
//! - deterministic pillar arithmetic for year, month, day, and two-hour block
//!   ([`ganzhi`]),
//! - the closed set of accepted timestamp layouts and the precision-aware
//!   [`parse::DateTimeParts`] they produce ([`parse`]),
//! - the fixed-position label sequence [`calculator::DateTimeGanZhi`] that
//!   downstream caches persist and format ([`calculator`]).

#![deny(missing_docs)]

pub mod calculator;
pub mod error;
pub mod ganzhi;
pub mod parse;

pub use calculator::{DateTimeGanZhi, datetime_ganzhi};
pub use error::CalendarError;
pub use ganzhi::{GAN, GanZhi, ZHI};
pub use parse::{DateTimeParts, parse_datetime};

//! Stem/branch symbol tables and the sexagenary pillar arithmetic.
//!
//! The pillar functions are total over valid [`NaiveDate`]s and pure, which is
//! the property the downstream cache relies on: recomputing a pillar for the
//! same instant always yields the same pair.
//!
//! Boundaries used by the table:
//! - day pillar counted from the 1949-10-01 jiazi anchor,
//! - sexagenary year switching at Feb 4 (fixed Lichun approximation),
//! - solar months starting at fixed jie dates (Feb 4, Mar 6, ... Jan 6),
//! - two-hour blocks with 00:00-01:59 as the first (zi) block.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// The ten heavenly stems, in cycle order.
pub const GAN: [&str; 10] = ["甲", "乙", "丙", "丁", "戊", "己", "庚", "辛", "壬", "癸"];

/// The twelve earthly branches, in cycle order.
pub const ZHI: [&str; 12] = [
    "子", "丑", "寅", "卯", "辰", "巳", "午", "未", "申", "酉", "戌", "亥",
];

/// One stem/branch pair.
///
/// Indices are guaranteed in range (stem < 10, branch < 12); [`fmt::Display`]
/// renders the two-character label, e.g. `甲子`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GanZhi {
    gan: u8,
    zhi: u8,
}

impl GanZhi {
    pub(crate) fn new(gan: u8, zhi: u8) -> Self {
        debug_assert!(gan < 10 && zhi < 12);
        Self { gan, zhi }
    }

    /// Stem index, `0..10`.
    pub fn gan(&self) -> u8 {
        self.gan
    }

    /// Branch index, `0..12`.
    pub fn zhi(&self) -> u8 {
        self.zhi
    }

    /// Stem symbol, one of [`GAN`].
    pub fn gan_symbol(&self) -> &'static str {
        GAN[self.gan as usize]
    }

    /// Branch symbol, one of [`ZHI`].
    pub fn zhi_symbol(&self) -> &'static str {
        ZHI[self.zhi as usize]
    }
}

impl fmt::Display for GanZhi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.gan_symbol(), self.zhi_symbol())
    }
}

/// 1949-10-01 was a jiazi (cycle index 0) day.
fn day_anchor() -> NaiveDate {
    NaiveDate::from_ymd_opt(1949, 10, 1).unwrap()
}

/// Day pillar for a proleptic Gregorian date.
pub fn day_pillar(date: NaiveDate) -> GanZhi {
    let days = date.signed_duration_since(day_anchor()).num_days();
    let idx = days.rem_euclid(60);
    GanZhi::new((idx % 10) as u8, (idx % 12) as u8)
}

/// The year the date belongs to in the sexagenary cycle.
///
/// Dates before Feb 4 count into the previous year; the same boundary starts
/// the first solar month, so year and month pillars stay consistent.
fn sexagenary_year(date: NaiveDate) -> i32 {
    if (date.month(), date.day()) < (2, 4) {
        date.year() - 1
    } else {
        date.year()
    }
}

/// Year pillar for a proleptic Gregorian date.
pub fn year_pillar(date: NaiveDate) -> GanZhi {
    let idx = (sexagenary_year(date) - 4).rem_euclid(60);
    GanZhi::new((idx % 10) as u8, (idx % 12) as u8)
}

/// First day of solar months 1..=11 (February through December).
const JIE_STARTS: [(u32, u32); 11] = [
    (2, 4),
    (3, 6),
    (4, 5),
    (5, 6),
    (6, 6),
    (7, 7),
    (8, 8),
    (9, 8),
    (10, 8),
    (11, 7),
    (12, 7),
];

/// Solar month number 1..=12, first month starting at Feb 4.
fn solar_month_number(date: NaiveDate) -> u32 {
    let md = (date.month(), date.day());
    if md < (1, 6) {
        // zi month carried over from December of the previous year
        return 11;
    }
    if md < (2, 4) {
        return 12;
    }
    let mut month = 1;
    for (i, start) in JIE_STARTS.iter().enumerate() {
        if md >= *start {
            month = (i + 1) as u32;
        }
    }
    month
}

/// Month pillar for a proleptic Gregorian date.
///
/// The stem follows the five-tigers rule: the first month's stem is fixed by
/// the year stem, later months advance through the cycle.
pub fn month_pillar(date: NaiveDate) -> GanZhi {
    let n = solar_month_number(date);
    let first_stem = (year_pillar(date).gan() % 5) * 2 + 2;
    let gan = (first_stem + (n as u8 - 1)) % 10;
    let zhi = ((n + 1) % 12) as u8;
    GanZhi::new(gan, zhi)
}

/// Hour pillar from the day stem and the hour of day.
///
/// 00:00-01:59 is the first (zi) block keyed to the day stem via the
/// five-rats rule; blocks advance in fixed two-hour increments.
pub fn hour_pillar(day_stem: u8, hour: u32) -> GanZhi {
    let block = ((hour / 2) % 12) as u8;
    let gan = ((day_stem % 5) * 2 + block) % 10;
    GanZhi::new(gan, block)
}

/// Modulo-cycle pillar for minute/second values.
///
/// Defined (stem = value mod 10, branch = value mod 12) but not emitted by
/// the calculator yet; kept as the hook for enabling sub-hour labels.
pub fn minute_second_pillar(value: u32) -> GanZhi {
    GanZhi::new((value % 10) as u8, (value % 12) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn day_pillar_anchors() {
        // the anchor itself and a far cross-check
        assert_eq!(day_pillar(d(1949, 10, 1)).to_string(), "甲子");
        assert_eq!(day_pillar(d(2000, 1, 1)).to_string(), "戊午");
        // consecutive days advance both cycles by one
        let a = day_pillar(d(2023, 10, 10));
        let b = day_pillar(d(2023, 10, 11));
        assert_eq!((a.gan() + 1) % 10, b.gan());
        assert_eq!((a.zhi() + 1) % 12, b.zhi());
    }

    #[test]
    fn year_pillar_switches_at_feb_4() {
        assert_eq!(year_pillar(d(1984, 2, 3)).to_string(), "癸亥");
        assert_eq!(year_pillar(d(1984, 2, 4)).to_string(), "甲子");
        assert_eq!(year_pillar(d(2023, 10, 10)).to_string(), "癸卯");
    }

    #[test]
    fn month_pillar_known_values() {
        // ninth solar month of a gui year starts at Oct 8
        assert_eq!(month_pillar(d(2023, 10, 10)).to_string(), "壬戌");
        // early January still belongs to the zi month of the previous year
        assert_eq!(month_pillar(d(2023, 1, 1)).to_string(), "壬子");
        assert_eq!(month_pillar(d(2023, 1, 6)).zhi_symbol(), "丑");
    }

    #[test]
    fn hour_pillar_blocks() {
        // jia day, midnight block: jiazi
        assert_eq!(hour_pillar(0, 0).to_string(), "甲子");
        assert_eq!(hour_pillar(0, 1).to_string(), "甲子");
        // next block
        assert_eq!(hour_pillar(0, 2).zhi_symbol(), "丑");
        // last block of the day
        assert_eq!(hour_pillar(0, 23).zhi_symbol(), "亥");
        // xin day, 15:00 falls in the wei block; five-rats start for xin is wu
        assert_eq!(hour_pillar(7, 15).to_string(), "乙未");
    }

    #[test]
    fn minute_second_hook_cycles() {
        assert_eq!(minute_second_pillar(0).to_string(), "甲子");
        assert_eq!(minute_second_pillar(59).gan(), 9);
        assert_eq!(minute_second_pillar(59).zhi(), 11);
    }

    #[test]
    fn every_pillar_is_a_valid_pair() {
        for offset in 0..400 {
            let date = d(2020, 1, 1) + chrono::Duration::days(offset);
            for gz in [year_pillar(date), month_pillar(date), day_pillar(date)] {
                assert!(GAN.contains(&gz.gan_symbol()));
                assert!(ZHI.contains(&gz.zhi_symbol()));
            }
        }
    }
}

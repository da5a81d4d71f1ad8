//! The fixed-position gan-zhi label sequence for one instant.

use serde::{Deserialize, Serialize};

use crate::error::CalendarError;
use crate::ganzhi::{self, GanZhi};
use crate::parse::{DateTimeParts, parse_datetime};

/// Gan-zhi labels for one calendar instant, positional and fixed-length.
///
/// Year, month, and day pillars always exist for a valid date. The hour
/// pillar exists only when the source layout carried an hour (it depends on
/// the day stem, so day is always computed first). Minute and second keep
/// their positions but are currently disabled end-to-end and always `None`;
/// the [`ganzhi::minute_second_pillar`] hook computes them once enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateTimeGanZhi {
    /// Year pillar.
    pub year: GanZhi,
    /// Month pillar.
    pub month: GanZhi,
    /// Day pillar.
    pub day: GanZhi,
    /// Hour pillar, when an hour was supplied.
    pub hour: Option<GanZhi>,
    /// Minute pillar (reserved, always `None`).
    pub minute: Option<GanZhi>,
    /// Second pillar (reserved, always `None`).
    pub second: Option<GanZhi>,
}

impl DateTimeGanZhi {
    /// Compute the label sequence for parsed parts. Pure and total.
    pub fn for_parts(parts: &DateTimeParts) -> Self {
        let year = ganzhi::year_pillar(parts.date);
        let month = ganzhi::month_pillar(parts.date);
        let day = ganzhi::day_pillar(parts.date);
        let hour = parts.hour.map(|h| ganzhi::hour_pillar(day.gan(), h));
        Self {
            year,
            month,
            day,
            hour,
            minute: None,
            second: None,
        }
    }

    /// Positional view: `[year, month, day, hour, minute, second]`.
    ///
    /// Absent units are `None` rather than omitted so positions keep their
    /// meaning across partial precision.
    pub fn labels(&self) -> [Option<GanZhi>; 6] {
        [
            Some(self.year),
            Some(self.month),
            Some(self.day),
            self.hour,
            self.minute,
            self.second,
        ]
    }

    /// Composite cache-entry string, `year-month-day-hour`.
    ///
    /// Missing sub-labels render as the empty string; a date-only instant
    /// formats with a trailing dash (e.g. `癸卯-壬戌-辛丑-`).
    pub fn composite(&self) -> String {
        format!(
            "{}-{}-{}-{}",
            self.year,
            self.month,
            self.day,
            self.hour.map(|gz| gz.to_string()).unwrap_or_default()
        )
    }
}

/// Parse timestamp text and compute its label sequence.
pub fn datetime_ganzhi(text: &str) -> Result<DateTimeGanZhi, CalendarError> {
    Ok(DateTimeGanZhi::for_parts(&parse_datetime(text)?))
}

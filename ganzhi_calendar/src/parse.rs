//! Timestamp text parsing with layout-derived precision.
//!
//! Accepted layouts are the cross product of three date separator
//! conventions (`2023/10/10`, `2023-10-10`, `20231010`) with four time
//! precisions (none, `HH`, `HH:MM`, `HH:MM:SS`). The first matching layout
//! wins and the presence flags come from the matched layout, not from the
//! literal values: `"2023/10/10 00:00"` has an hour and a minute, a plain
//! date has neither.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::CalendarError;

/// A parsed timestamp with per-unit precision.
///
/// `hour`/`minute`/`second` are `None` when the matched layout did not carry
/// that unit. Components are range-checked at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTimeParts {
    /// Calendar date (proleptic Gregorian).
    pub date: NaiveDate,
    /// Hour of day, if the layout carried one.
    pub hour: Option<u32>,
    /// Minute, if the layout carried one.
    pub minute: Option<u32>,
    /// Second, if the layout carried one.
    pub second: Option<u32>,
}

impl DateTimeParts {
    /// The instant with missing units floored: absent time-of-day is 00:00:00.
    ///
    /// This is the start-bound defaulting of the range predicate and the
    /// instant used when converting parts to a concrete timestamp.
    pub fn floor_instant(&self) -> NaiveDateTime {
        let time = NaiveTime::from_hms_opt(
            self.hour.unwrap_or(0),
            self.minute.unwrap_or(0),
            self.second.unwrap_or(0),
        )
        .unwrap();
        self.date.and_time(time)
    }

    /// The instant with missing units ceiled componentwise: an absent hour
    /// becomes 23, an absent minute 59, an absent second 59.
    ///
    /// A date-only end bound therefore covers the entire day, and an
    /// hour-only end bound the entire hour.
    pub fn ceil_instant(&self) -> NaiveDateTime {
        let time = NaiveTime::from_hms_opt(
            self.hour.unwrap_or(23),
            self.minute.unwrap_or(59),
            self.second.unwrap_or(59),
        )
        .unwrap();
        self.date.and_time(time)
    }
}

fn parse_err(input: &str) -> CalendarError {
    CalendarError::Parse {
        input: input.to_string(),
    }
}

fn component<T: std::str::FromStr>(field: &str, input: &str) -> Result<T, CalendarError> {
    field.parse::<T>().map_err(|_| parse_err(input))
}

fn split_date(token: &str, input: &str) -> Result<(i32, u32, u32), CalendarError> {
    let fields: Vec<&str> = if token.contains('/') {
        token.split('/').collect()
    } else if token.contains('-') {
        token.split('-').collect()
    } else {
        // bare-digit convention is exactly YYYYMMDD
        if token.len() == 8 && token.bytes().all(|b| b.is_ascii_digit()) {
            vec![&token[..4], &token[4..6], &token[6..8]]
        } else {
            return Err(parse_err(input));
        }
    };
    if fields.len() != 3 {
        return Err(parse_err(input));
    }
    Ok((
        component(fields[0], input)?,
        component(fields[1], input)?,
        component(fields[2], input)?,
    ))
}

fn split_time(
    token: &str,
    input: &str,
) -> Result<(Option<u32>, Option<u32>, Option<u32>), CalendarError> {
    let fields: Vec<&str> = token.split(':').collect();
    if fields.len() > 3 {
        return Err(parse_err(input));
    }
    let bounds = [("hour", 23u32), ("minute", 59), ("second", 59)];
    let mut out = [None, None, None];
    for (i, field) in fields.iter().enumerate() {
        let value: u32 = component(field, input)?;
        let (name, max) = bounds[i];
        if value > max {
            return Err(CalendarError::InvalidDate {
                input: input.to_string(),
                detail: format!("{name} {value} out of range"),
            });
        }
        out[i] = Some(value);
    }
    Ok((out[0], out[1], out[2]))
}

/// Parse timestamp text into [`DateTimeParts`].
///
/// Fails with [`CalendarError::Parse`] when no layout matches and with
/// [`CalendarError::InvalidDate`] when the layout matched but a component is
/// out of range.
pub fn parse_datetime(input: &str) -> Result<DateTimeParts, CalendarError> {
    let mut tokens = input.split_whitespace();
    let date_token = tokens.next().ok_or_else(|| parse_err(input))?;
    let time_token = tokens.next();
    if tokens.next().is_some() {
        return Err(parse_err(input));
    }

    let (year, month, day) = split_date(date_token, input)?;
    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        CalendarError::InvalidDate {
            input: input.to_string(),
            detail: format!("no such date {year:04}-{month:02}-{day:02}"),
        }
    })?;

    let (hour, minute, second) = match time_token {
        Some(t) => split_time(t, input)?,
        None => (None, None, None),
    };

    Ok(DateTimeParts {
        date,
        hour,
        minute,
        second,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_separator_conventions_parse() {
        for text in ["2023/10/10", "2023-10-10", "20231010"] {
            let parts = parse_datetime(text).unwrap();
            assert_eq!(parts.date, NaiveDate::from_ymd_opt(2023, 10, 10).unwrap());
            assert_eq!(parts.hour, None);
        }
    }

    #[test]
    fn precision_comes_from_the_layout() {
        let p = parse_datetime("2023/10/10 15").unwrap();
        assert_eq!((p.hour, p.minute, p.second), (Some(15), None, None));

        let p = parse_datetime("2023-10-10 15:30").unwrap();
        assert_eq!((p.hour, p.minute, p.second), (Some(15), Some(30), None));

        let p = parse_datetime("20231010 15:30:45").unwrap();
        assert_eq!((p.hour, p.minute, p.second), (Some(15), Some(30), Some(45)));

        // literal zeros still count as present
        let p = parse_datetime("2023/10/10 00:00:00").unwrap();
        assert_eq!((p.hour, p.minute, p.second), (Some(0), Some(0), Some(0)));
    }

    #[test]
    fn floor_and_ceil_defaults() {
        let p = parse_datetime("2023/10/10").unwrap();
        assert_eq!(p.floor_instant().to_string(), "2023-10-10 00:00:00");
        assert_eq!(p.ceil_instant().to_string(), "2023-10-10 23:59:59");

        // componentwise: hour given, minute/second widened
        let p = parse_datetime("2023/10/10 11").unwrap();
        assert_eq!(p.ceil_instant().to_string(), "2023-10-10 11:59:59");
    }

    #[test]
    fn unparseable_text_is_a_parse_error() {
        for text in ["", "not-a-date", "2023/10", "2023/10/10 1:2:3:4", "2023 10 10"] {
            match parse_datetime(text) {
                Err(CalendarError::Parse { .. }) => {}
                other => panic!("expected Parse error for {text:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn impossible_calendar_values_are_invalid_date() {
        for text in ["2023/13/01", "2023/02/30", "2023/10/10 24:00"] {
            match parse_datetime(text) {
                Err(CalendarError::InvalidDate { .. }) => {}
                other => panic!("expected InvalidDate for {text:?}, got {other:?}"),
            }
        }
    }
}

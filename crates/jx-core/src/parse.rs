//! Parsing of user- and index-supplied dates, times, datetimes and durations.
//!
//! Values in one index column or on one command line usually share a
//! layout, so [`ValueParser`] remembers the last format that worked for each
//! kind of value and tries it first.

use std::sync::LazyLock;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

use crate::types::ValidationError;

const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y:%m:%d", "%Y/%m/%d", "%d.%m.%Y", "%Y%m%d"];

const TIME_FORMATS: [&str; 2] = ["%H:%M:%S%.f", "%H:%M"];

/// `%Y:%m:%d %H:%M:%S` is the layout EXIF uses.
const DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y:%m:%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

/// Times written with unit letters: `20h`, `20h30`, `20h30m15s`.
static LETTER_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})h(?:(\d{1,2})m?(?:(\d{1,2})s)?)?$").unwrap()
});

/// A whole duration built from unit terms, e.g. `1h30m` or `2d 12h`.
static DURATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\s*\d+\s*(?:w|d|h|min|m|s)\s*)+$").unwrap());

static DURATION_TERM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*(min|w|d|h|m|s)").unwrap());

/// Longest accepted duration (~100 years in seconds).
const MAX_DURATION_SECONDS: i64 = 100 * 366 * 24 * 60 * 60;

/// Parser with per-instance format memory.
#[derive(Debug, Clone, Default)]
pub struct ValueParser {
    date_format: Option<usize>,
    time_format: Option<usize>,
    datetime_format: Option<usize>,
}

impl ValueParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn date(&mut self, value: &str) -> Result<NaiveDate, ValidationError> {
        let value = value.trim();
        remembered(&mut self.date_format, &DATE_FORMATS, |format| {
            NaiveDate::parse_from_str(value, format).ok()
        })
        .ok_or_else(|| ValidationError::InvalidDate {
            value: value.to_string(),
        })
    }

    pub fn time(&mut self, value: &str) -> Result<NaiveTime, ValidationError> {
        let value = value.trim();
        remembered(&mut self.time_format, &TIME_FORMATS, |format| {
            NaiveTime::parse_from_str(value, format).ok()
        })
        .or_else(|| letter_time(value))
        .ok_or_else(|| ValidationError::InvalidTime {
            value: value.to_string(),
        })
    }

    /// Parses a datetime, falling back to a date and a time separated by
    /// whitespace or `T`.
    pub fn datetime(&mut self, value: &str) -> Result<NaiveDateTime, ValidationError> {
        let value = value.trim();
        let invalid = || ValidationError::InvalidDatetime {
            value: value.to_string(),
        };

        if let Some(datetime) = remembered(&mut self.datetime_format, &DATETIME_FORMATS, |format| {
            NaiveDateTime::parse_from_str(value, format).ok()
        }) {
            return Ok(datetime);
        }

        let (date, time) = value
            .split_once(|c: char| c.is_whitespace() || c == 'T')
            .ok_or_else(invalid)?;
        let date = self.date(date).map_err(|_| invalid())?;
        let time = self.time(time).map_err(|_| invalid())?;
        Ok(date.and_time(time))
    }
}

/// Tries the remembered format first, then the others in order.
fn remembered<T>(
    slot: &mut Option<usize>,
    formats: &[&str],
    parse: impl Fn(&str) -> Option<T>,
) -> Option<T> {
    let last = *slot;
    if let Some(value) = last.and_then(|i| formats.get(i).copied()).and_then(&parse) {
        return Some(value);
    }
    let (index, value) = formats
        .iter()
        .copied()
        .enumerate()
        .filter(|(i, _)| Some(*i) != last)
        .find_map(|(i, format)| parse(format).map(|value| (i, value)))?;
    *slot = Some(index);
    Some(value)
}

fn letter_time(value: &str) -> Option<NaiveTime> {
    let caps = LETTER_TIME_RE.captures(value)?;
    let part = |i| caps.get(i).map_or(Some(0), |m| m.as_str().parse().ok());
    NaiveTime::from_hms_opt(part(1)?, part(2)?, part(3)?)
}

/// Parses a date with a fresh [`ValueParser`].
pub fn parse_date(value: &str) -> Result<NaiveDate, ValidationError> {
    ValueParser::new().date(value)
}

/// Parses a time of day with a fresh [`ValueParser`].
pub fn parse_time(value: &str) -> Result<NaiveTime, ValidationError> {
    ValueParser::new().time(value)
}

/// Parses a datetime with a fresh [`ValueParser`].
pub fn parse_datetime(value: &str) -> Result<NaiveDateTime, ValidationError> {
    ValueParser::new().datetime(value)
}

/// Parses a single duration argument.
///
/// A bare number is read as hours; otherwise the value is a sum of unit
/// terms (`w`, `d`, `h`, `min`/`m`, `s`).
pub fn parse_duration(value: &str) -> Result<Duration, ValidationError> {
    parse_duration_parts(&[value])
}

/// Parses duration arguments as given on the command line.
///
/// Up to three bare numbers are read as hours, minutes and seconds
/// (`1 30` is an hour and a half). Otherwise every part must be a unit
/// string and the parts are summed.
pub fn parse_duration_parts<S: AsRef<str>>(parts: &[S]) -> Result<Duration, ValidationError> {
    let joined = || {
        parts
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(" ")
    };
    let invalid = || ValidationError::InvalidDuration { value: joined() };

    if parts.is_empty() {
        return Err(invalid());
    }

    let bare: Option<Vec<i64>> = parts
        .iter()
        .map(|part| part.as_ref().trim().parse::<i64>().ok().filter(|n| *n >= 0))
        .collect();

    let seconds = if let Some(numbers) = bare {
        if numbers.len() > 3 {
            return Err(invalid());
        }
        numbers
            .iter()
            .zip([3600, 60, 1])
            .try_fold(0_i64, |acc, (n, unit)| n.checked_mul(unit)?.checked_add(acc))
    } else {
        parts.iter().try_fold(0_i64, |acc, part| {
            unit_seconds(part.as_ref())?.checked_add(acc)
        })
    };

    seconds
        .filter(|s| *s <= MAX_DURATION_SECONDS)
        .and_then(Duration::try_seconds)
        .ok_or_else(invalid)
}

fn unit_seconds(value: &str) -> Option<i64> {
    if !DURATION_RE.is_match(value) {
        return None;
    }
    DURATION_TERM_RE.captures_iter(value).try_fold(0_i64, |acc, caps| {
        let n: i64 = caps[1].parse().ok()?;
        let unit = match &caps[2] {
            "w" => 7 * 24 * 3600,
            "d" => 24 * 3600,
            "h" => 3600,
            "min" | "m" => 60,
            _ => 1,
        };
        n.checked_mul(unit)?.checked_add(acc)
    })
}

//! Records being classified and the attributes they carry.

use std::cmp::Ordering;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::types::{Exposure, ValidationError};

/// Capture metadata read by the matching engine.
///
/// This trait lets selection work with different record representations
/// (e.g., [`Record`] from an index or an image, or test fixtures).
pub trait Capture {
    /// Calendar date of the capture.
    fn date(&self) -> Option<NaiveDate>;

    /// Wall-clock time of the capture.
    fn time(&self) -> Option<NaiveTime>;

    /// Absolute capture time; derived from date and time unless overridden.
    fn datetime(&self) -> Option<NaiveDateTime> {
        Some(self.date()?.and_time(self.time()?))
    }

    fn exposure_time(&self) -> Option<Exposure>;

    /// Device model string, compared case-sensitively.
    fn model(&self) -> Option<&str>;
}

/// Attributes a record carries, usable in line formats and as sort keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Path,
    Name,
    Date,
    Time,
    Datetime,
    ExposureTime,
    Model,
}

impl Field {
    pub const ALL: [Self; 7] = [
        Self::Path,
        Self::Name,
        Self::Date,
        Self::Time,
        Self::Datetime,
        Self::ExposureTime,
        Self::Model,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Name => "name",
            Self::Date => "date",
            Self::Time => "time",
            Self::Datetime => "datetime",
            Self::ExposureTime => "exposure_time",
            Self::Model => "model",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownField {
                value: s.to_string(),
            })
    }
}

/// A photograph's metadata. Any attribute may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datetime: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exposure_time: Option<Exposure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl Record {
    /// Fills attributes derivable from the others.
    ///
    /// `datetime` comes from `date` and `time`, the reverse split fills a
    /// missing `date` or `time`, and `name` is the final path component.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        match (self.date, self.time, self.datetime) {
            (Some(date), Some(time), None) => self.datetime = Some(date.and_time(time)),
            (date, time, Some(datetime)) => {
                self.date = date.or(Some(datetime.date()));
                self.time = time.or(Some(datetime.time()));
            }
            _ => {}
        }
        if self.name.is_none() {
            self.name = self
                .path
                .as_deref()
                .and_then(|p| Path::new(p).file_name())
                .and_then(|n| n.to_str())
                .map(String::from);
        }
        self
    }

    /// Orders two records by one attribute; absent values sort first.
    pub fn cmp_by(&self, other: &Self, field: Field) -> Ordering {
        match field {
            Field::Path => self.path.cmp(&other.path),
            Field::Name => self.name.cmp(&other.name),
            Field::Date => self.date.cmp(&other.date),
            Field::Time => self.time.cmp(&other.time),
            Field::Datetime => Capture::datetime(self).cmp(&Capture::datetime(other)),
            Field::ExposureTime => self.exposure_time.cmp(&other.exposure_time),
            Field::Model => self.model.cmp(&other.model),
        }
    }
}

impl Capture for Record {
    fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    fn time(&self) -> Option<NaiveTime> {
        self.time
    }

    fn datetime(&self) -> Option<NaiveDateTime> {
        self.datetime.or_else(|| Some(self.date?.and_time(self.time?)))
    }

    fn exposure_time(&self) -> Option<Exposure> {
        self.exposure_time
    }

    fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }
}

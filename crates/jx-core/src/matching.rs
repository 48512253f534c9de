//! Per-record decision functions, one per selection mode.
//!
//! Stateless criteria return `bool`. Criteria that consume a pending target
//! sequence return a [`Verdict`], because they can tell when no later record
//! of a sorted stream could ever match again.
//!
//! # Time windows and midnight
//!
//! A window `[t, t + period)` over a bare time of day is compared as times of
//! day only, with `t + period` wrapping at midnight. A window that crosses
//! midnight therefore never matches a record without a date. Records with a
//! date are compared as absolute datetimes, against the window opened at `t`
//! most recently before the record. This holds for first-after windows too.

use std::cmp::Ordering;

use chrono::{Days, Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::record::Capture;
use crate::targets::{PendingTargets, TimeTargets};
use crate::types::ExposureRange;

/// Outcome of evaluating one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Matched,
    Rejected,
    /// No later record can match; the scan should stop.
    Exhausted,
}

impl Verdict {
    pub const fn from_match(matched: bool) -> Self {
        if matched { Self::Matched } else { Self::Rejected }
    }

    pub const fn is_match(self) -> bool {
        matches!(self, Self::Matched)
    }
}

/// How time and datetime targets are matched, from the requested period
/// and the first-after flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeMode {
    /// Equal to a target.
    Exact,
    /// Inside `[target, target + period)`.
    Window(Duration),
    /// First record past a target.
    FirstAfter,
    /// First record past a target, if still inside its window.
    FirstAfterWithin(Duration),
}

impl TimeMode {
    /// A period that is not positive counts as absent.
    pub fn new(period: Option<Duration>, first_after: bool) -> Self {
        let period = period.filter(|p| *p > Duration::zero());
        match (period, first_after) {
            (None, false) => Self::Exact,
            (Some(period), false) => Self::Window(period),
            (None, true) => Self::FirstAfter,
            (Some(period), true) => Self::FirstAfterWithin(period),
        }
    }

    pub const fn period(self) -> Option<Duration> {
        match self {
            Self::Window(period) | Self::FirstAfterWithin(period) => Some(period),
            Self::Exact | Self::FirstAfter => None,
        }
    }

    pub const fn is_first_after(self) -> bool {
        matches!(self, Self::FirstAfter | Self::FirstAfterWithin(_))
    }
}

pub fn model_matches<R: Capture + ?Sized>(record: &R, model: &str) -> bool {
    record.model().is_some_and(|m| m == model)
}

pub fn exposure_matches<R: Capture + ?Sized>(record: &R, range: &ExposureRange) -> bool {
    record.exposure_time().is_some_and(|e| range.contains(e))
}

/// Date equality against any requested date, for input in arbitrary order.
pub fn date_listed<R: Capture + ?Sized>(record: &R, dates: &[NaiveDate]) -> bool {
    record.date().is_some_and(|d| dates.contains(&d))
}

/// Date equality for input sorted by date.
///
/// Dates the record has moved past are dropped for good; the smallest
/// remaining date is kept on a match since several records share a date.
pub fn date_pending<R: Capture + ?Sized>(
    record: &R,
    pending: &mut PendingTargets<NaiveDate>,
) -> Verdict {
    if pending.is_empty() {
        return Verdict::Exhausted;
    }
    let Some(date) = record.date() else {
        return Verdict::Rejected;
    };

    while let Some(target) = pending.first_pending() {
        match date.cmp(&target) {
            Ordering::Equal => return Verdict::Matched,
            Ordering::Less => return Verdict::Rejected,
            Ordering::Greater => {
                tracing::trace!(%target, %date, "date target passed");
                pending.remove_first_pending();
            }
        }
    }
    Verdict::Exhausted
}

/// Time-of-day matching against every target; matches if any target does.
///
/// Each target's state advances on every call, even once an earlier target
/// has matched. A record without a time fails and leaves all state as is.
pub fn time_matches<R: Capture + ?Sized>(
    record: &R,
    targets: &mut TimeTargets,
    mode: TimeMode,
) -> bool {
    let Some(time) = record.time() else {
        return false;
    };
    let datetime = record.datetime();

    let mut matched = false;
    for target in targets.iter_mut() {
        let hit = match mode {
            TimeMode::Exact => target.at() == time,
            TimeMode::Window(period) => within_window(target.at(), time, datetime, period),
            TimeMode::FirstAfter => target.observe(time),
            TimeMode::FirstAfterWithin(period) => {
                target.observe(time) && within_window(target.at(), time, datetime, period)
            }
        };
        matched |= hit;
    }
    matched
}

/// Datetime matching for arbitrary input order. First-after modes need the
/// pending form and are handled by [`datetime_pending`].
pub fn datetime_listed<R: Capture + ?Sized>(
    record: &R,
    targets: &[NaiveDateTime],
    period: Option<Duration>,
) -> bool {
    let Some(datetime) = record.datetime() else {
        return false;
    };
    match period {
        None => targets.contains(&datetime),
        Some(period) => targets
            .iter()
            .any(|&target| target <= datetime && before_end(datetime, target, period)),
    }
}

/// Datetime matching that consumes targets front to back.
///
/// Exact and window modes assume input sorted by datetime. First-after modes
/// fire and drop every target the record has passed, so one record can
/// satisfy several targets at once.
pub fn datetime_pending<R: Capture + ?Sized>(
    record: &R,
    pending: &mut PendingTargets<NaiveDateTime>,
    mode: TimeMode,
) -> Verdict {
    if pending.is_empty() {
        return Verdict::Exhausted;
    }
    let Some(datetime) = record.datetime() else {
        return Verdict::Rejected;
    };

    match mode {
        TimeMode::Exact => {
            while let Some(target) = pending.first_pending() {
                match datetime.cmp(&target) {
                    Ordering::Equal => return Verdict::Matched,
                    Ordering::Less => return Verdict::Rejected,
                    Ordering::Greater => {
                        tracing::trace!(%target, %datetime, "datetime target passed");
                        pending.remove_first_pending();
                    }
                }
            }
            Verdict::Exhausted
        }
        TimeMode::Window(period) => {
            while let Some(target) = pending.first_pending() {
                if datetime < target {
                    return Verdict::Rejected;
                }
                if before_end(datetime, target, period) {
                    return Verdict::Matched;
                }
                tracing::trace!(%target, %datetime, "datetime window expired");
                pending.remove_first_pending();
            }
            Verdict::Exhausted
        }
        TimeMode::FirstAfter | TimeMode::FirstAfterWithin(_) => {
            let period = mode.period();
            let mut fired = false;
            while let Some(target) = pending.first_pending().filter(|t| *t < datetime) {
                pending.remove_first_pending();
                fired |= period.is_none_or(|p| before_end(datetime, target, p));
            }
            if fired {
                Verdict::Matched
            } else if pending.is_empty() {
                Verdict::Exhausted
            } else {
                Verdict::Rejected
            }
        }
    }
}

/// `datetime < start + period`; an end past the representable range is open.
fn before_end(datetime: NaiveDateTime, start: NaiveDateTime, period: Duration) -> bool {
    start
        .checked_add_signed(period)
        .is_none_or(|end| datetime < end)
}

fn within_window(
    at: NaiveTime,
    time: NaiveTime,
    datetime: Option<NaiveDateTime>,
    period: Duration,
) -> bool {
    let Some(datetime) = datetime else {
        return at <= time && time < at + period;
    };

    // Windows opened on earlier days end before the latest one does.
    let day = if at <= datetime.time() {
        Some(datetime.date())
    } else {
        datetime.date().checked_sub_days(Days::new(1))
    };
    day.map(|day| day.and_time(at))
        .is_some_and(|start| before_end(datetime, start, period))
}

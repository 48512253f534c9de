//! Combining requested criteria into one per-record decision.
//!
//! Criteria are evaluated in a fixed order, short-circuiting on the first
//! rejection:
//!
//! 1. dates
//! 2. datetimes
//! 3. times
//! 4. exposure time
//! 5. model
//!
//! Temporal criteria come first so that first-after latches only observe
//! records that already passed the date filter. Criteria that were not
//! requested accept every record.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::matching::{self, TimeMode, Verdict};
use crate::record::Capture;
use crate::targets::{PendingTargets, TimeTargets};
use crate::types::ExposureRange;

/// The delivery order a caller guarantees for its records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum InputOrder {
    #[default]
    Unordered,
    /// Non-decreasing dates.
    ByDate,
    /// Non-decreasing datetimes (implies [`InputOrder::ByDate`]).
    ByDatetime,
}

/// Everything a caller can ask for in one scan.
#[derive(Debug, Clone, Default)]
pub struct Criteria {
    pub dates: Vec<NaiveDate>,
    pub times: Vec<NaiveTime>,
    pub datetimes: Vec<NaiveDateTime>,
    pub exposure: Option<ExposureRange>,
    pub model: Option<String>,
    /// Window length after each time or datetime target.
    pub period: Option<Duration>,
    /// Select only the first record after each target.
    pub first_after: bool,
    pub order: InputOrder,
}

impl Criteria {
    /// No criterion requested; every record is selected.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
            && self.times.is_empty()
            && self.datetimes.is_empty()
            && self.exposure.is_none()
            && self.model.is_none()
    }
}

#[derive(Debug, Clone)]
enum DateCriterion {
    Listed(Vec<NaiveDate>),
    Pending(PendingTargets<NaiveDate>),
}

#[derive(Debug, Clone)]
enum DatetimeCriterion {
    Listed(Vec<NaiveDateTime>),
    Pending(PendingTargets<NaiveDateTime>),
}

/// Counters for a finished or running scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub scanned: usize,
    pub selected: usize,
    /// The scan ended because no remaining target could match.
    pub stopped_early: bool,
}

impl ScanStats {
    /// Records one verdict.
    pub const fn record(&mut self, verdict: Verdict) {
        self.scanned += 1;
        match verdict {
            Verdict::Matched => self.selected += 1,
            Verdict::Rejected => {}
            Verdict::Exhausted => self.stopped_early = true,
        }
    }
}

/// Target state and criteria for a single scan.
#[derive(Debug, Clone)]
pub struct Selector {
    dates: Option<DateCriterion>,
    datetimes: Option<DatetimeCriterion>,
    times: Option<TimeTargets>,
    exposure: Option<ExposureRange>,
    model: Option<String>,
    mode: TimeMode,
}

impl Selector {
    pub fn new(criteria: &Criteria) -> Self {
        let mode = TimeMode::new(criteria.period, criteria.first_after);

        let dates = (!criteria.dates.is_empty()).then(|| {
            if criteria.order >= InputOrder::ByDate {
                DateCriterion::Pending(PendingTargets::new(criteria.dates.iter().copied()))
            } else {
                DateCriterion::Listed(criteria.dates.clone())
            }
        });

        let datetimes = (!criteria.datetimes.is_empty()).then(|| {
            if criteria.order == InputOrder::ByDatetime || mode.is_first_after() {
                DatetimeCriterion::Pending(PendingTargets::new(criteria.datetimes.iter().copied()))
            } else {
                DatetimeCriterion::Listed(criteria.datetimes.clone())
            }
        });

        let times = (!criteria.times.is_empty())
            .then(|| TimeTargets::new(criteria.times.iter().copied()));

        tracing::debug!(
            dates = criteria.dates.len(),
            times = criteria.times.len(),
            datetimes = criteria.datetimes.len(),
            ?mode,
            order = ?criteria.order,
            "selector ready"
        );

        Self {
            dates,
            datetimes,
            times,
            exposure: criteria.exposure,
            model: criteria.model.clone(),
            mode,
        }
    }

    /// Classifies one record, advancing target state as a side effect.
    ///
    /// [`Verdict::Exhausted`] is returned as soon as any criterion reports
    /// it, whatever the remaining criteria would say.
    pub fn evaluate<R: Capture + ?Sized>(&mut self, record: &R) -> Verdict {
        let mode = self.mode;

        let verdict = match &mut self.dates {
            None => Verdict::Matched,
            Some(DateCriterion::Listed(dates)) => {
                Verdict::from_match(matching::date_listed(record, dates))
            }
            Some(DateCriterion::Pending(pending)) => matching::date_pending(record, pending),
        };
        if !verdict.is_match() {
            return verdict;
        }

        let verdict = match &mut self.datetimes {
            None => Verdict::Matched,
            Some(DatetimeCriterion::Listed(targets)) => {
                Verdict::from_match(matching::datetime_listed(record, targets, mode.period()))
            }
            Some(DatetimeCriterion::Pending(pending)) => {
                matching::datetime_pending(record, pending, mode)
            }
        };
        if !verdict.is_match() {
            return verdict;
        }

        if let Some(times) = &mut self.times {
            if !matching::time_matches(record, times, mode) {
                return Verdict::Rejected;
            }
        }

        if let Some(range) = &self.exposure {
            if !matching::exposure_matches(record, range) {
                return Verdict::Rejected;
            }
        }

        if let Some(model) = &self.model {
            if !matching::model_matches(record, model) {
                return Verdict::Rejected;
            }
        }

        Verdict::Matched
    }

    /// Wraps `records` into an iterator over the selected ones.
    pub fn select<I>(self, records: I) -> Selection<I::IntoIter>
    where
        I: IntoIterator,
        I::Item: Capture,
    {
        Selection {
            selector: self,
            records: records.into_iter(),
            stats: ScanStats::default(),
        }
    }
}

/// Iterator over selected records; stops for good once targets run out.
#[derive(Debug)]
pub struct Selection<I> {
    selector: Selector,
    records: I,
    stats: ScanStats,
}

impl<I> Selection<I> {
    pub const fn stats(&self) -> ScanStats {
        self.stats
    }
}

impl<I> Iterator for Selection<I>
where
    I: Iterator,
    I::Item: Capture,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        if self.stats.stopped_early {
            return None;
        }
        for record in self.records.by_ref() {
            let verdict = self.selector.evaluate(&record);
            self.stats.record(verdict);
            match verdict {
                Verdict::Matched => return Some(record),
                Verdict::Rejected => {}
                Verdict::Exhausted => {
                    tracing::debug!(
                        scanned = self.stats.scanned,
                        selected = self.stats.selected,
                        "all targets passed, stopping scan"
                    );
                    return None;
                }
            }
        }
        None
    }
}

//! Requested targets and their per-target matching state.
//!
//! Target sets are built once per scan, sorted ascending at construction and
//! never re-sorted. Only the matching engine mutates them.

use std::collections::VecDeque;

use chrono::NaiveTime;

/// One requested time of day and its first-after latch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeTarget {
    at: NaiveTime,
    /// Whether the last evaluated record was past `at`. Starts unarmed.
    crossed: bool,
}

impl TimeTarget {
    pub const fn new(at: NaiveTime) -> Self {
        Self { at, crossed: false }
    }

    pub const fn at(&self) -> NaiveTime {
        self.at
    }

    pub const fn is_armed(&self) -> bool {
        self.crossed
    }

    /// Feeds a record's time into the latch. Returns `true` on the rising
    /// edge, i.e. the first record past the target after one that was not.
    pub(crate) fn observe(&mut self, time: NaiveTime) -> bool {
        let crossed = time > self.at;
        let rising = crossed && !self.crossed;
        self.crossed = crossed;
        rising
    }
}

/// Requested times of day, each with independent latch state.
///
/// Duplicate times are kept as separate entries; they fire together.
#[derive(Debug, Clone, Default)]
pub struct TimeTargets {
    targets: Vec<TimeTarget>,
}

impl TimeTargets {
    pub fn new(times: impl IntoIterator<Item = NaiveTime>) -> Self {
        let mut targets: Vec<TimeTarget> = times.into_iter().map(TimeTarget::new).collect();
        targets.sort_by_key(TimeTarget::at);
        Self { targets }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TimeTarget> {
        self.targets.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, TimeTarget> {
        self.targets.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Dates or datetimes still waiting for a match, consumed front to back.
///
/// Correct removal relies on records arriving in non-decreasing order.
#[derive(Debug, Clone)]
pub struct PendingTargets<T> {
    pending: VecDeque<T>,
}

impl<T: Ord + Copy> PendingTargets<T> {
    pub fn new(values: impl IntoIterator<Item = T>) -> Self {
        let mut values: Vec<T> = values.into_iter().collect();
        values.sort_unstable();
        Self {
            pending: values.into(),
        }
    }

    /// The smallest target not yet passed.
    pub fn first_pending(&self) -> Option<T> {
        self.pending.front().copied()
    }

    pub(crate) fn remove_first_pending(&mut self) -> Option<T> {
        self.pending.pop_front()
    }

    pub fn iter(&self) -> std::collections::vec_deque::Iter<'_, T> {
        self.pending.iter()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn time_targets_sorted_and_unarmed() {
        let targets = TimeTargets::new([hm(21, 0), hm(8, 0), hm(12, 30)]);
        let times: Vec<_> = targets.iter().map(TimeTarget::at).collect();
        assert_eq!(times, vec![hm(8, 0), hm(12, 30), hm(21, 0)]);
        assert!(targets.iter().all(|t| !t.is_armed()));
    }

    #[test]
    fn time_targets_keep_duplicates() {
        let targets = TimeTargets::new([hm(20, 0), hm(20, 0)]);
        assert_eq!(targets.len(), 2);
    }

    #[test]
    fn latch_fires_on_rising_edge_only() {
        let mut target = TimeTarget::new(hm(20, 0));
        assert!(!target.observe(hm(19, 0)));
        assert!(!target.observe(hm(20, 0)), "equal time is not past the target");
        assert!(target.observe(hm(20, 30)));
        assert!(target.is_armed());
        assert!(!target.observe(hm(21, 0)));
        // Falling back below the target (next day) re-opens the edge.
        assert!(!target.observe(hm(7, 0)));
        assert!(target.observe(hm(20, 1)));
    }

    #[test]
    fn pending_targets_consumed_in_order() {
        let d = |day| NaiveDate::from_ymd_opt(2013, 7, day).unwrap();
        let mut pending = PendingTargets::new([d(10), d(9), d(12)]);

        assert_eq!(pending.first_pending(), Some(d(9)));
        assert_eq!(pending.remove_first_pending(), Some(d(9)));
        assert_eq!(pending.first_pending(), Some(d(10)));
        assert_eq!(pending.len(), 2);
        pending.remove_first_pending();
        pending.remove_first_pending();
        assert!(pending.is_empty());
        assert_eq!(pending.first_pending(), None);
    }
}

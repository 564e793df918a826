use crate::resource::ResourceId;
use serde::{Deserialize, Serialize};

/// Half-open busy interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub start: i64,
    pub end: i64,
}

impl Interval {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Busy intervals per resource for one scheduling run, indexed by resource id.
///
/// Each list is kept sorted by start time and never holds overlapping intervals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceSchedule {
    busy: Vec<Vec<Interval>>,
}

impl ResourceSchedule {
    pub fn new(num_resources: usize) -> Self {
        Self {
            busy: vec![Vec::new(); num_resources],
        }
    }

    pub fn num_resources(&self) -> usize {
        self.busy.len()
    }

    pub fn intervals(&self, resource: ResourceId) -> &[Interval] {
        self.busy.get(resource).map(Vec::as_slice).unwrap_or(&[])
    }

    /// True when `resource` has nothing booked that overlaps `window`.
    pub fn is_free(&self, resource: ResourceId, window: Interval) -> bool {
        if window.is_empty() {
            return true;
        }
        let intervals = self.intervals(resource);
        // First interval ending after the window starts is the only candidate.
        let idx = intervals.partition_point(|busy| busy.end <= window.start);
        intervals
            .get(idx)
            .is_none_or(|busy| !busy.overlaps(&window))
    }

    /// Books `window` on `resource`. Returns false, booking nothing, when the
    /// resource is unknown or already busy.
    pub fn reserve(&mut self, resource: ResourceId, window: Interval) -> bool {
        if window.is_empty() {
            return true;
        }
        if !self.is_free(resource, window) {
            return false;
        }
        let Some(intervals) = self.busy.get_mut(resource) else {
            return false;
        };
        let idx = intervals.partition_point(|busy| busy.start < window.start);
        intervals.insert(idx, window);
        true
    }

    /// Earliest interval end strictly after `time`, across all resources.
    pub fn next_release_after(&self, time: i64) -> Option<i64> {
        self.busy
            .iter()
            .filter_map(|intervals| {
                let idx = intervals.partition_point(|busy| busy.end <= time);
                intervals[idx..].iter().map(|busy| busy.end).min()
            })
            .min()
    }

    pub fn total_busy_time(&self, resource: ResourceId) -> i64 {
        self.intervals(resource)
            .iter()
            .map(|busy| busy.end - busy.start)
            .sum()
    }
}

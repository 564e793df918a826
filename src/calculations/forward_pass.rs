use crate::activity::{Activity, ActivityId};

pub struct ForwardPass<'a> {
    activities: &'a [Activity],
    order: &'a [ActivityId],
}

impl<'a> ForwardPass<'a> {
    pub fn new(activities: &'a [Activity], order: &'a [ActivityId]) -> Self {
        Self { activities, order }
    }

    /// Returns `(earliest_start, earliest_finish)` indexed by activity id.
    pub fn execute(&self) -> Vec<(i64, i64)> {
        let mut early: Vec<(i64, i64)> = vec![(0, 0); self.activities.len()];

        for &id in self.order {
            let activity = &self.activities[id];

            // Early start is max of all predecessor finishes
            let early_start = activity
                .predecessors
                .iter()
                .map(|&pred| early[pred].1)
                .max()
                .unwrap_or(0)
                .max(0);

            early[id] = (early_start, early_start + activity.duration);
        }

        early
    }
}

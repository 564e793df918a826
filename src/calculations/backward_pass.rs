use crate::activity::{Activity, ActivityId};

pub struct BackwardPass<'a> {
    activities: &'a [Activity],
    order: &'a [ActivityId],
}

impl<'a> BackwardPass<'a> {
    pub fn new(activities: &'a [Activity], order: &'a [ActivityId]) -> Self {
        Self { activities, order }
    }

    /// Returns `(latest_start, latest_finish)` indexed by activity id, with
    /// sinks pinned to `project_end`.
    pub fn execute(&self, project_end: i64) -> Vec<(i64, i64)> {
        let mut late: Vec<(i64, i64)> = vec![(project_end, project_end); self.activities.len()];

        // Reverse topological order
        for &id in self.order.iter().rev() {
            let activity = &self.activities[id];

            // Determine allowed late finish from successors' late starts
            let late_finish = activity
                .successors
                .iter()
                .map(|&succ| late[succ].0)
                .min()
                .unwrap_or(project_end);

            late[id] = (late_finish - activity.duration, late_finish);
        }

        late
    }
}

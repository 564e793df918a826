//! Critical-path time bounds.
//!
//! The forward pass fills earliest start/finish in topological order; the
//! backward pass fills latest start/finish from a horizon of
//! `max(level_deadline, max earliest_finish)`.

pub mod backward_pass;
pub mod forward_pass;

use crate::activity::{Activity, ActivityId};
use crate::graph::PrecedenceDag;
use crate::instance::StructuralError;
use backward_pass::BackwardPass;
use forward_pass::ForwardPass;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub earliest_start: i64,
    pub earliest_finish: i64,
    pub latest_start: i64,
    pub latest_finish: i64,
    pub slack: i64,
}

/// Result of one CPM computation over a precedence network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeBounds {
    pub windows: Vec<TimeWindow>,
    pub topological_order: Vec<ActivityId>,
    /// Horizon the backward pass was seeded with.
    pub horizon: i64,
}

pub struct TimeBoundCalculator<'a> {
    activities: &'a [Activity],
    level_deadline: i64,
}

impl<'a> TimeBoundCalculator<'a> {
    /// `activities` must have linked successors and predecessors, with ids equal
    /// to their position.
    pub fn new(activities: &'a [Activity], level_deadline: i64) -> Self {
        Self {
            activities,
            level_deadline,
        }
    }

    pub fn compute(&self) -> Result<TimeBounds, StructuralError> {
        let dag = PrecedenceDag::build(self.activities);
        let order = dag.topological_order()?;
        Ok(self.compute_with_order(order))
    }

    /// Runs both passes over an order already known to be topological.
    pub fn compute_with_order(&self, order: Vec<ActivityId>) -> TimeBounds {
        let early = ForwardPass::new(self.activities, &order).execute();
        let max_finish = early.iter().map(|&(_, ef)| ef).max().unwrap_or(0);
        let horizon = self.level_deadline.max(max_finish);
        let late = BackwardPass::new(self.activities, &order).execute(horizon);

        let windows = early
            .into_iter()
            .zip(late)
            .map(|((es, ef), (ls, lf))| TimeWindow {
                earliest_start: es,
                earliest_finish: ef,
                latest_start: ls,
                latest_finish: lf,
                slack: ls - es,
            })
            .collect();

        TimeBounds {
            windows,
            topological_order: order,
            horizon,
        }
    }
}

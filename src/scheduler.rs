//! Greedy list scheduler with progressive constraint relaxation.
//!
//! One run simulates a discrete clock. At every step the ready activities
//! (all predecessors committed) are ranked by the chosen rule and the first one
//! the matcher can staff is committed. When nothing fits, the clock jumps to
//! the next resource release. A level that deadlocks or exhausts its budget is
//! discarded and the run restarts from scratch at the next relaxation level.

use crate::activity::{Activity, ActivityId};
use crate::availability::{Interval, ResourceSchedule};
use crate::config::{ConfigError, SchedulerConfig};
use crate::instance::ProjectInstance;
use crate::matcher::{MatchOutcome, RelaxationLevel, ResourceMatcher};
use crate::priority::{PriorityRanker, PriorityRule, UnknownRule};
use crate::schedule::{Schedule, ScheduleEntry, ScheduleStatus};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

/// Why a level attempt stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    Completed,
    /// Nothing fits and no resource will ever be released again.
    Deadlocked,
    StagnationCeiling,
    IterationCeiling,
    TimeBudget,
}

/// Diagnostics for one relaxation level of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelAttempt {
    pub level: RelaxationLevel,
    pub termination: Termination,
    pub iterations: u32,
    pub stagnation: u32,
    pub scheduled: usize,
    pub final_time: i64,
}

pub struct GreedyScheduler<'a> {
    instance: &'a ProjectInstance,
    ranker: PriorityRanker<'a>,
    matcher: ResourceMatcher<'a>,
    config: SchedulerConfig,
}

impl<'a> GreedyScheduler<'a> {
    pub fn new(instance: &'a ProjectInstance) -> Self {
        Self {
            instance,
            ranker: PriorityRanker::new(instance),
            matcher: ResourceMatcher::new(instance),
            config: SchedulerConfig::default(),
        }
    }

    pub fn with_config(
        instance: &'a ProjectInstance,
        config: SchedulerConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut scheduler = Self::new(instance);
        scheduler.config = config;
        Ok(scheduler)
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn ranker(&self) -> &PriorityRanker<'a> {
        &self.ranker
    }

    pub fn schedule_named(&self, rule: &str) -> Result<Schedule, UnknownRule> {
        Ok(self.schedule(rule.parse()?))
    }

    /// Runs the relaxation ladder for `rule` and returns the first complete
    /// schedule, or the partial schedule of the last level tried.
    pub fn schedule(&self, rule: PriorityRule) -> Schedule {
        let mut attempts = Vec::new();
        let mut last: Option<(RelaxationLevel, Vec<ScheduleEntry>)> = None;

        for level in self.config.relaxation_ladder() {
            let (attempt, entries) = self.run_level(rule, level);
            let termination = attempt.termination;
            attempts.push(attempt);

            if termination == Termination::Completed {
                let schedule =
                    Schedule::new(rule, level, ScheduleStatus::Complete, entries, attempts);
                info!(
                    %rule,
                    %level,
                    makespan = schedule.makespan(),
                    "schedule complete"
                );
                return schedule;
            }

            debug!(
                %rule,
                %level,
                ?termination,
                scheduled = entries.len(),
                total = self.instance.num_activities(),
                "level failed, escalating"
            );
            last = Some((level, entries));
        }

        let (level, entries) = last.unwrap_or((self.config.start_relaxation, Vec::new()));
        let mut committed = vec![false; self.instance.num_activities()];
        for entry in &entries {
            committed[entry.activity] = true;
        }
        let missing: Vec<ActivityId> = (0..committed.len()).filter(|&id| !committed[id]).collect();
        warn!(
            %rule,
            %level,
            missing = missing.len(),
            "returning incomplete schedule"
        );
        Schedule::new(
            rule,
            level,
            ScheduleStatus::Incomplete { missing },
            entries,
            attempts,
        )
    }

    /// One attempt from an empty state at a fixed relaxation level.
    pub fn run_level(
        &self,
        rule: PriorityRule,
        level: RelaxationLevel,
    ) -> (LevelAttempt, Vec<ScheduleEntry>) {
        let activities = self.instance.activities();
        let n = activities.len();

        let mut current_time: i64 = 0;
        let mut completed_count = 0usize;
        let mut finish = vec![0_i64; n];
        let mut pending: Vec<usize> = activities.iter().map(|a| a.predecessors.len()).collect();
        let mut ready: Vec<ActivityId> = (0..n).filter(|&id| pending[id] == 0).collect();
        let mut resource_schedule = ResourceSchedule::new(self.instance.num_resources());
        let mut entries = Vec::with_capacity(n);

        let mut iterations: u32 = 0;
        let mut stagnation: u32 = 0;
        let budget = self.config.time_budget_ms.map(Duration::from_millis);
        let started = Instant::now();

        let termination = loop {
            if completed_count == n {
                break Termination::Completed;
            }
            if iterations >= self.config.iteration_ceiling {
                break Termination::IterationCeiling;
            }
            if budget.is_some_and(|limit| started.elapsed() >= limit) {
                break Termination::TimeBudget;
            }
            iterations += 1;

            ready.sort_by(|&a, &b| self.ranker.compare(rule, a, b));

            let mut commit = None;
            for (pos, &id) in ready.iter().enumerate() {
                let activity = &activities[id];
                let start = candidate_start(activity, current_time, &finish);
                match self
                    .matcher
                    .match_resources(activity, start, &resource_schedule, level)
                {
                    MatchOutcome::Feasible(resources) => {
                        commit = Some((pos, start, resources));
                        break;
                    }
                    MatchOutcome::Infeasible {
                        skill,
                        needed,
                        eligible,
                    } => {
                        trace!(activity = id, start, skill, needed, eligible, "no staffing");
                    }
                }
            }

            match commit {
                Some((pos, start, resources)) => {
                    let id = ready.remove(pos);
                    let end = start + activities[id].duration;
                    for &resource in &resources {
                        let booked = resource_schedule.reserve(resource, Interval::new(start, end));
                        debug_assert!(booked, "resource {resource} double-booked");
                    }
                    finish[id] = end;
                    completed_count += 1;
                    for &succ in &activities[id].successors {
                        pending[succ] -= 1;
                        if pending[succ] == 0 {
                            ready.push(succ);
                        }
                    }
                    trace!(activity = id, start, end, ?resources, "committed");
                    entries.push(ScheduleEntry {
                        activity: id,
                        start,
                        end,
                        resources,
                    });
                    stagnation = 0;
                    current_time = current_time.max(start);
                }
                None => {
                    // Without a future release every resource is free from now on,
                    // so a failed scan can never succeed later.
                    let Some(next_release) = resource_schedule.next_release_after(current_time)
                    else {
                        break Termination::Deadlocked;
                    };
                    current_time = next_release;
                    stagnation += 1;
                    if stagnation > self.config.stagnation_ceiling {
                        break Termination::StagnationCeiling;
                    }
                }
            }
        };

        let attempt = LevelAttempt {
            level,
            termination,
            iterations,
            stagnation,
            scheduled: entries.len(),
            final_time: current_time,
        };
        (attempt, entries)
    }
}

/// Earliest admissible start: not before the clock, the CPM earliest start, or
/// the actual end of any committed predecessor.
fn candidate_start(activity: &Activity, current_time: i64, finish: &[i64]) -> i64 {
    activity
        .predecessors
        .iter()
        .map(|&pred| finish[pred])
        .fold(current_time.max(activity.earliest_start), i64::max)
}

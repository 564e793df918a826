use crate::activity::ActivityId;
use crate::instance::ProjectInstance;
use crate::matcher::RelaxationLevel;
use crate::priority::PriorityRule;
use crate::resource::ResourceId;
use crate::scheduler::LevelAttempt;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub activity: ActivityId,
    pub start: i64,
    pub end: i64,
    pub resources: Vec<ResourceId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ScheduleStatus {
    Complete,
    /// Partial result; `missing` lists the activities that were never committed.
    Incomplete { missing: Vec<ActivityId> },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleViolation {
    #[error("entry refers to unknown activity {activity}")]
    UnknownActivity { activity: ActivityId },
    #[error("activity {activity} is scheduled more than once")]
    DuplicateActivity { activity: ActivityId },
    #[error("schedule is marked complete but activity {activity} is missing")]
    MissingActivity { activity: ActivityId },
    #[error("activity {activity} spans {actual} time units, expected {expected}")]
    DurationMismatch {
        activity: ActivityId,
        expected: i64,
        actual: i64,
    },
    #[error(
        "activity {successor} starts at {successor_start} before predecessor {predecessor} ends at {predecessor_end}"
    )]
    PrecedenceViolated {
        predecessor: ActivityId,
        successor: ActivityId,
        predecessor_end: i64,
        successor_start: i64,
    },
    #[error("activity {activity} is assigned unknown resource {resource}")]
    UnknownResource {
        activity: ActivityId,
        resource: ResourceId,
    },
    #[error("activity {activity} has {actual} resources, expected {expected}")]
    HeadcountMismatch {
        activity: ActivityId,
        expected: usize,
        actual: usize,
    },
    #[error("resource {resource} on activity {activity} holds none of its demanded skills")]
    UnskilledResource {
        activity: ActivityId,
        resource: ResourceId,
    },
    #[error("resource {resource} is double-booked by activities {first} and {second}")]
    ResourceOverlap {
        resource: ResourceId,
        first: ActivityId,
        second: ActivityId,
    },
}

/// Result of one scheduling run (one instance, one priority rule).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    rule: PriorityRule,
    relaxation_level: RelaxationLevel,
    status: ScheduleStatus,
    entries: Vec<ScheduleEntry>,
    attempts: Vec<LevelAttempt>,
}

impl Schedule {
    pub(crate) fn new(
        rule: PriorityRule,
        relaxation_level: RelaxationLevel,
        status: ScheduleStatus,
        entries: Vec<ScheduleEntry>,
        attempts: Vec<LevelAttempt>,
    ) -> Self {
        Self {
            rule,
            relaxation_level,
            status,
            entries,
            attempts,
        }
    }

    pub fn rule(&self) -> PriorityRule {
        self.rule
    }

    /// Level of the attempt this schedule came from.
    pub fn relaxation_level(&self) -> RelaxationLevel {
        self.relaxation_level
    }

    pub fn status(&self) -> &ScheduleStatus {
        &self.status
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.status, ScheduleStatus::Complete)
    }

    /// Entries in commit order.
    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    /// One record per relaxation level tried, in order.
    pub fn attempts(&self) -> &[LevelAttempt] {
        &self.attempts
    }

    pub fn entry_for(&self, activity: ActivityId) -> Option<&ScheduleEntry> {
        self.entries.iter().find(|entry| entry.activity == activity)
    }

    /// Latest end over committed entries; partial when the schedule is incomplete.
    pub fn makespan(&self) -> i64 {
        self.entries.iter().map(|entry| entry.end).max().unwrap_or(0)
    }

    /// Makespan only when every activity was scheduled.
    pub fn complete_makespan(&self) -> Option<i64> {
        self.is_complete().then(|| self.makespan())
    }

    /// Checks the schedule against `instance` and returns every violation found.
    pub fn verify(&self, instance: &ProjectInstance) -> Vec<ScheduleViolation> {
        let mut violations = Vec::new();
        let mut by_activity: Vec<Option<&ScheduleEntry>> = vec![None; instance.num_activities()];

        for entry in &self.entries {
            let Some(activity) = instance.activity(entry.activity) else {
                violations.push(ScheduleViolation::UnknownActivity {
                    activity: entry.activity,
                });
                continue;
            };
            if by_activity[entry.activity].is_some() {
                violations.push(ScheduleViolation::DuplicateActivity {
                    activity: entry.activity,
                });
                continue;
            }
            by_activity[entry.activity] = Some(entry);

            if entry.end - entry.start != activity.duration {
                violations.push(ScheduleViolation::DurationMismatch {
                    activity: entry.activity,
                    expected: activity.duration,
                    actual: entry.end - entry.start,
                });
            }

            let expected = if activity.is_dummy() {
                0
            } else {
                activity.total_demand() as usize
            };
            let distinct: HashSet<ResourceId> = entry.resources.iter().copied().collect();
            if entry.resources.len() != expected || distinct.len() != expected {
                violations.push(ScheduleViolation::HeadcountMismatch {
                    activity: entry.activity,
                    expected,
                    actual: distinct.len(),
                });
            }

            for &resource_id in &entry.resources {
                let Some(resource) = instance.resource(resource_id) else {
                    violations.push(ScheduleViolation::UnknownResource {
                        activity: entry.activity,
                        resource: resource_id,
                    });
                    continue;
                };
                if resource.covers(activity.demanded_skills()) == 0 {
                    violations.push(ScheduleViolation::UnskilledResource {
                        activity: entry.activity,
                        resource: resource_id,
                    });
                }
            }
        }

        if self.is_complete() {
            for (activity, entry) in by_activity.iter().enumerate() {
                if entry.is_none() {
                    violations.push(ScheduleViolation::MissingActivity { activity });
                }
            }
        }

        for activity in instance.activities() {
            let Some(pred_entry) = by_activity[activity.id] else {
                continue;
            };
            for &succ in &activity.successors {
                if let Some(succ_entry) = by_activity[succ] {
                    if succ_entry.start < pred_entry.end {
                        violations.push(ScheduleViolation::PrecedenceViolated {
                            predecessor: activity.id,
                            successor: succ,
                            predecessor_end: pred_entry.end,
                            successor_start: succ_entry.start,
                        });
                    }
                }
            }
        }

        violations.extend(self.resource_overlaps());
        violations
    }

    fn resource_overlaps(&self) -> Vec<ScheduleViolation> {
        let mut bookings: Vec<(ResourceId, i64, i64, ActivityId)> = self
            .entries
            .iter()
            .filter(|entry| entry.end > entry.start)
            .flat_map(|entry| {
                entry
                    .resources
                    .iter()
                    .map(move |&r| (r, entry.start, entry.end, entry.activity))
            })
            .collect();
        bookings.sort_unstable();

        let mut overlaps = Vec::new();
        // (resource, latest end so far, activity holding it)
        let mut reach: Option<(ResourceId, i64, ActivityId)> = None;
        for (resource, start, end, activity) in bookings {
            match reach {
                Some((r, reach_end, holder)) if r == resource => {
                    if start < reach_end {
                        overlaps.push(ScheduleViolation::ResourceOverlap {
                            resource,
                            first: holder,
                            second: activity,
                        });
                    }
                    if end > reach_end {
                        reach = Some((resource, end, activity));
                    }
                }
                _ => reach = Some((resource, end, activity)),
            }
        }
        overlaps
    }
}

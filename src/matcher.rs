//! Relaxation-aware assignment of skilled resources to one activity.

use crate::activity::Activity;
use crate::availability::{Interval, ResourceSchedule};
use crate::instance::ProjectInstance;
use crate::resource::{Resource, ResourceId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Progressively looser skill-matching rules, tried in declaration order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RelaxationLevel {
    /// Resource level must reach the required level.
    #[default]
    Strict,
    /// Resource level may fall one short of the requirement (never below 1).
    NearMiss,
    /// Any holder of the skill qualifies.
    LevelAgnostic,
    /// As `LevelAgnostic`, plus versatile resources may fill short slots.
    MultiUse,
}

impl RelaxationLevel {
    pub const ALL: [RelaxationLevel; 4] = [
        RelaxationLevel::Strict,
        RelaxationLevel::NearMiss,
        RelaxationLevel::LevelAgnostic,
        RelaxationLevel::MultiUse,
    ];

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(usize::from(index)).copied()
    }

    pub fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RelaxationLevel::Strict => "strict",
            RelaxationLevel::NearMiss => "near_miss",
            RelaxationLevel::LevelAgnostic => "level_agnostic",
            RelaxationLevel::MultiUse => "multi_use",
        }
    }

    /// Level test for one (resource level, required level) pair.
    ///
    /// NearMiss accepts `max(1, req - 1)` capped at `req`, so a zero
    /// requirement stays zero and NearMiss never rejects what Strict accepts.
    pub fn accepts_level(self, resource_level: u32, required: Option<u32>) -> bool {
        let Some(required) = required else {
            return true;
        };
        match self {
            RelaxationLevel::Strict => resource_level >= required,
            // One below the requirement, but never below 1 unless nothing is required.
            RelaxationLevel::NearMiss => {
                resource_level >= required.saturating_sub(1).max(1).min(required)
            }
            RelaxationLevel::LevelAgnostic | RelaxationLevel::MultiUse => true,
        }
    }

    pub fn allows_versatile_fillers(self) -> bool {
        self == RelaxationLevel::MultiUse
    }
}

impl fmt::Display for RelaxationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.index(), self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// Distinct resources covering every skill slot, in slot order.
    Feasible(Vec<ResourceId>),
    /// The first skill that could not be staffed.
    Infeasible {
        skill: usize,
        needed: usize,
        eligible: usize,
    },
}

impl MatchOutcome {
    pub fn is_feasible(&self) -> bool {
        matches!(self, MatchOutcome::Feasible(_))
    }

    pub fn into_resources(self) -> Option<Vec<ResourceId>> {
        match self {
            MatchOutcome::Feasible(resources) => Some(resources),
            MatchOutcome::Infeasible { .. } => None,
        }
    }
}

pub struct ResourceMatcher<'a> {
    resources: &'a [Resource],
}

impl<'a> ResourceMatcher<'a> {
    pub fn new(instance: &'a ProjectInstance) -> Self {
        Self {
            resources: instance.resources(),
        }
    }

    /// Finds distinct resources for every demanded skill of `activity` over
    /// `[start, start + duration)`. Nothing is booked; the caller records the
    /// intervals on success.
    ///
    /// Each resource fills at most one slot per activity, at every level.
    /// Under `MultiUse`, a resource holding at least two of the activity's
    /// demanded skills becomes eligible for any short slot, in ascending id
    /// order after the regular candidates.
    pub fn match_resources(
        &self,
        activity: &Activity,
        start: i64,
        schedule: &ResourceSchedule,
        level: RelaxationLevel,
    ) -> MatchOutcome {
        if activity.is_dummy() {
            return MatchOutcome::Feasible(Vec::new());
        }

        let window = Interval::new(start, start + activity.duration);
        let available: Vec<&Resource> = self
            .resources
            .iter()
            .filter(|resource| schedule.is_free(resource.id, window))
            .collect();
        let demanded: Vec<usize> = activity.demanded_skills().collect();

        let mut taken = vec![false; self.resources.len()];
        let mut assigned = Vec::with_capacity(activity.total_demand() as usize);

        for &skill in &demanded {
            let needed = activity.skill_requirements[skill] as usize;
            let required = activity.required_level(skill);

            let mut eligible: Vec<ResourceId> = available
                .iter()
                .filter(|resource| {
                    !taken[resource.id]
                        && resource.has_skill(skill)
                        && level.accepts_level(resource.level(skill), required)
                })
                .map(|resource| resource.id)
                .collect();

            if level.allows_versatile_fillers() && eligible.len() < needed {
                for resource in &available {
                    if eligible.len() >= needed {
                        break;
                    }
                    if taken[resource.id] || eligible.contains(&resource.id) {
                        continue;
                    }
                    if resource.covers(demanded.iter().copied()) >= 2 {
                        eligible.push(resource.id);
                    }
                }
            }

            if eligible.len() < needed {
                return MatchOutcome::Infeasible {
                    skill,
                    needed,
                    eligible: eligible.len(),
                };
            }

            for id in eligible.into_iter().take(needed) {
                taken[id] = true;
                assigned.push(id);
            }
        }

        MatchOutcome::Feasible(assigned)
    }
}

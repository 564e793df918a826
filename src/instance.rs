//! Immutable project model.
//!
//! A [`ProjectDefinition`] is the raw, serializable description handed over by a
//! loader. Converting it into a [`ProjectInstance`] checks every structural
//! invariant once, derives predecessor lists, rejects cyclic precedence and
//! caches the CPM time bounds on each activity.

use crate::activity::{Activity, ActivityId};
use crate::calculations::TimeBoundCalculator;
use crate::resource::{Resource, ResourceId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("header declares {declared} activities but {actual} were provided")]
    ActivityCountMismatch { declared: usize, actual: usize },
    #[error("header declares {declared} resources but {actual} were provided")]
    ResourceCountMismatch { declared: usize, actual: usize },
    #[error("activity {activity} has negative duration {duration}")]
    NegativeDuration { activity: ActivityId, duration: i64 },
    #[error("activity {activity} lists successor {successor}, outside 0..{count}")]
    SuccessorOutOfRange {
        activity: ActivityId,
        successor: ActivityId,
        count: usize,
    },
    #[error("activity {activity} lists itself as a successor")]
    SelfPrecedence { activity: ActivityId },
    #[error("activity {activity} has {actual} {field} entries, expected {expected}")]
    ActivitySkillLength {
        activity: ActivityId,
        field: &'static str,
        actual: usize,
        expected: usize,
    },
    #[error("resource {resource} has {actual} {field} entries, expected {expected}")]
    ResourceSkillLength {
        resource: ResourceId,
        field: &'static str,
        actual: usize,
        expected: usize,
    },
    #[error("precedence graph has a cycle through activity {activity} (members {members:?})")]
    Cycle {
        activity: ActivityId,
        members: Vec<ActivityId>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectHeader {
    pub num_activities: usize,
    pub num_resources: usize,
    pub num_skills: usize,
    pub num_levels: usize,
    pub base_deadline: i64,
    pub level_deadline: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityDefinition {
    pub duration: i64,
    /// 0-based successor ids.
    #[serde(default)]
    pub successors: Vec<ActivityId>,
    /// Headcount per skill; empty means no demand.
    #[serde(default)]
    pub skill_requirements: Vec<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_level_requirements: Option<Vec<u32>>,
}

impl ActivityDefinition {
    pub fn new(duration: i64, successors: Vec<ActivityId>) -> Self {
        Self {
            duration,
            successors,
            skill_requirements: Vec::new(),
            skill_level_requirements: None,
        }
    }

    pub fn with_requirements(mut self, skill_requirements: Vec<u32>) -> Self {
        self.skill_requirements = skill_requirements;
        self
    }

    pub fn with_level_requirements(mut self, levels: Vec<u32>) -> Self {
        self.skill_level_requirements = Some(levels);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDefinition {
    pub skills: Vec<bool>,
    #[serde(default)]
    pub skill_levels: Vec<u32>,
}

impl ResourceDefinition {
    pub fn new(skills: Vec<bool>, skill_levels: Vec<u32>) -> Self {
        Self {
            skills,
            skill_levels,
        }
    }
}

/// Serializable description of a project before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDefinition {
    pub header: ProjectHeader,
    pub activities: Vec<ActivityDefinition>,
    #[serde(default)]
    pub resources: Vec<ResourceDefinition>,
}

/// A validated project. Never mutated after construction; safe to share
/// across concurrent scheduling runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ProjectDefinition", into = "ProjectDefinition")]
pub struct ProjectInstance {
    header: ProjectHeader,
    activities: Vec<Activity>,
    resources: Vec<Resource>,
    topological_order: Vec<ActivityId>,
    horizon: i64,
}

impl ProjectInstance {
    pub fn new(definition: ProjectDefinition) -> Result<Self, StructuralError> {
        let ProjectDefinition {
            header,
            activities: activity_defs,
            resources: resource_defs,
        } = definition;

        if activity_defs.len() != header.num_activities {
            return Err(StructuralError::ActivityCountMismatch {
                declared: header.num_activities,
                actual: activity_defs.len(),
            });
        }
        if resource_defs.len() != header.num_resources {
            return Err(StructuralError::ResourceCountMismatch {
                declared: header.num_resources,
                actual: resource_defs.len(),
            });
        }

        let mut activities = activity_defs
            .into_iter()
            .enumerate()
            .map(|(id, def)| build_activity(id, def, &header))
            .collect::<Result<Vec<_>, _>>()?;

        // Predecessors are always derived, never taken from input.
        for id in 0..activities.len() {
            let successors = activities[id].successors.clone();
            for succ in successors {
                activities[succ].predecessors.push(id);
            }
        }

        let resources = resource_defs
            .into_iter()
            .enumerate()
            .map(|(id, def)| build_resource(id, def, header.num_skills))
            .collect::<Result<Vec<_>, _>>()?;

        let bounds = TimeBoundCalculator::new(&activities, header.level_deadline).compute()?;
        for (activity, window) in activities.iter_mut().zip(&bounds.windows) {
            activity.earliest_start = window.earliest_start;
            activity.earliest_finish = window.earliest_finish;
            activity.latest_start = window.latest_start;
            activity.latest_finish = window.latest_finish;
            activity.slack = window.slack;
        }

        Ok(Self {
            header,
            activities,
            resources,
            topological_order: bounds.topological_order,
            horizon: bounds.horizon,
        })
    }

    pub fn header(&self) -> &ProjectHeader {
        &self.header
    }

    pub fn num_activities(&self) -> usize {
        self.activities.len()
    }

    pub fn num_resources(&self) -> usize {
        self.resources.len()
    }

    pub fn num_skills(&self) -> usize {
        self.header.num_skills
    }

    pub fn num_levels(&self) -> usize {
        self.header.num_levels
    }

    pub fn base_deadline(&self) -> i64 {
        self.header.base_deadline
    }

    pub fn level_deadline(&self) -> i64 {
        self.header.level_deadline
    }

    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    pub fn activity(&self, id: ActivityId) -> Option<&Activity> {
        self.activities.get(id)
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn resource(&self, id: ResourceId) -> Option<&Resource> {
        self.resources.get(id)
    }

    pub fn topological_order(&self) -> &[ActivityId] {
        &self.topological_order
    }

    /// Deadline used to seed the backward pass.
    pub fn horizon(&self) -> i64 {
        self.horizon
    }

    /// Length of the longest precedence chain.
    pub fn critical_path_length(&self) -> i64 {
        self.activities
            .iter()
            .map(|a| a.earliest_finish)
            .max()
            .unwrap_or(0)
    }

    /// Zero-slack activities in topological order.
    pub fn critical_path(&self) -> Vec<ActivityId> {
        self.topological_order
            .iter()
            .copied()
            .filter(|&id| self.activities[id].is_critical())
            .collect()
    }

    pub fn to_definition(&self) -> ProjectDefinition {
        ProjectDefinition {
            header: self.header,
            activities: self
                .activities
                .iter()
                .map(|a| ActivityDefinition {
                    duration: a.duration,
                    successors: a.successors.clone(),
                    skill_requirements: a.skill_requirements.clone(),
                    skill_level_requirements: a.skill_level_requirements.clone(),
                })
                .collect(),
            resources: self
                .resources
                .iter()
                .map(|r| ResourceDefinition::new(r.skills.clone(), r.skill_levels.clone()))
                .collect(),
        }
    }
}

impl TryFrom<ProjectDefinition> for ProjectInstance {
    type Error = StructuralError;

    fn try_from(value: ProjectDefinition) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProjectInstance> for ProjectDefinition {
    fn from(value: ProjectInstance) -> Self {
        value.to_definition()
    }
}

fn build_activity(
    id: ActivityId,
    def: ActivityDefinition,
    header: &ProjectHeader,
) -> Result<Activity, StructuralError> {
    if def.duration < 0 {
        return Err(StructuralError::NegativeDuration {
            activity: id,
            duration: def.duration,
        });
    }

    let mut successors = def.successors;
    for &succ in &successors {
        if succ >= header.num_activities {
            return Err(StructuralError::SuccessorOutOfRange {
                activity: id,
                successor: succ,
                count: header.num_activities,
            });
        }
        if succ == id {
            return Err(StructuralError::SelfPrecedence { activity: id });
        }
    }
    successors.sort_unstable();
    successors.dedup();

    let skill_requirements = if def.skill_requirements.is_empty() {
        vec![0; header.num_skills]
    } else {
        def.skill_requirements
    };
    if skill_requirements.len() != header.num_skills {
        return Err(StructuralError::ActivitySkillLength {
            activity: id,
            field: "skill_requirements",
            actual: skill_requirements.len(),
            expected: header.num_skills,
        });
    }

    let skill_level_requirements = match def.skill_level_requirements {
        Some(levels) if levels.is_empty() => None,
        Some(levels) if levels.len() != header.num_skills => {
            return Err(StructuralError::ActivitySkillLength {
                activity: id,
                field: "skill_level_requirements",
                actual: levels.len(),
                expected: header.num_skills,
            });
        }
        other => other,
    };

    let mut activity = Activity::new(id, def.duration);
    activity.successors = successors;
    activity.skill_requirements = skill_requirements;
    activity.skill_level_requirements = skill_level_requirements;
    Ok(activity)
}

fn build_resource(
    id: ResourceId,
    def: ResourceDefinition,
    num_skills: usize,
) -> Result<Resource, StructuralError> {
    if def.skills.len() != num_skills {
        return Err(StructuralError::ResourceSkillLength {
            resource: id,
            field: "skills",
            actual: def.skills.len(),
            expected: num_skills,
        });
    }
    let skill_levels = if def.skill_levels.is_empty() {
        vec![0; num_skills]
    } else {
        def.skill_levels
    };
    if skill_levels.len() != num_skills {
        return Err(StructuralError::ResourceSkillLength {
            resource: id,
            field: "skill_levels",
            actual: skill_levels.len(),
            expected: num_skills,
        });
    }
    Ok(Resource::new(id, def.skills, skill_levels))
}

use serde::{Deserialize, Serialize};

/// 0-based activity identifier.
pub type ActivityId = usize;

/// One activity of a project, with the CPM bounds cached at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: ActivityId,
    pub duration: i64,
    pub successors: Vec<ActivityId>,
    pub predecessors: Vec<ActivityId>,
    /// Required headcount per skill index.
    pub skill_requirements: Vec<u32>,
    /// Minimum proficiency per skill index. `None` accepts any level.
    pub skill_level_requirements: Option<Vec<u32>>,
    pub earliest_start: i64,
    pub earliest_finish: i64,
    pub latest_start: i64,
    pub latest_finish: i64,
    pub slack: i64,
}

impl Activity {
    pub fn new(id: ActivityId, duration: i64) -> Self {
        Self {
            id,
            duration,
            successors: Vec::new(),
            predecessors: Vec::new(),
            skill_requirements: Vec::new(),
            skill_level_requirements: None,
            earliest_start: 0,
            earliest_finish: duration,
            latest_start: 0,
            latest_finish: duration,
            slack: 0,
        }
    }

    /// Sum of the per-skill headcounts.
    pub fn total_demand(&self) -> u32 {
        self.skill_requirements.iter().sum()
    }

    /// Skill indices with a positive headcount, ascending.
    pub fn demanded_skills(&self) -> impl Iterator<Item = usize> + '_ {
        self.skill_requirements
            .iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .map(|(skill, _)| skill)
    }

    pub fn required_level(&self, skill: usize) -> Option<u32> {
        self.skill_level_requirements
            .as_ref()
            .and_then(|levels| levels.get(skill).copied())
    }

    /// Zero-duration or zero-demand activities need no resources.
    pub fn is_dummy(&self) -> bool {
        self.duration == 0 || self.total_demand() == 0
    }

    pub fn is_critical(&self) -> bool {
        self.slack == 0
    }
}

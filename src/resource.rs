use serde::{Deserialize, Serialize};

/// 0-based resource identifier.
pub type ResourceId = usize;

/// A skilled worker (person, crew, machine) that can be assigned to activities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    /// Whether the resource can ever perform each skill.
    pub skills: Vec<bool>,
    /// Proficiency per skill. Only meaningful where `skills[k]` is true.
    #[serde(default)]
    pub skill_levels: Vec<u32>,
}

impl Resource {
    pub fn new(id: ResourceId, skills: Vec<bool>, skill_levels: Vec<u32>) -> Self {
        Self {
            id,
            skills,
            skill_levels,
        }
    }

    pub fn has_skill(&self, skill: usize) -> bool {
        self.skills.get(skill).copied().unwrap_or(false)
    }

    /// Proficiency for `skill`, 0 when no level was recorded.
    pub fn level(&self, skill: usize) -> u32 {
        self.skill_levels.get(skill).copied().unwrap_or(0)
    }

    pub fn skill_count(&self) -> usize {
        self.skills.iter().filter(|has| **has).count()
    }

    /// Number of the given skills this resource holds.
    pub fn covers<I>(&self, skills: I) -> usize
    where
        I: IntoIterator<Item = usize>,
    {
        skills.into_iter().filter(|&k| self.has_skill(k)).count()
    }
}

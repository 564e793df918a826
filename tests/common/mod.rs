#![allow(dead_code)]

use skill_schedule::{
    ActivityDefinition, ProjectDefinition, ProjectHeader, ProjectInstance, ResourceDefinition,
};

pub const EIGHT_DURATIONS: [i64; 8] = [2, 3, 1, 4, 2, 3, 1, 2];

pub fn header(
    num_activities: usize,
    num_resources: usize,
    num_skills: usize,
    level_deadline: i64,
) -> ProjectHeader {
    ProjectHeader {
        num_activities,
        num_resources,
        num_skills,
        num_levels: 3,
        base_deadline: level_deadline,
        level_deadline,
    }
}

/// Resource holding every listed skill at `level`.
pub fn resource(num_skills: usize, skills: &[usize], level: u32) -> ResourceDefinition {
    let mut flags = vec![false; num_skills];
    let mut levels = vec![0; num_skills];
    for &skill in skills {
        flags[skill] = true;
        levels[skill] = level;
    }
    ResourceDefinition::new(flags, levels)
}

/// 0 -> {1, 2}, 1 -> 3, 2 -> {4, 5}, 3 -> 6, 4 -> 7, 5 -> 7; every activity
/// needs one holder of skill 0 and `workers` resources hold it.
pub fn eight_activity_definition(workers: usize) -> ProjectDefinition {
    let successors: [Vec<usize>; 8] = [
        vec![1, 2],
        vec![3],
        vec![4, 5],
        vec![6],
        vec![7],
        vec![7],
        vec![],
        vec![],
    ];
    let activities = EIGHT_DURATIONS
        .iter()
        .zip(successors)
        .map(|(&d, succ)| ActivityDefinition::new(d, succ).with_requirements(vec![1]))
        .collect();
    ProjectDefinition {
        header: header(8, workers, 1, 0),
        activities,
        resources: (0..workers).map(|_| resource(1, &[0], 1)).collect(),
    }
}

pub fn eight_activity_instance(workers: usize) -> ProjectInstance {
    ProjectInstance::new(eight_activity_definition(workers)).expect("valid instance")
}

/// Independent activities of the given durations, each needing one holder
/// of skill 0, served by a single resource.
pub fn single_worker_instance(durations: &[i64]) -> ProjectInstance {
    let activities = durations
        .iter()
        .map(|&d| ActivityDefinition::new(d, vec![]).with_requirements(vec![1]))
        .collect();
    ProjectInstance::new(ProjectDefinition {
        header: header(durations.len(), 1, 1, 0),
        activities,
        resources: vec![resource(1, &[0], 1)],
    })
    .expect("valid instance")
}

pub const SMALL_MSRCP: &str = r"\* Project Module *\
4 3 2 3
10
12
2 2 2 3
3 1 4
1 1 4
2 0
\* Workforce Module *\
1 0
0 1
1 1
\* Workforce Module with Skill Levels *\
2 0
0 1
1 3
\* Skill Requirements Module *\
1 0
1 1
0 1
0 0
\* Skill Level Requirements Module *\
2 0
-1
0 2
-1
";

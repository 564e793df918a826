mod common;

use common::{header, resource};
use skill_schedule::{
    ActivityDefinition, Interval, MatchOutcome, ProjectDefinition, ProjectInstance,
    RelaxationLevel, ResourceMatcher, ResourceSchedule,
};

/// One activity of duration 3 with the given requirements, and the given
/// resources.
fn single_activity(
    num_skills: usize,
    requirements: Vec<u32>,
    levels: Option<Vec<u32>>,
    resources: Vec<skill_schedule::ResourceDefinition>,
) -> ProjectInstance {
    let mut activity = ActivityDefinition::new(3, vec![]).with_requirements(requirements);
    if let Some(levels) = levels {
        activity = activity.with_level_requirements(levels);
    }
    ProjectInstance::new(ProjectDefinition {
        header: header(1, resources.len(), num_skills, 0),
        activities: vec![activity],
        resources,
    })
    .unwrap()
}

fn try_match(instance: &ProjectInstance, level: RelaxationLevel) -> MatchOutcome {
    let schedule = ResourceSchedule::new(instance.num_resources());
    ResourceMatcher::new(instance).match_resources(&instance.activities()[0], 0, &schedule, level)
}

#[test]
fn strict_requires_the_full_level() {
    let instance = single_activity(
        2,
        vec![1, 0],
        Some(vec![3, 0]),
        vec![resource(2, &[0], 2), resource(2, &[0], 3)],
    );
    assert_eq!(
        try_match(&instance, RelaxationLevel::Strict),
        MatchOutcome::Feasible(vec![1])
    );
}

#[test]
fn near_miss_accepts_one_level_short() {
    let instance = single_activity(2, vec![1, 0], Some(vec![3, 0]), vec![resource(2, &[0], 2)]);
    assert!(!try_match(&instance, RelaxationLevel::Strict).is_feasible());
    assert_eq!(
        try_match(&instance, RelaxationLevel::NearMiss),
        MatchOutcome::Feasible(vec![0])
    );
}

#[test]
fn level_agnostic_accepts_any_holder() {
    let instance = single_activity(2, vec![1, 0], Some(vec![3, 0]), vec![resource(2, &[0], 1)]);
    assert!(!try_match(&instance, RelaxationLevel::NearMiss).is_feasible());
    assert!(try_match(&instance, RelaxationLevel::LevelAgnostic).is_feasible());
}

#[test]
fn a_resource_fills_one_slot_per_activity() {
    // One resource holds both demanded skills; two distinct resources are needed.
    let instance = single_activity(2, vec![1, 1], None, vec![resource(2, &[0, 1], 1)]);
    for level in RelaxationLevel::ALL {
        assert_eq!(
            try_match(&instance, level),
            MatchOutcome::Infeasible {
                skill: 1,
                needed: 1,
                eligible: 0
            },
            "level {level}"
        );
    }
}

#[test]
fn multi_use_lets_versatile_resources_fill_short_skills() {
    let instance = single_activity(
        3,
        vec![1, 1, 1],
        None,
        vec![
            resource(3, &[0, 1], 1),
            resource(3, &[0, 1], 1),
            resource(3, &[0, 1], 1),
        ],
    );
    assert_eq!(
        try_match(&instance, RelaxationLevel::LevelAgnostic),
        MatchOutcome::Infeasible {
            skill: 2,
            needed: 1,
            eligible: 0
        }
    );
    assert_eq!(
        try_match(&instance, RelaxationLevel::MultiUse),
        MatchOutcome::Feasible(vec![0, 1, 2])
    );
}

#[test]
fn busy_resources_are_skipped() {
    let instance = single_activity(1, vec![1], None, vec![resource(1, &[0], 1), resource(1, &[0], 1)]);
    let mut schedule = ResourceSchedule::new(2);
    assert!(schedule.reserve(0, Interval::new(2, 4)));
    let matcher = ResourceMatcher::new(&instance);
    let activity = &instance.activities()[0];
    assert_eq!(
        matcher.match_resources(activity, 0, &schedule, RelaxationLevel::Strict),
        MatchOutcome::Feasible(vec![1])
    );
    // [4, 7) is clear of the booking on resource 0 again.
    assert_eq!(
        matcher.match_resources(activity, 4, &schedule, RelaxationLevel::Strict),
        MatchOutcome::Feasible(vec![0])
    );
}

#[test]
fn activity_without_demand_needs_no_resources() {
    let instance = single_activity(1, vec![0], None, vec![]);
    assert_eq!(
        try_match(&instance, RelaxationLevel::Strict),
        MatchOutcome::Feasible(vec![])
    );
}

mod common;

use common::{SMALL_MSRCP, eight_activity_instance};
use skill_schedule::persistence::{load_schedule_entries_from_csv, load_schedule_from_json};
use skill_schedule::{
    GreedyScheduler, PersistenceError, PriorityRule, RelaxationLevel, load_instance,
    save_instance_to_json, save_schedule_to_csv, save_schedule_to_json,
};
use std::fs;
use tempfile::tempdir;

#[test]
fn msrcp_file_loads_into_a_validated_instance() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("small.msrcp");
    fs::write(&path, SMALL_MSRCP).unwrap();

    let instance = load_instance(&path).unwrap();
    assert_eq!(instance.num_activities(), 4);
    assert_eq!(instance.num_resources(), 3);
    assert_eq!(instance.base_deadline(), 10);
    assert_eq!(instance.level_deadline(), 12);
    assert_eq!(instance.activities()[0].successors, vec![1, 2]);
    assert_eq!(instance.activities()[3].predecessors, vec![1, 2]);
    assert_eq!(instance.activities()[2].skill_level_requirements, Some(vec![0, 2]));
    assert_eq!(instance.activities()[1].skill_level_requirements, None);
    assert_eq!(instance.resources()[2].skill_levels, vec![1, 3]);
    assert_eq!(instance.horizon(), 12);
}

#[test]
fn loaded_instance_schedules_at_strict_level() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("small.msrcp");
    fs::write(&path, SMALL_MSRCP).unwrap();
    let instance = load_instance(&path).unwrap();

    let schedule = GreedyScheduler::new(&instance).schedule(PriorityRule::Eft);
    assert!(schedule.is_complete());
    assert_eq!(schedule.relaxation_level(), RelaxationLevel::Strict);
    assert_eq!(schedule.makespan(), 7);
    assert_eq!(schedule.entry_for(0).unwrap().resources, vec![0]);
    assert_eq!(schedule.entry_for(1).unwrap().resources, vec![0, 1]);
    assert_eq!(schedule.entry_for(2).unwrap().resources, vec![2]);
    assert!(schedule.entry_for(3).unwrap().resources.is_empty());
    assert!(schedule.verify(&instance).is_empty());
}

#[test]
fn instance_json_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("project.json");
    let instance = eight_activity_instance(3);
    save_instance_to_json(&instance, &path).unwrap();
    let reloaded = load_instance(&path).unwrap();
    assert_eq!(reloaded, instance);
}

#[test]
fn schedule_exports_to_json_and_csv() {
    let dir = tempdir().unwrap();
    let instance = eight_activity_instance(2);
    let schedule = GreedyScheduler::new(&instance).schedule(PriorityRule::Lft);

    let json_path = dir.path().join("schedule.json");
    save_schedule_to_json(&schedule, &json_path).unwrap();
    assert_eq!(load_schedule_from_json(&json_path).unwrap(), schedule);

    let csv_path = dir.path().join("schedule.csv");
    save_schedule_to_csv(&schedule, &csv_path).unwrap();
    let text = fs::read_to_string(&csv_path).unwrap();
    assert!(text.starts_with("activity,start,end,resources"));
    let mut entries = load_schedule_entries_from_csv(&csv_path).unwrap();
    entries.sort_by_key(|e| e.activity);
    let mut expected = schedule.entries().to_vec();
    expected.sort_by_key(|e| e.activity);
    assert_eq!(entries, expected);
}

#[test]
fn unknown_extension_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("project.txt");
    fs::write(&path, SMALL_MSRCP).unwrap();
    assert!(matches!(
        load_instance(&path),
        Err(PersistenceError::UnsupportedFormat(ext)) if ext == "txt"
    ));
}

#[test]
fn structural_errors_surface_through_the_loader() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cyclic.msrcp");
    fs::write(
        &path,
        "\\* Project Module *\\\n2 0 0 0\n5\n5\n1 1 2\n1 1 1\n",
    )
    .unwrap();
    assert!(matches!(
        load_instance(&path),
        Err(PersistenceError::Structural(_))
    ));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempdir().unwrap();
    assert!(matches!(
        load_instance(dir.path().join("absent.msrcp")),
        Err(PersistenceError::Io(_))
    ));
}

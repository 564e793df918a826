mod common;

use common::{eight_activity_instance, single_worker_instance};
use skill_schedule::{
    BatchConfig, EngineConfig, FeatureVector, PriorityRule, SchedulerConfig, evaluate_batch,
    evaluate_rules, save_batch_report_to_csv,
};
use std::fs;
use tempfile::tempdir;

#[test]
fn batch_keeps_input_order_and_picks_best_rules() {
    let instances = vec![
        ("eight".to_string(), eight_activity_instance(2)),
        ("serial".to_string(), single_worker_instance(&[2, 3, 4])),
    ];
    let config = EngineConfig {
        scheduler: SchedulerConfig::default(),
        batch: BatchConfig {
            workers: Some(2),
            rules: Some(vec!["EFT".into(), "lft".into()]),
        },
    };
    let report = evaluate_batch(&instances, &config).unwrap();

    let order: Vec<(&str, PriorityRule)> = report
        .runs
        .iter()
        .map(|run| (run.instance.as_str(), run.rule))
        .collect();
    assert_eq!(
        order,
        vec![
            ("eight", PriorityRule::Eft),
            ("eight", PriorityRule::Lft),
            ("serial", PriorityRule::Eft),
            ("serial", PriorityRule::Lft),
        ]
    );
    assert!(report.runs.iter().all(|run| run.complete));

    let best = report.best_by_instance();
    assert_eq!(best.len(), 2);
    assert_eq!(best[1].instance, "serial");
    assert_eq!(best[1].makespan, Some(9));
}

#[test]
fn batch_rejects_unknown_rules() {
    let instances = vec![("eight".to_string(), eight_activity_instance(2))];
    let config = EngineConfig {
        batch: BatchConfig {
            workers: Some(1),
            rules: Some(vec!["FIFO".into()]),
        },
        ..EngineConfig::default()
    };
    assert!(evaluate_batch(&instances, &config).is_err());
}

#[test]
fn parallel_runs_match_sequential_runs() {
    let instance = eight_activity_instance(2);
    let results =
        evaluate_rules("eight", &instance, &PriorityRule::ALL, &SchedulerConfig::default())
            .unwrap();
    assert_eq!(results.len(), PriorityRule::ALL.len());
    for ((summary, schedule), rule) in results.iter().zip(PriorityRule::ALL) {
        assert_eq!(summary.rule, rule);
        assert_eq!(schedule.rule(), rule);
        let sequential = skill_schedule::GreedyScheduler::new(&instance).schedule(rule);
        assert_eq!(schedule.entries(), sequential.entries());
        assert_eq!(summary.makespan, sequential.complete_makespan());
    }
}

#[test]
fn report_csv_has_one_row_per_run() {
    let instances = vec![("serial".to_string(), single_worker_instance(&[1, 1]))];
    let report = evaluate_batch(&instances, &EngineConfig::default()).unwrap();
    let dir = tempdir().unwrap();
    let path = dir.path().join("report.csv");
    save_batch_report_to_csv(&report, &path).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("instance,rule,makespan,complete,relaxation_level,scheduled,elapsed_ms")
    );
    assert_eq!(lines.count(), PriorityRule::ALL.len());
}

#[test]
fn feature_vector_describes_the_instance() {
    let instance = eight_activity_instance(2);
    let features = FeatureVector::from_instance(&instance);
    assert_eq!(features.len(), skill_schedule::FEATURE_NAMES.len());
    assert_eq!(features.get("n_activities"), Some(8.0));
    assert_eq!(features.get("n_resources"), Some(2.0));
    assert_eq!(features.get("total_duration"), Some(18.0));
    assert_eq!(features.get("start_nodes_ratio"), Some(1.0 / 8.0));
    assert_eq!(features.get("end_nodes_ratio"), Some(2.0 / 8.0));
    assert_eq!(features.get("project_duration_est"), Some(10.0));
    assert_eq!(features.get("critical_activities_ratio"), Some(0.5));
    assert_eq!(features.get("no_such_feature"), None);

    let json = serde_json::to_value(&features).unwrap();
    assert_eq!(json["avg_skill_coverage"], 2.0);
}

//! Tabular views of instances, schedules and batch results.

use crate::batch::BatchReport;
use crate::instance::ProjectInstance;
use crate::schedule::Schedule;
use polars::prelude::*;

/// One row per activity with its CPM window.
pub fn time_bounds_frame(instance: &ProjectInstance) -> PolarsResult<DataFrame> {
    let activities = instance.activities();
    let ids: Vec<u64> = activities.iter().map(|a| a.id as u64).collect();
    let durations: Vec<i64> = activities.iter().map(|a| a.duration).collect();
    let es: Vec<i64> = activities.iter().map(|a| a.earliest_start).collect();
    let ef: Vec<i64> = activities.iter().map(|a| a.earliest_finish).collect();
    let ls: Vec<i64> = activities.iter().map(|a| a.latest_start).collect();
    let lf: Vec<i64> = activities.iter().map(|a| a.latest_finish).collect();
    let float: Vec<i64> = activities.iter().map(|a| a.slack).collect();
    let critical: Vec<bool> = activities.iter().map(|a| a.is_critical()).collect();

    DataFrame::new(vec![
        Series::new(PlSmallStr::from_static("activity"), ids).into_column(),
        Series::new(PlSmallStr::from_static("duration"), durations).into_column(),
        Series::new(PlSmallStr::from_static("early_start"), es).into_column(),
        Series::new(PlSmallStr::from_static("early_finish"), ef).into_column(),
        Series::new(PlSmallStr::from_static("late_start"), ls).into_column(),
        Series::new(PlSmallStr::from_static("late_finish"), lf).into_column(),
        Series::new(PlSmallStr::from_static("total_float"), float).into_column(),
        Series::new(PlSmallStr::from_static("is_critical"), critical).into_column(),
    ])
}

/// Entries sorted by start then activity id.
pub fn schedule_frame(schedule: &Schedule) -> PolarsResult<DataFrame> {
    let mut entries: Vec<_> = schedule.entries().iter().collect();
    entries.sort_by_key(|entry| (entry.start, entry.activity));

    let ids: Vec<u64> = entries.iter().map(|e| e.activity as u64).collect();
    let starts: Vec<i64> = entries.iter().map(|e| e.start).collect();
    let ends: Vec<i64> = entries.iter().map(|e| e.end).collect();
    let resources: Vec<String> = entries
        .iter()
        .map(|e| {
            e.resources
                .iter()
                .map(|r| r.to_string())
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect();

    DataFrame::new(vec![
        Series::new(PlSmallStr::from_static("activity"), ids).into_column(),
        Series::new(PlSmallStr::from_static("start"), starts).into_column(),
        Series::new(PlSmallStr::from_static("end"), ends).into_column(),
        Series::new(PlSmallStr::from_static("resources"), resources).into_column(),
    ])
}

/// One row per run; incomplete runs have a null makespan.
pub fn comparison_frame(report: &BatchReport) -> PolarsResult<DataFrame> {
    let runs = &report.runs;
    let instances: Vec<&str> = runs.iter().map(|r| r.instance.as_str()).collect();
    let rules: Vec<&str> = runs.iter().map(|r| r.rule.name()).collect();
    let makespans: Vec<Option<i64>> = runs.iter().map(|r| r.makespan).collect();
    let complete: Vec<bool> = runs.iter().map(|r| r.complete).collect();
    let levels: Vec<&str> = runs.iter().map(|r| r.relaxation_level.as_str()).collect();
    let elapsed: Vec<u64> = runs.iter().map(|r| r.elapsed_ms).collect();

    DataFrame::new(vec![
        Series::new(PlSmallStr::from_static("instance"), instances).into_column(),
        Series::new(PlSmallStr::from_static("rule"), rules).into_column(),
        Series::new(PlSmallStr::from_static("makespan"), makespans).into_column(),
        Series::new(PlSmallStr::from_static("complete"), complete).into_column(),
        Series::new(PlSmallStr::from_static("relaxation_level"), levels).into_column(),
        Series::new(PlSmallStr::from_static("elapsed_ms"), elapsed).into_column(),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::RunSummary;
    use crate::matcher::RelaxationLevel;
    use crate::priority::PriorityRule;

    #[test]
    fn comparison_frame_keeps_nulls_for_incomplete_runs() {
        let report = BatchReport::new(vec![
            RunSummary {
                instance: "a".into(),
                rule: PriorityRule::Lft,
                makespan: Some(12),
                complete: true,
                relaxation_level: RelaxationLevel::Strict,
                scheduled: 4,
                elapsed_ms: 1,
            },
            RunSummary {
                instance: "a".into(),
                rule: PriorityRule::Eft,
                makespan: None,
                complete: false,
                relaxation_level: RelaxationLevel::MultiUse,
                scheduled: 2,
                elapsed_ms: 1,
            },
        ]);
        let df = comparison_frame(&report).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.column("makespan").unwrap().null_count(), 1);
    }
}

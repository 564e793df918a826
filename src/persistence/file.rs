use super::{PersistenceError, PersistenceResult};
use crate::batch::{BatchReport, RunSummary};
use crate::instance::{ProjectDefinition, ProjectInstance};
use crate::schedule::{Schedule, ScheduleEntry};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

pub fn load_definition_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<ProjectDefinition> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(file)?)
}

pub fn save_instance_to_json<P: AsRef<Path>>(
    instance: &ProjectInstance,
    path: P,
) -> PersistenceResult<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &instance.to_definition())?;
    Ok(())
}

pub fn save_schedule_to_json<P: AsRef<Path>>(schedule: &Schedule, path: P) -> PersistenceResult<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, schedule)?;
    Ok(())
}

pub fn load_schedule_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<Schedule> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(file)?)
}

pub fn save_batch_report_to_json<P: AsRef<Path>>(
    report: &BatchReport,
    path: P,
) -> PersistenceResult<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, report)?;
    Ok(())
}

#[derive(Serialize, Deserialize)]
struct EntryCsvRecord {
    activity: usize,
    start: i64,
    end: i64,
    resources: String,
}

impl From<&ScheduleEntry> for EntryCsvRecord {
    fn from(entry: &ScheduleEntry) -> Self {
        Self {
            activity: entry.activity,
            start: entry.start,
            end: entry.end,
            resources: join_ids(&entry.resources),
        }
    }
}

impl EntryCsvRecord {
    fn into_entry(self) -> PersistenceResult<ScheduleEntry> {
        Ok(ScheduleEntry {
            activity: self.activity,
            start: self.start,
            end: self.end,
            resources: split_ids(&self.resources)?,
        })
    }
}

/// Writes one row per entry, sorted by start then activity id.
pub fn save_schedule_to_csv<P: AsRef<Path>>(schedule: &Schedule, path: P) -> PersistenceResult<()> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    let mut entries: Vec<&ScheduleEntry> = schedule.entries().iter().collect();
    entries.sort_by_key(|entry| (entry.start, entry.activity));
    for entry in entries {
        writer.serialize(EntryCsvRecord::from(entry))?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads entries written by [`save_schedule_to_csv`]. The CSV carries no
/// rule or status, so only the entries come back.
pub fn load_schedule_entries_from_csv<P: AsRef<Path>>(
    path: P,
) -> PersistenceResult<Vec<ScheduleEntry>> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut entries = Vec::new();
    for record in reader.deserialize::<EntryCsvRecord>() {
        entries.push(record?.into_entry()?);
    }
    Ok(entries)
}

#[derive(Serialize)]
struct RunCsvRecord<'a> {
    instance: &'a str,
    rule: &'static str,
    makespan: Option<i64>,
    complete: bool,
    relaxation_level: &'static str,
    scheduled: usize,
    elapsed_ms: u64,
}

impl<'a> From<&'a RunSummary> for RunCsvRecord<'a> {
    fn from(run: &'a RunSummary) -> Self {
        Self {
            instance: &run.instance,
            rule: run.rule.name(),
            makespan: run.makespan,
            complete: run.complete,
            relaxation_level: run.relaxation_level.as_str(),
            scheduled: run.scheduled,
            elapsed_ms: run.elapsed_ms,
        }
    }
}

pub fn save_batch_report_to_csv<P: AsRef<Path>>(
    report: &BatchReport,
    path: P,
) -> PersistenceResult<()> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for run in &report.runs {
        writer.serialize(RunCsvRecord::from(run))?;
    }
    writer.flush()?;
    Ok(())
}

fn join_ids(ids: &[usize]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(";")
}

fn split_ids(value: &str) -> PersistenceResult<Vec<usize>> {
    if value.trim().is_empty() {
        return Ok(Vec::new());
    }
    value
        .split(';')
        .map(|part| {
            part.trim().parse::<usize>().map_err(|_| {
                PersistenceError::InvalidData(format!("invalid resource id '{part}'"))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_lists_round_trip() {
        assert_eq!(join_ids(&[3, 0, 7]), "3;0;7");
        assert_eq!(split_ids("3;0;7").unwrap(), vec![3, 0, 7]);
        assert!(split_ids("").unwrap().is_empty());
        assert!(split_ids("1;x").is_err());
    }
}

//! Cross-run evaluation: every selected rule against every instance.

use crate::config::{ConfigError, EngineConfig, SchedulerConfig};
use crate::instance::ProjectInstance;
use crate::matcher::RelaxationLevel;
use crate::priority::PriorityRule;
use crate::schedule::Schedule;
use crate::scheduler::GreedyScheduler;
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum BatchError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Outcome of one (instance, rule) run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub instance: String,
    pub rule: PriorityRule,
    /// `None` when the schedule is incomplete.
    pub makespan: Option<i64>,
    pub complete: bool,
    pub relaxation_level: RelaxationLevel,
    pub scheduled: usize,
    pub elapsed_ms: u64,
}

impl RunSummary {
    pub fn from_schedule(instance: &str, schedule: &Schedule, elapsed_ms: u64) -> Self {
        Self {
            instance: instance.to_string(),
            rule: schedule.rule(),
            makespan: schedule.complete_makespan(),
            complete: schedule.is_complete(),
            relaxation_level: schedule.relaxation_level(),
            scheduled: schedule.entries().len(),
            elapsed_ms,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub generated_at: DateTime<Utc>,
    pub runs: Vec<RunSummary>,
}

impl BatchReport {
    pub fn new(runs: Vec<RunSummary>) -> Self {
        Self {
            generated_at: Utc::now(),
            runs,
        }
    }

    /// Best complete run per instance (smallest makespan, ties by canonical
    /// rule order), in order of first appearance. Instances without any
    /// complete run are left out.
    pub fn best_by_instance(&self) -> Vec<&RunSummary> {
        let mut best: Vec<&RunSummary> = Vec::new();
        for run in &self.runs {
            let Some(makespan) = run.makespan else {
                continue;
            };
            match best.iter_mut().find(|b| b.instance == run.instance) {
                Some(current) => {
                    let current_key = (current.makespan, rule_rank(current.rule));
                    if (Some(makespan), rule_rank(run.rule)) < current_key {
                        *current = run;
                    }
                }
                None => best.push(run),
            }
        }
        best
    }
}

fn rule_rank(rule: PriorityRule) -> usize {
    PriorityRule::ALL
        .iter()
        .position(|r| *r == rule)
        .unwrap_or(PriorityRule::ALL.len())
}

/// Runs `rules` against one instance on the current rayon pool. Results keep
/// the order of `rules`.
pub fn evaluate_rules(
    name: &str,
    instance: &ProjectInstance,
    rules: &[PriorityRule],
    config: &SchedulerConfig,
) -> Result<Vec<(RunSummary, Schedule)>, ConfigError> {
    let scheduler = GreedyScheduler::with_config(instance, config.clone())?;
    let results = rules
        .par_iter()
        .map(|&rule| {
            let started = Instant::now();
            let schedule = scheduler.schedule(rule);
            let elapsed_ms = started.elapsed().as_millis() as u64;
            (RunSummary::from_schedule(name, &schedule, elapsed_ms), schedule)
        })
        .collect();
    Ok(results)
}

/// Evaluates every configured rule on every named instance using a dedicated
/// pool of `config.batch` workers.
pub fn evaluate_batch(
    instances: &[(String, ProjectInstance)],
    config: &EngineConfig,
) -> Result<BatchReport, BatchError> {
    config.validate()?;
    let rules = config.batch.selected_rules().map_err(ConfigError::from)?;
    let workers = config.batch.worker_count();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()?;

    let started = Instant::now();
    let per_instance: Vec<Vec<RunSummary>> = pool.install(|| {
        instances
            .par_iter()
            .map(|(name, instance)| {
                evaluate_rules(name, instance, &rules, &config.scheduler).map(|results| {
                    results
                        .into_iter()
                        .map(|(summary, _)| summary)
                        .collect::<Vec<_>>()
                })
            })
            .collect::<Result<_, _>>()
    })?;

    let runs: Vec<RunSummary> = per_instance.into_iter().flatten().collect();
    info!(
        instances = instances.len(),
        rules = rules.len(),
        workers,
        complete = runs.iter().filter(|run| run.complete).count(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "batch finished"
    );
    Ok(BatchReport::new(runs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(instance: &str, rule: PriorityRule, makespan: Option<i64>) -> RunSummary {
        RunSummary {
            instance: instance.to_string(),
            rule,
            makespan,
            complete: makespan.is_some(),
            relaxation_level: RelaxationLevel::Strict,
            scheduled: 0,
            elapsed_ms: 0,
        }
    }

    #[test]
    fn best_by_instance_prefers_smaller_makespan_then_rule_order() {
        let report = BatchReport::new(vec![
            summary("a", PriorityRule::Eft, Some(10)),
            summary("a", PriorityRule::Lft, Some(10)),
            summary("a", PriorityRule::Mts, None),
            summary("b", PriorityRule::Hrpw, None),
            summary("c", PriorityRule::Stfd, Some(9)),
            summary("c", PriorityRule::Hru1, Some(7)),
        ]);
        let best = report.best_by_instance();
        assert_eq!(best.len(), 2);
        assert_eq!(best[0].instance, "a");
        assert_eq!(best[0].rule, PriorityRule::Lft);
        assert_eq!(best[1].instance, "c");
        assert_eq!(best[1].rule, PriorityRule::Hru1);
    }
}

//! Numeric description of an instance, consumed by rule recommenders.
//!
//! The vector has a fixed layout ([`FEATURE_NAMES`]) so that any external
//! model trained on it sees the same columns for every instance. Standard
//! deviations are population deviations.

use crate::instance::ProjectInstance;
use serde::ser::{Serialize, SerializeMap, Serializer};

pub const FEATURE_NAMES: [&str; 43] = [
    // structure
    "n_activities",
    "n_resources",
    "n_skills",
    "activities_per_resource",
    "skills_per_resource",
    "resource_density",
    "avg_duration",
    "std_duration",
    "min_duration",
    "max_duration",
    "total_duration",
    "duration_range",
    "duration_cv",
    // precedence network
    "network_density",
    "avg_in_degree",
    "max_in_degree",
    "std_in_degree",
    "avg_out_degree",
    "max_out_degree",
    "std_out_degree",
    "network_complexity",
    "start_nodes_ratio",
    "end_nodes_ratio",
    // skills
    "avg_skills_per_activity",
    "max_skills_per_activity",
    "min_skills_per_activity",
    "std_skills_per_activity",
    "skill_demand_intensity",
    "avg_skills_per_resource",
    "max_skills_per_resource",
    "min_skills_per_resource",
    "resource_flexibility",
    "avg_skill_coverage",
    "min_skill_coverage",
    "skill_coverage_balance",
    // time bounds
    "project_est_span",
    "project_lst_span",
    "project_duration_est",
    "avg_float",
    "std_float",
    "max_float",
    "critical_activities_ratio",
    "float_distribution",
];

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: Vec<f64>,
}

impl FeatureVector {
    pub fn from_instance(instance: &ProjectInstance) -> Self {
        let mut values = Vec::with_capacity(FEATURE_NAMES.len());
        push_structure(instance, &mut values);
        push_network(instance, &mut values);
        push_skills(instance, &mut values);
        push_time_bounds(instance, &mut values);
        debug_assert_eq!(values.len(), FEATURE_NAMES.len());
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values in [`FEATURE_NAMES`] order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|idx| self.values[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_NAMES.iter().copied().zip(self.values.iter().copied())
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}

/// mean, population std, min, max; all zero for an empty sample.
fn stats(sample: &[f64]) -> (f64, f64, f64, f64) {
    if sample.is_empty() {
        return (0.0, 0.0, 0.0, 0.0);
    }
    let n = sample.len() as f64;
    let mean = sample.iter().sum::<f64>() / n;
    let variance = sample.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    let min = sample.iter().copied().fold(f64::INFINITY, f64::min);
    let max = sample.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    (mean, variance.sqrt(), min, max)
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    numerator / denominator.max(1.0)
}

fn push_structure(instance: &ProjectInstance, out: &mut Vec<f64>) {
    let n_acts = instance.num_activities() as f64;
    let n_res = instance.num_resources() as f64;
    let n_skills = instance.num_skills() as f64;
    out.extend([
        n_acts,
        n_res,
        n_skills,
        ratio(n_acts, n_res),
        ratio(n_skills, n_res),
        ratio(n_res, n_acts),
    ]);

    let durations: Vec<f64> = instance
        .activities()
        .iter()
        .map(|a| a.duration as f64)
        .collect();
    let (mean, std, min, max) = stats(&durations);
    out.extend([
        mean,
        std,
        min,
        max,
        durations.iter().sum(),
        max - min,
        ratio(std, mean),
    ]);
}

fn push_network(instance: &ProjectInstance, out: &mut Vec<f64>) {
    let activities = instance.activities();
    let n = activities.len() as f64;
    let edges: usize = activities.iter().map(|a| a.successors.len()).sum();
    let in_degrees: Vec<f64> = activities
        .iter()
        .map(|a| a.predecessors.len() as f64)
        .collect();
    let out_degrees: Vec<f64> = activities
        .iter()
        .map(|a| a.successors.len() as f64)
        .collect();
    let (avg_in, std_in, _, max_in) = stats(&in_degrees);
    let (avg_out, std_out, _, max_out) = stats(&out_degrees);
    let starts = in_degrees.iter().filter(|d| **d == 0.0).count() as f64;
    let ends = out_degrees.iter().filter(|d| **d == 0.0).count() as f64;

    out.extend([
        ratio(edges as f64, n * (n - 1.0)),
        avg_in,
        max_in,
        std_in,
        avg_out,
        max_out,
        std_out,
        std_in + std_out,
        ratio(starts, n),
        ratio(ends, n),
    ]);
}

fn push_skills(instance: &ProjectInstance, out: &mut Vec<f64>) {
    let per_activity: Vec<f64> = instance
        .activities()
        .iter()
        .map(|a| a.demanded_skills().count() as f64)
        .collect();
    let (mean, std, min, max) = stats(&per_activity);
    out.extend([
        mean,
        max,
        min,
        std,
        ratio(per_activity.iter().sum(), per_activity.len() as f64),
    ]);

    let per_resource: Vec<f64> = instance
        .resources()
        .iter()
        .map(|r| r.skill_count() as f64)
        .collect();
    let (mean, std, min, max) = stats(&per_resource);
    out.extend([mean, max, min, std]);

    let coverage: Vec<f64> = if instance.num_resources() == 0 {
        Vec::new()
    } else {
        (0..instance.num_skills())
            .map(|skill| {
                instance
                    .resources()
                    .iter()
                    .filter(|r| r.has_skill(skill))
                    .count() as f64
            })
            .collect()
    };
    let (mean, std, min, _) = stats(&coverage);
    out.extend([mean, min, std]);
}

fn push_time_bounds(instance: &ProjectInstance, out: &mut Vec<f64>) {
    let activities = instance.activities();
    let span = |values: Vec<i64>| -> f64 {
        match (values.iter().min(), values.iter().max()) {
            (Some(lo), Some(hi)) if values.len() > 1 => (hi - lo) as f64,
            _ => 0.0,
        }
    };
    out.push(span(activities.iter().map(|a| a.earliest_start).collect()));
    out.push(span(activities.iter().map(|a| a.latest_start).collect()));
    out.push(
        activities
            .iter()
            .map(|a| a.earliest_finish)
            .max()
            .unwrap_or(0) as f64,
    );

    let floats: Vec<f64> = activities
        .iter()
        .filter(|a| a.slack >= 0)
        .map(|a| a.slack as f64)
        .collect();
    if floats.is_empty() {
        out.extend([0.0, 0.0, 0.0, 1.0, 0.0]);
        return;
    }
    let (mean, std, _, max) = stats(&floats);
    let critical = floats.iter().filter(|f| **f == 0.0).count() as f64;
    out.extend([
        mean,
        std,
        max,
        critical / floats.len() as f64,
        ratio(std, mean),
    ]);
}

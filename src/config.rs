use crate::matcher::RelaxationLevel;
use crate::priority::{PriorityRule, UnknownRule};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    UnknownRule(#[from] UnknownRule),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Limits of one scheduling run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Consecutive time advances without a commit before a level is declared deadlocked.
    pub stagnation_ceiling: u32,
    /// Loop iterations allowed per level before a hard stop.
    pub iteration_ceiling: u32,
    pub start_relaxation: RelaxationLevel,
    pub max_relaxation: RelaxationLevel,
    /// Optional wall-clock budget per level attempt, in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_budget_ms: Option<u64>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            stagnation_ceiling: 1000,
            iteration_ceiling: 10_000,
            start_relaxation: RelaxationLevel::Strict,
            max_relaxation: RelaxationLevel::MultiUse,
            time_budget_ms: None,
        }
    }
}

impl SchedulerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stagnation_ceiling == 0 {
            return Err(ConfigError::Invalid(
                "stagnation_ceiling must be positive".into(),
            ));
        }
        if self.iteration_ceiling == 0 {
            return Err(ConfigError::Invalid(
                "iteration_ceiling must be positive".into(),
            ));
        }
        if self.start_relaxation > self.max_relaxation {
            return Err(ConfigError::Invalid(format!(
                "start_relaxation {} is above max_relaxation {}",
                self.start_relaxation, self.max_relaxation
            )));
        }
        Ok(())
    }

    /// Levels tried by one run, in order.
    pub fn relaxation_ladder(&self) -> impl Iterator<Item = RelaxationLevel> + '_ {
        RelaxationLevel::ALL
            .into_iter()
            .filter(|level| *level >= self.start_relaxation && *level <= self.max_relaxation)
    }
}

/// Settings for evaluating many (instance, rule) pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Worker threads; `None` uses the available parallelism.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
    /// Rule names to evaluate; `None` evaluates every rule.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<String>>,
}

impl BatchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == Some(0) {
            return Err(ConfigError::Invalid("workers must be positive".into()));
        }
        self.selected_rules()?;
        Ok(())
    }

    pub fn selected_rules(&self) -> Result<Vec<PriorityRule>, UnknownRule> {
        match &self.rules {
            None => Ok(PriorityRule::ALL.to_vec()),
            Some(names) => names.iter().map(|name| name.parse()).collect(),
        }
    }

    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub scheduler: SchedulerConfig,
    pub batch: BatchConfig,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scheduler.validate()?;
        self.batch.validate()
    }

    pub fn from_json_str(contents: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let config: EngineConfig = serde_json::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            EngineConfig::from_json_str(r#"{ "scheduler": { "stagnation_ceiling": 50 } }"#)
                .unwrap();
        assert_eq!(config.scheduler.stagnation_ceiling, 50);
        assert_eq!(config.scheduler.iteration_ceiling, 10_000);
        assert_eq!(config.scheduler.max_relaxation, RelaxationLevel::MultiUse);
        assert_eq!(config.batch, BatchConfig::default());
    }

    #[test]
    fn inverted_ladder_is_rejected() {
        let err = EngineConfig::from_json_str(
            r#"{ "scheduler": { "start_relaxation": "multi_use", "max_relaxation": "strict" } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn unknown_rule_in_batch_is_rejected() {
        let err = EngineConfig::from_json_str(r#"{ "batch": { "rules": ["LFT", "FIFO"] } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownRule(_)));
    }

    #[test]
    fn ladder_respects_bounds() {
        let config = SchedulerConfig {
            start_relaxation: RelaxationLevel::NearMiss,
            max_relaxation: RelaxationLevel::LevelAgnostic,
            ..SchedulerConfig::default()
        };
        let ladder: Vec<_> = config.relaxation_ladder().collect();
        assert_eq!(
            ladder,
            vec![RelaxationLevel::NearMiss, RelaxationLevel::LevelAgnostic]
        );
    }
}

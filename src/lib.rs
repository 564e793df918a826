pub mod activity;
pub mod availability;
pub mod batch;
pub mod calculations;
pub mod config;
pub mod features;
pub mod graph;
pub mod instance;
pub mod matcher;
pub mod persistence;
pub mod priority;
pub mod recommend;
pub mod report;
pub mod resource;
pub mod schedule;
pub mod scheduler;

pub use activity::{Activity, ActivityId};
pub use availability::{Interval, ResourceSchedule};
pub use batch::{BatchError, BatchReport, RunSummary, evaluate_batch, evaluate_rules};
pub use calculations::{TimeBoundCalculator, TimeWindow};
pub use config::{BatchConfig, ConfigError, EngineConfig, SchedulerConfig};
pub use features::{FEATURE_NAMES, FeatureVector};
pub use instance::{
    ActivityDefinition, ProjectDefinition, ProjectHeader, ProjectInstance, ResourceDefinition,
    StructuralError,
};
pub use matcher::{MatchOutcome, RelaxationLevel, ResourceMatcher};
pub use persistence::{
    PersistenceError, PersistenceResult, load_instance, load_instance_from_json,
    load_instance_from_msrcp, save_batch_report_to_csv, save_batch_report_to_json,
    save_instance_to_json, save_schedule_to_csv, save_schedule_to_json,
};
pub use priority::{PriorityRanker, PriorityRule, SortOrder, UnknownRule};
pub use recommend::{RuleRecommender, StaticRecommender, recommended_order, search_order};
pub use resource::{Resource, ResourceId};
pub use schedule::{Schedule, ScheduleEntry, ScheduleStatus, ScheduleViolation};
pub use scheduler::{GreedyScheduler, LevelAttempt, Termination};

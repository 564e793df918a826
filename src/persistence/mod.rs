use crate::instance::{ProjectInstance, StructuralError};
use serde_json::Error as SerdeJsonError;
use std::io;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] SerdeJsonError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("missing section '{0}'")]
    MissingSection(&'static str),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("invalid project: {0}")]
    Structural(#[from] StructuralError),
    #[error("unsupported file type '{0}' (expected .msrcp or .json)")]
    UnsupportedFormat(String),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

pub mod file;
pub mod msrcp;

pub use file::{
    load_definition_from_json, load_schedule_entries_from_csv, load_schedule_from_json,
    save_batch_report_to_csv, save_batch_report_to_json, save_instance_to_json,
    save_schedule_to_csv, save_schedule_to_json,
};
pub use msrcp::{load_definition_from_msrcp, parse_msrcp};

pub fn load_instance_from_msrcp<P: AsRef<Path>>(path: P) -> PersistenceResult<ProjectInstance> {
    Ok(ProjectInstance::new(load_definition_from_msrcp(path)?)?)
}

pub fn load_instance_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<ProjectInstance> {
    Ok(ProjectInstance::new(load_definition_from_json(path)?)?)
}

/// Loads an instance, choosing the reader from the file extension.
pub fn load_instance<P: AsRef<Path>>(path: P) -> PersistenceResult<ProjectInstance> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let instance = match extension.as_str() {
        "msrcp" => load_instance_from_msrcp(path)?,
        "json" => load_instance_from_json(path)?,
        other => return Err(PersistenceError::UnsupportedFormat(other.to_string())),
    };
    info!(
        path = %path.display(),
        activities = instance.num_activities(),
        resources = instance.num_resources(),
        "loaded instance"
    );
    Ok(instance)
}

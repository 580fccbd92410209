//! Batch pipeline
//!
//! Turns the scenario catalog into files:
//! - [`Generator`]: runs (scenario, run_id) pairs on the rayon pool
//! - [`JsonlSink`]: writes one `<scenario>.jsonl` per scenario
//! - [`Hydrator`]: renders context blocks into system prompts, whole or
//!   sliced per context

pub mod generator;
pub mod hydrator;
pub mod sink;

pub use generator::{GenerationPlan, Generator, ScenarioBatch};
pub use hydrator::{HydratedSample, HydrationOptions, HydrationReport, Hydrator};
pub use sink::{read_records, JsonlSink};

use std::path::PathBuf;
use thiserror::Error;

/// Pipeline errors
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Sample {scenario}#{run_id} (seed {seed}) failed: {source}")]
    Sample {
        scenario: String,
        run_id: u32,
        seed: u64,
        #[source]
        source: railsynth_core::Error,
    },

    #[error("Unknown scenario '{0}'")]
    UnknownScenario(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}:{line}: malformed record: {message}")]
    MalformedLine {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Template error: {0}")]
    Template(String),

    #[error("Record error: {0}")]
    Record(#[from] railsynth_core::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

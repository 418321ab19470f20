use physics::PhysicsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CollectorError {
    #[error(transparent)]
    Physics(#[from] PhysicsError),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write record: {0}")]
    Write(#[source] std::io::Error),
    #[error("worker {worker} failed after {completed} episodes: {source}")]
    Worker {
        worker: usize,
        completed: usize,
        #[source]
        source: Box<CollectorError>,
    },
    #[error("worker {0} panicked")]
    WorkerPanicked(usize),
    #[error("run wrote {written} of {expected} records")]
    ShortRun { written: usize, expected: usize },
    #[error("malformed record on line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },
}

impl CollectorError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

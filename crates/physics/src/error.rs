use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong while loading a model or stepping it.
#[derive(Error, Debug)]
pub enum PhysicsError {
    #[error("failed to read model {path}: {source}")]
    ModelIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse model: {0}")]
    ModelParse(#[from] serde_json::Error),
    #[error("invalid model: {0}")]
    InvalidModel(String),
    #[error("unknown joint `{0}`")]
    UnknownJoint(String),
    #[error("unknown actuator `{0}`")]
    UnknownActuator(String),
    #[error("expected {expected} controls, got {actual}")]
    ControlMismatch { expected: usize, actual: usize },
    #[error("step duration must be positive and finite, got {0}")]
    InvalidDuration(f64),
    #[error("simulation diverged at t = {time}")]
    Diverged { time: f64 },
}

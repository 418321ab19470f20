#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Trajectory Collector
//!
//! Generates labelled trajectory datasets by running many randomized episodes
//! of a slide-joint simulation in parallel and appending each finished
//! trajectory, as one comma-separated line, to a shared log.
//!
//! ## Pipeline
//!
//! -   **[`EpisodeGenerator`]** resets a [`SimulationHandle`], draws random
//!     initial conditions and drives the tracked actuator with a reflecting
//!     bang-bang policy for a fixed number of decision steps.
//! -   **[`encode`]** turns a [`Trajectory`] into one text record.
//! -   **[`Sink`]** serialises appends from all workers into a single stream.
//! -   **[`Coordinator`]** runs one thread per handle, each with its own
//!     generator and quota, and reports progress and failures.
//!
//! [`collect_to_file`] wires these together for the common case of a fresh
//! output file. The [`dataset`] module post-processes finished logs.
//!
//! ```rust
//! use collector::{encode, EpisodeGenerator, EpisodeParams, SimulationHandle};
//! use physics::KinematicStepper;
//!
//! # fn main() -> Result<(), collector::CollectorError> {
//! let params = EpisodeParams {
//!     steps: 3,
//!     step_duration: 1.0,
//!     ..EpisodeParams::default()
//! };
//! let stepper = KinematicStepper::single("slider:obstacle", "obstacle");
//! let mut handle = SimulationHandle::new(Box::new(stepper), "slider:obstacle", "obstacle")?;
//!
//! let generator = EpisodeGenerator::new(params);
//! let config = collector::EpisodeConfig { obstacle_position: 0.0, direction: 1.0 };
//! let trajectory = generator.run_with(&mut handle, config)?;
//! assert_eq!(encode(&trajectory, None), "1,2,3\n");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod coordinator;
pub mod dataset;
pub mod encode;
pub mod episode;
pub mod error;
pub mod handle;
pub mod sink;

pub use config::{CollectorConfig, EpisodeParams, SampleRange};
pub use coordinator::{collect_to_file, Coordinator, Progress, RunSummary, WorkerReport};
pub use encode::{encode, encode_samples};
pub use episode::{ControlState, EpisodeConfig, EpisodeGenerator, Trajectory};
pub use error::CollectorError;
pub use handle::SimulationHandle;
pub use sink::Sink;

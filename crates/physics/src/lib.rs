#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Slide-Joint Physics
//!
//! A small, deterministic physics stepper for models made of prismatic
//! ("slide") joints driven by velocity actuators. It is the engine behind the
//! trajectory collector: every worker owns one instance and drives it through
//! the [`Stepper`] trait.
//!
//! ## Key Components
//!
//! -   **Model:** [`SlideModel`] describes joints and actuators. It can be
//!     loaded from JSON or taken from the built-in [`SlideModel::maze`] scene.
//! -   **Dynamic engine:** [`SlideSim`] integrates the model with a fixed
//!     timestep, sub-stepping until a requested window of simulated time has
//!     elapsed.
//! -   **Kinematic engine:** [`KinematicStepper`] moves every actuated joint at
//!     exactly its commanded speed. It is useful for synthetic datasets and as
//!     a reproducible stand-in during tests.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use physics::{SlideModel, SlideSim, Stepper};
//!
//! # fn main() -> Result<(), physics::PhysicsError> {
//! let mut sim = SlideSim::new(Arc::new(SlideModel::maze()))?;
//! let obstacle = sim.joint_id("slider:obstacle")?;
//! sim.set_joint_position(obstacle, 2.0);
//!
//! let controls = vec![1.0, 0.0, 0.0];
//! sim.advance(&controls, 0.5)?;
//! assert!(sim.joint_position(obstacle) > 2.0);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod kinematic;
pub mod model;
pub mod simulation;
pub mod stepper;

pub use error::PhysicsError;
pub use kinematic::KinematicStepper;
pub use model::{SlideJoint, SlideModel, VelocityActuator};
pub use simulation::SlideSim;
pub use stepper::{ActuatorId, JointId, Stepper};

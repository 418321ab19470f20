//! # Slide Simulation Core
//!
//! Fixed-timestep integration of a [`SlideModel`]. The model is shared
//! read-only behind an [`Arc`]; each [`SlideSim`] owns its own mutable state so
//! instances can run on separate threads without any synchronisation.

use crate::model::SlideModel;
use crate::stepper::{check_advance, ActuatorId, JointId, Stepper};
use crate::PhysicsError;
use std::sync::Arc;

/// Mutable per-instance state for one model.
pub struct SlideSim {
    model: Arc<SlideModel>,
    // Joint index driven by each actuator.
    actuator_joint: Vec<usize>,

    pub qpos: Vec<f64>,
    pub qvel: Vec<f64>,
    pub ctrl: Vec<f64>,
    time: f64,

    // Scratch generalized forces, reused every step.
    qfrc: Vec<f64>,
}

impl SlideSim {
    /// Create an instance in the model's default state.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::InvalidModel`] if the model fails validation.
    pub fn new(model: Arc<SlideModel>) -> Result<Self, PhysicsError> {
        model.validate()?;
        let actuator_joint = model.actuator_joints()?;
        let nq = model.joints.len();
        let nu = model.actuators.len();

        let mut sim = Self {
            model,
            actuator_joint,
            qpos: vec![0.0; nq],
            qvel: vec![0.0; nq],
            ctrl: vec![0.0; nu],
            time: 0.0,
            qfrc: vec![0.0; nq],
        };
        sim.reset();
        Ok(sim)
    }

    #[must_use]
    pub fn model(&self) -> &SlideModel {
        &self.model
    }

    /// Execute one integration step of `model.timestep` with the current controls.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::Diverged`] if any position or velocity stops being finite.
    pub fn step(&mut self) -> Result<(), PhysicsError> {
        let dt = self.model.timestep;

        // 1. Passive forces
        for (frc, (joint, vel)) in self
            .qfrc
            .iter_mut()
            .zip(self.model.joints.iter().zip(&self.qvel))
        {
            *frc = -joint.damping * vel;
        }

        // 2. Actuator forces
        for ((actuator, &j), &ctrl) in self
            .model
            .actuators
            .iter()
            .zip(&self.actuator_joint)
            .zip(&self.ctrl)
        {
            let target = match actuator.ctrlrange {
                Some([lo, hi]) => ctrl.clamp(lo, hi),
                None => ctrl,
            };
            self.qfrc[j] += actuator.kv * (target - self.qvel[j]);
        }

        // 3. Semi-implicit Euler, then joint limits
        for (i, joint) in self.model.joints.iter().enumerate() {
            self.qvel[i] += self.qfrc[i] / joint.mass * dt;
            self.qpos[i] += self.qvel[i] * dt;

            if let Some([lo, hi]) = joint.range {
                if self.qpos[i] < lo {
                    self.qpos[i] = lo;
                    self.qvel[i] = self.qvel[i].max(0.0);
                } else if self.qpos[i] > hi {
                    self.qpos[i] = hi;
                    self.qvel[i] = self.qvel[i].min(0.0);
                }
            }
        }

        self.time += dt;

        if self.qpos.iter().chain(&self.qvel).any(|v| !v.is_finite()) {
            return Err(PhysicsError::Diverged { time: self.time });
        }
        Ok(())
    }
}

impl Stepper for SlideSim {
    fn reset(&mut self) {
        for (q, joint) in self.qpos.iter_mut().zip(&self.model.joints) {
            *q = joint.qpos0;
        }
        self.qvel.fill(0.0);
        self.ctrl.fill(0.0);
        self.qfrc.fill(0.0);
        self.time = 0.0;
    }

    fn joint_id(&self, name: &str) -> Result<JointId, PhysicsError> {
        self.model
            .joint_index(name)
            .map(JointId::new)
            .ok_or_else(|| PhysicsError::UnknownJoint(name.to_string()))
    }

    fn actuator_id(&self, name: &str) -> Result<ActuatorId, PhysicsError> {
        self.model
            .actuator_index(name)
            .map(ActuatorId::new)
            .ok_or_else(|| PhysicsError::UnknownActuator(name.to_string()))
    }

    fn actuator_count(&self) -> usize {
        self.ctrl.len()
    }

    fn set_joint_position(&mut self, joint: JointId, value: f64) {
        self.qpos[joint.index()] = value;
    }

    fn joint_position(&self, joint: JointId) -> f64 {
        self.qpos[joint.index()]
    }

    fn joint_velocity(&self, joint: JointId) -> f64 {
        self.qvel[joint.index()]
    }

    fn time(&self) -> f64 {
        self.time
    }

    fn advance(&mut self, controls: &[f64], duration: f64) -> Result<f64, PhysicsError> {
        check_advance(controls, self.ctrl.len(), duration)?;

        let start = self.time;
        while self.time - start < duration {
            self.ctrl.copy_from_slice(controls);
            self.step()?;
        }
        Ok(self.time - start)
    }
}

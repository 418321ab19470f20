//! Ideal velocity tracking: every actuated joint moves at exactly its
//! commanded speed for the whole window, with no dynamics in between.

use crate::model::SlideModel;
use crate::stepper::{check_advance, ActuatorId, JointId, Stepper};
use crate::PhysicsError;

pub struct KinematicStepper {
    joint_names: Vec<String>,
    actuator_names: Vec<String>,
    actuator_joint: Vec<usize>,
    qpos0: Vec<f64>,
    qpos: Vec<f64>,
    qvel: Vec<f64>,
    time: f64,
}

impl KinematicStepper {
    /// Mirror the joints and actuators of `model`, ignoring masses, gains and limits.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::InvalidModel`] if the model fails validation.
    pub fn new(model: &SlideModel) -> Result<Self, PhysicsError> {
        model.validate()?;
        let qpos0: Vec<f64> = model.joints.iter().map(|j| j.qpos0).collect();
        Ok(Self {
            joint_names: model.joints.iter().map(|j| j.name.clone()).collect(),
            actuator_names: model.actuators.iter().map(|a| a.name.clone()).collect(),
            actuator_joint: model.actuator_joints()?,
            qpos: qpos0.clone(),
            qvel: vec![0.0; qpos0.len()],
            qpos0,
            time: 0.0,
        })
    }

    /// A single joint starting at zero, driven by a single actuator.
    #[must_use]
    pub fn single(joint: &str, actuator: &str) -> Self {
        Self {
            joint_names: vec![joint.to_string()],
            actuator_names: vec![actuator.to_string()],
            actuator_joint: vec![0],
            qpos0: vec![0.0],
            qpos: vec![0.0],
            qvel: vec![0.0],
            time: 0.0,
        }
    }
}

impl Stepper for KinematicStepper {
    fn reset(&mut self) {
        self.qpos.copy_from_slice(&self.qpos0);
        self.qvel.fill(0.0);
        self.time = 0.0;
    }

    fn joint_id(&self, name: &str) -> Result<JointId, PhysicsError> {
        self.joint_names
            .iter()
            .position(|n| n == name)
            .map(JointId::new)
            .ok_or_else(|| PhysicsError::UnknownJoint(name.to_string()))
    }

    fn actuator_id(&self, name: &str) -> Result<ActuatorId, PhysicsError> {
        self.actuator_names
            .iter()
            .position(|n| n == name)
            .map(ActuatorId::new)
            .ok_or_else(|| PhysicsError::UnknownActuator(name.to_string()))
    }

    fn actuator_count(&self) -> usize {
        self.actuator_names.len()
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
        check_advance(controls, self.actuator_names.len(), duration)?;

        self.qvel.fill(0.0);
        for (&j, &speed) in self.actuator_joint.iter().zip(controls) {
            self.qvel[j] += speed;
        }
        for (q, v) in self.qpos.iter_mut().zip(&self.qvel) {
            *q += v * duration;
        }
        self.time += duration;

        if self.qpos.iter().any(|q| !q.is_finite()) {
            return Err(PhysicsError::Diverged { time: self.time });
        }
        Ok(duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_moves_by_speed_times_duration() {
        let mut stepper = KinematicStepper::single("x", "m");
        let x = stepper.joint_id("x").unwrap();
        for expected in [1.0, 2.0, 3.0] {
            stepper.advance(&[1.0], 1.0).unwrap();
            assert!((stepper.joint_position(x) - expected).abs() < f64::EPSILON);
        }
        stepper.advance(&[-1.0], 0.5).unwrap();
        assert!((stepper.joint_position(x) - 2.5).abs() < f64::EPSILON);
        assert!((stepper.joint_velocity(x) + 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn reset_restores_initial_positions() {
        let mut model = SlideModel::maze();
        model.joints[1].qpos0 = 3.0;
        let mut stepper = KinematicStepper::new(&model).unwrap();
        let agent = stepper.joint_id("slider:agent-x").unwrap();
        stepper.advance(&[0.0, 1.0, 0.0], 2.0).unwrap();
        assert!((stepper.joint_position(agent) - 5.0).abs() < f64::EPSILON);
        stepper.reset();
        assert!((stepper.joint_position(agent) - 3.0).abs() < f64::EPSILON);
        assert!(stepper.time().abs() < f64::EPSILON);
    }
}

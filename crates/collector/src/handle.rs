//! Owning wrapper around one simulation instance.

use crate::config::EpisodeParams;
use crate::CollectorError;
use physics::{ActuatorId, JointId, PhysicsError, Stepper};

/// One stepper plus the handles of the tracked joint and actuator.
///
/// Names are resolved once, when the handle is built. A handle is moved into
/// exactly one worker and dropped, releasing its stepper, when that worker
/// ends.
pub struct SimulationHandle {
    stepper: Box<dyn Stepper>,
    joint: JointId,
    actuator: ActuatorId,
    // Zero everywhere except the tracked actuator's slot.
    controls: Vec<f64>,
}

impl SimulationHandle {
    /// # Errors
    ///
    /// Returns [`CollectorError::Physics`] if either name is unknown to the stepper.
    pub fn new(
        stepper: Box<dyn Stepper>,
        joint_name: &str,
        actuator_name: &str,
    ) -> Result<Self, CollectorError> {
        let joint = stepper.joint_id(joint_name)?;
        let actuator = stepper.actuator_id(actuator_name)?;
        let controls = vec![0.0; stepper.actuator_count()];
        Ok(Self {
            stepper,
            joint,
            actuator,
            controls,
        })
    }

    /// Build `count` handles, one fresh stepper each.
    ///
    /// # Errors
    ///
    /// Fails on the first stepper that cannot be created or that does not
    /// know the tracked names. No partial pool is returned.
    pub fn pool<F>(
        count: usize,
        params: &EpisodeParams,
        mut make_stepper: F,
    ) -> Result<Vec<Self>, CollectorError>
    where
        F: FnMut() -> Result<Box<dyn Stepper>, PhysicsError>,
    {
        (0..count)
            .map(|_| {
                let stepper = make_stepper()?;
                Self::new(stepper, &params.tracked_joint, &params.tracked_actuator)
            })
            .collect()
    }

    #[must_use]
    pub fn stepper(&self) -> &dyn Stepper {
        self.stepper.as_ref()
    }

    #[must_use]
    pub fn joint(&self) -> JointId {
        self.joint
    }

    /// Reset to the default state, then place the tracked joint at `position`.
    pub fn reset_to(&mut self, position: f64) {
        self.stepper.reset();
        self.stepper.set_joint_position(self.joint, position);
    }

    #[must_use]
    pub fn position(&self) -> f64 {
        self.stepper.joint_position(self.joint)
    }

    /// Advance with `speed` on the tracked actuator and nothing on the others.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Stepper::advance`].
    pub fn advance(&mut self, speed: f64, duration: f64) -> Result<f64, PhysicsError> {
        self.controls[self.actuator.index()] = speed;
        self.stepper.advance(&self.controls, duration)
    }
}

//! # Stepper Interface
//!
//! The contract every engine exposes to the trajectory collector. Names are
//! resolved to stable integer handles once, after which all reads, writes and
//! control inputs address degrees of freedom by handle.

use crate::PhysicsError;

/// Stable handle to a joint of a loaded model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JointId(usize);

impl JointId {
    pub(crate) const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Position of the joint in the model's joint list.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Stable handle to an actuator, i.e. a slot in the control vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActuatorId(usize);

impl ActuatorId {
    pub(crate) const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Slot of this actuator in the control vector passed to [`Stepper::advance`].
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A single simulation instance that can be reset, inspected and advanced.
///
/// Instances are exclusively owned; `Send` lets an instance move into the
/// worker thread that drives it.
pub trait Stepper: Send {
    /// Restore the model's default state: initial joint positions, zero
    /// velocities, zero controls and time zero.
    fn reset(&mut self);

    /// Resolve a joint name to its handle.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::UnknownJoint`] if the model has no such joint.
    fn joint_id(&self, name: &str) -> Result<JointId, PhysicsError>;

    /// Resolve an actuator name to its control slot.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::UnknownActuator`] if the model has no such actuator.
    fn actuator_id(&self, name: &str) -> Result<ActuatorId, PhysicsError>;

    /// Length of the control vector expected by [`Stepper::advance`].
    fn actuator_count(&self) -> usize;

    fn set_joint_position(&mut self, joint: JointId, value: f64);

    fn joint_position(&self, joint: JointId) -> f64;

    fn joint_velocity(&self, joint: JointId) -> f64;

    /// Current simulated time.
    fn time(&self) -> f64;

    /// Integrate forward by `duration` units of simulated time with `controls`
    /// held constant, returning the simulated time that actually elapsed.
    ///
    /// # Errors
    ///
    /// Fails on a control vector of the wrong length, a non-positive
    /// duration, or when the state stops being finite.
    fn advance(&mut self, controls: &[f64], duration: f64) -> Result<f64, PhysicsError>;
}

pub(crate) fn check_advance(
    controls: &[f64],
    expected: usize,
    duration: f64,
) -> Result<(), PhysicsError> {
    if controls.len() != expected {
        return Err(PhysicsError::ControlMismatch {
            expected,
            actual: controls.len(),
        });
    }
    if !(duration.is_finite() && duration > 0.0) {
        return Err(PhysicsError::InvalidDuration(duration));
    }
    Ok(())
}

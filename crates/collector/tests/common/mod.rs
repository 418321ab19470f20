#![allow(dead_code)]

use collector::{EpisodeParams, SampleRange, SimulationHandle};
use physics::{ActuatorId, JointId, KinematicStepper, PhysicsError, SlideModel, Stepper};
use std::io::Write;

pub const JOINT: &str = "slider:obstacle";
pub const ACTUATOR: &str = "obstacle";

/// Unit-duration steps from a fixed start of 0 moving forward, so a
/// kinematic stepper produces `1, 2, 3, ...`.
pub fn unit_params(steps: usize) -> EpisodeParams {
    EpisodeParams {
        steps,
        step_duration: 1.0,
        obstacle_range: SampleRange::fixed(0.0),
        direction_range: SampleRange::fixed(0.0),
        ..EpisodeParams::default()
    }
}

pub fn kinematic_handle() -> SimulationHandle {
    let stepper = KinematicStepper::single(JOINT, ACTUATOR);
    SimulationHandle::new(Box::new(stepper), JOINT, ACTUATOR).unwrap()
}

pub fn kinematic_maze_handle() -> SimulationHandle {
    let stepper = KinematicStepper::new(&SlideModel::maze()).unwrap();
    SimulationHandle::new(Box::new(stepper), JOINT, ACTUATOR).unwrap()
}

pub fn kinematic_pool(count: usize) -> Vec<SimulationHandle> {
    (0..count).map(|_| kinematic_handle()).collect()
}

/// Kinematic stepper whose `fail_at`-th call to `advance` (1-based) and every
/// later call fail as if the engine had become unusable.
pub struct FlakyStepper {
    inner: KinematicStepper,
    advances: usize,
    fail_at: usize,
}

impl FlakyStepper {
    pub fn new(fail_at: usize) -> Self {
        Self {
            inner: KinematicStepper::single(JOINT, ACTUATOR),
            advances: 0,
            fail_at,
        }
    }

    pub fn handle(fail_at: usize) -> SimulationHandle {
        SimulationHandle::new(Box::new(Self::new(fail_at)), JOINT, ACTUATOR).unwrap()
    }
}

impl Stepper for FlakyStepper {
    fn reset(&mut self) {
        self.inner.reset();
    }

    fn joint_id(&self, name: &str) -> Result<JointId, PhysicsError> {
        self.inner.joint_id(name)
    }

    fn actuator_id(&self, name: &str) -> Result<ActuatorId, PhysicsError> {
        self.inner.actuator_id(name)
    }

    fn actuator_count(&self) -> usize {
        self.inner.actuator_count()
    }

    fn set_joint_position(&mut self, joint: JointId, value: f64) {
        self.inner.set_joint_position(joint, value);
    }

    fn joint_position(&self, joint: JointId) -> f64 {
        self.inner.joint_position(joint)
    }

    fn joint_velocity(&self, joint: JointId) -> f64 {
        self.inner.joint_velocity(joint)
    }

    fn time(&self) -> f64 {
        self.inner.time()
    }

    fn advance(&mut self, controls: &[f64], duration: f64) -> Result<f64, PhysicsError> {
        self.advances += 1;
        if self.advances >= self.fail_at {
            return Err(PhysicsError::Diverged { time: self.inner.time() });
        }
        self.inner.advance(controls, duration)
    }
}

/// Writer that accepts at most three bytes per call and yields in between,
/// widening the window in which unsynchronised writers would interleave.
#[derive(Default)]
pub struct SlowWriter {
    pub bytes: Vec<u8>,
}

impl Write for SlowWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let n = buf.len().min(3);
        self.bytes.extend_from_slice(&buf[..n]);
        std::thread::yield_now();
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

pub fn lines(bytes: &[u8]) -> Vec<String> {
    String::from_utf8(bytes.to_vec())
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

//! # Episode Generation
//!
//! One episode places the tracked joint at a random start, picks a random
//! initial direction, and then runs a fixed number of decision steps. Each
//! step advances the simulation by a fixed window under the current commanded
//! speed, reflects the command if the joint has left the band between the two
//! thresholds, and records the joint position.

use crate::config::EpisodeParams;
use crate::handle::SimulationHandle;
use physics::PhysicsError;

/// Random initial conditions of one episode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeConfig {
    pub obstacle_position: f64,
    pub direction: f64,
}

impl EpisodeConfig {
    /// Draw the start position, then the direction, from `rng`.
    pub fn draw(params: &EpisodeParams, rng: &mut fastrand::Rng) -> Self {
        let obstacle_position = params.obstacle_range.sample(rng);
        let direction = params.direction_range.sample(rng);
        Self {
            obstacle_position,
            direction,
        }
    }
}

/// Sign of the commanded speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlState {
    Forward,
    Backward,
}

impl ControlState {
    /// A direction of exactly zero counts as forward.
    #[must_use]
    pub fn from_direction(direction: f64) -> Self {
        if direction < 0.0 {
            Self::Backward
        } else {
            Self::Forward
        }
    }

    /// Apply both boundary checks, lower first. When a position satisfies both
    /// (only possible with overlapping thresholds) the upper check decides.
    #[must_use]
    pub fn reflect(self, position: f64, lower: f64, upper: f64) -> Self {
        let mut state = self;
        if position < lower {
            state = Self::Forward;
        }
        if position > upper {
            state = Self::Backward;
        }
        state
    }

    #[must_use]
    pub fn sign(self) -> f64 {
        match self {
            Self::Forward => 1.0,
            Self::Backward => -1.0,
        }
    }
}

/// Tracked joint positions of one episode, one per decision step.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    config: EpisodeConfig,
    samples: Vec<f64>,
}

impl Trajectory {
    #[must_use]
    pub fn config(&self) -> EpisodeConfig {
        self.config
    }

    #[must_use]
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[must_use]
    pub fn into_samples(self) -> Vec<f64> {
        self.samples
    }
}

pub struct EpisodeGenerator {
    params: EpisodeParams,
}

impl EpisodeGenerator {
    #[must_use]
    pub fn new(params: EpisodeParams) -> Self {
        Self { params }
    }

    #[must_use]
    pub fn params(&self) -> &EpisodeParams {
        &self.params
    }

    /// Draw a fresh [`EpisodeConfig`] from `rng` and run it.
    ///
    /// # Errors
    ///
    /// Any stepper failure aborts the episode; no partial trajectory is returned.
    pub fn run_episode(
        &self,
        handle: &mut SimulationHandle,
        rng: &mut fastrand::Rng,
    ) -> Result<Trajectory, PhysicsError> {
        let config = EpisodeConfig::draw(&self.params, rng);
        self.run_with(handle, config)
    }

    /// Run one episode from the given initial conditions.
    ///
    /// # Errors
    ///
    /// Any stepper failure aborts the episode; no partial trajectory is returned.
    pub fn run_with(
        &self,
        handle: &mut SimulationHandle,
        config: EpisodeConfig,
    ) -> Result<Trajectory, PhysicsError> {
        let p = &self.params;
        handle.reset_to(config.obstacle_position);

        let mut control = ControlState::from_direction(config.direction);
        let mut samples = Vec::with_capacity(p.steps);

        for _ in 0..p.steps {
            handle.advance(control.sign() * p.speed, p.step_duration)?;
            let position = handle.position();
            control = control.reflect(position, p.lower_threshold, p.upper_threshold);
            samples.push(position);
        }

        tracing::debug!(
            "Episode from {:.3} ({:?}) ended at {:.3}",
            config.obstacle_position,
            ControlState::from_direction(config.direction),
            samples.last().copied().unwrap_or(config.obstacle_position)
        );
        Ok(Trajectory { config, samples })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_direction_is_forward() {
        assert_eq!(ControlState::from_direction(0.0), ControlState::Forward);
        assert_eq!(ControlState::from_direction(-0.0), ControlState::Forward);
        assert_eq!(ControlState::from_direction(0.3), ControlState::Forward);
        assert_eq!(ControlState::from_direction(-1e-12), ControlState::Backward);
    }

    #[test]
    fn reflection_inside_band_keeps_state() {
        for state in [ControlState::Forward, ControlState::Backward] {
            assert_eq!(state.reflect(0.0, -10.0, 10.0), state);
            assert_eq!(state.reflect(-10.0, -10.0, 10.0), state);
            assert_eq!(state.reflect(10.0, -10.0, 10.0), state);
        }
    }

    #[test]
    fn reflection_outside_band_points_back_in() {
        for state in [ControlState::Forward, ControlState::Backward] {
            assert_eq!(state.reflect(-10.5, -10.0, 10.0), ControlState::Forward);
            assert_eq!(state.reflect(10.5, -10.0, 10.0), ControlState::Backward);
        }
    }

    #[test]
    fn upper_check_wins_when_both_fire() {
        // Overlapping thresholds: 0 is below 5 and above -5.
        for state in [ControlState::Forward, ControlState::Backward] {
            assert_eq!(state.reflect(0.0, 5.0, -5.0), ControlState::Backward);
        }
    }
}

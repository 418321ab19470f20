//! Collection settings.
//!
//! Every knob of a run lives here with the defaults of the reference dataset:
//! ten workers of 13 000 episodes, 150 decision steps of half a simulated
//! second, obstacle starts in `[-9, 9)` and reflection at `±10`.

use crate::CollectorError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Half-open interval `[low, high)` sampled uniformly. `low == high` pins the
/// draw to `low`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleRange {
    pub low: f64,
    pub high: f64,
}

impl SampleRange {
    #[must_use]
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    #[must_use]
    pub const fn symmetric(half_width: f64) -> Self {
        Self::new(-half_width, half_width)
    }

    /// A range that always yields `value`.
    #[must_use]
    pub const fn fixed(value: f64) -> Self {
        Self::new(value, value)
    }

    pub fn sample(&self, rng: &mut fastrand::Rng) -> f64 {
        self.low + (self.high - self.low) * rng.f64()
    }

    fn check(&self, what: &str) -> Result<(), CollectorError> {
        let width = self.high - self.low;
        if self.low.is_finite() && self.high.is_finite() && width.is_finite() && width >= 0.0 {
            Ok(())
        } else {
            Err(CollectorError::InvalidConfig(format!(
                "{what} range [{}, {}) is empty or not finite",
                self.low, self.high
            )))
        }
    }
}

/// Per-episode parameters shared by every worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EpisodeParams {
    /// Decision steps per episode, i.e. samples per trajectory.
    pub steps: usize,
    /// Simulated time covered by one decision step.
    pub step_duration: f64,
    /// Magnitude of the commanded speed; its sign is the control state.
    pub speed: f64,
    /// Initial position of the tracked joint.
    pub obstacle_range: SampleRange,
    /// Initial direction; only its sign is used.
    pub direction_range: SampleRange,
    /// Below this position the commanded speed flips to positive.
    pub lower_threshold: f64,
    /// Above this position the commanded speed flips to negative.
    pub upper_threshold: f64,
    /// Joint whose position is recorded.
    pub tracked_joint: String,
    /// Actuator that receives the commanded speed; all others get zero.
    pub tracked_actuator: String,
}

impl Default for EpisodeParams {
    fn default() -> Self {
        Self {
            steps: 150,
            step_duration: 0.5,
            speed: 1.0,
            obstacle_range: SampleRange::symmetric(9.0),
            direction_range: SampleRange::symmetric(1.0),
            lower_threshold: -10.0,
            upper_threshold: 10.0,
            tracked_joint: "slider:obstacle".to_string(),
            tracked_actuator: "obstacle".to_string(),
        }
    }
}

impl EpisodeParams {
    /// # Errors
    ///
    /// Returns [`CollectorError::InvalidConfig`] describing the first bad field.
    pub fn validate(&self) -> Result<(), CollectorError> {
        if self.steps == 0 {
            return Err(CollectorError::InvalidConfig("steps must be at least 1".into()));
        }
        if !(self.step_duration.is_finite() && self.step_duration > 0.0) {
            return Err(CollectorError::InvalidConfig(format!(
                "step duration must be positive, got {}",
                self.step_duration
            )));
        }
        if !(self.speed.is_finite() && self.speed > 0.0) {
            return Err(CollectorError::InvalidConfig(format!(
                "speed must be positive, got {}",
                self.speed
            )));
        }
        self.obstacle_range.check("obstacle")?;
        self.direction_range.check("direction")?;
        if !(self.lower_threshold.is_finite() && self.upper_threshold.is_finite()) {
            return Err(CollectorError::InvalidConfig("thresholds must be finite".into()));
        }
        if self.lower_threshold >= self.upper_threshold {
            tracing::warn!(
                "Reflection thresholds overlap (lower {} >= upper {}); the upper bound wins ties",
                self.lower_threshold,
                self.upper_threshold
            );
        }
        if self.tracked_joint.is_empty() || self.tracked_actuator.is_empty() {
            return Err(CollectorError::InvalidConfig(
                "tracked joint and actuator names must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Settings for one collection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Model file; the built-in maze is used when absent.
    pub model_path: Option<PathBuf>,
    pub output_path: PathBuf,
    pub workers: usize,
    /// Episodes generated by each worker.
    pub quota_per_worker: usize,
    pub episode: EpisodeParams,
    /// Master seed for the per-worker generators; drawn at random when absent.
    pub seed: Option<u64>,
    /// Fixed number of decimals per sample; shortest round-trip form when absent.
    pub precision: Option<usize>,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            output_path: PathBuf::from("trajectories.csv"),
            workers: 10,
            quota_per_worker: 13_000,
            episode: EpisodeParams::default(),
            seed: None,
            precision: None,
        }
    }
}

impl CollectorConfig {
    /// Load a configuration file. Missing fields keep their defaults and a
    /// relative `model_path` is taken relative to the file's directory.
    ///
    /// # Errors
    ///
    /// Returns [`CollectorError::Io`] or [`CollectorError::ConfigParse`].
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CollectorError> {
        let path = path.as_ref();
        let json =
            std::fs::read_to_string(path).map_err(|source| CollectorError::io(path, source))?;
        let mut config: Self = serde_json::from_str(&json)?;

        if let (Some(model), Some(dir)) = (&config.model_path, path.parent()) {
            if model.is_relative() {
                config.model_path = Some(dir.join(model));
            }
        }
        Ok(config)
    }

    #[must_use]
    pub fn total_episodes(&self) -> usize {
        self.workers * self.quota_per_worker
    }

    /// # Errors
    ///
    /// Returns [`CollectorError::InvalidConfig`] describing the first bad field.
    pub fn validate(&self) -> Result<(), CollectorError> {
        if self.workers == 0 {
            return Err(CollectorError::InvalidConfig("at least one worker is required".into()));
        }
        if self.quota_per_worker == 0 {
            return Err(CollectorError::InvalidConfig("quota per worker must be at least 1".into()));
        }
        if self.workers.checked_mul(self.quota_per_worker).is_none() {
            return Err(CollectorError::InvalidConfig("total episode count overflows".into()));
        }
        if self.output_path.as_os_str().is_empty() {
            return Err(CollectorError::InvalidConfig("output path must not be empty".into()));
        }
        self.episode.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_dataset() {
        let config = CollectorConfig::default();
        config.validate().unwrap();
        assert_eq!(config.total_episodes(), 130_000);
        assert_eq!(config.episode.steps, 150);
        assert_eq!(config.episode.obstacle_range, SampleRange::new(-9.0, 9.0));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: CollectorConfig =
            serde_json::from_str(r#"{ "workers": 2, "episode": { "steps": 3 } }"#).unwrap();
        assert_eq!(config.workers, 2);
        assert_eq!(config.quota_per_worker, 13_000);
        assert_eq!(config.episode.steps, 3);
        assert!((config.episode.step_duration - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_workers_is_rejected() {
        let config = CollectorConfig {
            workers: 0,
            ..CollectorConfig::default()
        };
        assert!(matches!(config.validate(), Err(CollectorError::InvalidConfig(_))));
    }

    #[test]
    fn non_positive_speed_is_rejected() {
        for speed in [0.0, -1.0, f64::NAN] {
            let mut config = CollectorConfig::default();
            config.episode.speed = speed;
            assert!(
                matches!(config.validate(), Err(CollectorError::InvalidConfig(_))),
                "speed={speed}"
            );
        }
    }

    #[test]
    fn range_wider_than_f64_is_rejected() {
        let mut config = CollectorConfig::default();
        config.episode.obstacle_range = SampleRange::new(-1e308, 1e308);
        assert!(matches!(config.validate(), Err(CollectorError::InvalidConfig(_))));
    }

    #[test]
    fn model_path_is_relative_to_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        std::fs::write(&path, r#"{ "model_path": "models/maze.json" }"#).unwrap();

        let config = CollectorConfig::from_json_file(&path).unwrap();
        assert_eq!(config.model_path, Some(dir.path().join("models/maze.json")));
    }

    #[test]
    fn absolute_model_path_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("maze.json");
        let path = dir.path().join("run.json");
        std::fs::write(&path, serde_json::json!({ "model_path": model }).to_string()).unwrap();

        let config = CollectorConfig::from_json_file(&path).unwrap();
        assert_eq!(config.model_path, Some(model));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let mut config = CollectorConfig::default();
        config.episode.obstacle_range = SampleRange::new(1.0, -1.0);
        assert!(matches!(config.validate(), Err(CollectorError::InvalidConfig(_))));
    }

    #[test]
    fn overlapping_thresholds_are_allowed() {
        let mut params = EpisodeParams::default();
        params.lower_threshold = 5.0;
        params.upper_threshold = -5.0;
        params.validate().unwrap();
    }

    #[test]
    fn fixed_range_always_yields_its_value() {
        let mut rng = fastrand::Rng::with_seed(7);
        let range = SampleRange::fixed(0.0);
        assert!((0..100).all(|_| range.sample(&mut rng) == 0.0));
    }

    #[test]
    fn samples_stay_in_range() {
        let mut rng = fastrand::Rng::with_seed(7);
        let range = SampleRange::symmetric(9.0);
        for _ in 0..1000 {
            let x = range.sample(&mut rng);
            assert!((-9.0..9.0).contains(&x), "x={x}");
        }
    }
}

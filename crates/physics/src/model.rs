//! # Model Description
//!
//! A model is a flat list of slide joints plus the velocity actuators that
//! drive them. Models are plain data: they are loaded once, validated, and
//! then shared read-only between every simulation instance built from them.

use crate::PhysicsError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

const DEFAULT_TIMESTEP: f64 = 0.002;
const DEFAULT_KV: f64 = 20.0;

/// A prismatic degree of freedom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideJoint {
    pub name: String,
    /// Position restored on reset.
    #[serde(default)]
    pub qpos0: f64,
    #[serde(default = "unit_mass")]
    pub mass: f64,
    /// Viscous damping coefficient.
    #[serde(default)]
    pub damping: f64,
    /// Hard position limits `[lo, hi]`; unlimited when absent.
    #[serde(default)]
    pub range: Option<[f64; 2]>,
}

/// Velocity servo: pushes its joint towards the commanded speed with gain `kv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VelocityActuator {
    pub name: String,
    pub joint: String,
    #[serde(default = "default_kv")]
    pub kv: f64,
    /// Commands are clamped into `[lo, hi]` when present.
    #[serde(default)]
    pub ctrlrange: Option<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideModel {
    #[serde(default = "default_timestep")]
    pub timestep: f64,
    pub joints: Vec<SlideJoint>,
    #[serde(default)]
    pub actuators: Vec<VelocityActuator>,
}

fn unit_mass() -> f64 {
    1.0
}

fn default_kv() -> f64 {
    DEFAULT_KV
}

fn default_timestep() -> f64 {
    DEFAULT_TIMESTEP
}

impl SlideModel {
    /// Parse and validate a JSON model description.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::ModelParse`] for malformed JSON and
    /// [`PhysicsError::InvalidModel`] when validation fails.
    pub fn from_json(json: &str) -> Result<Self, PhysicsError> {
        let model: Self = serde_json::from_str(json)?;
        model.validate()?;
        Ok(model)
    }

    /// Read, parse and validate a model file.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::ModelIo`] if the file cannot be read, otherwise
    /// the same errors as [`SlideModel::from_json`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PhysicsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| PhysicsError::ModelIo {
            path: path.to_path_buf(),
            source,
        })?;
        let model = Self::from_json(&json)?;
        tracing::info!(
            "Loaded model {:?}: {} joints, {} actuators, timestep {}",
            path,
            model.joints.len(),
            model.actuators.len(),
            model.timestep
        );
        Ok(model)
    }

    /// The obstacle maze: one obstacle sliding along x and an agent on two
    /// orthogonal sliders. Only the obstacle is used for data collection; the
    /// agent joints are kept so control vectors line up with the full scene.
    #[must_use]
    pub fn maze() -> Self {
        let slider = |name: &str, range: f64| SlideJoint {
            name: name.to_string(),
            qpos0: 0.0,
            mass: 1.0,
            damping: 0.0,
            range: Some([-range, range]),
        };
        let servo = |name: &str, joint: &str| VelocityActuator {
            name: name.to_string(),
            joint: joint.to_string(),
            kv: DEFAULT_KV,
            ctrlrange: Some([-1.0, 1.0]),
        };
        Self {
            timestep: DEFAULT_TIMESTEP,
            joints: vec![
                slider("slider:obstacle", 12.0),
                slider("slider:agent-x", 15.0),
                slider("slider:agent-y", 15.0),
            ],
            actuators: vec![
                servo("obstacle", "slider:obstacle"),
                servo("agent-x", "slider:agent-x"),
                servo("agent-y", "slider:agent-y"),
            ],
        }
    }

    #[must_use]
    pub fn joint_index(&self, name: &str) -> Option<usize> {
        self.joints.iter().position(|j| j.name == name)
    }

    #[must_use]
    pub fn actuator_index(&self, name: &str) -> Option<usize> {
        self.actuators.iter().position(|a| a.name == name)
    }

    /// Joint index driven by each actuator, in actuator order.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::InvalidModel`] if an actuator targets a missing joint.
    pub fn actuator_joints(&self) -> Result<Vec<usize>, PhysicsError> {
        self.actuators
            .iter()
            .map(|a| {
                self.joint_index(&a.joint).ok_or_else(|| {
                    PhysicsError::InvalidModel(format!(
                        "actuator `{}` targets unknown joint `{}`",
                        a.name, a.joint
                    ))
                })
            })
            .collect()
    }

    /// Check the structural invariants every engine relies on.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::InvalidModel`] describing the first violation.
    pub fn validate(&self) -> Result<(), PhysicsError> {
        let invalid = |msg: String| Err(PhysicsError::InvalidModel(msg));

        if !(self.timestep.is_finite() && self.timestep > 0.0) {
            return invalid(format!("timestep must be positive, got {}", self.timestep));
        }
        if self.joints.is_empty() {
            return invalid("model has no joints".to_string());
        }

        let mut names = HashSet::new();
        for joint in &self.joints {
            if !names.insert(joint.name.as_str()) {
                return invalid(format!("duplicate joint `{}`", joint.name));
            }
            if !(joint.mass.is_finite() && joint.mass > 0.0) {
                return invalid(format!("joint `{}` has non-positive mass", joint.name));
            }
            if !(joint.damping.is_finite() && joint.damping >= 0.0) {
                return invalid(format!("joint `{}` has negative damping", joint.name));
            }
            if !joint.qpos0.is_finite() {
                return invalid(format!("joint `{}` has non-finite qpos0", joint.name));
            }
            if let Some([lo, hi]) = joint.range {
                if !(lo.is_finite() && hi.is_finite() && lo < hi) {
                    return invalid(format!("joint `{}` has an empty range", joint.name));
                }
            }
        }

        let mut names = HashSet::new();
        for actuator in &self.actuators {
            if !names.insert(actuator.name.as_str()) {
                return invalid(format!("duplicate actuator `{}`", actuator.name));
            }
            if !(actuator.kv.is_finite() && actuator.kv >= 0.0) {
                return invalid(format!("actuator `{}` has negative gain", actuator.name));
            }
            if let Some([lo, hi]) = actuator.ctrlrange {
                if !(lo.is_finite() && hi.is_finite() && lo <= hi) {
                    return invalid(format!("actuator `{}` has an empty ctrlrange", actuator.name));
                }
            }
        }
        self.actuator_joints()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maze_is_valid() {
        let maze = SlideModel::maze();
        maze.validate().unwrap();
        assert_eq!(maze.joint_index("slider:obstacle"), Some(0));
        assert_eq!(maze.actuator_index("obstacle"), Some(0));
        assert_eq!(maze.actuator_joints().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn defaults_fill_missing_fields() {
        let model = SlideModel::from_json(
            r#"{ "joints": [{ "name": "x" }], "actuators": [{ "name": "m", "joint": "x" }] }"#,
        )
        .unwrap();
        assert!((model.timestep - DEFAULT_TIMESTEP).abs() < f64::EPSILON);
        assert!((model.joints[0].mass - 1.0).abs() < f64::EPSILON);
        assert!(model.joints[0].range.is_none());
        assert!((model.actuators[0].kv - DEFAULT_KV).abs() < f64::EPSILON);
    }

    #[test]
    fn actuator_on_missing_joint_is_rejected() {
        let err = SlideModel::from_json(
            r#"{ "joints": [{ "name": "x" }], "actuators": [{ "name": "m", "joint": "y" }] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, PhysicsError::InvalidModel(_)), "{err:?}");
    }

    #[test]
    fn duplicate_joint_is_rejected() {
        let err = SlideModel::from_json(r#"{ "joints": [{ "name": "x" }, { "name": "x" }] }"#)
            .unwrap_err();
        assert!(matches!(err, PhysicsError::InvalidModel(_)));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let err = SlideModel::from_json(r#"{ "joints": [{ "name": "x", "range": [1.0, -1.0] }] }"#)
            .unwrap_err();
        assert!(matches!(err, PhysicsError::InvalidModel(_)));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = SlideModel::from_json("{ joints: ").unwrap_err();
        assert!(matches!(err, PhysicsError::ModelParse(_)));
    }
}

//! Physics Configuration
//!
//! World-wide simulation parameters. `Default` matches the values the game
//! shipped with (Earth gravity, 95% angular damping per second).
//!
//! Configs can be loaded from JSON; missing fields fall back to defaults:
//!
//! ```json
//! { "gravity": [0.0, -9.81, 0.0], "angular_damping": 0.9 }
//! ```

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Errors raised while loading or validating a [`PhysicsConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the config file failed.
    #[error("failed to read physics config: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid JSON for a physics config.
    #[error("malformed physics config: {0}")]
    Json(#[from] serde_json::Error),

    /// A field parsed but holds an unusable value.
    #[error("invalid physics config field `{field}`: {reason}")]
    Invalid {
        /// Name of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// Global simulation parameters for a [`PhysicsWorld`](super::PhysicsWorld).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Gravity acceleration (m/s²), applied to every finite-mass body.
    pub gravity: Vec3,
    /// Fraction of angular velocity removed per second. The per-step factor
    /// is `(1 - angular_damping)^dt`. Linear velocity is never damped.
    pub angular_damping: f32,
    /// Steps with `dt` at or below this (or non-finite) skip integration.
    pub min_delta_time: f32,
    /// Mass given to descriptors from [`PhysicsWorld::body_desc`](super::PhysicsWorld::body_desc).
    pub default_mass: f32,
    /// Restitution given to descriptors from [`PhysicsWorld::body_desc`](super::PhysicsWorld::body_desc).
    pub default_restitution: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.81, 0.0),
            angular_damping: 0.95,
            min_delta_time: 1e-6,
            default_mass: 1.0,
            default_restitution: 0.5,
        }
    }
}

impl PhysicsConfig {
    /// Default config with a custom gravity vector.
    pub fn with_gravity(gravity: Vec3) -> Self {
        Self {
            gravity,
            ..Self::default()
        }
    }

    /// Default config without gravity.
    pub fn zero_gravity() -> Self {
        Self::with_gravity(Vec3::ZERO)
    }

    /// Per-step multiplier applied to angular velocity for a step of `dt` seconds.
    pub fn angular_damping_factor(&self, dt: f32) -> f32 {
        (1.0 - self.angular_damping).powf(dt)
    }

    /// True when a step of `dt` seconds should integrate motion.
    pub fn accepts_delta_time(&self, dt: f32) -> bool {
        dt.is_finite() && dt > self.min_delta_time
    }

    /// Parses and validates a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        info!(path = %path.display(), gravity = ?config.gravity, "loaded physics config");
        Ok(config)
    }

    /// Serializes the config as pretty JSON.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks every field for values the solver cannot use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.gravity.is_finite() {
            return Err(invalid("gravity", format!("{:?} is not finite", self.gravity)));
        }
        if !(0.0..1.0).contains(&self.angular_damping) {
            return Err(invalid(
                "angular_damping",
                format!("{} is outside [0, 1)", self.angular_damping),
            ));
        }
        if !(self.min_delta_time >= 0.0) {
            return Err(invalid(
                "min_delta_time",
                format!("{} must be >= 0", self.min_delta_time),
            ));
        }
        if !(self.default_mass > 0.0 && self.default_mass.is_finite()) {
            return Err(invalid(
                "default_mass",
                format!("{} must be positive and finite", self.default_mass),
            ));
        }
        if !(self.default_restitution >= 0.0) {
            return Err(invalid(
                "default_restitution",
                format!("{} must be >= 0", self.default_restitution),
            ));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_is_valid() {
        let config = PhysicsConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.gravity, Vec3::new(0.0, -9.81, 0.0));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = PhysicsConfig::from_json_str(r#"{ "angular_damping": 0.5 }"#).unwrap();
        assert_relative_eq!(config.angular_damping, 0.5);
        assert_eq!(config.gravity, PhysicsConfig::default().gravity);
        assert_relative_eq!(config.default_mass, 1.0);
    }

    #[test]
    fn test_json_round_trip() {
        let config = PhysicsConfig::with_gravity(Vec3::new(0.0, -1.62, 0.0));
        let json = config.to_json_string().unwrap();
        assert_eq!(PhysicsConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_rejects_bad_damping() {
        let err = PhysicsConfig::from_json_str(r#"{ "angular_damping": 1.0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "angular_damping", .. }));
    }

    #[test]
    fn test_rejects_non_positive_mass() {
        let config = PhysicsConfig {
            default_mass: 0.0,
            ..PhysicsConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "default_mass", .. })
        ));
    }

    #[test]
    fn test_malformed_json() {
        let err = PhysicsConfig::from_json_str("{ gravity: ").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = PhysicsConfig::load("/definitely/not/here/physics.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_delta_time_gate() {
        let config = PhysicsConfig::default();
        assert!(config.accepts_delta_time(1.0 / 60.0));
        assert!(!config.accepts_delta_time(0.0));
        assert!(!config.accepts_delta_time(-0.016));
        assert!(!config.accepts_delta_time(f32::NAN));
        assert!(!config.accepts_delta_time(f32::INFINITY));
    }

    #[test]
    fn test_damping_factor() {
        let config = PhysicsConfig::default();
        assert_relative_eq!(config.angular_damping_factor(1.0), 0.05, epsilon = 1e-6);
        assert_relative_eq!(config.angular_damping_factor(0.0), 1.0);
    }
}

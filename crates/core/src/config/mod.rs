use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{PolySweepError, Result};

/// Top-level configuration structure for the trigger engine.
///
/// Passed to [`TriggerEngine::new`](crate::TriggerEngine::new) and changed
/// afterwards only through the engine's setters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub features: FeatureFlags,
    pub geometry: GeometryConfig,
    pub sweep: SweepConfig,
    pub markers: MarkerConfig,
    pub sound: SoundConfig,
}

impl EngineConfig {
    pub fn live_defaults() -> Self {
        Self::default()
    }

    /// Parses and validates a JSON document. Missing sections fall back to
    /// their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON config file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        let fraction = self.geometry.merge_distance_fraction;
        if !(fraction.is_finite() && fraction > 0.0) {
            return Err(PolySweepError::config(format!(
                "merge_distance_fraction must be positive, got {fraction}"
            )));
        }
        let epsilon = self.geometry.parallel_epsilon;
        if !(epsilon.is_finite() && epsilon > 0.0) {
            return Err(PolySweepError::config(format!(
                "parallel_epsilon must be positive, got {epsilon}"
            )));
        }
        let lifetime = self.markers.lifetime_seconds;
        if !(lifetime.is_finite() && lifetime > 0.0) {
            return Err(PolySweepError::config(format!(
                "marker lifetime must be positive, got {lifetime}"
            )));
        }
        if !(self.markers.max_velocity.is_finite() && self.markers.max_velocity > 0.0) {
            return Err(PolySweepError::config("max_velocity must be positive"));
        }
        let (min, max) = (self.sound.min_frequency, self.sound.max_frequency);
        if !(min.is_finite() && max.is_finite() && min > 0.0 && min <= max) {
            return Err(PolySweepError::config(format!(
                "frequency band [{min}, {max}] is not a valid positive range"
            )));
        }
        if let PanMode::Stage { width } = self.sound.pan {
            if !(width.is_finite() && width > 0.0) {
                return Err(PolySweepError::config(format!(
                    "stage width must be positive, got {width}"
                )));
            }
        }
        Ok(())
    }
}

/// Toggles for which geometric features become trigger candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    /// Intersections between edges of distinct copies.
    pub use_intersections: bool,
    /// Draw the polygon with its {n/k} connectivity. When off the skip value
    /// is treated as 1.
    pub use_stars: bool,
    /// Self-intersections of the star, where its edges cut each other.
    pub use_cuts: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            use_intersections: true,
            use_stars: true,
            use_cuts: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    /// Merge distance expressed as a fraction of the polygon radius.
    pub merge_distance_fraction: f64,
    /// Cross-product denominators below this are treated as parallel.
    pub parallel_epsilon: f64,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            merge_distance_fraction: 0.001,
            parallel_epsilon: crate::geometry::PARALLEL_EPSILON,
        }
    }
}

impl GeometryConfig {
    pub fn merge_distance(&self, radius: f64) -> f64 {
        self.merge_distance_fraction * radius
    }
}

/// Direction the reference line travels as the rotation angle grows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SweepDirection {
    #[default]
    CounterClockwise,
    Clockwise,
}

/// What to do when one frame sweeps a full turn or more.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MultiRevolutionPolicy {
    /// Every candidate counts as crossed.
    #[default]
    TriggerAll,
    /// Only the final partial arc is checked.
    LastArc,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub direction: SweepDirection,
    pub multi_revolution: MultiRevolutionPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    pub lifetime_seconds: f64,
    pub max_velocity: f64,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            lifetime_seconds: 1.0,
            max_velocity: 1.0,
        }
    }
}

/// How a trigger's stereo position is derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum PanMode {
    /// Sine of the candidate's angular position.
    #[default]
    Angle,
    /// X position normalised to half the stage width.
    Stage { width: f64 },
}

/// Frequency band and panning used when a marker fires.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundConfig {
    pub min_frequency: f64,
    pub max_frequency: f64,
    pub pan: PanMode,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            min_frequency: 110.0,
            max_frequency: 880.0,
            pan: PanMode::Angle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            EngineConfig::from_json_str(r#"{"features": {"use_cuts": false}}"#).unwrap();
        assert!(!config.features.use_cuts);
        assert!(config.features.use_stars);
        assert_eq!(config.sound, SoundConfig::default());
    }

    #[test]
    fn parses_stage_pan_and_sweep_policy() {
        let json = r#"{
            "sweep": {"direction": "Clockwise", "multi_revolution": "LastArc"},
            "sound": {"pan": {"Stage": {"width": 4.0}}}
        }"#;
        let config = EngineConfig::from_json_str(json).unwrap();
        assert_eq!(config.sweep.direction, SweepDirection::Clockwise);
        assert_eq!(config.sweep.multi_revolution, MultiRevolutionPolicy::LastArc);
        assert_eq!(config.sound.pan, PanMode::Stage { width: 4.0 });
    }

    #[test]
    fn rejects_inverted_frequency_band() {
        let mut config = EngineConfig::default();
        config.sound.min_frequency = 900.0;
        let err = config.validate().unwrap_err();
        assert!(format!("{err}").contains("frequency band"));
    }

    #[test]
    fn rejects_non_positive_lifetime() {
        let json = r#"{"markers": {"lifetime_seconds": 0.0}}"#;
        assert!(matches!(
            EngineConfig::from_json_str(json),
            Err(PolySweepError::InvalidConfig(_))
        ));
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(matches!(
            EngineConfig::from_json_str("{not json"),
            Err(PolySweepError::Json(_))
        ));
    }
}

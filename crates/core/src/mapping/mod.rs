use glam::DVec2;

use crate::config::{PanMode, SoundConfig};

/// Maps a candidate's position to the pitch and stereo position of the
/// trigger it fires.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerMapping {
    sound: SoundConfig,
    max_distance: f64,
}

impl TriggerMapping {
    /// `max_distance` is the radius of the outermost copy; points at the
    /// center map to the top of the band and points at `max_distance` to the
    /// bottom.
    pub fn new(sound: SoundConfig, max_distance: f64) -> Self {
        Self {
            sound,
            max_distance,
        }
    }

    pub fn max_distance(&self) -> f64 {
        self.max_distance
    }

    pub fn frequency(&self, position: DVec2) -> f64 {
        let SoundConfig {
            min_frequency,
            max_frequency,
            ..
        } = self.sound;
        let ratio = if self.max_distance > 0.0 {
            (position.length() / self.max_distance).clamp(0.0, 1.0)
        } else {
            0.0
        };
        max_frequency - ratio * (max_frequency - min_frequency)
    }

    /// Pan in `[-1, 1]`.
    pub fn pan(&self, position: DVec2, angle: f64) -> f64 {
        let pan = match self.sound.pan {
            PanMode::Angle => angle.sin(),
            PanMode::Stage { width } => position.x / (width * 0.5),
        };
        if pan.is_finite() {
            pan.clamp(-1.0, 1.0)
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sound(pan: PanMode) -> SoundConfig {
        SoundConfig {
            min_frequency: 100.0,
            max_frequency: 500.0,
            pan,
        }
    }

    #[test]
    fn frequency_falls_with_distance() {
        let mapping = TriggerMapping::new(sound(PanMode::Angle), 2.0);
        assert!((mapping.frequency(DVec2::ZERO) - 500.0).abs() < 1e-9);
        assert!((mapping.frequency(DVec2::new(1.0, 0.0)) - 300.0).abs() < 1e-9);
        assert!((mapping.frequency(DVec2::new(0.0, 2.0)) - 100.0).abs() < 1e-9);
        // beyond the outermost copy stays at the bottom of the band
        assert!((mapping.frequency(DVec2::new(5.0, 0.0)) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn angle_pan_uses_sine() {
        let mapping = TriggerMapping::new(sound(PanMode::Angle), 1.0);
        let quarter = std::f64::consts::FRAC_PI_2;
        assert!((mapping.pan(DVec2::Y, quarter) - 1.0).abs() < 1e-12);
        assert!(mapping.pan(DVec2::X, 0.0).abs() < 1e-12);
    }

    #[test]
    fn stage_pan_normalises_and_clamps() {
        let mapping = TriggerMapping::new(sound(PanMode::Stage { width: 4.0 }), 1.0);
        assert!((mapping.pan(DVec2::new(1.0, 0.0), 0.0) - 0.5).abs() < 1e-12);
        assert_eq!(mapping.pan(DVec2::new(-10.0, 0.0), 0.0), -1.0);
    }
}

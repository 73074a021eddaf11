use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::RotationState;

/// Converts a tempo into an unbounded sweep angle.
///
/// The angle is never wrapped, so frames that cover several turns keep their
/// full delta for the crossing detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepClock {
    pub bpm: f64,
    pub beats_per_revolution: f64,
    pub angle: f64,
    pub time_seconds: f64,
}

impl Default for SweepClock {
    fn default() -> Self {
        Self::new(120.0)
    }
}

impl SweepClock {
    pub fn new(bpm: f64) -> Self {
        Self {
            bpm,
            beats_per_revolution: 4.0,
            angle: 0.0,
            time_seconds: 0.0,
        }
    }

    pub fn with_beats_per_revolution(mut self, beats: f64) -> Self {
        self.beats_per_revolution = beats;
        self
    }

    /// Radians per second. A negative tempo turns the sweep backwards.
    pub fn angular_velocity(&self) -> f64 {
        if self.beats_per_revolution <= 0.0 || !self.beats_per_revolution.is_finite() {
            return 0.0;
        }
        TAU * (self.bpm / 60.0) / self.beats_per_revolution
    }

    pub fn set_bpm(&mut self, bpm: f64) {
        self.bpm = bpm;
    }

    pub fn reset(&mut self) {
        self.angle = 0.0;
        self.time_seconds = 0.0;
    }

    /// Moves the clock forward. Non-positive or non-finite deltas leave it in
    /// place and report a frame with no rotation.
    pub fn advance(&mut self, delta: f64) -> RotationState {
        let previous = self.angle;
        if delta.is_finite() && delta > 0.0 {
            self.time_seconds += delta;
            self.angle += self.angular_velocity() * delta;
        }
        RotationState::new(previous, self.angle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_revolution_per_bar() {
        let mut clock = SweepClock::new(60.0);
        // 60 bpm, four beats per turn: one turn every four seconds
        let rotation = clock.advance(1.0);
        assert!((rotation.delta() - TAU / 4.0).abs() < 1e-12);
        assert!((clock.time_seconds - 1.0).abs() < 1e-12);
    }

    #[test]
    fn angle_is_left_unbounded() {
        let mut clock = SweepClock::new(6000.0);
        let rotation = clock.advance(0.1);
        assert!(rotation.delta() > TAU);
        assert!(clock.angle > TAU);
    }

    #[test]
    fn negative_or_nan_deltas_do_not_move() {
        let mut clock = SweepClock::new(120.0);
        clock.advance(0.5);
        let angle = clock.angle;

        assert_eq!(clock.advance(-0.2).delta(), 0.0);
        assert_eq!(clock.advance(f64::NAN).delta(), 0.0);
        assert_eq!(clock.angle, angle);
    }

    #[test]
    fn negative_bpm_runs_backwards() {
        let mut clock = SweepClock::new(-60.0);
        let rotation = clock.advance(1.0);
        assert!((rotation.delta() + TAU / 4.0).abs() < 1e-12);
        assert!((clock.time_seconds - 1.0).abs() < 1e-12);
    }

    #[test]
    fn reset_returns_to_origin() {
        let mut clock = SweepClock::new(90.0).with_beats_per_revolution(3.0);
        clock.advance(2.0);
        clock.reset();
        assert_eq!(clock.angle, 0.0);
        assert_eq!(clock.time_seconds, 0.0);
    }
}

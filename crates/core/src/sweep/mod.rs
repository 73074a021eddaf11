//! Decides which fixed candidates the rotating reference line passed between
//! two frames.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::{
    config::{MultiRevolutionPolicy, SweepConfig, SweepDirection},
    CandidateId, CandidatePoint,
};

/// Wraps any finite angle into `[0, 2π)`.
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid rounds tiny negative inputs up to exactly TAU
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Whether `position` lies in the counter-clockwise arc `(previous, current]`.
/// All three angles must already be normalised.
pub fn angle_in_arc(previous: f64, current: f64, position: f64) -> bool {
    if current >= previous {
        previous < position && position <= current
    } else {
        position > previous || position <= current
    }
}

/// Whether `position` lies in the arc `[current, previous)` swept while the
/// line travels backwards from `previous` to `current`. All three angles must
/// already be normalised.
pub fn angle_in_reverse_arc(previous: f64, current: f64, position: f64) -> bool {
    if current <= previous {
        current <= position && position < previous
    } else {
        position < previous || position >= current
    }
}

/// Sweep angles of two consecutive frames, in radians of any magnitude.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RotationState {
    pub previous: f64,
    pub current: f64,
}

impl RotationState {
    pub fn new(previous: f64, current: f64) -> Self {
        Self { previous, current }
    }

    pub fn from_degrees(previous: f64, current: f64) -> Self {
        Self::new(previous.to_radians(), current.to_radians())
    }

    pub fn at(angle: f64) -> Self {
        Self::new(angle, angle)
    }

    /// The state for the next frame: the current angle becomes the previous.
    pub fn advance(&self, next: f64) -> Self {
        Self::new(self.current, next)
    }

    pub fn delta(&self) -> f64 {
        self.current - self.previous
    }
}

/// Arc covered by the reference line during one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SweepArc {
    /// Nothing was swept.
    Empty,
    /// A full turn or more; every candidate was passed.
    Full,
    /// Forward arc between two normalised angles.
    Partial { from: f64, to: f64 },
    /// Arc travelled backwards, from `from` down to `to`.
    Reverse { from: f64, to: f64 },
}

impl SweepArc {
    pub fn contains(&self, angle: f64) -> bool {
        match *self {
            SweepArc::Empty => false,
            SweepArc::Full => angle.is_finite(),
            SweepArc::Partial { from, to } => {
                angle.is_finite() && angle_in_arc(from, to, normalize_angle(angle))
            }
            SweepArc::Reverse { from, to } => {
                angle.is_finite() && angle_in_reverse_arc(from, to, normalize_angle(angle))
            }
        }
    }
}

/// Stateless crossing test driven once per frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CrossingDetector {
    direction: SweepDirection,
    policy: MultiRevolutionPolicy,
}

impl CrossingDetector {
    pub fn new(direction: SweepDirection, policy: MultiRevolutionPolicy) -> Self {
        Self { direction, policy }
    }

    pub fn from_config(config: &SweepConfig) -> Self {
        Self::new(config.direction, config.multi_revolution)
    }

    pub fn arc(&self, rotation: RotationState) -> SweepArc {
        let delta = rotation.delta();
        if !delta.is_finite() {
            tracing::warn!(?rotation, "dropping frame with non-finite sweep angle");
            return SweepArc::Empty;
        }
        if delta == 0.0 {
            return SweepArc::Empty;
        }
        if delta.abs() >= TAU && self.policy == MultiRevolutionPolicy::TriggerAll {
            return SweepArc::Full;
        }

        let from = normalize_angle(rotation.previous);
        let to = normalize_angle(rotation.current);
        if from == to {
            SweepArc::Empty
        } else if delta > 0.0 {
            SweepArc::Partial { from, to }
        } else {
            SweepArc::Reverse { from, to }
        }
    }

    /// Whether a candidate at the given angle was passed this frame.
    pub fn is_crossed(&self, arc: SweepArc, angle: f64) -> bool {
        match self.direction {
            SweepDirection::CounterClockwise => arc.contains(angle),
            // a clockwise line at sweep angle θ sits at -θ
            SweepDirection::Clockwise => arc.contains(-angle),
        }
    }

    /// Candidates passed this frame, in candidate order. Never mutates them.
    pub fn crossed<'a>(
        &self,
        rotation: RotationState,
        candidates: &'a [CandidatePoint],
    ) -> Vec<&'a CandidatePoint> {
        let arc = self.arc(rotation);
        if arc == SweepArc::Empty {
            return Vec::new();
        }
        candidates
            .iter()
            .filter(|candidate| self.is_crossed(arc, candidate.angle))
            .collect()
    }

    pub fn detect(&self, rotation: RotationState, candidates: &[CandidatePoint]) -> Vec<CandidateId> {
        self.crossed(rotation, candidates)
            .into_iter()
            .map(|candidate| candidate.id)
            .collect()
    }
}

use std::collections::HashMap;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::sweep::normalize_angle;

/// Which geometric feature produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CandidateKind {
    SelfIntersection,
    PairwiseIntersection,
    Vertex,
}

/// Stable identity of a candidate, derived from its rounded position.
///
/// Positions are rounded to a grid of half the merge distance, so two points
/// sharing an identity would always have been merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CandidateId {
    x: i64,
    y: i64,
}

impl CandidateId {
    pub fn from_position(position: DVec2, merge_distance: f64) -> Self {
        let quantum = merge_distance * 0.5;
        Self {
            x: (position.x / quantum).round() as i64,
            y: (position.y / quantum).round() as i64,
        }
    }
}

/// A fixed feature that the sweep line can pass over.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandidatePoint {
    pub id: CandidateId,
    pub position: DVec2,
    pub kind: CandidateKind,
    /// `atan2(y, x)` normalised to `[0, 2π)`.
    pub angle: f64,
}

impl CandidatePoint {
    pub fn new(position: DVec2, kind: CandidateKind, merge_distance: f64) -> Self {
        Self {
            id: CandidateId::from_position(position, merge_distance),
            position,
            kind,
            angle: normalize_angle(position.y.atan2(position.x)),
        }
    }

    pub fn distance_to_center(&self) -> f64 {
        self.position.length()
    }
}

/// Insertion-ordered set of candidates that merges points closer than the
/// merge distance. Lookups go through a uniform grid with cells one merge
/// distance wide, so only the 3x3 neighbourhood is scanned.
#[derive(Debug, Clone)]
pub struct CandidateSet {
    merge_distance: f64,
    points: Vec<CandidatePoint>,
    grid: HashMap<(i64, i64), Vec<usize>>,
    rejected_non_finite: usize,
}

impl CandidateSet {
    pub fn new(merge_distance: f64) -> Self {
        Self {
            merge_distance,
            points: Vec::new(),
            grid: HashMap::new(),
            rejected_non_finite: 0,
        }
    }

    /// A set seeded with polygon vertices, used to reject intersections that
    /// only touch a corner.
    pub fn from_vertices<'a>(
        vertices: impl IntoIterator<Item = &'a DVec2>,
        merge_distance: f64,
    ) -> Self {
        let mut set = Self::new(merge_distance);
        for vertex in vertices {
            set.insert(*vertex, CandidateKind::Vertex);
        }
        set
    }

    pub fn merge_distance(&self) -> f64 {
        self.merge_distance
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[CandidatePoint] {
        &self.points
    }

    pub fn into_points(self) -> Vec<CandidatePoint> {
        self.points
    }

    /// Number of NaN or infinite positions refused so far.
    pub fn rejected_non_finite(&self) -> usize {
        self.rejected_non_finite
    }

    pub fn contains_near(&self, position: DVec2) -> bool {
        self.find_near(position).is_some()
    }

    pub fn find_near(&self, position: DVec2) -> Option<&CandidatePoint> {
        if !position.is_finite() {
            return None;
        }
        let (cx, cy) = self.cell(position);
        for dx in -1..=1 {
            for dy in -1..=1 {
                let Some(bucket) = self.grid.get(&(cx + dx, cy + dy)) else {
                    continue;
                };
                for &index in bucket {
                    let existing = &self.points[index];
                    if existing.position.distance(position) < self.merge_distance {
                        return Some(existing);
                    }
                }
            }
        }
        None
    }

    /// Adds the point unless it is non-finite or merges with an existing one.
    /// Returns whether it was retained.
    pub fn insert(&mut self, position: DVec2, kind: CandidateKind) -> bool {
        if !position.is_finite() {
            self.rejected_non_finite += 1;
            return false;
        }
        if self.contains_near(position) {
            return false;
        }

        let index = self.points.len();
        self.points
            .push(CandidatePoint::new(position, kind, self.merge_distance));
        self.grid.entry(self.cell(position)).or_default().push(index);
        true
    }

    fn cell(&self, position: DVec2) -> (i64, i64) {
        (
            (position.x / self.merge_distance).floor() as i64,
            (position.y / self.merge_distance).floor() as i64,
        )
    }
}

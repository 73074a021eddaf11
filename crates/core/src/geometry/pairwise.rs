use super::{
    candidate::{CandidateKind, CandidatePoint, CandidateSet},
    polygon::PolygonRing,
    segment::{segment_intersection_eps, PARALLEL_EPSILON},
};
use crate::CopyTransform;

/// Finds crossings between the edges of distinct copies of one polygon.
///
/// The search is `O(copies² × n²)` and belongs on the parameter-change path
/// only. The last result is retained for inspection and is cleared on every
/// call, including calls that return nothing.
#[derive(Debug, Clone)]
pub struct PairwiseIntersectionFinder {
    merge_distance: f64,
    parallel_epsilon: f64,
    retained: Vec<CandidatePoint>,
}

impl PairwiseIntersectionFinder {
    pub fn new(merge_distance: f64) -> Self {
        Self {
            merge_distance,
            parallel_epsilon: PARALLEL_EPSILON,
            retained: Vec::new(),
        }
    }

    pub fn with_parallel_epsilon(mut self, parallel_epsilon: f64) -> Self {
        self.parallel_epsilon = parallel_epsilon;
        self
    }

    pub fn set_merge_distance(&mut self, merge_distance: f64) {
        self.merge_distance = merge_distance;
    }

    pub fn set_parallel_epsilon(&mut self, parallel_epsilon: f64) {
        self.parallel_epsilon = parallel_epsilon;
    }

    /// Points found by the most recent [`find`](Self::find).
    pub fn retained(&self) -> &[CandidatePoint] {
        &self.retained
    }

    pub fn clear(&mut self) {
        self.retained.clear();
    }

    pub fn find(
        &mut self,
        base: &PolygonRing,
        copies: &[CopyTransform],
        group_rotation: f64,
        enabled: bool,
    ) -> &[CandidatePoint] {
        self.retained.clear();
        if !enabled || copies.len() < 2 {
            return &self.retained;
        }

        let rings: Vec<PolygonRing> = copies
            .iter()
            .map(|copy| base.transformed(copy, group_rotation))
            .collect();
        let vertices = CandidateSet::from_vertices(
            rings.iter().flat_map(|ring| ring.vertices()),
            self.merge_distance,
        );
        let mut found = CandidateSet::new(self.merge_distance);

        for (a, first) in rings.iter().enumerate() {
            for second in &rings[a + 1..] {
                self.collect_pair(first, second, &vertices, &mut found);
            }
        }

        self.retained = found.into_points();
        &self.retained
    }

    fn collect_pair(
        &self,
        first: &PolygonRing,
        second: &PolygonRing,
        vertices: &CandidateSet,
        found: &mut CandidateSet,
    ) {
        for (p1, p2) in first.edges() {
            if p1.distance(p2) < self.merge_distance {
                continue;
            }
            for (p3, p4) in second.edges() {
                if p3.distance(p4) < self.merge_distance {
                    continue;
                }
                let Some(point) = segment_intersection_eps(p1, p2, p3, p4, self.parallel_epsilon)
                else {
                    continue;
                };
                // a crossing always lies on its own two edges, so only
                // vertices can make it spurious; triple points are kept
                if vertices.contains_near(point) {
                    continue;
                }
                found.insert(point, CandidateKind::PairwiseIntersection);
            }
        }
    }
}

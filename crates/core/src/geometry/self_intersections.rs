use super::{
    candidate::{CandidateKind, CandidatePoint, CandidateSet},
    polygon::{has_self_intersections, PolygonRing, PolygonSpec},
    segment::{segment_intersection_eps, PARALLEL_EPSILON},
};

/// Finds the points where a star polygon's own edges cross.
#[derive(Debug, Clone, Copy)]
pub struct SelfIntersectionFinder {
    merge_distance: f64,
    parallel_epsilon: f64,
}

impl SelfIntersectionFinder {
    pub fn new(merge_distance: f64) -> Self {
        Self {
            merge_distance,
            parallel_epsilon: PARALLEL_EPSILON,
        }
    }

    pub fn with_parallel_epsilon(mut self, parallel_epsilon: f64) -> Self {
        self.parallel_epsilon = parallel_epsilon;
        self
    }

    /// Deduplicated self-intersections of `ring`, which must be the
    /// connectivity walk generated for `spec`. Stars without crossings return
    /// immediately without searching.
    pub fn find(&self, spec: &PolygonSpec, ring: &PolygonRing) -> Vec<CandidatePoint> {
        if !has_self_intersections(spec.sides, spec.skip) {
            return Vec::new();
        }

        let walk = ring.vertices();
        let n = walk.len();
        let vertices = CandidateSet::from_vertices(walk, self.merge_distance);
        let mut found = CandidateSet::new(self.merge_distance);

        let edge = |i: usize| (walk[i], walk[(i + 1) % n]);

        for i in 0..n {
            let (p1, p2) = edge(i);
            if p1.distance(p2) < self.merge_distance {
                continue;
            }
            for j in (i + 2)..n {
                // the closing edge shares vertex 0 with the first edge
                if i == 0 && j == n - 1 {
                    continue;
                }
                let (p3, p4) = edge(j);
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
                found.insert(point, CandidateKind::SelfIntersection);
            }
        }

        found.into_points()
    }
}

/// Groups points by distance from the origin, outermost ring first.
///
/// A regular {n/k} star with `gcd(n, k) == 1` produces `k - 1` rings of `n`
/// crossings each.
pub fn group_into_rings(points: &[CandidatePoint], tolerance: f64) -> Vec<Vec<CandidatePoint>> {
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| b.distance_to_center().total_cmp(&a.distance_to_center()));

    let mut rings: Vec<Vec<CandidatePoint>> = Vec::new();
    for point in sorted {
        let radius = point.distance_to_center();
        match rings.last_mut() {
            Some(ring) if (ring[0].distance_to_center() - radius).abs() <= tolerance => {
                ring.push(point)
            }
            _ => rings.push(vec![point]),
        }
    }
    rings
}

/// Radius of the outermost crossing ring, if the star has one.
pub fn outer_ring_radius(points: &[CandidatePoint]) -> Option<f64> {
    points
        .iter()
        .map(CandidatePoint::distance_to_center)
        .max_by(f64::total_cmp)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find(sides: u32, skip: i32, radius: f64) -> Vec<CandidatePoint> {
        let spec = PolygonSpec::new(sides, skip, radius).unwrap();
        let ring = PolygonRing::generate(&spec).unwrap();
        SelfIntersectionFinder::new(0.001 * radius).find(&spec, &ring)
    }

    #[test]
    fn pentagram_has_five_equidistant_crossings() {
        let radius = 1.0;
        let points = find(5, 2, radius);
        assert_eq!(points.len(), 5);

        let first = points[0].distance_to_center();
        // inner pentagon of {5/2}: cos(72°) / cos(36°)
        let expected = (72f64.to_radians().cos() / 36f64.to_radians().cos()) * radius;
        assert!((first - expected).abs() < 1e-9);

        let spec = PolygonSpec::new(5, 2, radius).unwrap();
        let ring = PolygonRing::generate(&spec).unwrap();
        for point in &points {
            assert!((point.distance_to_center() - first).abs() < 1e-9);
            assert_eq!(point.kind, CandidateKind::SelfIntersection);
            for vertex in ring.vertices() {
                assert!(vertex.distance(point.position) > 0.001 * radius);
            }
        }
    }

    #[test]
    fn square_has_no_crossings() {
        assert!(find(4, 1, 1.0).is_empty());
    }

    #[test]
    fn non_coprime_star_short_circuits() {
        assert!(find(6, 2, 1.0).is_empty());
        assert!(find(8, 4, 1.0).is_empty());
    }

    #[test]
    fn heptagrams_have_distinct_outer_rings() {
        let two = find(7, 2, 1.0);
        let three = find(7, 3, 1.0);

        assert_eq!(two.len(), 7);
        let rings_two = group_into_rings(&two, 1e-6);
        assert_eq!(rings_two.len(), 1);

        // {7/3} crosses itself on two rings of seven
        let rings_three = group_into_rings(&three, 1e-6);
        assert_eq!(rings_three.len(), 2);
        assert!(rings_three.iter().all(|ring| ring.len() == 7));
        assert_eq!(three.len(), 14);

        let outer_two = outer_ring_radius(&two).unwrap();
        let outer_three = outer_ring_radius(&three).unwrap();
        assert!((outer_two - outer_three).abs() > 0.01);
    }

    #[test]
    fn recomputation_is_identical() {
        let first = find(9, 4, 3.0);
        let second = find(9, 4, 3.0);
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(&second) {
            assert!(a.position.distance(b.position) < 1e-12);
            assert_eq!(a.id, b.id);
        }
    }
}

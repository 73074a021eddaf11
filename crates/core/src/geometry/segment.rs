use glam::DVec2;

/// Cross-product denominators smaller than this are treated as parallel.
pub const PARALLEL_EPSILON: f64 = 1e-10;

/// Intersection of the segments `p1-p2` and `p3-p4`.
///
/// Parallel and collinear segments report no intersection, including
/// collinear segments that overlap.
pub fn segment_intersection(p1: DVec2, p2: DVec2, p3: DVec2, p4: DVec2) -> Option<DVec2> {
    segment_intersection_eps(p1, p2, p3, p4, PARALLEL_EPSILON)
}

pub fn segment_intersection_eps(
    p1: DVec2,
    p2: DVec2,
    p3: DVec2,
    p4: DVec2,
    parallel_epsilon: f64,
) -> Option<DVec2> {
    let a = p2 - p1;
    let b = p4 - p3;
    let offset = p1 - p3;

    let denominator = b.y * a.x - b.x * a.y;
    if !denominator.is_finite() || denominator.abs() < parallel_epsilon {
        return None;
    }

    let ua = (b.x * offset.y - b.y * offset.x) / denominator;
    let ub = (a.x * offset.y - a.y * offset.x) / denominator;

    // `contains` is false for NaN as well
    if !(0.0..=1.0).contains(&ua) || !(0.0..=1.0).contains(&ub) {
        return None;
    }

    Some(p1 + a * ua)
}

/// Every crossing between the edges of two closed rings, without any
/// deduplication. Rings with fewer than two points have no edges.
pub fn intersections_between_rings(first: &[DVec2], second: &[DVec2]) -> Vec<DVec2> {
    let mut found = Vec::new();
    for (p1, p2) in closed_edges(first) {
        for (p3, p4) in closed_edges(second) {
            if let Some(point) = segment_intersection(p1, p2, p3, p4) {
                found.push(point);
            }
        }
    }
    found
}

fn closed_edges(ring: &[DVec2]) -> impl Iterator<Item = (DVec2, DVec2)> + '_ {
    let len = if ring.len() < 2 { 0 } else { ring.len() };
    (0..len).map(move |i| (ring[i], ring[(i + 1) % ring.len()]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f64, y: f64) -> DVec2 {
        DVec2::new(x, y)
    }

    #[test]
    fn crossing_diagonals_meet_in_the_middle() {
        let hit = segment_intersection(v(0.0, 0.0), v(2.0, 2.0), v(0.0, 2.0), v(2.0, 0.0));
        assert!(hit.unwrap().distance(v(1.0, 1.0)) < 1e-12);
    }

    #[test]
    fn endpoints_count_as_hits() {
        let hit = segment_intersection(v(0.0, 0.0), v(1.0, 0.0), v(1.0, 0.0), v(1.0, 1.0));
        assert!(hit.unwrap().distance(v(1.0, 0.0)) < 1e-12);
    }

    #[test]
    fn lines_that_meet_outside_the_segments_miss() {
        let hit = segment_intersection(v(0.0, 0.0), v(1.0, 0.0), v(2.0, -1.0), v(2.0, 1.0));
        assert!(hit.is_none());
    }

    #[test]
    fn parallel_and_collinear_segments_miss() {
        assert!(segment_intersection(v(0.0, 0.0), v(1.0, 0.0), v(0.0, 1.0), v(1.0, 1.0)).is_none());
        // overlapping collinear segments are deliberately not resolved
        assert!(segment_intersection(v(0.0, 0.0), v(2.0, 0.0), v(1.0, 0.0), v(3.0, 0.0)).is_none());
    }

    #[test]
    fn near_parallel_below_epsilon_is_rejected() {
        let hit = segment_intersection(
            v(0.0, 0.0),
            v(1.0, 0.0),
            v(0.0, -1e-12),
            v(1.0, 1e-12),
        );
        assert!(hit.is_none());
    }

    #[test]
    fn nan_input_never_produces_a_point() {
        let hit = segment_intersection(v(f64::NAN, 0.0), v(1.0, 1.0), v(0.0, 1.0), v(1.0, 0.0));
        assert!(hit.is_none());
    }

    #[test]
    fn two_offset_squares_cross_eight_times() {
        let square = [v(-1.0, -1.0), v(1.0, -1.0), v(1.0, 1.0), v(-1.0, 1.0)];
        let diamond = [v(0.0, -1.3), v(1.3, 0.0), v(0.0, 1.3), v(-1.3, 0.0)];
        assert_eq!(intersections_between_rings(&square, &diamond).len(), 8);
        assert!(intersections_between_rings(&square, &diamond[..1]).is_empty());
    }
}

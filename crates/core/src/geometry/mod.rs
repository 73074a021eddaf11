//! Polygon generation and the intersection searches that turn a layer of
//! polygon copies into trigger candidates.

pub mod candidate;
pub mod pairwise;
pub mod polygon;
pub mod segment;
pub mod self_intersections;

pub use candidate::{CandidateId, CandidateKind, CandidatePoint, CandidateSet};
pub use pairwise::PairwiseIntersectionFinder;
pub use polygon::{gcd, has_self_intersections, PolygonRing, PolygonSpec};
pub use segment::{
    intersections_between_rings, segment_intersection, segment_intersection_eps,
    PARALLEL_EPSILON,
};
pub use self_intersections::{group_into_rings, outer_ring_radius, SelfIntersectionFinder};

//! Frame-synchronous orchestration of geometry, crossing detection and
//! marker lifecycles.

mod shared;

use std::sync::Arc;

pub use shared::SharedTriggerEngine;

use crate::{
    config::EngineConfig, CandidateKind, CandidatePoint, CandidateSet, CopyTransform,
    CrossingDetector, MarkerLifecycleManager, MarkerView, PairwiseIntersectionFinder,
    PolygonRing, PolygonSpec, Result, RotationState, SelfIntersectionFinder, TriggerEvent,
    TriggerMapping,
};

/// Everything one call to [`TriggerEngine::tick`] produces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameOutput {
    pub triggers: Vec<TriggerEvent>,
    pub markers: Vec<MarkerView>,
    /// The candidate geometry was rebuilt this frame.
    pub rebuilt: bool,
}

/// Per-kind counts from the last rebuild.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CandidateStats {
    pub vertices: usize,
    pub self_intersections: usize,
    pub pairwise_intersections: usize,
    pub dropped_non_finite: usize,
}

impl CandidateStats {
    pub fn total(&self) -> usize {
        self.vertices + self.self_intersections + self.pairwise_intersections
    }
}

/// Owns the candidate set of one layer and turns sweep angles into triggers.
///
/// Candidates are recomputed only after a geometry-affecting setter changed
/// something; rotation alone never causes a rebuild.
#[derive(Debug)]
pub struct TriggerEngine {
    config: EngineConfig,
    polygon: PolygonSpec,
    copies: Vec<CopyTransform>,
    group_rotation: f64,
    candidates: Arc<[CandidatePoint]>,
    stats: CandidateStats,
    pairwise: PairwiseIntersectionFinder,
    detector: CrossingDetector,
    mapping: TriggerMapping,
    markers: MarkerLifecycleManager,
    last_time: Option<f64>,
    dirty: bool,
}

impl TriggerEngine {
    pub fn new(
        config: EngineConfig,
        polygon: PolygonSpec,
        copies: Vec<CopyTransform>,
    ) -> Result<Self> {
        config.validate()?;
        polygon.validate()?;

        let merge_distance = config.geometry.merge_distance(polygon.radius);
        Ok(Self {
            pairwise: PairwiseIntersectionFinder::new(merge_distance)
                .with_parallel_epsilon(config.geometry.parallel_epsilon),
            detector: CrossingDetector::from_config(&config.sweep),
            mapping: TriggerMapping::new(config.sound, polygon.radius),
            markers: MarkerLifecycleManager::new(config.markers),
            candidates: Arc::from(Vec::new()),
            stats: CandidateStats::default(),
            config,
            polygon,
            copies,
            group_rotation: 0.0,
            last_time: None,
            dirty: true,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn polygon(&self) -> &PolygonSpec {
        &self.polygon
    }

    pub fn copies(&self) -> &[CopyTransform] {
        &self.copies
    }

    pub fn group_rotation(&self) -> f64 {
        self.group_rotation
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn stats(&self) -> CandidateStats {
        self.stats
    }

    /// Snapshot of the current candidates. A rebuild swaps in a new slice and
    /// leaves outstanding snapshots untouched.
    pub fn candidates(&self) -> Arc<[CandidatePoint]> {
        Arc::clone(&self.candidates)
    }

    pub fn markers(&self) -> &MarkerLifecycleManager {
        &self.markers
    }

    pub fn marker_views(&self) -> Vec<MarkerView> {
        self.markers.views()
    }

    /// Replaces the shared polygon. Invalid specs are rejected and leave the
    /// engine unchanged.
    pub fn set_polygon(&mut self, polygon: PolygonSpec) -> Result<()> {
        polygon.validate()?;
        if polygon != self.polygon {
            self.polygon = polygon;
            self.dirty = true;
        }
        Ok(())
    }

    pub fn set_copies(&mut self, copies: Vec<CopyTransform>) {
        if copies != self.copies {
            self.copies = copies;
            self.dirty = true;
        }
    }

    /// Rotation applied to every copy on top of its own layout offset.
    pub fn set_group_rotation(&mut self, rotation: f64) {
        if rotation != self.group_rotation {
            self.group_rotation = rotation;
            self.dirty = true;
        }
    }

    pub fn set_use_intersections(&mut self, enabled: bool) {
        if self.config.features.use_intersections != enabled {
            self.config.features.use_intersections = enabled;
            self.dirty = true;
        }
    }

    pub fn set_use_stars(&mut self, enabled: bool) {
        if self.config.features.use_stars != enabled {
            self.config.features.use_stars = enabled;
            self.dirty = true;
        }
    }

    pub fn set_use_cuts(&mut self, enabled: bool) {
        if self.config.features.use_cuts != enabled {
            self.config.features.use_cuts = enabled;
            self.dirty = true;
        }
    }

    /// Swaps the whole configuration. Geometry is rebuilt only if a
    /// geometry-affecting section changed.
    pub fn set_config(&mut self, config: EngineConfig) -> Result<()> {
        config.validate()?;
        if config.features != self.config.features
            || config.geometry != self.config.geometry
            || config.sound != self.config.sound
        {
            self.dirty = true;
        }
        self.detector = CrossingDetector::from_config(&config.sweep);
        self.markers.set_config(config.markers);
        self.config = config;
        Ok(())
    }

    /// Forces the next frame to rebuild geometry.
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    /// Recomputes the candidate set from the current parameters and resets
    /// the `Active` markers to match it.
    pub fn rebuild(&mut self, now: f64) -> Arc<[CandidatePoint]> {
        let effective = if self.config.features.use_stars {
            self.polygon
        } else {
            self.polygon.as_regular()
        };
        let copies: Vec<CopyTransform> = self
            .copies
            .iter()
            .copied()
            .filter(|copy| {
                let valid = copy.is_valid();
                if !valid {
                    tracing::warn!(?copy, "skipping copy with degenerate transform");
                }
                valid
            })
            .collect();

        let merge_distance = self.config.geometry.merge_distance(effective.radius);
        self.pairwise.set_merge_distance(merge_distance);
        self.pairwise
            .set_parallel_epsilon(self.config.geometry.parallel_epsilon);

        let (candidates, stats) = match PolygonRing::generate(&effective) {
            Ok(ring) => self.collect_candidates(&effective, &ring, &copies, merge_distance),
            Err(err) => {
                tracing::warn!(%err, "polygon produced no geometry");
                self.pairwise.clear();
                (Vec::new(), CandidateStats::default())
            }
        };

        if stats.dropped_non_finite > 0 {
            tracing::warn!(
                dropped = stats.dropped_non_finite,
                "dropped non-finite candidate points"
            );
        }
        tracing::debug!(
            vertices = stats.vertices,
            self_intersections = stats.self_intersections,
            pairwise = stats.pairwise_intersections,
            "rebuilt trigger candidates"
        );

        let max_scale = copies
            .iter()
            .map(|copy| copy.scale)
            .fold(1.0_f64, f64::max);
        self.mapping = TriggerMapping::new(self.config.sound, effective.radius * max_scale);

        self.candidates = Arc::from(candidates);
        self.stats = stats;
        self.markers
            .sync_active(&self.candidates, &self.mapping, now);
        self.dirty = false;
        self.candidates()
    }

    fn collect_candidates(
        &mut self,
        spec: &PolygonSpec,
        ring: &PolygonRing,
        copies: &[CopyTransform],
        merge_distance: f64,
    ) -> (Vec<CandidatePoint>, CandidateStats) {
        let features = self.config.features;
        let mut set = CandidateSet::new(merge_distance);
        let mut stats = CandidateStats::default();

        for copy in copies {
            for vertex in ring.vertices() {
                if set.insert(copy.apply(*vertex, self.group_rotation), CandidateKind::Vertex) {
                    stats.vertices += 1;
                }
            }
        }

        if features.use_cuts {
            let cuts = SelfIntersectionFinder::new(merge_distance)
                .with_parallel_epsilon(self.config.geometry.parallel_epsilon)
                .find(spec, ring);
            for copy in copies {
                for cut in &cuts {
                    let position = copy.apply(cut.position, self.group_rotation);
                    if set.insert(position, CandidateKind::SelfIntersection) {
                        stats.self_intersections += 1;
                    }
                }
            }
        }

        let pairwise = self
            .pairwise
            .find(ring, copies, self.group_rotation, features.use_intersections);
        for point in pairwise {
            if set.insert(point.position, CandidateKind::PairwiseIntersection) {
                stats.pairwise_intersections += 1;
            }
        }

        stats.dropped_non_finite = set.rejected_non_finite();
        (set.into_points(), stats)
    }

    /// Advances one animation frame.
    ///
    /// `now` is a monotonic time in seconds; the elapsed time since the last
    /// call drives marker decay. A frame whose elapsed time is zero, negative
    /// or non-finite neither detects crossings nor decays markers. A frame
    /// that rebuilds geometry skips crossing detection.
    pub fn tick(&mut self, now: f64, rotation: RotationState) -> FrameOutput {
        let dt = match self.last_time {
            Some(last) if now.is_finite() => now - last,
            _ => 0.0,
        };
        if now.is_finite() {
            self.last_time = Some(now);
        }

        let rebuilt = self.dirty;
        if rebuilt {
            self.rebuild(now);
        }

        let advancing = dt.is_finite() && dt > 0.0;
        let candidates = Arc::clone(&self.candidates);
        let crossed = if advancing && !rebuilt {
            self.detector.crossed(rotation, &candidates)
        } else {
            Vec::new()
        };

        let triggers = if advancing {
            self.markers.advance(dt, &crossed, &self.mapping, now)
        } else {
            self.markers.begin_frame();
            self.markers.purge();
            Vec::new()
        };

        FrameOutput {
            triggers,
            markers: self.markers.views(),
            rebuilt,
        }
    }
}

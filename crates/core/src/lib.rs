//! Core library for the polysweep trigger engine.
//!
//! A layer is a family of rotated, scaled copies of one regular or star
//! polygon. Its vertices and intersections become fixed candidate points; a
//! rotating reference line sweeps over them every frame and each candidate it
//! passes fires one trigger with a frequency and pan, followed by a decaying
//! marker for the visuals. Rendering, sound synthesis and MIDI I/O live
//! outside this crate.

pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod mapping;
pub mod markers;
pub mod scene;
pub mod sweep;
pub mod timeline;

pub use config::{
    EngineConfig, FeatureFlags, GeometryConfig, MarkerConfig, MultiRevolutionPolicy, PanMode,
    SoundConfig, SweepConfig, SweepDirection,
};
pub use engine::{CandidateStats, FrameOutput, SharedTriggerEngine, TriggerEngine};
pub use error::{PolySweepError, Result};
pub use geometry::{
    has_self_intersections, intersections_between_rings, segment_intersection, CandidateId,
    CandidateKind, CandidatePoint, CandidateSet, PairwiseIntersectionFinder, PolygonRing,
    PolygonSpec, SelfIntersectionFinder,
};
pub use mapping::TriggerMapping;
pub use markers::{Marker, MarkerLifecycleManager, MarkerState, MarkerView, TriggerEvent};
pub use scene::{CopyLayout, CopyTransform, LayerDescriptor};
pub use sweep::{normalize_angle, CrossingDetector, RotationState, SweepArc};
pub use timeline::SweepClock;

//! Runtime trigger state for candidate points.
//!
//! Markers move `Active -> Hit -> Expired`. A marker fires once when the sweep
//! passes its candidate, decays for its lifetime and is purged at the end of
//! the frame it expires in. A candidate is passed at most once per revolution,
//! so crossing a marker that is still `Hit` starts a new pass and fires it
//! again with a fresh lifetime. Expired markers are never re-armed; a later
//! pass over the same candidate creates a fresh marker.

mod arena;

use std::collections::HashMap;

use glam::DVec2;
use serde::{Deserialize, Serialize};

pub use arena::{MarkerArena, MarkerId};

use crate::{config::MarkerConfig, CandidateId, CandidateKind, CandidatePoint, TriggerMapping};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerState {
    /// Eligible to fire.
    Active,
    /// Fired during this pass and decaying.
    Hit,
    /// Terminal; removed at the end of the frame.
    Expired,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub candidate: CandidateId,
    pub kind: CandidateKind,
    pub position: DVec2,
    pub angle: f64,
    pub state: MarkerState,
    /// Seconds left before expiry. Only decreases once hit.
    pub lifetime: f64,
    pub velocity: f64,
    pub frequency: f64,
    pub pan: f64,
    pub created_at: f64,
    /// Set on the frame the marker fired.
    pub just_hit: bool,
}

impl Marker {
    fn new(candidate: &CandidatePoint, mapping: &TriggerMapping, lifetime: f64, now: f64) -> Self {
        Self {
            candidate: candidate.id,
            kind: candidate.kind,
            position: candidate.position,
            angle: candidate.angle,
            state: MarkerState::Active,
            lifetime,
            velocity: 0.0,
            frequency: mapping.frequency(candidate.position),
            pan: mapping.pan(candidate.position, candidate.angle),
            created_at: now,
            just_hit: false,
        }
    }

    pub fn lifetime_fraction(&self, total: f64) -> f64 {
        match self.state {
            MarkerState::Active => 1.0,
            MarkerState::Expired => 0.0,
            MarkerState::Hit if total > 0.0 => (self.lifetime / total).clamp(0.0, 1.0),
            MarkerState::Hit => 0.0,
        }
    }
}

/// One-shot event handed to the audio/MIDI collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TriggerEvent {
    pub candidate: CandidateId,
    pub position: DVec2,
    pub frequency: f64,
    pub pan: f64,
    pub velocity: f64,
    pub source_kind: CandidateKind,
    pub time: f64,
}

/// What the visualization collaborator needs to draw one marker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerView {
    pub candidate: CandidateId,
    pub position: DVec2,
    pub state: MarkerState,
    pub lifetime_fraction: f64,
    pub just_hit: bool,
}

/// Sole owner of the live markers.
#[derive(Debug, Clone)]
pub struct MarkerLifecycleManager {
    config: MarkerConfig,
    arena: MarkerArena<Marker>,
    by_candidate: HashMap<CandidateId, MarkerId>,
}

impl MarkerLifecycleManager {
    pub fn new(config: MarkerConfig) -> Self {
        Self {
            config,
            arena: MarkerArena::new(),
            by_candidate: HashMap::new(),
        }
    }

    pub fn config(&self) -> &MarkerConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: MarkerConfig) {
        self.config = config;
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn marker_for(&self, candidate: CandidateId) -> Option<&Marker> {
        self.by_candidate
            .get(&candidate)
            .and_then(|id| self.arena.get(*id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Marker> + '_ {
        self.arena.iter().map(|(_, marker)| marker)
    }

    pub fn count_in(&self, state: MarkerState) -> usize {
        self.iter().filter(|marker| marker.state == state).count()
    }

    /// Replaces the `Active` population with one marker per candidate.
    /// `Hit` markers are kept until they expire on their own, and their
    /// candidates do not get a second marker meanwhile.
    pub fn sync_active(&mut self, candidates: &[CandidatePoint], mapping: &TriggerMapping, now: f64) {
        let by_candidate = &mut self.by_candidate;
        self.arena.retain(
            |marker| marker.state != MarkerState::Active,
            |_, marker| {
                by_candidate.remove(&marker.candidate);
            },
        );

        for candidate in candidates {
            if self.by_candidate.contains_key(&candidate.id) {
                continue;
            }
            self.create(candidate, mapping, now);
        }
    }

    /// Runs one frame: clears last frame's hit flags, decays hit markers by
    /// `dt`, fires every crossed candidate (creating its marker first if
    /// needed, re-firing it if still `Hit` from the previous pass) and purges
    /// expired markers.
    pub fn advance(
        &mut self,
        dt: f64,
        crossed: &[&CandidatePoint],
        mapping: &TriggerMapping,
        now: f64,
    ) -> Vec<TriggerEvent> {
        self.begin_frame();
        self.decay(dt);
        let events = self.fire(crossed, mapping, now);
        self.purge();
        events
    }

    pub fn begin_frame(&mut self) {
        for (_, marker) in self.arena.iter_mut() {
            marker.just_hit = false;
        }
    }

    /// Linear decay of hit markers. Non-positive or non-finite `dt` is ignored
    /// so lifetimes never grow back.
    pub fn decay(&mut self, dt: f64) {
        if !(dt.is_finite() && dt > 0.0) {
            return;
        }
        let total = self.config.lifetime_seconds;
        let max_velocity = self.config.max_velocity;

        for (_, marker) in self.arena.iter_mut() {
            if marker.state != MarkerState::Hit {
                continue;
            }
            marker.lifetime -= dt;
            if marker.lifetime <= 0.0 {
                marker.lifetime = 0.0;
                marker.velocity = 0.0;
                marker.state = MarkerState::Expired;
            } else {
                marker.velocity = max_velocity * (marker.lifetime / total).clamp(0.0, 1.0);
            }
        }
    }

    pub fn fire(
        &mut self,
        crossed: &[&CandidatePoint],
        mapping: &TriggerMapping,
        now: f64,
    ) -> Vec<TriggerEvent> {
        let mut events = Vec::new();
        for candidate in crossed {
            if !candidate.position.is_finite() {
                tracing::warn!(?candidate.id, "dropping non-finite candidate");
                continue;
            }

            // a marker that expired this frame is left for purge; the new
            // pass gets a fresh one
            let existing = self.by_candidate.get(&candidate.id).copied().filter(|id| {
                self.arena
                    .get(*id)
                    .is_some_and(|marker| marker.state != MarkerState::Expired)
            });
            let id = match existing {
                Some(id) => id,
                None => self.create(candidate, mapping, now),
            };
            let Some(marker) = self.arena.get_mut(id) else {
                continue;
            };
            // at most one event per candidate per frame
            if marker.just_hit {
                continue;
            }

            marker.state = MarkerState::Hit;
            marker.velocity = self.config.max_velocity;
            marker.lifetime = self.config.lifetime_seconds;
            marker.just_hit = true;

            tracing::trace!(
                frequency = marker.frequency,
                pan = marker.pan,
                kind = ?marker.kind,
                "trigger"
            );
            events.push(TriggerEvent {
                candidate: marker.candidate,
                position: marker.position,
                frequency: marker.frequency,
                pan: marker.pan,
                velocity: marker.velocity,
                source_kind: marker.kind,
                time: now,
            });
        }
        events
    }

    /// Drops expired markers. Returns how many were removed.
    pub fn purge(&mut self) -> usize {
        let by_candidate = &mut self.by_candidate;
        let mut removed = 0;
        self.arena.retain(
            |marker| marker.state != MarkerState::Expired,
            |id, marker| {
                if by_candidate.get(&marker.candidate) == Some(&id) {
                    by_candidate.remove(&marker.candidate);
                }
                removed += 1;
            },
        );
        removed
    }

    pub fn views(&self) -> Vec<MarkerView> {
        let total = self.config.lifetime_seconds;
        self.iter()
            .map(|marker| MarkerView {
                candidate: marker.candidate,
                position: marker.position,
                state: marker.state,
                lifetime_fraction: marker.lifetime_fraction(total),
                just_hit: marker.just_hit,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.arena.clear();
        self.by_candidate.clear();
    }

    fn create(&mut self, candidate: &CandidatePoint, mapping: &TriggerMapping, now: f64) -> MarkerId {
        let marker = Marker::new(candidate, mapping, self.config.lifetime_seconds, now);
        let id = self.arena.insert(marker);
        self.by_candidate.insert(candidate.id, id);
        id
    }
}

use std::sync::{Arc, Mutex, MutexGuard};

use super::{FrameOutput, TriggerEngine};
use crate::{CandidatePoint, PolySweepError, Result, RotationState};

/// Thread-safe handle over a [`TriggerEngine`].
///
/// A frame holds the lock for its whole duration, so a geometry rebuild can
/// never interleave with a crossing pass. Readers that only need the
/// candidates take an immutable snapshot and release the lock immediately.
#[derive(Clone)]
pub struct SharedTriggerEngine {
    shared: Arc<Mutex<TriggerEngine>>,
}

impl SharedTriggerEngine {
    pub fn new(engine: TriggerEngine) -> Self {
        Self {
            shared: Arc::new(Mutex::new(engine)),
        }
    }

    pub fn tick(&self, now: f64, rotation: RotationState) -> Result<FrameOutput> {
        let mut engine = self.lock()?;
        Ok(engine.tick(now, rotation))
    }

    pub fn candidates(&self) -> Result<Arc<[CandidatePoint]>> {
        let engine = self.lock()?;
        Ok(engine.candidates())
    }

    /// Runs `update` with exclusive access, e.g. to call the engine's setters.
    pub fn with_engine<R>(&self, update: impl FnOnce(&mut TriggerEngine) -> R) -> Result<R> {
        let mut engine = self.lock()?;
        Ok(update(&mut engine))
    }

    fn lock(&self) -> Result<MutexGuard<'_, TriggerEngine>> {
        self.shared
            .lock()
            .map_err(|_| PolySweepError::Poisoned("trigger engine"))
    }
}

impl std::fmt::Debug for SharedTriggerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedTriggerEngine").finish()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::{CopyLayout, EngineConfig, PolygonSpec};

    fn shared() -> SharedTriggerEngine {
        let engine = TriggerEngine::new(
            EngineConfig::default(),
            PolygonSpec::new(7, 3, 1.0).unwrap(),
            CopyLayout::new(2, 0.1, 0.2).transforms(),
        )
        .unwrap();
        SharedTriggerEngine::new(engine)
    }

    #[test]
    fn snapshots_survive_rebuilds() {
        let engine = shared();
        engine.tick(0.0, RotationState::at(0.0)).unwrap();
        let snapshot = engine.candidates().unwrap();

        engine
            .with_engine(|engine| engine.set_use_cuts(false))
            .unwrap();
        engine.tick(0.1, RotationState::at(0.0)).unwrap();

        let fresh = engine.candidates().unwrap();
        assert!(fresh.len() < snapshot.len());
    }

    #[test]
    fn frames_from_another_thread() {
        let engine = shared();
        engine.tick(0.0, RotationState::at(0.0)).unwrap();

        let worker = engine.clone();
        let handle = thread::spawn(move || {
            worker
                .tick(1.0 / 60.0, RotationState::new(0.0, 10.0))
                .unwrap()
                .triggers
                .len()
        });
        let fired = handle.join().unwrap();
        assert_eq!(fired, engine.candidates().unwrap().len());
    }
}

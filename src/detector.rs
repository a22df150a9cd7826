//! The boundary with the pose-estimation model.
//!
//! Running the model is somebody else's job. What lives here is the plumbing every caller needs
//! around it: turning raw model rows into named keypoints, picking the first usable compute
//! backend, and sharing one expensive detector between callers.

use crate::{
    error::Error,
    pose::{Keypoint, KeypointKind, NUM_KEYPOINTS},
};
use ordered_float::NotNan;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// Convert PoseNet-style output rows of `[y, x, score]`, one per landmark in `KeypointKind`
/// order, into named keypoints.
pub fn decode_raw_pose(rows: &[[f32; 3]]) -> Result<Vec<Keypoint>, Error> {
    if rows.len() > NUM_KEYPOINTS {
        return Err(Error::TooManyKeypointRows(NUM_KEYPOINTS, rows.len()));
    }
    rows.iter()
        .enumerate()
        .map(|(idx, &[y, x, score])| {
            let kind = KeypointKind::from_idx(idx)?;
            Ok(Keypoint::new(kind, not_nan(x)?, not_nan(y)?, not_nan(score)?))
        })
        .collect()
}

fn not_nan(value: f32) -> Result<f32, Error> {
    Ok(NotNan::new(value)
        .map_err(|e| Error::ConstructNotNan(e, value))?
        .into_inner())
}

/// A compute backend the detector may run on.
pub trait Backend {
    fn name(&self) -> &str;

    /// Check whether the backend can be used on this machine.
    fn probe(&self) -> Result<(), Error>;
}

/// Probe backends in preference order and return the first one that works.
pub fn select_backend<'a>(candidates: &[&'a dyn Backend]) -> Result<&'a dyn Backend, Error> {
    for &backend in candidates {
        match backend.probe() {
            Ok(()) => {
                info!(backend = backend.name(), "selected backend");
                return Ok(backend);
            }
            Err(e) => warn!(backend = backend.name(), error = %e, "backend unavailable"),
        }
    }
    Err(Error::NoBackendAvailable(candidates.len()))
}

/// A detector that is built at most once and shared by every caller.
///
/// Callers racing on the first `get` wait for the same initialization. A failed initialization
/// leaves the slot empty so the next caller tries again.
pub struct SharedDetector<D> {
    slot: Mutex<Option<Arc<D>>>,
}

impl<D> SharedDetector<D> {
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    pub fn get<F, E>(&self, init: F) -> Result<Arc<D>, Error>
    where
        F: FnOnce() -> Result<D, E>,
        E: std::error::Error + Send + Sync + 'static,
    {
        let mut slot = self.slot.lock().map_err(|_| Error::PoisonedDetector)?;
        if let Some(detector) = slot.as_ref() {
            return Ok(detector.clone());
        }
        let detector = Arc::new(init().map_err(|e| Error::InitializeDetector(Box::new(e)))?);
        info!("detector initialized");
        *slot = Some(detector.clone());
        Ok(detector)
    }

    pub fn is_initialized(&self) -> bool {
        self.slot.lock().map_or(false, |slot| slot.is_some())
    }

    /// Drop the shared handle; the next `get` initializes a fresh one.
    pub fn dispose(&self) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = None;
        }
    }
}

impl<D> Default for SharedDetector<D> {
    fn default() -> Self {
        Self::new()
    }
}

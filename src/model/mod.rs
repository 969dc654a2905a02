//! Loaded models behind a trait.
//!
//! Model internals are opaque to the rest of the crate; callers only rely on
//! the family (which fixes the expected tensor rank) and on one probability
//! per batch item coming back. A model is loaded once at startup and held in
//! a [`ModelSlot`], which records an explicit `Unavailable` state instead of
//! an empty handle when the artifact fails to load.

mod logistic;

pub use logistic::PooledLogisticModel;

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::error::{ErrorCode, ModelError};
use crate::normalize::ModelFamily;
use crate::signal::Tensor;

/// Probability above which a prediction counts as the positive class
pub const DECISION_THRESHOLD: f32 = 0.5;

/// Binary decision for a raw probability (`p > 0.5`)
pub fn decide(probability: f32) -> bool {
    probability > DECISION_THRESHOLD
}

/// A read-only classifier
pub trait Model: Send + Sync {
    fn family(&self) -> ModelFamily;

    /// One probability in `[0, 1]` per item of the leading batch axis
    fn predict(&self, input: &Tensor) -> Result<Vec<f32>, ModelError>;
}

/// Process-lifetime handle to a model, or the reason it is missing
#[derive(Clone)]
pub enum ModelSlot {
    Ready(Arc<dyn Model>),
    Unavailable { path: String, reason: String },
}

impl ModelSlot {
    pub fn ready(model: impl Model + 'static) -> Self {
        ModelSlot::Ready(Arc::new(model))
    }

    pub fn unavailable(path: impl Into<String>, reason: impl Into<String>) -> Self {
        ModelSlot::Unavailable {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Load an artifact, recording failure instead of returning it
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let display = path.as_ref().display().to_string();
        match PooledLogisticModel::load(&path) {
            Ok(model) => {
                log::info!(
                    "[Model] Loaded {:?} model from {} ({} features)",
                    model.family(),
                    display,
                    model.feature_count()
                );
                ModelSlot::ready(model)
            }
            Err(err) => {
                log::error!(
                    "[Model] Failed to load model from {}: code={}, message={}",
                    display,
                    err.code(),
                    err.message()
                );
                ModelSlot::unavailable(display, err.message())
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ModelSlot::Ready(_))
    }

    pub fn model(&self) -> Option<&Arc<dyn Model>> {
        match self {
            ModelSlot::Ready(model) => Some(model),
            ModelSlot::Unavailable { .. } => None,
        }
    }
}

impl fmt::Debug for ModelSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelSlot::Ready(model) => f
                .debug_struct("Ready")
                .field("family", &model.family())
                .finish(),
            ModelSlot::Unavailable { path, reason } => f
                .debug_struct("Unavailable")
                .field("path", path)
                .field("reason", reason)
                .finish(),
        }
    }
}

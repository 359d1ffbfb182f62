//! Engine backends and on-demand engine loading.
//!
//! | Backend | Feature | Notes |
//! |---------|---------|-------|
//! | [`sherpa::SherpaKokoroEngine`] | `sherpa` | sherpa-onnx Kokoro, 24 kHz, sentence-chunked streaming |
//!
//! [`LazyEngine`] wraps any loader as an [`EngineProvider`], so model
//! loading happens on the first utterance rather than at startup.

#[cfg(feature = "sherpa")]
pub mod sherpa;

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use ttsbridge_core::{EngineError, EngineProvider, SynthesisEngine};

type Loader = Box<dyn Fn() -> Result<Arc<dyn SynthesisEngine>, EngineError> + Send + Sync>;

/// Provider that loads its engine on first use and keeps it.
///
/// A failed load is not cached: the next call tries again.
pub struct LazyEngine {
    loader: Loader,
    engine: Mutex<Option<Arc<dyn SynthesisEngine>>>,
}

impl fmt::Debug for LazyEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyEngine")
            .field("loaded", &self.is_loaded())
            .finish_non_exhaustive()
    }
}

impl LazyEngine {
    pub fn new<F>(loader: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn SynthesisEngine>, EngineError> + Send + Sync + 'static,
    {
        Self {
            loader: Box::new(loader),
            engine: Mutex::new(None),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.engine
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl EngineProvider for LazyEngine {
    fn engine(&self) -> Result<Arc<dyn SynthesisEngine>, EngineError> {
        // Held across the load so concurrent callers don't load twice.
        let mut slot = self.engine.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(engine) = slot.as_ref() {
            return Ok(Arc::clone(engine));
        }

        let engine = (self.loader)().inspect_err(|e| {
            tracing::warn!(error = %e, "Synthesis engine failed to load");
        })?;
        tracing::info!(sample_rate = engine.sample_rate(), "Synthesis engine loaded");
        *slot = Some(Arc::clone(&engine));
        Ok(engine)
    }
}

//! Synthesis engine port.
//!
//! The neural TTS model is an opaque collaborator: given text, a speaker and
//! a speed it calls back once per produced chunk and then returns. The
//! callback's return value is the only way to stop it early.

use std::sync::Arc;

use crate::error::EngineError;

/// What the engine should do after delivering a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkControl {
    /// Keep generating.
    Continue,

    /// Stop generating; no further chunks must be produced.
    Stop,
}

impl ChunkControl {
    /// `true` for [`ChunkControl::Stop`].
    #[must_use]
    pub const fn is_stop(self) -> bool {
        matches!(self, Self::Stop)
    }
}

/// Backend-agnostic streaming speech synthesis engine.
///
/// Implementations must be `Send + Sync`: one engine instance is shared by
/// every utterance of a session and driven from the dedicated generation
/// thread.
pub trait SynthesisEngine: Send + Sync {
    /// Synthesize `text`, invoking `on_chunk` for every chunk of float
    /// samples in `[-1.0, 1.0]` as it becomes available.
    ///
    /// Implementations must check the returned [`ChunkControl`] after every
    /// chunk and return promptly once it is [`ChunkControl::Stop`].
    fn stream_synthesize(
        &self,
        text: &str,
        speaker_id: i32,
        speed: f32,
        on_chunk: &mut dyn FnMut(&[f32]) -> ChunkControl,
    ) -> Result<(), EngineError>;

    /// Output sample rate (Hz). Fixed for the lifetime of the engine.
    fn sample_rate(&self) -> u32;
}

/// Supplies the engine for an utterance, loading it on demand.
///
/// A failing provider is the `EngineUnavailable` fast path: the session
/// reports the failure before any queue or worker exists.
pub trait EngineProvider: Send + Sync {
    /// Obtain a ready engine.
    fn engine(&self) -> Result<Arc<dyn SynthesisEngine>, EngineError>;
}

impl EngineProvider for Arc<dyn SynthesisEngine> {
    fn engine(&self) -> Result<Arc<dyn SynthesisEngine>, EngineError> {
        Ok(Arc::clone(self))
    }
}

//! Pipeline error types.

use thiserror::Error;
use ttsbridge_core::{EngineError, FailureKind, SinkError};

/// Why an utterance's pipeline stopped abnormally.
///
/// This is the cause carried by [`QueueItem::Error`](crate::queue::QueueItem::Error).
/// Cancellation is never represented here: a cancelled utterance ends silently.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The engine failed for a reason unrelated to cancellation.
    #[error("Generation failed: {0}")]
    Generation(#[source] EngineError),

    /// A blocking queue wait was interrupted while no cancellation was requested.
    #[error("Transfer queue interrupted without cancellation")]
    QueueInterrupted,

    /// The engine panicked on the generation thread.
    #[error("Generation thread panicked: {0}")]
    WorkerPanicked(String),

    /// The generation thread could not be started.
    #[error("Failed to spawn generation thread: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    /// The sink rejected audio.
    #[error("Audio sink error: {0}")]
    Sink(#[source] SinkError),
}

impl StreamError {
    /// The failure reported to the sink for this error.
    pub const fn failure_kind(&self) -> FailureKind {
        match self {
            Self::Generation(_)
            | Self::QueueInterrupted
            | Self::WorkerPanicked(_)
            | Self::WorkerSpawn(_) => FailureKind::Synthesis,
            Self::Sink(_) => FailureKind::Output,
        }
    }

    /// Render a `catch_unwind` payload as a message.
    pub(crate) fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic payload".to_string());
        Self::WorkerPanicked(message)
    }
}

//! Generation worker: drives the engine on its own thread and feeds the
//! transfer queue.
//!
//! Per chunk: convert to PCM16, trim silence, enqueue. The worker sends at
//! most one terminal item and never reports a failure caused by
//! cancellation.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use ttsbridge_core::{ChunkControl, EngineError, SynthesisEngine, SynthesisRequest};

use crate::cancel::Cancellation;
use crate::error::StreamError;
use crate::pcm;
use crate::queue::{PutInterrupted, QueueItem, TransferQueue};
use crate::stats::PipelineStats;
use crate::trimmer::{SilenceTrimmer, TrimmerConfig};

/// Name of the generation thread.
pub const GENERATOR_THREAD_NAME: &str = "ttsbridge-generator";

/// Everything one utterance's generation thread owns.
pub struct GenerationWorker {
    engine: Arc<dyn SynthesisEngine>,
    request: SynthesisRequest,
    trimmer: TrimmerConfig,
    queue: TransferQueue<QueueItem>,
    cancellation: Cancellation,
    stats: Arc<PipelineStats>,
}

impl GenerationWorker {
    pub fn new(
        engine: Arc<dyn SynthesisEngine>,
        request: SynthesisRequest,
        trimmer: TrimmerConfig,
        queue: TransferQueue<QueueItem>,
        cancellation: Cancellation,
        stats: Arc<PipelineStats>,
    ) -> Self {
        Self {
            engine,
            request,
            trimmer,
            queue,
            cancellation,
            stats,
        }
    }

    /// Run [`GenerationWorker::run`] on a dedicated, named OS thread.
    pub fn spawn(self) -> Result<JoinHandle<()>, StreamError> {
        thread::Builder::new()
            .name(GENERATOR_THREAD_NAME.into())
            .spawn(move || self.run())
            .map_err(StreamError::WorkerSpawn)
    }

    /// Drive the engine to completion, then enqueue the terminal item.
    pub fn run(self) {
        let sample_rate = self.engine.sample_rate();
        tracing::debug!(
            speaker_id = self.request.speaker_id,
            speed = self.request.speed,
            sample_rate,
            "Generation started"
        );

        let mut handler = ChunkHandler {
            queue: &self.queue,
            cancellation: &self.cancellation,
            stats: &self.stats,
            trimmer: SilenceTrimmer::new(sample_rate, self.trimmer),
            scratch: Vec::new(),
            fault: None,
        };

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            self.engine.stream_synthesize(
                &self.request.text,
                self.request.speaker_id,
                self.request.speed,
                &mut |samples: &[f32]| handler.on_chunk(samples),
            )
        }));

        let terminal = self.terminal_item(result, handler.fault.take());
        let Some(item) = terminal else {
            tracing::debug!("Generation stopped by cancellation");
            return;
        };

        tracing::debug!(terminal = ?item, "Generation finished");
        if let Err(PutInterrupted(item)) = self.queue.put(item) {
            tracing::debug!(terminal = ?item, "Delivery already stopped; terminal item dropped");
        }
    }

    fn terminal_item(
        &self,
        result: thread::Result<Result<(), EngineError>>,
        fault: Option<StreamError>,
    ) -> Option<QueueItem> {
        if let Some(fault) = fault {
            tracing::error!(error = %fault, "Generation fault");
            return Some(QueueItem::Error(fault));
        }
        let cancelled = self.cancellation.is_cancelled();
        match result {
            Ok(Ok(())) if cancelled => None,
            Ok(Ok(())) => Some(QueueItem::End),
            Ok(Err(e)) if cancelled => {
                tracing::debug!(error = %e, "Engine error after cancellation suppressed");
                None
            }
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Synthesis engine failed");
                Some(QueueItem::Error(StreamError::Generation(e)))
            }
            Err(_) if cancelled => {
                tracing::warn!("Synthesis engine panicked after cancellation");
                None
            }
            Err(payload) => {
                let err = StreamError::from_panic(payload.as_ref());
                tracing::error!(error = %err, "Synthesis engine panicked");
                Some(QueueItem::Error(err))
            }
        }
    }
}

/// Per-chunk state, exclusively owned by the generation thread.
struct ChunkHandler<'a> {
    queue: &'a TransferQueue<QueueItem>,
    cancellation: &'a Cancellation,
    stats: &'a PipelineStats,
    trimmer: SilenceTrimmer,
    scratch: Vec<u8>,
    fault: Option<StreamError>,
}

impl ChunkHandler<'_> {
    fn on_chunk(&mut self, samples: &[f32]) -> ChunkControl {
        if self.cancellation.is_cancelled() || self.fault.is_some() {
            return ChunkControl::Stop;
        }
        if samples.is_empty() {
            return ChunkControl::Continue;
        }

        pcm::encode_into(samples, &mut self.scratch);
        self.stats.record_chunk(self.scratch.len());

        let Some(kept) = self.trimmer.filter(&self.scratch, self.scratch.len()) else {
            tracing::debug!(
                samples = samples.len(),
                silent_run = self.trimmer.silent_run(),
                "Chunk dropped as silence"
            );
            return ChunkControl::Continue;
        };

        let kept_bytes = kept.len();
        tracing::debug!(samples = samples.len(), bytes = self.scratch.len(), kept_bytes, "Chunk ready");

        if self.queue.put(QueueItem::data(kept)).is_err() {
            if !self.cancellation.is_cancelled() {
                tracing::warn!("Queue put interrupted without cancellation");
                self.fault = Some(StreamError::QueueInterrupted);
            }
            return ChunkControl::Stop;
        }
        self.stats.record_kept(kept_bytes);

        if self.cancellation.is_cancelled() {
            ChunkControl::Stop
        } else {
            ChunkControl::Continue
        }
    }
}

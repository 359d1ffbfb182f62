//! Synthesis session: runs one utterance at a time through the pipeline.
//!
//! ```text
//!   synthesize ─► engine? ─► sink.start ─► spawn generator ─► run_delivery ─► report
//!                  │ no                       (named thread)     (caller thread)
//!                  └─► sink.fail(EngineUnavailable)
//! ```
//!
//! Every utterance gets a fresh queue, trimmer and cancellation token.
//! [`SynthesisSession::cancel`] may be called from any thread and stops
//! whichever utterance is running.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

use serde::Serialize;
use ttsbridge_core::settings::{DEFAULT_MIN_SINK_CHUNK_BYTES, DEFAULT_QUEUE_CAPACITY};
use ttsbridge_core::{AudioFormat, AudioSink, EngineProvider, FailureKind, Settings, SynthesisRequest};

use crate::cancel::Cancellation;
use crate::delivery::{DeliveryExit, run_delivery};
use crate::error::StreamError;
use crate::queue::{QueueItem, TransferQueue};
use crate::stats::{PipelineStats, StatsSnapshot};
use crate::trimmer::TrimmerConfig;
use crate::worker::GenerationWorker;

// ── Configuration ──────────────────────────────────────────────────

/// Pipeline sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConfig {
    pub trimmer: TrimmerConfig,
    /// Transfer queue slots.
    pub queue_capacity: usize,
    /// Floor under the sink's reported slice size (bytes).
    pub min_sink_chunk_bytes: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            trimmer: TrimmerConfig::default(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            min_sink_chunk_bytes: DEFAULT_MIN_SINK_CHUNK_BYTES,
        }
    }
}

impl StreamConfig {
    /// Derive the pipeline sizing from (validated) settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            trimmer: TrimmerConfig::from_settings(settings),
            queue_capacity: settings.effective_queue_capacity(),
            min_sink_chunk_bytes: settings.effective_min_sink_chunk_bytes(),
        }
    }
}

// ── Report ─────────────────────────────────────────────────────────

/// How an utterance ended, from the caller's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Outcome {
    /// The sink received `complete()`.
    Completed,
    /// Stopped by cancellation; the sink received no terminal call.
    Cancelled,
    /// The sink received `fail(kind)`.
    Failed(FailureKind),
    /// No engine could be obtained; the sink received only
    /// `fail(EngineUnavailable)`.
    EngineUnavailable,
}

impl Outcome {
    pub const fn is_completed(self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Summary of one `synthesize` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UtteranceReport {
    pub outcome: Outcome,
    /// Non-empty engine chunks.
    pub chunks: u64,
    /// PCM16 bytes before silence trimming.
    pub generated_bytes: u64,
    /// PCM16 bytes after trimming (enqueued).
    pub kept_bytes: u64,
    /// Bytes accepted by the sink.
    pub delivered_bytes: u64,
    /// Engine sample rate, when an engine was obtained.
    pub sample_rate: Option<u32>,
}

impl UtteranceReport {
    fn new(outcome: Outcome, stats: StatsSnapshot, sample_rate: Option<u32>) -> Self {
        Self {
            outcome,
            chunks: stats.chunks,
            generated_bytes: stats.generated_bytes,
            kept_bytes: stats.kept_bytes,
            delivered_bytes: stats.delivered_bytes,
            sample_rate,
        }
    }

    fn without_audio(outcome: Outcome, sample_rate: Option<u32>) -> Self {
        Self::new(outcome, StatsSnapshot::default(), sample_rate)
    }
}

// ── Session ────────────────────────────────────────────────────────

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// Sends `fail(kind)` unless cancellation already ended the utterance.
fn fail_unless_cancelled(
    cancellation: &Cancellation,
    sink: &mut dyn AudioSink,
    kind: FailureKind,
) -> Outcome {
    if cancellation.fail() {
        sink.fail(kind);
        Outcome::Failed(kind)
    } else {
        Outcome::Cancelled
    }
}

// Clears the session's active token when the utterance returns.
struct ClearActive<'a>(&'a Mutex<Option<Cancellation>>);

impl Drop for ClearActive<'_> {
    fn drop(&mut self) {
        lock(self.0).take();
    }
}

/// Runs utterances against one engine provider.
pub struct SynthesisSession {
    provider: Arc<dyn EngineProvider>,
    config: StreamConfig,
    /// Serializes utterances.
    utterance_lock: Mutex<()>,
    active: Mutex<Option<Cancellation>>,
    /// Generation thread of the last utterance, joined before the next.
    retiring: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for SynthesisSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynthesisSession")
            .field("config", &self.config)
            .field("active", &self.is_active())
            .finish_non_exhaustive()
    }
}

impl SynthesisSession {
    pub fn new(provider: Arc<dyn EngineProvider>, config: StreamConfig) -> Self {
        Self {
            provider,
            config,
            utterance_lock: Mutex::new(()),
            active: Mutex::new(None),
            retiring: Mutex::new(None),
        }
    }

    pub const fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Whether a `synthesize` call is in progress.
    pub fn is_active(&self) -> bool {
        lock(&self.active).is_some()
    }

    /// Cancel the running utterance, if any.
    ///
    /// Returns `true` if an utterance was cancelled by this call. The sink
    /// receives no further calls for it.
    pub fn cancel(&self) -> bool {
        let Some(cancellation) = lock(&self.active).clone() else {
            return false;
        };
        let cancelled = cancellation.cancel();
        if cancelled {
            tracing::info!("Utterance cancellation requested");
        }
        cancelled
    }

    fn join_retired(&self) {
        if let Some(handle) = lock(&self.retiring).take() {
            if handle.join().is_err() {
                tracing::warn!("Previous generation thread panicked");
            }
        }
    }

    /// Synthesize one utterance into `sink`, blocking until it ends.
    ///
    /// The sink sees `start`, zero or more `deliver` calls, then exactly one
    /// of `complete`, `fail`, or nothing (cancelled). If the request is
    /// invalid or no engine can be obtained, `fail` is its only call.
    pub fn synthesize(&self, request: &SynthesisRequest, sink: &mut dyn AudioSink) -> UtteranceReport {
        let _serial = lock(&self.utterance_lock);

        // Published before anything slow (joining the last worker, loading
        // the engine) so an early cancel is never lost.
        let queue: TransferQueue<QueueItem> = TransferQueue::new(self.config.queue_capacity);
        let cancellation = Cancellation::new(queue.clone());
        cancellation.activate();
        *lock(&self.active) = Some(cancellation.clone());
        let _clear = ClearActive(&self.active);

        self.join_retired();

        if request.speaker_id < 0 || !request.speed.is_finite() || request.speed <= 0.0 {
            tracing::warn!(
                speaker_id = request.speaker_id,
                speed = request.speed,
                "Rejecting invalid synthesis request"
            );
            let outcome = fail_unless_cancelled(&cancellation, sink, FailureKind::InvalidRequest);
            return UtteranceReport::without_audio(outcome, None);
        }

        let engine = match self.provider.engine() {
            Ok(engine) => engine,
            Err(e) if cancellation.fail() => {
                tracing::warn!(error = %e, "Synthesis engine unavailable");
                sink.fail(FailureKind::EngineUnavailable);
                return UtteranceReport::without_audio(Outcome::EngineUnavailable, None);
            }
            Err(e) => {
                tracing::debug!(error = %e, "Engine unavailable after cancellation");
                return UtteranceReport::without_audio(Outcome::Cancelled, None);
            }
        };
        let sample_rate = engine.sample_rate();

        if cancellation.is_cancelled() {
            tracing::debug!("Cancelled while obtaining the engine");
            return UtteranceReport::without_audio(Outcome::Cancelled, Some(sample_rate));
        }

        tracing::info!(
            speaker_id = request.speaker_id,
            speed = request.speed,
            sample_rate,
            chars = request.text.len(),
            "Utterance started"
        );

        if let Err(e) = sink.start(AudioFormat::pcm16_mono(sample_rate)) {
            let cause = StreamError::Sink(e);
            tracing::warn!(error = %cause, "Sink refused to start");
            let outcome = fail_unless_cancelled(&cancellation, sink, cause.failure_kind());
            return UtteranceReport::without_audio(outcome, Some(sample_rate));
        }

        if request.is_blank() {
            tracing::debug!("Blank text; completing without synthesis");
            let outcome = if cancellation.complete() {
                sink.complete();
                Outcome::Completed
            } else {
                Outcome::Cancelled
            };
            return UtteranceReport::without_audio(outcome, Some(sample_rate));
        }

        if cancellation.is_cancelled() {
            tracing::debug!("Cancelled before generation started");
            return UtteranceReport::without_audio(Outcome::Cancelled, Some(sample_rate));
        }

        let stats = Arc::new(PipelineStats::default());
        let worker = GenerationWorker::new(
            engine,
            request.clone(),
            self.config.trimmer,
            queue.clone(),
            cancellation.clone(),
            Arc::clone(&stats),
        );
        let handle = match worker.spawn() {
            Ok(handle) => handle,
            Err(e) => {
                tracing::error!(error = %e, "Could not start generation");
                let outcome = fail_unless_cancelled(&cancellation, sink, e.failure_kind());
                return UtteranceReport::without_audio(outcome, Some(sample_rate));
            }
        };

        let exit = run_delivery(
            &queue,
            sink,
            &cancellation,
            self.config.min_sink_chunk_bytes,
            &stats,
        );
        *lock(&self.retiring) = Some(handle);

        let outcome = match exit {
            DeliveryExit::Completed => Outcome::Completed,
            DeliveryExit::Failed(kind) => Outcome::Failed(kind),
            DeliveryExit::Cancelled | DeliveryExit::Interrupted => Outcome::Cancelled,
        };
        let report = UtteranceReport::new(outcome, stats.snapshot(), Some(sample_rate));
        tracing::info!(
            outcome = ?report.outcome,
            chunks = report.chunks,
            kept_bytes = report.kept_bytes,
            delivered_bytes = report.delivered_bytes,
            "Utterance finished"
        );
        report
    }
}

impl Drop for SynthesisSession {
    fn drop(&mut self) {
        self.join_retired();
    }
}

//! Streaming synthesis pipeline for ttsbridge.
//!
//! A chunk-producing [`SynthesisEngine`](ttsbridge_core::SynthesisEngine) is
//! bridged to an [`AudioSink`](ttsbridge_core::AudioSink) that wants bounded
//! PCM16 buffers in order:
//!
//! ```text
//!   engine ──chunk──► generator thread ──QueueItem──► delivery loop ──slice──► sink
//!                     (pcm16 + trimmer)  (bounded)    (caller thread)
//! ```
//!
//! - [`trimmer`] compresses long silences, carrying state across chunks.
//! - [`queue`] is the bounded, interruptible hand-off between the threads.
//! - [`cancel`] is the per-utterance state machine and stop signal.
//! - [`worker`] and [`delivery`] are the two sides of one utterance.
//! - [`session`] runs utterances one at a time and reports how they ended.
//!
//! Engines live in [`backend`] (sherpa-onnx behind the `sherpa` feature);
//! sinks in [`sink`] (`rodio` playback behind the `playback` feature).
#![deny(unused_crate_dependencies)]

pub mod backend;
pub mod cancel;
pub mod delivery;
pub mod error;
pub mod pcm;
pub mod queue;
pub mod session;
pub mod sink;
pub mod stats;
pub mod text_utils;
pub mod trimmer;
pub mod worker;

pub use backend::LazyEngine;
#[cfg(feature = "sherpa")]
pub use backend::sherpa::{SHERPA_TTS_SAMPLE_RATE, SherpaKokoroEngine};
pub use cancel::{Cancellation, Interrupt, UtteranceState};
pub use delivery::{DeliveryExit, run_delivery};
pub use error::StreamError;
pub use queue::{PutInterrupted, QueueItem, TakeInterrupted, TransferQueue};
pub use session::{Outcome, StreamConfig, SynthesisSession, UtteranceReport};
pub use sink::{CollectingSink, SinkEvent, WavFileSink};
#[cfg(feature = "playback")]
pub use sink::PlaybackSink;
pub use stats::{PipelineStats, StatsSnapshot};
pub use trimmer::{SilenceTrimmer, TrimmerConfig};
pub use worker::{GENERATOR_THREAD_NAME, GenerationWorker};

// Only used by the integration tests in `tests/`
#[cfg(test)]
use mockall as _;

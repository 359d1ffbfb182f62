//! Shared test doubles for the pipeline integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};

use ttsbridge_core::{
    AudioFormat, AudioSink, ChunkControl, EngineError, EngineProvider, FailureKind, SinkError,
    SynthesisEngine,
};
use ttsbridge_stream::{StreamConfig, SynthesisSession};

// ── Engines ────────────────────────────────────────────────────────

/// What an engine saw of the callback's answers.
#[derive(Debug, Default)]
pub struct EngineProbe {
    pub calls: AtomicUsize,
    pub chunks_emitted: AtomicUsize,
    pub saw_stop: AtomicBool,
    pub calls_after_stop: AtomicUsize,
}

impl EngineProbe {
    fn emit(&self, on_chunk: &mut dyn FnMut(&[f32]) -> ChunkControl, chunk: &[f32]) -> ChunkControl {
        if self.saw_stop.load(Ordering::SeqCst) {
            self.calls_after_stop.fetch_add(1, Ordering::SeqCst);
        }
        self.chunks_emitted.fetch_add(1, Ordering::SeqCst);
        let control = on_chunk(chunk);
        if control.is_stop() {
            self.saw_stop.store(true, Ordering::SeqCst);
        }
        control
    }

    pub fn emitted(&self) -> usize {
        self.chunks_emitted.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn stopped(&self) -> bool {
        self.saw_stop.load(Ordering::SeqCst)
    }
}

/// Emits a fixed list of chunks, honouring `Stop`.
pub struct ScriptedEngine {
    pub chunks: Vec<Vec<f32>>,
    pub sample_rate: u32,
    pub probe: EngineProbe,
}

impl ScriptedEngine {
    pub fn new(sample_rate: u32, chunks: Vec<Vec<f32>>) -> Self {
        Self {
            chunks,
            sample_rate,
            probe: EngineProbe::default(),
        }
    }
}

impl SynthesisEngine for ScriptedEngine {
    fn stream_synthesize(
        &self,
        _text: &str,
        _speaker_id: i32,
        _speed: f32,
        on_chunk: &mut dyn FnMut(&[f32]) -> ChunkControl,
    ) -> Result<(), EngineError> {
        self.probe.calls.fetch_add(1, Ordering::SeqCst);
        for chunk in &self.chunks {
            if self.probe.emit(on_chunk, chunk).is_stop() {
                break;
            }
        }
        Ok(())
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

/// Test-side handles for a [`GatedEngine`].
pub struct Gate {
    /// Signalled when the engine reaches the gate.
    pub reached: Receiver<()>,
    /// Send to let the engine continue.
    pub release: Sender<()>,
}

/// Like [`ScriptedEngine`] but blocks before emitting chunk `gate_before`
/// until released.
pub struct GatedEngine {
    chunks: Vec<Vec<f32>>,
    gate_before: usize,
    reached: Mutex<Sender<()>>,
    release: Mutex<Receiver<()>>,
    pub probe: EngineProbe,
}

impl GatedEngine {
    pub fn new(chunks: Vec<Vec<f32>>, gate_before: usize) -> (Self, Gate) {
        let (reached_tx, reached_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let engine = Self {
            chunks,
            gate_before,
            reached: Mutex::new(reached_tx),
            release: Mutex::new(release_rx),
            probe: EngineProbe::default(),
        };
        (
            engine,
            Gate {
                reached: reached_rx,
                release: release_tx,
            },
        )
    }
}

impl SynthesisEngine for GatedEngine {
    fn stream_synthesize(
        &self,
        _text: &str,
        _speaker_id: i32,
        _speed: f32,
        on_chunk: &mut dyn FnMut(&[f32]) -> ChunkControl,
    ) -> Result<(), EngineError> {
        self.probe.calls.fetch_add(1, Ordering::SeqCst);
        for (i, chunk) in self.chunks.iter().enumerate() {
            if i == self.gate_before {
                let _ = self.reached.lock().unwrap().send(());
                let _ = self.release.lock().unwrap().recv();
            }
            if self.probe.emit(on_chunk, chunk).is_stop() {
                break;
            }
        }
        Ok(())
    }

    fn sample_rate(&self) -> u32 {
        16_000
    }
}

/// Emits `chunks`, then fails.
pub struct FailingEngine {
    pub chunks: Vec<Vec<f32>>,
}

impl SynthesisEngine for FailingEngine {
    fn stream_synthesize(
        &self,
        _text: &str,
        _speaker_id: i32,
        _speed: f32,
        on_chunk: &mut dyn FnMut(&[f32]) -> ChunkControl,
    ) -> Result<(), EngineError> {
        for chunk in &self.chunks {
            if on_chunk(chunk).is_stop() {
                return Ok(());
            }
        }
        Err(EngineError::Synthesis("decoder produced NaN".into()))
    }

    fn sample_rate(&self) -> u32 {
        24_000
    }
}

/// Emits one chunk, then panics.
pub struct PanickingEngine;

impl SynthesisEngine for PanickingEngine {
    fn stream_synthesize(
        &self,
        _text: &str,
        _speaker_id: i32,
        _speed: f32,
        on_chunk: &mut dyn FnMut(&[f32]) -> ChunkControl,
    ) -> Result<(), EngineError> {
        on_chunk(&[0.5; 64]);
        panic!("onnx session exploded");
    }

    fn sample_rate(&self) -> u32 {
        24_000
    }
}

/// Provider that never yields an engine.
pub struct UnavailableProvider;

impl EngineProvider for UnavailableProvider {
    fn engine(&self) -> Result<Arc<dyn SynthesisEngine>, EngineError> {
        Err(EngineError::Unavailable("model not installed".into()))
    }
}

// ── Sinks ──────────────────────────────────────────────────────────

/// Accepts `accept` deliveries, then rejects every further one.
#[derive(Debug, Default)]
pub struct RejectingSink {
    pub accept: usize,
    pub delivered: usize,
    pub completes: usize,
    pub failures: Vec<FailureKind>,
    pub refuse_start: bool,
}

impl AudioSink for RejectingSink {
    fn max_chunk_bytes(&self) -> usize {
        4096
    }

    fn start(&mut self, _format: AudioFormat) -> Result<(), SinkError> {
        if self.refuse_start {
            return Err(SinkError::Output("device busy".into()));
        }
        Ok(())
    }

    fn deliver(&mut self, _buffer: &[u8], _offset: usize, _length: usize) -> Result<(), SinkError> {
        if self.delivered >= self.accept {
            return Err(SinkError::Output("stream closed".into()));
        }
        self.delivered += 1;
        Ok(())
    }

    fn complete(&mut self) {
        self.completes += 1;
    }

    fn fail(&mut self, kind: FailureKind) {
        self.failures.push(kind);
    }
}

/// Collects audio but blocks inside the first `deliver` until released.
pub struct BlockingSink {
    pub inner: ttsbridge_stream::CollectingSink,
    entered: Option<Sender<()>>,
    release: Receiver<()>,
}

impl BlockingSink {
    /// Returns the sink, a receiver signalled on entering the first
    /// `deliver`, and a sender that releases it.
    pub fn new() -> (Self, Receiver<()>, Sender<()>) {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        (
            Self {
                inner: ttsbridge_stream::CollectingSink::new(1 << 20),
                entered: Some(entered_tx),
                release: release_rx,
            },
            entered_rx,
            release_tx,
        )
    }
}

impl AudioSink for BlockingSink {
    fn max_chunk_bytes(&self) -> usize {
        self.inner.max_chunk_bytes()
    }

    fn start(&mut self, format: AudioFormat) -> Result<(), SinkError> {
        self.inner.start(format)
    }

    fn deliver(&mut self, buffer: &[u8], offset: usize, length: usize) -> Result<(), SinkError> {
        if let Some(entered) = self.entered.take() {
            let _ = entered.send(());
            let _ = self.release.recv();
        }
        self.inner.deliver(buffer, offset, length)
    }

    fn complete(&mut self) {
        self.inner.complete();
    }

    fn fail(&mut self, kind: FailureKind) {
        self.inner.fail(kind);
    }
}

// ── Helpers ────────────────────────────────────────────────────────

pub fn session_for(engine: Arc<dyn SynthesisEngine>, config: StreamConfig) -> SynthesisSession {
    SynthesisSession::new(Arc::new(engine), config)
}

pub fn loud(samples: usize) -> Vec<f32> {
    vec![0.9; samples]
}

pub fn silent(samples: usize) -> Vec<f32> {
    vec![0.0; samples]
}

/// Deterministic xorshift generator so the property tests are reproducible.
pub struct XorShift(u64);

impl XorShift {
    pub const fn new(seed: u64) -> Self {
        Self(seed | 1)
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    pub fn below(&mut self, bound: u64) -> u64 {
        self.next_u64() % bound
    }
}

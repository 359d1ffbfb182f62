//! Byte and chunk counters shared by the generation thread and delivery.

use std::sync::atomic::{AtomicU64, Ordering};

/// Running totals for one utterance.
#[derive(Debug, Default)]
pub struct PipelineStats {
    chunks: AtomicU64,
    generated_bytes: AtomicU64,
    kept_bytes: AtomicU64,
    delivered_bytes: AtomicU64,
}

/// Point-in-time copy of [`PipelineStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Non-empty chunks received from the engine.
    pub chunks: u64,
    /// PCM16 bytes produced before silence trimming.
    pub generated_bytes: u64,
    /// PCM16 bytes kept by the trimmer and enqueued.
    pub kept_bytes: u64,
    /// Bytes accepted by the sink.
    pub delivered_bytes: u64,
}

impl PipelineStats {
    pub(crate) fn record_chunk(&self, generated: usize) {
        self.chunks.fetch_add(1, Ordering::Relaxed);
        self.generated_bytes.fetch_add(generated as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_kept(&self, kept: usize) {
        self.kept_bytes.fetch_add(kept as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_delivered(&self, delivered: usize) {
        self.delivered_bytes.fetch_add(delivered as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            chunks: self.chunks.load(Ordering::Relaxed),
            generated_bytes: self.generated_bytes.load(Ordering::Relaxed),
            kept_bytes: self.kept_bytes.load(Ordering::Relaxed),
            delivered_bytes: self.delivered_bytes.load(Ordering::Relaxed),
        }
    }
}

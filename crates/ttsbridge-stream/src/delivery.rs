//! Delivery loop: drains the transfer queue on the caller's thread and feeds
//! the sink in bounded, sample-aligned slices.
//!
//! This is the only place that calls `complete()` or `fail()` on a sink for
//! a running utterance.

use ttsbridge_core::{AudioSink, FailureKind};

use crate::cancel::Cancellation;
use crate::error::StreamError;
use crate::pcm;
use crate::queue::{QueueItem, TakeInterrupted, TransferQueue};
use crate::stats::PipelineStats;

/// How the delivery loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryExit {
    /// `End` was reached and the sink was told `complete()`.
    Completed,
    /// The sink was told `fail(kind)`.
    Failed(FailureKind),
    /// Cancellation was observed; the sink got no terminal call.
    Cancelled,
    /// A blocking take was interrupted without a cancel request. Treated as
    /// a cancel.
    Interrupted,
}

/// Largest slice handed to the sink: the sink's limit raised to `floor`,
/// rounded down to whole samples.
pub fn slice_limit(sink_max: usize, floor: usize) -> usize {
    pcm::even_floor(sink_max.max(floor)).max(2)
}

// Every exit path leaves the utterance cancelled and the producer woken.
struct RetireOnExit<'a>(&'a Cancellation);

impl Drop for RetireOnExit<'_> {
    fn drop(&mut self) {
        self.0.retire();
    }
}

/// Run the delivery loop until a terminal item, a cancel, or a sink error.
pub fn run_delivery(
    queue: &TransferQueue<QueueItem>,
    sink: &mut dyn AudioSink,
    cancellation: &Cancellation,
    min_chunk_bytes: usize,
    stats: &PipelineStats,
) -> DeliveryExit {
    let _retire = RetireOnExit(cancellation);
    let limit = slice_limit(sink.max_chunk_bytes(), min_chunk_bytes);

    loop {
        let item = match queue.take() {
            Ok(item) => item,
            Err(TakeInterrupted) if cancellation.is_cancelled() => return DeliveryExit::Cancelled,
            Err(TakeInterrupted) => {
                tracing::warn!("Delivery interrupted without cancellation; stopping utterance");
                cancellation.cancel();
                return DeliveryExit::Interrupted;
            }
        };

        match item {
            QueueItem::Data { bytes, length } => {
                if cancellation.is_cancelled() {
                    return DeliveryExit::Cancelled;
                }
                if let Some(exit) = deliver_slices(sink, &bytes, length, limit, cancellation, stats) {
                    return exit;
                }
            }
            QueueItem::End => {
                if cancellation.complete() {
                    sink.complete();
                    return DeliveryExit::Completed;
                }
                return DeliveryExit::Cancelled;
            }
            QueueItem::Error(cause) => {
                let kind = cause.failure_kind();
                if cancellation.fail() {
                    tracing::warn!(error = %cause, %kind, "Reporting utterance failure to sink");
                    sink.fail(kind);
                    return DeliveryExit::Failed(kind);
                }
                return DeliveryExit::Cancelled;
            }
        }
    }
}

/// Forward `bytes[..length]` in slices of at most `limit` bytes.
///
/// Returns `Some(exit)` when delivery must stop.
fn deliver_slices(
    sink: &mut dyn AudioSink,
    bytes: &[u8],
    length: usize,
    limit: usize,
    cancellation: &Cancellation,
    stats: &PipelineStats,
) -> Option<DeliveryExit> {
    let length = pcm::even_floor(length.min(bytes.len()));
    let mut offset = 0;

    while offset < length {
        let slice = limit.min(length - offset);
        if let Err(e) = sink.deliver(bytes, offset, slice) {
            let cause = StreamError::Sink(e);
            tracing::warn!(error = %cause, offset, bytes = slice, "Sink rejected audio");
            if cancellation.fail() {
                let kind = cause.failure_kind();
                sink.fail(kind);
                return Some(DeliveryExit::Failed(kind));
            }
            return Some(DeliveryExit::Cancelled);
        }
        stats.record_delivered(slice);
        offset += slice;

        if offset < length && cancellation.is_cancelled() {
            tracing::debug!(offset, length, "Cancelled mid-buffer");
            return Some(DeliveryExit::Cancelled);
        }
    }
    None
}

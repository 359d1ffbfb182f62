//! Audio sink port - the downstream consumer of PCM16 buffers.
//!
//! A sink sees, per utterance:
//!
//! ```text
//!   start(format) → deliver(..)* → exactly one of { complete(), fail(kind), nothing }
//! ```
//!
//! "Nothing" is a cancelled utterance. The `EngineUnavailable` fast path is
//! the one exception to `start` coming first: `fail` is called alone.

use crate::domain::AudioFormat;
use crate::error::{FailureKind, SinkError};

/// Abstraction over an audio output that accepts bounded PCM16 buffers.
///
/// Sinks are driven from the caller's thread only, so no `Send` bound is
/// required (a `rodio` output stream, for instance, is `!Send`).
pub trait AudioSink {
    /// Largest buffer, in bytes, the sink accepts in one [`deliver`] call.
    ///
    /// The delivery loop never goes below its own safety floor, so values
    /// smaller than that floor are raised to it.
    ///
    /// [`deliver`]: AudioSink::deliver
    fn max_chunk_bytes(&self) -> usize;

    /// Announce the stream format. Called once, before any audio.
    fn start(&mut self, format: AudioFormat) -> Result<(), SinkError>;

    /// Accept `buffer[offset..offset + length]`.
    ///
    /// `offset` and `length` are always even, so a sample is never split
    /// across calls.
    fn deliver(&mut self, buffer: &[u8], offset: usize, length: usize) -> Result<(), SinkError>;

    /// The utterance finished normally; no more audio follows.
    fn complete(&mut self);

    /// The utterance failed; no more audio follows.
    fn fail(&mut self, kind: FailureKind);
}

impl<S: AudioSink + ?Sized> AudioSink for &mut S {
    fn max_chunk_bytes(&self) -> usize {
        (**self).max_chunk_bytes()
    }

    fn start(&mut self, format: AudioFormat) -> Result<(), SinkError> {
        (**self).start(format)
    }

    fn deliver(&mut self, buffer: &[u8], offset: usize, length: usize) -> Result<(), SinkError> {
        (**self).deliver(buffer, offset, length)
    }

    fn complete(&mut self) {
        (**self).complete();
    }

    fn fail(&mut self, kind: FailureKind) {
        (**self).fail(kind);
    }
}

impl<S: AudioSink + ?Sized> AudioSink for Box<S> {
    fn max_chunk_bytes(&self) -> usize {
        (**self).max_chunk_bytes()
    }

    fn start(&mut self, format: AudioFormat) -> Result<(), SinkError> {
        (**self).start(format)
    }

    fn deliver(&mut self, buffer: &[u8], offset: usize, length: usize) -> Result<(), SinkError> {
        (**self).deliver(buffer, offset, length)
    }

    fn complete(&mut self) {
        (**self).complete();
    }

    fn fail(&mut self, kind: FailureKind) {
        (**self).fail(kind);
    }
}

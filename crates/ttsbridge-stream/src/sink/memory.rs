//! In-memory sink that records every call it receives.

use ttsbridge_core::{AudioFormat, AudioSink, FailureKind, SinkError};

/// One call observed by a [`CollectingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    Start(AudioFormat),
    Data { offset: usize, length: usize },
    Complete,
    Fail(FailureKind),
}

/// Sink that keeps the delivered PCM in memory.
#[derive(Debug, Clone)]
pub struct CollectingSink {
    max_chunk_bytes: usize,
    events: Vec<SinkEvent>,
    audio: Vec<u8>,
}

impl CollectingSink {
    /// Create a sink that reports `max_chunk_bytes` as its slice limit.
    pub const fn new(max_chunk_bytes: usize) -> Self {
        Self {
            max_chunk_bytes,
            events: Vec::new(),
            audio: Vec::new(),
        }
    }

    pub fn events(&self) -> &[SinkEvent] {
        &self.events
    }

    /// Concatenation of every delivered slice.
    pub fn audio(&self) -> &[u8] {
        &self.audio
    }

    pub fn into_audio(self) -> Vec<u8> {
        self.audio
    }

    /// The format announced by `start`, if any.
    pub fn format(&self) -> Option<AudioFormat> {
        self.events.iter().find_map(|event| match event {
            SinkEvent::Start(format) => Some(*format),
            _ => None,
        })
    }

    /// Length of each delivered slice, in order.
    pub fn slice_lengths(&self) -> Vec<usize> {
        self.events
            .iter()
            .filter_map(|event| match event {
                SinkEvent::Data { length, .. } => Some(*length),
                _ => None,
            })
            .collect()
    }

    pub fn is_completed(&self) -> bool {
        self.events.contains(&SinkEvent::Complete)
    }

    /// The first failure reported, if any.
    pub fn failure(&self) -> Option<FailureKind> {
        self.events.iter().find_map(|event| match event {
            SinkEvent::Fail(kind) => Some(*kind),
            _ => None,
        })
    }

    /// Number of `complete` plus `fail` calls.
    pub fn terminal_calls(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, SinkEvent::Complete | SinkEvent::Fail(_)))
            .count()
    }
}

impl AudioSink for CollectingSink {
    fn max_chunk_bytes(&self) -> usize {
        self.max_chunk_bytes
    }

    fn start(&mut self, format: AudioFormat) -> Result<(), SinkError> {
        self.events.push(SinkEvent::Start(format));
        Ok(())
    }

    fn deliver(&mut self, buffer: &[u8], offset: usize, length: usize) -> Result<(), SinkError> {
        let slice = buffer
            .get(offset..offset + length)
            .ok_or_else(|| SinkError::Output(format!("slice {offset}+{length} out of bounds")))?;
        self.audio.extend_from_slice(slice);
        self.events.push(SinkEvent::Data { offset, length });
        Ok(())
    }

    fn complete(&mut self) {
        self.events.push(SinkEvent::Complete);
    }

    fn fail(&mut self, kind: FailureKind) {
        self.events.push(SinkEvent::Fail(kind));
    }
}

//! Audio playback sink - delivered PCM16 goes to the default output device
//! via `rodio`.
//!
//! Each delivered slice is appended to one `rodio::Sink`, so playback
//! starts as soon as the first slice arrives and continues while later
//! slices are still being synthesized.

use rodio::{OutputStream, OutputStreamHandle, Sink};
use ttsbridge_core::{AudioFormat, AudioSink, FailureKind, SinkError};

use super::DEFAULT_SINK_CHUNK_BYTES;
use crate::pcm;

/// Plays an utterance on the default output device.
///
/// Not `Send`: the `rodio` output stream must stay on the thread that
/// opened it.
pub struct PlaybackSink {
    /// rodio output stream (must be kept alive).
    _stream: OutputStream,
    stream_handle: OutputStreamHandle,
    sink: Option<Sink>,
    sample_rate: u32,
    max_chunk_bytes: usize,
}

impl PlaybackSink {
    /// Open the default output device.
    pub fn new() -> Result<Self, SinkError> {
        let (stream, stream_handle) =
            OutputStream::try_default().map_err(|e| SinkError::Output(e.to_string()))?;
        tracing::info!("Audio playback initialized on default output device");
        Ok(Self {
            _stream: stream,
            stream_handle,
            sink: None,
            sample_rate: 0,
            max_chunk_bytes: DEFAULT_SINK_CHUNK_BYTES,
        })
    }

    /// Block until everything appended so far has played.
    pub fn wait_until_end(&self) {
        if let Some(sink) = &self.sink {
            sink.sleep_until_end();
        }
    }

    /// Stop playback immediately and drop queued audio.
    pub fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
            tracing::debug!("Audio playback stopped");
        }
    }
}

impl AudioSink for PlaybackSink {
    fn max_chunk_bytes(&self) -> usize {
        self.max_chunk_bytes
    }

    fn start(&mut self, format: AudioFormat) -> Result<(), SinkError> {
        self.stop();
        let sink = Sink::try_new(&self.stream_handle).map_err(|e| SinkError::Output(e.to_string()))?;
        self.sink = Some(sink);
        self.sample_rate = format.sample_rate;
        tracing::debug!(sample_rate = format.sample_rate, "Streaming playback sink created");
        Ok(())
    }

    fn deliver(&mut self, buffer: &[u8], offset: usize, length: usize) -> Result<(), SinkError> {
        let sink = self
            .sink
            .as_ref()
            .ok_or_else(|| SinkError::Output("playback not started".into()))?;
        let slice = buffer
            .get(offset..offset + length)
            .ok_or_else(|| SinkError::Output(format!("slice {offset}+{length} out of bounds")))?;

        let source = rodio::buffer::SamplesBuffer::new(1, self.sample_rate, pcm::decode(slice));
        sink.append(source);
        Ok(())
    }

    fn complete(&mut self) {
        tracing::debug!("All audio queued for playback");
    }

    fn fail(&mut self, kind: FailureKind) {
        tracing::debug!(%kind, "Playback aborted");
        self.stop();
    }
}

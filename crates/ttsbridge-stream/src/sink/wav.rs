//! WAV file sink backed by `hound`.
//!
//! The file is created on `start`, finalized on `complete`, and deleted on
//! `fail`. A cancelled utterance keeps whatever was written: the writer is
//! finalized when the sink is dropped.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavSpec, WavWriter};
use ttsbridge_core::{AudioFormat, AudioSink, FailureKind, SinkError};

use super::DEFAULT_SINK_CHUNK_BYTES;

fn sink_error(e: hound::Error) -> SinkError {
    match e {
        hound::Error::IoError(io) => SinkError::Io(io),
        other => SinkError::Output(other.to_string()),
    }
}

/// Writes delivered PCM16 to a mono WAV file.
pub struct WavFileSink {
    path: PathBuf,
    max_chunk_bytes: usize,
    writer: Option<WavWriter<BufWriter<File>>>,
    samples_written: u64,
}

impl std::fmt::Debug for WavFileSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WavFileSink")
            .field("path", &self.path)
            .field("open", &self.writer.is_some())
            .field("samples_written", &self.samples_written)
            .finish_non_exhaustive()
    }
}

impl WavFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_chunk_bytes: DEFAULT_SINK_CHUNK_BYTES,
            writer: None,
            samples_written: 0,
        }
    }

    #[must_use]
    pub const fn with_max_chunk_bytes(mut self, max_chunk_bytes: usize) -> Self {
        self.max_chunk_bytes = max_chunk_bytes;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub const fn samples_written(&self) -> u64 {
        self.samples_written
    }

    fn finalize(&mut self) {
        if let Some(writer) = self.writer.take() {
            match writer.finalize() {
                Ok(()) => tracing::debug!(
                    path = %self.path.display(),
                    samples = self.samples_written,
                    "WAV file finalized"
                ),
                Err(e) => tracing::warn!(path = %self.path.display(), error = %e, "Failed to finalize WAV file"),
            }
        }
    }
}

impl AudioSink for WavFileSink {
    fn max_chunk_bytes(&self) -> usize {
        self.max_chunk_bytes
    }

    fn start(&mut self, format: AudioFormat) -> Result<(), SinkError> {
        let spec = WavSpec {
            channels: format.channels,
            sample_rate: format.sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        self.writer = Some(WavWriter::create(&self.path, spec).map_err(sink_error)?);
        self.samples_written = 0;
        tracing::debug!(path = %self.path.display(), sample_rate = format.sample_rate, "WAV file opened");
        Ok(())
    }

    fn deliver(&mut self, buffer: &[u8], offset: usize, length: usize) -> Result<(), SinkError> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| SinkError::Output("WAV sink not started".into()))?;
        let slice = buffer
            .get(offset..offset + length)
            .ok_or_else(|| SinkError::Output(format!("slice {offset}+{length} out of bounds")))?;

        for pair in slice.chunks_exact(2) {
            writer
                .write_sample(i16::from_le_bytes([pair[0], pair[1]]))
                .map_err(sink_error)?;
            self.samples_written += 1;
        }
        Ok(())
    }

    fn complete(&mut self) {
        self.finalize();
    }

    fn fail(&mut self, kind: FailureKind) {
        // Drop the writer first so the file handle is closed before removal.
        drop(self.writer.take());
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::debug!(path = %self.path.display(), error = %e, "No partial WAV file to remove");
        } else {
            tracing::info!(path = %self.path.display(), %kind, "Removed partial WAV file");
        }
    }
}

impl Drop for WavFileSink {
    fn drop(&mut self) {
        self.finalize();
    }
}

//! Core domain types and port definitions for ttsbridge.
//!
//! This crate has no threads and no I/O beyond reading a settings file. It
//! defines what the streaming pipeline consumes ([`SynthesisEngine`]) and
//! what it drives ([`AudioSink`]), plus the settings that size it.
#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod error;
pub mod ports;
pub mod settings;

// Re-export commonly used types for convenience
pub use domain::{AudioFormat, PCM16_BYTES_PER_SAMPLE, SampleEncoding, SynthesisRequest};
pub use error::{EngineError, FailureKind, SinkError};
pub use ports::{AudioSink, ChunkControl, EngineProvider, SynthesisEngine};
pub use settings::{Settings, SettingsError, SettingsUpdate, validate_settings};

// Only used by the integration tests in `tests/`
#[cfg(test)]
use tempfile as _;

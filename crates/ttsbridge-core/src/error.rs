//! Core error types shared by engine and sink ports.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by a synthesis engine or while obtaining one.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine could not be created or initialised.
    #[error("Synthesis engine unavailable: {0}")]
    Unavailable(String),

    /// A required model file is missing.
    #[error("TTS model file not found at {0}")]
    ModelNotFound(PathBuf),

    /// The engine failed while producing audio.
    #[error("Speech synthesis failed: {0}")]
    Synthesis(String),
}

/// Errors returned by an [`AudioSink`](crate::ports::AudioSink) while
/// accepting audio.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The sink rejected the audio (device gone, stream closed, ...).
    #[error("Audio output failed: {0}")]
    Output(String),

    /// IO error writing audio (file sinks).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reason passed to [`AudioSink::fail`](crate::ports::AudioSink::fail).
///
/// Cancellation is deliberately absent: a cancelled utterance never reaches
/// the sink's failure channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureKind {
    /// The engine raised an error unrelated to cancellation.
    Synthesis,

    /// The engine could not be obtained; nothing was generated.
    EngineUnavailable,

    /// The sink itself refused the audio.
    Output,

    /// The request was malformed (e.g. negative speaker id).
    InvalidRequest,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Synthesis => "synthesis",
            Self::EngineUnavailable => "engine unavailable",
            Self::Output => "output",
            Self::InvalidRequest => "invalid request",
        };
        f.write_str(label)
    }
}

//! CLI-specific error types and exit codes.

use thiserror::Error;
use ttsbridge_core::{FailureKind, SettingsError};
use ttsbridge_stream::Outcome;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Unexpected internal failure (task panicked, report not serializable).
    #[error("{0}")]
    Internal(String),

    /// Argument error.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// IO error (stdin, settings file).
    #[error("IO error: {0}")]
    Io(String),

    /// Settings file unreadable or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The engine failed mid-utterance.
    #[error("Speech synthesis failed")]
    Synthesis,

    /// No engine could be loaded.
    #[error("Speech engine unavailable (see log for details)")]
    EngineUnavailable,

    /// The WAV file or audio device refused the audio.
    #[error("Audio output failed: {0}")]
    Output(String),

    /// Interrupted by Ctrl-C.
    #[error("Cancelled")]
    Cancelled,
}

impl CliError {
    /// Map error to an exit code.
    ///
    /// - 1: General error
    /// - 2: Invalid arguments
    /// - 64-78: see sysexits.h
    /// - 130: interrupted (128 + SIGINT)
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Internal(_) => 1,
            Self::Arguments(_) => 2, // EX_USAGE
            Self::EngineUnavailable => 69, // EX_UNAVAILABLE
            Self::Synthesis => 70, // EX_SOFTWARE
            Self::Io(_) | Self::Output(_) => 74, // EX_IOERR
            Self::Config(_) => 78, // EX_CONFIG
            Self::Cancelled => 130,
        }
    }

    /// Turn an utterance outcome into the command's result.
    pub fn from_outcome(outcome: Outcome) -> Result<(), Self> {
        match outcome {
            Outcome::Completed => Ok(()),
            Outcome::Cancelled => Err(Self::Cancelled),
            Outcome::EngineUnavailable | Outcome::Failed(FailureKind::EngineUnavailable) => {
                Err(Self::EngineUnavailable)
            }
            Outcome::Failed(FailureKind::Synthesis) => Err(Self::Synthesis),
            Outcome::Failed(FailureKind::Output) => {
                Err(Self::Output("the sink rejected the audio".to_string()))
            }
            Outcome::Failed(FailureKind::InvalidRequest) => {
                Err(Self::Arguments("invalid synthesis request".to_string()))
            }
        }
    }
}

impl From<SettingsError> for CliError {
    fn from(err: SettingsError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<tokio::task::JoinError> for CliError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Internal(format!("synthesis task failed: {err}"))
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("failed to serialize output: {err}"))
    }
}

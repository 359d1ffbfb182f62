//! Sherpa-ONNX Kokoro engine, via `sherpa-rs`.
//!
//! `KokoroTts::create` synthesizes a whole string at once, so the text is
//! split into sentence-sized pieces and each piece is delivered as one
//! chunk. The `Stop` signal is honoured between pieces.
//!
//! `create` takes `&mut self`, so the engine lives behind a [`Mutex`].

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use sherpa_rs::tts::{KokoroTts, KokoroTtsConfig};
use ttsbridge_core::{ChunkControl, EngineError, SynthesisEngine};

use crate::text_utils::{DEFAULT_MAX_CHUNK_CHARS, split_into_chunks};

/// Kokoro output sample rate (24 kHz).
pub const SHERPA_TTS_SAMPLE_RATE: u32 = 24_000;

/// Files a Kokoro model directory must contain.
pub const REQUIRED_MODEL_FILES: [&str; 3] = ["model.onnx", "voices.bin", "tokens.txt"];

/// espeak-ng data directory inside the model directory.
pub const ESPEAK_DATA_DIR: &str = "espeak-ng-data";

/// Check that `model_dir` holds a complete Kokoro model.
///
/// Returns [`EngineError::ModelNotFound`] naming the first missing path.
pub fn validate_model_dir(model_dir: &Path) -> Result<(), EngineError> {
    if !model_dir.is_dir() {
        return Err(EngineError::ModelNotFound(model_dir.to_path_buf()));
    }
    for name in REQUIRED_MODEL_FILES {
        let path = model_dir.join(name);
        if !path.is_file() {
            return Err(EngineError::ModelNotFound(path));
        }
        tracing::debug!(path = %path.display(), "Found TTS {name}");
    }
    let data_dir = model_dir.join(ESPEAK_DATA_DIR);
    if !data_dir.is_dir() {
        return Err(EngineError::ModelNotFound(data_dir));
    }
    Ok(())
}

fn path_to_string(path: &Path) -> Result<String, EngineError> {
    path.to_str()
        .map(ToString::to_string)
        .ok_or_else(|| EngineError::Unavailable(format!("Invalid UTF-8 path: {}", path.display())))
}

/// Kokoro engine streaming one text piece per chunk.
pub struct SherpaKokoroEngine {
    engine: Mutex<KokoroTts>,
    model_dir: PathBuf,
    max_chunk_chars: usize,
}

impl SherpaKokoroEngine {
    /// Load the Kokoro model from `model_dir`.
    pub fn load(model_dir: &Path) -> Result<Self, EngineError> {
        validate_model_dir(model_dir)?;

        tracing::info!(dir = %model_dir.display(), "Loading Sherpa Kokoro TTS model");

        let config = KokoroTtsConfig {
            model: path_to_string(&model_dir.join("model.onnx"))?,
            voices: path_to_string(&model_dir.join("voices.bin"))?,
            tokens: path_to_string(&model_dir.join("tokens.txt"))?,
            data_dir: path_to_string(&model_dir.join(ESPEAK_DATA_DIR))?,
            ..Default::default()
        };
        let engine = KokoroTts::new(config);

        Ok(Self {
            engine: Mutex::new(engine),
            model_dir: model_dir.to_path_buf(),
            max_chunk_chars: DEFAULT_MAX_CHUNK_CHARS,
        })
    }

    /// Override the text piece size (characters).
    #[must_use]
    pub fn with_max_chunk_chars(mut self, max_chunk_chars: usize) -> Self {
        self.max_chunk_chars = max_chunk_chars.max(1);
        self
    }

    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }
}

impl SynthesisEngine for SherpaKokoroEngine {
    fn stream_synthesize(
        &self,
        text: &str,
        speaker_id: i32,
        speed: f32,
        on_chunk: &mut dyn FnMut(&[f32]) -> ChunkControl,
    ) -> Result<(), EngineError> {
        let pieces = split_into_chunks(text, self.max_chunk_chars);
        tracing::debug!(pieces = pieces.len(), speaker_id, speed, "Synthesizing speech (Sherpa Kokoro)");

        for piece in &pieces {
            let audio = self
                .engine
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .create(piece, speaker_id, speed)
                .map_err(|e| EngineError::Synthesis(format!("{e}")))?;

            if audio.sample_rate != SHERPA_TTS_SAMPLE_RATE {
                return Err(EngineError::Synthesis(format!(
                    "model produced {} Hz audio, expected {SHERPA_TTS_SAMPLE_RATE} Hz",
                    audio.sample_rate
                )));
            }

            tracing::debug!(chars = piece.len(), samples = audio.samples.len(), "Text piece synthesized");
            if on_chunk(&audio.samples).is_stop() {
                tracing::debug!("Engine stopped by caller");
                break;
            }
        }
        Ok(())
    }

    fn sample_rate(&self) -> u32 {
        SHERPA_TTS_SAMPLE_RATE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_directory_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("kokoro");
        assert!(matches!(
            validate_model_dir(&missing),
            Err(EngineError::ModelNotFound(p)) if p == missing
        ));
    }

    #[test]
    fn first_missing_file_is_named() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("model.onnx"), b"").unwrap();

        match validate_model_dir(dir.path()) {
            Err(EngineError::ModelNotFound(p)) => assert!(p.ends_with("voices.bin")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn espeak_data_is_required() {
        let dir = tempfile::tempdir().unwrap();
        for name in REQUIRED_MODEL_FILES {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        match validate_model_dir(dir.path()) {
            Err(EngineError::ModelNotFound(p)) => assert!(p.ends_with(ESPEAK_DATA_DIR)),
            other => panic!("unexpected {other:?}"),
        }

        std::fs::create_dir(dir.path().join(ESPEAK_DATA_DIR)).unwrap();
        assert!(validate_model_dir(dir.path()).is_ok());
    }
}

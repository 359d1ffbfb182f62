//! Settings domain types and validation.
//!
//! All fields are optional so a settings file may name only what it wants to
//! override; the `effective_*` accessors supply the defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Default speaker index.
pub const DEFAULT_SPEAKER_ID: i32 = 0;

/// Default speed multiplier.
pub const DEFAULT_SPEED: f32 = 1.0;

/// Samples quieter than this (absolute PCM16 value) count as silence.
pub const DEFAULT_AMPLITUDE_THRESHOLD: i16 = 700;

/// Silence kept at the start of every silent run, in milliseconds.
pub const DEFAULT_KEEP_MS: u32 = 300;

/// Transfer queue slots between generation and delivery.
pub const DEFAULT_QUEUE_CAPACITY: usize = 32;

/// Delivery never slices below this many bytes, whatever the sink reports.
pub const DEFAULT_MIN_SINK_CHUNK_BYTES: usize = 4096;

/// Slowest speed reachable from a system speech rate.
pub const MIN_SPEED: f32 = 0.2;

/// Fastest speed reachable from a system speech rate.
pub const MAX_SPEED: f32 = 3.0;

/// System speech rate that maps to speed 1.0.
pub const NORMAL_SYSTEM_RATE: u32 = 100;

const MAX_QUEUE_CAPACITY: usize = 1024;

/// Synthesis settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Engine speaker index.
    pub speaker_id: Option<i32>,

    /// Speed multiplier used when the system rate is not honoured.
    pub speed: Option<f32>,

    /// Derive speed from the caller-supplied system speech rate instead of
    /// `speed`.
    pub use_system_rate: Option<bool>,

    /// Silence detection threshold (absolute PCM16 amplitude).
    pub amplitude_threshold: Option<i16>,

    /// Silence kept at the onset of each silent run (ms).
    pub keep_ms: Option<u32>,

    /// Transfer queue capacity (slots).
    pub queue_capacity: Option<usize>,

    /// Lower bound on the slice size handed to a sink (bytes, even).
    pub min_sink_chunk_bytes: Option<usize>,
}

impl Settings {
    /// Create settings with every field populated.
    #[must_use]
    pub const fn with_defaults() -> Self {
        Self {
            speaker_id: Some(DEFAULT_SPEAKER_ID),
            speed: Some(DEFAULT_SPEED),
            use_system_rate: Some(false),
            amplitude_threshold: Some(DEFAULT_AMPLITUDE_THRESHOLD),
            keep_ms: Some(DEFAULT_KEEP_MS),
            queue_capacity: Some(DEFAULT_QUEUE_CAPACITY),
            min_sink_chunk_bytes: Some(DEFAULT_MIN_SINK_CHUNK_BYTES),
        }
    }

    /// Load settings from a JSON file.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let raw = std::fs::read_to_string(path).map_err(|e| SettingsError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let settings: Self = serde_json::from_str(&raw).map_err(|e| SettingsError::Parse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        tracing::debug!(path = %path.display(), "Loaded settings file");
        Ok(settings)
    }

    #[must_use]
    pub fn effective_speaker_id(&self) -> i32 {
        self.speaker_id.unwrap_or(DEFAULT_SPEAKER_ID)
    }

    #[must_use]
    pub fn effective_amplitude_threshold(&self) -> i16 {
        self.amplitude_threshold.unwrap_or(DEFAULT_AMPLITUDE_THRESHOLD)
    }

    #[must_use]
    pub fn effective_keep_ms(&self) -> u32 {
        self.keep_ms.unwrap_or(DEFAULT_KEEP_MS)
    }

    #[must_use]
    pub fn effective_queue_capacity(&self) -> usize {
        self.queue_capacity.unwrap_or(DEFAULT_QUEUE_CAPACITY)
    }

    #[must_use]
    pub fn effective_min_sink_chunk_bytes(&self) -> usize {
        self.min_sink_chunk_bytes.unwrap_or(DEFAULT_MIN_SINK_CHUNK_BYTES)
    }

    /// Resolve the speed multiplier for one utterance.
    ///
    /// With `use_system_rate` set and a `system_rate` supplied, the rate is
    /// mapped so that [`NORMAL_SYSTEM_RATE`] is 1.0, clamped to
    /// [`MIN_SPEED`]..=[`MAX_SPEED`]. Otherwise the configured `speed` wins.
    #[must_use]
    pub fn effective_speed(&self, system_rate: Option<u32>) -> f32 {
        match (self.use_system_rate.unwrap_or(false), system_rate) {
            (true, Some(rate)) => {
                #[allow(clippy::cast_precision_loss)]
                let speed = rate as f32 / NORMAL_SYSTEM_RATE as f32;
                speed.clamp(MIN_SPEED, MAX_SPEED)
            }
            _ => self.speed.unwrap_or(DEFAULT_SPEED),
        }
    }

    /// Merge an update into these settings, only touching fields that are `Some`.
    pub fn merge(&mut self, other: &SettingsUpdate) {
        if let Some(speaker_id) = other.speaker_id {
            self.speaker_id = speaker_id;
        }
        if let Some(speed) = other.speed {
            self.speed = speed;
        }
        if let Some(use_system_rate) = other.use_system_rate {
            self.use_system_rate = use_system_rate;
        }
        if let Some(threshold) = other.amplitude_threshold {
            self.amplitude_threshold = threshold;
        }
        if let Some(keep_ms) = other.keep_ms {
            self.keep_ms = keep_ms;
        }
        if let Some(capacity) = other.queue_capacity {
            self.queue_capacity = capacity;
        }
        if let Some(min_bytes) = other.min_sink_chunk_bytes {
            self.min_sink_chunk_bytes = min_bytes;
        }
    }
}

/// Partial settings update.
///
/// Each field is `Option<Option<T>>`:
/// - `None` = don't change this field
/// - `Some(None)` = reset the field to its default
/// - `Some(Some(value))` = set field to value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub speaker_id: Option<Option<i32>>,
    pub speed: Option<Option<f32>>,
    pub use_system_rate: Option<Option<bool>>,
    pub amplitude_threshold: Option<Option<i16>>,
    pub keep_ms: Option<Option<u32>>,
    pub queue_capacity: Option<Option<usize>>,
    pub min_sink_chunk_bytes: Option<Option<usize>>,
}

/// Overlay: every field the source sets becomes a `Some(Some(..))`, every
/// field it leaves out is left untouched.
impl From<&Settings> for SettingsUpdate {
    fn from(settings: &Settings) -> Self {
        Self {
            speaker_id: settings.speaker_id.map(Some),
            speed: settings.speed.map(Some),
            use_system_rate: settings.use_system_rate.map(Some),
            amplitude_threshold: settings.amplitude_threshold.map(Some),
            keep_ms: settings.keep_ms.map(Some),
            queue_capacity: settings.queue_capacity.map(Some),
            min_sink_chunk_bytes: settings.min_sink_chunk_bytes.map(Some),
        }
    }
}

/// Settings validation error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SettingsError {
    #[error("Speaker id must be non-negative, got {0}")]
    InvalidSpeakerId(i32),

    #[error("Speed must be between 0.2 and 3.0, got {0}")]
    InvalidSpeed(f32),

    #[error("Amplitude threshold must be between 1 and 32767, got {0}")]
    InvalidAmplitudeThreshold(i16),

    #[error("Silence keep duration must be at least 1 ms")]
    InvalidKeepMs,

    #[error("Queue capacity must be between 1 and 1024, got {0}")]
    InvalidQueueCapacity(usize),

    #[error("Minimum sink chunk must be an even number of bytes >= 2, got {0}")]
    InvalidSinkChunk(usize),

    #[error("Failed to read settings file {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Failed to parse settings file {path}: {reason}")]
    Parse { path: String, reason: String },
}

/// Validate settings values.
pub fn validate_settings(settings: &Settings) -> Result<(), SettingsError> {
    if let Some(speaker_id) = settings.speaker_id {
        if speaker_id < 0 {
            return Err(SettingsError::InvalidSpeakerId(speaker_id));
        }
    }

    if let Some(speed) = settings.speed {
        if !(MIN_SPEED..=MAX_SPEED).contains(&speed) {
            return Err(SettingsError::InvalidSpeed(speed));
        }
    }

    if let Some(threshold) = settings.amplitude_threshold {
        if threshold < 1 {
            return Err(SettingsError::InvalidAmplitudeThreshold(threshold));
        }
    }

    if settings.keep_ms == Some(0) {
        return Err(SettingsError::InvalidKeepMs);
    }

    if let Some(capacity) = settings.queue_capacity {
        if !(1..=MAX_QUEUE_CAPACITY).contains(&capacity) {
            return Err(SettingsError::InvalidQueueCapacity(capacity));
        }
    }

    if let Some(min_bytes) = settings.min_sink_chunk_bytes {
        if min_bytes < 2 || min_bytes % 2 != 0 {
            return Err(SettingsError::InvalidSinkChunk(min_bytes));
        }
    }

    Ok(())
}

//! [`AudioSink`](ttsbridge_core::AudioSink) adapters.
//!
//! | Sink | Feature | Terminal behaviour |
//! |------|---------|--------------------|
//! | [`CollectingSink`] | always | records every call |
//! | [`WavFileSink`] | always | finalize on complete, delete on fail |
//! | [`PlaybackSink`] | `playback` | stop on fail |

pub mod memory;
#[cfg(feature = "playback")]
pub mod playback;
pub mod wav;

pub use memory::{CollectingSink, SinkEvent};
#[cfg(feature = "playback")]
pub use playback::PlaybackSink;
pub use wav::WavFileSink;

/// Slice size the file and device sinks report by default.
pub const DEFAULT_SINK_CHUNK_BYTES: usize = 8192;

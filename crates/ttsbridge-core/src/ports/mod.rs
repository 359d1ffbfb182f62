//! Ports: the two collaborators the streaming pipeline talks to.
//!
//! | Port | Direction | Implementors |
//! |------|-----------|--------------|
//! | [`SynthesisEngine`] / [`EngineProvider`] | consumed | sherpa-onnx adapter, test doubles |
//! | [`AudioSink`] | exposed to | WAV file, in-memory, `rodio` playback |

pub mod engine;
pub mod sink;

pub use engine::{ChunkControl, EngineProvider, SynthesisEngine};
pub use sink::AudioSink;

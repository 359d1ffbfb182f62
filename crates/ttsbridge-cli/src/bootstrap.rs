//! CLI bootstrap - the composition root.
//!
//! Settings, the engine provider and the session are put together here;
//! handlers only see the finished pieces.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ttsbridge_core::{EngineProvider, Settings, SettingsUpdate};
use ttsbridge_stream::{LazyEngine, StreamConfig, SynthesisSession};

use crate::error::CliError;

/// Defaults, overlaid with the settings file when one is given.
///
/// The result is not validated: command-line overrides still have to be
/// applied first.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, CliError> {
    let mut settings = Settings::with_defaults();
    if let Some(path) = path {
        let file = Settings::load(path)?;
        settings.merge(&SettingsUpdate::from(&file));
    }
    Ok(settings)
}

/// Engine provider for `model_dir`. Nothing is loaded until the first
/// utterance asks for the engine.
#[cfg(feature = "sherpa")]
pub fn build_provider(model_dir: PathBuf) -> Arc<dyn EngineProvider> {
    use ttsbridge_core::SynthesisEngine;
    use ttsbridge_stream::SherpaKokoroEngine;

    Arc::new(LazyEngine::new(move || {
        let engine = SherpaKokoroEngine::load(&model_dir)?;
        Ok(Arc::new(engine) as Arc<dyn SynthesisEngine>)
    }))
}

/// Without the `sherpa` feature there is no engine to load.
#[cfg(not(feature = "sherpa"))]
pub fn build_provider(model_dir: PathBuf) -> Arc<dyn EngineProvider> {
    use ttsbridge_core::EngineError;

    Arc::new(LazyEngine::new(move || {
        Err(EngineError::Unavailable(format!(
            "ttsbridge was built without the `sherpa` feature; cannot load {}",
            model_dir.display()
        )))
    }))
}

pub fn build_session(provider: Arc<dyn EngineProvider>, settings: &Settings) -> Arc<SynthesisSession> {
    let config = StreamConfig::from_settings(settings);
    tracing::debug!(?config, "Building synthesis session");
    Arc::new(SynthesisSession::new(provider, config))
}

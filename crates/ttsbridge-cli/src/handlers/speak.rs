//! `speak` command handler.
//!
//! Synthesis is blocking, so the session runs on tokio's blocking pool
//! while the async side waits for either the result or Ctrl-C. Ctrl-C only
//! cancels the utterance; the handler still waits for the blocking task to
//! return so the sink is closed before the process exits.

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use ttsbridge_core::{Settings, SettingsUpdate, SynthesisRequest, validate_settings};
use ttsbridge_stream::sink::DEFAULT_SINK_CHUNK_BYTES;
use ttsbridge_stream::{SynthesisSession, UtteranceReport, WavFileSink};

use crate::bootstrap;
use crate::commands::SpeakArgs;
use crate::error::CliError;

/// WAV file written when neither `--out` nor `--play` is given.
pub const DEFAULT_OUT_FILE: &str = "speech.wav";

/// Where the audio goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkTarget {
    Wav { path: PathBuf, max_chunk_bytes: usize },
    Play,
}

impl SinkTarget {
    pub fn from_args(args: &SpeakArgs) -> Self {
        if args.play {
            return Self::Play;
        }
        Self::Wav {
            path: args
                .out
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_FILE)),
            max_chunk_bytes: args.max_chunk_bytes.unwrap_or(DEFAULT_SINK_CHUNK_BYTES),
        }
    }
}

/// Execute `speak`.
pub async fn execute(settings: Settings, args: SpeakArgs) -> Result<(), CliError> {
    let text = read_text(args.text.as_deref())?;
    let settings = apply_overrides(settings, &args);
    validate_settings(&settings)?;

    let request = SynthesisRequest::new(
        text,
        settings.effective_speaker_id(),
        settings.effective_speed(args.rate),
    );
    let provider = bootstrap::build_provider(args.model_dir.clone());
    let session = bootstrap::build_session(provider, &settings);

    let report = run(session, request, SinkTarget::from_args(&args)).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    CliError::from_outcome(report.outcome)
}

/// Fold the command-line flags into the loaded settings.
///
/// `--rate` switches on `use_system_rate` for this invocation.
pub fn apply_overrides(mut settings: Settings, args: &SpeakArgs) -> Settings {
    let update = SettingsUpdate {
        speaker_id: args.speaker.map(Some),
        speed: args.speed.map(Some),
        use_system_rate: args.rate.map(|_| Some(true)),
        ..Default::default()
    };
    settings.merge(&update);
    settings
}

fn read_text(arg: Option<&str>) -> Result<String, CliError> {
    match arg {
        Some(text) if text != "-" => Ok(text.to_string()),
        _ => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

/// Run one utterance into `target`, cancelling it on Ctrl-C.
pub async fn run(
    session: Arc<SynthesisSession>,
    request: SynthesisRequest,
    target: SinkTarget,
) -> Result<UtteranceReport, CliError> {
    let task = {
        let session = Arc::clone(&session);
        tokio::task::spawn_blocking(move || synthesize_into(&session, &request, target))
    };
    tokio::pin!(task);

    tokio::select! {
        joined = &mut task => joined?,
        Ok(()) = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted, cancelling utterance");
            session.cancel();
            task.await?
        }
    }
}

// Sinks are built on the blocking thread: a rodio output stream cannot
// cross threads.
fn synthesize_into(
    session: &SynthesisSession,
    request: &SynthesisRequest,
    target: SinkTarget,
) -> Result<UtteranceReport, CliError> {
    match target {
        SinkTarget::Wav {
            path,
            max_chunk_bytes,
        } => {
            let mut sink = WavFileSink::new(path).with_max_chunk_bytes(max_chunk_bytes);
            let report = session.synthesize(request, &mut sink);
            if report.outcome.is_completed() {
                tracing::info!(
                    path = %sink.path().display(),
                    samples = sink.samples_written(),
                    "Wrote WAV file"
                );
            }
            Ok(report)
        }
        SinkTarget::Play => play(session, request),
    }
}

#[cfg(feature = "playback")]
fn play(session: &SynthesisSession, request: &SynthesisRequest) -> Result<UtteranceReport, CliError> {
    let mut sink =
        ttsbridge_stream::PlaybackSink::new().map_err(|e| CliError::Output(e.to_string()))?;
    let report = session.synthesize(request, &mut sink);
    if report.outcome.is_completed() {
        sink.wait_until_end();
    }
    Ok(report)
}

#[cfg(not(feature = "playback"))]
fn play(_session: &SynthesisSession, _request: &SynthesisRequest) -> Result<UtteranceReport, CliError> {
    Err(CliError::Arguments(
        "--play needs ttsbridge built with the `playback` feature".to_string(),
    ))
}

//! Main commands enum and subcommand arguments.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Synthesize text and write it to a WAV file or play it
    Speak(SpeakArgs),

    /// Inspect the effective settings
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Arguments for `speak`.
#[derive(Args, Debug, Clone)]
pub struct SpeakArgs {
    /// Text to speak; read from stdin when omitted or `-`
    pub text: Option<String>,

    /// Speaker index (overrides the settings file)
    #[arg(long)]
    pub speaker: Option<i32>,

    /// Speed multiplier, 0.2 to 3.0 (overrides the settings file)
    #[arg(long)]
    pub speed: Option<f32>,

    /// System speech rate, 100 = normal; takes precedence over --speed
    #[arg(long)]
    pub rate: Option<u32>,

    /// Kokoro model directory (model.onnx, voices.bin, tokens.txt, espeak-ng-data/)
    #[arg(long, env = "TTSBRIDGE_MODEL_DIR", default_value = "models/kokoro")]
    pub model_dir: PathBuf,

    /// Write the audio to this WAV file (default: speech.wav)
    #[arg(short, long, conflicts_with = "play")]
    pub out: Option<PathBuf>,

    /// Play the audio on the default output device
    #[arg(long)]
    pub play: bool,

    /// Largest buffer handed to the output in one call (bytes)
    #[arg(long)]
    pub max_chunk_bytes: Option<usize>,
}

/// `config` subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective settings as JSON
    Show,
    /// Validate a settings file (defaults to --config)
    Check {
        /// Settings file to check
        path: Option<PathBuf>,
    },
}

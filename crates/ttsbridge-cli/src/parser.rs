//! Main CLI parser and top-level argument handling.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface for streaming text-to-speech.
#[derive(Parser)]
#[command(name = "ttsbridge")]
#[command(about = "Stream text-to-speech to a WAV file or the speakers")]
#[command(version)]
pub struct Cli {
    /// JSON settings file applied on top of the defaults
    #[arg(long, env = "TTSBRIDGE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::ConfigCommand;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_args_after_subcommand() {
        let cli = Cli::parse_from([
            "ttsbridge",
            "config",
            "show",
            "--verbose",
            "--config",
            "/tmp/tts.json",
        ]);
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/tts.json")));
        assert!(matches!(
            cli.command,
            Commands::Config {
                command: ConfigCommand::Show
            }
        ));
    }

    #[test]
    fn test_speak_args() {
        let cli = Cli::parse_from([
            "ttsbridge",
            "speak",
            "Hello there.",
            "--speaker",
            "3",
            "--rate",
            "150",
            "--out",
            "hello.wav",
            "--model-dir",
            "/models/kokoro",
        ]);
        let Commands::Speak(args) = cli.command else {
            panic!("expected speak");
        };
        assert_eq!(args.text.as_deref(), Some("Hello there."));
        assert_eq!(args.speaker, Some(3));
        assert_eq!(args.rate, Some(150));
        assert_eq!(args.out, Some(PathBuf::from("hello.wav")));
        assert_eq!(args.model_dir, PathBuf::from("/models/kokoro"));
        assert!(!args.play);
    }

    #[test]
    fn test_out_conflicts_with_play() {
        let result = Cli::try_parse_from(["ttsbridge", "speak", "hi", "--out", "a.wav", "--play"]);
        assert!(result.is_err());
    }
}

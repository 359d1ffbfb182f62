//! Config command handler.

use std::path::Path;

use ttsbridge_core::{Settings, validate_settings};

use crate::bootstrap;
use crate::commands::ConfigCommand;
use crate::error::CliError;

/// Execute the config command.
///
/// `settings` are the already-loaded effective settings; `config_path` is
/// the global `--config`, used by `check` when no path is given.
pub fn execute(
    settings: &Settings,
    config_path: Option<&Path>,
    command: ConfigCommand,
) -> Result<(), CliError> {
    match command {
        ConfigCommand::Show => {
            println!("{}", render(settings)?);
            Ok(())
        }
        ConfigCommand::Check { path } => {
            let path = path.as_deref().or(config_path).ok_or_else(|| {
                CliError::Arguments("no settings file given (pass a path or --config)".to_string())
            })?;
            check(path)?;
            println!("✓ {} is valid", path.display());
            Ok(())
        }
    }
}

fn render(settings: &Settings) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(settings)?)
}

/// Load `path` over the defaults and validate the result.
pub fn check(path: &Path) -> Result<Settings, CliError> {
    let settings = bootstrap::load_settings(Some(path))?;
    validate_settings(&settings)?;
    Ok(settings)
}

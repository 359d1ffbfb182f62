//! CLI entry point.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ttsbridge_cli::{Cli, CliError, Commands, bootstrap, handlers};

fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    // RUST_LOG wins over -v
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
}

async fn dispatch(cli: Cli) -> Result<(), CliError> {
    let settings = bootstrap::load_settings(cli.config.as_deref())?;

    match cli.command {
        Commands::Speak(args) => handlers::speak::execute(settings, args).await,
        Commands::Config { command } => {
            handlers::config::execute(&settings, cli.config.as_deref(), command)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before parsing so clap sees TTSBRIDGE_* variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    if let Err(err) = dispatch(cli).await {
        eprintln!("Error: {err}");
        std::process::exit(err.exit_code());
    }

    Ok(())
}

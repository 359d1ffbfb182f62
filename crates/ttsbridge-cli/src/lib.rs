//! `ttsbridge` command-line adapter.
//!
//! The binary in `main.rs` parses arguments, installs logging and hands off
//! to [`handlers`]. Everything wiring-related lives in [`bootstrap`].
#![deny(unused_crate_dependencies)]

// Used by the binary only
use anyhow as _;
use dotenvy as _;
use tracing_subscriber as _;

// Only exercised by the engine-less test, which the `sherpa` feature skips
#[cfg(test)]
use tokio_test as _;

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;

// Re-export primary types for convenient access
pub use commands::{Commands, ConfigCommand, SpeakArgs};
pub use error::CliError;
pub use parser::Cli;

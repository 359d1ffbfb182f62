//! Command handlers.
//!
//! Each handler takes the loaded settings plus its parsed arguments and
//! returns a [`CliError`](crate::CliError) on failure; `main` turns that into
//! the exit code.

pub mod config;
pub mod speak;

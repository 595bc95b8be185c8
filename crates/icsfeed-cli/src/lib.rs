//! Command-line interface over the ingestion session.
//!
//! This crate provides the `icsfeed` binary.

pub mod cli;
pub mod config;
pub mod error;
pub mod output;

pub use cli::Cli;
pub use config::CliConfig;
pub use error::{CliError, CliResult};

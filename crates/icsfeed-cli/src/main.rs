//! icsfeed CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use icsfeed_core::init_logging;
use icsfeed_ingest::{IngestError, Session};
use tracing::debug;

use icsfeed_cli::cli::Cli;
use icsfeed_cli::config::CliConfig;
use icsfeed_cli::error::CliResult;
use icsfeed_cli::output;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Loads every source and prints its events. Returns false if any source
/// failed.
async fn run(cli: Cli) -> CliResult<bool> {
    let file = match cli.config {
        Some(ref path) => CliConfig::load_from(path)?,
        None => CliConfig::load()?,
    };

    init_logging(&cli.log_settings(&file))?;

    let json = cli.json || file.json;
    debug!(sources = cli.sources.len(), json, "Submitting sources");
    let mut session = Session::new(cli.ingest_config(file.ingest))?;
    for source in &cli.sources {
        session.submit(source.as_str());
    }

    while let Some(event) = session.next_event().await {
        if json {
            println!("{}", output::event_json(&event)?);
        } else {
            println!("{}", output::event_line(&event));
        }
    }

    let calendars = session.calendars()?;
    let errors = session.errors()?;
    debug!(
        calendars = calendars.len(),
        errors = errors.len(),
        "All sources drained"
    );
    for err in &errors {
        let kind = if err.is_retrieval() { "error" } else { "warning" };
        eprintln!("{kind}: {err}");
    }
    eprintln!("{}", output::summary_line(&calendars, &errors));

    Ok(!errors.iter().any(IngestError::is_retrieval))
}

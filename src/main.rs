use std::io::{self, BufRead};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use hourlog::config::Settings;
use hourlog::logging::{self, Level, LogRouter};

mod cli;

use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };
    let settings = cli.apply(settings);

    let line_level: Level = cli.line_level.parse()?;
    let level: Level = settings.level.parse()?;

    // Routing first, so the subscriber sees the final output mode
    let router = Arc::new(LogRouter::new());
    router.initialize_with(&settings)?;
    logging::install(&router, level)?;

    tracing::debug!(
        "Routing {} output, rotating every {}h",
        settings.output_type,
        settings.rotation_hours.max(1)
    );

    for line in io::stdin().lock().lines() {
        let line = line.context("Failed to read standard input")?;
        emit(line_level, &line);
    }

    Ok(())
}

/// Log one input line at `level`
fn emit(level: Level, line: &str) {
    match level {
        Level::Trace => tracing::trace!("{}", line),
        Level::Debug => tracing::debug!("{}", line),
        Level::Info => tracing::info!("{}", line),
        Level::Warn => tracing::warn!("{}", line),
        Level::Error => tracing::error!("{}", line),
        Level::Panic => tracing::error!(panic = true, "{}", line),
    }
}

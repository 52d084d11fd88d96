//! philo-snitch command line.
//!
//! Usage:
//!   ./philo 5 800 200 200 | philo-snitch 5 800 200 200
//!   ./philo 4 410 200 200 7 | philo-snitch debug 4 410 200 200 7 --log-file run.log

use anyhow::{Context, Result};
use clap::Parser;
use philo_snitch::{ErrorLog, Palette, Reporter, Session, TableConfig};
use std::io::{BufRead, IsTerminal};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "philo-snitch")]
#[command(about = "Audit a dining-philosophers trace read from stdin")]
#[command(version)]
struct Cli {
    /// [debug] [bonus] number_of_philosophers time_to_die time_to_eat time_to_sleep [meals_required]
    #[arg(required = true, allow_negative_numbers = true)]
    table: Vec<String>,

    /// File receiving every error line (truncated at startup)
    #[arg(long, default_value = "log.snitch")]
    log_file: PathBuf,

    /// Tolerance in ms before a starving philosopher is reported
    #[arg(long)]
    grace_ms: Option<i64>,

    /// Disable ANSI colors
    #[arg(long, default_value_t = false)]
    no_color: bool,

    /// Also export diagnostics as NDJSON to this file
    #[cfg(feature = "ndjson")]
    #[arg(long)]
    ndjson: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Diagnostics own stdout; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = TableConfig::from_args(cli.table.as_slice()).context("Invalid table arguments")?;
    if let Some(grace_ms) = cli.grace_ms {
        config.grace_ms = grace_ms;
    }

    let stdout = std::io::stdout();
    let palette = if !cli.no_color && stdout.is_terminal() {
        Palette::ansi()
    } else {
        Palette::plain()
    };

    let log = ErrorLog::create(&cli.log_file)
        .with_context(|| format!("Failed to create log file: {}", cli.log_file.display()))?;
    let mut reporter = Reporter::new(stdout.lock(), palette).with_log(log);

    #[cfg(feature = "ndjson")]
    let mut emitter = cli
        .ndjson
        .as_deref()
        .map(philo_snitch::DiagnosticEmitter::new)
        .transpose()
        .context("Failed to create NDJSON export")?;

    let mut session = Session::new(config);

    for line in std::io::stdin().lock().split(b'\n') {
        let line = line.context("Failed to read stdin")?;
        let line = String::from_utf8_lossy(&line);
        let report = session.process_line(&line);

        reporter.emit(&report).context("Failed to write report")?;

        #[cfg(feature = "ndjson")]
        if let Some(emitter) = emitter.as_mut() {
            emitter.emit(&report)?;
        }
    }

    let (_, logged) = reporter.finish().context("Failed to flush output")?;

    #[cfg(feature = "ndjson")]
    if let Some(emitter) = emitter {
        let exported = emitter.finish()?;
        info!(exported, "NDJSON export complete");
    }

    let summary = session.summary();
    info!(
        lines = summary.lines,
        malformed = summary.malformed,
        flagged = summary.flagged,
        errors = summary.errors(),
        logged,
        "Session finished"
    );

    Ok(())
}

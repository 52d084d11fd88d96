//! Example: audit a recorded trace and export its diagnostics.
//!
//! A short run of a two-seat table where philosopher 2 naps before its
//! meal is over. Each line is checked as it arrives, then every surfaced
//! diagnostic is written to NDJSON.
//!
//! Run with: cargo run --example replay_trace

use philo_snitch::*;
use std::path::Path;

const TRACE: &str = "\
0 1 has taken a fork
0 1 has taken a fork
0 1 is eating
200 1 is sleeping
200 2 has taken a fork
200 2 has taken a fork
200 2 is eating
250 2 is sleeping
400 1 is thinking
";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let export = Path::new("target/example_diagnostics.ndjson");
    let config = TableConfig::from_args(&["2", "800", "200", "200"])?;

    let mut session = Session::new(config);
    let mut emitter = DiagnosticEmitter::new(export)?;

    for report in session.process_trace(TRACE) {
        for line in report.error_lines() {
            println!("{:<36}{line}", report.line);
        }
        emitter.emit(&report)?;
    }

    let count = emitter.finish()?;
    let summary = session.summary();
    println!(
        "Checked {} lines, {} flagged, {count} diagnostics exported to {}",
        summary.lines,
        summary.flagged,
        export.display()
    );

    Ok(())
}

//! NDJSON export of surfaced diagnostics.
//!
//! One JSON object per diagnostic:
//! ```json
//! {"timestamp": 111, "philosopher": 2, "line": "111 2 is eating", "rule": "strange_smell", "severity": "error", "lines": ["..."]}
//! ```
//! Malformed input lines are exported with rule `"parser"`.

use crate::diagnostic::Severity;
use crate::error::Error;
use crate::session::{LineReport, UNEXPECTED_INPUT};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

#[derive(Serialize)]
struct Entry<'a> {
    timestamp: Option<i64>,
    philosopher: Option<i64>,
    line: &'a str,
    rule: &'a str,
    severity: Severity,
    lines: Vec<String>,
}

/// Records diagnostics as newline-delimited JSON.
pub struct DiagnosticEmitter {
    writer: std::io::BufWriter<std::fs::File>,
    count: usize,
}

impl DiagnosticEmitter {
    /// Create a new emitter writing to the given file path.
    pub fn new(path: &Path) -> Result<Self, Error> {
        let file = std::fs::File::create(path)?;
        Ok(Self {
            writer: std::io::BufWriter::new(file),
            count: 0,
        })
    }

    /// Emit every diagnostic of a line report.
    pub fn emit(&mut self, report: &LineReport) -> Result<(), Error> {
        let record = match &report.record {
            Ok(record) => record,
            Err(_) => {
                return self.write(&Entry {
                    timestamp: None,
                    philosopher: None,
                    line: &report.line,
                    rule: "parser",
                    severity: Severity::Error,
                    lines: vec![UNEXPECTED_INPUT.to_string()],
                });
            }
        };

        for diagnostic in &report.diagnostics {
            self.write(&Entry {
                timestamp: Some(record.timestamp),
                philosopher: Some(record.philosopher),
                line: &report.line,
                rule: diagnostic.rule,
                severity: diagnostic.severity,
                lines: diagnostic.lines().collect(),
            })?;
        }
        Ok(())
    }

    fn write(&mut self, entry: &Entry<'_>) -> Result<(), Error> {
        serde_json::to_writer(&mut self.writer, entry)?;
        self.writer.write_all(b"\n")?;
        self.count += 1;
        Ok(())
    }

    /// Flush buffered output and return the number of diagnostics emitted.
    pub fn finish(mut self) -> Result<usize, Error> {
        self.writer.flush()?;
        Ok(self.count)
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

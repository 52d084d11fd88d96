//! Diagnostic reporter: terminal rendering and the persistent error log.
//!
//! Each input line renders as one segment per message line (or a single
//! empty segment when there is nothing to say). The first segment carries
//! the input padded to [`COLUMN_WIDTH`]; the following ones pad an empty
//! string so messages stay aligned.

use crate::session::LineReport;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Width of the input column.
pub const COLUMN_WIDTH: usize = 36;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[0m\x1b[1m";
const RED: &str = "\x1b[0m\x1b[91m\x1b[1m";
const YELLOW: &str = "\x1b[0m\x1b[93m\x1b[1m";

/// Escape sequences used for each kind of segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub input: &'static str,
    pub error: &'static str,
    pub debug: &'static str,
    pub reset: &'static str,
}

impl Palette {
    pub const fn ansi() -> Self {
        Self {
            input: BOLD,
            error: RED,
            debug: YELLOW,
            reset: RESET,
        }
    }

    pub const fn plain() -> Self {
        Self {
            input: "",
            error: "",
            debug: "",
            reset: "",
        }
    }
}

/// Which kind of message a segment carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Plain,
    Error,
    Debug,
}

/// One rendered output segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub input: String,
    pub kind: SegmentKind,
    pub text: String,
}

/// Lay out a line report as segments: errors first, then debug notes.
pub fn segments(report: &LineReport) -> Vec<Segment> {
    let mut messages: Vec<(SegmentKind, String)> = report
        .error_lines()
        .into_iter()
        .map(|line| (SegmentKind::Error, format!(". {line}")))
        .chain(
            report
                .debug_lines()
                .into_iter()
                .map(|line| (SegmentKind::Debug, format!(". {line}"))),
        )
        .collect();

    if messages.is_empty() {
        messages.push((SegmentKind::Plain, String::new()));
    }

    let mut input = Some(report.line.clone());
    messages
        .into_iter()
        .map(|(kind, text)| Segment {
            input: input.take().unwrap_or_default(),
            kind,
            text,
        })
        .collect()
}

/// Append-only sink for error segments, truncated when opened.
pub struct ErrorLog {
    writer: BufWriter<File>,
    count: usize,
}

impl ErrorLog {
    pub fn create(path: &Path) -> std::io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            count: 0,
        })
    }

    /// Write one error segment as a line.
    pub fn write(&mut self, segment: &Segment) -> std::io::Result<()> {
        writeln!(
            self.writer,
            "{:<width$}{}",
            segment.input,
            segment.text,
            width = COLUMN_WIDTH
        )?;
        self.count += 1;
        Ok(())
    }

    /// Flush and return the number of lines written.
    pub fn finish(mut self) -> std::io::Result<usize> {
        self.writer.flush()?;
        Ok(self.count)
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

/// Writes rendered line reports and forwards errors to the log.
pub struct Reporter<W: Write> {
    out: W,
    palette: Palette,
    log: Option<ErrorLog>,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, palette: Palette) -> Self {
        Self {
            out,
            palette,
            log: None,
        }
    }

    pub fn with_log(mut self, log: ErrorLog) -> Self {
        self.log = Some(log);
        self
    }

    pub fn emit(&mut self, report: &LineReport) -> std::io::Result<()> {
        let input_color = if report.has_errors() {
            self.palette.error
        } else {
            self.palette.input
        };

        for segment in segments(report) {
            let color = match segment.kind {
                SegmentKind::Plain => "",
                SegmentKind::Error => self.palette.error,
                SegmentKind::Debug => self.palette.debug,
            };
            write!(
                self.out,
                "\n{input_color}{:<width$}{color}{}",
                segment.input,
                segment.text,
                width = COLUMN_WIDTH
            )?;

            if segment.kind == SegmentKind::Error {
                if let Some(log) = self.log.as_mut() {
                    log.write(&segment)?;
                }
            }
        }
        Ok(())
    }

    /// Reset terminal formatting, flush everything and hand back the output.
    pub fn finish(mut self) -> std::io::Result<(W, usize)> {
        writeln!(self.out, "{}", self.palette.reset)?;
        self.out.flush()?;
        let logged = match self.log {
            Some(log) => log.finish()?,
            None => 0,
        };
        Ok((self.out, logged))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TableConfig;
    use crate::session::Session;

    fn session() -> Session {
        Session::new(
            TableConfig::builder()
                .philosophers(2)
                .time_to_die(100)
                .time_to_eat(10)
                .time_to_sleep(10)
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn quiet_line_renders_one_empty_segment() {
        let mut s = session();
        let report = s.process_line("0   1 has taken a fork");
        let segs = segments(&report);
        assert_eq!(
            segs,
            vec![Segment {
                input: "0 1 has taken a fork".into(),
                kind: SegmentKind::Plain,
                text: String::new(),
            }]
        );
    }

    #[test]
    fn only_first_segment_carries_input() {
        let mut s = session();
        let report = s.process_line("0 1 is eating");
        let segs = segments(&report);
        assert!(segs.len() > 1);
        assert_eq!(segs[0].input, "0 1 is eating");
        assert_eq!(segs[0].text, ". ERROR: INVALID TRANSITION");
        assert!(segs[1..].iter().all(|s| s.input.is_empty()));
    }

    #[test]
    fn plain_rendering() {
        let mut s = session();
        let report = s.process_line("garbage");
        let mut reporter = Reporter::new(Vec::new(), Palette::plain());
        reporter.emit(&report).unwrap();
        let (out, logged) = reporter.finish().unwrap();
        assert_eq!(logged, 0);
        let out = String::from_utf8(out).unwrap();
        assert_eq!(out, format!("\n{:<36}. Unexpected input\n", "garbage"));
    }
}

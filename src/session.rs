//! Session driver core: parse, evaluate, then update, once per line.

use crate::config::TableConfig;
use crate::diagnostic::{Diagnostic, Severity};
use crate::error::RecordError;
use crate::record::{normalize, parse_record, Record};
use crate::rules::RuleSet;
use crate::state::TableState;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Error text shown for a line that is not a record.
pub const UNEXPECTED_INPUT: &str = "Unexpected input";

/// Everything learned from one input line.
#[derive(Debug, Clone)]
pub struct LineReport {
    /// The input line, single-spaced.
    pub line: String,

    /// Parse outcome.
    pub record: Result<Record, RecordError>,

    /// Surfaced diagnostics in rule order; debug ones only in debug mode.
    pub diagnostics: Vec<Diagnostic>,
}

impl LineReport {
    /// Error lines: "Unexpected input" for a malformed line, otherwise the
    /// lines of every error diagnostic.
    pub fn error_lines(&self) -> Vec<String> {
        if self.record.is_err() {
            return vec![UNEXPECTED_INPUT.to_string()];
        }
        self.lines_of(Severity::Error)
    }

    pub fn debug_lines(&self) -> Vec<String> {
        self.lines_of(Severity::Debug)
    }

    pub fn has_errors(&self) -> bool {
        self.record.is_err() || self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Names of the rules that reported an error.
    pub fn violated_rules(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.diagnostics
            .iter()
            .filter(|d| d.is_error())
            .map(|d| d.rule)
    }

    fn lines_of(&self, severity: Severity) -> Vec<String> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .flat_map(|d| d.lines())
            .collect()
    }
}

/// Counters for a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub lines: usize,
    pub malformed: usize,
    /// Lines with at least one error.
    pub flagged: usize,
    pub errors_by_rule: BTreeMap<&'static str, usize>,
}

impl SessionSummary {
    pub fn errors(&self) -> usize {
        self.errors_by_rule.values().sum()
    }
}

/// One validation run over a record stream.
#[derive(Debug)]
pub struct Session {
    state: TableState,
    rules: RuleSet,
    summary: SessionSummary,
}

impl Session {
    /// A session with the standard rules.
    pub fn new(config: TableConfig) -> Self {
        Self::with_rules(config, RuleSet::standard())
    }

    pub fn with_rules(config: TableConfig, rules: RuleSet) -> Self {
        info!(
            philosophers = config.philosophers,
            time_to_die = config.time_to_die,
            time_to_eat = config.time_to_eat,
            time_to_sleep = config.time_to_sleep,
            meals_required = ?config.meals_required,
            rules = rules.len(),
            "Starting session"
        );
        Self {
            state: TableState::new(config),
            rules,
            summary: SessionSummary::default(),
        }
    }

    pub fn state(&self) -> &TableState {
        &self.state
    }

    pub fn config(&self) -> &TableConfig {
        self.state.config()
    }

    pub fn summary(&self) -> &SessionSummary {
        &self.summary
    }

    /// Process one raw input line.
    ///
    /// Rules see the state before the record; the record is applied
    /// afterwards regardless of what they found. A malformed line skips
    /// both steps.
    pub fn process_line(&mut self, line: &str) -> LineReport {
        self.summary.lines += 1;
        let normalized = normalize(line);

        let record = match parse_record(line) {
            Ok(record) => record,
            Err(e) => {
                warn!(line = %normalized, error = %e, "Unexpected input");
                self.summary.malformed += 1;
                self.summary.flagged += 1;
                return LineReport {
                    line: normalized,
                    record: Err(e),
                    diagnostics: Vec::new(),
                };
            }
        };

        let mut diagnostics = self.rules.evaluate(&self.state, &record);
        self.state.apply(&record);

        for diagnostic in diagnostics.iter().filter(|d| d.is_error()) {
            *self.summary.errors_by_rule.entry(diagnostic.rule).or_default() += 1;
        }
        if diagnostics.iter().any(Diagnostic::is_error) {
            self.summary.flagged += 1;
        }

        debug!(
            timestamp = record.timestamp,
            philosopher = record.philosopher,
            diagnostics = diagnostics.len(),
            "Record evaluated"
        );

        if !self.config().debug {
            diagnostics.retain(Diagnostic::is_error);
        }

        LineReport {
            line: normalized,
            record: Ok(record),
            diagnostics,
        }
    }

    /// Process every line of a trace held in memory.
    pub fn process_trace(&mut self, trace: &str) -> Vec<LineReport> {
        trace.lines().map(|line| self.process_line(line)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(debug: bool) -> Session {
        Session::new(
            TableConfig::builder()
                .philosophers(2)
                .time_to_die(100)
                .time_to_eat(10)
                .time_to_sleep(10)
                .debug(debug)
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn malformed_line_does_not_touch_state() {
        let mut s = session(false);
        let report = s.process_line("hello world");
        assert!(report.record.is_err());
        assert_eq!(report.error_lines(), vec![UNEXPECTED_INPUT.to_string()]);
        assert!(s.state().philosophers().next().is_none());
        assert_eq!(s.summary().malformed, 1);
        assert_eq!(s.summary().lines, 1);
    }

    #[test]
    fn debug_diagnostics_are_filtered() {
        let mut quiet = session(false);
        let report = quiet.process_line("0 1 has taken a fork");
        assert!(report.diagnostics.is_empty());
        assert!(!report.has_errors());

        let mut loud = session(true);
        let report = loud.process_line("0 1 has taken a fork");
        assert!(!report.diagnostics.is_empty());
        assert!(report.diagnostics.iter().all(|d| !d.is_error()));
        assert!(report.debug_lines().contains(&"2 forks available".to_string()));
    }

    #[test]
    fn state_updates_even_when_flagged() {
        let mut s = session(false);
        let report = s.process_line("0 1 is eating");
        assert!(report.has_errors());
        assert_eq!(
            s.state().philosopher(1).unwrap().last_action().unwrap().raw,
            "0 1 is eating"
        );
        assert_eq!(s.summary().errors_by_rule.get("valid_transition"), Some(&1));
        assert_eq!(s.summary().flagged, 1);
    }
}

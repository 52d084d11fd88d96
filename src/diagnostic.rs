//! Diagnostics produced by the rule engine.

use crate::record::Record;
use serde::Serialize;
use std::fmt;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational; surfaced only in debug mode and never logged.
    Debug,
    /// An invariant violation; always surfaced and logged.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Debug => f.write_str("debug"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// A prior record cited to justify a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Evidence {
    pub record: Record,
    /// Time between the cited record and the record being checked.
    pub elapsed_ms: i64,
}

impl fmt::Display for Evidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} ms ago)", self.record.raw, self.elapsed_ms)
    }
}

/// Outcome of one rule for one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub rule: &'static str,
    pub severity: Severity,
    pub messages: Vec<String>,
    /// Oldest first, without duplicates.
    pub evidence: Vec<Evidence>,
}

impl Diagnostic {
    pub fn error(rule: &'static str, messages: Vec<String>) -> Self {
        Self::new(rule, Severity::Error, messages)
    }

    pub fn debug(rule: &'static str, messages: Vec<String>) -> Self {
        Self::new(rule, Severity::Debug, messages)
    }

    fn new(rule: &'static str, severity: Severity, messages: Vec<String>) -> Self {
        Self {
            rule,
            severity,
            messages,
            evidence: Vec::new(),
        }
    }

    /// Cite prior records, measured against the record being checked.
    ///
    /// Missing citations are skipped.
    pub fn citing<'a>(
        mut self,
        current: &Record,
        records: impl IntoIterator<Item = Option<&'a Record>>,
    ) -> Self {
        self.evidence.extend(records.into_iter().flatten().map(|r| Evidence {
            record: r.clone(),
            elapsed_ms: current.timestamp.saturating_sub(r.timestamp),
        }));
        self.evidence.sort_by(|a, b| {
            a.record
                .timestamp
                .cmp(&b.record.timestamp)
                .then_with(|| a.record.raw.cmp(&b.record.raw))
        });
        self.evidence.dedup();
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Message lines followed by one line per citation.
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.messages
            .iter()
            .cloned()
            .chain(self.evidence.iter().map(Evidence::to_string))
    }
}

//! Record parser: one trace line into a structured [`Record`].
//!
//! Expected line shape: `<timestamp> <philosopher> <action description>`.

use crate::error::RecordError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The actions a philosopher can announce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Thinking,
    Eating,
    Sleeping,
    TookFork,
    Died,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Thinking,
        Action::Eating,
        Action::Sleeping,
        Action::TookFork,
        Action::Died,
    ];

    /// The phrase a simulator prints for this action.
    pub fn phrase(self) -> &'static str {
        match self {
            Action::Thinking => "is thinking",
            Action::Eating => "is eating",
            Action::Sleeping => "is sleeping",
            Action::TookFork => "has taken a fork",
            Action::Died => "died",
        }
    }

    /// Classify a whitespace-normalized description.
    pub fn from_phrase(description: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|action| action.phrase() == description)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.phrase())
    }
}

/// One parsed trace line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    /// Milliseconds since the simulation started.
    pub timestamp: i64,

    /// Philosopher id as printed; not necessarily a valid seat.
    pub philosopher: i64,

    /// Recognized action, `None` for free text.
    pub action: Option<Action>,

    /// Everything after the two leading integers, single-spaced.
    pub description: String,

    /// The whole line, trimmed and single-spaced.
    pub raw: String,
}

impl Record {
    /// Build a record for a recognized action.
    pub fn new(timestamp: i64, philosopher: i64, action: Action) -> Self {
        let description = action.phrase().to_string();
        let raw = format!("{timestamp} {philosopher} {description}");
        Self {
            timestamp,
            philosopher,
            action: Some(action),
            description,
            raw,
        }
    }

    pub fn is(&self, action: Action) -> bool {
        self.action == Some(action)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Collapse runs of whitespace into single spaces and trim the ends.
pub fn normalize(line: &str) -> String {
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse a raw trace line.
pub fn parse_record(line: &str) -> Result<Record, RecordError> {
    let parts: Vec<&str> = line.split_whitespace().collect();

    let (timestamp, philosopher, tail) = match parts.as_slice() {
        [] => return Err(RecordError::Empty),
        [_] => return Err(RecordError::MissingField { field: "philosopher" }),
        [timestamp, philosopher, tail @ ..] => (*timestamp, *philosopher, tail),
    };

    let timestamp = parse_field("timestamp", timestamp)?;
    let philosopher = parse_field("philosopher", philosopher)?;
    let description = tail.join(" ");

    Ok(Record {
        timestamp,
        philosopher,
        action: Action::from_phrase(&description),
        description,
        raw: parts.join(" "),
    })
}

fn parse_field(field: &'static str, value: &str) -> Result<i64, RecordError> {
    value.parse().map_err(|_| RecordError::NotInteger {
        field,
        value: value.to_string(),
    })
}

impl std::str::FromStr for Record {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_record(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_recognized_actions() {
        for action in Action::ALL {
            let record = parse_record(&format!("200 3 {}", action.phrase())).unwrap();
            assert_eq!(record.timestamp, 200);
            assert_eq!(record.philosopher, 3);
            assert_eq!(record.action, Some(action));
        }
    }

    #[test]
    fn normalizes_whitespace() {
        let record = parse_record("  12\t 4   has   taken a  fork \n").unwrap();
        assert_eq!(record.raw, "12 4 has taken a fork");
        assert_eq!(record.description, "has taken a fork");
        assert!(record.is(Action::TookFork));
    }

    #[test]
    fn keeps_free_text() {
        let record = parse_record("5 1 is juggling").unwrap();
        assert_eq!(record.action, None);
        assert_eq!(record.description, "is juggling");

        let record = parse_record("5 1").unwrap();
        assert_eq!(record.action, None);
        assert_eq!(record.description, "");
    }

    #[test]
    fn phrase_must_match_whole_tail() {
        assert_eq!(parse_record("5 1 died twice").unwrap().action, None);
        assert_eq!(parse_record("5 1 is eating").unwrap().action, Some(Action::Eating));
    }

    #[test]
    fn negative_ids_parse() {
        let record = parse_record("7 -2 is eating").unwrap();
        assert_eq!(record.philosopher, -2);
    }

    #[test]
    fn malformed_lines() {
        assert_eq!(parse_record("   "), Err(RecordError::Empty));
        assert_eq!(
            parse_record("42"),
            Err(RecordError::MissingField { field: "philosopher" })
        );
        assert_eq!(
            parse_record("abc 1 is eating"),
            Err(RecordError::NotInteger {
                field: "timestamp",
                value: "abc".into()
            })
        );
        assert_eq!(
            parse_record("10 x is eating"),
            Err(RecordError::NotInteger {
                field: "philosopher",
                value: "x".into()
            })
        );
    }

    #[test]
    fn constructed_record_matches_parsed() {
        assert_eq!(
            Record::new(10, 2, Action::Sleeping),
            parse_record("10 2 is sleeping").unwrap()
        );
    }
}

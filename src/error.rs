//! Typed errors for philo-snitch.
//!
//! Invariant violations found in a trace are not errors: they are reported
//! as [`Diagnostic`](crate::Diagnostic)s. The types here cover the
//! conditions that stop a line (malformed records) or the whole run
//! (bad configuration, I/O failures).

use thiserror::Error;

/// Top-level error type for philo-snitch operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A trace line could not be interpreted.
    #[error("Record error: {0}")]
    Record(#[from] RecordError),

    /// Invalid table configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Incomplete builder.
    #[error("Builder error: {0}")]
    Builder(#[from] BuilderError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[cfg(feature = "ndjson")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A trace line that does not start with `<timestamp> <philosopher>`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RecordError {
    /// Blank line.
    #[error("empty record")]
    Empty,

    /// Fewer than two whitespace-separated tokens.
    #[error("missing {field} field")]
    MissingField { field: &'static str },

    /// One of the leading tokens is not an integer.
    #[error("{field} must be an integer, got '{value}'")]
    NotInteger { field: &'static str, value: String },
}

/// Fatal configuration problems, detected before any record is read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The `bonus` flag was given.
    #[error("bonus mode not implemented")]
    BonusNotImplemented,

    /// A positional argument is not an integer.
    #[error("arguments must be integers, got '{0}'")]
    NotInteger(String),

    /// Neither 4 nor 5 positional arguments.
    #[error("4 or 5 integers must be specified, got {0}")]
    WrongArgumentCount(usize),

    /// The table needs at least one seat.
    #[error("number of philosophers must be at least 1, got {0}")]
    NoPhilosophers(i64),
}

/// A builder was finished without one of its required fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum BuilderError {
    #[error("{builder}: missing required field '{field}'")]
    MissingRequiredField {
        builder: &'static str,
        field: &'static str,
    },
}

/// Result type alias using philo-snitch's Error.
pub type SnitchResult<T> = std::result::Result<T, Error>;

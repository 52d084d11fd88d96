//! philo-snitch: an online test oracle for dining-philosophers simulations.
//!
//! A simulator prints one line per action (`<ms> <id> is eating`, ...).
//! philo-snitch reads that stream and checks every record against liveness,
//! safety and state-machine invariants as it arrives. It never drives the
//! simulation; it only audits what was printed.
//!
//! Per line:
//!
//! ```text
//! raw line -> parse_record -> RuleSet::evaluate(state) -> TableState::apply
//!                                    |
//!                                    v
//!                           diagnostics -> Reporter
//! ```
//!
//! # Quick Start
//!
//! ```
//! use philo_snitch::{Session, TableConfig};
//!
//! let config = TableConfig::from_args(&["2", "100", "20", "20"])?;
//! let mut session = Session::new(config);
//!
//! for line in ["0 1 has taken a fork", "0 1 has taken a fork", "0 1 is eating"] {
//!     assert!(!session.process_line(line).has_errors());
//! }
//!
//! // A nap after only 5 ms of eating is too short.
//! let report = session.process_line("5 1 is sleeping");
//! assert!(report.violated_rules().any(|rule| rule == "eating_duration"));
//! # Ok::<(), philo_snitch::Error>(())
//! ```

pub mod config;
pub mod diagnostic;
#[cfg(feature = "ndjson")]
pub mod emitter;
pub mod error;
pub mod record;
pub mod report;
pub mod rules;
pub mod session;
pub mod state;

mod builder;

// Re-export core types for convenience
pub use config::{TableConfig, TableConfigBuilder};
pub use diagnostic::{Diagnostic, Evidence, Severity};
#[cfg(feature = "ndjson")]
pub use emitter::DiagnosticEmitter;
pub use error::{BuilderError, ConfigError, Error, RecordError, SnitchResult};
pub use record::{parse_record, Action, Record};
pub use report::{ErrorLog, Palette, Reporter};
pub use rules::{Rule, RuleContext, RuleSet};
pub use session::{LineReport, Session, SessionSummary};
pub use state::{PhilosopherState, TableState};

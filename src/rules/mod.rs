//! Rule engine: independent invariant checks over the record stream.
//!
//! Every rule sees the [`TableState`] as it was *before* the record under
//! test is applied, and returns at most one [`Diagnostic`]. All rules run for
//! every record; one record may violate several invariants at once.
//!
//! # Example
//!
//! ```
//! use philo_snitch::{parse_record, RuleSet, TableConfig, TableState};
//!
//! let config = TableConfig::from_args(&["2", "100", "20", "20"]).unwrap();
//! let state = TableState::new(config);
//! let rules = RuleSet::standard();
//!
//! let record = parse_record("0 3 has taken a fork").unwrap();
//! let errors: Vec<_> = rules
//!     .evaluate(&state, &record)
//!     .into_iter()
//!     .filter(|d| d.is_error())
//!     .map(|d| d.rule)
//!     .collect();
//! assert!(errors.contains(&"invitation"));
//! ```

mod forks;
mod lifecycle;
mod timing;

pub use forks::ForkContention;
pub use lifecycle::{Completion, Invitation, ValidTransition};
pub use timing::{DeathSilence, EatingDuration, PrematureDeath, SleepDuration, StrangeSmell, TimeTravel};

use crate::config::TableConfig;
use crate::diagnostic::Diagnostic;
use crate::record::Record;
use crate::state::TableState;
use tracing::trace;

/// Everything a rule may look at.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub state: &'a TableState,
    pub config: &'a TableConfig,
    pub record: &'a Record,
}

/// A single invariant check.
pub trait Rule {
    /// Stable identifier, used in logs and exported diagnostics.
    fn name(&self) -> &'static str;

    /// Evaluate `ctx.record` against the pre-update state.
    fn check(&self, ctx: &RuleContext<'_>) -> Option<Diagnostic>;
}

/// An ordered list of rules.
#[derive(Default)]
pub struct RuleSet {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleSet {
    /// No rules at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The ten standard checks.
    pub fn standard() -> Self {
        let mut set = Self::empty();
        set.push(TimeTravel);
        set.push(DeathSilence);
        set.push(StrangeSmell);
        set.push(EatingDuration);
        set.push(SleepDuration);
        set.push(ForkContention);
        set.push(ValidTransition);
        set.push(Completion);
        set.push(PrematureDeath);
        set.push(Invitation);
        set
    }

    pub fn push(&mut self, rule: impl Rule + 'static) {
        self.rules.push(Box::new(rule));
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|rule| rule.name())
    }

    /// Run every rule, in order, collecting all diagnostics.
    pub fn evaluate(&self, state: &TableState, record: &Record) -> Vec<Diagnostic> {
        let ctx = RuleContext {
            state,
            config: state.config(),
            record,
        };

        self.rules
            .iter()
            .filter_map(|rule| {
                let diagnostic = rule.check(&ctx)?;
                trace!(
                    rule = rule.name(),
                    severity = %diagnostic.severity,
                    timestamp = record.timestamp,
                    philosopher = record.philosopher,
                    "rule fired"
                );
                Some(diagnostic)
            })
            .collect()
    }
}

impl std::fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

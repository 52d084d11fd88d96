//! Table configuration: the simulation parameters a trace is audited against.

use crate::builder::impl_builder;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Grace period, in milliseconds, before a starving philosopher is reported.
pub const DEFAULT_GRACE_MS: i64 = 10;

/// Parameters of the simulated table.
///
/// Mirrors the simulator's own command line:
/// `number_of_philosophers time_to_die time_to_eat time_to_sleep [meals_required]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct TableConfig {
    /// Number of seats; valid philosopher ids are `1..=philosophers`.
    pub philosophers: i64,

    /// Milliseconds a philosopher survives after starting a meal.
    pub time_to_die: i64,

    /// Minimum duration of a meal.
    pub time_to_eat: i64,

    /// Minimum duration of a nap.
    pub time_to_sleep: i64,

    /// Emit debug-level diagnostics.
    pub debug: bool,

    /// Tolerance applied before reporting a philosopher that should be dead.
    pub grace_ms: i64,

    /// Meals each philosopher must finish; `None` disables completion tracking.
    pub meals_required: Option<i64>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            philosophers: 0,
            time_to_die: 0,
            time_to_eat: 0,
            time_to_sleep: 0,
            debug: false,
            grace_ms: DEFAULT_GRACE_MS,
            meals_required: None,
        }
    }
}

impl_builder! {
    /// Builder for [`TableConfig`].
    TableConfig => TableConfigBuilder {
        philosophers: i64,
        time_to_die: i64,
        time_to_eat: i64,
        time_to_sleep: i64,
    } defaults {
        debug: bool = false,
        grace_ms: i64 = DEFAULT_GRACE_MS,
    } maybe {
        meals_required: i64,
    }
}

impl TableConfig {
    /// Interpret simulator-style arguments.
    ///
    /// Any combination of case-insensitive `debug` and `bonus` words may
    /// precede the 4 or 5 integers. `bonus` is rejected outright.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Result<Self, ConfigError> {
        let mut debug = false;
        let mut bonus = false;
        let mut rest = args;

        while let Some((first, tail)) = rest.split_first() {
            let word = first.as_ref().trim();
            if word.eq_ignore_ascii_case("debug") {
                debug = true;
            } else if word.eq_ignore_ascii_case("bonus") {
                bonus = true;
            } else {
                break;
            }
            rest = tail;
        }

        if bonus {
            return Err(ConfigError::BonusNotImplemented);
        }

        let numbers = rest
            .iter()
            .map(|arg| {
                let arg = arg.as_ref().trim();
                arg.parse::<i64>()
                    .map_err(|_| ConfigError::NotInteger(arg.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let (philosophers, time_to_die, time_to_eat, time_to_sleep, meals_required) =
            match numbers.as_slice() {
                &[n, die, eat, sleep] => (n, die, eat, sleep, None),
                &[n, die, eat, sleep, meals] => (n, die, eat, sleep, Some(meals)),
                other => return Err(ConfigError::WrongArgumentCount(other.len())),
            };

        let config = Self {
            philosophers,
            time_to_die,
            time_to_eat,
            time_to_sleep,
            debug,
            meals_required,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject tables the rule engine cannot reason about.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.philosophers < 1 {
            return Err(ConfigError::NoPhilosophers(self.philosophers));
        }
        Ok(())
    }

    /// Whether `id` names a seat at this table.
    pub fn is_seated(&self, id: i64) -> bool {
        (1..=self.philosophers).contains(&id)
    }
}

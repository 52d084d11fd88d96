//! World state derived from the records seen so far.
//!
//! Rules only read this state; [`TableState::apply`] is the single writer and
//! runs after every parsed record, whether or not a rule flagged it.

use crate::config::TableConfig;
use crate::record::{Action, Record};
use std::collections::BTreeMap;

/// A philosopher has two hands.
pub const MAX_FORKS: u8 = 2;

/// What is known about one philosopher.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhilosopherState {
    last_thinking: Option<Record>,
    last_eating: Option<Record>,
    last_sleeping: Option<Record>,
    last_took_fork: Option<Record>,
    last_died: Option<Record>,
    last_action: Option<Record>,

    /// Forks currently held, never more than [`MAX_FORKS`].
    pub forks: u8,

    /// Meals finished, counted when a nap starts.
    pub meals: u32,
}

impl PhilosopherState {
    /// Most recent record of the given action.
    pub fn last(&self, action: Action) -> Option<&Record> {
        match action {
            Action::Thinking => self.last_thinking.as_ref(),
            Action::Eating => self.last_eating.as_ref(),
            Action::Sleeping => self.last_sleeping.as_ref(),
            Action::TookFork => self.last_took_fork.as_ref(),
            Action::Died => self.last_died.as_ref(),
        }
    }

    /// Most recent record of any recognized action.
    pub fn last_action(&self) -> Option<&Record> {
        self.last_action.as_ref()
    }

    /// Timestamp of the last meal; the simulation start if none yet.
    pub fn last_meal_at(&self) -> i64 {
        self.last_eating.as_ref().map_or(0, |r| r.timestamp)
    }

    fn slot(&mut self, action: Action) -> &mut Option<Record> {
        match action {
            Action::Thinking => &mut self.last_thinking,
            Action::Eating => &mut self.last_eating,
            Action::Sleeping => &mut self.last_sleeping,
            Action::TookFork => &mut self.last_took_fork,
            Action::Died => &mut self.last_died,
        }
    }

    fn apply(&mut self, action: Action, record: &Record) {
        *self.slot(action) = Some(record.clone());
        self.last_action = Some(record.clone());

        match action {
            Action::TookFork => self.forks = (self.forks + 1).min(MAX_FORKS),
            Action::Sleeping => {
                self.forks = 0;
                self.meals = self.meals.saturating_add(1);
            }
            Action::Eating | Action::Died => self.forks = 0,
            Action::Thinking => {}
        }
    }
}

/// Session-wide state for one run of the validator.
#[derive(Debug, Clone)]
pub struct TableState {
    config: TableConfig,
    last_record: Option<Record>,
    last_update: i64,
    last_death: Option<Record>,
    philosophers: BTreeMap<i64, PhilosopherState>,
}

impl TableState {
    pub fn new(config: TableConfig) -> Self {
        Self {
            config,
            last_record: None,
            last_update: 0,
            last_death: None,
            philosophers: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Most recent recognized record, across all philosophers.
    pub fn last_record(&self) -> Option<&Record> {
        self.last_record.as_ref()
    }

    /// Largest timestamp accepted so far.
    pub fn last_update(&self) -> i64 {
        self.last_update
    }

    pub fn last_death(&self) -> Option<&Record> {
        self.last_death.as_ref()
    }

    /// State of a philosopher that has been seen at least once.
    pub fn philosopher(&self, id: i64) -> Option<&PhilosopherState> {
        self.philosophers.get(&id)
    }

    /// All philosophers seen so far, ordered by id.
    pub fn philosophers(&self) -> impl Iterator<Item = (i64, &PhilosopherState)> {
        self.philosophers.iter().map(|(id, state)| (*id, state))
    }

    /// Fold a record into the state.
    ///
    /// The philosopher entry is created on first sighting, even for free
    /// text; everything else only moves on recognized actions.
    pub fn apply(&mut self, record: &Record) {
        let philosopher = self.philosophers.entry(record.philosopher).or_default();

        let Some(action) = record.action else {
            return;
        };

        philosopher.apply(action, record);
        self.last_record = Some(record.clone());
        self.last_update = self.last_update.max(record.timestamp);

        if action == Action::Died {
            self.last_death = Some(record.clone());
        }
    }
}

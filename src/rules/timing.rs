//! Clock-driven checks: ordering, liveness and action durations.

use super::{Rule, RuleContext};
use crate::diagnostic::Diagnostic;
use crate::record::Action;

/// A record older than one already accepted.
pub struct TimeTravel;

impl Rule for TimeTravel {
    fn name(&self) -> &'static str {
        "time_travel"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Option<Diagnostic> {
        let record = ctx.record;
        let travel = ctx.state.last_update().saturating_sub(record.timestamp);
        if travel <= 0 {
            return None;
        }

        Some(
            Diagnostic::error(
                self.name(),
                vec![
                    "ERROR: TIME TRAVEL".into(),
                    format!(
                        "{} traveled at least {travel} milliseconds backwards in time.",
                        record.philosopher
                    ),
                ],
            )
            .citing(record, [ctx.state.last_record()]),
        )
    }
}

/// Nobody speaks after a death.
pub struct DeathSilence;

impl Rule for DeathSilence {
    fn name(&self) -> &'static str {
        "death_silence"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Option<Diagnostic> {
        let death = ctx.state.last_death()?;

        Some(
            Diagnostic::error(
                self.name(),
                vec![
                    "ERROR: DEAD PHILOSOPHER.".into(),
                    format!("Let's take a minute of silence for {}.", death.philosopher),
                ],
            )
            .citing(ctx.record, [Some(death)]),
        )
    }
}

/// A philosopher that should have starved but never reported it.
///
/// The record's timestamp acts as a clock tick for the whole table. Seats
/// are scanned in id order and the first stale one is reported.
pub struct StrangeSmell;

impl Rule for StrangeSmell {
    fn name(&self) -> &'static str {
        "strange_smell"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Option<Diagnostic> {
        let record = ctx.record;
        let config = ctx.config;
        let time_to_die = config.time_to_die;

        for id in 1..config.philosophers {
            let Some(philosopher) = ctx.state.philosopher(id) else {
                let smell = record.timestamp.saturating_sub(time_to_die);
                if smell > config.grace_ms {
                    return Some(Diagnostic::error(
                        self.name(),
                        vec![
                            "ERROR: STRANGE SMELL.".into(),
                            format!("{id} should have died {smell} ms ago."),
                            format!("{id} never showed up."),
                        ],
                    ));
                }
                continue;
            };

            let smell = record
                .timestamp
                .saturating_sub(philosopher.last_meal_at())
                .saturating_sub(time_to_die);
            if smell > config.grace_ms {
                return Some(
                    Diagnostic::error(
                        self.name(),
                        vec![
                            "ERROR: STRANGE SMELL.".into(),
                            format!("{id} should have died {smell} ms ago."),
                            format!("Time to die: {time_to_die}"),
                        ],
                    )
                    .citing(record, [philosopher.last(Action::Eating)]),
                );
            }
        }

        let last_meal = ctx
            .state
            .philosopher(record.philosopher)
            .map_or(0, |p| p.last_meal_at());
        let remaining = time_to_die.saturating_sub(record.timestamp.saturating_sub(last_meal));
        Some(Diagnostic::debug(
            self.name(),
            vec![format!("time to die: {remaining} ms")],
        ))
    }
}

/// A nap must not start before the meal lasted `time_to_eat`.
pub struct EatingDuration;

impl Rule for EatingDuration {
    fn name(&self) -> &'static str {
        "eating_duration"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Option<Diagnostic> {
        let record = ctx.record;
        if !record.is(Action::Sleeping) {
            return None;
        }

        // Without a meal on record, the meal is taken to start at t=0.
        let philosopher = ctx.state.philosopher(record.philosopher);
        let meal = philosopher.and_then(|p| p.last(Action::Eating));
        let eating = record
            .timestamp
            .saturating_sub(philosopher.map_or(0, |p| p.last_meal_at()));
        let time_to_eat = ctx.config.time_to_eat;
        let meals = philosopher.map_or(0, |p| p.meals);

        let diagnostic = if eating < time_to_eat {
            Diagnostic::error(
                self.name(),
                vec![
                    "ERROR: ATE TOO LITTLE.".into(),
                    format!("{} has been eating only {eating} ms.", record.philosopher),
                    format!("Time to eat: {time_to_eat}"),
                ],
            )
        } else {
            Diagnostic::debug(
                self.name(),
                vec![
                    format!("Has been eating {eating} ms."),
                    format!("{} ate {meals} times", record.philosopher),
                ],
            )
        };
        Some(diagnostic.citing(record, [meal]))
    }
}

/// Thinking must not start before the nap lasted `time_to_sleep`.
pub struct SleepDuration;

impl Rule for SleepDuration {
    fn name(&self) -> &'static str {
        "sleep_duration"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Option<Diagnostic> {
        let record = ctx.record;
        if !record.is(Action::Thinking) {
            return None;
        }

        // An opening `is thinking` has no nap to measure.
        let nap = ctx
            .state
            .philosopher(record.philosopher)?
            .last(Action::Sleeping)?;
        let sleeping = record.timestamp.saturating_sub(nap.timestamp);
        let time_to_sleep = ctx.config.time_to_sleep;

        let diagnostic = if sleeping < time_to_sleep {
            Diagnostic::error(
                self.name(),
                vec![
                    "ERROR: WOKE UP EARLY.".into(),
                    format!("{} has been sleeping only {sleeping} ms.", record.philosopher),
                    format!("Time to sleep: {time_to_sleep}"),
                ],
            )
        } else {
            Diagnostic::debug(self.name(), vec![format!("Has been sleeping {sleeping} ms.")])
        };
        Some(diagnostic.citing(record, [Some(nap)]))
    }
}

/// A death reported while the philosopher still had time left.
pub struct PrematureDeath;

impl Rule for PrematureDeath {
    fn name(&self) -> &'static str {
        "premature_death"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Option<Diagnostic> {
        let record = ctx.record;
        if !record.is(Action::Died) {
            return None;
        }

        let philosopher = ctx.state.philosopher(record.philosopher);
        let last_meal = philosopher.map_or(0, |p| p.last_meal_at());
        let remaining = ctx
            .config
            .time_to_die
            .saturating_sub(record.timestamp.saturating_sub(last_meal));
        if remaining <= 0 {
            return None;
        }

        Some(
            Diagnostic::error(
                self.name(),
                vec![
                    "ERROR: DIED PREMATURELY.".into(),
                    format!("{} still had {remaining} ms to live.", record.philosopher),
                ],
            )
            .citing(record, [philosopher.and_then(|p| p.last(Action::Eating))]),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TableConfig;
    use crate::record::{parse_record, Record};
    use crate::state::TableState;

    fn table(philosophers: i64) -> TableState {
        TableState::new(
            TableConfig::builder()
                .philosophers(philosophers)
                .time_to_die(100)
                .time_to_eat(30)
                .time_to_sleep(30)
                .build()
                .unwrap(),
        )
    }

    fn run(rule: &dyn Rule, state: &TableState, line: &str) -> Option<Diagnostic> {
        let record = parse_record(line).unwrap();
        rule.check(&RuleContext {
            state,
            config: state.config(),
            record: &record,
        })
    }

    fn feed(state: &mut TableState, lines: &[&str]) {
        for line in lines {
            state.apply(&parse_record(line).unwrap());
        }
    }

    #[test]
    fn time_travel_cites_last_record() {
        let mut state = table(2);
        feed(&mut state, &["50 1 has taken a fork"]);

        assert!(run(&TimeTravel, &state, "50 2 has taken a fork").is_none());

        let diag = run(&TimeTravel, &state, "40 2 has taken a fork").unwrap();
        assert!(diag.is_error());
        assert!(diag.messages[1].contains("at least 10 milliseconds"));
        assert_eq!(diag.evidence[0].record, Record::new(50, 1, Action::TookFork));
        assert_eq!(diag.evidence[0].elapsed_ms, -10);
    }

    #[test]
    fn death_silence_after_any_death() {
        let mut state = table(3);
        assert!(run(&DeathSilence, &state, "0 1 has taken a fork").is_none());

        feed(&mut state, &["120 2 died"]);
        let diag = run(&DeathSilence, &state, "130 1 is thinking").unwrap();
        assert!(diag.messages[1].contains("silence for 2"));
        assert_eq!(diag.evidence[0].elapsed_ms, 10);
    }

    #[test]
    fn strange_smell_for_stale_meal() {
        let mut state = table(2);
        feed(&mut state, &["0 1 is eating"]);

        let diag = run(&StrangeSmell, &state, "111 2 has taken a fork").unwrap();
        assert!(diag.is_error());
        assert_eq!(diag.messages[1], "1 should have died 11 ms ago.");
        assert_eq!(diag.evidence[0].record.raw, "0 1 is eating");
        assert_eq!(diag.evidence[0].elapsed_ms, 111);
    }

    #[test]
    fn strange_smell_within_grace_is_debug() {
        let mut state = table(2);
        feed(&mut state, &["0 1 is eating"]);

        let diag = run(&StrangeSmell, &state, "110 1 is sleeping").unwrap();
        assert!(!diag.is_error());
        assert_eq!(diag.messages, vec!["time to die: -10 ms".to_string()]);
    }

    #[test]
    fn strange_smell_for_absent_philosopher() {
        let state = table(3);
        let diag = run(&StrangeSmell, &state, "115 3 has taken a fork").unwrap();
        assert!(diag.is_error());
        assert_eq!(diag.messages[1], "1 should have died 15 ms ago.");
        assert!(diag.evidence.is_empty());
    }

    #[test]
    fn ate_too_little() {
        let mut state = table(2);
        feed(&mut state, &["0 1 is eating"]);

        let diag = run(&EatingDuration, &state, "20 1 is sleeping").unwrap();
        assert!(diag.is_error());
        assert!(diag.messages[1].contains("only 20 ms"));

        let diag = run(&EatingDuration, &state, "30 1 is sleeping").unwrap();
        assert!(!diag.is_error());
        assert_eq!(diag.messages[1], "1 ate 0 times");
    }

    #[test]
    fn eating_duration_without_a_meal_counts_from_start() {
        let state = table(2);
        let diag = run(&EatingDuration, &state, "20 1 is sleeping").unwrap();
        assert!(diag.is_error());
        assert!(diag.messages[1].contains("only 20 ms"));
        assert!(diag.evidence.is_empty());

        let diag = run(&EatingDuration, &state, "40 1 is sleeping").unwrap();
        assert!(!diag.is_error());
        assert_eq!(diag.messages[1], "1 ate 0 times");

        assert!(run(&EatingDuration, &state, "20 1 is eating").is_none());
    }

    #[test]
    fn sleep_duration_needs_a_nap() {
        let state = table(2);
        assert!(run(&SleepDuration, &state, "0 1 is thinking").is_none());
    }

    #[test]
    fn extreme_timestamps_saturate() {
        let mut state = table(2);
        feed(&mut state, &["9223372036854775807 1 is eating"]);

        let diag = run(&TimeTravel, &state, "-5 2 has taken a fork").unwrap();
        assert!(diag.messages[1].contains(&format!("at least {} milliseconds", i64::MAX)));
        assert_eq!(diag.evidence[0].elapsed_ms, i64::MIN);

        let diag = run(&EatingDuration, &state, "-9223372036854775808 1 is sleeping").unwrap();
        assert!(diag.messages[1].contains(&format!("only {} ms", i64::MIN)));

        let diag = run(&StrangeSmell, &state, "-9223372036854775808 2 is thinking").unwrap();
        assert!(!diag.is_error());
        assert!(run(&PrematureDeath, &state, "-9223372036854775808 1 died").is_some());
    }

    #[test]
    fn woke_up_early() {
        let mut state = table(2);
        feed(&mut state, &["100 1 is sleeping"]);

        let diag = run(&SleepDuration, &state, "120 1 is thinking").unwrap();
        assert!(diag.is_error());
        assert!(diag.messages[1].contains("only 20 ms"));
        assert!(!run(&SleepDuration, &state, "130 1 is thinking").unwrap().is_error());
    }

    #[test]
    fn premature_death() {
        let mut state = table(2);
        feed(&mut state, &["10 1 is eating"]);

        let diag = run(&PrematureDeath, &state, "60 1 died").unwrap();
        assert!(diag.messages[1].contains("still had 50 ms"));
        assert_eq!(diag.evidence[0].elapsed_ms, 50);

        assert!(run(&PrematureDeath, &state, "110 1 died").is_none());
        assert!(run(&PrematureDeath, &state, "60 1 is thinking").is_none());
    }
}

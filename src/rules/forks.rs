//! Fork contention: a shared fork cannot be in two hands at once.

use super::{Rule, RuleContext};
use crate::diagnostic::Diagnostic;
use crate::record::{Action, Record};
use crate::state::MAX_FORKS;

/// A fork taken when no fork could have been free.
///
/// From the taker, the table is walked outward in both directions until a
/// neighbour decides the fork on that side: sleeping or thinking frees it,
/// eating or holding two forks keeps it. Neighbours still collecting forks
/// (or dead) defer to the next seat. Forks already held by the taker are
/// subtracted from the free count. A taker outside the table has no
/// neighbours, so neither side is free.
pub struct ForkContention;

impl ForkContention {
    /// Walk one direction. Returns whether a fork is free on that side and
    /// whether the walk came back around to the taker.
    fn walk<'a>(
        ctx: &RuleContext<'a>,
        direction: i64,
        cited: &mut Vec<Option<&'a Record>>,
    ) -> (bool, bool) {
        let seats = ctx.config.philosophers;
        let taker = ctx.record.philosopher;
        if !ctx.config.is_seated(taker) {
            return (false, false);
        }

        let mut seat = taker;

        for _ in 0..seats {
            seat = (seat - 1 + direction).rem_euclid(seats) + 1;
            let neighbour = ctx.state.philosopher(seat);
            let last = neighbour.and_then(|p| p.last_action());
            cited.push(last);

            if seat == taker {
                return (false, true);
            }

            match last.and_then(|r| r.action).unwrap_or(Action::Sleeping) {
                Action::Sleeping | Action::Thinking => return (true, false),
                Action::Eating => return (false, false),
                _ if neighbour.is_some_and(|p| p.forks == MAX_FORKS) => return (false, false),
                _ => {}
            }
        }

        (false, false)
    }
}

impl Rule for ForkContention {
    fn name(&self) -> &'static str {
        "fork_contention"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Option<Diagnostic> {
        let record = ctx.record;
        if !record.is(Action::TookFork) {
            return None;
        }

        let mut cited = Vec::new();
        let mut free: i64 = 0;
        for direction in [1, -1] {
            let (available, wrapped) = Self::walk(ctx, direction, &mut cited);
            if wrapped {
                // Alone at the table: only the fork in front of the taker.
                free = 1;
            }
            free += i64::from(available);
        }

        let held = ctx
            .state
            .philosopher(record.philosopher)
            .map_or(0, |p| p.forks);
        free -= i64::from(held);

        let diagnostic = if free <= 0 {
            Diagnostic::error(
                self.name(),
                vec![
                    "ERROR: MAGIC FORK.".into(),
                    format!(
                        "{} picked up a fork while already having {held} forks",
                        record.philosopher
                    ),
                ],
            )
        } else {
            Diagnostic::debug(self.name(), vec![format!("{free} forks available")])
        };
        Some(diagnostic.citing(record, cited))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TableConfig;
    use crate::record::parse_record;
    use crate::state::TableState;

    fn table(philosophers: i64, lines: &[&str]) -> TableState {
        let mut state = TableState::new(
            TableConfig::builder()
                .philosophers(philosophers)
                .time_to_die(1000)
                .time_to_eat(10)
                .time_to_sleep(10)
                .build()
                .unwrap(),
        );
        for line in lines {
            state.apply(&parse_record(line).unwrap());
        }
        state
    }

    fn check(state: &TableState, line: &str) -> Diagnostic {
        let record = parse_record(line).unwrap();
        ForkContention
            .check(&RuleContext {
                state,
                config: state.config(),
                record: &record,
            })
            .unwrap()
    }

    #[test]
    fn untouched_table_has_two_forks() {
        let state = table(4, &[]);
        let diag = check(&state, "0 1 has taken a fork");
        assert!(!diag.is_error());
        assert_eq!(diag.messages, vec!["2 forks available".to_string()]);
    }

    #[test]
    fn eating_neighbours_block_both_forks() {
        let state = table(
            3,
            &[
                "0 2 has taken a fork",
                "0 2 has taken a fork",
                "0 2 is eating",
                "0 3 has taken a fork",
                "0 3 has taken a fork",
                "0 3 is eating",
            ],
        );
        let diag = check(&state, "1 1 has taken a fork");
        assert!(diag.is_error());
        assert_eq!(diag.messages[0], "ERROR: MAGIC FORK.");
        assert_eq!(diag.evidence.len(), 2);
    }

    #[test]
    fn neighbour_with_two_forks_blocks() {
        let state = table(
            5,
            &["0 2 has taken a fork", "0 2 has taken a fork"],
        );
        let diag = check(&state, "1 3 has taken a fork");
        assert!(!diag.is_error());
        assert_eq!(diag.messages[0], "1 forks available");
    }

    #[test]
    fn held_forks_are_subtracted() {
        let state = table(4, &["0 1 has taken a fork", "0 1 has taken a fork"]);
        let diag = check(&state, "1 1 has taken a fork");
        assert!(diag.is_error());
        assert!(diag.messages[1].contains("already having 2 forks"));
    }

    #[test]
    fn lonely_philosopher_has_one_fork() {
        let state = table(1, &[]);
        let diag = check(&state, "0 1 has taken a fork");
        assert_eq!(diag.messages, vec!["1 forks available".to_string()]);

        let state = table(1, &["0 1 has taken a fork"]);
        assert!(check(&state, "1 1 has taken a fork").is_error());
    }

    #[test]
    fn uninvited_taker_finds_no_fork() {
        let state = table(2, &["0 1 has taken a fork", "0 2 has taken a fork"]);
        let diag = check(&state, "1 7 has taken a fork");
        assert!(diag.is_error());
        assert!(diag.evidence.is_empty());

        let diag = check(&state, "1 -9223372036854775808 has taken a fork");
        assert!(diag.is_error());
        assert_eq!(diag.messages[0], "ERROR: MAGIC FORK.");

        let diag = check(&state, "1 9223372036854775807 has taken a fork");
        assert!(diag.is_error());
    }
}

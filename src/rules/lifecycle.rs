//! Per-philosopher life cycle and table-wide membership checks.

use super::{Rule, RuleContext};
use crate::diagnostic::Diagnostic;
use crate::record::Action;
use crate::state::{PhilosopherState, MAX_FORKS};

/// Actions allowed after the philosopher's previous one.
///
/// ```text
/// sleeping -> thinking | died
/// thinking -> took fork | died
/// took fork -> took fork (fewer than 2 held) | eating (2 held) | died
/// eating   -> sleeping | died
/// ```
///
/// A philosopher that never acted is implicitly thinking, and may also
/// announce that initial thinking.
pub fn allowed_after(philosopher: Option<&PhilosopherState>) -> &'static [Action] {
    let last = philosopher
        .and_then(|p| p.last_action())
        .and_then(|r| r.action);
    let forks = philosopher.map_or(0, |p| p.forks);

    match last {
        None => &[Action::Thinking, Action::TookFork, Action::Died],
        Some(Action::Sleeping) => &[Action::Thinking, Action::Died],
        Some(Action::Thinking) => &[Action::TookFork, Action::Died],
        Some(Action::TookFork) if forks < MAX_FORKS => &[Action::TookFork, Action::Died],
        Some(Action::TookFork) => &[Action::Eating, Action::Died],
        Some(Action::Eating) => &[Action::Sleeping, Action::Died],
        Some(Action::Died) => &[],
    }
}

fn describe(actions: &[Action]) -> String {
    if actions.is_empty() {
        return "Expected nothing.".into();
    }
    let quoted: Vec<String> = actions.iter().map(|a| format!("\"{a}\"")).collect();
    format!("Expected {}.", quoted.join(" or "))
}

/// Actions must follow the philosopher state machine.
pub struct ValidTransition;

impl Rule for ValidTransition {
    fn name(&self) -> &'static str {
        "valid_transition"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Option<Diagnostic> {
        let record = ctx.record;
        let philosopher = ctx.state.philosopher(record.philosopher);
        let allowed = allowed_after(philosopher);
        let expected = describe(allowed);

        let legal = record.action.is_some_and(|a| allowed.contains(&a));
        if legal {
            return Some(Diagnostic::debug(self.name(), vec![expected]));
        }

        Some(
            Diagnostic::error(self.name(), vec!["ERROR: INVALID TRANSITION".into(), expected])
                .citing(record, [philosopher.and_then(|p| p.last_action())]),
        )
    }
}

/// Nothing should happen once every philosopher ate enough.
pub struct Completion;

impl Rule for Completion {
    fn name(&self) -> &'static str {
        "completion"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Option<Diagnostic> {
        let config = ctx.config;
        let required = config.meals_required.filter(|meals| *meals > 0)?;

        let finished = ctx
            .state
            .philosophers()
            .filter(|(id, p)| config.is_seated(*id) && i64::from(p.meals) >= required)
            .count();
        let left = config.philosophers - finished as i64;

        if left <= 0 {
            return Some(Diagnostic::error(
                self.name(),
                vec!["ERROR: ALL PHILOSOPHERS ATE.".into()],
            ));
        }
        Some(Diagnostic::debug(
            self.name(),
            vec![format!("There are {left} philosophers left to finish.")],
        ))
    }
}

/// Only seated philosophers may act.
pub struct Invitation;

impl Rule for Invitation {
    fn name(&self) -> &'static str {
        "invitation"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Option<Diagnostic> {
        if ctx.config.is_seated(ctx.record.philosopher) {
            return None;
        }

        Some(Diagnostic::error(
            self.name(),
            vec![
                "ERROR: NOT INVITED".into(),
                format!(
                    "philosopher number must be between 1 and {}",
                    ctx.config.philosophers
                ),
            ],
        ))
    }
}

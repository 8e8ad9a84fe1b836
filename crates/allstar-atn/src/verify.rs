//! Structural checks on a built ATN.

use crate::atn::Atn;
use crate::error::AtnError;
use crate::state::{AtnState, BlockKind, StateKind};

/// Checks the shape every simulator relies on: loop links are present,
/// blocks are closed, and only decision states branch.
pub fn verify_atn(atn: &Atn) -> Result<(), AtnError> {
    for state in atn.states() {
        verify_state(atn, state)?;
    }
    Ok(())
}

fn verify_state(atn: &Atn, state: &AtnState) -> Result<(), AtnError> {
    let n = state.number;
    let ntrans = state.num_transitions();

    check(
        state.only_has_epsilon_transitions() || ntrans <= 1,
        n,
        "has several transitions, not all epsilon",
    )?;

    match state.kind {
        StateKind::BlockStart {
            kind: BlockKind::Plus { loop_back },
            ..
        } => check(loop_back.is_some(), n, "plus block start has no loop-back")?,
        StateKind::StarLoopEntry { loop_back, .. } => {
            check(loop_back.is_some(), n, "star loop entry has no loop-back")?;
            check(ntrans == 2, n, "star loop entry needs exactly two transitions")?;
            let first = kind_of(atn, state.transition(0).target);
            let second = kind_of(atn, state.transition(1).target);
            match (first, second) {
                (
                    Some(StateKind::BlockStart {
                        kind: BlockKind::Star,
                        ..
                    }),
                    _,
                ) => {
                    check(
                        matches!(second, Some(StateKind::LoopEnd { .. })),
                        n,
                        "greedy star loop must exit through its loop end",
                    )?;
                    check(!state.non_greedy, n, "greedy star loop marked non-greedy")?;
                }
                (Some(StateKind::LoopEnd { .. }), _) => {
                    check(
                        matches!(
                            second,
                            Some(StateKind::BlockStart {
                                kind: BlockKind::Star,
                                ..
                            })
                        ),
                        n,
                        "non-greedy star loop must enter its block second",
                    )?;
                    check(state.non_greedy, n, "non-greedy star loop not marked")?;
                }
                _ => return Err(illegal(n, "star loop entry has unexpected targets")),
            }
        }
        StateKind::StarLoopBack => {
            check(ntrans == 1, n, "star loop-back needs exactly one transition")?;
            check(
                matches!(
                    kind_of(atn, state.transition(0).target),
                    Some(StateKind::StarLoopEntry { .. })
                ),
                n,
                "star loop-back must return to its loop entry",
            )?;
        }
        StateKind::LoopEnd { loop_back } => {
            check(loop_back.is_some(), n, "loop end has no loop-back")?
        }
        StateKind::RuleStart { stop_state, .. } => {
            check(stop_state.is_some(), n, "rule start has no stop state")?
        }
        StateKind::BlockEnd { start_state } => {
            check(start_state.is_some(), n, "block end has no start state")?
        }
        _ => {}
    }

    if let StateKind::BlockStart { end_state, .. } = state.kind {
        check(end_state.is_some(), n, "block start has no end state")?;
    }

    if state.is_decision_state() {
        check(
            ntrans <= 1 || state.decision.is_some(),
            n,
            "branching decision state has no decision number",
        )?;
    } else {
        check(
            ntrans <= 1 || state.is_rule_stop(),
            n,
            "non-decision state has more than one transition",
        )?;
    }

    Ok(())
}

fn kind_of(atn: &Atn, number: usize) -> Option<StateKind> {
    atn.get(number).map(|s| s.kind)
}

fn check(condition: bool, state: usize, message: &str) -> Result<(), AtnError> {
    if condition {
        Ok(())
    } else {
        Err(illegal(state, message))
    }
}

fn illegal(state: usize, message: &str) -> AtnError {
    AtnError::IllegalState(format!("state {state}: {message}"))
}

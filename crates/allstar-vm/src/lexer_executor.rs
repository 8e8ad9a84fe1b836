//! Lexer action sequences collected while matching a token.

use std::fmt;
use std::sync::Arc;

use allstar_atn::LexerAction;
use allstar_core::IntStream;

use crate::error::PredictionError;
use crate::host::LexerActionHost;

/// Actions to run, in order, once the token they belong to is accepted.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct LexerActionExecutor {
    actions: Vec<LexerAction>,
}

impl LexerActionExecutor {
    pub fn new(actions: Vec<LexerAction>) -> Self {
        Self { actions }
    }

    /// `executor` followed by `action`. A fresh executor is built; executors
    /// are shared between configs and never mutated.
    pub fn append(executor: Option<&Arc<Self>>, action: LexerAction) -> Arc<Self> {
        let mut actions = executor.map(|e| e.actions.clone()).unwrap_or_default();
        actions.push(action);
        Arc::new(Self { actions })
    }

    pub fn actions(&self) -> &[LexerAction] {
        &self.actions
    }

    /// Pins position-dependent actions to `offset` characters past the token
    /// start, so they run where they appeared rather than at the token end.
    ///
    /// Returns `None` when nothing needed pinning.
    pub fn fix_offset_before_match(&self, offset: usize) -> Option<Self> {
        let mut updated: Option<Vec<LexerAction>> = None;
        for (i, action) in self.actions.iter().enumerate() {
            if action.is_position_dependent() && !matches!(action, LexerAction::Indexed { .. }) {
                let actions = updated.get_or_insert_with(|| self.actions.clone());
                actions[i] = LexerAction::Indexed {
                    offset,
                    action: Box::new(action.clone()),
                };
            }
        }
        updated.map(|actions| Self { actions })
    }

    /// Runs every action against `host`.
    ///
    /// `input` is positioned at the end of the token on entry and is restored
    /// there on exit; indexed actions see it at their pinned offset from
    /// `start_index`.
    pub fn execute<H, I>(
        &self,
        host: &mut H,
        input: &mut I,
        start_index: usize,
    ) -> Result<(), PredictionError>
    where
        H: LexerActionHost + ?Sized,
        I: IntStream + ?Sized,
    {
        let stop_index = input.index();
        let mut requires_seek = false;
        let mut result = Ok(());

        for action in &self.actions {
            let action = match action {
                LexerAction::Indexed { offset, action } => {
                    let at = start_index + offset;
                    input.seek(at);
                    requires_seek = at != stop_index;
                    action.as_ref()
                }
                action if action.is_position_dependent() => {
                    input.seek(stop_index);
                    requires_seek = false;
                    action
                }
                action => action,
            };
            result = apply(action, host);
            if result.is_err() {
                break;
            }
        }

        if requires_seek || result.is_err() {
            input.seek(stop_index);
        }
        result
    }
}

fn apply<H: LexerActionHost + ?Sized>(
    action: &LexerAction,
    host: &mut H,
) -> Result<(), PredictionError> {
    match action {
        LexerAction::Channel(channel) => host.set_channel(*channel),
        LexerAction::Custom {
            rule_index,
            action_index,
        } => host.custom_action(*rule_index, *action_index),
        LexerAction::Mode(mode) => host.set_mode(*mode),
        LexerAction::More => host.more(),
        LexerAction::PopMode => host.pop_mode()?,
        LexerAction::PushMode(mode) => host.push_mode(*mode),
        LexerAction::Skip => host.skip(),
        LexerAction::Type(token_type) => host.set_type(*token_type),
        LexerAction::Indexed { action, .. } => apply(action, host)?,
    }
    Ok(())
}

impl fmt::Display for LexerActionExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, action) in self.actions.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{action}")?;
        }
        Ok(())
    }
}

//! Callbacks from the simulators into the recognizer driving them.

use crate::config_set::{AltSet, AtnConfigSet};
use crate::error::PredictionError;

/// What the parser simulator needs from the parser: predicate evaluation
/// and a sink for prediction diagnostics.
///
/// Every method has a default, so a host that has no predicates and ignores
/// diagnostics is an empty impl.
pub trait PredictionHost {
    /// Evaluates predicate `pred_index` of rule `rule_index` in the
    /// parser's current context.
    fn sempred(&mut self, _rule_index: usize, _pred_index: usize) -> bool {
        true
    }

    /// `precedence >= current precedence level`.
    fn precpred(&mut self, precedence: i32) -> bool {
        precedence >= self.precedence()
    }

    /// Precedence of the innermost precedence rule invocation, 0 outside one.
    fn precedence(&self) -> i32 {
        0
    }

    /// SLL found a conflict; prediction is retrying with full context.
    fn report_attempting_full_context(
        &mut self,
        _decision: usize,
        _conflicting_alts: Option<&AltSet>,
        _configs: &AtnConfigSet,
        _start_index: usize,
        _stop_index: usize,
    ) {
    }

    /// Full-context prediction found a unique alternative where SLL had a
    /// conflict.
    fn report_context_sensitivity(
        &mut self,
        _decision: usize,
        _prediction: usize,
        _configs: &AtnConfigSet,
        _start_index: usize,
        _stop_index: usize,
    ) {
    }

    /// Full-context prediction ended with several viable alternatives.
    fn report_ambiguity(
        &mut self,
        _decision: usize,
        _start_index: usize,
        _stop_index: usize,
        _exact: bool,
        _ambig_alts: &AltSet,
        _configs: &AtnConfigSet,
    ) {
    }
}

/// Receiver of lexer actions once a token has been matched.
pub trait LexerActionHost {
    fn skip(&mut self);

    fn more(&mut self);

    fn set_type(&mut self, token_type: i32);

    fn set_channel(&mut self, channel: i32);

    fn set_mode(&mut self, mode: usize);

    fn push_mode(&mut self, mode: usize);

    fn pop_mode(&mut self) -> Result<(), PredictionError>;

    /// Runs user action `action_index` of rule `rule_index`.
    fn custom_action(&mut self, _rule_index: usize, _action_index: usize) {}
}

/// What the lexer simulator needs from the lexer.
pub trait LexerHost: LexerActionHost {
    fn sempred(&mut self, _rule_index: usize, _pred_index: usize) -> bool {
        true
    }
}

/// Host with no predicates that discards every report.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoHost;

impl PredictionHost for NoHost {}

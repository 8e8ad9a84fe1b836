//! Errors raised by the simulators.

use crate::config_set::AltSet;

/// Mutation of a config set after it was frozen into a DFA state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigSetError {
    #[error("config set is read-only")]
    ReadOnly,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PredictionError {
    /// No alternative of `decision` matches the input starting at `start_index`.
    #[error("no viable alternative for decision {decision} at input index {offending_index}")]
    NoViableAlt {
        decision: usize,
        start_index: usize,
        offending_index: usize,
        /// Alternatives that were still alive one symbol before the dead end.
        dead_end_alts: AltSet,
    },

    #[error("no viable token at input index {start_index} in mode {mode}")]
    LexerNoViableAlt { mode: usize, start_index: usize },

    #[error("precedence predicates are not supported in lexers")]
    PrecedenceInLexer,

    #[error("pop on empty mode stack")]
    EmptyModeStack,

    #[error("decision {0} does not exist")]
    UnknownDecision(usize),

    #[error("mode {0} does not exist")]
    UnknownMode(usize),

    #[error(transparent)]
    ConfigSet(#[from] ConfigSetError),
}

//! Recognition errors and the crate error type.

use allstar_atn::AtnError;
use allstar_core::IntervalSet;
use allstar_vm::PredictionError;

use crate::token::Token;
use crate::tree::NodeId;

/// Input a recognizer could not match.
///
/// Parser variants record the ATN state the parser was in, the rule context
/// (a node of the parser's tree) and the offending token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecognitionError {
    /// Prediction could not choose an alternative.
    #[error("no viable alternative at input '{}'", .offending_token.text)]
    NoViableAlt {
        start_token: Token,
        offending_token: Token,
        state: usize,
        ctx: Option<NodeId>,
    },

    /// The current token does not match what the ATN state requires.
    #[error("mismatched input '{}' expecting {expected}", .offending_token.text)]
    InputMismatch {
        offending_token: Token,
        state: usize,
        ctx: Option<NodeId>,
        expected: IntervalSet,
    },

    /// A semantic or precedence predicate evaluated to false while matching.
    #[error("failed predicate: {{{predicate}}}?")]
    FailedPredicate {
        offending_token: Token,
        state: usize,
        ctx: Option<NodeId>,
        rule_index: usize,
        pred_index: Option<usize>,
        predicate: String,
    },

    /// No lexer rule matches at `start_index`.
    #[error("token recognition error at index {start_index} in mode {mode}")]
    LexerNoViableAlt { start_index: usize, mode: usize },
}

impl RecognitionError {
    pub fn offending_token(&self) -> Option<&Token> {
        match self {
            Self::NoViableAlt {
                offending_token, ..
            }
            | Self::InputMismatch {
                offending_token, ..
            }
            | Self::FailedPredicate {
                offending_token, ..
            } => Some(offending_token),
            Self::LexerNoViableAlt { .. } => None,
        }
    }

    /// ATN state the parser was in when the error was raised.
    pub fn state(&self) -> Option<usize> {
        match self {
            Self::NoViableAlt { state, .. }
            | Self::InputMismatch { state, .. }
            | Self::FailedPredicate { state, .. } => Some(*state),
            Self::LexerNoViableAlt { .. } => None,
        }
    }

    pub fn ctx(&self) -> Option<NodeId> {
        match self {
            Self::NoViableAlt { ctx, .. }
            | Self::InputMismatch { ctx, .. }
            | Self::FailedPredicate { ctx, .. } => *ctx,
            Self::LexerNoViableAlt { .. } => None,
        }
    }

    pub fn expected_tokens(&self) -> Option<&IntervalSet> {
        match self {
            Self::InputMismatch { expected, .. } => Some(expected),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Recognition(#[from] RecognitionError),

    /// The bail strategy gave up at the first syntax error.
    #[error("parse cancelled: {0}")]
    Cancelled(RecognitionError),

    #[error("pop on empty mode stack")]
    EmptyModeStack,

    #[error("ATN is not a {expected} ATN")]
    WrongGrammarType { expected: &'static str },

    #[error("unknown rule `{0}`")]
    UnknownRule(String),

    #[error("rule index {0} out of range")]
    RuleIndexOutOfRange(usize),

    #[error(transparent)]
    Atn(#[from] AtnError),

    #[error(transparent)]
    Prediction(#[from] PredictionError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

//! Lexer commands attached to token rules (`-> skip`, `-> pushMode(X)`, ...).

use std::fmt;

/// Serialization codes for lexer actions.
pub mod code {
    pub const CHANNEL: i32 = 0;
    pub const CUSTOM: i32 = 1;
    pub const MODE: i32 = 2;
    pub const MORE: i32 = 3;
    pub const POP_MODE: i32 = 4;
    pub const PUSH_MODE: i32 = 5;
    pub const SKIP: i32 = 6;
    pub const TYPE: i32 = 7;
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum LexerAction {
    Channel(i32),
    /// User action code, dispatched to the lexer's hooks.
    Custom {
        rule_index: usize,
        action_index: usize,
    },
    Mode(usize),
    More,
    PopMode,
    PushMode(usize),
    Skip,
    Type(i32),
    /// A position-dependent action pinned to an offset from the token start.
    /// Only produced at runtime, never serialized.
    Indexed {
        offset: usize,
        action: Box<LexerAction>,
    },
}

impl LexerAction {
    /// Builds an action from its serialized type and operands.
    pub fn from_code(code: i32, a: i32, b: i32) -> Option<LexerAction> {
        let index = |v: i32| usize::try_from(v).ok();
        Some(match code {
            code::CHANNEL => LexerAction::Channel(a),
            code::CUSTOM => LexerAction::Custom {
                rule_index: index(a)?,
                action_index: index(b)?,
            },
            code::MODE => LexerAction::Mode(index(a)?),
            code::MORE => LexerAction::More,
            code::POP_MODE => LexerAction::PopMode,
            code::PUSH_MODE => LexerAction::PushMode(index(a)?),
            code::SKIP => LexerAction::Skip,
            code::TYPE => LexerAction::Type(a),
            _ => return None,
        })
    }

    /// Serialized `(type, a, b)` triple.
    pub fn to_code(&self) -> (i32, i32, i32) {
        match self {
            LexerAction::Channel(c) => (code::CHANNEL, *c, 0),
            LexerAction::Custom {
                rule_index,
                action_index,
            } => (code::CUSTOM, *rule_index as i32, *action_index as i32),
            LexerAction::Mode(m) => (code::MODE, *m as i32, 0),
            LexerAction::More => (code::MORE, 0, 0),
            LexerAction::PopMode => (code::POP_MODE, 0, 0),
            LexerAction::PushMode(m) => (code::PUSH_MODE, *m as i32, 0),
            LexerAction::Skip => (code::SKIP, 0, 0),
            LexerAction::Type(t) => (code::TYPE, *t, 0),
            LexerAction::Indexed { action, .. } => action.to_code(),
        }
    }

    /// Position-dependent actions must run with the input positioned where
    /// they appeared in the rule, not at the token end.
    pub fn is_position_dependent(&self) -> bool {
        matches!(self, LexerAction::Custom { .. } | LexerAction::Indexed { .. })
    }
}

impl fmt::Display for LexerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexerAction::Channel(c) => write!(f, "channel({c})"),
            LexerAction::Custom {
                rule_index,
                action_index,
            } => write!(f, "custom({rule_index}, {action_index})"),
            LexerAction::Mode(m) => write!(f, "mode({m})"),
            LexerAction::More => write!(f, "more"),
            LexerAction::PopMode => write!(f, "popMode"),
            LexerAction::PushMode(m) => write!(f, "pushMode({m})"),
            LexerAction::Skip => write!(f, "skip"),
            LexerAction::Type(t) => write!(f, "type({t})"),
            LexerAction::Indexed { offset, action } => write!(f, "{action}@{offset}"),
        }
    }
}

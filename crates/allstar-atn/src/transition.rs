//! ATN edges.

use std::fmt;

use allstar_core::{IntervalSet, token};

/// Serialization codes for transition kinds.
pub mod code {
    pub const EPSILON: i32 = 1;
    pub const RANGE: i32 = 2;
    pub const RULE: i32 = 3;
    pub const PREDICATE: i32 = 4;
    pub const ATOM: i32 = 5;
    pub const ACTION: i32 = 6;
    pub const SET: i32 = 7;
    pub const NOT_SET: i32 = 8;
    pub const WILDCARD: i32 = 9;
    pub const PRECEDENCE: i32 = 10;
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TransitionKind {
    Epsilon {
        /// Set on the return edge of a precedence rule invoked at precedence 0:
        /// the rule index whose outermost invocation this edge leaves.
        outermost_precedence_return: Option<usize>,
    },
    Range {
        from: i32,
        to: i32,
    },
    /// Rule invocation. The edge targets the callee's start state.
    Rule {
        rule_index: usize,
        precedence: i32,
        follow_state: usize,
    },
    Predicate {
        rule_index: usize,
        pred_index: usize,
        ctx_dependent: bool,
    },
    Atom {
        label: i32,
    },
    Action {
        rule_index: usize,
        action_index: Option<usize>,
        ctx_dependent: bool,
    },
    Set(IntervalSet),
    NotSet(IntervalSet),
    Wildcard,
    /// `{precedence >= _p}` check inside a left-recursive rule.
    Precedence {
        precedence: i32,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Transition {
    pub target: usize,
    pub kind: TransitionKind,
}

impl Transition {
    pub fn new(target: usize, kind: TransitionKind) -> Self {
        Self { target, kind }
    }

    pub fn epsilon(target: usize) -> Self {
        Self::new(
            target,
            TransitionKind::Epsilon {
                outermost_precedence_return: None,
            },
        )
    }

    pub fn atom(target: usize, label: i32) -> Self {
        Self::new(target, TransitionKind::Atom { label })
    }

    pub fn code(&self) -> i32 {
        match self.kind {
            TransitionKind::Epsilon { .. } => code::EPSILON,
            TransitionKind::Range { .. } => code::RANGE,
            TransitionKind::Rule { .. } => code::RULE,
            TransitionKind::Predicate { .. } => code::PREDICATE,
            TransitionKind::Atom { .. } => code::ATOM,
            TransitionKind::Action { .. } => code::ACTION,
            TransitionKind::Set(_) => code::SET,
            TransitionKind::NotSet(_) => code::NOT_SET,
            TransitionKind::Wildcard => code::WILDCARD,
            TransitionKind::Precedence { .. } => code::PRECEDENCE,
        }
    }

    /// Epsilon edges consume no input: plain epsilon, rule calls,
    /// predicates, actions, and precedence checks.
    pub fn is_epsilon(&self) -> bool {
        matches!(
            self.kind,
            TransitionKind::Epsilon { .. }
                | TransitionKind::Rule { .. }
                | TransitionKind::Predicate { .. }
                | TransitionKind::Action { .. }
                | TransitionKind::Precedence { .. }
        )
    }

    /// Symbols this edge is labeled with. A not-set edge reports the set it
    /// excludes; wildcard and epsilon edges have no label.
    pub fn label(&self) -> Option<IntervalSet> {
        match &self.kind {
            TransitionKind::Atom { label } => Some(IntervalSet::of(*label)),
            TransitionKind::Range { from, to } => Some(IntervalSet::of_range(*from, *to)),
            TransitionKind::Set(set) | TransitionKind::NotSet(set) => Some(set.clone()),
            _ => None,
        }
    }

    /// Does `symbol` traverse this edge, given the vocabulary bounds used for
    /// complements and wildcards?
    pub fn matches(&self, symbol: i32, min_vocab: i32, max_vocab: i32) -> bool {
        match &self.kind {
            TransitionKind::Atom { label } => *label == symbol,
            TransitionKind::Range { from, to } => *from <= symbol && symbol <= *to,
            TransitionKind::Set(set) => set.contains(symbol),
            TransitionKind::NotSet(set) => {
                symbol >= min_vocab && symbol <= max_vocab && !set.contains(symbol)
            }
            TransitionKind::Wildcard => symbol >= min_vocab && symbol <= max_vocab,
            _ => false,
        }
    }

    /// Label rendered for a lexer ATN, where symbols are code points.
    pub fn char_label(&self) -> String {
        use allstar_core::utils::char_literal;

        match &self.kind {
            TransitionKind::Atom { label } if *label == token::EOF => "<EOF>".to_string(),
            TransitionKind::Atom { label } => char_literal(*label),
            TransitionKind::Range { from, to } => {
                format!("{}..{}", char_literal(*from), char_literal(*to))
            }
            TransitionKind::Set(set) => set.to_char_string(),
            TransitionKind::NotSet(set) => format!("~{}", set.to_char_string()),
            _ => self.to_string(),
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TransitionKind::Epsilon {
                outermost_precedence_return: None,
            } => write!(f, "ε"),
            TransitionKind::Epsilon {
                outermost_precedence_return: Some(rule),
            } => write!(f, "ε (return r{rule})"),
            TransitionKind::Range { from, to } => write!(f, "{from}..{to}"),
            TransitionKind::Rule {
                rule_index,
                precedence,
                follow_state,
            } => {
                write!(f, "call r{rule_index}")?;
                if *precedence != 0 {
                    write!(f, " prec {precedence}")?;
                }
                write!(f, " then S{follow_state}")
            }
            TransitionKind::Predicate {
                rule_index,
                pred_index,
                ctx_dependent,
            } => {
                write!(f, "pred_{rule_index}:{pred_index}")?;
                if *ctx_dependent {
                    write!(f, " (ctx)")?;
                }
                Ok(())
            }
            TransitionKind::Atom { label } if *label == token::EOF => write!(f, "<EOF>"),
            TransitionKind::Atom { label } => write!(f, "{label}"),
            TransitionKind::Action {
                rule_index,
                action_index,
                ..
            } => match action_index {
                Some(action) => write!(f, "action_{rule_index}:{action}"),
                None => write!(f, "action_{rule_index}"),
            },
            TransitionKind::Set(set) => write!(f, "{set}"),
            TransitionKind::NotSet(set) => write!(f, "~{set}"),
            TransitionKind::Wildcard => write!(f, "."),
            TransitionKind::Precedence { precedence } => write!(f, "{precedence} >= _p"),
        }
    }
}

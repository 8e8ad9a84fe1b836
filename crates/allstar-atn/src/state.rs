//! ATN states.
//!
//! One struct carries the fields every state has; the per-kind links
//! (stop state, end state, loop-back) live in [`StateKind`]. Links are
//! `Option` because the deserializer resolves them after all states exist.

use std::sync::OnceLock;

use allstar_core::IntervalSet;

use crate::transition::Transition;

/// Serialization codes for state kinds.
pub mod code {
    pub const INVALID: i32 = 0;
    pub const BASIC: i32 = 1;
    pub const RULE_START: i32 = 2;
    pub const BLOCK_START: i32 = 3;
    pub const PLUS_BLOCK_START: i32 = 4;
    pub const STAR_BLOCK_START: i32 = 5;
    pub const TOKEN_START: i32 = 6;
    pub const RULE_STOP: i32 = 7;
    pub const BLOCK_END: i32 = 8;
    pub const STAR_LOOP_BACK: i32 = 9;
    pub const STAR_LOOP_ENTRY: i32 = 10;
    pub const PLUS_LOOP_BACK: i32 = 11;
    pub const LOOP_END: i32 = 12;
}

/// Flavor of a block start.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockKind {
    /// `( a | b )`
    Basic,
    /// Start of `( ... )+`; `loop_back` is the plus loop-back state.
    Plus { loop_back: Option<usize> },
    /// Start of the body of `( ... )*`.
    Star,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StateKind {
    Basic,
    RuleStart {
        stop_state: Option<usize>,
        /// Rule was rewritten from direct left recursion into a precedence loop.
        is_left_recursive: bool,
    },
    RuleStop,
    BlockStart {
        kind: BlockKind,
        end_state: Option<usize>,
    },
    BlockEnd {
        start_state: Option<usize>,
    },
    /// Entry of a lexer mode; one alternative per token rule.
    TokenStart,
    StarLoopEntry {
        loop_back: Option<usize>,
        /// Decision that chooses between continuing a precedence loop and
        /// returning from the rule.
        precedence_decision: bool,
    },
    StarLoopBack,
    PlusLoopBack,
    LoopEnd {
        loop_back: Option<usize>,
    },
}

impl StateKind {
    pub fn from_code(code: i32) -> Option<StateKind> {
        Some(match code {
            code::BASIC => StateKind::Basic,
            code::RULE_START => StateKind::RuleStart {
                stop_state: None,
                is_left_recursive: false,
            },
            code::BLOCK_START => StateKind::BlockStart {
                kind: BlockKind::Basic,
                end_state: None,
            },
            code::PLUS_BLOCK_START => StateKind::BlockStart {
                kind: BlockKind::Plus { loop_back: None },
                end_state: None,
            },
            code::STAR_BLOCK_START => StateKind::BlockStart {
                kind: BlockKind::Star,
                end_state: None,
            },
            code::TOKEN_START => StateKind::TokenStart,
            code::RULE_STOP => StateKind::RuleStop,
            code::BLOCK_END => StateKind::BlockEnd { start_state: None },
            code::STAR_LOOP_BACK => StateKind::StarLoopBack,
            code::STAR_LOOP_ENTRY => StateKind::StarLoopEntry {
                loop_back: None,
                precedence_decision: false,
            },
            code::PLUS_LOOP_BACK => StateKind::PlusLoopBack,
            code::LOOP_END => StateKind::LoopEnd { loop_back: None },
            _ => return None,
        })
    }

    pub fn code(&self) -> i32 {
        match self {
            StateKind::Basic => code::BASIC,
            StateKind::RuleStart { .. } => code::RULE_START,
            StateKind::RuleStop => code::RULE_STOP,
            StateKind::BlockStart { kind, .. } => match kind {
                BlockKind::Basic => code::BLOCK_START,
                BlockKind::Plus { .. } => code::PLUS_BLOCK_START,
                BlockKind::Star => code::STAR_BLOCK_START,
            },
            StateKind::BlockEnd { .. } => code::BLOCK_END,
            StateKind::TokenStart => code::TOKEN_START,
            StateKind::StarLoopEntry { .. } => code::STAR_LOOP_ENTRY,
            StateKind::StarLoopBack => code::STAR_LOOP_BACK,
            StateKind::PlusLoopBack => code::PLUS_LOOP_BACK,
            StateKind::LoopEnd { .. } => code::LOOP_END,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StateKind::Basic => "basic",
            StateKind::RuleStart { .. } => "rule-start",
            StateKind::RuleStop => "rule-stop",
            StateKind::BlockStart { kind, .. } => match kind {
                BlockKind::Basic => "block-start",
                BlockKind::Plus { .. } => "plus-block-start",
                BlockKind::Star => "star-block-start",
            },
            StateKind::BlockEnd { .. } => "block-end",
            StateKind::TokenStart => "token-start",
            StateKind::StarLoopEntry { .. } => "star-loop-entry",
            StateKind::StarLoopBack => "star-loop-back",
            StateKind::PlusLoopBack => "plus-loop-back",
            StateKind::LoopEnd { .. } => "loop-end",
        }
    }

    /// Block starts, token starts, star loop entries, and plus loop-backs
    /// choose between alternatives.
    pub fn is_decision(&self) -> bool {
        matches!(
            self,
            StateKind::BlockStart { .. }
                | StateKind::TokenStart
                | StateKind::StarLoopEntry { .. }
                | StateKind::PlusLoopBack
        )
    }
}

#[derive(Clone, Debug)]
pub struct AtnState {
    pub number: usize,
    pub rule_index: Option<usize>,
    pub kind: StateKind,
    /// Decision number, for decision states registered with the ATN.
    pub decision: Option<usize>,
    pub non_greedy: bool,
    transitions: Vec<Transition>,
    epsilon_only: bool,
    pub(crate) next_tokens_within_rule: OnceLock<IntervalSet>,
}

impl AtnState {
    pub fn new(number: usize, kind: StateKind, rule_index: Option<usize>) -> Self {
        Self {
            number,
            rule_index,
            kind,
            decision: None,
            non_greedy: false,
            transitions: Vec::new(),
            epsilon_only: false,
            next_tokens_within_rule: OnceLock::new(),
        }
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn transition(&self, i: usize) -> &Transition {
        &self.transitions[i]
    }

    pub fn num_transitions(&self) -> usize {
        self.transitions.len()
    }

    /// True when every outgoing edge is epsilon. Mixed states report false.
    pub fn only_has_epsilon_transitions(&self) -> bool {
        self.epsilon_only
    }

    pub fn add_transition(&mut self, t: Transition) {
        if self.transitions.is_empty() {
            self.epsilon_only = t.is_epsilon();
        } else if self.epsilon_only != t.is_epsilon() {
            self.epsilon_only = false;
        }
        self.transitions.push(t);
        self.next_tokens_within_rule = OnceLock::new();
    }

    pub fn set_transition(&mut self, i: usize, t: Transition) {
        self.transitions[i] = t;
        self.refresh_epsilon_only();
    }

    pub fn remove_last_transition(&mut self) -> Option<Transition> {
        let t = self.transitions.pop();
        self.refresh_epsilon_only();
        t
    }

    pub(crate) fn transitions_mut(&mut self) -> &mut [Transition] {
        &mut self.transitions
    }

    pub fn is_decision_state(&self) -> bool {
        self.kind.is_decision()
    }

    pub fn is_rule_stop(&self) -> bool {
        matches!(self.kind, StateKind::RuleStop)
    }

    pub fn is_rule_start(&self) -> bool {
        matches!(self.kind, StateKind::RuleStart { .. })
    }

    /// End state of a block start, if this is one.
    pub fn end_state(&self) -> Option<usize> {
        match self.kind {
            StateKind::BlockStart { end_state, .. } => end_state,
            _ => None,
        }
    }

    /// Loop-back partner for star loop entries, plus block starts, and loop ends.
    pub fn loop_back_state(&self) -> Option<usize> {
        match self.kind {
            StateKind::StarLoopEntry { loop_back, .. } | StateKind::LoopEnd { loop_back } => {
                loop_back
            }
            StateKind::BlockStart {
                kind: BlockKind::Plus { loop_back },
                ..
            } => loop_back,
            _ => None,
        }
    }

    pub fn is_precedence_decision(&self) -> bool {
        matches!(
            self.kind,
            StateKind::StarLoopEntry {
                precedence_decision: true,
                ..
            }
        )
    }

    fn refresh_epsilon_only(&mut self) {
        self.epsilon_only = match self.transitions.split_first() {
            None => false,
            Some((first, rest)) => {
                let eps = first.is_epsilon();
                eps && rest.iter().all(Transition::is_epsilon)
            }
        };
        self.next_tokens_within_rule = OnceLock::new();
    }
}

//! The augmented transition network for one grammar.

use allstar_core::{IntervalSet, token};

use crate::lexer_action::LexerAction;
use crate::ll1::Ll1Analyzer;
use crate::state::{AtnState, StateKind};
use crate::transition::TransitionKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GrammarType {
    Lexer,
    Parser,
}

impl GrammarType {
    pub fn from_code(code: i32) -> Option<GrammarType> {
        match code {
            0 => Some(GrammarType::Lexer),
            1 => Some(GrammarType::Parser),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            GrammarType::Lexer => 0,
            GrammarType::Parser => 1,
        }
    }
}

/// A deserialized ATN. States are indexed by number; removed or invalid
/// states leave holes so numbers stay stable.
#[derive(Clone, Debug)]
pub struct Atn {
    pub grammar_type: GrammarType,
    pub max_token_type: i32,
    states: Vec<Option<AtnState>>,
    /// Decision number to decision state.
    pub decision_to_state: Vec<usize>,
    pub rule_to_start_state: Vec<usize>,
    pub rule_to_stop_state: Vec<usize>,
    /// Lexer mode to its token-start state.
    pub mode_to_start_state: Vec<usize>,
    /// Lexer rule to emitted token type; for parsers with bypass
    /// alternatives, rule to its bypass token type.
    pub rule_to_token_type: Vec<i32>,
    pub lexer_actions: Vec<LexerAction>,
}

impl Atn {
    pub fn new(grammar_type: GrammarType, max_token_type: i32) -> Self {
        Self {
            grammar_type,
            max_token_type,
            states: Vec::new(),
            decision_to_state: Vec::new(),
            rule_to_start_state: Vec::new(),
            rule_to_stop_state: Vec::new(),
            mode_to_start_state: Vec::new(),
            rule_to_token_type: Vec::new(),
            lexer_actions: Vec::new(),
        }
    }

    /// Appends a state and returns its number.
    pub fn add_state(&mut self, kind: StateKind, rule_index: Option<usize>) -> usize {
        let number = self.states.len();
        self.states.push(Some(AtnState::new(number, kind, rule_index)));
        number
    }

    /// Appends an empty slot, keeping later state numbers aligned.
    pub fn add_hole(&mut self) {
        self.states.push(None);
    }

    /// Leaves a hole where `number` was. Transitions into it are not rewritten.
    pub fn remove_state(&mut self, number: usize) {
        if let Some(slot) = self.states.get_mut(number) {
            *slot = None;
        }
    }

    /// Registers `state` as the next decision and returns its number.
    pub fn define_decision_state(&mut self, state: usize) -> usize {
        let decision = self.decision_to_state.len();
        self.decision_to_state.push(state);
        self.state_mut(state).decision = Some(decision);
        decision
    }

    pub fn get(&self, number: usize) -> Option<&AtnState> {
        self.states.get(number)?.as_ref()
    }

    pub fn get_mut(&mut self, number: usize) -> Option<&mut AtnState> {
        self.states.get_mut(number)?.as_mut()
    }

    /// State `number`, which the ATN guarantees exists.
    pub fn state(&self, number: usize) -> &AtnState {
        self.ensure_state(number)
    }

    pub fn state_mut(&mut self, number: usize) -> &mut AtnState {
        self.ensure_state_mut(number)
    }

    /// Number of state slots, holes included.
    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    pub fn states(&self) -> impl Iterator<Item = &AtnState> {
        self.states.iter().flatten()
    }

    /// Slots in order, holes included.
    pub fn slots(&self) -> &[Option<AtnState>] {
        &self.states
    }

    pub fn num_decisions(&self) -> usize {
        self.decision_to_state.len()
    }

    pub fn decision_state(&self, decision: usize) -> Option<&AtnState> {
        let number = *self.decision_to_state.get(decision)?;
        self.get(number)
    }

    pub fn num_rules(&self) -> usize {
        self.rule_to_start_state.len()
    }

    pub fn rule_start(&self, rule: usize) -> &AtnState {
        self.state(self.rule_to_start_state[rule])
    }

    pub fn rule_stop(&self, rule: usize) -> &AtnState {
        self.state(self.rule_to_stop_state[rule])
    }

    pub fn is_precedence_rule(&self, rule: usize) -> bool {
        matches!(
            self.rule_start(rule).kind,
            StateKind::RuleStart {
                is_left_recursive: true,
                ..
            }
        )
    }

    /// Tokens reachable from `state` without leaving its rule. Contains
    /// [`token::EPSILON`] when the rule end is reachable. Computed once and
    /// frozen.
    pub fn next_tokens(&self, state: usize) -> &IntervalSet {
        let s = self.state(state);
        s.next_tokens_within_rule.get_or_init(|| {
            let mut set = Ll1Analyzer::new(self).look(state, None, None);
            set.freeze();
            set
        })
    }

    /// Tokens reachable from `state` when the rule was entered through
    /// `invoking_states` (innermost first). Reaching the outermost rule end
    /// adds EOF.
    pub fn next_tokens_in_context(&self, state: usize, invoking_states: &[usize]) -> IntervalSet {
        Ll1Analyzer::new(self).look(state, None, Some(invoking_states))
    }

    /// Tokens that could follow the parser at `state` given the invocation
    /// chain `invoking_states`, innermost first. Used for error messages.
    pub fn expected_tokens(&self, state: usize, invoking_states: &[usize]) -> IntervalSet {
        let mut following = self.next_tokens(state);
        if !following.contains(token::EPSILON) {
            return following.clone();
        }

        let mut expected = following.subtract(&IntervalSet::of(token::EPSILON));

        for &invoking in invoking_states {
            if !following.contains(token::EPSILON) {
                break;
            }
            let follow = self.follow_state_of(invoking);
            following = self.next_tokens(follow);
            expected = expected.or(following);
            expected = expected.subtract(&IntervalSet::of(token::EPSILON));
        }

        if following.contains(token::EPSILON) {
            expected = expected.or(&IntervalSet::of(token::EOF));
        }
        expected
    }

    /// Per-alternative LL(1) lookahead for a decision state; `None` for an
    /// alternative whose lookahead is empty or passes a predicate.
    pub fn decision_lookahead(&self, state: usize) -> Vec<Option<IntervalSet>> {
        Ll1Analyzer::new(self).decision_lookahead(state)
    }

    /// Follow state of the rule transition leaving `invoking_state`.
    pub fn follow_state_of(&self, invoking_state: usize) -> usize {
        match &self.state(invoking_state).transition(0).kind {
            TransitionKind::Rule { follow_state, .. } => *follow_state,
            _ => self.fail_not_invoking(invoking_state),
        }
    }

    pub(crate) fn states_mut(&mut self) -> impl Iterator<Item = &mut AtnState> {
        self.states.iter_mut().flatten()
    }
}

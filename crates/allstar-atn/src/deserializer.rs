//! Builds an [`Atn`] from its serialized form.
//!
//! Both encodings decode to [`SerializedAtn`] first; [`Deserializer::deserialize`]
//! is the one pass that turns that dictionary into the graph, resolves
//! cross-links, and optionally verifies and adds bypass alternatives.

use allstar_core::{Interval, IntervalSet, token};

use crate::atn::{Atn, GrammarType};
use crate::bypass::generate_rule_bypass_transitions;
use crate::error::AtnError;
use crate::lexer_action::LexerAction;
use crate::serialized::{FormatId, SERIALIZED_VERSION, SerializedAtn, SerializedEdge, packed};
use crate::state::{BlockKind, StateKind};
use crate::transition::{Transition, TransitionKind, code};
use crate::verify::verify_atn;

/// `0xFFFF` is how the char-packed form spells `-1`.
const PACKED_ABSENT: i32 = 0xFFFF;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeserializationOptions {
    pub verify: bool,
    pub generate_rule_bypass_transitions: bool,
}

impl Default for DeserializationOptions {
    fn default() -> Self {
        Self {
            verify: true,
            generate_rule_bypass_transitions: false,
        }
    }
}

impl DeserializationOptions {
    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    pub fn with_rule_bypass_transitions(mut self, generate: bool) -> Self {
        self.generate_rule_bypass_transitions = generate;
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct Deserializer {
    options: DeserializationOptions,
}

impl Deserializer {
    pub fn new(options: DeserializationOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> DeserializationOptions {
        self.options
    }

    pub fn from_json(&self, json: &str) -> Result<Atn, AtnError> {
        self.deserialize(&SerializedAtn::from_json(json)?)
    }

    pub fn from_packed(&self, words: &[u16]) -> Result<Atn, AtnError> {
        self.deserialize(&packed::decode(words)?)
    }

    pub fn deserialize(&self, data: &SerializedAtn) -> Result<Atn, AtnError> {
        if data.version != SERIALIZED_VERSION {
            return Err(AtnError::UnsupportedVersion {
                found: data.version,
                expected: SERIALIZED_VERSION,
            });
        }
        let format = data.format_id()?;
        if !format.is_supported() {
            return Err(AtnError::UnsupportedUuid(format));
        }

        let grammar_type = GrammarType::from_code(data.grammar_type)
            .ok_or(AtnError::InvalidGrammarType(data.grammar_type))?;
        let mut atn = Atn::new(grammar_type, data.max_token_type);

        read_states(&mut atn, data)?;
        read_rules(&mut atn, data)?;
        read_modes(&mut atn, data)?;
        let sets = read_sets(data);
        read_edges(&mut atn, data, &sets)?;
        add_return_edges(&mut atn)?;
        link_blocks_and_loops(&mut atn)?;
        read_decisions(&mut atn, data)?;
        read_lexer_actions(&mut atn, data, format)?;
        mark_precedence_decisions(&mut atn);

        if self.options.verify {
            verify_atn(&atn)?;
        }

        if self.options.generate_rule_bypass_transitions && grammar_type == GrammarType::Parser {
            generate_rule_bypass_transitions(&mut atn)?;
            if self.options.verify {
                verify_atn(&atn)?;
            }
        }

        Ok(atn)
    }
}

fn read_states(atn: &mut Atn, data: &SerializedAtn) -> Result<(), AtnError> {
    let mut loop_back_links = Vec::new();
    let mut end_state_links = Vec::new();

    for s in &data.states {
        if s.state_type == crate::state::code::INVALID {
            atn.add_hole();
            continue;
        }
        let kind =
            StateKind::from_code(s.state_type).ok_or(AtnError::InvalidStateType(s.state_type))?;
        let rule_index = optional_index(s.rule_index);
        let number = atn.add_state(kind, rule_index);

        match (kind, s.detail_state_number) {
            (StateKind::LoopEnd { .. }, Some(detail)) => loop_back_links.push((number, detail)),
            (StateKind::BlockStart { .. }, Some(detail)) => end_state_links.push((number, detail)),
            _ => {}
        }
    }

    for (number, detail) in loop_back_links {
        let loop_back = state_ref(atn, detail, "loop-back state")?;
        atn.state_mut(number).kind = StateKind::LoopEnd {
            loop_back: Some(loop_back),
        };
    }
    for (number, detail) in end_state_links {
        let end = state_ref(atn, detail, "block end state")?;
        if let StateKind::BlockStart { end_state, .. } = &mut atn.state_mut(number).kind {
            *end_state = Some(end);
        }
    }

    for &n in &data.non_greedy_states {
        let number = state_ref(atn, n, "non-greedy state")?;
        let state = atn.state_mut(number);
        if !state.is_decision_state() {
            return Err(AtnError::WrongStateKind {
                state: number,
                expected: "decision",
            });
        }
        state.non_greedy = true;
    }

    for &n in &data.precedence_states {
        let number = state_ref(atn, n, "precedence rule start")?;
        match &mut atn.state_mut(number).kind {
            StateKind::RuleStart {
                is_left_recursive, ..
            } => *is_left_recursive = true,
            _ => {
                return Err(AtnError::WrongStateKind {
                    state: number,
                    expected: "rule start",
                });
            }
        }
    }

    Ok(())
}

fn read_rules(atn: &mut Atn, data: &SerializedAtn) -> Result<(), AtnError> {
    for rule in &data.rule_to_start_state {
        let start = state_ref(atn, rule.state_number, "rule start state")?;
        if !atn.state(start).is_rule_start() {
            return Err(AtnError::WrongStateKind {
                state: start,
                expected: "rule start",
            });
        }
        atn.rule_to_start_state.push(start);

        if atn.grammar_type == GrammarType::Lexer {
            let token_type = match rule.rule_to_token_type {
                None | Some(-1) | Some(PACKED_ABSENT) => token::EOF,
                Some(t) => t,
            };
            atn.rule_to_token_type.push(token_type);
        }
    }

    let num_rules = atn.num_rules();
    let mut stops: Vec<Option<usize>> = vec![None; num_rules];
    for state in atn.states() {
        if !state.is_rule_stop() {
            continue;
        }
        let Some(rule) = state.rule_index else {
            continue;
        };
        let slot = stops.get_mut(rule).ok_or(AtnError::OutOfRange {
            what: "rule index",
            index: rule as i64,
        })?;
        *slot = Some(state.number);
    }

    for (rule, stop) in stops.into_iter().enumerate() {
        let stop = stop.ok_or_else(|| {
            AtnError::IllegalState(format!("rule {rule} has no stop state"))
        })?;
        atn.rule_to_stop_state.push(stop);
        let start = atn.rule_to_start_state[rule];
        if let StateKind::RuleStart { stop_state, .. } = &mut atn.state_mut(start).kind {
            *stop_state = Some(stop);
        }
    }

    Ok(())
}

fn read_modes(atn: &mut Atn, data: &SerializedAtn) -> Result<(), AtnError> {
    for &n in &data.mode_to_start_state {
        let number = state_ref(atn, n, "mode start state")?;
        if !matches!(atn.state(number).kind, StateKind::TokenStart) {
            return Err(AtnError::WrongStateKind {
                state: number,
                expected: "token start",
            });
        }
        atn.mode_to_start_state.push(number);
    }
    Ok(())
}

fn read_sets(data: &SerializedAtn) -> Vec<IntervalSet> {
    data.interval_sets
        .iter()
        .map(|s| {
            let eof = (s.contains_eof != 0).then_some(Interval::single(token::EOF));
            eof.into_iter().chain(s.intervals.iter().copied()).collect()
        })
        .collect()
}

fn read_edges(atn: &mut Atn, data: &SerializedAtn, sets: &[IntervalSet]) -> Result<(), AtnError> {
    for edge in data.edges() {
        let src = state_ref(atn, edge.src, "edge source")?;
        let t = edge_factory(atn, edge, sets)?;
        atn.state_mut(src).add_transition(t);
    }
    Ok(())
}

fn edge_factory(atn: &Atn, e: &SerializedEdge, sets: &[IntervalSet]) -> Result<Transition, AtnError> {
    let target = state_ref(atn, e.trg, "edge target")?;
    let index = |v: i32, what: &'static str| {
        usize::try_from(v).map_err(|_| AtnError::OutOfRange {
            what,
            index: i64::from(v),
        })
    };
    let set = |v: i32| {
        index(v, "interval set").and_then(|i| {
            sets.get(i).cloned().ok_or(AtnError::OutOfRange {
                what: "interval set",
                index: i64::from(v),
            })
        })
    };

    let t = match e.edge_type {
        code::EPSILON => Transition::epsilon(target),
        code::RANGE => {
            let from = if e.arg3 != 0 { token::EOF } else { e.arg1 };
            Transition::new(target, TransitionKind::Range { from, to: e.arg2 })
        }
        code::RULE => {
            let start = state_ref(atn, e.arg1, "rule start state")?;
            Transition::new(
                start,
                TransitionKind::Rule {
                    rule_index: index(e.arg2, "rule index")?,
                    precedence: e.arg3,
                    follow_state: target,
                },
            )
        }
        code::PREDICATE => Transition::new(
            target,
            TransitionKind::Predicate {
                rule_index: index(e.arg1, "rule index")?,
                pred_index: index(e.arg2, "predicate index")?,
                ctx_dependent: e.arg3 != 0,
            },
        ),
        code::PRECEDENCE => Transition::new(
            target,
            TransitionKind::Precedence {
                precedence: e.arg1,
            },
        ),
        code::ATOM => {
            let label = if e.arg3 != 0 { token::EOF } else { e.arg1 };
            Transition::atom(target, label)
        }
        code::ACTION => Transition::new(
            target,
            TransitionKind::Action {
                rule_index: index(e.arg1, "rule index")?,
                action_index: optional_index(e.arg2),
                ctx_dependent: e.arg3 != 0,
            },
        ),
        code::SET => Transition::new(target, TransitionKind::Set(set(e.arg1)?)),
        code::NOT_SET => Transition::new(target, TransitionKind::NotSet(set(e.arg1)?)),
        code::WILDCARD => Transition::new(target, TransitionKind::Wildcard),
        other => return Err(AtnError::InvalidTransitionType(other)),
    };
    Ok(t)
}

/// Each rule call gets an epsilon edge from the callee's stop state back to
/// the follow state.
fn add_return_edges(atn: &mut Atn) -> Result<(), AtnError> {
    let mut returns = Vec::new();
    for state in atn.states() {
        for t in state.transitions() {
            let TransitionKind::Rule {
                precedence,
                follow_state,
                ..
            } = t.kind
            else {
                continue;
            };
            let Some(callee) = atn.state(t.target).rule_index else {
                continue;
            };
            let stop = *atn.rule_to_stop_state.get(callee).ok_or(AtnError::OutOfRange {
                what: "rule index",
                index: callee as i64,
            })?;
            let outermost_precedence_return =
                (atn.is_precedence_rule(callee) && precedence == 0).then_some(callee);
            returns.push((
                stop,
                Transition::new(
                    follow_state,
                    TransitionKind::Epsilon {
                        outermost_precedence_return,
                    },
                ),
            ));
        }
    }
    for (stop, t) in returns {
        atn.state_mut(stop).add_transition(t);
    }
    Ok(())
}

fn link_blocks_and_loops(atn: &mut Atn) -> Result<(), AtnError> {
    let mut block_links = Vec::new();
    let mut loop_links = Vec::new();

    for state in atn.states() {
        match state.kind {
            StateKind::BlockStart { end_state, .. } => {
                let end = end_state.ok_or_else(|| {
                    AtnError::IllegalState(format!("block start {} has no end state", state.number))
                })?;
                block_links.push((state.number, end));
            }
            StateKind::PlusLoopBack | StateKind::StarLoopBack => {
                for t in state.transitions() {
                    loop_links.push((state.number, t.target));
                }
            }
            _ => {}
        }
    }

    for (start, end) in block_links {
        match &mut atn.state_mut(end).kind {
            StateKind::BlockEnd {
                start_state: slot @ None,
            } => *slot = Some(start),
            StateKind::BlockEnd { start_state: Some(_) } => {
                return Err(AtnError::IllegalState(format!(
                    "block end {end} already has a start state"
                )));
            }
            _ => {
                return Err(AtnError::WrongStateKind {
                    state: end,
                    expected: "block end",
                });
            }
        }
    }

    for (loop_back_state, target) in loop_links {
        let is_plus = matches!(atn.state(loop_back_state).kind, StateKind::PlusLoopBack);
        match &mut atn.state_mut(target).kind {
            StateKind::BlockStart {
                kind: BlockKind::Plus { loop_back },
                ..
            } if is_plus => *loop_back = Some(loop_back_state),
            StateKind::StarLoopEntry { loop_back, .. } if !is_plus => {
                *loop_back = Some(loop_back_state)
            }
            _ => {}
        }
    }

    Ok(())
}

fn read_decisions(atn: &mut Atn, data: &SerializedAtn) -> Result<(), AtnError> {
    for &n in &data.decision_to_state {
        let number = state_ref(atn, n, "decision state")?;
        if !atn.state(number).is_decision_state() {
            return Err(AtnError::WrongStateKind {
                state: number,
                expected: "decision",
            });
        }
        atn.define_decision_state(number);
    }
    Ok(())
}

fn read_lexer_actions(
    atn: &mut Atn,
    data: &SerializedAtn,
    format: FormatId,
) -> Result<(), AtnError> {
    if atn.grammar_type != GrammarType::Lexer {
        return Ok(());
    }

    if format.supports(FormatId::ADDED_LEXER_ACTIONS) {
        for action in &data.lexer_actions {
            let a = unpack_absent(action.a);
            let b = unpack_absent(action.b);
            let decoded = LexerAction::from_code(action.action_type, a, b).ok_or(
                AtnError::InvalidLexerAction {
                    kind: action.action_type,
                    a,
                    b,
                },
            )?;
            atn.lexer_actions.push(decoded);
        }
        return Ok(());
    }

    // Older formats only have action edges; each becomes a custom action.
    let mut legacy = Vec::new();
    for number in 0..atn.num_states() {
        let Some(state) = atn.get(number) else {
            continue;
        };
        let mut rewrites = Vec::new();
        for (i, t) in state.transitions().iter().enumerate() {
            if let TransitionKind::Action {
                rule_index,
                action_index: Some(action_index),
                ..
            } = t.kind
            {
                rewrites.push((i, t.target, rule_index, action_index));
            }
        }
        for (i, target, rule_index, action_index) in rewrites {
            let replacement = Transition::new(
                target,
                TransitionKind::Action {
                    rule_index,
                    action_index: Some(legacy.len()),
                    ctx_dependent: false,
                },
            );
            atn.state_mut(number).set_transition(i, replacement);
            legacy.push(LexerAction::Custom {
                rule_index,
                action_index,
            });
        }
    }
    atn.lexer_actions = legacy;
    Ok(())
}

/// A star loop entry of a precedence rule whose exit branch leads straight
/// to the rule stop decides between looping and returning.
fn mark_precedence_decisions(atn: &mut Atn) {
    let mut marked = Vec::new();
    for state in atn.states() {
        if !matches!(state.kind, StateKind::StarLoopEntry { .. }) {
            continue;
        }
        let Some(rule) = state.rule_index else {
            continue;
        };
        if rule >= atn.num_rules() || !atn.is_precedence_rule(rule) {
            continue;
        }
        let Some(last) = state.transitions().last() else {
            continue;
        };
        if exits_to_rule_stop(atn, last.target) {
            marked.push(state.number);
        }
    }
    for number in marked {
        if let StateKind::StarLoopEntry {
            precedence_decision,
            ..
        } = &mut atn.state_mut(number).kind
        {
            *precedence_decision = true;
        }
    }
}

/// Is `state` a loop end whose only exit is epsilon into a rule stop?
pub(crate) fn exits_to_rule_stop(atn: &Atn, state: usize) -> bool {
    let Some(loop_end) = atn.get(state) else {
        return false;
    };
    matches!(loop_end.kind, StateKind::LoopEnd { .. })
        && loop_end.only_has_epsilon_transitions()
        && loop_end
            .transitions()
            .first()
            .is_some_and(|t| atn.get(t.target).is_some_and(|s| s.is_rule_stop()))
}

/// Resolves a serialized state reference, rejecting holes and out-of-range
/// numbers.
fn state_ref(atn: &Atn, n: i32, what: &'static str) -> Result<usize, AtnError> {
    usize::try_from(n)
        .ok()
        .filter(|&i| atn.get(i).is_some())
        .ok_or(AtnError::OutOfRange {
            what,
            index: i64::from(n),
        })
}

fn optional_index(v: i32) -> Option<usize> {
    if v == PACKED_ABSENT {
        return None;
    }
    usize::try_from(v).ok()
}

fn unpack_absent(v: i32) -> i32 {
    if v == PACKED_ABSENT { -1 } else { v }
}

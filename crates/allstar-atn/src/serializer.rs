//! Writes an [`Atn`] back into its dictionary form.
//!
//! Output always uses the current format id. Return edges out of rule stop
//! states are derived data and are not written; the deserializer rebuilds them.

use allstar_core::{IntervalSet, token};

use crate::atn::{Atn, GrammarType};
use crate::serialized::{
    FormatId, SERIALIZED_VERSION, SerializedAtn, SerializedEdge, SerializedLexerAction,
    SerializedRule, SerializedSet, SerializedState,
};
use crate::state::{AtnState, StateKind};
use crate::transition::{Transition, TransitionKind};

pub struct Serializer<'a> {
    atn: &'a Atn,
    /// Distinct set labels in first-use order.
    sets: Vec<IntervalSet>,
}

impl<'a> Serializer<'a> {
    pub fn new(atn: &'a Atn) -> Self {
        let mut sets: Vec<IntervalSet> = Vec::new();
        for state in atn.states() {
            for t in state.transitions() {
                if let TransitionKind::Set(set) | TransitionKind::NotSet(set) = &t.kind
                    && !sets.contains(set)
                {
                    sets.push(set.clone());
                }
            }
        }
        Self { atn, sets }
    }

    pub fn serialize(&self) -> SerializedAtn {
        let atn = self.atn;
        let interval_sets: Vec<SerializedSet> = self.sets.iter().map(serialize_set).collect();

        SerializedAtn {
            version: SERIALIZED_VERSION,
            uuid: FormatId::CURRENT.to_string(),
            grammar_type: atn.grammar_type.code(),
            max_token_type: atn.max_token_type,
            states: atn.slots().iter().map(|s| serialize_state(s.as_ref())).collect(),
            non_greedy_states: atn
                .states()
                .filter(|s| s.is_decision_state() && s.non_greedy)
                .map(|s| s.number as i32)
                .collect(),
            precedence_states: atn
                .states()
                .filter(|s| {
                    matches!(
                        s.kind,
                        StateKind::RuleStart {
                            is_left_recursive: true,
                            ..
                        }
                    )
                })
                .map(|s| s.number as i32)
                .collect(),
            rule_to_start_state: self.rules(),
            mode_to_start_state: atn.mode_to_start_state.iter().map(|&s| s as i32).collect(),
            nsets: interval_sets.len(),
            interval_sets,
            all_transitions_builder: self.edges(),
            decision_to_state: atn.decision_to_state.iter().map(|&s| s as i32).collect(),
            lexer_actions: self.lexer_actions(),
        }
    }

    fn rules(&self) -> Vec<SerializedRule> {
        let atn = self.atn;
        atn.rule_to_start_state
            .iter()
            .enumerate()
            .map(|(rule, &start)| {
                let rule_to_token_type = (atn.grammar_type == GrammarType::Lexer).then(|| {
                    match atn.rule_to_token_type.get(rule).copied() {
                        Some(token::EOF) | None => -1,
                        Some(t) => t,
                    }
                });
                SerializedRule {
                    state_number: start as i32,
                    rule_to_token_type,
                }
            })
            .collect()
    }

    fn edges(&self) -> Vec<Vec<SerializedEdge>> {
        self.atn
            .states()
            .filter(|s| !s.is_rule_stop())
            .map(|s| {
                s.transitions()
                    .iter()
                    .map(|t| self.serialize_edge(s.number, t))
                    .collect::<Vec<_>>()
            })
            .filter(|group| !group.is_empty())
            .collect()
    }

    fn serialize_edge(&self, src: usize, t: &Transition) -> SerializedEdge {
        let mut edge = SerializedEdge {
            src: src as i32,
            trg: t.target as i32,
            edge_type: t.code(),
            arg1: 0,
            arg2: 0,
            arg3: 0,
        };
        match &t.kind {
            TransitionKind::Epsilon { .. } | TransitionKind::Wildcard => {}
            TransitionKind::Range { from, to } => {
                if *from == token::EOF {
                    edge.arg3 = 1;
                } else {
                    edge.arg1 = *from;
                }
                edge.arg2 = *to;
            }
            TransitionKind::Rule {
                rule_index,
                precedence,
                follow_state,
            } => {
                edge.trg = *follow_state as i32;
                edge.arg1 = t.target as i32;
                edge.arg2 = *rule_index as i32;
                edge.arg3 = *precedence;
            }
            TransitionKind::Predicate {
                rule_index,
                pred_index,
                ctx_dependent,
            } => {
                edge.arg1 = *rule_index as i32;
                edge.arg2 = *pred_index as i32;
                edge.arg3 = i32::from(*ctx_dependent);
            }
            TransitionKind::Atom { label } => {
                if *label == token::EOF {
                    edge.arg3 = 1;
                } else {
                    edge.arg1 = *label;
                }
            }
            TransitionKind::Action {
                rule_index,
                action_index,
                ctx_dependent,
            } => {
                edge.arg1 = *rule_index as i32;
                edge.arg2 = action_index.map_or(-1, |a| a as i32);
                edge.arg3 = i32::from(*ctx_dependent);
            }
            TransitionKind::Set(set) | TransitionKind::NotSet(set) => {
                edge.arg1 = self.set_index(set);
            }
            TransitionKind::Precedence { precedence } => edge.arg1 = *precedence,
        }
        edge
    }

    fn set_index(&self, set: &IntervalSet) -> i32 {
        self.sets
            .iter()
            .position(|s| s == set)
            .map_or(-1, |i| i as i32)
    }

    fn lexer_actions(&self) -> Vec<SerializedLexerAction> {
        if self.atn.grammar_type != GrammarType::Lexer {
            return Vec::new();
        }
        self.atn
            .lexer_actions
            .iter()
            .map(|action| {
                let (action_type, a, b) = action.to_code();
                SerializedLexerAction { action_type, a, b }
            })
            .collect()
    }
}

/// Convenience for `Serializer::new(atn).serialize()`.
pub fn serialize(atn: &Atn) -> SerializedAtn {
    Serializer::new(atn).serialize()
}

fn serialize_state(state: Option<&AtnState>) -> SerializedState {
    let Some(state) = state else {
        return SerializedState {
            rule_index: -1,
            state_type: crate::state::code::INVALID,
            detail_state_number: None,
        };
    };
    let detail = match state.kind {
        StateKind::BlockStart { end_state, .. } => Some(end_state.map_or(-1, |s| s as i32)),
        StateKind::LoopEnd { loop_back } => Some(loop_back.map_or(-1, |s| s as i32)),
        _ => None,
    };
    SerializedState {
        rule_index: state.rule_index.map_or(-1, |r| r as i32),
        state_type: state.kind.code(),
        detail_state_number: detail,
    }
}

/// EOF travels as a flag; an interval starting at EOF is written from 0.
fn serialize_set(set: &IntervalSet) -> SerializedSet {
    let contains_eof = set.contains(token::EOF);
    let intervals: Vec<_> = set
        .intervals()
        .iter()
        .filter_map(|r| {
            if r.a != token::EOF {
                return Some(*r);
            }
            (r.b != token::EOF).then(|| allstar_core::Interval::new(0, r.b))
        })
        .collect();
    SerializedSet {
        size: intervals.len(),
        contains_eof: i32::from(contains_eof),
        intervals,
    }
}

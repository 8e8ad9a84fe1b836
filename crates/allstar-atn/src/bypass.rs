//! Rule bypass alternatives.
//!
//! Each parser rule gets an extra alternative that matches a single
//! synthetic token (`max_token_type + rule + 1`) standing in for the whole
//! rule. Tree pattern matchers use these to treat `<expr>` as one token.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::atn::Atn;
use crate::deserializer::{DeserializationOptions, Deserializer, exits_to_rule_stop};
use crate::error::AtnError;
use crate::serialized::SerializedAtn;
use crate::state::{BlockKind, StateKind};
use crate::transition::Transition;

pub(crate) fn generate_rule_bypass_transitions(atn: &mut Atn) -> Result<(), AtnError> {
    let num_rules = atn.num_rules();
    atn.rule_to_token_type = (0..num_rules)
        .map(|rule| atn.max_token_type + rule as i32 + 1)
        .collect();

    for rule in 0..num_rules {
        add_bypass(atn, rule)?;
    }
    Ok(())
}

fn add_bypass(atn: &mut Atn, rule: usize) -> Result<(), AtnError> {
    let bypass_start = atn.add_state(
        StateKind::BlockStart {
            kind: BlockKind::Basic,
            end_state: None,
        },
        Some(rule),
    );
    let bypass_stop = atn.add_state(
        StateKind::BlockEnd {
            start_state: Some(bypass_start),
        },
        Some(rule),
    );
    if let StateKind::BlockStart { end_state, .. } = &mut atn.state_mut(bypass_start).kind {
        *end_state = Some(bypass_stop);
    }
    atn.define_decision_state(bypass_start);

    // For a precedence rule the bypass ends where the primary prefix ends;
    // the loop-back into that point keeps its target.
    let (end_state, exclude) = if atn.is_precedence_rule(rule) {
        let entry = precedence_prefix_end(atn, rule).ok_or_else(|| {
            AtnError::IllegalState(format!(
                "couldn't identify final state of the precedence rule prefix section of rule {rule}"
            ))
        })?;
        let loop_back = atn.state(entry).loop_back_state().ok_or_else(|| {
            AtnError::IllegalState(format!("star loop entry {entry} has no loop-back"))
        })?;
        (entry, Some((loop_back, 0)))
    } else {
        (atn.rule_to_stop_state[rule], None)
    };

    for number in 0..atn.num_states() {
        let Some(state) = atn.get(number) else {
            continue;
        };
        let retarget: Vec<usize> = state
            .transitions()
            .iter()
            .enumerate()
            .filter(|&(i, t)| t.target == end_state && exclude != Some((number, i)))
            .map(|(i, _)| i)
            .collect();
        for i in retarget {
            let mut t = atn.state(number).transition(i).clone();
            t.target = bypass_stop;
            atn.state_mut(number).set_transition(i, t);
        }
    }

    let rule_start = atn.rule_to_start_state[rule];
    while let Some(t) = atn.state_mut(rule_start).remove_last_transition() {
        atn.state_mut(bypass_start).add_transition(t);
    }
    atn.state_mut(rule_start)
        .add_transition(Transition::epsilon(bypass_start));
    atn.state_mut(bypass_stop)
        .add_transition(Transition::epsilon(end_state));

    let match_state = atn.add_state(StateKind::Basic, Some(rule));
    let token_type = atn.rule_to_token_type[rule];
    atn.state_mut(match_state)
        .add_transition(Transition::atom(bypass_stop, token_type));
    atn.state_mut(bypass_start)
        .add_transition(Transition::epsilon(match_state));

    Ok(())
}

/// The star loop entry of `rule` whose exit branch leaves the rule.
fn precedence_prefix_end(atn: &Atn, rule: usize) -> Option<usize> {
    atn.states()
        .filter(|s| s.rule_index == Some(rule))
        .filter(|s| matches!(s.kind, StateKind::StarLoopEntry { .. }))
        .find(|s| {
            s.transitions()
                .last()
                .is_some_and(|t| exits_to_rule_stop(atn, t.target))
        })
        .map(|s| s.number)
}

/// Process-shared cache of ATNs deserialized with bypass alternatives,
/// keyed by their serialized form.
#[derive(Debug, Default)]
pub struct BypassAtnCache {
    atns: Mutex<HashMap<SerializedAtn, Arc<Atn>>>,
}

impl BypassAtnCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached bypass ATN for `serialized`, building it on first
    /// request.
    pub fn get_or_build(&self, serialized: &SerializedAtn) -> Result<Arc<Atn>, AtnError> {
        let mut atns = self.atns.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(atn) = atns.get(serialized) {
            return Ok(Arc::clone(atn));
        }
        let options = DeserializationOptions::default().with_rule_bypass_transitions(true);
        let atn = Arc::new(Deserializer::new(options).deserialize(serialized)?);
        atns.insert(serialized.clone(), Arc::clone(&atn));
        Ok(atn)
    }

    pub fn len(&self) -> usize {
        self.atns.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.atns
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

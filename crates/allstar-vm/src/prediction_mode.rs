//! Prediction modes and the conflict analysis they rely on.
//!
//! A conflict is a set of configs that share state and context but differ
//! in alternative: whatever follows, those alternatives see the same input.
//! SLL stops at the first conflict; LL keeps going until every conflicting
//! subset agrees on its minimum alternative.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use allstar_atn::Atn;

use crate::config_set::{AltSet, AtnConfigSet};
use crate::context::ContextRef;
use crate::semantic::SemanticContext;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PredictionMode {
    /// SLL only. Fastest; may report a syntax error where full LL would
    /// succeed.
    Sll,
    /// SLL first, full-context LL on conflict. Picks the minimum alternative
    /// of an ambiguity.
    #[default]
    Ll,
    /// Like `Ll`, but continues until an exact ambiguity is proven, so
    /// reported ambiguities are precise.
    LlExactAmbigDetection,
}

impl PredictionMode {
    pub fn name(self) -> &'static str {
        match self {
            PredictionMode::Sll => "sll",
            PredictionMode::Ll => "ll",
            PredictionMode::LlExactAmbigDetection => "ll-exact",
        }
    }
}

/// SLL termination heuristic: stop when every config reached a rule stop, or
/// when some alt subset conflicts and no state is owned by a single alt.
pub fn has_sll_conflict_terminating_prediction(
    atn: &Atn,
    mode: PredictionMode,
    configs: &AtnConfigSet,
) -> bool {
    if all_configs_in_rule_stop_states(atn, configs) {
        return true;
    }

    let altsets = if mode == PredictionMode::Sll && configs.has_semantic_context {
        // Predicates are evaluated after SLL; ignore them for conflict purposes.
        let mut stripped = AtnConfigSet::new(configs.full_ctx);
        for c in configs {
            let mut c = c.clone();
            c.semantic_context = SemanticContext::None;
            // The set is fresh and writable.
            let _ = stripped.add(c, None);
        }
        conflicting_alt_subsets(&stripped)
    } else {
        conflicting_alt_subsets(configs)
    };

    has_conflicting_alt_set(&altsets) && !has_state_associated_with_one_alt(configs)
}

pub fn has_config_in_rule_stop_state(atn: &Atn, configs: &AtnConfigSet) -> bool {
    configs.iter().any(|c| atn.state(c.state).is_rule_stop())
}

pub fn all_configs_in_rule_stop_states(atn: &Atn, configs: &AtnConfigSet) -> bool {
    configs.iter().all(|c| atn.state(c.state).is_rule_stop())
}

/// LL termination: the one alternative every subset would pick, if they agree.
pub fn resolves_to_just_one_viable_alt(altsets: &[AltSet]) -> Option<usize> {
    single_viable_alt(altsets)
}

pub fn all_subsets_conflict(altsets: &[AltSet]) -> bool {
    !has_non_conflicting_alt_set(altsets)
}

pub fn has_non_conflicting_alt_set(altsets: &[AltSet]) -> bool {
    altsets.iter().any(|alts| alts.len() == 1)
}

pub fn has_conflicting_alt_set(altsets: &[AltSet]) -> bool {
    altsets.iter().any(|alts| alts.len() > 1)
}

pub fn all_subsets_equal(altsets: &[AltSet]) -> bool {
    altsets.windows(2).all(|w| w[0] == w[1])
}

/// The only alternative across all subsets, if there is exactly one.
pub fn unique_alt(altsets: &[AltSet]) -> Option<usize> {
    let all = alts(altsets);
    if all.len() == 1 {
        all.first().copied()
    } else {
        None
    }
}

/// Union of all subsets.
pub fn alts(altsets: &[AltSet]) -> AltSet {
    altsets.iter().flatten().copied().collect()
}

/// Alternatives grouped by `(state, context)`, in first-seen order.
pub fn conflicting_alt_subsets(configs: &AtnConfigSet) -> Vec<AltSet> {
    let mut groups: IndexMap<(usize, ContextRef), AltSet> = IndexMap::new();
    for c in configs {
        groups
            .entry((c.state, c.context.clone()))
            .or_default()
            .insert(c.alt);
    }
    groups.into_values().collect()
}

/// Alternatives reaching each state.
pub fn state_to_alt_map(configs: &AtnConfigSet) -> FxHashMap<usize, AltSet> {
    let mut map: FxHashMap<usize, AltSet> = FxHashMap::default();
    for c in configs {
        map.entry(c.state).or_default().insert(c.alt);
    }
    map
}

pub fn has_state_associated_with_one_alt(configs: &AtnConfigSet) -> bool {
    state_to_alt_map(configs).values().any(|alts| alts.len() == 1)
}

/// The minimum alternative of each subset, if they all agree.
pub fn single_viable_alt(altsets: &[AltSet]) -> Option<usize> {
    let mut viable: Option<usize> = None;
    for alts in altsets {
        let min = alts.first().copied()?;
        match viable {
            None => viable = Some(min),
            Some(v) if v != min => return None,
            Some(_) => {}
        }
    }
    viable
}

//! Per-decision DFAs cached across predictions.

use std::fmt::Write as _;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use allstar_atn::Atn;
use allstar_core::{Vocabulary, token};
use allstar_core::utils::char_literal;
use rustc_hash::FxHashMap;

use crate::config_set::AtnConfigSet;
use crate::lexer_executor::LexerActionExecutor;
use crate::semantic::SemanticContext;

/// Where a DFA edge leads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DfaTarget {
    State(usize),
    /// No alternative survives this symbol.
    Error,
}

/// An alternative guarded by a predicate, checked in order at an accept state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PredPrediction {
    pub pred: SemanticContext,
    pub alt: usize,
}

#[derive(Clone, Debug)]
pub struct DfaState {
    pub number: usize,
    pub configs: Arc<AtnConfigSet>,
    pub edges: FxHashMap<i32, DfaTarget>,
    pub is_accept: bool,
    /// Predicted alternative (parser) or token type (lexer); 0 when the
    /// prediction depends on predicates.
    pub prediction: i32,
    pub lexer_action_executor: Option<Arc<LexerActionExecutor>>,
    /// SLL conflict: retry with full context before trusting `prediction`.
    pub requires_full_context: bool,
    pub predicates: Option<Vec<PredPrediction>>,
}

impl DfaState {
    pub fn new(configs: AtnConfigSet) -> Self {
        Self {
            number: usize::MAX,
            configs: configs.into_frozen(),
            edges: FxHashMap::default(),
            is_accept: false,
            prediction: 0,
            lexer_action_executor: None,
            requires_full_context: false,
            predicates: None,
        }
    }
}

#[derive(Debug)]
pub struct Dfa {
    pub decision: usize,
    /// Decision state (parser) or mode start state (lexer).
    pub atn_start_state: usize,
    states: Vec<DfaState>,
    index: FxHashMap<Arc<AtnConfigSet>, usize>,
    pub s0: Option<usize>,
    precedence_dfa: bool,
    precedence_starts: FxHashMap<i32, usize>,
}

impl Dfa {
    pub fn new(decision: usize, atn_start_state: usize, precedence_dfa: bool) -> Self {
        Self {
            decision,
            atn_start_state,
            states: Vec::new(),
            index: FxHashMap::default(),
            s0: None,
            precedence_dfa,
            precedence_starts: FxHashMap::default(),
        }
    }

    /// Precedence DFAs keep one start state per precedence level, since the
    /// precedence filter makes the start closure depend on it.
    pub fn is_precedence_dfa(&self) -> bool {
        self.precedence_dfa
    }

    pub fn precedence_start_state(&self, precedence: i32) -> Option<usize> {
        self.precedence_starts.get(&precedence).copied()
    }

    pub fn set_precedence_start_state(&mut self, precedence: i32, state: usize) {
        self.precedence_starts.insert(precedence, state);
    }

    /// Adds `state` unless one with equal configs exists; returns the number
    /// of the state kept.
    pub fn add_state(&mut self, mut state: DfaState) -> usize {
        if let Some(&existing) = self.index.get(&state.configs) {
            return existing;
        }
        let number = self.states.len();
        state.number = number;
        self.index.insert(Arc::clone(&state.configs), number);
        self.states.push(state);
        number
    }

    pub fn state(&self, number: usize) -> &DfaState {
        &self.states[number]
    }

    pub fn state_mut(&mut self, number: usize) -> &mut DfaState {
        &mut self.states[number]
    }

    pub fn states(&self) -> &[DfaState] {
        &self.states
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn edge(&self, from: usize, symbol: i32) -> Option<DfaTarget> {
        self.states[from].edges.get(&symbol).copied()
    }

    pub fn set_edge(&mut self, from: usize, symbol: i32, target: DfaTarget) {
        self.states[from].edges.insert(symbol, target);
    }

    pub fn clear(&mut self) {
        self.states.clear();
        self.index.clear();
        self.s0 = None;
        self.precedence_starts.clear();
    }

    /// Edges as `s0-X->:s1=>2` lines, labeled through `vocabulary`.
    pub fn to_string_with(&self, vocabulary: &Vocabulary) -> String {
        self.render(|symbol| vocabulary.display_name(symbol))
    }

    /// Edges as `s0-'a'->:s1=>2` lines for a lexer DFA.
    pub fn to_lexer_string(&self) -> String {
        self.render(|symbol| {
            if symbol == token::EOF {
                "EOF".to_string()
            } else {
                char_literal(symbol)
            }
        })
    }

    fn render(&self, label: impl Fn(i32) -> String) -> String {
        let mut out = String::new();
        for state in &self.states {
            let mut edges: Vec<_> = state.edges.iter().collect();
            edges.sort_by_key(|(symbol, _)| **symbol);
            for (&symbol, target) in edges {
                let DfaTarget::State(t) = *target else {
                    continue;
                };
                writeln!(
                    out,
                    "{}-{}->{}",
                    state_label(state),
                    label(symbol),
                    state_label(&self.states[t])
                )
                .unwrap();
            }
        }
        out
    }
}

fn state_label(state: &DfaState) -> String {
    let mut s = String::new();
    if state.is_accept {
        s.push(':');
    }
    write!(s, "s{}", state.number).unwrap();
    if state.requires_full_context {
        s.push('^');
    }
    if state.is_accept {
        match &state.predicates {
            Some(preds) => {
                let rendered: Vec<_> = preds
                    .iter()
                    .map(|p| format!("({}, {})", p.pred, p.alt))
                    .collect();
                write!(s, "=>[{}]", rendered.join(", ")).unwrap();
            }
            None => write!(s, "=>{}", state.prediction).unwrap(),
        }
    }
    s
}

/// One DFA per parser decision or lexer mode, each behind its own lock.
#[derive(Debug)]
pub struct DfaCache {
    dfas: Vec<RwLock<Dfa>>,
}

impl DfaCache {
    pub fn for_parser(atn: &Atn) -> Self {
        let dfas = atn
            .decision_to_state
            .iter()
            .enumerate()
            .map(|(decision, &state)| {
                let precedence = atn.state(state).is_precedence_decision();
                RwLock::new(Dfa::new(decision, state, precedence))
            })
            .collect();
        Self { dfas }
    }

    pub fn for_lexer(atn: &Atn) -> Self {
        let dfas = atn
            .mode_to_start_state
            .iter()
            .enumerate()
            .map(|(mode, &state)| RwLock::new(Dfa::new(mode, state, false)))
            .collect();
        Self { dfas }
    }

    pub fn len(&self) -> usize {
        self.dfas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dfas.is_empty()
    }

    pub fn read(&self, decision: usize) -> Option<RwLockReadGuard<'_, Dfa>> {
        let lock = self.dfas.get(decision)?;
        Some(lock.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn write(&self, decision: usize) -> Option<RwLockWriteGuard<'_, Dfa>> {
        let lock = self.dfas.get(decision)?;
        Some(lock.write().unwrap_or_else(PoisonError::into_inner))
    }

    /// Drops every cached state.
    pub fn reset(&self) {
        for lock in &self.dfas {
            lock.write().unwrap_or_else(PoisonError::into_inner).clear();
        }
    }

    /// Total number of DFA states across all decisions.
    pub fn num_states(&self) -> usize {
        self.dfas
            .iter()
            .map(|lock| lock.read().unwrap_or_else(PoisonError::into_inner).len())
            .sum()
    }
}

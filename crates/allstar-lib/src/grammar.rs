//! Everything a recognizer shares with the other recognizers of its grammar.

use std::sync::Arc;

use allstar_atn::{Atn, GrammarType};
use allstar_core::Vocabulary;
use allstar_vm::{DfaCache, PredictionContextCache};
use rustc_hash::FxHashMap;

/// A deserialized ATN with its names and its prediction caches.
///
/// Wrap it in an `Arc` and hand clones to each lexer or parser: they then
/// share the DFA and context caches and warm them for each other.
#[derive(Debug)]
pub struct Grammar {
    name: String,
    atn: Arc<Atn>,
    dfa: Arc<DfaCache>,
    context_cache: Arc<PredictionContextCache>,
    vocabulary: Vocabulary,
    rule_names: Vec<String>,
    rule_indices: FxHashMap<String, usize>,
    mode_names: Vec<String>,
}

impl Grammar {
    pub fn new(atn: Atn, vocabulary: Vocabulary) -> Self {
        let dfa = match atn.grammar_type {
            GrammarType::Lexer => DfaCache::for_lexer(&atn),
            GrammarType::Parser => DfaCache::for_parser(&atn),
        };
        let mode_names = (0..atn.mode_to_start_state.len())
            .map(|m| match m {
                0 => "DEFAULT_MODE".to_string(),
                m => format!("mode{m}"),
            })
            .collect();
        Self {
            name: "<grammar>".to_string(),
            atn: Arc::new(atn),
            dfa: Arc::new(dfa),
            context_cache: Arc::new(PredictionContextCache::new()),
            vocabulary,
            rule_names: Vec::new(),
            rule_indices: FxHashMap::default(),
            mode_names,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_rule_names<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.rule_names = names.into_iter().map(Into::into).collect();
        self.rule_indices = self
            .rule_names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        self
    }

    pub fn with_mode_names<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.mode_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn grammar_type(&self) -> GrammarType {
        self.atn.grammar_type
    }

    pub fn atn(&self) -> &Arc<Atn> {
        &self.atn
    }

    pub fn dfa(&self) -> &Arc<DfaCache> {
        &self.dfa
    }

    pub fn context_cache(&self) -> &Arc<PredictionContextCache> {
        &self.context_cache
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn rule_names(&self) -> &[String] {
        &self.rule_names
    }

    pub fn mode_names(&self) -> &[String] {
        &self.mode_names
    }

    /// Name of rule `rule_index`, or the index when the grammar has no names.
    pub fn rule_name(&self, rule_index: usize) -> String {
        self.rule_names
            .get(rule_index)
            .cloned()
            .unwrap_or_else(|| rule_index.to_string())
    }

    pub fn rule_index(&self, name: &str) -> Option<usize> {
        self.rule_indices.get(name).copied()
    }

    pub fn mode_index(&self, name: &str) -> Option<usize> {
        self.mode_names.iter().position(|n| n == name)
    }

    /// Drops every cached DFA state and prediction context.
    pub fn clear_dfa(&self) {
        self.dfa.reset();
        self.context_cache.clear();
    }
}

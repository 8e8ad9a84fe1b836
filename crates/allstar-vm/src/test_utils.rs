//! Minimal streams and recording hosts for simulator tests.

use allstar_core::{CharStream, IntStream, Interval, token};

use crate::config_set::{AltSet, AtnConfigSet};
use crate::error::PredictionError;
use crate::host::{LexerActionHost, LexerHost, PredictionHost};

/// Symbol stream over a fixed buffer; reads past the end yield EOF.
#[derive(Debug, Default)]
pub struct Symbols {
    data: Vec<i32>,
    p: usize,
}

impl Symbols {
    pub fn chars(text: &str) -> Self {
        Self {
            data: text.chars().map(|c| c as i32).collect(),
            p: 0,
        }
    }

    pub fn tokens(types: &[i32]) -> Self {
        Self {
            data: types.to_vec(),
            p: 0,
        }
    }
}

impl IntStream for Symbols {
    fn consume(&mut self) {
        if self.p < self.data.len() {
            self.p += 1;
        }
    }

    fn la(&mut self, i: isize) -> i32 {
        let at = match i {
            0 => return 0,
            i if i > 0 => self.p as isize + i - 1,
            i => self.p as isize + i,
        };
        usize::try_from(at)
            .ok()
            .and_then(|at| self.data.get(at))
            .copied()
            .unwrap_or(token::EOF)
    }

    fn mark(&mut self) -> isize {
        -1
    }

    fn release(&mut self, _marker: isize) {}

    fn index(&self) -> usize {
        self.p
    }

    fn seek(&mut self, index: usize) {
        self.p = index.min(self.data.len());
    }

    fn size(&self) -> usize {
        self.data.len()
    }
}

impl CharStream for Symbols {
    fn text(&self, interval: Interval) -> String {
        let start = interval.a.max(0) as usize;
        let stop = (interval.b + 1).max(0) as usize;
        self.data
            .get(start..stop.min(self.data.len()))
            .unwrap_or_default()
            .iter()
            .filter_map(|&c| char::from_u32(c as u32))
            .collect()
    }
}

/// Lexer host that records the actions it receives.
#[derive(Debug, Default)]
pub struct RecordingLexer {
    pub events: Vec<String>,
    pub modes: Vec<usize>,
    /// Predicate results by `(rule, pred)`; unlisted predicates pass.
    pub failing_preds: Vec<(usize, usize)>,
}

impl LexerActionHost for RecordingLexer {
    fn skip(&mut self) {
        self.events.push("skip".to_string());
    }

    fn more(&mut self) {
        self.events.push("more".to_string());
    }

    fn set_type(&mut self, token_type: i32) {
        self.events.push(format!("type {token_type}"));
    }

    fn set_channel(&mut self, channel: i32) {
        self.events.push(format!("channel {channel}"));
    }

    fn set_mode(&mut self, mode: usize) {
        self.events.push(format!("mode {mode}"));
    }

    fn push_mode(&mut self, mode: usize) {
        self.events.push(format!("push {mode}"));
        self.modes.push(mode);
    }

    fn pop_mode(&mut self) -> Result<(), PredictionError> {
        self.events.push("pop".to_string());
        self.modes.pop().map(|_| ()).ok_or(PredictionError::EmptyModeStack)
    }
}

impl LexerHost for RecordingLexer {
    fn sempred(&mut self, rule_index: usize, pred_index: usize) -> bool {
        !self.failing_preds.contains(&(rule_index, pred_index))
    }
}

/// Parser host that records prediction diagnostics.
#[derive(Debug, Default)]
pub struct RecordingParser {
    pub precedence: i32,
    pub full_context: Vec<(usize, Option<AltSet>)>,
    pub context_sensitivities: Vec<(usize, usize)>,
    pub ambiguities: Vec<(usize, AltSet, bool)>,
}

impl PredictionHost for RecordingParser {
    fn precedence(&self) -> i32 {
        self.precedence
    }

    fn report_attempting_full_context(
        &mut self,
        decision: usize,
        conflicting_alts: Option<&AltSet>,
        _configs: &AtnConfigSet,
        _start_index: usize,
        _stop_index: usize,
    ) {
        self.full_context.push((decision, conflicting_alts.cloned()));
    }

    fn report_context_sensitivity(
        &mut self,
        decision: usize,
        prediction: usize,
        _configs: &AtnConfigSet,
        _start_index: usize,
        _stop_index: usize,
    ) {
        self.context_sensitivities.push((decision, prediction));
    }

    fn report_ambiguity(
        &mut self,
        decision: usize,
        _start_index: usize,
        _stop_index: usize,
        exact: bool,
        ambig_alts: &AltSet,
        _configs: &AtnConfigSet,
    ) {
        self.ambiguities.push((decision, ambig_alts.clone(), exact));
    }
}

//! Char-packed encoding.
//!
//! Layout (every word after the version is stored `+2`, modulo 2^16):
//!
//! ```text
//! version  uuid[8]  grammar-type  max-token-type
//! nstates  { type [rule-index [detail]] }*
//! n        { non-greedy state }*
//! n        { precedence rule start }*        (ADDED_PRECEDENCE_TRANSITIONS+)
//! nrules   { start-state [token-type [legacy-action]] }*
//! nmodes   { start-state }*
//! nsets    { nintervals contains-eof { a b }* }*
//! nedges   { src trg type arg1 arg2 arg3 }*
//! ndecs    { state }*
//! n        { type a b }*                     (lexer, ADDED_LEXER_ACTIONS+)
//! ```
//!
//! `0xFFFF` encodes `-1` in fields that may be absent.

use allstar_core::Interval;

use super::{
    FormatId, SERIALIZED_VERSION, SerializedAtn, SerializedEdge, SerializedLexerAction,
    SerializedRule, SerializedSet, SerializedState,
};
use crate::atn::GrammarType;
use crate::error::AtnError;
use crate::state::code as state_code;
use crate::transition::code as edge_code;

const ABSENT: u16 = 0xFFFF;

/// Decodes the char-packed form.
pub fn decode(words: &[u16]) -> Result<SerializedAtn, AtnError> {
    let mut r = Reader { words, pos: 0 };

    let version = i32::from(r.raw()?);
    if version != SERIALIZED_VERSION {
        return Err(AtnError::UnsupportedVersion {
            found: version,
            expected: SERIALIZED_VERSION,
        });
    }

    let mut id_words = [0u16; 8];
    for w in &mut id_words {
        *w = r.word()?;
    }
    let format = FormatId::from_words(id_words);
    if !format.is_supported() {
        return Err(AtnError::UnsupportedUuid(format));
    }
    let has_precedence = format.supports(FormatId::ADDED_PRECEDENCE_TRANSITIONS);
    let has_lexer_actions = format.supports(FormatId::ADDED_LEXER_ACTIONS);

    let grammar_type = r.int()?;
    let is_lexer = grammar_type == GrammarType::Lexer.code();
    let max_token_type = r.int()?;

    let nstates = r.count()?;
    let mut states = Vec::with_capacity(nstates);
    for _ in 0..nstates {
        let state_type = r.int()?;
        if state_type == state_code::INVALID {
            states.push(SerializedState {
                rule_index: -1,
                state_type,
                detail_state_number: None,
            });
            continue;
        }
        let rule_index = r.opt()?;
        let detail_state_number = if has_detail(state_type) {
            Some(r.int()?)
        } else {
            None
        };
        states.push(SerializedState {
            rule_index,
            state_type,
            detail_state_number,
        });
    }

    let non_greedy_states = r.list()?;
    let precedence_states = if has_precedence {
        r.list()?
    } else {
        Vec::new()
    };

    let nrules = r.count()?;
    let mut rule_to_start_state = Vec::with_capacity(nrules);
    for _ in 0..nrules {
        let state_number = r.int()?;
        let mut rule_to_token_type = None;
        if is_lexer {
            rule_to_token_type = Some(r.opt()?);
            if !has_lexer_actions {
                r.opt()?;
            }
        }
        rule_to_start_state.push(SerializedRule {
            state_number,
            rule_to_token_type,
        });
    }

    let mode_to_start_state = r.list()?;

    let nsets = r.count()?;
    let mut interval_sets = Vec::with_capacity(nsets);
    for _ in 0..nsets {
        let size = r.count()?;
        let contains_eof = r.int()?;
        let mut intervals = Vec::with_capacity(size);
        for _ in 0..size {
            let a = r.int()?;
            let b = r.int()?;
            intervals.push(Interval::new(a, b));
        }
        interval_sets.push(SerializedSet {
            size,
            contains_eof,
            intervals,
        });
    }

    let nedges = r.count()?;
    let mut all_transitions_builder: Vec<Vec<SerializedEdge>> = Vec::new();
    for _ in 0..nedges {
        let src = r.int()?;
        let trg = r.int()?;
        let edge_type = r.int()?;
        let arg1 = r.int()?;
        let arg2 = if edge_type == edge_code::ACTION {
            r.opt()?
        } else {
            r.int()?
        };
        let arg3 = r.int()?;
        let edge = SerializedEdge {
            src,
            trg,
            edge_type,
            arg1,
            arg2,
            arg3,
        };
        match all_transitions_builder.last_mut() {
            Some(group) if group.last().is_some_and(|e| e.src == src) => group.push(edge),
            _ => all_transitions_builder.push(vec![edge]),
        }
    }

    let decision_to_state = r.list()?;

    let mut lexer_actions = Vec::new();
    if is_lexer && has_lexer_actions {
        let n = r.count()?;
        for _ in 0..n {
            let action_type = r.int()?;
            let a = r.opt()?;
            let b = r.opt()?;
            lexer_actions.push(SerializedLexerAction { action_type, a, b });
        }
    }

    Ok(SerializedAtn {
        version,
        uuid: format.to_string(),
        grammar_type,
        max_token_type,
        states,
        non_greedy_states,
        precedence_states,
        rule_to_start_state,
        mode_to_start_state,
        nsets,
        interval_sets,
        all_transitions_builder,
        decision_to_state,
        lexer_actions,
    })
}

/// Encodes into the char-packed form, using the layout of the format named
/// by `atn.uuid`. Values that do not fit 16 bits are rejected.
pub fn encode(atn: &SerializedAtn) -> Result<Vec<u16>, AtnError> {
    let format = atn.format_id()?;
    if !format.is_supported() {
        return Err(AtnError::UnsupportedUuid(format));
    }
    let has_precedence = format.supports(FormatId::ADDED_PRECEDENCE_TRANSITIONS);
    let has_lexer_actions = format.supports(FormatId::ADDED_LEXER_ACTIONS);
    let is_lexer = atn.grammar_type == GrammarType::Lexer.code();

    let mut w = Writer::default();
    w.push(atn.version)?;
    w.words.extend_from_slice(&format.to_words());
    w.push(atn.grammar_type)?;
    w.push(atn.max_token_type)?;

    w.len(atn.states.len())?;
    for s in &atn.states {
        w.push(s.state_type)?;
        if s.state_type == state_code::INVALID {
            continue;
        }
        w.push(s.rule_index)?;
        if has_detail(s.state_type) {
            w.push(s.detail_state_number.unwrap_or(-1))?;
        }
    }

    w.list(&atn.non_greedy_states)?;
    if has_precedence {
        w.list(&atn.precedence_states)?;
    }

    w.len(atn.rule_to_start_state.len())?;
    for rule in &atn.rule_to_start_state {
        w.push(rule.state_number)?;
        if is_lexer {
            w.push(rule.rule_to_token_type.unwrap_or(0))?;
            if !has_lexer_actions {
                w.push(-1)?;
            }
        }
    }

    w.list(&atn.mode_to_start_state)?;

    let sets = atn.interval_sets.iter().take(atn.nsets);
    w.len(atn.nsets.min(atn.interval_sets.len()))?;
    for set in sets {
        w.len(set.intervals.len())?;
        w.push(set.contains_eof)?;
        for interval in &set.intervals {
            w.push(interval.a)?;
            w.push(interval.b)?;
        }
    }

    w.len(atn.edges().count())?;
    for e in atn.edges() {
        for v in [e.src, e.trg, e.edge_type, e.arg1, e.arg2, e.arg3] {
            w.push(v)?;
        }
    }

    w.list(&atn.decision_to_state)?;

    if is_lexer && has_lexer_actions {
        w.len(atn.lexer_actions.len())?;
        for action in &atn.lexer_actions {
            w.push(action.action_type)?;
            w.push(action.a)?;
            w.push(action.b)?;
        }
    }

    let mut words = w.words;
    for word in words.iter_mut().skip(1) {
        *word = word.wrapping_add(2);
    }
    Ok(words)
}

/// Block starts carry their end state; loop ends carry their loop-back state.
fn has_detail(state_type: i32) -> bool {
    matches!(
        state_type,
        state_code::BLOCK_START
            | state_code::PLUS_BLOCK_START
            | state_code::STAR_BLOCK_START
            | state_code::LOOP_END
    )
}

struct Reader<'a> {
    words: &'a [u16],
    pos: usize,
}

impl Reader<'_> {
    /// The next word as stored, without the `+2` adjustment.
    fn raw(&mut self) -> Result<u16, AtnError> {
        let w = *self
            .words
            .get(self.pos)
            .ok_or(AtnError::Truncated { offset: self.pos })?;
        self.pos += 1;
        Ok(w)
    }

    fn word(&mut self) -> Result<u16, AtnError> {
        self.raw().map(|w| w.wrapping_sub(2))
    }

    fn int(&mut self) -> Result<i32, AtnError> {
        self.word().map(i32::from)
    }

    /// A field where `0xFFFF` means absent.
    fn opt(&mut self) -> Result<i32, AtnError> {
        self.word()
            .map(|w| if w == ABSENT { -1 } else { i32::from(w) })
    }

    fn count(&mut self) -> Result<usize, AtnError> {
        self.word().map(usize::from)
    }

    fn list(&mut self) -> Result<Vec<i32>, AtnError> {
        let n = self.count()?;
        (0..n).map(|_| self.int()).collect()
    }
}

#[derive(Default)]
struct Writer {
    words: Vec<u16>,
}

impl Writer {
    fn push(&mut self, v: i32) -> Result<(), AtnError> {
        let word = match v {
            -1 => ABSENT,
            0..=0xFFFF => v as u16,
            _ => {
                return Err(AtnError::Unsupported(format!(
                    "value {v} does not fit the char-packed form"
                )));
            }
        };
        self.words.push(word);
        Ok(())
    }

    fn len(&mut self, n: usize) -> Result<(), AtnError> {
        let v = i32::try_from(n).unwrap_or(i32::MAX);
        self.push(v)
    }

    fn list(&mut self, values: &[i32]) -> Result<(), AtnError> {
        self.len(values.len())?;
        values.iter().try_for_each(|&v| self.push(v))
    }
}

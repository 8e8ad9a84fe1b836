//! Syntax error reporting and recovery.
//!
//! [`DefaultErrorStrategy`] reports the first error of a run and then stays
//! quiet until a token matches again. It repairs single-token mistakes
//! inline (deleting an extra token or conjuring a missing one) and
//! otherwise resynchronizes by skipping to a token that can follow one of
//! the rules on the invocation stack.

use allstar_atn::StateKind;
use allstar_core::{IntStream, IntervalSet, token};

use crate::error::{Error, RecognitionError, Result};
use crate::parser::Parser;
use crate::token::Token;
use crate::tree::NodeId;

pub trait ErrorStrategy {
    /// Forgets all recovery state; called when the parser is reset.
    fn reset(&mut self, parser: &mut Parser);

    /// Repairs a mismatch at a token match. Returns the token that stands
    /// in for the expected one: either the real next token or a conjured
    /// one with no stream index.
    fn recover_inline(&mut self, parser: &mut Parser) -> Result<Token>;

    /// Resynchronizes after `error` so the enclosing rule can return.
    fn recover(&mut self, parser: &mut Parser, error: &RecognitionError) -> Result<()>;

    /// Checks the lookahead before a decision or loop iteration, and
    /// consumes tokens that cannot start anything here.
    fn sync(&mut self, parser: &mut Parser) -> Result<()>;

    fn in_error_recovery_mode(&self, parser: &Parser) -> bool {
        parser.in_error_recovery_mode()
    }

    /// A token matched: leave recovery mode.
    fn report_match(&mut self, parser: &mut Parser);

    fn report_error(&mut self, parser: &mut Parser, error: &RecognitionError);
}

#[derive(Clone, Debug, Default)]
pub struct DefaultErrorStrategy {
    /// Input index of the last `recover`.
    last_error_index: Option<usize>,
    /// States `recover` was called in at `last_error_index`.
    last_error_states: IntervalSet,
    /// State and context of the last `sync` that could see past the end of
    /// its rule, for a better error if a match fails later in the rule.
    next_tokens: Option<(usize, Option<NodeId>)>,
}

impl DefaultErrorStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    fn begin_error_condition(&mut self, parser: &mut Parser) {
        parser.set_error_recovery_mode(true);
    }

    fn end_error_condition(&mut self, parser: &mut Parser) {
        parser.set_error_recovery_mode(false);
        self.last_error_states = IntervalSet::new();
        self.last_error_index = None;
    }

    fn report_no_viable_alternative(
        &mut self,
        parser: &mut Parser,
        error: &RecognitionError,
        start_token: &Token,
        offending_token: &Token,
    ) {
        let input = if start_token.is_eof() {
            "<EOF>".to_string()
        } else {
            parser.input().text_between(start_token, offending_token)
        };
        let message = format!("no viable alternative at input {}", quote(&input));
        parser.notify_error_listeners(offending_token, &message, Some(error));
    }

    fn report_input_mismatch(
        &mut self,
        parser: &mut Parser,
        error: &RecognitionError,
        offending_token: &Token,
        expected: &IntervalSet,
    ) {
        let message = format!(
            "mismatched input {} expecting {}",
            token_display(offending_token),
            expected.to_string_with(parser.grammar().vocabulary())
        );
        parser.notify_error_listeners(offending_token, &message, Some(error));
    }

    fn report_failed_predicate(
        &mut self,
        parser: &mut Parser,
        error: &RecognitionError,
        offending_token: &Token,
    ) {
        let rule = parser
            .ctx()
            .and_then(|ctx| parser.tree().rule(ctx))
            .map(|r| parser.grammar().rule_name(r.rule_index))
            .unwrap_or_default();
        let message = format!("rule {rule} {error}");
        parser.notify_error_listeners(offending_token, &message, Some(error));
    }

    /// Reports the current token as extra.
    fn report_unwanted_token(&mut self, parser: &mut Parser) {
        if parser.in_error_recovery_mode() {
            return;
        }
        self.begin_error_condition(parser);
        let t = parser.current_token();
        let expecting = parser.expected_tokens();
        let message = format!(
            "extraneous input {} expecting {}",
            token_display(&t),
            expecting.to_string_with(parser.grammar().vocabulary())
        );
        parser.notify_error_listeners(&t, &message, None);
    }

    /// Reports the expected token as absent before the current one.
    fn report_missing_token(&mut self, parser: &mut Parser) {
        if parser.in_error_recovery_mode() {
            return;
        }
        self.begin_error_condition(parser);
        let t = parser.current_token();
        let expecting = parser.expected_tokens();
        let message = format!(
            "missing {} at {}",
            expecting.to_string_with(parser.grammar().vocabulary()),
            token_display(&t)
        );
        parser.notify_error_listeners(&t, &message, None);
    }

    /// If the token after the current one is what the parser expects,
    /// reports and drops the current token and returns the expected one.
    fn single_token_deletion(&mut self, parser: &mut Parser) -> Option<Token> {
        let next = parser.input_mut().la(2);
        if !parser.expected_tokens().contains(next) {
            return None;
        }
        self.report_unwanted_token(parser);
        parser.consume();
        let matched = parser.current_token();
        self.report_match(parser);
        Some(matched)
    }

    /// If the current token could follow the expected one, reports the
    /// expected one as missing.
    fn single_token_insertion(&mut self, parser: &mut Parser) -> bool {
        let current = parser.input_mut().la(1);
        let Some(state) = parser.state() else {
            return false;
        };
        let atn = parser.atn();
        let Some(next) = atn.state(state).transitions().first().map(|t| t.target) else {
            return false;
        };
        let invoking = parser.invoking_states(parser.ctx());
        let expecting_at_ll2 = atn.next_tokens_in_context(next, &invoking);
        if expecting_at_ll2.contains(current) {
            self.report_missing_token(parser);
            return true;
        }
        false
    }

    /// Conjures the expected token, positioned at the current token (or
    /// the previous one when at EOF).
    fn missing_symbol(&self, parser: &mut Parser) -> Token {
        let expected = parser
            .expected_tokens()
            .min_element()
            .unwrap_or(token::INVALID_TYPE);
        let text = if expected == token::EOF {
            "<missing EOF>".to_string()
        } else {
            format!(
                "<missing {}>",
                parser.grammar().vocabulary().display_name(expected)
            )
        };
        let mut position = parser.current_token();
        if position.is_eof() {
            if let Some(lookback) = parser.input_mut().lt(-1) {
                position = lookback.clone();
            }
        }
        Token::new(expected, text).with_position(position.line, position.column)
    }

    /// Union of the follow sets of every rule on the invocation stack.
    fn error_recovery_set(&self, parser: &Parser) -> IntervalSet {
        let atn = parser.atn();
        let mut recover_set = IntervalSet::new();
        for invoking in parser.invoking_states(parser.ctx()) {
            let follow = atn.next_tokens(atn.follow_state_of(invoking));
            recover_set = recover_set.or(follow);
        }
        recover_set.subtract(&IntervalSet::of(token::EPSILON))
    }

    fn consume_until(&self, parser: &mut Parser, set: &IntervalSet) {
        let mut ttype = parser.input_mut().la(1);
        while ttype != token::EOF && !set.contains(ttype) {
            parser.consume();
            ttype = parser.input_mut().la(1);
        }
    }
}

impl ErrorStrategy for DefaultErrorStrategy {
    fn reset(&mut self, parser: &mut Parser) {
        self.end_error_condition(parser);
    }

    fn recover_inline(&mut self, parser: &mut Parser) -> Result<Token> {
        if let Some(matched) = self.single_token_deletion(parser) {
            parser.consume();
            return Ok(matched);
        }
        if self.single_token_insertion(parser) {
            return Ok(self.missing_symbol(parser));
        }
        Err(parser.input_mismatch(self.next_tokens).into())
    }

    fn recover(&mut self, parser: &mut Parser, _error: &RecognitionError) -> Result<()> {
        let index = parser.input().index();
        let state = parser.state().map_or(-1, |s| s as i32);
        if self.last_error_index == Some(index) && self.last_error_states.contains(state) {
            // recovered here before without progress: force some
            parser.consume();
        }
        self.last_error_index = Some(parser.input().index());
        self.last_error_states = self.last_error_states.or(&IntervalSet::of(state));
        let follow = self.error_recovery_set(parser);
        self.consume_until(parser, &follow);
        Ok(())
    }

    fn sync(&mut self, parser: &mut Parser) -> Result<()> {
        if parser.in_error_recovery_mode() {
            return Ok(());
        }
        let Some(state) = parser.state() else {
            return Ok(());
        };
        let la = parser.input_mut().la(1);
        let next_tokens = parser.atn().next_tokens(state);
        if next_tokens.contains(la) {
            self.next_tokens = None;
            return Ok(());
        }
        if next_tokens.contains(token::EPSILON) {
            if self.next_tokens.is_none() {
                self.next_tokens = Some((state, parser.ctx()));
            }
            return Ok(());
        }

        let kind = parser.atn().state(state).kind;
        match kind {
            StateKind::BlockStart { .. } | StateKind::StarLoopEntry { .. } => {
                if self.single_token_deletion(parser).is_some() {
                    return Ok(());
                }
                Err(parser.input_mismatch(None).into())
            }
            StateKind::PlusLoopBack | StateKind::StarLoopBack => {
                self.report_unwanted_token(parser);
                let expecting = parser.expected_tokens();
                let follow = expecting.or(&self.error_recovery_set(parser));
                self.consume_until(parser, &follow);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn report_match(&mut self, parser: &mut Parser) {
        self.end_error_condition(parser);
    }

    fn report_error(&mut self, parser: &mut Parser, error: &RecognitionError) {
        if parser.in_error_recovery_mode() {
            return;
        }
        self.begin_error_condition(parser);
        match error {
            RecognitionError::NoViableAlt {
                start_token,
                offending_token,
                ..
            } => self.report_no_viable_alternative(parser, error, start_token, offending_token),
            RecognitionError::InputMismatch {
                offending_token,
                expected,
                ..
            } => self.report_input_mismatch(parser, error, offending_token, expected),
            RecognitionError::FailedPredicate {
                offending_token, ..
            } => self.report_failed_predicate(parser, error, offending_token),
            RecognitionError::LexerNoViableAlt { .. } => {
                let t = parser.current_token();
                parser.notify_error_listeners(&t, &error.to_string(), Some(error));
            }
        }
    }
}

/// Gives up at the first syntax error.
///
/// Every context on the invocation stack records the error, and the parse
/// fails with [`Error::Cancelled`]. Errors reported before recovery are
/// formatted like the default strategy's; inline mismatches cancel
/// without a report.
#[derive(Clone, Debug, Default)]
pub struct BailErrorStrategy {
    inner: DefaultErrorStrategy,
}

impl BailErrorStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    fn cancel(&self, parser: &mut Parser, error: RecognitionError) -> Error {
        let mut ctx = parser.ctx();
        while let Some(c) = ctx {
            if let Some(rule) = parser.tree_mut().rule_mut(c) {
                rule.exception = Some(error.clone());
            }
            ctx = parser.tree().parent(c);
        }
        Error::Cancelled(error)
    }
}

impl ErrorStrategy for BailErrorStrategy {
    fn reset(&mut self, parser: &mut Parser) {
        self.inner.reset(parser);
    }

    fn recover_inline(&mut self, parser: &mut Parser) -> Result<Token> {
        let error = parser.input_mismatch(None);
        Err(self.cancel(parser, error))
    }

    fn recover(&mut self, parser: &mut Parser, error: &RecognitionError) -> Result<()> {
        Err(self.cancel(parser, error.clone()))
    }

    fn sync(&mut self, _parser: &mut Parser) -> Result<()> {
        Ok(())
    }

    fn report_match(&mut self, parser: &mut Parser) {
        self.inner.report_match(parser);
    }

    fn report_error(&mut self, parser: &mut Parser, error: &RecognitionError) {
        self.inner.report_error(parser, error);
    }
}

/// `'text'` with control whitespace escaped.
fn quote(s: &str) -> String {
    let escaped = s
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t");
    format!("'{escaped}'")
}

fn token_display(t: &Token) -> String {
    quote(&t.text)
}

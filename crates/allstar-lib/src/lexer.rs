//! Tokenizes a character stream by running a lexer ATN.

use std::sync::Arc;

use allstar_atn::GrammarType;
use allstar_core::utils::escape_whitespace;
use allstar_core::{CharStream, IntStream, Interval, token};
use allstar_vm::{LexerActionHost, LexerAtnSimulator, LexerHost, NoopTracer, PredictionError, Tracer};

use crate::error::{Error, RecognitionError, Result};
use crate::error_listener::{ConsoleErrorListener, ErrorListener};
use crate::grammar::Grammar;
use crate::input_stream::InputStream;
use crate::token::{EOF_TEXT, Token};
use crate::token_source::TokenSource;

/// How the last match ends the token under construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MatchOutcome {
    #[default]
    Token,
    /// Drop the text and start a new token (`-> skip`).
    Skip,
    /// Keep the text and keep matching into the same token (`-> more`).
    More,
}

/// Hooks for predicates and actions embedded in lexer rules.
pub trait LexerCallbacks {
    fn sempred(&mut self, _state: &LexerState, _rule_index: usize, _pred_index: usize) -> bool {
        true
    }

    fn action(&mut self, _state: &mut LexerState, _rule_index: usize, _action_index: usize) {}
}

/// Accepts every predicate and ignores every action.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoCallbacks;

impl LexerCallbacks for NoCallbacks {}

/// The token being built and the mode stack.
#[derive(Clone, Debug, Default)]
pub struct LexerState {
    outcome: MatchOutcome,
    token_type: Option<i32>,
    channel: i32,
    text: Option<String>,
    mode: usize,
    mode_stack: Vec<usize>,
    hit_eof: bool,
    token_start: usize,
    token_start_line: usize,
    token_start_column: usize,
}

impl LexerState {
    pub fn skip(&mut self) {
        self.outcome = MatchOutcome::Skip;
    }

    pub fn more(&mut self) {
        self.outcome = MatchOutcome::More;
    }

    pub fn outcome(&self) -> MatchOutcome {
        self.outcome
    }

    /// Overrides the type of the token being built.
    pub fn set_type(&mut self, token_type: i32) {
        self.token_type = Some(token_type);
    }

    pub fn token_type(&self) -> Option<i32> {
        self.token_type
    }

    pub fn set_channel(&mut self, channel: i32) {
        self.channel = channel;
    }

    pub fn channel(&self) -> i32 {
        self.channel
    }

    /// Overrides the text of the token being built.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn mode(&self) -> usize {
        self.mode
    }

    pub fn set_mode(&mut self, mode: usize) {
        self.mode = mode;
    }

    pub fn push_mode(&mut self, mode: usize) {
        self.mode_stack.push(self.mode);
        self.mode = mode;
    }

    /// Returns to the mode below the top of the stack.
    pub fn pop_mode(&mut self) -> Result<usize> {
        self.pop().ok_or(Error::EmptyModeStack)
    }

    fn pop(&mut self) -> Option<usize> {
        self.mode = self.mode_stack.pop()?;
        Some(self.mode)
    }

    pub fn mode_stack(&self) -> &[usize] {
        &self.mode_stack
    }

    /// Char index where the current token starts.
    pub fn token_start(&self) -> usize {
        self.token_start
    }

    pub fn token_start_line(&self) -> usize {
        self.token_start_line
    }

    pub fn token_start_column(&self) -> usize {
        self.token_start_column
    }

    fn begin_token(&mut self, index: usize, line: usize, column: usize) {
        self.token_start = index;
        self.token_start_line = line;
        self.token_start_column = column;
        self.channel = token::DEFAULT_CHANNEL;
        self.text = None;
    }
}

/// View of the lexer handed to the simulator while it matches.
struct Host<'a> {
    state: &'a mut LexerState,
    callbacks: &'a mut dyn LexerCallbacks,
}

impl LexerActionHost for Host<'_> {
    fn skip(&mut self) {
        self.state.skip();
    }

    fn more(&mut self) {
        self.state.more();
    }

    fn set_type(&mut self, token_type: i32) {
        self.state.set_type(token_type);
    }

    fn set_channel(&mut self, channel: i32) {
        self.state.set_channel(channel);
    }

    fn set_mode(&mut self, mode: usize) {
        self.state.set_mode(mode);
    }

    fn push_mode(&mut self, mode: usize) {
        self.state.push_mode(mode);
    }

    fn pop_mode(&mut self) -> Result<(), PredictionError> {
        self.state
            .pop()
            .map(|_| ())
            .ok_or(PredictionError::EmptyModeStack)
    }

    fn custom_action(&mut self, rule_index: usize, action_index: usize) {
        self.callbacks.action(self.state, rule_index, action_index);
    }
}

impl LexerHost for Host<'_> {
    fn sempred(&mut self, rule_index: usize, pred_index: usize) -> bool {
        self.callbacks.sempred(self.state, rule_index, pred_index)
    }
}

/// Runs a lexer ATN over a character stream.
///
/// Errors are reported to the error listeners and recovered from by
/// dropping one character, so `next_token` only fails on misuse (an empty
/// mode stack, a mode the ATN does not have).
pub struct Lexer<I = InputStream> {
    grammar: Arc<Grammar>,
    input: I,
    interpreter: LexerAtnSimulator,
    state: LexerState,
    callbacks: Box<dyn LexerCallbacks>,
    listeners: Vec<Box<dyn ErrorListener>>,
    tracer: Box<dyn Tracer>,
}

impl<I: CharStream> Lexer<I> {
    pub fn new(grammar: Arc<Grammar>, input: I) -> Result<Self> {
        if grammar.grammar_type() != GrammarType::Lexer {
            return Err(Error::WrongGrammarType { expected: "lexer" });
        }
        let interpreter =
            LexerAtnSimulator::new(Arc::clone(grammar.atn()), Arc::clone(grammar.dfa()));
        Ok(Self {
            grammar,
            input,
            interpreter,
            state: LexerState::default(),
            callbacks: Box::new(NoCallbacks),
            listeners: vec![Box::new(ConsoleErrorListener)],
            tracer: Box::new(NoopTracer),
        })
    }

    pub fn grammar(&self) -> &Arc<Grammar> {
        &self.grammar
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    pub fn interpreter(&self) -> &LexerAtnSimulator {
        &self.interpreter
    }

    pub fn state(&self) -> &LexerState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut LexerState {
        &mut self.state
    }

    pub fn set_callbacks(&mut self, callbacks: impl LexerCallbacks + 'static) {
        self.callbacks = Box::new(callbacks);
    }

    pub fn add_error_listener(&mut self, listener: impl ErrorListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn remove_error_listeners(&mut self) {
        self.listeners.clear();
    }

    /// Installs `tracer`, returning the previous one.
    pub fn set_tracer(&mut self, tracer: Box<dyn Tracer>) -> Box<dyn Tracer> {
        std::mem::replace(&mut self.tracer, tracer)
    }

    pub fn line(&self) -> usize {
        self.interpreter.line
    }

    pub fn column(&self) -> usize {
        self.interpreter.column
    }

    /// Char index of the next character to match.
    pub fn char_index(&self) -> usize {
        self.input.index()
    }

    /// Text of the token being built: the override if set, else the
    /// matched characters.
    pub fn text(&self) -> String {
        match &self.state.text {
            Some(text) => text.clone(),
            None => self.interpreter.text(&self.input),
        }
    }

    pub fn mode(&self) -> usize {
        self.state.mode
    }

    pub fn set_mode(&mut self, mode: usize) {
        self.state.set_mode(mode);
    }

    pub fn push_mode(&mut self, mode: usize) {
        self.state.push_mode(mode);
    }

    pub fn pop_mode(&mut self) -> Result<usize> {
        self.state.pop_mode()
    }

    /// Rewinds the input and forgets all token and mode state.
    pub fn reset(&mut self) {
        self.input.seek(0);
        self.state = LexerState::default();
        self.interpreter.reset();
    }

    /// Matches the next token, skipping `-> skip` tokens and joining
    /// `-> more` matches. Returns an EOF token forever once input runs out.
    pub fn next_token(&mut self) -> Result<Token> {
        let marker = self.input.mark();
        let result = self.match_next();
        self.input.release(marker);
        result
    }

    fn match_next(&mut self) -> Result<Token> {
        'token: loop {
            if self.state.hit_eof {
                return Ok(self.emit_eof());
            }
            self.state.begin_token(
                self.input.index(),
                self.interpreter.line,
                self.interpreter.column,
            );
            loop {
                self.state.outcome = MatchOutcome::Token;
                self.state.token_type = None;
                let mode = self.state.mode;
                let mut host = Host {
                    state: &mut self.state,
                    callbacks: self.callbacks.as_mut(),
                };
                let matched = match self.interpreter.match_token(
                    &mut self.input,
                    mode,
                    &mut host,
                    self.tracer.as_mut(),
                ) {
                    Ok(ttype) => Some(ttype),
                    Err(PredictionError::LexerNoViableAlt { mode, start_index }) => {
                        self.notify_no_viable_alt(mode, start_index);
                        self.recover();
                        None
                    }
                    Err(PredictionError::EmptyModeStack) => return Err(Error::EmptyModeStack),
                    Err(e) => return Err(e.into()),
                };
                if self.input.la(1) == token::EOF {
                    self.state.hit_eof = true;
                }
                let Some(ttype) = matched else {
                    continue 'token;
                };
                match self.state.outcome {
                    MatchOutcome::Skip => continue 'token,
                    MatchOutcome::More => continue,
                    MatchOutcome::Token => {
                        let ttype = self.state.token_type.unwrap_or(ttype);
                        return Ok(self.emit(ttype));
                    }
                }
            }
        }
    }

    fn emit(&mut self, token_type: i32) -> Token {
        let start = self.state.token_start;
        let stop = self.input.index() as isize - 1;
        let text = match self.state.text.take() {
            Some(text) => text,
            None if token_type == token::EOF => EOF_TEXT.to_string(),
            None => self
                .input
                .text(Interval::new(start as i32, stop as i32)),
        };
        Token {
            token_type,
            channel: self.state.channel,
            start: start as isize,
            stop,
            index: None,
            line: self.state.token_start_line,
            column: self.state.token_start_column,
            text,
        }
    }

    fn emit_eof(&self) -> Token {
        Token::eof(self.input.index(), self.interpreter.line, self.interpreter.column)
    }

    fn notify_no_viable_alt(&mut self, mode: usize, start_index: usize) {
        let text = self.input.text(Interval::new(
            self.state.token_start as i32,
            self.input.index() as i32,
        ));
        let message = format!(
            "token recognition error at: '{}'",
            escape_whitespace(&text, false)
        );
        let error = RecognitionError::LexerNoViableAlt { start_index, mode };
        let (line, column) = (self.state.token_start_line, self.state.token_start_column);
        for listener in &mut self.listeners {
            listener.syntax_error(None, line, column, &message, Some(&error));
        }
    }

    /// Drops one character so matching can resume after it.
    fn recover(&mut self) {
        if self.input.la(1) != token::EOF {
            self.interpreter.consume(&mut self.input);
        }
    }

    /// Every token up to, not including, EOF.
    pub fn all_tokens(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let t = self.next_token()?;
            if t.is_eof() {
                return Ok(tokens);
            }
            tokens.push(t);
        }
    }
}

impl<I: CharStream> TokenSource for Lexer<I> {
    fn next_token(&mut self) -> Result<Token> {
        Lexer::next_token(self)
    }

    fn line(&self) -> usize {
        self.interpreter.line
    }

    fn column(&self) -> usize {
        self.interpreter.column
    }

    fn source_name(&self) -> &str {
        self.input.source_name()
    }
}

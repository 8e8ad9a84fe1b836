//! Recursive-descent parser runtime.
//!
//! [`Parser`] holds the state generated rule functions (or the
//! [`ParserInterpreter`](crate::ParserInterpreter)) drive: the token stream,
//! the current rule context and ATN state, the precedence stack of
//! left-recursive rules, and the parse tree being built. Decisions are
//! delegated to the shared [`ParserAtnSimulator`]; syntax errors to the
//! installed [`ErrorStrategy`].

use std::sync::Arc;

use allstar_atn::{Atn, GrammarType};
use allstar_core::{IntStream, IntervalSet, token};
use allstar_vm::{
    AltSet, AtnConfigSet, NoopTracer, ParserAtnSimulator, PredictionError, PredictionHost,
    PredictionMode, Tracer,
};

use crate::error::{Error, RecognitionError, Result};
use crate::error_listener::{ConsoleErrorListener, ErrorListener};
use crate::error_strategy::{DefaultErrorStrategy, ErrorStrategy};
use crate::grammar::Grammar;
use crate::invariants::{empty_precedence_stack, no_current_rule, not_a_rule_node};
use crate::lexer::NoCallbacks;
use crate::listener::ParseTreeListener;
use crate::token::Token;
use crate::token_stream::CommonTokenStream;
use crate::tree::{NodeId, ParseTree, RuleNode};

/// Hooks for semantic predicates and actions embedded in parser rules.
///
/// `ctx` is the innermost rule context at the time of the call.
pub trait ParserCallbacks {
    fn sempred(
        &mut self,
        _tree: &ParseTree,
        _ctx: Option<NodeId>,
        _rule_index: usize,
        _pred_index: usize,
    ) -> bool {
        true
    }

    fn action(
        &mut self,
        _tree: &ParseTree,
        _ctx: Option<NodeId>,
        _rule_index: usize,
        _action_index: usize,
    ) {
    }
}

impl ParserCallbacks for NoCallbacks {}

/// View of the parser handed to the simulator during prediction.
struct Host<'a> {
    callbacks: &'a mut dyn ParserCallbacks,
    tree: &'a ParseTree,
    ctx: Option<NodeId>,
    precedence: i32,
    listeners: &'a mut [Box<dyn ErrorListener>],
}

impl PredictionHost for Host<'_> {
    fn sempred(&mut self, rule_index: usize, pred_index: usize) -> bool {
        self.callbacks
            .sempred(self.tree, self.ctx, rule_index, pred_index)
    }

    fn precedence(&self) -> i32 {
        self.precedence
    }

    fn report_attempting_full_context(
        &mut self,
        decision: usize,
        conflicting_alts: Option<&AltSet>,
        configs: &AtnConfigSet,
        start_index: usize,
        stop_index: usize,
    ) {
        for l in self.listeners.iter_mut() {
            l.report_attempting_full_context(
                decision,
                start_index,
                stop_index,
                conflicting_alts,
                configs,
            );
        }
    }

    fn report_context_sensitivity(
        &mut self,
        decision: usize,
        prediction: usize,
        configs: &AtnConfigSet,
        start_index: usize,
        stop_index: usize,
    ) {
        for l in self.listeners.iter_mut() {
            l.report_context_sensitivity(decision, start_index, stop_index, prediction, configs);
        }
    }

    fn report_ambiguity(
        &mut self,
        decision: usize,
        start_index: usize,
        stop_index: usize,
        exact: bool,
        ambig_alts: &AltSet,
        configs: &AtnConfigSet,
    ) {
        for l in self.listeners.iter_mut() {
            l.report_ambiguity(decision, start_index, stop_index, exact, ambig_alts, configs);
        }
    }
}

pub struct Parser {
    grammar: Arc<Grammar>,
    input: CommonTokenStream,
    interpreter: ParserAtnSimulator,
    tree: ParseTree,
    ctx: Option<NodeId>,
    state: Option<usize>,
    precedence_stack: Vec<i32>,
    build_parse_trees: bool,
    matched_eof: bool,
    syntax_errors: usize,
    error_recovery_mode: bool,
    /// Taken out while one of its methods runs.
    strategy: Option<Box<dyn ErrorStrategy>>,
    callbacks: Box<dyn ParserCallbacks>,
    parse_listeners: Vec<Box<dyn ParseTreeListener>>,
    listeners: Vec<Box<dyn ErrorListener>>,
    tracer: Box<dyn Tracer>,
}

impl Parser {
    pub fn new(grammar: Arc<Grammar>, input: CommonTokenStream) -> Result<Self> {
        if grammar.grammar_type() != GrammarType::Parser {
            return Err(Error::WrongGrammarType { expected: "parser" });
        }
        let interpreter = ParserAtnSimulator::new(
            Arc::clone(grammar.atn()),
            Arc::clone(grammar.dfa()),
            Arc::clone(grammar.context_cache()),
        );
        Ok(Self {
            grammar,
            input,
            interpreter,
            tree: ParseTree::new(),
            ctx: None,
            state: None,
            precedence_stack: vec![0],
            build_parse_trees: true,
            matched_eof: false,
            syntax_errors: 0,
            error_recovery_mode: false,
            strategy: Some(Box::new(DefaultErrorStrategy::new())),
            callbacks: Box::new(NoCallbacks),
            parse_listeners: Vec::new(),
            listeners: vec![Box::new(ConsoleErrorListener)],
            tracer: Box::new(NoopTracer),
        })
    }

    /// Rewinds the input and drops the tree and all error state.
    pub fn reset(&mut self) {
        self.input.seek(0);
        self.with_strategy(|s, p| s.reset(p));
        self.tree.clear();
        self.ctx = None;
        self.state = None;
        self.precedence_stack = vec![0];
        self.matched_eof = false;
        self.syntax_errors = 0;
        self.error_recovery_mode = false;
    }

    pub fn grammar(&self) -> &Arc<Grammar> {
        &self.grammar
    }

    pub fn atn(&self) -> &Atn {
        self.grammar.atn()
    }

    pub fn interpreter(&self) -> &ParserAtnSimulator {
        &self.interpreter
    }

    pub fn input(&self) -> &CommonTokenStream {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut CommonTokenStream {
        &mut self.input
    }

    pub fn tree(&self) -> &ParseTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut ParseTree {
        &mut self.tree
    }

    /// Innermost rule context.
    pub fn ctx(&self) -> Option<NodeId> {
        self.ctx
    }

    pub fn set_ctx(&mut self, ctx: Option<NodeId>) {
        self.ctx = ctx;
    }

    /// Current ATN state.
    pub fn state(&self) -> Option<usize> {
        self.state
    }

    pub fn set_state(&mut self, state: usize) {
        self.state = Some(state);
    }

    pub fn build_parse_trees(&self) -> bool {
        self.build_parse_trees
    }

    /// With tree building off, rule nodes are still created (they carry the
    /// invocation chain) but are not linked as children.
    pub fn set_build_parse_trees(&mut self, build: bool) {
        self.build_parse_trees = build;
    }

    pub fn syntax_errors(&self) -> usize {
        self.syntax_errors
    }

    pub fn prediction_mode(&self) -> PredictionMode {
        self.interpreter.prediction_mode()
    }

    pub fn set_prediction_mode(&mut self, mode: PredictionMode) {
        self.interpreter.set_prediction_mode(mode);
    }

    pub fn set_error_strategy(&mut self, strategy: impl ErrorStrategy + 'static) {
        self.strategy = Some(Box::new(strategy));
    }

    pub fn set_callbacks(&mut self, callbacks: impl ParserCallbacks + 'static) {
        self.callbacks = Box::new(callbacks);
    }

    pub fn add_parse_listener(&mut self, listener: impl ParseTreeListener + 'static) {
        self.parse_listeners.push(Box::new(listener));
    }

    pub fn remove_parse_listeners(&mut self) {
        self.parse_listeners.clear();
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

    pub fn in_error_recovery_mode(&self) -> bool {
        self.error_recovery_mode
    }

    pub(crate) fn set_error_recovery_mode(&mut self, on: bool) {
        self.error_recovery_mode = on;
    }

    /// Runs `f` with the installed error strategy.
    pub(crate) fn with_strategy<R>(
        &mut self,
        f: impl FnOnce(&mut dyn ErrorStrategy, &mut Parser) -> R,
    ) -> R {
        let mut strategy = self
            .strategy
            .take()
            .unwrap_or_else(|| Box::new(DefaultErrorStrategy::new()));
        let result = f(strategy.as_mut(), self);
        self.strategy = Some(strategy);
        result
    }

    /// The token at LT(1).
    pub fn current_token(&mut self) -> Token {
        match self.input.lt(1) {
            Some(t) => t.clone(),
            None => Token::eof(0, 1, 0),
        }
    }

    /// Matches the current token against `token_type` and consumes it. On
    /// a mismatch the error strategy recovers inline, possibly conjuring
    /// the missing token.
    pub fn match_token(&mut self, token_type: i32) -> Result<Token> {
        let t = self.current_token();
        if t.token_type == token_type {
            if token_type == token::EOF {
                self.matched_eof = true;
            }
            self.with_strategy(|s, p| s.report_match(p));
            self.consume();
            return Ok(t);
        }
        self.recover_inline_into_tree()
    }

    /// Matches any token but EOF.
    pub fn match_wildcard(&mut self) -> Result<Token> {
        let t = self.current_token();
        if t.token_type > 0 {
            self.with_strategy(|s, p| s.report_match(p));
            self.consume();
            return Ok(t);
        }
        self.recover_inline_into_tree()
    }

    fn recover_inline_into_tree(&mut self) -> Result<Token> {
        let t = self.recover_inline()?;
        if self.build_parse_trees && t.index.is_none() {
            if let Some(ctx) = self.ctx {
                self.tree.add_error_node(ctx, t.clone());
            }
        }
        Ok(t)
    }

    /// Consumes the current token and adds it to the tree, as an error
    /// node while recovering. Returns the consumed token.
    pub fn consume(&mut self) -> Token {
        let o = self.current_token();
        if !o.is_eof() {
            self.input.consume();
        }
        let Some(ctx) = self.ctx else {
            return o;
        };
        if self.build_parse_trees || !self.parse_listeners.is_empty() {
            if self.error_recovery_mode {
                let node = self.tree.add_error_node(ctx, o.clone());
                for l in &mut self.parse_listeners {
                    l.visit_error_node(&self.tree, node);
                }
            } else {
                let node = self.tree.add_terminal(ctx, o.clone());
                for l in &mut self.parse_listeners {
                    l.visit_terminal(&self.tree, node);
                }
            }
        }
        o
    }

    /// Opens a context for `rule_index` below the current one and makes it
    /// current. `state` is the rule's start state.
    pub fn enter_rule(&mut self, state: usize, rule_index: usize) -> NodeId {
        let parent = self.ctx;
        let invoking_state = parent.and(self.state);
        let ctx = self.tree.new_rule(parent, rule_index, invoking_state);
        self.state = Some(state);
        self.ctx = Some(ctx);
        self.set_start(ctx);
        if self.build_parse_trees {
            if let Some(parent) = parent {
                self.tree.add_child(parent, ctx);
            }
        }
        self.trigger_enter_rule(ctx);
        ctx
    }

    /// Closes the current context and returns to its invoker.
    pub fn exit_rule(&mut self) {
        let ctx = self.require_ctx("exit_rule");
        let stop = if self.matched_eof {
            self.input.lt(1).cloned()
        } else {
            self.input.lt(-1).cloned()
        };
        let rule = self.rule_mut(ctx);
        rule.stop = stop;
        let invoking_state = rule.invoking_state;
        self.trigger_exit_rule(ctx);
        self.state = invoking_state;
        self.ctx = self.tree.parent(ctx);
    }

    /// Records the outer alternative `ctx` matched and makes it current,
    /// replacing the current context in its parent when they differ.
    pub fn enter_outer_alt(&mut self, ctx: NodeId, alt: usize) {
        self.rule_mut(ctx).alt_number = Some(alt);
        if self.build_parse_trees && self.ctx != Some(ctx) {
            if let Some(parent) = self.ctx.and_then(|c| self.tree.parent(c)) {
                self.tree.remove_last_child(parent);
                self.tree.add_child(parent, ctx);
            }
        }
        self.ctx = Some(ctx);
    }

    /// Like [`Self::enter_rule`] for a left-recursive rule invoked at
    /// `precedence`. The context joins the tree when the recursion unrolls.
    pub fn enter_recursion_rule(&mut self, state: usize, rule_index: usize, precedence: i32) -> NodeId {
        let parent = self.ctx;
        let invoking_state = parent.and(self.state);
        let ctx = self.tree.new_rule(parent, rule_index, invoking_state);
        self.state = Some(state);
        self.precedence_stack.push(precedence);
        self.ctx = Some(ctx);
        self.set_start(ctx);
        self.trigger_enter_rule(ctx);
        ctx
    }

    /// Starts another iteration of a precedence loop: the current context
    /// becomes the first child of a new context for the same rule, whose
    /// parent and invoking state are the recursion's original ones.
    pub fn push_new_recursion_context(
        &mut self,
        parent: Option<NodeId>,
        parent_state: Option<usize>,
        state: usize,
        rule_index: usize,
    ) -> NodeId {
        let previous = self.require_ctx("push_new_recursion_context");
        let ctx = self.tree.new_rule(parent, rule_index, parent_state);
        let stop = self.input.lt(-1).cloned();
        let start = {
            let prev = self.rule_mut(previous);
            prev.invoking_state = Some(state);
            prev.stop = stop;
            prev.start.clone()
        };
        self.tree.set_parent(previous, Some(ctx));
        self.ctx = Some(ctx);
        self.rule_mut(ctx).start = start;
        if self.build_parse_trees {
            self.tree.add_child(ctx, previous);
        }
        self.trigger_enter_rule(ctx);
        ctx
    }

    /// Ends a left-recursive rule: pops its precedence, closes the nested
    /// recursion contexts, and attaches the outermost one to `parent`.
    pub fn unroll_recursion_contexts(&mut self, parent: Option<NodeId>) {
        if self.precedence_stack.pop().is_none() {
            empty_precedence_stack();
        }
        let ret = self.require_ctx("unroll_recursion_contexts");
        let stop = self.input.lt(-1).cloned();
        self.rule_mut(ret).stop = stop;
        if self.parse_listeners.is_empty() {
            self.ctx = parent;
        } else {
            while self.ctx != parent {
                let Some(ctx) = self.ctx else { break };
                self.trigger_exit_rule(ctx);
                self.ctx = self.tree.parent(ctx);
            }
        }
        self.tree.set_parent(ret, parent);
        if self.build_parse_trees {
            if let Some(parent) = parent {
                self.tree.add_child(parent, ret);
            }
        }
    }

    /// Precedence of the innermost left-recursive rule invocation, -1
    /// when the stack is empty.
    pub fn precedence(&self) -> i32 {
        self.precedence_stack.last().copied().unwrap_or(-1)
    }

    /// `{precedence >= current precedence}?`.
    pub fn precpred(&self, precedence: i32) -> bool {
        precedence >= self.precedence()
    }

    pub fn sempred(&mut self, rule_index: usize, pred_index: usize) -> bool {
        self.callbacks
            .sempred(&self.tree, self.ctx, rule_index, pred_index)
    }

    pub fn action(&mut self, rule_index: usize, action_index: usize) {
        self.callbacks
            .action(&self.tree, self.ctx, rule_index, action_index);
    }

    /// Predicts the alternative of `decision` to take at the current input.
    pub fn adaptive_predict(&mut self, decision: usize) -> Result<usize> {
        let outer = self.invoking_states(self.ctx);
        let precedence = self.precedence();
        let mut host = Host {
            callbacks: self.callbacks.as_mut(),
            tree: &self.tree,
            ctx: self.ctx,
            precedence,
            listeners: &mut self.listeners,
        };
        let result = self.interpreter.adaptive_predict(
            &mut self.input,
            decision,
            &outer,
            &mut host,
            self.tracer.as_mut(),
        );
        match result {
            Ok(alt) => Ok(alt),
            Err(PredictionError::NoViableAlt {
                start_index,
                offending_index,
                ..
            }) => {
                let current = self.current_token();
                let start_token = self.input.get(start_index).cloned().unwrap_or_else(|| current.clone());
                let offending_token = self.input.get(offending_index).cloned().unwrap_or(current);
                Err(RecognitionError::NoViableAlt {
                    start_token,
                    offending_token,
                    state: self.state.unwrap_or_default(),
                    ctx: self.ctx,
                }
                .into())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Invoking states from `ctx` outwards, innermost first. The outermost
    /// context contributes none.
    pub fn invoking_states(&self, ctx: Option<NodeId>) -> Vec<usize> {
        let mut states = Vec::new();
        let mut ctx = ctx;
        while let Some(c) = ctx {
            let parent = self.tree.parent(c);
            let invoking = self.tree.rule(c).and_then(|r| r.invoking_state);
            match (parent, invoking) {
                (Some(_), Some(s)) => states.push(s),
                _ => break,
            }
            ctx = parent;
        }
        states
    }

    /// Whether `symbol` can follow the current state, looking through rule
    /// ends into the invoking rules.
    pub fn is_expected_token(&self, symbol: i32) -> bool {
        let Some(state) = self.state else {
            return false;
        };
        let atn = self.atn();
        let mut following = atn.next_tokens(state);
        if following.contains(symbol) {
            return true;
        }
        if !following.contains(token::EPSILON) {
            return false;
        }
        for invoking in self.invoking_states(self.ctx) {
            if !following.contains(token::EPSILON) {
                break;
            }
            following = atn.next_tokens(atn.follow_state_of(invoking));
            if following.contains(symbol) {
                return true;
            }
        }
        following.contains(token::EPSILON) && symbol == token::EOF
    }

    /// Tokens that could follow the current state in the current context.
    pub fn expected_tokens(&self) -> IntervalSet {
        match self.state {
            Some(state) => self.expected_tokens_at(state, self.ctx),
            None => IntervalSet::new(),
        }
    }

    pub fn expected_tokens_at(&self, state: usize, ctx: Option<NodeId>) -> IntervalSet {
        self.atn()
            .expected_tokens(state, &self.invoking_states(ctx))
    }

    /// Tokens reachable from the current state without leaving the rule.
    pub fn expected_tokens_within_current_rule(&self) -> IntervalSet {
        match self.state {
            Some(state) => self.atn().next_tokens(state).clone(),
            None => IntervalSet::new(),
        }
    }

    /// Rule names from the current context outwards.
    pub fn rule_invocation_stack(&self) -> Vec<String> {
        self.rule_invocation_stack_of(self.ctx)
    }

    pub fn rule_invocation_stack_of(&self, ctx: Option<NodeId>) -> Vec<String> {
        let mut stack = Vec::new();
        let mut ctx = ctx;
        while let Some(c) = ctx {
            if let Some(rule) = self.tree.rule(c) {
                stack.push(self.grammar.rule_name(rule.rule_index));
            }
            ctx = self.tree.parent(c);
        }
        stack
    }

    /// Every decision DFA rendered with the grammar's vocabulary.
    pub fn dfa_strings(&self) -> Vec<String> {
        let dfa = self.interpreter.dfa();
        (0..dfa.len())
            .filter_map(|d| dfa.read(d))
            .map(|d| d.to_string_with(self.grammar.vocabulary()))
            .collect()
    }

    /// The DFAs that have states, each under a `Decision N:` header.
    pub fn dump_dfa(&self) -> String {
        let dfa = self.interpreter.dfa();
        let mut out = String::new();
        for d in 0..dfa.len() {
            let Some(guard) = dfa.read(d) else { continue };
            if guard.is_empty() {
                continue;
            }
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&format!("Decision {d}:\n"));
            out.push_str(&guard.to_string_with(self.grammar.vocabulary()));
        }
        out
    }

    /// Counts a syntax error and passes it to every error listener, at
    /// `offending`'s position.
    pub fn notify_error_listeners(
        &mut self,
        offending: &Token,
        message: &str,
        error: Option<&RecognitionError>,
    ) {
        self.syntax_errors += 1;
        for l in &mut self.listeners {
            l.syntax_error(Some(offending), offending.line, offending.column, message, error);
        }
    }

    /// Error for the current token not matching at `state` (the current
    /// state when `None`).
    pub fn input_mismatch(&mut self, at: Option<(usize, Option<NodeId>)>) -> RecognitionError {
        let (state, ctx) = at.unwrap_or((self.state.unwrap_or_default(), self.ctx));
        RecognitionError::InputMismatch {
            offending_token: self.current_token(),
            state,
            ctx,
            expected: self.expected_tokens_at(state, ctx),
        }
    }

    /// Error for a predicate that failed at the current state.
    pub fn failed_predicate(
        &mut self,
        rule_index: usize,
        pred_index: Option<usize>,
        predicate: impl Into<String>,
    ) -> RecognitionError {
        RecognitionError::FailedPredicate {
            offending_token: self.current_token(),
            state: self.state.unwrap_or_default(),
            ctx: self.ctx,
            rule_index,
            pred_index,
            predicate: predicate.into(),
        }
    }

    pub fn recover_inline(&mut self) -> Result<Token> {
        self.with_strategy(|s, p| s.recover_inline(p))
    }

    pub fn sync(&mut self) -> Result<()> {
        self.with_strategy(|s, p| s.sync(p))
    }

    pub fn report_error(&mut self, error: &RecognitionError) {
        self.with_strategy(|s, p| s.report_error(p, error));
    }

    pub fn recover(&mut self, error: &RecognitionError) -> Result<()> {
        self.with_strategy(|s, p| s.recover(p, error))
    }

    fn set_start(&mut self, ctx: NodeId) {
        let start = self.input.lt(1).cloned();
        self.rule_mut(ctx).start = start;
    }

    fn rule_mut(&mut self, ctx: NodeId) -> &mut RuleNode {
        match self.tree.rule_mut(ctx) {
            Some(rule) => rule,
            None => not_a_rule_node(ctx.index()),
        }
    }

    fn require_ctx(&self, operation: &str) -> NodeId {
        match self.ctx {
            Some(ctx) => ctx,
            None => no_current_rule(operation),
        }
    }

    fn trigger_enter_rule(&mut self, ctx: NodeId) {
        for l in &mut self.parse_listeners {
            l.enter_every_rule(&self.tree, ctx);
        }
    }

    fn trigger_exit_rule(&mut self, ctx: NodeId) {
        for l in self.parse_listeners.iter_mut().rev() {
            l.exit_every_rule(&self.tree, ctx);
        }
    }
}

//! Parses with nothing but a parser ATN.

use std::sync::Arc;

use allstar_atn::{BlockKind, StateKind, TransitionKind};
use allstar_core::{IntStream, token};

use crate::error::{Error, RecognitionError, Result};
use crate::parser::Parser;
use crate::token::Token;
use crate::tree::NodeId;

/// Walks the ATN state by state, doing what generated rule functions
/// would: matching tokens, entering and leaving rules, predicting at
/// decisions, and unrolling left-recursive rules through recursion
/// contexts.
///
/// Rule contexts get the number of the outer alternative they took.
pub struct ParserInterpreter {
    parser: Parser,
    /// Parent context and invoking state of each active left-recursive
    /// invocation.
    parent_contexts: Vec<(Option<NodeId>, Option<usize>)>,
    decision_override: Option<DecisionOverride>,
    root: Option<NodeId>,
}

/// Forces `alt` at `decision` when prediction starts at token `index`.
#[derive(Clone, Copy, Debug)]
struct DecisionOverride {
    decision: usize,
    index: usize,
    alt: usize,
    reached: bool,
}

impl ParserInterpreter {
    pub fn new(parser: Parser) -> Self {
        Self {
            parser,
            parent_contexts: Vec::new(),
            decision_override: None,
            root: None,
        }
    }

    pub fn parser(&self) -> &Parser {
        &self.parser
    }

    pub fn parser_mut(&mut self) -> &mut Parser {
        &mut self.parser
    }

    pub fn into_parser(self) -> Parser {
        self.parser
    }

    /// Root context of the last parse.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Makes the next prediction of `decision` at token index `index`
    /// return `alt` without consulting the simulator. Used to explore the
    /// alternatives of an ambiguity one by one.
    pub fn add_decision_override(&mut self, decision: usize, index: usize, alt: usize) {
        self.decision_override = Some(DecisionOverride {
            decision,
            index,
            alt,
            reached: false,
        });
    }

    pub fn reset(&mut self) {
        self.parser.reset();
        self.parent_contexts.clear();
        self.root = None;
        if let Some(o) = &mut self.decision_override {
            o.reached = false;
        }
    }

    /// Parses starting at rule `name`.
    pub fn parse_rule(&mut self, name: &str) -> Result<NodeId> {
        let rule = self
            .parser
            .grammar()
            .rule_index(name)
            .ok_or_else(|| Error::UnknownRule(name.to_string()))?;
        self.parse(rule)
    }

    /// Parses starting at rule `start_rule` and returns the root context.
    ///
    /// Syntax errors are reported and recovered from; the result is an
    /// error only when the error strategy gives up, prediction fails for a
    /// reason other than the input, or the token source failed.
    pub fn parse(&mut self, start_rule: usize) -> Result<NodeId> {
        let atn = Arc::clone(self.parser.grammar().atn());
        if start_rule >= atn.num_rules() {
            return Err(Error::RuleIndexOutOfRange(start_rule));
        }
        let start_state = atn.rule_to_start_state[start_rule];
        let left_recursive = atn.is_precedence_rule(start_rule);

        let root = if left_recursive {
            self.enter_recursion_rule(start_state, start_rule, 0)
        } else {
            self.parser.enter_rule(start_state, start_rule)
        };
        self.root = Some(root);

        let result = loop {
            let Some(p) = self.parser.state() else {
                break Ok(root);
            };
            let state = atn.state(p);
            if state.is_rule_stop() {
                if self.at_top() {
                    break Ok(self.finish(left_recursive, root));
                }
                self.visit_rule_stop_state(p);
                continue;
            }
            match self.visit_state(p) {
                Ok(()) => {}
                Err(Error::Recognition(e)) => {
                    let rule = state.rule_index.unwrap_or(start_rule);
                    self.parser.set_state(atn.rule_to_stop_state[rule]);
                    self.set_exception(&e);
                    self.parser.report_error(&e);
                    if let Err(cancel) = self.recover(&e) {
                        break Err(cancel);
                    }
                }
                Err(other) => break Err(other),
            }
        };

        match self.parser.input_mut().take_error() {
            Some(source_error) if result.is_ok() => Err(source_error),
            _ => result,
        }
    }

    /// True when the current context has no invoker.
    fn at_top(&self) -> bool {
        let parser = &self.parser;
        parser
            .ctx()
            .and_then(|ctx| parser.tree().rule(ctx))
            .is_none_or(|r| r.invoking_state.is_none())
    }

    fn finish(&mut self, left_recursive: bool, root: NodeId) -> NodeId {
        if left_recursive {
            let result = self.parser.ctx().unwrap_or(root);
            let (parent, _) = self.parent_contexts.pop().unwrap_or((None, None));
            self.parser.unroll_recursion_contexts(parent);
            self.root = Some(result);
            result
        } else {
            self.parser.exit_rule();
            root
        }
    }

    fn enter_recursion_rule(&mut self, state: usize, rule_index: usize, precedence: i32) -> NodeId {
        let parent = self.parser.ctx();
        let invoking_state = parent.and(self.parser.state());
        self.parent_contexts.push((parent, invoking_state));
        self.parser.enter_recursion_rule(state, rule_index, precedence)
    }

    fn visit_state(&mut self, p: usize) -> Result<()> {
        let atn = Arc::clone(self.parser.grammar().atn());
        let state = atn.state(p);

        let mut alt = 1;
        if state.is_decision_state() {
            alt = self.visit_decision_state(p)?;
        }
        if let Some(rule) = state.rule_index {
            let outermost = atn
                .rule_start(rule)
                .transitions()
                .first()
                .is_some_and(|t| t.target == p);
            if outermost && !atn.is_precedence_rule(rule) {
                // a loop entered first is not the rule's own block
                let own_block = matches!(
                    state.kind,
                    StateKind::BlockStart {
                        kind: BlockKind::Basic,
                        ..
                    }
                );
                let outer_alt = if own_block { alt } else { 1 };
                if let Some(ctx) = self.parser.ctx() {
                    self.parser.enter_outer_alt(ctx, outer_alt);
                }
            }
        }

        let transition = state.transition(alt - 1);
        match &transition.kind {
            TransitionKind::Epsilon { .. } => {
                let precedence_loop = matches!(
                    state.kind,
                    StateKind::StarLoopEntry {
                        precedence_decision: true,
                        ..
                    }
                );
                let exits = matches!(atn.state(transition.target).kind, StateKind::LoopEnd { .. });
                if precedence_loop && !exits {
                    self.push_recursion_context(p)?;
                }
            }
            TransitionKind::Atom { label } => {
                self.parser.match_token(*label)?;
            }
            TransitionKind::Range { .. } | TransitionKind::Set(_) | TransitionKind::NotSet(_) => {
                let la = self.parser.input_mut().la(1);
                if !transition.matches(la, token::MIN_USER_TOKEN_TYPE, 65535) {
                    self.parser.recover_inline()?;
                }
                self.parser.match_wildcard()?;
            }
            TransitionKind::Wildcard => {
                self.parser.match_wildcard()?;
            }
            TransitionKind::Rule {
                rule_index,
                precedence,
                ..
            } => {
                let start = transition.target;
                if atn.is_precedence_rule(*rule_index) {
                    self.enter_recursion_rule(start, *rule_index, *precedence);
                } else {
                    self.parser.enter_rule(start, *rule_index);
                }
            }
            TransitionKind::Predicate {
                rule_index,
                pred_index,
                ..
            } => {
                if !self.parser.sempred(*rule_index, *pred_index) {
                    let e = self.parser.failed_predicate(
                        *rule_index,
                        Some(*pred_index),
                        format!("{rule_index}:{pred_index}"),
                    );
                    return Err(e.into());
                }
            }
            TransitionKind::Action {
                rule_index,
                action_index,
                ..
            } => {
                if let Some(action_index) = action_index {
                    self.parser.action(*rule_index, *action_index);
                }
            }
            TransitionKind::Precedence { precedence } => {
                if !self.parser.precpred(*precedence) {
                    let rule = state.rule_index.unwrap_or_default();
                    let e = self.parser.failed_predicate(
                        rule,
                        None,
                        format!("precpred(_ctx, {precedence})"),
                    );
                    return Err(e.into());
                }
            }
        }

        self.parser.set_state(transition.target);
        Ok(())
    }

    fn visit_decision_state(&mut self, p: usize) -> Result<usize> {
        let atn = Arc::clone(self.parser.grammar().atn());
        let state = atn.state(p);
        if state.num_transitions() <= 1 {
            return Ok(1);
        }
        self.parser.sync()?;
        let Some(decision) = state.decision else {
            return Ok(1);
        };
        let index = self.parser.input().index();
        if let Some(o) = &mut self.decision_override {
            if o.decision == decision && o.index == index && !o.reached {
                o.reached = true;
                return Ok(o.alt);
            }
        }
        self.parser.adaptive_predict(decision)
    }

    /// Next iteration of a precedence loop in rule `p.rule_index`.
    fn push_recursion_context(&mut self, p: usize) -> Result<()> {
        let atn = Arc::clone(self.parser.grammar().atn());
        let Some(&(parent, parent_state)) = self.parent_contexts.last() else {
            return Ok(());
        };
        let rule = atn.state(p).rule_index.unwrap_or_default();
        let start = atn.rule_to_start_state[rule];
        self.parser.push_new_recursion_context(parent, parent_state, start, rule);
        Ok(())
    }

    fn visit_rule_stop_state(&mut self, p: usize) {
        let atn = Arc::clone(self.parser.grammar().atn());
        let rule = atn.state(p).rule_index.unwrap_or_default();
        if atn.is_precedence_rule(rule) {
            let (parent, parent_state) = self.parent_contexts.pop().unwrap_or((None, None));
            self.parser.unroll_recursion_contexts(parent);
            if let Some(s) = parent_state {
                self.parser.set_state(s);
            }
        } else {
            self.parser.exit_rule();
        }
        if let Some(invoking) = self.parser.state() {
            self.parser.set_state(atn.follow_state_of(invoking));
        }
    }

    fn set_exception(&mut self, error: &RecognitionError) {
        let Some(ctx) = self.parser.ctx() else {
            return;
        };
        if let Some(rule) = self.parser.tree_mut().rule_mut(ctx) {
            rule.exception = Some(error.clone());
        }
    }

    /// Resynchronizes, then adds an error node when recovery consumed
    /// nothing so the tree shows where the error was.
    fn recover(&mut self, error: &RecognitionError) -> Result<()> {
        let before = self.parser.input().index();
        self.parser.recover(error)?;
        if self.parser.input().index() != before {
            return Ok(());
        }
        let Some(offending) = error.offending_token() else {
            return Ok(());
        };
        let token_type = match error {
            RecognitionError::InputMismatch { expected, .. } => {
                expected.min_element().unwrap_or(token::INVALID_TYPE)
            }
            _ => token::INVALID_TYPE,
        };
        let conjured = Token::new(token_type, offending.text.clone())
            .with_position(offending.line, offending.column);
        if let Some(ctx) = self.parser.ctx() {
            self.parser.tree_mut().add_error_node(ctx, conjured);
        }
        Ok(())
    }
}

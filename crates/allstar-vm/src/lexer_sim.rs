//! Lexer ATN simulation: longest-match tokenization with a per-mode DFA.

use std::sync::Arc;

use allstar_atn::{Atn, TransitionKind};
use allstar_core::{CharStream, IntStream, Interval, token};

use crate::config::AtnConfig;
use crate::config_set::AtnConfigSet;
use crate::context::{EMPTY_RETURN_STATE, PredictionContext};
use crate::dfa::{Dfa, DfaCache, DfaState, DfaTarget};
use crate::error::PredictionError;
use crate::host::LexerHost;
use crate::lexer_executor::LexerActionExecutor;
use crate::trace::Tracer;

/// Matches one token at a time from a character stream.
///
/// Tracks the line and column of the input position as it consumes, so the
/// lexer can stamp tokens without rescanning.
#[derive(Debug)]
pub struct LexerAtnSimulator {
    atn: Arc<Atn>,
    dfa: Arc<DfaCache>,
    /// 1-based line of the current input position.
    pub line: usize,
    /// 0-based column of the current input position.
    pub column: usize,
    start_index: usize,
}

impl LexerAtnSimulator {
    pub fn new(atn: Arc<Atn>, dfa: Arc<DfaCache>) -> Self {
        Self {
            atn,
            dfa,
            line: 1,
            column: 0,
            start_index: 0,
        }
    }

    pub fn atn(&self) -> &Arc<Atn> {
        &self.atn
    }

    pub fn dfa(&self) -> &Arc<DfaCache> {
        &self.dfa
    }

    /// Input index where the last match started.
    pub fn start_index(&self) -> usize {
        self.start_index
    }

    pub fn reset(&mut self) {
        self.line = 1;
        self.column = 0;
        self.start_index = 0;
    }

    /// Consumes one character, keeping line and column current.
    pub fn consume<I: IntStream + ?Sized>(&mut self, input: &mut I) {
        if input.la(1) == '\n' as i32 {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        input.consume();
    }

    /// Text from the start of the last match to the current position.
    pub fn text<I: CharStream + ?Sized>(&self, input: &I) -> String {
        input.text(Interval::new(
            self.start_index as i32,
            input.index() as i32 - 1,
        ))
    }

    /// Matches the longest token starting at the input position in `mode`
    /// and runs its lexer actions against `host`.
    ///
    /// Returns the token type, or [`token::EOF`] when the input is exhausted.
    /// On a match the input is left just past the token.
    pub fn match_token<I, H, T>(
        &mut self,
        input: &mut I,
        mode: usize,
        host: &mut H,
        tracer: &mut T,
    ) -> Result<i32, PredictionError>
    where
        I: IntStream + ?Sized,
        H: LexerHost + ?Sized,
        T: Tracer + ?Sized,
    {
        let cache = Arc::clone(&self.dfa);
        let mut dfa = cache.write(mode).ok_or(PredictionError::UnknownMode(mode))?;

        let mark = input.mark();
        let start_index = input.index();
        self.start_index = start_index;

        let mut run = LexerRun {
            atn: &self.atn,
            input: &mut *input,
            host: &mut *host,
            mode,
            start_index,
            line: self.line,
            column: self.column,
        };
        let outcome = run.run(&mut dfa, tracer);
        self.line = run.line;
        self.column = run.column;
        drop(dfa);

        let result = outcome.and_then(|(ttype, executor)| {
            if let Some(executor) = executor {
                executor.execute(host, input, start_index)?;
            }
            Ok(ttype)
        });
        input.release(mark);

        if let Ok(ttype) = &result {
            let stop = input.index().saturating_sub(1);
            tracer.trace_lexer_match(mode, start_index, stop, *ttype);
        }
        result
    }
}

/// Snapshot of the last accept state passed.
#[derive(Clone, Debug)]
struct Accept {
    index: usize,
    line: usize,
    column: usize,
    prediction: i32,
    executor: Option<Arc<LexerActionExecutor>>,
}

struct LexerRun<'r, I: ?Sized, H: ?Sized> {
    atn: &'r Atn,
    input: &'r mut I,
    host: &'r mut H,
    mode: usize,
    start_index: usize,
    line: usize,
    column: usize,
}

type Matched = (i32, Option<Arc<LexerActionExecutor>>);

impl<I, H> LexerRun<'_, I, H>
where
    I: IntStream + ?Sized,
    H: LexerHost + ?Sized,
{
    fn run<T: Tracer + ?Sized>(&mut self, dfa: &mut Dfa, tracer: &mut T) -> Result<Matched, PredictionError> {
        let s0 = match dfa.s0 {
            Some(s0) => s0,
            None => {
                let mut closure = self.start_state(dfa.atn_start_state)?;
                let suppress_edge = closure.has_semantic_context;
                closure.has_semantic_context = false;
                let s0 = self.add_dfa_state(dfa, closure);
                if !suppress_edge {
                    dfa.s0 = Some(s0);
                }
                s0
            }
        };

        let (accept, t) = self.exec(dfa, s0, tracer)?;
        match accept {
            Some(accept) => {
                self.input.seek(accept.index);
                self.line = accept.line;
                self.column = accept.column;
                Ok((accept.prediction, accept.executor))
            }
            None if t == token::EOF && self.input.index() == self.start_index => {
                Ok((token::EOF, None))
            }
            None => Err(PredictionError::LexerNoViableAlt {
                mode: self.mode,
                start_index: self.start_index,
            }),
        }
    }

    /// Walks the DFA (extending it from the ATN as needed) until no edge
    /// applies. Returns the last accept state seen and the symbol that
    /// stopped the walk.
    fn exec<T: Tracer + ?Sized>(
        &mut self,
        dfa: &mut Dfa,
        s0: usize,
        tracer: &mut T,
    ) -> Result<(Option<Accept>, i32), PredictionError> {
        let mut accept = None;
        if dfa.state(s0).is_accept {
            accept = Some(self.capture(dfa.state(s0)));
        }

        let mut t = self.input.la(1);
        let mut s = s0;
        loop {
            let target = match dfa.edge(s, t) {
                Some(target) => {
                    tracer.trace_dfa_edge(self.mode, s, t, target, true);
                    target
                }
                None => {
                    let target = self.compute_target_state(dfa, s, t)?;
                    tracer.trace_dfa_edge(self.mode, s, t, target, false);
                    target
                }
            };
            let DfaTarget::State(target) = target else {
                break;
            };

            if t != token::EOF {
                self.consume();
            }
            if dfa.state(target).is_accept {
                accept = Some(self.capture(dfa.state(target)));
                if t == token::EOF {
                    break;
                }
            }

            t = self.input.la(1);
            s = target;
        }
        Ok((accept, t))
    }

    fn capture(&self, state: &DfaState) -> Accept {
        Accept {
            index: self.input.index(),
            line: self.line,
            column: self.column,
            prediction: state.prediction,
            executor: state.lexer_action_executor.clone(),
        }
    }

    fn consume(&mut self) {
        if self.input.la(1) == '\n' as i32 {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        self.input.consume();
    }

    fn compute_target_state(
        &mut self,
        dfa: &mut Dfa,
        from: usize,
        t: i32,
    ) -> Result<DfaTarget, PredictionError> {
        let closure = Arc::clone(&dfa.state(from).configs);
        let mut reach = AtnConfigSet::ordered();
        self.reachable_configs(&closure, &mut reach, t)?;

        if reach.is_empty() {
            // Predicate outcomes can differ next time; only cache hard failures.
            if !reach.has_semantic_context {
                dfa.set_edge(from, t, DfaTarget::Error);
            }
            return Ok(DfaTarget::Error);
        }

        let suppress_edge = reach.has_semantic_context;
        reach.has_semantic_context = false;
        let to = self.add_dfa_state(dfa, reach);
        if !suppress_edge {
            dfa.set_edge(from, t, DfaTarget::State(to));
        }
        Ok(DfaTarget::State(to))
    }

    /// Configs reachable from `closure` on `t`. Once an alternative reaches
    /// an accept state, its remaining configs are skipped (shortest match
    /// within one alternative wins for non-greedy loops).
    fn reachable_configs(
        &mut self,
        closure: &AtnConfigSet,
        reach: &mut AtnConfigSet,
        t: i32,
    ) -> Result<(), PredictionError> {
        let atn = self.atn;
        let mut skip_alt = None;
        for c in closure {
            let alt_reached_accept = skip_alt == Some(c.alt);
            if alt_reached_accept && c.passed_through_non_greedy_decision {
                continue;
            }

            for trans in atn.state(c.state).transitions() {
                if !trans.matches(t, token::MIN_CHAR_VALUE, token::MAX_CHAR_VALUE) {
                    continue;
                }
                let offset = self.input.index() - self.start_index;
                let executor = c.lexer_action_executor.as_ref().map(|e| {
                    e.fix_offset_before_match(offset)
                        .map_or_else(|| Arc::clone(e), Arc::new)
                });
                let mut next = self.step(c, trans.target);
                next.lexer_action_executor = executor;

                if self.closure(next, reach, alt_reached_accept, true, t == token::EOF)? {
                    skip_alt = Some(c.alt);
                    break;
                }
            }
        }
        Ok(())
    }

    fn start_state(&mut self, p: usize) -> Result<AtnConfigSet, PredictionError> {
        let atn = self.atn;
        let mut configs = AtnConfigSet::ordered();
        for (i, trans) in atn.state(p).transitions().iter().enumerate() {
            let c = AtnConfig::new(trans.target, i + 1, PredictionContext::empty());
            self.closure(c, &mut configs, false, false, false)?;
        }
        Ok(configs)
    }

    /// `config` moved to `state`, noting passage through non-greedy decisions.
    fn step(&self, config: &AtnConfig, state: usize) -> AtnConfig {
        let target = self.atn.state(state);
        let mut next = config.at(state);
        next.passed_through_non_greedy_decision = config.passed_through_non_greedy_decision
            || (target.is_decision_state() && target.non_greedy);
        next
    }

    /// Adds the epsilon closure of `config` to `configs`.
    ///
    /// Returns true when the alternative of `config` reached a rule stop
    /// state with no further context (it can accept).
    fn closure(
        &mut self,
        config: AtnConfig,
        configs: &mut AtnConfigSet,
        mut alt_reached_accept: bool,
        speculative: bool,
        treat_eof_as_epsilon: bool,
    ) -> Result<bool, PredictionError> {
        let atn = self.atn;
        let state = atn.state(config.state);

        if state.is_rule_stop() {
            if config.context.has_empty_path() {
                if config.context.is_empty() {
                    configs.add(config, None)?;
                    return Ok(true);
                }
                configs.add(
                    config.at_with_context(config.state, PredictionContext::empty()),
                    None,
                )?;
                alt_reached_accept = true;
            }

            if !config.context.is_empty() {
                for i in 0..config.context.len() {
                    let return_state = config.context.return_state(i);
                    if return_state == EMPTY_RETURN_STATE {
                        continue;
                    }
                    let parent = crate::invariants::ensure_parent(&config.context, i);
                    let mut next = self.step(&config, return_state);
                    next.context = parent;
                    alt_reached_accept = self.closure(
                        next,
                        configs,
                        alt_reached_accept,
                        speculative,
                        treat_eof_as_epsilon,
                    )?;
                }
            }
            return Ok(alt_reached_accept);
        }

        if !state.only_has_epsilon_transitions()
            && (!alt_reached_accept || !config.passed_through_non_greedy_decision)
        {
            configs.add(config.clone(), None)?;
        }

        for trans in state.transitions() {
            let next = match &trans.kind {
                TransitionKind::Rule { follow_state, .. } => {
                    let mut next = self.step(&config, trans.target);
                    next.context = PredictionContext::singleton(config.context.clone(), *follow_state);
                    Some(next)
                }
                TransitionKind::Precedence { .. } => {
                    return Err(PredictionError::PrecedenceInLexer);
                }
                TransitionKind::Predicate {
                    rule_index,
                    pred_index,
                    ..
                } => {
                    configs.has_semantic_context = true;
                    self.evaluate_predicate(*rule_index, *pred_index, speculative)
                        .then(|| self.step(&config, trans.target))
                }
                TransitionKind::Action { action_index, .. } => {
                    let mut next = self.step(&config, trans.target);
                    // Actions inside a rule called from another lexer rule do
                    // not belong to the token being matched.
                    if config.context.has_empty_path()
                        && let Some(action) = action_index.and_then(|i| atn.lexer_actions.get(i))
                    {
                        next.lexer_action_executor = Some(LexerActionExecutor::append(
                            config.lexer_action_executor.as_ref(),
                            action.clone(),
                        ));
                    }
                    Some(next)
                }
                TransitionKind::Epsilon { .. } => Some(self.step(&config, trans.target)),
                TransitionKind::Atom { .. }
                | TransitionKind::Range { .. }
                | TransitionKind::Set(_) => (treat_eof_as_epsilon
                    && trans.matches(token::EOF, token::MIN_CHAR_VALUE, token::MAX_CHAR_VALUE))
                .then(|| self.step(&config, trans.target)),
                TransitionKind::NotSet(_) | TransitionKind::Wildcard => None,
            };

            if let Some(next) = next {
                alt_reached_accept = self.closure(
                    next,
                    configs,
                    alt_reached_accept,
                    speculative,
                    treat_eof_as_epsilon,
                )?;
            }
        }
        Ok(alt_reached_accept)
    }

    /// Predicates see the input as if the current character were consumed.
    fn evaluate_predicate(&mut self, rule_index: usize, pred_index: usize, speculative: bool) -> bool {
        if !speculative {
            return self.host.sempred(rule_index, pred_index);
        }

        let (line, column, index) = (self.line, self.column, self.input.index());
        let mark = self.input.mark();
        self.consume();
        let result = self.host.sempred(rule_index, pred_index);
        self.line = line;
        self.column = column;
        self.input.seek(index);
        self.input.release(mark);
        result
    }

    /// Adds a DFA state for `configs`. The first config in a rule stop state
    /// decides the token type, so earlier rules win ties.
    fn add_dfa_state(&self, dfa: &mut Dfa, configs: AtnConfigSet) -> usize {
        let accepting = configs
            .iter()
            .find(|c| self.atn.state(c.state).is_rule_stop())
            .map(|c| {
                let ttype = self
                    .atn
                    .state(c.state)
                    .rule_index
                    .and_then(|rule| self.atn.rule_to_token_type.get(rule))
                    .copied()
                    .unwrap_or(token::INVALID_TYPE);
                (ttype, c.lexer_action_executor.clone())
            });

        let mut state = DfaState::new(configs);
        if let Some((ttype, executor)) = accepting {
            state.is_accept = true;
            state.prediction = ttype;
            state.lexer_action_executor = executor;
        }
        dfa.add_state(state)
    }
}

//! Adaptive LL(*) prediction for parser decisions.
//!
//! Prediction first runs in SLL mode, where `$` contexts act as wildcards and
//! results are cached in the decision's DFA. When SLL reaches a conflict the
//! DFA state is marked as needing full context, and the decision is retried
//! with the parser's actual invocation stack (LL). Full-context results are
//! never cached, since they depend on the stack.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use allstar_atn::{Atn, TransitionKind};
use allstar_core::{IntStream, token};

use crate::config::AtnConfig;
use crate::config_set::{AltSet, AtnConfigSet};
use crate::context::{ContextRef, EMPTY_RETURN_STATE, MergeCache, PredictionContext, PredictionContextCache};
use crate::dfa::{Dfa, DfaCache, DfaState, DfaTarget, PredPrediction};
use crate::error::PredictionError;
use crate::host::PredictionHost;
use crate::prediction_mode::{
    PredictionMode, all_configs_in_rule_stop_states, all_subsets_conflict, all_subsets_equal,
    conflicting_alt_subsets, has_config_in_rule_stop_state,
    has_sll_conflict_terminating_prediction, resolves_to_just_one_viable_alt, single_viable_alt,
};
use crate::semantic::SemanticContext;
use crate::trace::Tracer;

/// Chooses alternatives for parser decisions.
///
/// The DFA and context caches are shared (`Arc`), so every parser built over
/// the same ATN can share what earlier parses learned.
#[derive(Debug)]
pub struct ParserAtnSimulator {
    atn: Arc<Atn>,
    dfa: Arc<DfaCache>,
    context_cache: Arc<PredictionContextCache>,
    mode: PredictionMode,
}

impl ParserAtnSimulator {
    pub fn new(atn: Arc<Atn>, dfa: Arc<DfaCache>, context_cache: Arc<PredictionContextCache>) -> Self {
        Self {
            atn,
            dfa,
            context_cache,
            mode: PredictionMode::default(),
        }
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

    pub fn prediction_mode(&self) -> PredictionMode {
        self.mode
    }

    pub fn set_prediction_mode(&mut self, mode: PredictionMode) {
        self.mode = mode;
    }

    /// Drops every cached DFA state of every decision.
    pub fn clear_dfa(&self) {
        self.dfa.reset();
    }

    /// Predicts which alternative of `decision` the input starting at the
    /// current position matches.
    ///
    /// `outer` lists the invoking states of the enclosing rule invocations,
    /// innermost first; it is only consulted when SLL prediction conflicts.
    /// The input is restored to its starting position before returning.
    pub fn adaptive_predict<I, H, T>(
        &self,
        input: &mut I,
        decision: usize,
        outer: &[usize],
        host: &mut H,
        tracer: &mut T,
    ) -> Result<usize, PredictionError>
    where
        I: IntStream + ?Sized,
        H: PredictionHost + ?Sized,
        T: Tracer + ?Sized,
    {
        let mut dfa = self
            .dfa
            .write(decision)
            .ok_or(PredictionError::UnknownDecision(decision))?;

        let start_index = input.index();
        let mark = input.mark();
        tracer.trace_predict_start(decision, start_index, input.la(1));

        let start_rule = self.atn.state(dfa.atn_start_state).rule_index;
        let result = {
            let mut prediction = Prediction {
                atn: &self.atn,
                mode: self.mode,
                context_cache: &self.context_cache,
                input: &mut *input,
                host: &mut *host,
                tracer: &mut *tracer,
                outer,
                decision,
                start_index,
                start_rule,
                precedence_dfa: dfa.is_precedence_dfa(),
                merge_cache: MergeCache::default(),
            };
            prediction.predict(&mut dfa)
        };
        drop(dfa);

        input.seek(start_index);
        input.release(mark);

        match &result {
            Ok(alt) => tracer.trace_predict_result(decision, *alt),
            Err(PredictionError::NoViableAlt {
                offending_index, ..
            }) => tracer.trace_no_viable_alt(decision, *offending_index),
            Err(_) => {}
        }
        result
    }
}

/// State of one `adaptive_predict` call.
struct Prediction<'p, I: ?Sized, H: ?Sized, T: ?Sized> {
    atn: &'p Atn,
    mode: PredictionMode,
    context_cache: &'p PredictionContextCache,
    input: &'p mut I,
    host: &'p mut H,
    tracer: &'p mut T,
    outer: &'p [usize],
    decision: usize,
    start_index: usize,
    /// Rule containing the decision.
    start_rule: Option<usize>,
    precedence_dfa: bool,
    merge_cache: MergeCache,
}

impl<I, H, T> Prediction<'_, I, H, T>
where
    I: IntStream + ?Sized,
    H: PredictionHost + ?Sized,
    T: Tracer + ?Sized,
{
    fn predict(&mut self, dfa: &mut Dfa) -> Result<usize, PredictionError> {
        let precedence = self.host.precedence();
        let s0 = if dfa.is_precedence_dfa() {
            dfa.precedence_start_state(precedence)
        } else {
            dfa.s0
        };

        let s0 = match s0 {
            Some(s0) => s0,
            None => {
                let closure =
                    self.start_state(dfa.atn_start_state, PredictionContext::empty(), false)?;
                if dfa.is_precedence_dfa() {
                    let filtered = self.apply_precedence_filter(&closure)?;
                    let s0 = self.add_dfa_state(dfa, filtered, |_| {})?;
                    dfa.set_precedence_start_state(precedence, s0);
                    s0
                } else {
                    let s0 = self.add_dfa_state(dfa, closure, |_| {})?;
                    dfa.s0 = Some(s0);
                    s0
                }
            }
        };

        self.exec_atn(dfa, s0)
    }

    fn exec_atn(&mut self, dfa: &mut Dfa, s0: usize) -> Result<usize, PredictionError> {
        let mut previous = s0;
        let mut t = self.input.la(1);

        loop {
            let target = match dfa.edge(previous, t) {
                Some(target) => {
                    self.tracer.trace_dfa_edge(self.decision, previous, t, target, true);
                    target
                }
                None => {
                    let target = self.compute_target_state(dfa, previous, t)?;
                    self.tracer.trace_dfa_edge(self.decision, previous, t, target, false);
                    target
                }
            };

            let DfaTarget::State(d) = target else {
                let configs = Arc::clone(&dfa.state(previous).configs);
                let err = self.no_viable_alt(&configs);
                self.input.seek(self.start_index);
                if let Some(alt) = self.syn_valid_or_sem_invalid_alt(&configs) {
                    return Ok(alt);
                }
                return Err(err);
            };

            let state = dfa.state(d);
            let configs = Arc::clone(&state.configs);
            let predicates = state.predicates.clone();
            let (requires_full_context, is_accept, prediction) =
                (state.requires_full_context, state.is_accept, state.prediction);

            if requires_full_context && self.mode != PredictionMode::Sll {
                let mut conflicting = configs.conflicting_alts.clone();
                if let Some(predicates) = &predicates {
                    let conflict_index = self.input.index();
                    if conflict_index != self.start_index {
                        self.input.seek(self.start_index);
                    }
                    let alts = self.eval_semantic_context(predicates, true);
                    if alts.len() == 1 {
                        return Ok(first_alt(&alts));
                    }
                    conflicting = Some(alts);
                    if conflict_index != self.start_index {
                        self.input.seek(conflict_index);
                    }
                }

                let outer = PredictionContext::from_invoking_states(self.atn, self.outer);
                let s0_closure = self.start_state(dfa.atn_start_state, outer, true)?;
                let stop_index = self.input.index();
                self.host.report_attempting_full_context(
                    self.decision,
                    conflicting.as_ref(),
                    &configs,
                    self.start_index,
                    stop_index,
                );
                self.tracer.trace_full_context(self.decision, conflicting.as_ref());
                return self.exec_atn_with_full_context(s0_closure);
            }

            if is_accept {
                let Some(predicates) = predicates else {
                    return Ok(prediction as usize);
                };
                self.input.seek(self.start_index);
                let alts = self.eval_semantic_context(&predicates, true);
                return match alts.first() {
                    Some(&alt) => Ok(alt),
                    None => Err(self.no_viable_alt(&configs)),
                };
            }

            previous = d;
            if t != token::EOF {
                self.input.consume();
                t = self.input.la(1);
            }
        }
    }

    /// Computes and caches the DFA edge out of `previous` on `t`.
    fn compute_target_state(
        &mut self,
        dfa: &mut Dfa,
        previous: usize,
        t: i32,
    ) -> Result<DfaTarget, PredictionError> {
        let closure = Arc::clone(&dfa.state(previous).configs);
        let Some(mut reach) = self.compute_reach_set(&closure, t, false)? else {
            self.add_dfa_edge(dfa, previous, t, DfaTarget::Error);
            return Ok(DfaTarget::Error);
        };
        self.tracer.trace_reach(self.decision, t, &reach);

        let mut is_accept = false;
        let mut requires_full_context = false;
        let mut prediction = 0;

        if let Some(alt) = unique_alt(&reach) {
            is_accept = true;
            reach.unique_alt = Some(alt);
            prediction = alt;
        } else if has_sll_conflict_terminating_prediction(self.atn, self.mode, &reach) {
            let conflicting = crate::prediction_mode::alts(&conflicting_alt_subsets(&reach));
            prediction = first_alt(&conflicting);
            reach.conflicting_alts = Some(conflicting);
            requires_full_context = true;
            is_accept = true;
        }

        let mut predicates = None;
        if is_accept && reach.has_semantic_context {
            let nalts = self.atn.state(dfa.atn_start_state).num_transitions();
            let alts = conflicting_alts_or_unique_alt(&reach);
            match preds_for_ambig_alts(&alts, &reach, nalts) {
                Some(alt_to_pred) => {
                    predicates = predicate_predictions(&alts, &alt_to_pred);
                    prediction = 0;
                }
                None => prediction = first_alt(&alts),
            }
        }

        let to = self.add_dfa_state(dfa, reach, |state| {
            state.is_accept = is_accept;
            state.requires_full_context = requires_full_context;
            state.prediction = prediction as i32;
            state.predicates = predicates;
        })?;
        self.add_dfa_edge(dfa, previous, t, DfaTarget::State(to));
        Ok(DfaTarget::State(to))
    }

    fn exec_atn_with_full_context(&mut self, s0: AtnConfigSet) -> Result<usize, PredictionError> {
        let mut found_exact_ambig = false;
        let mut previous = s0;
        self.input.seek(self.start_index);
        let mut t = self.input.la(1);

        let (reach, predicted) = loop {
            let Some(mut reach) = self.compute_reach_set(&previous, t, true)? else {
                let err = self.no_viable_alt(&previous);
                self.input.seek(self.start_index);
                if let Some(alt) = self.syn_valid_or_sem_invalid_alt(&previous) {
                    return Ok(alt);
                }
                return Err(err);
            };
            self.tracer.trace_reach(self.decision, t, &reach);

            let altsets = conflicting_alt_subsets(&reach);
            reach.unique_alt = unique_alt(&reach);
            if let Some(alt) = reach.unique_alt {
                break (reach, alt);
            }

            if self.mode != PredictionMode::LlExactAmbigDetection {
                if let Some(alt) = resolves_to_just_one_viable_alt(&altsets) {
                    break (reach, alt);
                }
            } else if all_subsets_conflict(&altsets)
                && all_subsets_equal(&altsets)
                && let Some(alt) = single_viable_alt(&altsets)
            {
                found_exact_ambig = true;
                break (reach, alt);
            }

            previous = reach;
            if t != token::EOF {
                self.input.consume();
                t = self.input.la(1);
            }
        };

        let stop_index = self.input.index();
        if reach.unique_alt.is_some() {
            self.host.report_context_sensitivity(
                self.decision,
                predicted,
                &reach,
                self.start_index,
                stop_index,
            );
            self.tracer.trace_context_sensitivity(self.decision, predicted);
            return Ok(predicted);
        }

        let ambig_alts = reach.alts();
        self.host.report_ambiguity(
            self.decision,
            self.start_index,
            stop_index,
            found_exact_ambig,
            &ambig_alts,
            &reach,
        );
        self.tracer.trace_ambiguity(self.decision, &ambig_alts, found_exact_ambig);
        Ok(predicted)
    }

    /// Configs reachable from `closure` by consuming `t`, closed over
    /// epsilon edges. `None` when nothing survives.
    fn compute_reach_set(
        &mut self,
        closure: &AtnConfigSet,
        t: i32,
        full_ctx: bool,
    ) -> Result<Option<AtnConfigSet>, PredictionError> {
        let atn = self.atn;
        let mut intermediate = AtnConfigSet::new(full_ctx);
        // Configs already at a rule stop cannot consume; they are carried
        // over at EOF (and in full-context mode) so the decision can end.
        let mut skipped_stop_states = Vec::new();

        for c in closure {
            let state = atn.state(c.state);
            if state.is_rule_stop() {
                if full_ctx || t == token::EOF {
                    skipped_stop_states.push(c.clone());
                }
                continue;
            }
            for trans in state.transitions() {
                if trans.matches(t, 0, atn.max_token_type) {
                    intermediate.add(c.at(trans.target), Some(&mut self.merge_cache))?;
                }
            }
        }

        // A single config, or a single alternative, needs no closure to
        // decide.
        let use_intermediate = skipped_stop_states.is_empty()
            && t != token::EOF
            && (intermediate.len() == 1 || unique_alt(&intermediate).is_some());

        let mut reach = if use_intermediate {
            intermediate
        } else {
            let mut reach = AtnConfigSet::new(full_ctx);
            let mut busy = FxHashSet::default();
            for c in &intermediate {
                self.closure(c.clone(), &mut reach, &mut busy, false, full_ctx, t == token::EOF)?;
            }
            reach
        };

        if t == token::EOF {
            reach = self.remove_all_configs_not_in_rule_stop_state(reach, use_intermediate)?;
        }

        if !skipped_stop_states.is_empty()
            && (!full_ctx || !has_config_in_rule_stop_state(atn, &reach))
        {
            for c in skipped_stop_states {
                reach.add(c, Some(&mut self.merge_cache))?;
            }
        }

        Ok((!reach.is_empty()).then_some(reach))
    }

    /// At EOF only configs that can finish their rule matter.
    fn remove_all_configs_not_in_rule_stop_state(
        &mut self,
        configs: AtnConfigSet,
        look_to_end_of_rule: bool,
    ) -> Result<AtnConfigSet, PredictionError> {
        let atn = self.atn;
        if all_configs_in_rule_stop_states(atn, &configs) {
            return Ok(configs);
        }

        let mut result = AtnConfigSet::new(configs.full_ctx);
        for c in &configs {
            let state = atn.state(c.state);
            if state.is_rule_stop() {
                result.add(c.clone(), Some(&mut self.merge_cache))?;
                continue;
            }
            if look_to_end_of_rule
                && state.only_has_epsilon_transitions()
                && atn.next_tokens(c.state).contains(token::EPSILON)
                && let Some(&stop) = state.rule_index.and_then(|r| atn.rule_to_stop_state.get(r))
            {
                result.add(c.at(stop), Some(&mut self.merge_cache))?;
            }
        }
        Ok(result)
    }

    fn start_state(
        &mut self,
        p: usize,
        initial_context: ContextRef,
        full_ctx: bool,
    ) -> Result<AtnConfigSet, PredictionError> {
        let atn = self.atn;
        let mut configs = AtnConfigSet::new(full_ctx);
        for (i, trans) in atn.state(p).transitions().iter().enumerate() {
            let c = AtnConfig::new(trans.target, i + 1, initial_context.clone());
            let mut busy = FxHashSet::default();
            self.closure(c, &mut configs, &mut busy, true, full_ctx, false)?;
        }
        Ok(configs)
    }

    /// Start-state filter for precedence decisions.
    ///
    /// Alternative 1 of a precedence loop continues the loop with another
    /// operator; the others leave the rule. Once precedence predicates are
    /// resolved, a leaving config that reaches the same state with the same
    /// context as a continuing one is redundant. Dropping it makes the
    /// operator bind at the current precedence level.
    fn apply_precedence_filter(&mut self, configs: &AtnConfigSet) -> Result<AtnConfigSet, PredictionError> {
        let mut states_from_alt1: FxHashMap<usize, ContextRef> = FxHashMap::default();
        let mut result = AtnConfigSet::new(configs.full_ctx);

        for c in configs.iter().filter(|c| c.alt == 1) {
            let Some(updated) = c.semantic_context.eval_precedence(&mut *self.host) else {
                continue;
            };
            states_from_alt1.insert(c.state, c.context.clone());
            let c = if updated != c.semantic_context {
                c.at_with_semantic(c.state, updated)
            } else {
                c.clone()
            };
            result.add(c, Some(&mut self.merge_cache))?;
        }

        for c in configs.iter().filter(|c| c.alt != 1) {
            if !c.precedence_filter_suppressed
                && let Some(context) = states_from_alt1.get(&c.state)
                && **context == *c.context
            {
                continue;
            }
            result.add(c.clone(), Some(&mut self.merge_cache))?;
        }
        Ok(result)
    }

    fn closure(
        &mut self,
        config: AtnConfig,
        configs: &mut AtnConfigSet,
        busy: &mut FxHashSet<AtnConfig>,
        collect_predicates: bool,
        full_ctx: bool,
        treat_eof_as_epsilon: bool,
    ) -> Result<(), PredictionError> {
        self.closure_checking_stop_state(
            config,
            configs,
            busy,
            collect_predicates,
            full_ctx,
            0,
            treat_eof_as_epsilon,
        )
    }

    /// `depth` counts rule invocations entered during this closure; it goes
    /// negative once the closure returns past the decision's own rule.
    #[allow(clippy::too_many_arguments)]
    fn closure_checking_stop_state(
        &mut self,
        config: AtnConfig,
        configs: &mut AtnConfigSet,
        busy: &mut FxHashSet<AtnConfig>,
        collect_predicates: bool,
        full_ctx: bool,
        depth: i32,
        treat_eof_as_epsilon: bool,
    ) -> Result<(), PredictionError> {
        if self.atn.state(config.state).is_rule_stop() {
            if !config.context.is_empty() {
                for i in 0..config.context.len() {
                    let return_state = config.context.return_state(i);
                    if return_state == EMPTY_RETURN_STATE {
                        if full_ctx {
                            let c = config.at_with_context(config.state, PredictionContext::empty());
                            configs.add(c, Some(&mut self.merge_cache))?;
                        } else {
                            // No stack information: follow every return edge.
                            self.closure_inner(
                                &config,
                                configs,
                                busy,
                                collect_predicates,
                                full_ctx,
                                depth,
                                treat_eof_as_epsilon,
                            )?;
                        }
                        continue;
                    }

                    let parent = crate::invariants::ensure_parent(&config.context, i);
                    let mut c = AtnConfig::new(return_state, config.alt, parent)
                        .with_semantic(config.semantic_context.clone());
                    c.reaches_into_outer_context = config.reaches_into_outer_context;
                    self.closure_checking_stop_state(
                        c,
                        configs,
                        busy,
                        collect_predicates,
                        full_ctx,
                        depth - 1,
                        treat_eof_as_epsilon,
                    )?;
                }
                return Ok(());
            } else if full_ctx {
                // Reached the end of the start rule with the whole stack consumed.
                configs.add(config, Some(&mut self.merge_cache))?;
                return Ok(());
            }
        }

        self.closure_inner(
            &config,
            configs,
            busy,
            collect_predicates,
            full_ctx,
            depth,
            treat_eof_as_epsilon,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn closure_inner(
        &mut self,
        config: &AtnConfig,
        configs: &mut AtnConfigSet,
        busy: &mut FxHashSet<AtnConfig>,
        collect_predicates: bool,
        full_ctx: bool,
        depth: i32,
        treat_eof_as_epsilon: bool,
    ) -> Result<(), PredictionError> {
        let atn = self.atn;
        let p = atn.state(config.state);
        if !p.only_has_epsilon_transitions() {
            configs.add(config.clone(), Some(&mut self.merge_cache))?;
        }

        for trans in p.transitions() {
            let continue_collecting =
                collect_predicates && !matches!(trans.kind, TransitionKind::Action { .. });
            let Some(mut c) = self.epsilon_target(
                config,
                trans,
                continue_collecting,
                depth == 0,
                full_ctx,
                treat_eof_as_epsilon,
            ) else {
                continue;
            };

            // EOF* and EOF+ would otherwise loop forever.
            if !trans.is_epsilon() && !busy.insert(c.clone()) {
                continue;
            }

            let mut new_depth = depth;
            if p.is_rule_stop() {
                // Fell off the end of the decision rule into an unknown caller.
                if !busy.insert(c.clone()) {
                    continue;
                }
                if self.precedence_dfa
                    && let TransitionKind::Epsilon {
                        outermost_precedence_return: Some(rule),
                    } = trans.kind
                    && Some(rule) == self.start_rule
                {
                    c.precedence_filter_suppressed = true;
                }
                c.reaches_into_outer_context += 1;
                configs.dips_into_outer_context = true;
                new_depth -= 1;
            } else if matches!(trans.kind, TransitionKind::Rule { .. }) && new_depth >= 0 {
                new_depth += 1;
            }

            self.closure_checking_stop_state(
                c,
                configs,
                busy,
                continue_collecting,
                full_ctx,
                new_depth,
                treat_eof_as_epsilon,
            )?;
        }
        Ok(())
    }

    fn epsilon_target(
        &mut self,
        config: &AtnConfig,
        trans: &allstar_atn::Transition,
        collect_predicates: bool,
        in_context: bool,
        full_ctx: bool,
        treat_eof_as_epsilon: bool,
    ) -> Option<AtnConfig> {
        match &trans.kind {
            TransitionKind::Rule { follow_state, .. } => {
                let context = PredictionContext::singleton(config.context.clone(), *follow_state);
                Some(config.at_with_context(trans.target, context))
            }
            TransitionKind::Precedence { precedence } => self.predicate_transition(
                config,
                trans.target,
                SemanticContext::Precedence(*precedence),
                collect_predicates && in_context,
                full_ctx,
            ),
            TransitionKind::Predicate {
                rule_index,
                pred_index,
                ctx_dependent,
            } => self.predicate_transition(
                config,
                trans.target,
                SemanticContext::predicate(*rule_index, *pred_index, *ctx_dependent),
                collect_predicates && (!ctx_dependent || in_context),
                full_ctx,
            ),
            TransitionKind::Action { .. } | TransitionKind::Epsilon { .. } => {
                Some(config.at(trans.target))
            }
            TransitionKind::Atom { .. } | TransitionKind::Range { .. } | TransitionKind::Set(_) => {
                (treat_eof_as_epsilon && trans.matches(token::EOF, 0, 1))
                    .then(|| config.at(trans.target))
            }
            TransitionKind::NotSet(_) | TransitionKind::Wildcard => None,
        }
    }

    /// SLL collects predicates into the config for evaluation at the accept
    /// state. Full-context prediction evaluates them on the spot, with the
    /// input rewound to the decision start.
    fn predicate_transition(
        &mut self,
        config: &AtnConfig,
        target: usize,
        pred: SemanticContext,
        collect: bool,
        full_ctx: bool,
    ) -> Option<AtnConfig> {
        if !collect {
            return Some(config.at(target));
        }
        if full_ctx {
            let current = self.input.index();
            self.input.seek(self.start_index);
            let passed = pred.eval(&mut *self.host);
            self.input.seek(current);
            return passed.then(|| config.at(target));
        }
        let semantic = SemanticContext::and(&config.semantic_context, &pred);
        Some(config.at_with_semantic(target, semantic))
    }

    /// Fallback when prediction dies: prefer an alternative that already
    /// completed the decision rule, first among configs whose predicates
    /// hold, then among those whose predicates fail.
    fn syn_valid_or_sem_invalid_alt(&mut self, configs: &AtnConfigSet) -> Option<usize> {
        let mut valid = Vec::new();
        let mut invalid = Vec::new();
        for c in configs {
            if c.semantic_context.is_none() || c.semantic_context.eval(&mut *self.host) {
                valid.push(c);
            } else {
                invalid.push(c);
            }
        }
        self.alt_that_finished_decision_entry_rule(&valid)
            .or_else(|| self.alt_that_finished_decision_entry_rule(&invalid))
    }

    fn alt_that_finished_decision_entry_rule(&self, configs: &[&AtnConfig]) -> Option<usize> {
        configs
            .iter()
            .filter(|c| {
                c.outer_context_depth() > 0
                    || (self.atn.state(c.state).is_rule_stop() && c.context.has_empty_path())
            })
            .map(|c| c.alt)
            .min()
    }

    fn eval_semantic_context(&mut self, predicates: &[PredPrediction], complete: bool) -> AltSet {
        let mut alts = AltSet::new();
        for pair in predicates {
            if pair.pred.is_none() || pair.pred.eval(&mut *self.host) {
                alts.insert(pair.alt);
                if !complete {
                    break;
                }
            }
        }
        alts
    }

    fn add_dfa_state(
        &mut self,
        dfa: &mut Dfa,
        mut configs: AtnConfigSet,
        setup: impl FnOnce(&mut DfaState),
    ) -> Result<usize, PredictionError> {
        if !configs.is_readonly() {
            configs.optimize_configs(self.context_cache)?;
        }
        let mut state = DfaState::new(configs);
        setup(&mut state);
        Ok(dfa.add_state(state))
    }

    fn add_dfa_edge(&self, dfa: &mut Dfa, from: usize, t: i32, to: DfaTarget) {
        if (token::EOF..=self.atn.max_token_type).contains(&t) {
            dfa.set_edge(from, t, to);
        }
    }

    fn no_viable_alt(&self, configs: &AtnConfigSet) -> PredictionError {
        PredictionError::NoViableAlt {
            decision: self.decision,
            start_index: self.start_index,
            offending_index: self.input.index(),
            dead_end_alts: configs.alts(),
        }
    }
}

/// The alternative shared by every config, if there is exactly one.
fn unique_alt(configs: &AtnConfigSet) -> Option<usize> {
    let mut alts = configs.iter().map(|c| c.alt);
    let first = alts.next()?;
    alts.all(|alt| alt == first).then_some(first)
}

fn first_alt(alts: &AltSet) -> usize {
    alts.first().copied().unwrap_or(0)
}

fn conflicting_alts_or_unique_alt(configs: &AtnConfigSet) -> AltSet {
    match configs.unique_alt {
        Some(alt) => AltSet::from([alt]),
        None => configs.conflicting_alts.clone().unwrap_or_default(),
    }
}

/// Per-alternative predicate (OR of its configs' predicates), indexed by
/// alternative. `None` when no ambiguous alternative is predicated.
fn preds_for_ambig_alts(
    ambig_alts: &AltSet,
    configs: &AtnConfigSet,
    nalts: usize,
) -> Option<Vec<SemanticContext>> {
    let mut alt_to_pred: Vec<Option<SemanticContext>> = vec![None; nalts + 1];
    for c in configs {
        if !ambig_alts.contains(&c.alt) {
            continue;
        }
        if let Some(slot) = alt_to_pred.get_mut(c.alt) {
            *slot = Some(match slot.take() {
                None => c.semantic_context.clone(),
                Some(pred) => SemanticContext::or(&pred, &c.semantic_context),
            });
        }
    }

    let alt_to_pred: Vec<SemanticContext> =
        alt_to_pred.into_iter().map(Option::unwrap_or_default).collect();
    let predicated = alt_to_pred.iter().skip(1).filter(|p| !p.is_none()).count();
    (predicated > 0).then_some(alt_to_pred)
}

fn predicate_predictions(
    ambig_alts: &AltSet,
    alt_to_pred: &[SemanticContext],
) -> Option<Vec<PredPrediction>> {
    let mut pairs = Vec::new();
    let mut contains_predicate = false;
    for (alt, pred) in alt_to_pred.iter().enumerate().skip(1) {
        if ambig_alts.contains(&alt) {
            pairs.push(PredPrediction {
                pred: pred.clone(),
                alt,
            });
        }
        if !pred.is_none() {
            contains_predicate = true;
        }
    }
    contains_predicate.then_some(pairs)
}

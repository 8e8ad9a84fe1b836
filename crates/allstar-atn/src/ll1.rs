//! LL(1) lookahead over the ATN.
//!
//! Walks epsilon edges from a state and collects the symbols that can be
//! matched next. The call stack is a list of follow states; rule calls push,
//! reaching a rule stop pops. An absent context ("no caller known") turns a
//! reachable rule end into [`token::EPSILON`]; an empty context (outermost
//! rule) turns it into [`token::EOF`].

use std::collections::HashSet;

use allstar_core::{Interval, IntervalSet, token};

use crate::atn::Atn;
use crate::transition::TransitionKind;

/// Marker added to a lookahead set when a predicate blocks the walk.
pub const HIT_PRED: i32 = token::INVALID_TYPE;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Base {
    /// Caller unknown; leaving the rule yields EPSILON.
    Unknown,
    /// Outermost rule; leaving it yields EOF.
    Outermost,
}

pub struct Ll1Analyzer<'a> {
    atn: &'a Atn,
}

impl<'a> Ll1Analyzer<'a> {
    pub fn new(atn: &'a Atn) -> Self {
        Self { atn }
    }

    /// Lookahead from `state` up to `stop_state` (if given).
    ///
    /// `invoking_states` is the caller chain, innermost first; `None` means the
    /// caller is unknown.
    pub fn look(
        &self,
        state: usize,
        stop_state: Option<usize>,
        invoking_states: Option<&[usize]>,
    ) -> IntervalSet {
        let (base, stack) = match invoking_states {
            None => (Base::Unknown, Vec::new()),
            Some(chain) => (
                Base::Outermost,
                chain
                    .iter()
                    .rev()
                    .map(|&s| self.atn.follow_state_of(s))
                    .collect(),
            ),
        };
        let mut walk = Walk {
            atn: self.atn,
            stop_state,
            see_thru_preds: true,
            add_eof: true,
            base,
            stack,
            busy: HashSet::new(),
            called: HashSet::new(),
            found: Vec::new(),
        };
        walk.visit(state);
        walk.finish()
    }

    /// One lookahead set per alternative of a decision state. Predicates are
    /// not traversed; an alternative that hits one, or has no lookahead,
    /// yields `None`.
    pub fn decision_lookahead(&self, state: usize) -> Vec<Option<IntervalSet>> {
        let s = self.atn.state(state);
        s.transitions()
            .iter()
            .map(|t| {
                let mut walk = Walk {
                    atn: self.atn,
                    stop_state: None,
                    see_thru_preds: false,
                    add_eof: false,
                    base: Base::Outermost,
                    stack: Vec::new(),
                    busy: HashSet::new(),
                    called: HashSet::new(),
                    found: Vec::new(),
                };
                walk.visit(t.target);
                let set = walk.finish();
                (!set.is_empty() && !set.contains(HIT_PRED)).then_some(set)
            })
            .collect()
    }
}

struct Walk<'a> {
    atn: &'a Atn,
    stop_state: Option<usize>,
    see_thru_preds: bool,
    add_eof: bool,
    base: Base,
    stack: Vec<usize>,
    busy: HashSet<(usize, Base, Vec<usize>)>,
    /// Rules currently being entered, to cut left-recursive cycles.
    called: HashSet<usize>,
    found: Vec<Interval>,
}

impl Walk<'_> {
    fn finish(self) -> IntervalSet {
        self.found.into_iter().collect()
    }

    fn at_unknown(&self) -> bool {
        self.base == Base::Unknown && self.stack.is_empty()
    }

    fn at_outermost(&self) -> bool {
        self.base == Base::Outermost && self.stack.is_empty()
    }

    fn visit(&mut self, state: usize) {
        if !self.busy.insert((state, self.base, self.stack.clone())) {
            return;
        }

        let atn = self.atn;
        let s = atn.state(state);

        if self.stop_state == Some(state) {
            if self.at_unknown() {
                self.found.push(Interval::single(token::EPSILON));
                return;
            }
            if self.at_outermost() && self.add_eof {
                self.found.push(Interval::single(token::EOF));
                return;
            }
        }

        if s.is_rule_stop() {
            if self.at_unknown() {
                self.found.push(Interval::single(token::EPSILON));
                return;
            }
            if self.at_outermost() && self.add_eof {
                self.found.push(Interval::single(token::EOF));
                return;
            }
            if let Some(follow) = self.stack.pop() {
                let rule = s.rule_index;
                let was_called = rule.is_some_and(|r| self.called.remove(&r));
                self.visit(follow);
                if let (true, Some(r)) = (was_called, rule) {
                    self.called.insert(r);
                }
                self.stack.push(follow);
                return;
            }
        }

        for t in s.transitions() {
            match &t.kind {
                TransitionKind::Rule {
                    rule_index,
                    follow_state,
                    ..
                } => {
                    if self.called.contains(rule_index) {
                        continue;
                    }
                    self.stack.push(*follow_state);
                    self.called.insert(*rule_index);
                    self.visit(t.target);
                    self.called.remove(rule_index);
                    self.stack.pop();
                }
                TransitionKind::Predicate { .. } | TransitionKind::Precedence { .. } => {
                    if self.see_thru_preds {
                        self.visit(t.target);
                    } else {
                        self.found.push(Interval::single(HIT_PRED));
                    }
                }
                _ if t.is_epsilon() => self.visit(t.target),
                TransitionKind::Wildcard => self
                    .found
                    .push(Interval::new(token::MIN_USER_TOKEN_TYPE, self.atn.max_token_type)),
                TransitionKind::NotSet(set) => {
                    let allowed = set
                        .complement_range(token::MIN_USER_TOKEN_TYPE, self.atn.max_token_type);
                    self.found.extend_from_slice(allowed.intervals());
                }
                _ => {
                    if let Some(label) = t.label() {
                        self.found.extend_from_slice(label.intervals());
                    }
                }
            }
        }
    }
}

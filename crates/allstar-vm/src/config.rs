//! ATN configurations: one live path through the ATN during prediction.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::context::ContextRef;
use crate::lexer_executor::LexerActionExecutor;
use crate::semantic::SemanticContext;

/// A (state, alternative, call stack, predicate) tuple.
#[derive(Clone, Debug)]
pub struct AtnConfig {
    pub state: usize,
    /// 1-based alternative of the decision this path started from.
    pub alt: usize,
    pub context: ContextRef,
    pub semantic_context: SemanticContext,
    /// How many rule stop states this path returned through past the
    /// decision's own rule.
    pub reaches_into_outer_context: usize,
    /// Set when a precedence rule's outermost return leaves the decision
    /// rule; such configs survive the precedence filter.
    pub precedence_filter_suppressed: bool,
    pub lexer_action_executor: Option<Arc<LexerActionExecutor>>,
    pub passed_through_non_greedy_decision: bool,
}

impl AtnConfig {
    pub fn new(state: usize, alt: usize, context: ContextRef) -> Self {
        Self {
            state,
            alt,
            context,
            semantic_context: SemanticContext::None,
            reaches_into_outer_context: 0,
            precedence_filter_suppressed: false,
            lexer_action_executor: None,
            passed_through_non_greedy_decision: false,
        }
    }

    pub fn with_semantic(mut self, semantic_context: SemanticContext) -> Self {
        self.semantic_context = semantic_context;
        self
    }

    /// Same path, moved to `state`.
    pub fn at(&self, state: usize) -> Self {
        Self {
            state,
            ..self.clone()
        }
    }

    /// Same path, moved to `state` with a new call stack.
    pub fn at_with_context(&self, state: usize, context: ContextRef) -> Self {
        Self {
            state,
            context,
            ..self.clone()
        }
    }

    /// Same path, moved to `state` under a new predicate.
    pub fn at_with_semantic(&self, state: usize, semantic_context: SemanticContext) -> Self {
        Self {
            state,
            semantic_context,
            ..self.clone()
        }
    }

    /// Nesting depth past the decision rule.
    pub fn outer_context_depth(&self) -> usize {
        self.reaches_into_outer_context
    }

    pub fn has_empty_context(&self) -> bool {
        self.context.is_empty()
    }
}

impl PartialEq for AtnConfig {
    fn eq(&self, other: &Self) -> bool {
        self.state == other.state
            && self.alt == other.alt
            && (Arc::ptr_eq(&self.context, &other.context) || self.context == other.context)
            && self.semantic_context == other.semantic_context
            && self.precedence_filter_suppressed == other.precedence_filter_suppressed
            && self.passed_through_non_greedy_decision == other.passed_through_non_greedy_decision
            && self.lexer_action_executor == other.lexer_action_executor
    }
}

impl Eq for AtnConfig {}

impl Hash for AtnConfig {
    fn hash<H: Hasher>(&self, h: &mut H) {
        self.state.hash(h);
        self.alt.hash(h);
        self.context.hash(h);
        self.semantic_context.hash(h);
        self.passed_through_non_greedy_decision.hash(h);
        self.lexer_action_executor.hash(h);
    }
}

impl fmt::Display for AtnConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},[{}]", self.state, self.alt, self.context)?;
        if !self.semantic_context.is_none() {
            write!(f, ",{}", self.semantic_context)?;
        }
        if self.reaches_into_outer_context > 0 {
            write!(f, ",up={}", self.reaches_into_outer_context)?;
        }
        write!(f, ")")
    }
}

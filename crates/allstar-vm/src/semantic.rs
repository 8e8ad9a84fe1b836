//! Semantic contexts: predicate trees attached to configurations.

use std::fmt;

use crate::host::PredictionHost;

/// A boolean combination of grammar predicates.
///
/// Operand lists of `And`/`Or` are flattened, sorted, and deduplicated, and
/// hold at most one precedence predicate (the lowest for `And`, the highest
/// for `Or`), so equal trees compare equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum SemanticContext {
    /// Always true.
    #[default]
    None,
    Predicate {
        rule_index: usize,
        pred_index: usize,
        ctx_dependent: bool,
    },
    /// `precedence >= current precedence`.
    Precedence(i32),
    And(Vec<SemanticContext>),
    Or(Vec<SemanticContext>),
}

impl SemanticContext {
    pub fn predicate(rule_index: usize, pred_index: usize, ctx_dependent: bool) -> Self {
        SemanticContext::Predicate {
            rule_index,
            pred_index,
            ctx_dependent,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, SemanticContext::None)
    }

    /// Conjunction. `None` is the identity.
    pub fn and(a: &SemanticContext, b: &SemanticContext) -> SemanticContext {
        if a.is_none() {
            return b.clone();
        }
        if b.is_none() {
            return a.clone();
        }
        let mut operands = Vec::new();
        flatten(a, &mut operands, |c| matches!(c, SemanticContext::And(_)));
        flatten(b, &mut operands, |c| matches!(c, SemanticContext::And(_)));
        reduce(operands, i32::min, SemanticContext::And)
    }

    /// Disjunction. `None` absorbs.
    pub fn or(a: &SemanticContext, b: &SemanticContext) -> SemanticContext {
        if a.is_none() || b.is_none() {
            return SemanticContext::None;
        }
        let mut operands = Vec::new();
        flatten(a, &mut operands, |c| matches!(c, SemanticContext::Or(_)));
        flatten(b, &mut operands, |c| matches!(c, SemanticContext::Or(_)));
        reduce(operands, i32::max, SemanticContext::Or)
    }

    pub fn eval<H: PredictionHost + ?Sized>(&self, host: &mut H) -> bool {
        match self {
            SemanticContext::None => true,
            SemanticContext::Predicate {
                rule_index,
                pred_index,
                ..
            } => host.sempred(*rule_index, *pred_index),
            SemanticContext::Precedence(p) => host.precpred(*p),
            SemanticContext::And(ops) => ops.iter().all(|op| op.eval(host)),
            SemanticContext::Or(ops) => ops.iter().any(|op| op.eval(host)),
        }
    }

    /// Resolves precedence predicates against the host, leaving the rest.
    ///
    /// Returns `None` when the context can no longer be true.
    pub fn eval_precedence<H: PredictionHost + ?Sized>(
        &self,
        host: &mut H,
    ) -> Option<SemanticContext> {
        match self {
            SemanticContext::None | SemanticContext::Predicate { .. } => Some(self.clone()),
            SemanticContext::Precedence(p) => host.precpred(*p).then_some(SemanticContext::None),
            SemanticContext::And(ops) => {
                let mut differs = false;
                let mut kept = Vec::new();
                for op in ops {
                    let evaluated = op.eval_precedence(host)?;
                    differs |= evaluated != *op;
                    if !evaluated.is_none() {
                        kept.push(evaluated);
                    }
                }
                if !differs {
                    return Some(self.clone());
                }
                Some(
                    kept.iter()
                        .fold(SemanticContext::None, |acc, op| SemanticContext::and(&acc, op)),
                )
            }
            SemanticContext::Or(ops) => {
                let mut differs = false;
                let mut kept = Vec::new();
                for op in ops {
                    let evaluated = op.eval_precedence(host);
                    differs |= evaluated.as_ref() != Some(op);
                    match evaluated {
                        Some(SemanticContext::None) => return Some(SemanticContext::None),
                        Some(ctx) => kept.push(ctx),
                        None => {}
                    }
                }
                if !differs {
                    return Some(self.clone());
                }
                let (first, rest) = kept.split_first()?;
                Some(
                    rest.iter()
                        .fold(first.clone(), |acc, op| SemanticContext::or(&acc, op)),
                )
            }
        }
    }
}

fn flatten(
    ctx: &SemanticContext,
    out: &mut Vec<SemanticContext>,
    same_kind: impl Fn(&SemanticContext) -> bool,
) {
    if same_kind(ctx) {
        if let SemanticContext::And(ops) | SemanticContext::Or(ops) = ctx {
            out.extend(ops.iter().cloned());
        }
    } else {
        out.push(ctx.clone());
    }
}

fn reduce(
    operands: Vec<SemanticContext>,
    pick: fn(i32, i32) -> i32,
    build: fn(Vec<SemanticContext>) -> SemanticContext,
) -> SemanticContext {
    let mut precedence: Option<i32> = None;
    let mut rest: Vec<SemanticContext> = Vec::with_capacity(operands.len());
    for op in operands {
        match op {
            SemanticContext::Precedence(p) => {
                precedence = Some(precedence.map_or(p, |q| pick(p, q)));
            }
            other => rest.push(other),
        }
    }
    if let Some(p) = precedence {
        rest.push(SemanticContext::Precedence(p));
    }
    rest.sort();
    rest.dedup();

    if rest.len() == 1 {
        return rest.remove(0);
    }
    build(rest)
}

impl fmt::Display for SemanticContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticContext::None => write!(f, "true"),
            SemanticContext::Predicate {
                rule_index,
                pred_index,
                ..
            } => write!(f, "{{{rule_index}:{pred_index}}}?"),
            SemanticContext::Precedence(p) => write!(f, "{{{p}>=prec}}?"),
            SemanticContext::And(ops) => join(f, ops, "&&"),
            SemanticContext::Or(ops) => join(f, ops, "||"),
        }
    }
}

fn join(f: &mut fmt::Formatter<'_>, ops: &[SemanticContext], sep: &str) -> fmt::Result {
    for (i, op) in ops.iter().enumerate() {
        if i > 0 {
            write!(f, "{sep}")?;
        }
        write!(f, "{op}")?;
    }
    Ok(())
}

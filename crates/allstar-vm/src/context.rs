//! Prediction contexts: the graph-structured stack of rule return states.
//!
//! A context records where each configuration returns to once its rule
//! finishes. Contexts are immutable and shared through [`Arc`]; equal graphs
//! compare equal structurally, and the hash is computed once at construction.
//!
//! Merging follows the graph-structured-stack rules:
//! - `$` (the empty context) means "return to whatever invoked the decision".
//!   In SLL prediction it acts as a wildcard that absorbs any other stack;
//!   in full-context prediction it is kept next to the other return states.
//! - Two stacks with the same return state merge their parents.
//! - Everything else becomes an array of sorted, unique return states.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, LazyLock, Mutex, PoisonError};

use allstar_atn::Atn;
use rustc_hash::{FxHashMap, FxHasher};

/// Return state marking the bottom of the stack (`$`).
pub const EMPTY_RETURN_STATE: usize = i32::MAX as usize;

pub type ContextRef = Arc<PredictionContext>;

/// Memo table for one prediction: `(a, b) -> merge(a, b)`.
pub type MergeCache = FxHashMap<(ContextRef, ContextRef), ContextRef>;

static EMPTY: LazyLock<ContextRef> = LazyLock::new(|| {
    Arc::new(PredictionContext {
        hash: 1,
        kind: ContextKind::Empty,
    })
});

#[derive(Debug, Clone)]
pub enum ContextKind {
    /// `$`: no information about the invoking rule.
    Empty,
    Singleton {
        parent: ContextRef,
        return_state: usize,
    },
    /// Sorted unique return states. A `$` entry (always last) has no parent.
    Array {
        parents: Vec<Option<ContextRef>>,
        return_states: Vec<usize>,
    },
}

#[derive(Debug)]
pub struct PredictionContext {
    hash: u64,
    kind: ContextKind,
}

impl PredictionContext {
    pub fn empty() -> ContextRef {
        Arc::clone(&EMPTY)
    }

    pub fn singleton(parent: ContextRef, return_state: usize) -> ContextRef {
        let mut h = FxHasher::default();
        parent.hash.hash(&mut h);
        return_state.hash(&mut h);
        Arc::new(Self {
            hash: h.finish(),
            kind: ContextKind::Singleton {
                parent,
                return_state,
            },
        })
    }

    /// Builds an array context. Callers keep `return_states` sorted.
    pub fn array(parents: Vec<Option<ContextRef>>, return_states: Vec<usize>) -> ContextRef {
        debug_assert_eq!(parents.len(), return_states.len());
        let mut h = FxHasher::default();
        for parent in &parents {
            parent.as_ref().map_or(0, |p| p.hash).hash(&mut h);
        }
        return_states.hash(&mut h);
        Arc::new(Self {
            hash: h.finish(),
            kind: ContextKind::Array {
                parents,
                return_states,
            },
        })
    }

    /// Single-entry context: `$` when there is no parent, a singleton otherwise.
    fn single(parent: Option<ContextRef>, return_state: usize) -> ContextRef {
        match parent {
            Some(parent) => Self::singleton(parent, return_state),
            None => Self::empty(),
        }
    }

    /// Context for a parser positioned inside a chain of rule invocations.
    ///
    /// `invoking_states` lists the states that invoked each enclosing rule,
    /// innermost first. The root rule has no entry.
    pub fn from_invoking_states(atn: &Atn, invoking_states: &[usize]) -> ContextRef {
        invoking_states
            .iter()
            .rev()
            .fold(Self::empty(), |parent, &invoking| {
                Self::singleton(parent, atn.follow_state_of(invoking))
            })
    }

    pub fn kind(&self) -> &ContextKind {
        &self.kind
    }

    pub fn hash_code(&self) -> u64 {
        self.hash
    }

    pub fn len(&self) -> usize {
        match &self.kind {
            ContextKind::Empty | ContextKind::Singleton { .. } => 1,
            ContextKind::Array { return_states, .. } => return_states.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.kind, ContextKind::Empty)
    }

    pub fn parent(&self, i: usize) -> Option<&ContextRef> {
        match &self.kind {
            ContextKind::Empty => None,
            ContextKind::Singleton { parent, .. } => Some(parent),
            ContextKind::Array { parents, .. } => parents[i].as_ref(),
        }
    }

    pub fn return_state(&self, i: usize) -> usize {
        match &self.kind {
            ContextKind::Empty => EMPTY_RETURN_STATE,
            ContextKind::Singleton { return_state, .. } => *return_state,
            ContextKind::Array { return_states, .. } => return_states[i],
        }
    }

    /// True when one of the stacks bottoms out in `$`.
    pub fn has_empty_path(&self) -> bool {
        self.return_state(self.len() - 1) == EMPTY_RETURN_STATE
    }

    fn is_singleton_like(&self) -> bool {
        !matches!(self.kind, ContextKind::Array { .. })
    }

    fn to_parts(&self) -> (Vec<Option<ContextRef>>, Vec<usize>) {
        match &self.kind {
            ContextKind::Empty => (vec![None], vec![EMPTY_RETURN_STATE]),
            ContextKind::Singleton {
                parent,
                return_state,
            } => (vec![Some(Arc::clone(parent))], vec![*return_state]),
            ContextKind::Array {
                parents,
                return_states,
            } => (parents.clone(), return_states.clone()),
        }
    }
}

fn same(a: &ContextRef, b: &ContextRef) -> bool {
    Arc::ptr_eq(a, b) || a == b
}

fn same_opt(a: Option<&ContextRef>, b: Option<&ContextRef>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => same(a, b),
        (None, None) => true,
        _ => false,
    }
}

impl PartialEq for PredictionContext {
    fn eq(&self, other: &Self) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        if self.hash != other.hash {
            return false;
        }
        match (&self.kind, &other.kind) {
            (ContextKind::Empty, ContextKind::Empty) => true,
            (
                ContextKind::Singleton {
                    parent: pa,
                    return_state: ra,
                },
                ContextKind::Singleton {
                    parent: pb,
                    return_state: rb,
                },
            ) => ra == rb && same(pa, pb),
            (
                ContextKind::Array {
                    parents: pa,
                    return_states: ra,
                },
                ContextKind::Array {
                    parents: pb,
                    return_states: rb,
                },
            ) => {
                ra == rb
                    && pa
                        .iter()
                        .zip(pb)
                        .all(|(a, b)| same_opt(a.as_ref(), b.as_ref()))
            }
            _ => false,
        }
    }
}

impl Eq for PredictionContext {}

impl Hash for PredictionContext {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}

impl fmt::Display for PredictionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ContextKind::Empty => write!(f, "$"),
            ContextKind::Singleton {
                parent,
                return_state,
            } => write!(f, "{return_state} {parent}"),
            ContextKind::Array {
                parents,
                return_states,
            } => {
                write!(f, "[")?;
                for (i, (parent, rs)) in parents.iter().zip(return_states).enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    if *rs == EMPTY_RETURN_STATE {
                        write!(f, "$")?;
                        continue;
                    }
                    match parent {
                        Some(p) => write!(f, "{rs} {p}")?,
                        None => write!(f, "{rs} null")?,
                    }
                }
                write!(f, "]")
            }
        }
    }
}

/// Merges two contexts.
///
/// `root_is_wildcard` selects SLL semantics, where `$` absorbs the other
/// operand. The result is memoized in `cache` when one is supplied.
pub fn merge(
    a: &ContextRef,
    b: &ContextRef,
    root_is_wildcard: bool,
    cache: Option<&mut MergeCache>,
) -> ContextRef {
    if same(a, b) {
        return Arc::clone(a);
    }

    if a.is_singleton_like() && b.is_singleton_like() {
        return merge_singletons(a, b, root_is_wildcard, cache);
    }

    if root_is_wildcard {
        if a.is_empty() {
            return Arc::clone(a);
        }
        if b.is_empty() {
            return Arc::clone(b);
        }
    }

    merge_arrays(a, b, root_is_wildcard, cache)
}

fn cached(cache: &Option<&mut MergeCache>, a: &ContextRef, b: &ContextRef) -> Option<ContextRef> {
    let cache = cache.as_ref()?;
    cache
        .get(&(Arc::clone(a), Arc::clone(b)))
        .or_else(|| cache.get(&(Arc::clone(b), Arc::clone(a))))
        .cloned()
}

fn remember(
    cache: &mut Option<&mut MergeCache>,
    a: &ContextRef,
    b: &ContextRef,
    result: ContextRef,
) -> ContextRef {
    if let Some(cache) = cache.as_deref_mut() {
        cache.insert((Arc::clone(a), Arc::clone(b)), Arc::clone(&result));
    }
    result
}

/// Merges two single-entry contexts (`$` counts as one).
pub fn merge_singletons(
    a: &ContextRef,
    b: &ContextRef,
    root_is_wildcard: bool,
    mut cache: Option<&mut MergeCache>,
) -> ContextRef {
    if let Some(hit) = cached(&cache, a, b) {
        return hit;
    }

    if let Some(root) = merge_root(a, b, root_is_wildcard) {
        return remember(&mut cache, a, b, root);
    }

    // Neither side is `$` past this point.
    let (Some(pa), Some(pb)) = (a.parent(0), b.parent(0)) else {
        return crate::invariants::fail_rootless_singleton();
    };
    let (ra, rb) = (a.return_state(0), b.return_state(0));

    if ra == rb {
        let parent = merge(pa, pb, root_is_wildcard, cache.as_deref_mut());
        if same(&parent, pa) {
            return Arc::clone(a);
        }
        if same(&parent, pb) {
            return Arc::clone(b);
        }
        let merged = PredictionContext::singleton(parent, ra);
        return remember(&mut cache, a, b, merged);
    }

    let merged = if same(pa, pb) {
        let shared = Some(Arc::clone(pa));
        PredictionContext::array(vec![shared.clone(), shared], vec![ra.min(rb), ra.max(rb)])
    } else if ra < rb {
        PredictionContext::array(vec![Some(Arc::clone(pa)), Some(Arc::clone(pb))], vec![ra, rb])
    } else {
        PredictionContext::array(vec![Some(Arc::clone(pb)), Some(Arc::clone(pa))], vec![rb, ra])
    };
    remember(&mut cache, a, b, merged)
}

/// Handles `$` on either side of a singleton merge.
///
/// With a wildcard root, `$` wins outright. Otherwise `$` and `x` become the
/// two-entry array `[x, $]`. Returns `None` when neither side is `$`.
pub fn merge_root(a: &ContextRef, b: &ContextRef, root_is_wildcard: bool) -> Option<ContextRef> {
    if root_is_wildcard {
        if a.is_empty() || b.is_empty() {
            return Some(PredictionContext::empty());
        }
        return None;
    }

    match (a.is_empty(), b.is_empty()) {
        (true, true) => Some(PredictionContext::empty()),
        (true, false) => Some(with_empty_path(b)),
        (false, true) => Some(with_empty_path(a)),
        (false, false) => None,
    }
}

fn with_empty_path(x: &ContextRef) -> ContextRef {
    PredictionContext::array(
        vec![x.parent(0).cloned(), None],
        vec![x.return_state(0), EMPTY_RETURN_STATE],
    )
}

/// Sorted merge-join of two contexts viewed as arrays.
pub fn merge_arrays(
    a: &ContextRef,
    b: &ContextRef,
    root_is_wildcard: bool,
    mut cache: Option<&mut MergeCache>,
) -> ContextRef {
    if let Some(hit) = cached(&cache, a, b) {
        return hit;
    }

    let (a_parents, a_states) = a.to_parts();
    let (b_parents, b_states) = b.to_parts();

    let mut parents: Vec<Option<ContextRef>> = Vec::with_capacity(a_states.len() + b_states.len());
    let mut states: Vec<usize> = Vec::with_capacity(parents.capacity());

    let (mut i, mut j) = (0, 0);
    while i < a_states.len() && j < b_states.len() {
        let (ap, bp) = (&a_parents[i], &b_parents[j]);
        if a_states[i] == b_states[j] {
            let payload = a_states[i];
            let parent = match (ap, bp) {
                (Some(x), Some(y)) if same(x, y) => Some(Arc::clone(x)),
                (Some(x), Some(y)) => Some(merge(x, y, root_is_wildcard, cache.as_deref_mut())),
                // `$` entries carry no parent
                _ => ap.clone(),
            };
            parents.push(parent);
            states.push(payload);
            i += 1;
            j += 1;
        } else if a_states[i] < b_states[j] {
            parents.push(ap.clone());
            states.push(a_states[i]);
            i += 1;
        } else {
            parents.push(bp.clone());
            states.push(b_states[j]);
            j += 1;
        }
    }
    parents.extend(a_parents[i..].iter().cloned());
    states.extend_from_slice(&a_states[i..]);
    parents.extend(b_parents[j..].iter().cloned());
    states.extend_from_slice(&b_states[j..]);

    if states.len() == 1 {
        let merged = PredictionContext::single(parents.pop().flatten(), states[0]);
        return remember(&mut cache, a, b, merged);
    }

    combine_common_parents(&mut parents);
    let merged = PredictionContext::array(parents, states);

    if *merged == **a {
        return remember(&mut cache, a, b, Arc::clone(a));
    }
    if *merged == **b {
        return remember(&mut cache, a, b, Arc::clone(b));
    }
    remember(&mut cache, a, b, merged)
}

/// Makes structurally equal parents share one allocation.
fn combine_common_parents(parents: &mut [Option<ContextRef>]) {
    let mut unique: FxHashMap<ContextRef, ContextRef> = FxHashMap::default();
    for parent in parents.iter_mut().flatten() {
        let canonical = unique
            .entry(Arc::clone(parent))
            .or_insert_with(|| Arc::clone(parent));
        *parent = Arc::clone(canonical);
    }
}

/// Hash-consing table shared by every simulator built over one ATN.
#[derive(Debug, Default)]
pub struct PredictionContextCache {
    contexts: Mutex<FxHashMap<ContextRef, ContextRef>>,
}

impl PredictionContextCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the canonical instance equal to `ctx`, inserting it if new.
    pub fn add(&self, ctx: ContextRef) -> ContextRef {
        if ctx.is_empty() {
            return PredictionContext::empty();
        }
        let mut contexts = self.contexts.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(contexts.entry(Arc::clone(&ctx)).or_insert(ctx))
    }

    pub fn get(&self, ctx: &ContextRef) -> Option<ContextRef> {
        let contexts = self.contexts.lock().unwrap_or_else(PoisonError::into_inner);
        contexts.get(ctx).cloned()
    }

    pub fn len(&self) -> usize {
        self.contexts.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.contexts.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

/// Rebuilds `ctx` so every node is the cached canonical instance.
pub fn cached_context(
    ctx: &ContextRef,
    cache: &PredictionContextCache,
    visited: &mut FxHashMap<ContextRef, ContextRef>,
) -> ContextRef {
    if ctx.is_empty() {
        return Arc::clone(ctx);
    }
    if let Some(existing) = visited.get(ctx) {
        return Arc::clone(existing);
    }
    if let Some(existing) = cache.get(ctx) {
        visited.insert(Arc::clone(ctx), Arc::clone(&existing));
        return existing;
    }

    let (old_parents, return_states) = ctx.to_parts();
    let mut changed = false;
    let mut parents = Vec::with_capacity(old_parents.len());
    for parent in &old_parents {
        let updated = parent.as_ref().map(|p| cached_context(p, cache, visited));
        if let (Some(old), Some(new)) = (parent, &updated)
            && !Arc::ptr_eq(old, new)
        {
            changed = true;
        }
        parents.push(updated);
    }

    if !changed {
        let canonical = cache.add(Arc::clone(ctx));
        visited.insert(Arc::clone(ctx), Arc::clone(&canonical));
        return canonical;
    }

    let updated = if return_states.len() == 1 {
        PredictionContext::single(parents.pop().flatten(), return_states[0])
    } else {
        PredictionContext::array(parents, return_states)
    };
    let updated = cache.add(updated);
    visited.insert(Arc::clone(&updated), Arc::clone(&updated));
    visited.insert(Arc::clone(ctx), Arc::clone(&updated));
    updated
}

use std::sync::Arc;

use rustc_hash::FxHashMap;

use allstar_atn::test_utils::{EXPR_PARSER, load};

use crate::context::{
    ContextKind, EMPTY_RETURN_STATE, MergeCache, PredictionContext, PredictionContextCache,
    cached_context, merge,
};

fn stack(return_states: &[usize]) -> Arc<PredictionContext> {
    return_states
        .iter()
        .rev()
        .fold(PredictionContext::empty(), |parent, &rs| {
            PredictionContext::singleton(parent, rs)
        })
}

#[test]
fn empty_is_shared() {
    let a = PredictionContext::empty();
    let b = PredictionContext::empty();

    assert!(Arc::ptr_eq(&a, &b));
    assert!(a.is_empty());
    assert!(a.has_empty_path());
    assert_eq!(a.return_state(0), EMPTY_RETURN_STATE);
    assert_eq!(a.to_string(), "$");
}

#[test]
fn structural_equality_and_hash() {
    let a = stack(&[5, 9]);
    let b = stack(&[5, 9]);

    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(a, b);
    assert_eq!(a.hash_code(), b.hash_code());
    assert_ne!(a, stack(&[9, 5]));
    assert_eq!(a.to_string(), "5 9 $");
}

#[test]
fn merge_identical_returns_operand() {
    let a = stack(&[3]);
    let merged = merge(&a, &a, true, None);

    assert!(Arc::ptr_eq(&merged, &a));
}

#[test]
fn merge_wildcard_root_absorbs() {
    let empty = PredictionContext::empty();
    let a = stack(&[3]);

    assert!(merge(&empty, &a, true, None).is_empty());
    assert!(merge(&a, &empty, true, None).is_empty());
}

#[test]
fn merge_full_context_root_keeps_both_paths() {
    let empty = PredictionContext::empty();
    let a = stack(&[3]);

    let merged = merge(&a, &empty, false, None);

    assert_eq!(merged.len(), 2);
    assert_eq!(merged.return_state(0), 3);
    assert_eq!(merged.return_state(1), EMPTY_RETURN_STATE);
    assert!(merged.has_empty_path());
    assert_eq!(merged.to_string(), "[3 $, $]");
}

#[test]
fn merge_singletons_with_distinct_return_states() {
    let a = stack(&[7]);
    let b = stack(&[4]);

    let merged = merge(&a, &b, true, None);

    let ContextKind::Array {
        parents,
        return_states,
    } = merged.kind()
    else {
        panic!("expected array, got {merged}");
    };
    assert_eq!(return_states, &vec![4, 7]);
    // both entries return to the shared `$` parent
    assert!(parents.iter().all(|p| p.as_ref().is_some_and(|p| p.is_empty())));
}

#[test]
fn merge_singletons_with_same_return_state_merges_parents() {
    let a = stack(&[2, 10]);
    let b = stack(&[2, 11]);

    let merged = merge(&a, &b, true, None);

    assert_eq!(merged.len(), 1);
    assert_eq!(merged.return_state(0), 2);
    let parent = merged.parent(0).unwrap();
    assert_eq!(parent.len(), 2);
    assert_eq!(parent.return_state(0), 10);
    assert_eq!(parent.return_state(1), 11);
}

#[test]
fn merge_is_commutative() {
    let a = stack(&[1, 8]);
    let b = stack(&[6]);
    let c = stack(&[1, 9]);

    for root_is_wildcard in [true, false] {
        let ab = merge(&a, &b, root_is_wildcard, None);
        let ba = merge(&b, &a, root_is_wildcard, None);
        assert_eq!(ab, ba);

        let abc = merge(&ab, &c, root_is_wildcard, None);
        let cab = merge(&c, &ab, root_is_wildcard, None);
        assert_eq!(abc, cab);
    }
}

#[test]
fn merge_arrays_is_idempotent() {
    let ab = merge(&stack(&[1]), &stack(&[2]), true, None);
    let again = merge(&ab, &stack(&[2]), true, None);

    assert_eq!(again, ab);
    assert!(Arc::ptr_eq(&again, &ab));
}

#[test]
fn merge_arrays_full_context_keeps_empty_entry() {
    let with_empty = merge(&stack(&[4]), &PredictionContext::empty(), false, None);
    let merged = merge(&with_empty, &stack(&[2]), false, None);

    assert_eq!(merged.len(), 3);
    assert_eq!(merged.return_state(0), 2);
    assert_eq!(merged.return_state(1), 4);
    assert_eq!(merged.return_state(2), EMPTY_RETURN_STATE);
    assert!(merged.parent(2).is_none());
}

#[test]
fn merge_cache_records_results() {
    let a = stack(&[1]);
    let b = stack(&[2]);
    let mut cache = MergeCache::default();

    let first = merge(&a, &b, true, Some(&mut cache));
    let second = merge(&b, &a, true, Some(&mut cache));

    assert!(!cache.is_empty());
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn from_invoking_states_uses_follow_states() {
    let atn = load(EXPR_PARSER);

    // S8 invokes `e` and continues at S11
    let ctx = PredictionContext::from_invoking_states(&atn, &[8]);

    assert_eq!(ctx.len(), 1);
    assert_eq!(ctx.return_state(0), 11);
    assert!(ctx.parent(0).unwrap().is_empty());
    assert!(PredictionContext::from_invoking_states(&atn, &[]).is_empty());
}

#[test]
fn context_cache_canonicalizes() {
    let cache = PredictionContextCache::new();
    let a = stack(&[3, 4]);
    let b = stack(&[3, 4]);

    let mut visited = FxHashMap::default();
    let ca = cached_context(&a, &cache, &mut visited);
    let mut visited = FxHashMap::default();
    let cb = cached_context(&b, &cache, &mut visited);

    assert!(Arc::ptr_eq(&ca, &cb));
    assert_eq!(ca, a);
    assert_eq!(cache.len(), 2);
    assert!(cache.add(PredictionContext::empty()).is_empty());

    cache.clear();
    assert!(cache.is_empty());
}

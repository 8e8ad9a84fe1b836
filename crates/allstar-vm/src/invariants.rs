//! Invariant checks excluded from coverage reports.

#![cfg_attr(coverage_nightly, coverage(off))]

use crate::context::ContextRef;

/// Parent of entry `i`, which must not be the `$` entry.
pub(crate) fn ensure_parent(ctx: &ContextRef, i: usize) -> ContextRef {
    match ctx.parent(i) {
        Some(parent) => ContextRef::clone(parent),
        None => panic!(
            "PredictionContext: entry {i} of {ctx} has no parent \
             (only `$` entries may be rootless)"
        ),
    }
}

pub(crate) fn fail_rootless_singleton() -> ! {
    panic!("PredictionContext: singleton merge reached a `$` operand after root handling")
}

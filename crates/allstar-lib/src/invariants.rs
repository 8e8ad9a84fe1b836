//! Invariant checks excluded from coverage reports.

#![cfg_attr(coverage_nightly, coverage(off))]

pub(crate) fn invalid_node(index: usize) -> ! {
    panic!("ParseTree: node {index} does not belong to this tree")
}

/// The parser tracks a rule context for every call made after `enter_rule`.
pub(crate) fn no_current_rule(operation: &str) -> ! {
    panic!("Parser: `{operation}` called outside of any rule")
}

pub(crate) fn not_a_rule_node(index: usize) -> ! {
    panic!("ParseTree: node {index} is not a rule node")
}

/// Recursion contexts are pushed above a context that has a parent chain
/// ending at the rule's invocation.
pub(crate) fn empty_precedence_stack() -> ! {
    panic!("Parser: precedence stack underflow in `unroll_recursion_contexts`")
}

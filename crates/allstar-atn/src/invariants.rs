//! Invariant checks excluded from coverage reports.

#![cfg_attr(coverage_nightly, coverage(off))]

use crate::atn::Atn;
use crate::state::AtnState;

impl Atn {
    pub(crate) fn ensure_state(&self, number: usize) -> &AtnState {
        self.get(number).unwrap_or_else(|| {
            panic!(
                "Atn: state {number} does not exist \
                 (deserializer must reject dangling state references)"
            )
        })
    }

    pub(crate) fn ensure_state_mut(&mut self, number: usize) -> &mut AtnState {
        self.get_mut(number).unwrap_or_else(|| {
            panic!(
                "Atn: state {number} does not exist \
                 (deserializer must reject dangling state references)"
            )
        })
    }

    pub(crate) fn fail_not_invoking(&self, number: usize) -> ! {
        panic!("Atn: state {number} is not a rule invocation (transition 0 must be a rule edge)")
    }
}

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! The augmented transition network (ATN) for allstar.
//!
//! This crate contains:
//! - The ATN model (states, transitions, lexer actions)
//! - LL(1) lookahead analysis
//! - Both serialized forms (JSON dictionary and char-packed), the
//!   deserializer, serializer, and verifier
//! - Rule bypass generation and a human-readable dump

pub mod atn;
pub mod bypass;
pub mod deserializer;
pub mod dump;
pub mod error;
pub mod lexer_action;
pub mod ll1;
pub mod serialized;
pub mod serializer;
pub mod state;
pub mod test_utils;
pub mod transition;
pub mod verify;

mod invariants;

pub use atn::{Atn, GrammarType};
pub use bypass::BypassAtnCache;
pub use deserializer::{DeserializationOptions, Deserializer};
pub use dump::dump;
pub use error::AtnError;
pub use lexer_action::LexerAction;
pub use ll1::{HIT_PRED, Ll1Analyzer};
pub use serialized::{FormatId, SERIALIZED_VERSION, SerializedAtn};
pub use serializer::{Serializer, serialize};
pub use state::{AtnState, BlockKind, StateKind};
pub use transition::{Transition, TransitionKind};
pub use verify::verify_atn;

#[cfg(test)]
mod deserializer_tests;

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data structures for the allstar recognizer runtime.
//!
//! Everything here is independent of the ATN: integer ranges and sets,
//! reserved token constants, vocabularies, and the stream traits the
//! simulators read from.

pub mod colors;
pub mod interval;
pub mod interval_set;
pub mod stream;
pub mod token;
pub mod utils;
pub mod vocabulary;

pub use colors::Colors;
pub use interval::Interval;
pub use interval_set::{IntervalSet, IntervalSetError};
pub use stream::{CharStream, IntStream, UNKNOWN_SOURCE_NAME};
pub use vocabulary::{Vocabulary, VocabularyError};

#[cfg(test)]
mod interval_set_tests;
#[cfg(test)]
mod vocabulary_tests;

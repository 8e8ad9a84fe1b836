#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adaptive LL(*) prediction for allstar.
//!
//! This crate contains:
//! - Graph-structured prediction contexts and their merge
//! - ATN configurations, configuration sets, and semantic contexts
//! - Per-decision DFA caches shared between recognizers
//! - The lexer and parser ATN simulators
//! - Tracing hooks for the CLI

pub mod config;
pub mod config_set;
pub mod context;
pub mod dfa;
pub mod error;
pub mod host;
pub mod lexer_executor;
pub mod lexer_sim;
pub mod parser_sim;
pub mod prediction_mode;
pub mod semantic;
pub mod trace;

mod invariants;
#[cfg(test)]
mod test_utils;

pub use config::AtnConfig;
pub use config_set::{AltSet, AtnConfigSet};
pub use context::{ContextRef, MergeCache, PredictionContext, PredictionContextCache};
pub use dfa::{Dfa, DfaCache, DfaState, DfaTarget, PredPrediction};
pub use error::{ConfigSetError, PredictionError};
pub use host::{LexerActionHost, LexerHost, NoHost, PredictionHost};
pub use lexer_executor::LexerActionExecutor;
pub use lexer_sim::LexerAtnSimulator;
pub use parser_sim::ParserAtnSimulator;
pub use prediction_mode::PredictionMode;
pub use semantic::SemanticContext;
pub use trace::{NoopTracer, PrintTracer, Tracer, Verbosity};

#[cfg(test)]
mod context_tests;
#[cfg(test)]
mod lexer_sim_tests;
#[cfg(test)]
mod parser_sim_tests;

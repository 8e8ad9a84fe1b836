#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Recognizer runtime for allstar grammars.
//!
//! This crate contains:
//! - Tokens, the character input stream, and buffered token streams
//! - The lexer, driven by a lexer ATN and its mode stack
//! - The parser runtime and the ATN-walking parser interpreter
//! - Arena parse trees with listeners and a walker
//! - Error listeners and the default and bail-out error strategies

pub mod error;
pub mod error_listener;
pub mod error_strategy;
pub mod grammar;
pub mod input_stream;
pub mod interpreter;
pub mod lexer;
pub mod listener;
pub mod parser;
pub mod token;
pub mod token_source;
pub mod token_stream;
pub mod tree;

mod invariants;
#[cfg(test)]
mod test_utils;

pub use error::{Error, RecognitionError, Result};
pub use error_listener::{ConsoleErrorListener, ErrorCollector, ErrorListener};
pub use error_strategy::{BailErrorStrategy, DefaultErrorStrategy, ErrorStrategy};
pub use grammar::Grammar;
pub use input_stream::InputStream;
pub use interpreter::ParserInterpreter;
pub use lexer::{Lexer, LexerCallbacks, LexerState, MatchOutcome, NoCallbacks};
pub use listener::{ParseTreeListener, ParseTreeWalker};
pub use parser::{Parser, ParserCallbacks};
pub use token::{EOF_TEXT, Token};
pub use token_source::{ListTokenSource, TokenSource};
pub use token_stream::CommonTokenStream;
pub use tree::{Node, NodeId, NodeKind, ParseTree, RuleNode};

#[cfg(test)]
mod error_strategy_tests;
#[cfg(test)]
mod input_stream_tests;
#[cfg(test)]
mod interpreter_tests;
#[cfg(test)]
mod lexer_tests;
#[cfg(test)]
mod token_stream_tests;
#[cfg(test)]
mod tree_tests;

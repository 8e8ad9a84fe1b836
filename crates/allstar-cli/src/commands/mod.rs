pub mod atn_loader;
pub mod convert;
pub mod dump;
pub mod lex;
pub mod parse;
pub mod run_common;
pub mod trace;

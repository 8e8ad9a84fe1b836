//! Parse input with a parser ATN and print the tree.

use std::fmt::Write as _;
use std::path::PathBuf;

use allstar_lib::{NodeId, ParserInterpreter};
use allstar_vm::PredictionMode;

use super::run_common::{self, LexerInput, Outcome, ParserInput, PreparedParser, RunError};

pub struct ParseArgs {
    pub parser_atn: PathBuf,
    pub lexer_atn: PathBuf,
    pub tokens: Option<PathBuf>,
    pub rules: Option<Vec<String>>,
    pub modes: Option<Vec<String>>,
    pub input_path: Option<PathBuf>,
    pub input_text: Option<String>,
    /// Rule to start from; the first rule when absent.
    pub start: Option<String>,
    pub prediction: PredictionMode,
    pub bail: bool,
    pub diagnostics: bool,
    pub dfa: bool,
}

impl ParseArgs {
    pub fn parser_input(&self) -> ParserInput<'_> {
        ParserInput {
            parser_atn: &self.parser_atn,
            lexer: LexerInput {
                lexer_atn: &self.lexer_atn,
                tokens: self.tokens.as_deref(),
                modes: self.modes.as_deref(),
                input_path: self.input_path.as_deref(),
                input_text: self.input_text.as_deref(),
            },
            rules: self.rules.as_deref(),
            prediction: self.prediction,
            bail: self.bail,
            diagnostics: self.diagnostics,
            trace: None,
        }
    }
}

pub fn run(args: ParseArgs) {
    match parse(&args) {
        Ok(outcome) => outcome.emit(),
        Err(e) => run_common::fail(e),
    }
}

pub fn parse(args: &ParseArgs) -> Result<Outcome, RunError> {
    let prepared = run_common::prepare_parser(&args.parser_input())?;
    run_parser(prepared, args)
}

/// Runs a prepared parser from the start rule and renders its tree, plus the
/// DFA with `--dfa`.
pub fn run_parser(prepared: PreparedParser, args: &ParseArgs) -> Result<Outcome, RunError> {
    let PreparedParser {
        mut interpreter,
        errors,
        ..
    } = prepared;

    let root = start(&mut interpreter, args.start.as_deref())?;
    let parser = interpreter.parser();
    let mut stdout = String::new();
    writeln!(
        stdout,
        "{}",
        parser.tree().to_string_tree(root, parser.grammar().rule_names())
    )
    .unwrap();
    if args.dfa {
        stdout.push_str(&parser.dump_dfa());
    }

    Ok(Outcome {
        stdout,
        errors: errors.messages(),
    })
}

fn start(
    interpreter: &mut ParserInterpreter,
    rule: Option<&str>,
) -> Result<NodeId, RunError> {
    let root = match rule {
        Some(name) => interpreter.parse_rule(name)?,
        None => interpreter.parse(0)?,
    };
    Ok(root)
}

//! Tokenize input with a lexer ATN.

use std::fmt::Write as _;
use std::path::PathBuf;

use allstar_core::Vocabulary;
use allstar_lib::{CommonTokenStream, ErrorCollector, Token};
use serde::Serialize;

use super::run_common::{self, LexerInput, Outcome, RunError};

pub struct LexArgs {
    pub lexer_atn: PathBuf,
    pub tokens: Option<PathBuf>,
    pub modes: Option<Vec<String>>,
    pub input_path: Option<PathBuf>,
    pub input_text: Option<String>,
    pub json: bool,
}

pub fn run(args: LexArgs) {
    match lex(&args) {
        Ok(outcome) => outcome.emit(),
        Err(e) => run_common::fail(e),
    }
}

/// One token of `--json` output.
#[derive(Serialize)]
struct TokenRow<'a> {
    #[serde(flatten)]
    token: &'a Token,
    name: String,
}

pub fn lex(args: &LexArgs) -> Result<Outcome, RunError> {
    let errors = ErrorCollector::new();
    let (lexer, vocabulary) = run_common::prepare_lexer(
        &LexerInput {
            lexer_atn: &args.lexer_atn,
            tokens: args.tokens.as_deref(),
            modes: args.modes.as_deref(),
            input_path: args.input_path.as_deref(),
            input_text: args.input_text.as_deref(),
        },
        &errors,
    )?;

    let mut stream = CommonTokenStream::new(lexer);
    stream.fill();
    if let Some(e) = stream.take_error() {
        return Err(e.into());
    }

    let stdout = if args.json {
        render_json(stream.tokens(), &vocabulary)
    } else {
        render_lines(stream.tokens(), &vocabulary)
    };
    Ok(Outcome {
        stdout,
        errors: errors.messages(),
    })
}

fn render_lines(tokens: &[Token], vocabulary: &Vocabulary) -> String {
    let mut out = String::new();
    for token in tokens {
        writeln!(out, "{}", token.to_string_with(vocabulary)).unwrap();
    }
    out
}

fn render_json(tokens: &[Token], vocabulary: &Vocabulary) -> String {
    let rows: Vec<TokenRow<'_>> = tokens
        .iter()
        .map(|token| TokenRow {
            token,
            name: vocabulary.display_name(token.token_type),
        })
        .collect();
    let mut json = serde_json::to_string_pretty(&rows).unwrap_or_default();
    json.push('\n');
    json
}

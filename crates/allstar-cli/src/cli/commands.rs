//! Command builders for the CLI.
//!
//! `parse` and `trace` share their flags: `parse` accepts the trace flags
//! too, hidden from `--help`, so switching between them is a one-word edit.

use clap::Command;

use super::args::*;

/// Add hidden trace args (for parse, which does not trace).
fn with_hidden_trace_args(cmd: Command) -> Command {
    cmd.arg(verbose_arg().hide(true))
        .arg(no_result_arg().hide(true))
        .arg(color_arg().hide(true))
}

/// Args common to every command that runs a lexer.
fn with_lexer_args(cmd: Command) -> Command {
    cmd.arg(input_path_arg())
        .arg(input_text_arg())
        .arg(tokens_arg())
        .arg(modes_arg())
}

/// Args common to parse and trace.
fn with_parser_args(cmd: Command) -> Command {
    let cmd = cmd.arg(parser_atn_arg()).arg(lexer_atn_arg());
    with_lexer_args(cmd)
        .arg(rules_arg())
        .arg(start_arg())
        .arg(prediction_arg())
        .arg(bail_arg())
        .arg(diagnostics_arg())
        .arg(dfa_arg())
}

/// Build the complete CLI with all subcommands.
pub fn build_cli() -> Command {
    Command::new("allstar")
        .about("Inspect, convert, and run serialized ATNs")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(dump_command())
        .subcommand(convert_command())
        .subcommand(lex_command())
        .subcommand(parse_command())
        .subcommand(trace_command())
}

/// Show a human-readable ATN listing.
pub fn dump_command() -> Command {
    Command::new("dump")
        .about("Show the states, decisions, and transitions of an ATN")
        .after_help(
            r#"EXAMPLES:
  allstar dump Expr.atn.json             # JSON dictionary
  allstar dump Expr.atn                  # packed words
  allstar dump Expr.atn --bypass         # with rule bypass alternatives"#,
        )
        .arg(atn_path_arg())
        .arg(no_verify_arg())
        .arg(bypass_arg())
        .arg(color_arg())
}

/// Re-encode an ATN.
pub fn convert_command() -> Command {
    Command::new("convert")
        .about("Convert a serialized ATN between JSON and packed words")
        .after_help(
            r#"EXAMPLES:
  allstar convert Expr.atn --to json           # packed to JSON on stdout
  allstar convert Expr.atn.json --to packed -o Expr.atn"#,
        )
        .arg(atn_path_arg())
        .arg(to_arg())
        .arg(output_file_arg())
        .arg(no_verify_arg())
}

/// Tokenize input.
pub fn lex_command() -> Command {
    let cmd = Command::new("lex")
        .about("Tokenize input with a lexer ATN")
        .override_usage(
            "\
  allstar lex <LEXER> <INPUT>
  allstar lex <LEXER> -s <TEXT>",
        )
        .after_help(
            r#"EXAMPLES:
  allstar lex ExprLexer.atn in.txt -t Expr.tokens
  allstar lex ExprLexer.atn -s '1+2' --json"#,
        )
        .arg(lexer_atn_arg());
    with_lexer_args(cmd).arg(json_arg())
}

/// Parse input and print the tree.
pub fn parse_command() -> Command {
    let cmd = Command::new("parse")
        .about("Parse input and print the parse tree")
        .override_usage(
            "\
  allstar parse <PARSER> <LEXER> <INPUT>
  allstar parse <PARSER> <LEXER> -s <TEXT>",
        )
        .after_help(
            r#"EXAMPLES:
  allstar parse Expr.atn ExprLexer.atn in.txt -t Expr.tokens --rules prog,expr
  allstar parse Expr.atn ExprLexer.atn -s '1+2' --start expr --dfa"#,
        );
    with_hidden_trace_args(with_parser_args(cmd))
}

/// Parse input with tracing.
pub fn trace_command() -> Command {
    let cmd = Command::new("trace")
        .about("Trace lexing and prediction while parsing")
        .override_usage(
            "\
  allstar trace <PARSER> <LEXER> <INPUT>
  allstar trace <PARSER> <LEXER> -s <TEXT>",
        )
        .after_help(
            r#"EXAMPLES:
  allstar trace Expr.atn ExprLexer.atn -s '1+2'        # predictions and tokens
  allstar trace Expr.atn ExprLexer.atn -s '1+2' -vv    # also reach sets"#,
        );
    with_parser_args(cmd)
        .arg(verbose_arg())
        .arg(no_result_arg())
        .arg(color_arg())
}

//! Shared argument builders for CLI commands.
//!
//! Each function returns a `clap::Arg` so the same definition can be used by
//! several commands, visible in some and hidden in others.

use std::path::PathBuf;

use clap::{Arg, ArgAction, value_parser};

/// Serialized ATN (positional).
pub fn atn_path_arg() -> Arg {
    Arg::new("atn_path")
        .value_name("ATN")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Serialized ATN (JSON or packed words)")
}

/// Parser ATN (first positional of parse/trace).
pub fn parser_atn_arg() -> Arg {
    Arg::new("parser_atn")
        .value_name("PARSER")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Serialized parser ATN")
}

/// Lexer ATN (positional).
pub fn lexer_atn_arg() -> Arg {
    Arg::new("lexer_atn")
        .value_name("LEXER")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Serialized lexer ATN")
}

/// Input file (positional, `-` for stdin).
pub fn input_path_arg() -> Arg {
    Arg::new("input_path")
        .value_name("INPUT")
        .value_parser(value_parser!(PathBuf))
        .conflicts_with("input_text")
        .help("Input file to recognize (use \"-\" for stdin)")
}

/// Inline input text (-s/--source).
pub fn input_text_arg() -> Arg {
    Arg::new("input_text")
        .short('s')
        .long("source")
        .value_name("TEXT")
        .help("Inline input text")
}

/// Token vocabulary (-t/--tokens).
pub fn tokens_arg() -> Arg {
    Arg::new("tokens")
        .short('t')
        .long("tokens")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .help("Token vocabulary (.tokens file) for display names")
}

/// Parser rule names (--rules).
pub fn rules_arg() -> Arg {
    Arg::new("rules")
        .long("rules")
        .value_name("NAMES")
        .action(ArgAction::Append)
        .value_delimiter(',')
        .help("Parser rule names in rule-index order (comma-separated)")
}

/// Lexer mode names (--modes).
pub fn modes_arg() -> Arg {
    Arg::new("modes")
        .long("modes")
        .value_name("NAMES")
        .action(ArgAction::Append)
        .value_delimiter(',')
        .help("Lexer mode names in mode order (comma-separated)")
}

/// Start rule (--start).
pub fn start_arg() -> Arg {
    Arg::new("start")
        .long("start")
        .value_name("RULE")
        .help("Rule to start parsing from (default: the first rule)")
}

/// Prediction mode (--prediction).
pub fn prediction_arg() -> Arg {
    Arg::new("prediction")
        .long("prediction")
        .value_name("MODE")
        .default_value("ll")
        .value_parser(["sll", "ll", "exact"])
        .help("Prediction mode")
}

/// Stop at the first syntax error (--bail).
pub fn bail_arg() -> Arg {
    Arg::new("bail")
        .long("bail")
        .action(ArgAction::SetTrue)
        .help("Stop at the first syntax error instead of recovering")
}

/// Report ambiguities and full-context retries (--diagnostics).
pub fn diagnostics_arg() -> Arg {
    Arg::new("diagnostics")
        .long("diagnostics")
        .action(ArgAction::SetTrue)
        .help("Report ambiguities and full-context predictions")
}

/// Print the DFA after parsing (--dfa).
pub fn dfa_arg() -> Arg {
    Arg::new("dfa")
        .long("dfa")
        .action(ArgAction::SetTrue)
        .help("Print the decision DFAs after parsing")
}

/// Emit JSON (--json).
pub fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Print tokens as JSON")
}

/// Target encoding (--to).
pub fn to_arg() -> Arg {
    Arg::new("to")
        .long("to")
        .value_name("FORMAT")
        .default_value("json")
        .value_parser(["json", "packed"])
        .help("Output encoding")
}

/// Write output to file (-o/--output).
pub fn output_file_arg() -> Arg {
    Arg::new("output")
        .short('o')
        .long("output")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .help("Write output to file")
}

/// Skip ATN verification (--no-verify).
pub fn no_verify_arg() -> Arg {
    Arg::new("no_verify")
        .long("no-verify")
        .action(ArgAction::SetTrue)
        .help("Skip structural verification of the ATN")
}

/// Add rule bypass alternatives (--bypass).
pub fn bypass_arg() -> Arg {
    Arg::new("bypass")
        .long("bypass")
        .action(ArgAction::SetTrue)
        .help("Generate rule bypass transitions before dumping")
}

/// Color output control (--color).
pub fn color_arg() -> Arg {
    Arg::new("color")
        .long("color")
        .value_name("WHEN")
        .default_value("auto")
        .value_parser(["auto", "always", "never"])
        .help("Colorize output")
}

/// Verbosity level (-v, -vv).
pub fn verbose_arg() -> Arg {
    Arg::new("verbose")
        .short('v')
        .action(ArgAction::Count)
        .help("Verbosity level (-v for DFA edges, -vv for reach sets)")
}

/// Skip the parse tree (--no-result).
pub fn no_result_arg() -> Arg {
    Arg::new("no_result")
        .long("no-result")
        .action(ArgAction::SetTrue)
        .help("Print the trace only, without the parse tree")
}

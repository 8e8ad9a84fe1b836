//! Tests for CLI dispatch logic.
//!
//! These tests verify:
//! 1. Shared flags: parse accepts the trace flags without error
//! 2. Help visibility: hidden flags don't appear in --help
//! 3. Params extraction: correct fields are extracted from ArgMatches

use std::path::PathBuf;

use allstar_vm::{PredictionMode, Verbosity};

use super::*;
use crate::cli::commands::{
    convert_command, dump_command, lex_command, parse_command, trace_command,
};
use crate::commands::atn_loader::AtnFormat;
use crate::commands::trace::TraceArgs;

#[test]
fn parse_accepts_trace_flags() {
    let cmd = parse_command();
    let result = cmd.try_get_matches_from([
        "parse",
        "Expr.json",
        "ExprLexer.json",
        "in.txt",
        "-vv",
        "--no-result",
        "--color",
        "never",
    ]);
    assert!(
        result.is_ok(),
        "parse should accept trace flags: {:?}",
        result.err()
    );

    let m = result.unwrap();
    let params = ParseParams::from_matches(&m);
    assert_eq!(params.parser_atn, PathBuf::from("Expr.json"));
    assert_eq!(params.lexer_atn, PathBuf::from("ExprLexer.json"));
    assert_eq!(params.input_path, Some(PathBuf::from("in.txt")));
}

#[test]
fn parse_help_hides_trace_flags() {
    let mut cmd = parse_command();
    let help = cmd.render_help().to_string();

    assert!(
        !help.contains("--no-result"),
        "parse help should not show --no-result"
    );
    assert!(
        !help.contains("Verbosity level"),
        "parse help should not show -v description"
    );
    assert!(
        !help.contains("--color"),
        "parse help should not show --color"
    );
    assert!(help.contains("--prediction"));
    assert!(help.contains("--start"));
}

#[test]
fn trace_help_shows_trace_flags() {
    let mut cmd = trace_command();
    let help = cmd.render_help().to_string();

    assert!(help.contains("--no-result"));
    assert!(help.contains("Verbosity level"));
    assert!(help.contains("--dfa"));
}

#[test]
fn input_path_conflicts_with_inline_source() {
    let cmd = lex_command();
    let result = cmd.try_get_matches_from(["lex", "L.json", "in.txt", "-s", "abc"]);
    assert!(result.is_err(), "INPUT and -s should conflict");
}

#[test]
fn lex_params_extracts_all_fields() {
    let cmd = lex_command();
    let m = cmd
        .try_get_matches_from([
            "lex",
            "L.json",
            "-s",
            "a b",
            "-t",
            "L.tokens",
            "--modes",
            "DEFAULT_MODE,STR",
            "--json",
        ])
        .unwrap();

    let params = LexParams::from_matches(&m);

    assert_eq!(params.lexer_atn, PathBuf::from("L.json"));
    assert_eq!(params.input_path, None);
    assert_eq!(params.input_text.as_deref(), Some("a b"));
    assert_eq!(params.tokens, Some(PathBuf::from("L.tokens")));
    assert_eq!(
        params.modes,
        Some(vec!["DEFAULT_MODE".to_string(), "STR".to_string()])
    );
    assert!(params.json);
}

#[test]
fn parse_params_extracts_all_fields() {
    let cmd = parse_command();
    let m = cmd
        .try_get_matches_from([
            "parse",
            "P.json",
            "L.json",
            "-s",
            "1+2",
            "--rules",
            "s,e",
            "--start",
            "e",
            "--prediction",
            "sll",
            "--bail",
            "--diagnostics",
            "--dfa",
        ])
        .unwrap();

    let params = ParseParams::from_matches(&m);

    assert_eq!(params.input_text.as_deref(), Some("1+2"));
    assert_eq!(params.rules, Some(vec!["s".to_string(), "e".to_string()]));
    assert_eq!(params.modes, None);
    assert_eq!(params.start.as_deref(), Some("e"));
    assert_eq!(params.prediction, PredictionMode::Sll);
    assert!(params.bail);
    assert!(params.diagnostics);
    assert!(params.dfa);
}

#[test]
fn parse_defaults() {
    let cmd = parse_command();
    let m = cmd
        .try_get_matches_from(["parse", "P.json", "L.json", "in.txt"])
        .unwrap();

    let params = ParseParams::from_matches(&m);

    assert_eq!(params.prediction, PredictionMode::Ll);
    assert_eq!(params.rules, None);
    assert_eq!(params.start, None);
    assert!(!params.bail);
    assert!(!params.dfa);
}

#[test]
fn parse_requires_both_atns() {
    let cmd = parse_command();
    let result = cmd.try_get_matches_from(["parse", "P.json"]);
    assert!(result.is_err());
}

#[test]
fn exact_prediction_mode() {
    let cmd = parse_command();
    let m = cmd
        .try_get_matches_from(["parse", "P.json", "L.json", "-s", "x", "--prediction", "exact"])
        .unwrap();

    let params = ParseParams::from_matches(&m);

    assert_eq!(params.prediction, PredictionMode::LlExactAmbigDetection);
}

#[test]
fn trace_params_extracts_all_fields() {
    let cmd = trace_command();
    let m = cmd
        .try_get_matches_from([
            "trace",
            "P.json",
            "L.json",
            "in.txt",
            "-vv",
            "--no-result",
            "--color",
            "always",
        ])
        .unwrap();

    let params = TraceParams::from_matches(&m);
    assert_eq!(params.verbose, 2);
    assert!(params.no_result);
    assert_eq!(params.color, ColorChoice::Always);
    assert_eq!(params.parse.input_path, Some(PathBuf::from("in.txt")));

    let args: TraceArgs = params.into();
    assert_eq!(args.verbosity, Verbosity::VeryVerbose);
    assert!(args.color);
}

#[test]
fn trace_single_v_is_verbose() {
    let cmd = trace_command();
    let m = cmd
        .try_get_matches_from(["trace", "P.json", "L.json", "-s", "x", "-v"])
        .unwrap();

    let args: TraceArgs = TraceParams::from_matches(&m).into();

    assert_eq!(args.verbosity, Verbosity::Verbose);
}

#[test]
fn convert_params_defaults_to_json() {
    let cmd = convert_command();
    let m = cmd.try_get_matches_from(["convert", "A.atn"]).unwrap();

    let params = ConvertParams::from_matches(&m);

    assert_eq!(params.atn_path, PathBuf::from("A.atn"));
    assert_eq!(params.to, AtnFormat::Json);
    assert_eq!(params.output, None);
    assert!(!params.no_verify);
}

#[test]
fn convert_params_to_packed_file() {
    let cmd = convert_command();
    let m = cmd
        .try_get_matches_from(["convert", "A.json", "--to", "packed", "-o", "A.atn", "--no-verify"])
        .unwrap();

    let params = ConvertParams::from_matches(&m);

    assert_eq!(params.to, AtnFormat::Packed);
    assert_eq!(params.output, Some(PathBuf::from("A.atn")));
    assert!(params.no_verify);
}

#[test]
fn convert_rejects_unknown_format() {
    let cmd = convert_command();
    let result = cmd.try_get_matches_from(["convert", "A.json", "--to", "yaml"]);
    assert!(result.is_err());
}

#[test]
fn dump_params_extracts_flags() {
    let cmd = dump_command();
    let m = cmd
        .try_get_matches_from(["dump", "A.json", "--bypass", "--no-verify", "--color", "never"])
        .unwrap();

    let params = DumpParams::from_matches(&m);

    assert_eq!(params.atn_path, PathBuf::from("A.json"));
    assert!(params.bypass);
    assert!(params.no_verify);
    assert_eq!(params.color, ColorChoice::Never);
}

#[test]
fn cli_requires_a_subcommand() {
    let result = build_cli().try_get_matches_from(["allstar"]);
    assert!(result.is_err());
}

#[test]
fn cli_dispatches_subcommands() {
    let m = build_cli()
        .try_get_matches_from(["allstar", "lex", "L.json", "-s", "x"])
        .unwrap();

    let (name, sub) = m.subcommand().unwrap();
    assert_eq!(name, "lex");
    assert_eq!(LexParams::from_matches(sub).lexer_atn, PathBuf::from("L.json"));
}

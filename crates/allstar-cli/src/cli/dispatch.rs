//! Dispatch logic: extract params from ArgMatches and convert to command args.
//!
//! `*Params` structs hold what clap parsed; `From<*Params>` impls turn them
//! into the `*Args` the command handlers take, resolving color and
//! verbosity on the way.

use std::path::PathBuf;

use allstar_vm::{PredictionMode, Verbosity};
use clap::ArgMatches;

use super::ColorChoice;
use crate::commands::atn_loader::AtnFormat;
use crate::commands::convert::ConvertArgs;
use crate::commands::dump::DumpArgs;
use crate::commands::lex::LexArgs;
use crate::commands::parse::ParseArgs;
use crate::commands::trace::TraceArgs;

pub struct DumpParams {
    pub atn_path: PathBuf,
    pub no_verify: bool,
    pub bypass: bool,
    pub color: ColorChoice,
}

impl DumpParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            atn_path: required_path(m, "atn_path"),
            no_verify: m.get_flag("no_verify"),
            bypass: m.get_flag("bypass"),
            color: parse_color(m),
        }
    }
}

impl From<DumpParams> for DumpArgs {
    fn from(p: DumpParams) -> Self {
        Self {
            atn_path: p.atn_path,
            verify: !p.no_verify,
            bypass: p.bypass,
            color: p.color.should_colorize(),
        }
    }
}

pub struct ConvertParams {
    pub atn_path: PathBuf,
    pub to: AtnFormat,
    pub output: Option<PathBuf>,
    pub no_verify: bool,
}

impl ConvertParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        let to = match m.get_one::<String>("to").map(|s| s.as_str()) {
            Some("packed") => AtnFormat::Packed,
            _ => AtnFormat::Json,
        };
        Self {
            atn_path: required_path(m, "atn_path"),
            to,
            output: m.get_one::<PathBuf>("output").cloned(),
            no_verify: m.get_flag("no_verify"),
        }
    }
}

impl From<ConvertParams> for ConvertArgs {
    fn from(p: ConvertParams) -> Self {
        Self {
            atn_path: p.atn_path,
            to: p.to,
            output: p.output,
            verify: !p.no_verify,
        }
    }
}

pub struct LexParams {
    pub lexer_atn: PathBuf,
    pub tokens: Option<PathBuf>,
    pub modes: Option<Vec<String>>,
    pub input_path: Option<PathBuf>,
    pub input_text: Option<String>,
    pub json: bool,
}

impl LexParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            lexer_atn: required_path(m, "lexer_atn"),
            tokens: m.get_one::<PathBuf>("tokens").cloned(),
            modes: names(m, "modes"),
            input_path: m.get_one::<PathBuf>("input_path").cloned(),
            input_text: m.get_one::<String>("input_text").cloned(),
            json: m.get_flag("json"),
        }
    }
}

impl From<LexParams> for LexArgs {
    fn from(p: LexParams) -> Self {
        Self {
            lexer_atn: p.lexer_atn,
            tokens: p.tokens,
            modes: p.modes,
            input_path: p.input_path,
            input_text: p.input_text,
            json: p.json,
        }
    }
}

pub struct ParseParams {
    pub parser_atn: PathBuf,
    pub lexer_atn: PathBuf,
    pub tokens: Option<PathBuf>,
    pub rules: Option<Vec<String>>,
    pub modes: Option<Vec<String>>,
    pub input_path: Option<PathBuf>,
    pub input_text: Option<String>,
    pub start: Option<String>,
    pub prediction: PredictionMode,
    pub bail: bool,
    pub diagnostics: bool,
    pub dfa: bool,
    // Note: verbose, no_result, color are parsed but not extracted
}

impl ParseParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            parser_atn: required_path(m, "parser_atn"),
            lexer_atn: required_path(m, "lexer_atn"),
            tokens: m.get_one::<PathBuf>("tokens").cloned(),
            rules: names(m, "rules"),
            modes: names(m, "modes"),
            input_path: m.get_one::<PathBuf>("input_path").cloned(),
            input_text: m.get_one::<String>("input_text").cloned(),
            start: m.get_one::<String>("start").cloned(),
            prediction: parse_prediction(m),
            bail: m.get_flag("bail"),
            diagnostics: m.get_flag("diagnostics"),
            dfa: m.get_flag("dfa"),
        }
    }
}

impl From<ParseParams> for ParseArgs {
    fn from(p: ParseParams) -> Self {
        Self {
            parser_atn: p.parser_atn,
            lexer_atn: p.lexer_atn,
            tokens: p.tokens,
            rules: p.rules,
            modes: p.modes,
            input_path: p.input_path,
            input_text: p.input_text,
            start: p.start,
            prediction: p.prediction,
            bail: p.bail,
            diagnostics: p.diagnostics,
            dfa: p.dfa,
        }
    }
}

pub struct TraceParams {
    pub parse: ParseParams,
    pub verbose: u8,
    pub no_result: bool,
    pub color: ColorChoice,
}

impl TraceParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            parse: ParseParams::from_matches(m),
            verbose: m.get_count("verbose"),
            no_result: m.get_flag("no_result"),
            color: parse_color(m),
        }
    }
}

impl From<TraceParams> for TraceArgs {
    fn from(p: TraceParams) -> Self {
        let verbosity = match p.verbose {
            0 => Verbosity::Default,
            1 => Verbosity::Verbose,
            _ => Verbosity::VeryVerbose,
        };

        Self {
            parse: p.parse.into(),
            verbosity,
            no_result: p.no_result,
            color: p.color.should_colorize(),
        }
    }
}

fn required_path(m: &ArgMatches, id: &str) -> PathBuf {
    m.get_one::<PathBuf>(id).cloned().unwrap_or_default()
}

/// Values of a comma-separated list flag.
fn names(m: &ArgMatches, id: &str) -> Option<Vec<String>> {
    m.get_many::<String>(id)
        .map(|values| values.cloned().collect())
}

/// Parse --color flag into ColorChoice.
fn parse_color(m: &ArgMatches) -> ColorChoice {
    match m.get_one::<String>("color").map(|s| s.as_str()) {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}

/// Parse --prediction flag into PredictionMode.
fn parse_prediction(m: &ArgMatches) -> PredictionMode {
    match m.get_one::<String>("prediction").map(|s| s.as_str()) {
        Some("sll") => PredictionMode::Sll,
        Some("exact") => PredictionMode::LlExactAmbigDetection,
        _ => PredictionMode::Ll,
    }
}

//! Trace lexing and prediction for debugging.

use allstar_core::Colors;
use allstar_vm::Verbosity;

use super::parse::{self, ParseArgs};
use super::run_common::{self, Outcome, RunError, TraceConfig, TraceSink};

pub struct TraceArgs {
    pub parse: ParseArgs,
    pub verbosity: Verbosity,
    pub no_result: bool,
    pub color: bool,
}

pub fn run(args: TraceArgs) {
    match trace(&args) {
        Ok(outcome) => outcome.emit(),
        Err(e) => run_common::fail(e),
    }
}

/// Trace lines, then `---` and the parse result unless `--no-result`.
pub fn trace(args: &TraceArgs) -> Result<Outcome, RunError> {
    let sink = TraceSink::new();
    let colors = Colors::new(args.color);
    let mut input = args.parse.parser_input();
    input.trace = Some(TraceConfig {
        sink: sink.clone(),
        verbosity: args.verbosity,
        colors,
    });

    let prepared = run_common::prepare_parser(&input)?;
    let result = parse::run_parser(prepared, &args.parse);

    let mut stdout = String::new();
    for line in sink.take_lines() {
        stdout.push_str(&line);
        stdout.push('\n');
    }
    // the trace of a failed parse is still printed
    let parsed = match result {
        Ok(parsed) => parsed,
        Err(e) => {
            return Ok(Outcome {
                stdout,
                errors: vec![format!("error: {}", e)],
            });
        }
    };
    if !args.no_result {
        stdout.push_str(&format!("{}---{}\n", colors.dim, colors.reset));
        stdout.push_str(&parsed.stdout);
    }
    Ok(Outcome {
        stdout,
        errors: parsed.errors,
    })
}

//! Setup shared by the commands that run recognizers.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use allstar_atn::{DeserializationOptions, Deserializer};
use allstar_core::{Colors, Vocabulary};
use allstar_lib::{
    BailErrorStrategy, CommonTokenStream, ErrorCollector, Grammar, InputStream, Lexer, Parser,
    ParserInterpreter,
};
use allstar_vm::{
    AltSet, AtnConfigSet, DfaTarget, PredictionMode, PrintTracer, Tracer, Verbosity,
};

use super::atn_loader::{self, LoadError};

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Recognizer(#[from] allstar_lib::Error),
}

/// What a command prints: `stdout` to standard output, `errors` (syntax
/// errors and diagnostics) to standard error.
#[derive(Debug, Default)]
pub struct Outcome {
    pub stdout: String,
    pub errors: Vec<String>,
}

impl Outcome {
    /// Prints both streams and exits with status 1 if anything was reported.
    pub fn emit(self) {
        for message in &self.errors {
            eprintln!("{}", message);
        }
        print!("{}", self.stdout);
        if !self.errors.is_empty() {
            std::process::exit(1);
        }
    }
}

/// Prints `error: …` and exits with status 1.
pub fn fail(err: impl std::fmt::Display) -> ! {
    eprintln!("error: {}", err);
    std::process::exit(1);
}

pub fn load_grammar(
    path: &Path,
    vocabulary: Vocabulary,
    options: DeserializationOptions,
) -> Result<Grammar, RunError> {
    let data = atn_loader::load_atn(path)?;
    let atn = Deserializer::new(options)
        .deserialize(&data)
        .map_err(|source| LoadError::Atn {
            path: path.to_string_lossy().into_owned(),
            source,
        })?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "<grammar>".to_string());
    Ok(Grammar::new(atn, vocabulary).with_name(name))
}

pub fn load_vocabulary(tokens: Option<&Path>) -> Result<Vocabulary, RunError> {
    match tokens {
        Some(path) => Ok(atn_loader::load_vocabulary(path)?),
        None => Ok(Vocabulary::default()),
    }
}

/// `given` followed by `rule{i}` for every rule it does not name.
pub fn rule_names(given: Option<&[String]>, count: usize) -> Vec<String> {
    let given = given.unwrap_or_default();
    (0..count)
        .map(|i| match given.get(i) {
            Some(name) => name.clone(),
            None => format!("rule{i}"),
        })
        .collect()
}

pub struct LexerInput<'a> {
    pub lexer_atn: &'a Path,
    pub tokens: Option<&'a Path>,
    pub modes: Option<&'a [String]>,
    pub input_path: Option<&'a Path>,
    pub input_text: Option<&'a str>,
}

/// Builds the lexer with its errors routed to `errors`.
pub fn prepare_lexer(
    input: &LexerInput<'_>,
    errors: &ErrorCollector,
) -> Result<(Lexer, Vocabulary), RunError> {
    let vocabulary = load_vocabulary(input.tokens)?;
    let mut grammar = load_grammar(
        input.lexer_atn,
        vocabulary.clone(),
        DeserializationOptions::default(),
    )?;
    if let Some(modes) = input.modes {
        grammar = grammar.with_mode_names(modes.iter().cloned());
    }
    let (text, source_name) = atn_loader::load_input(input.input_path, input.input_text)?;

    let stream = InputStream::new(&text).with_source_name(source_name);
    let mut lexer = Lexer::new(Arc::new(grammar), stream)?;
    lexer.remove_error_listeners();
    lexer.add_error_listener(errors.clone());
    Ok((lexer, vocabulary))
}

pub struct ParserInput<'a> {
    pub parser_atn: &'a Path,
    pub lexer: LexerInput<'a>,
    pub rules: Option<&'a [String]>,
    pub prediction: PredictionMode,
    pub bail: bool,
    pub diagnostics: bool,
    pub trace: Option<TraceConfig>,
}

/// Where and how `trace` records lexer and parser activity.
pub struct TraceConfig {
    pub sink: TraceSink,
    pub verbosity: Verbosity,
    pub colors: Colors,
}

impl TraceConfig {
    fn tracer(&self, vocabulary: &Vocabulary, lexer: bool) -> Box<SharedTracer> {
        let inner = PrintTracer::builder()
            .verbosity(self.verbosity)
            .colors(self.colors)
            .vocabulary(vocabulary.clone())
            .lexer(lexer)
            .build();
        Box::new(self.sink.tracer(inner))
    }
}

pub struct PreparedParser {
    pub interpreter: ParserInterpreter,
    pub errors: ErrorCollector,
}

/// Builds lexer and parser over the input, sharing one error collector.
pub fn prepare_parser(input: &ParserInput<'_>) -> Result<PreparedParser, RunError> {
    let errors = if input.diagnostics {
        ErrorCollector::new().with_diagnostics(false)
    } else {
        ErrorCollector::new()
    };
    let (mut lexer, vocabulary) = prepare_lexer(&input.lexer, &errors)?;
    if let Some(trace) = &input.trace {
        lexer.set_tracer(trace.tracer(&vocabulary, true));
    }

    let grammar = load_grammar(
        input.parser_atn,
        vocabulary.clone(),
        DeserializationOptions::default(),
    )?;
    let names = rule_names(input.rules, grammar.atn().num_rules());
    let grammar = grammar.with_rule_names(names);

    let mut parser = Parser::new(Arc::new(grammar), CommonTokenStream::new(lexer))?;
    parser.remove_error_listeners();
    parser.add_error_listener(errors.clone());
    parser.set_prediction_mode(input.prediction);
    if input.bail {
        parser.set_error_strategy(BailErrorStrategy::new());
    }
    if let Some(trace) = &input.trace {
        parser.set_tracer(trace.tracer(&vocabulary, false));
    }

    Ok(PreparedParser {
        interpreter: ParserInterpreter::new(parser),
        errors,
    })
}

/// Collects the lines of several [`PrintTracer`]s in call order.
#[derive(Clone, Debug, Default)]
pub struct TraceSink {
    lines: Rc<RefCell<Vec<String>>>,
}

impl TraceSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tracer(&self, inner: PrintTracer) -> SharedTracer {
        SharedTracer {
            inner,
            sink: self.clone(),
        }
    }

    pub fn take_lines(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.borrow_mut())
    }
}

/// A [`PrintTracer`] that forwards its lines to a [`TraceSink`], so a lexer
/// and a parser can trace into one listing.
pub struct SharedTracer {
    inner: PrintTracer,
    sink: TraceSink,
}

impl SharedTracer {
    fn flush(&mut self) {
        let lines = self.inner.take_lines();
        self.sink.lines.borrow_mut().extend(lines);
    }
}

impl Tracer for SharedTracer {
    fn trace_predict_start(&mut self, decision: usize, start_index: usize, la1: i32) {
        self.inner.trace_predict_start(decision, start_index, la1);
        self.flush();
    }

    fn trace_dfa_edge(&mut self, decision: usize, from: usize, symbol: i32, to: DfaTarget, cached: bool) {
        self.inner.trace_dfa_edge(decision, from, symbol, to, cached);
        self.flush();
    }

    fn trace_reach(&mut self, decision: usize, symbol: i32, reach: &AtnConfigSet) {
        self.inner.trace_reach(decision, symbol, reach);
        self.flush();
    }

    fn trace_full_context(&mut self, decision: usize, conflicting_alts: Option<&AltSet>) {
        self.inner.trace_full_context(decision, conflicting_alts);
        self.flush();
    }

    fn trace_ambiguity(&mut self, decision: usize, alts: &AltSet, exact: bool) {
        self.inner.trace_ambiguity(decision, alts, exact);
        self.flush();
    }

    fn trace_context_sensitivity(&mut self, decision: usize, alt: usize) {
        self.inner.trace_context_sensitivity(decision, alt);
        self.flush();
    }

    fn trace_predict_result(&mut self, decision: usize, alt: usize) {
        self.inner.trace_predict_result(decision, alt);
        self.flush();
    }

    fn trace_no_viable_alt(&mut self, decision: usize, offending_index: usize) {
        self.inner.trace_no_viable_alt(decision, offending_index);
        self.flush();
    }

    fn trace_lexer_match(&mut self, mode: usize, start_index: usize, stop_index: usize, ttype: i32) {
        self.inner.trace_lexer_match(mode, start_index, stop_index, ttype);
        self.flush();
    }
}

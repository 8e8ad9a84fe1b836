//! Tracing hooks for prediction and lexing.
//!
//! The simulators call a [`Tracer`] at fixed points. [`NoopTracer`] compiles
//! every call away; [`PrintTracer`] collects formatted lines for the CLI.

use allstar_core::utils::char_literal;
use allstar_core::{Colors, Vocabulary, token};

use crate::config_set::{AltSet, AtnConfigSet};
use crate::dfa::DfaTarget;

/// Verbosity level for trace output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Prediction start and result, full-context retries, ambiguities,
    /// lexer matches.
    #[default]
    Default,
    /// Verbose (-v): also DFA edge hits and misses.
    Verbose,
    /// Very verbose (-vv): also every reach set.
    VeryVerbose,
}

/// Instrumentation points of the simulators.
///
/// Each method is called at a specific point:
/// - `trace_predict_start` - entering `adaptive_predict`
/// - `trace_dfa_edge` - after following (or computing) a DFA edge
/// - `trace_reach` - after computing the ATN reach set for a symbol
/// - `trace_full_context` - when SLL conflicts and LL takes over
/// - `trace_ambiguity` - when full-context prediction ends ambiguous
/// - `trace_context_sensitivity` - when LL resolves an SLL conflict
/// - `trace_predict_result` - leaving `adaptive_predict` with an alternative
/// - `trace_no_viable_alt` - leaving `adaptive_predict` with an error
/// - `trace_lexer_match` - after the lexer matched a token
pub trait Tracer {
    fn trace_predict_start(&mut self, decision: usize, start_index: usize, la1: i32);

    fn trace_dfa_edge(&mut self, decision: usize, from: usize, symbol: i32, to: DfaTarget, cached: bool);

    fn trace_reach(&mut self, decision: usize, symbol: i32, reach: &AtnConfigSet);

    fn trace_full_context(&mut self, decision: usize, conflicting_alts: Option<&AltSet>);

    fn trace_ambiguity(&mut self, decision: usize, alts: &AltSet, exact: bool);

    fn trace_context_sensitivity(&mut self, decision: usize, alt: usize);

    fn trace_predict_result(&mut self, decision: usize, alt: usize);

    fn trace_no_viable_alt(&mut self, decision: usize, offending_index: usize);

    fn trace_lexer_match(&mut self, mode: usize, start_index: usize, stop_index: usize, ttype: i32);
}

/// No-op tracer that gets optimized away.
pub struct NoopTracer;

impl Tracer for NoopTracer {
    #[inline(always)]
    fn trace_predict_start(&mut self, _decision: usize, _start_index: usize, _la1: i32) {}

    #[inline(always)]
    fn trace_dfa_edge(
        &mut self,
        _decision: usize,
        _from: usize,
        _symbol: i32,
        _to: DfaTarget,
        _cached: bool,
    ) {
    }

    #[inline(always)]
    fn trace_reach(&mut self, _decision: usize, _symbol: i32, _reach: &AtnConfigSet) {}

    #[inline(always)]
    fn trace_full_context(&mut self, _decision: usize, _conflicting_alts: Option<&AltSet>) {}

    #[inline(always)]
    fn trace_ambiguity(&mut self, _decision: usize, _alts: &AltSet, _exact: bool) {}

    #[inline(always)]
    fn trace_context_sensitivity(&mut self, _decision: usize, _alt: usize) {}

    #[inline(always)]
    fn trace_predict_result(&mut self, _decision: usize, _alt: usize) {}

    #[inline(always)]
    fn trace_no_viable_alt(&mut self, _decision: usize, _offending_index: usize) {}

    #[inline(always)]
    fn trace_lexer_match(
        &mut self,
        _mode: usize,
        _start_index: usize,
        _stop_index: usize,
        _ttype: i32,
    ) {
    }
}

/// Tracer that collects formatted lines.
#[derive(Debug, Default)]
pub struct PrintTracer {
    verbosity: Verbosity,
    colors: Colors,
    /// Names token types; without one, symbols print as numbers
    /// (parser) or character literals (lexer).
    vocabulary: Option<Vocabulary>,
    lexer: bool,
    lines: Vec<String>,
}

#[derive(Debug, Default)]
pub struct PrintTracerBuilder {
    tracer: PrintTracer,
}

impl PrintTracerBuilder {
    pub fn verbosity(mut self, verbosity: Verbosity) -> Self {
        self.tracer.verbosity = verbosity;
        self
    }

    pub fn colors(mut self, colors: Colors) -> Self {
        self.tracer.colors = colors;
        self
    }

    pub fn vocabulary(mut self, vocabulary: Vocabulary) -> Self {
        self.tracer.vocabulary = Some(vocabulary);
        self
    }

    /// Render symbols as characters.
    pub fn lexer(mut self, lexer: bool) -> Self {
        self.tracer.lexer = lexer;
        self
    }

    pub fn build(self) -> PrintTracer {
        self.tracer
    }
}

impl PrintTracer {
    pub fn builder() -> PrintTracerBuilder {
        PrintTracerBuilder::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn take_lines(&mut self) -> Vec<String> {
        std::mem::take(&mut self.lines)
    }

    /// Print all trace lines.
    pub fn print(&self) {
        for line in &self.lines {
            println!("{}", line);
        }
    }

    fn symbol(&self, symbol: i32) -> String {
        let c = self.colors;
        let name = match &self.vocabulary {
            Some(vocabulary) if !self.lexer => vocabulary.display_name(symbol),
            _ if symbol == token::EOF => "EOF".to_string(),
            _ if self.lexer => char_literal(symbol),
            _ => symbol.to_string(),
        };
        format!("{}{}{}", c.yellow, name, c.reset)
    }

    fn decision(&self, decision: usize) -> String {
        let c = self.colors;
        format!("{}d{}{}", c.magenta, decision, c.reset)
    }

    fn token_type(&self, ttype: i32) -> String {
        let c = self.colors;
        let name = match &self.vocabulary {
            Some(vocabulary) => vocabulary.display_name(ttype),
            None => ttype.to_string(),
        };
        format!("{}{}{}", c.yellow, name, c.reset)
    }
}

fn alts_text(alts: &AltSet) -> String {
    let items: Vec<_> = alts.iter().map(|a| a.to_string()).collect();
    format!("{{{}}}", items.join(", "))
}

impl Tracer for PrintTracer {
    fn trace_predict_start(&mut self, decision: usize, start_index: usize, la1: i32) {
        let line = format!(
            "predict {} @{} {}",
            self.decision(decision),
            start_index,
            self.symbol(la1)
        );
        self.lines.push(line);
    }

    fn trace_dfa_edge(&mut self, _decision: usize, from: usize, symbol: i32, to: DfaTarget, cached: bool) {
        if self.verbosity == Verbosity::Default {
            return;
        }
        let c = self.colors;
        let target = match to {
            DfaTarget::State(s) => format!("{}s{}{}", c.cyan, s, c.reset),
            DfaTarget::Error => format!("{}error{}", c.red, c.reset),
        };
        let how = if cached { "dfa" } else { "atn" };
        let line = format!(
            "  {}{}{} {}s{}{} -{}-> {}",
            c.dim,
            how,
            c.reset,
            c.cyan,
            from,
            c.reset,
            self.symbol(symbol),
            target
        );
        self.lines.push(line);
    }

    fn trace_reach(&mut self, _decision: usize, symbol: i32, reach: &AtnConfigSet) {
        if self.verbosity != Verbosity::VeryVerbose {
            return;
        }
        let line = format!("    reach {}: {}", self.symbol(symbol), reach);
        self.lines.push(line);
    }

    fn trace_full_context(&mut self, decision: usize, conflicting_alts: Option<&AltSet>) {
        let alts = conflicting_alts.map(alts_text).unwrap_or_else(|| "{}".to_string());
        let line = format!("  full-context {} conflict {}", self.decision(decision), alts);
        self.lines.push(line);
    }

    fn trace_ambiguity(&mut self, decision: usize, alts: &AltSet, exact: bool) {
        let c = self.colors;
        let kind = if exact { "exact ambiguity" } else { "ambiguity" };
        let line = format!(
            "  {}{}{} {} {}",
            c.red,
            kind,
            c.reset,
            self.decision(decision),
            alts_text(alts)
        );
        self.lines.push(line);
    }

    fn trace_context_sensitivity(&mut self, decision: usize, alt: usize) {
        let line = format!("  context-sensitive {} alt {}", self.decision(decision), alt);
        self.lines.push(line);
    }

    fn trace_predict_result(&mut self, _decision: usize, alt: usize) {
        self.lines.push(format!("  => alt {alt}"));
    }

    fn trace_no_viable_alt(&mut self, decision: usize, offending_index: usize) {
        let c = self.colors;
        let line = format!(
            "  {}no viable alt{} {} @{}",
            c.red,
            c.reset,
            self.decision(decision),
            offending_index
        );
        self.lines.push(line);
    }

    fn trace_lexer_match(&mut self, mode: usize, start_index: usize, stop_index: usize, ttype: i32) {
        let c = self.colors;
        let line = format!(
            "lex {}m{}{} {}..{} {}",
            c.magenta,
            mode,
            c.reset,
            start_index,
            stop_index,
            self.token_type(ttype)
        );
        self.lines.push(line);
    }
}

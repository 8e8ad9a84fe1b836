//! Sinks for syntax errors and prediction diagnostics.

use std::cell::RefCell;
use std::rc::Rc;

use allstar_vm::{AltSet, AtnConfigSet};

use crate::error::RecognitionError;
use crate::token::Token;

/// Receives syntax errors from lexers and parsers, and prediction reports
/// from parsers.
///
/// `offending` is `None` for lexer errors. The prediction reports carry the
/// decision number and the token index range prediction looked at.
pub trait ErrorListener {
    fn syntax_error(
        &mut self,
        offending: Option<&Token>,
        line: usize,
        column: usize,
        message: &str,
        error: Option<&RecognitionError>,
    );

    fn report_ambiguity(
        &mut self,
        _decision: usize,
        _start_index: usize,
        _stop_index: usize,
        _exact: bool,
        _ambig_alts: &AltSet,
        _configs: &AtnConfigSet,
    ) {
    }

    fn report_attempting_full_context(
        &mut self,
        _decision: usize,
        _start_index: usize,
        _stop_index: usize,
        _conflicting_alts: Option<&AltSet>,
        _configs: &AtnConfigSet,
    ) {
    }

    fn report_context_sensitivity(
        &mut self,
        _decision: usize,
        _start_index: usize,
        _stop_index: usize,
        _prediction: usize,
        _configs: &AtnConfigSet,
    ) {
    }
}

/// Prints `line L:C message` to stderr.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleErrorListener;

impl ErrorListener for ConsoleErrorListener {
    fn syntax_error(
        &mut self,
        _offending: Option<&Token>,
        line: usize,
        column: usize,
        message: &str,
        _error: Option<&RecognitionError>,
    ) {
        eprintln!("line {line}:{column} {message}");
    }
}

/// Keeps formatted messages. Clones share the buffer, so one handle can be
/// given to a recognizer and the other read afterwards.
///
/// With `diagnostics` on, prediction reports are recorded too.
#[derive(Clone, Debug, Default)]
pub struct ErrorCollector {
    messages: Rc<RefCell<Vec<String>>>,
    diagnostics: bool,
    exact_only: bool,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also record ambiguity and full-context reports; with `exact_only`,
    /// only exact ambiguities.
    pub fn with_diagnostics(mut self, exact_only: bool) -> Self {
        self.diagnostics = true;
        self.exact_only = exact_only;
        self
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.messages.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.borrow().is_empty()
    }

    fn push(&self, message: String) {
        self.messages.borrow_mut().push(message);
    }
}

impl ErrorListener for ErrorCollector {
    fn syntax_error(
        &mut self,
        _offending: Option<&Token>,
        line: usize,
        column: usize,
        message: &str,
        _error: Option<&RecognitionError>,
    ) {
        self.push(format!("line {line}:{column} {message}"));
    }

    fn report_ambiguity(
        &mut self,
        decision: usize,
        start_index: usize,
        stop_index: usize,
        exact: bool,
        ambig_alts: &AltSet,
        _configs: &AtnConfigSet,
    ) {
        if !self.diagnostics || (self.exact_only && !exact) {
            return;
        }
        self.push(format!(
            "reportAmbiguity d={decision}: ambigAlts={}, input={start_index}..{stop_index}",
            alt_list(ambig_alts)
        ));
    }

    fn report_attempting_full_context(
        &mut self,
        decision: usize,
        start_index: usize,
        stop_index: usize,
        _conflicting_alts: Option<&AltSet>,
        _configs: &AtnConfigSet,
    ) {
        if !self.diagnostics {
            return;
        }
        self.push(format!(
            "reportAttemptingFullContext d={decision}, input={start_index}..{stop_index}"
        ));
    }

    fn report_context_sensitivity(
        &mut self,
        decision: usize,
        start_index: usize,
        stop_index: usize,
        _prediction: usize,
        _configs: &AtnConfigSet,
    ) {
        if !self.diagnostics {
            return;
        }
        self.push(format!(
            "reportContextSensitivity d={decision}, input={start_index}..{stop_index}"
        ));
    }
}

fn alt_list(alts: &AltSet) -> String {
    let items: Vec<String> = alts.iter().map(|a| a.to_string()).collect();
    format!("{{{}}}", items.join(", "))
}

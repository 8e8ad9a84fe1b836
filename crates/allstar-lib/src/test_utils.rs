//! Grammars, token lists, and recording listeners for recognizer tests.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use allstar_atn::test_utils;
use allstar_core::Vocabulary;

use crate::error_listener::ErrorCollector;
use crate::grammar::Grammar;
use crate::listener::ParseTreeListener;
use crate::parser::Parser;
use crate::token::Token;
use crate::token_source::ListTokenSource;
use crate::token_stream::CommonTokenStream;
use crate::tree::{NodeId, ParseTree};

fn build(atn: &str, tokens: &str, rule_names: &[&str]) -> Grammar {
    let vocabulary = Vocabulary::from_tokens_file(tokens)
        .unwrap_or_else(|e| panic!("bad tokens file: {e}"));
    Grammar::new(test_utils::load(atn), vocabulary)
        .with_name("Test")
        .with_rule_names(rule_names.iter().copied())
}

pub fn grammar(atn: &str, tokens: &str, rule_names: &[&str]) -> Arc<Grammar> {
    Arc::new(build(atn, tokens, rule_names))
}

pub fn hello_lexer() -> Arc<Grammar> {
    grammar(test_utils::HELLO_LEXER, test_utils::HELLO_TOKENS, &["T__0", "ID", "WS"])
}

pub fn hello_parser() -> Arc<Grammar> {
    grammar(test_utils::HELLO_PARSER, test_utils::HELLO_TOKENS, &["r"])
}

pub fn modes_lexer() -> Arc<Grammar> {
    let g = build(
        test_utils::MODES_LEXER,
        test_utils::MODES_TOKENS,
        &["QUOTE_OPEN", "ID", "WS", "STRING", "TEXT"],
    );
    Arc::new(g.with_mode_names(["DEFAULT_MODE", "STR"]))
}

pub fn ambiguous_parser() -> Arc<Grammar> {
    grammar(test_utils::AMBIGUOUS_PARSER, "X=1\n", &["r"])
}

pub fn expr_parser() -> Arc<Grammar> {
    grammar(test_utils::EXPR_PARSER, test_utils::EXPR_TOKENS, &["e"])
}

pub fn calc_parser() -> Arc<Grammar> {
    grammar(test_utils::CALC_PARSER, test_utils::EXPR_TOKENS, &["s", "e"])
}

/// Tokens laid out on one line, separated by single spaces.
pub fn tokens(rows: &[(i32, &str)]) -> Vec<Token> {
    let mut column = 0;
    rows.iter()
        .map(|&(token_type, text)| {
            let len = text.chars().count();
            let t = Token::new(token_type, text)
                .with_span(column as isize, (column + len) as isize - 1)
                .with_position(1, column);
            column += len + 1;
            t
        })
        .collect()
}

/// Token stream over `rows`.
pub fn stream(rows: &[(i32, &str)]) -> CommonTokenStream {
    CommonTokenStream::new(ListTokenSource::new(tokens(rows)))
}

/// Parser over `rows` whose syntax errors go to the returned collector only.
pub fn parser(grammar: Arc<Grammar>, rows: &[(i32, &str)]) -> (Parser, ErrorCollector) {
    let mut parser = Parser::new(grammar, stream(rows)).expect("parser grammar");
    let errors = ErrorCollector::new();
    parser.remove_error_listeners();
    parser.add_error_listener(errors.clone());
    (parser, errors)
}

/// Records listener events as strings into a shared log.
#[derive(Clone, Default)]
pub struct EventLog {
    pub events: Rc<RefCell<Vec<String>>>,
    pub rule_names: Vec<String>,
}

impl EventLog {
    pub fn new(rule_names: &[String]) -> Self {
        Self {
            events: Rc::default(),
            rule_names: rule_names.to_vec(),
        }
    }

    pub fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }

    fn rule_name(&self, tree: &ParseTree, node: NodeId) -> String {
        let index = tree.rule(node).map_or(0, |r| r.rule_index);
        self.rule_names
            .get(index)
            .cloned()
            .unwrap_or_else(|| index.to_string())
    }
}

impl ParseTreeListener for EventLog {
    fn visit_terminal(&mut self, tree: &ParseTree, node: NodeId) {
        let text = tree.node(node).token().map_or("", |t| t.text.as_str());
        self.events.borrow_mut().push(format!("terminal {text}"));
    }

    fn visit_error_node(&mut self, tree: &ParseTree, node: NodeId) {
        let text = tree.node(node).token().map_or("", |t| t.text.as_str());
        self.events.borrow_mut().push(format!("error {text}"));
    }

    fn enter_every_rule(&mut self, tree: &ParseTree, node: NodeId) {
        let name = self.rule_name(tree, node);
        self.events.borrow_mut().push(format!("enter {name}"));
    }

    fn exit_every_rule(&mut self, tree: &ParseTree, node: NodeId) {
        let name = self.rule_name(tree, node);
        self.events.borrow_mut().push(format!("exit {name}"));
    }
}

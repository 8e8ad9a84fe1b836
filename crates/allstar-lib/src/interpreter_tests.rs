use allstar_core::token;

use crate::error::{Error, RecognitionError};
use crate::error_listener::ErrorCollector;
use crate::error_strategy::BailErrorStrategy;
use crate::grammar::Grammar;
use crate::interpreter::ParserInterpreter;
use crate::parser::Parser;
use crate::test_utils::{
    EventLog, ambiguous_parser, calc_parser, expr_parser, hello_lexer, hello_parser, parser, stream,
};
use crate::tree::NodeId;

const MUL: i32 = 1;
const ADD: i32 = 2;
const INT: i32 = 3;

fn interpret(
    grammar: std::sync::Arc<Grammar>,
    rows: &[(i32, &str)],
) -> (ParserInterpreter, ErrorCollector, NodeId) {
    let (p, errors) = parser(grammar, rows);
    let mut interp = ParserInterpreter::new(p);
    let root = interp.parse(0).expect("parse");
    (interp, errors, root)
}

fn tree_string(interp: &ParserInterpreter, root: NodeId) -> String {
    let parser = interp.parser();
    parser
        .tree()
        .to_string_tree(root, parser.grammar().rule_names())
}

#[test]
fn hello_world() {
    let (interp, errors, root) = interpret(hello_parser(), &[(1, "hello"), (2, "world")]);

    insta::assert_snapshot!(tree_string(&interp, root), @"(r hello world)");
    assert!(errors.is_empty());
    let rule = interp.parser().tree().rule(root).unwrap();
    assert_eq!(rule.alt_number, Some(1));
    assert_eq!(rule.invoking_state, None);
    assert_eq!(rule.start.as_ref().unwrap().text, "hello");
    assert_eq!(rule.stop.as_ref().unwrap().text, "world");
    assert_eq!(interp.parser().syntax_errors(), 0);
}

#[test]
fn parse_rule_by_name() {
    let (p, _) = parser(hello_parser(), &[(1, "hello"), (2, "world")]);
    let mut interp = ParserInterpreter::new(p);

    let root = interp.parse_rule("r").unwrap();
    assert_eq!(interp.root(), Some(root));

    let err = interp.parse_rule("nope").unwrap_err();
    assert!(matches!(err, Error::UnknownRule(name) if name == "nope"));
}

#[test]
fn start_rule_out_of_range() {
    let (p, _) = parser(hello_parser(), &[]);
    let mut interp = ParserInterpreter::new(p);

    assert!(matches!(interp.parse(5), Err(Error::RuleIndexOutOfRange(5))));
}

#[test]
fn parser_requires_parser_grammar() {
    let err = Parser::new(hello_lexer(), stream(&[])).err().unwrap();
    assert!(matches!(err, Error::WrongGrammarType { expected: "parser" }));
}

#[test]
fn extraneous_token_is_deleted() {
    let (interp, errors, root) =
        interpret(hello_parser(), &[(1, "hello"), (1, "hello"), (2, "world")]);

    assert_eq!(
        errors.messages(),
        vec!["line 1:6 extraneous input 'hello' expecting ID"]
    );
    insta::assert_snapshot!(tree_string(&interp, root), @"(r hello hello world)");
    let tree = interp.parser().tree();
    let second = tree.child(root, 1).unwrap();
    assert!(tree.node(second).is_error());
    assert_eq!(interp.parser().syntax_errors(), 1);
}

#[test]
fn missing_token_is_conjured() {
    let (interp, errors, root) = interpret(hello_parser(), &[(1, "hello")]);

    assert_eq!(errors.messages(), vec!["line 1:5 missing ID at '<EOF>'"]);
    insta::assert_snapshot!(tree_string(&interp, root), @"(r hello <missing ID>)");

    let tree = interp.parser().tree();
    let conjured = tree.node(tree.child(root, 1).unwrap()).token().unwrap();
    assert_eq!(conjured.token_type, 2);
    assert_eq!(conjured.index, None);
    // positioned at the previous token when the current one is EOF
    assert_eq!((conjured.line, conjured.column), (1, 0));
}

#[test]
fn mismatch_at_decision_adds_error_node() {
    let (interp, errors, root) = interpret(ambiguous_parser(), &[]);

    assert_eq!(
        errors.messages(),
        vec!["line 1:0 mismatched input '<EOF>' expecting X"]
    );
    insta::assert_snapshot!(tree_string(&interp, root), @"(r <EOF>)");

    let tree = interp.parser().tree();
    let rule = tree.rule(root).unwrap();
    assert!(matches!(
        rule.exception,
        Some(RecognitionError::InputMismatch { .. })
    ));
    let error_node = tree.node(tree.child(root, 0).unwrap());
    assert!(error_node.is_error());
    assert_eq!(error_node.token().unwrap().token_type, 1);
}

#[test]
fn ambiguity_is_reported_and_resolved_to_minimum_alt() {
    let (mut p, _) = parser(ambiguous_parser(), &[(1, "x")]);
    let diagnostics = ErrorCollector::new().with_diagnostics(false);
    p.add_error_listener(diagnostics.clone());
    let mut interp = ParserInterpreter::new(p);

    let root = interp.parse(0).unwrap();

    insta::assert_snapshot!(tree_string(&interp, root), @"(r x <EOF>)");
    let tree = interp.parser().tree();
    assert_eq!(tree.rule(root).unwrap().alt_number, Some(1));
    let messages = diagnostics.messages();
    assert!(
        messages.iter().any(|m| m.starts_with("reportAmbiguity d=0")),
        "{messages:?}"
    );
}

#[test]
fn decision_override_forces_alternative() {
    let (p, errors) = parser(ambiguous_parser(), &[(1, "x")]);
    let mut interp = ParserInterpreter::new(p);
    interp.add_decision_override(0, 0, 2);

    let root = interp.parse(0).unwrap();

    assert!(errors.is_empty());
    let tree = interp.parser().tree();
    assert_eq!(tree.rule(root).unwrap().alt_number, Some(2));
}

#[test]
fn precedence_climbing_binds_multiplication_tighter() {
    let (interp, errors, root) = interpret(
        calc_parser(),
        &[(INT, "1"), (ADD, "+"), (INT, "2"), (MUL, "*"), (INT, "3")],
    );

    assert!(errors.is_empty(), "{:?}", errors.messages());
    assert_eq!(
        tree_string(&interp, root),
        "(s (e (e 1) + (e (e 2) * (e 3))) <EOF>)"
    );
}

#[test]
fn precedence_climbing_is_left_associative_across_levels() {
    let (interp, errors, root) = interpret(
        calc_parser(),
        &[(INT, "1"), (MUL, "*"), (INT, "2"), (ADD, "+"), (INT, "3")],
    );

    assert!(errors.is_empty(), "{:?}", errors.messages());
    assert_eq!(
        tree_string(&interp, root),
        "(s (e (e (e 1) * (e 2)) + (e 3)) <EOF>)"
    );
}

#[test]
fn recursion_contexts_keep_parent_links() {
    let (interp, _, root) = interpret(calc_parser(), &[(INT, "1"), (ADD, "+"), (INT, "2")]);
    let tree = interp.parser().tree();

    let e = tree.child(root, 0).unwrap();
    assert_eq!(tree.parent(e), Some(root));
    let e_rule = tree.rule(e).unwrap();
    assert_eq!(e_rule.rule_index, 1);
    assert_eq!(e_rule.invoking_state, Some(4));
    assert_eq!(e_rule.start.as_ref().unwrap().text, "1");
    assert_eq!(e_rule.stop.as_ref().unwrap().text, "2");

    let left = tree.child(e, 0).unwrap();
    assert_eq!(tree.parent(left), Some(e));
    assert_eq!(tree.rule(left).unwrap().stop.as_ref().unwrap().text, "1");
    assert_eq!(tree.text(root), "1+2<EOF>");
}

#[test]
fn left_recursive_start_rule() {
    let (interp, errors, root) = interpret(expr_parser(), &[(INT, "1"), (ADD, "+"), (INT, "2")]);

    assert!(errors.is_empty(), "{:?}", errors.messages());
    insta::assert_snapshot!(tree_string(&interp, root), @"(e (e 1) + (e 2))");
    assert_eq!(interp.parser().tree().parent(root), None);
    assert_eq!(interp.parser().precedence(), 0);
}

#[test]
fn parse_listener_sees_rule_events() {
    let (mut p, _) = parser(hello_parser(), &[(1, "hello"), (2, "world")]);
    let log = EventLog::new(p.grammar().rule_names());
    p.add_parse_listener(log.clone());
    let mut interp = ParserInterpreter::new(p);

    interp.parse(0).unwrap();

    assert_eq!(
        log.events(),
        vec!["enter r", "terminal hello", "terminal world", "exit r"]
    );
}

#[test]
fn bail_strategy_cancels_on_first_error() {
    let (mut p, errors) = parser(hello_parser(), &[(1, "hello")]);
    p.set_error_strategy(BailErrorStrategy::new());
    let mut interp = ParserInterpreter::new(p);

    let err = interp.parse(0).unwrap_err();

    assert!(matches!(
        err,
        Error::Cancelled(RecognitionError::InputMismatch { .. })
    ));
    assert!(errors.is_empty());
    let root = interp.root().unwrap();
    assert!(interp.parser().tree().rule(root).unwrap().exception.is_some());
}

#[test]
fn reset_allows_reparse() {
    let (p, errors) = parser(hello_parser(), &[(1, "hello"), (2, "world")]);
    let mut interp = ParserInterpreter::new(p);

    let first = interp.parse(0).unwrap();
    let first_tree = tree_string(&interp, first);
    interp.reset();
    let second = interp.parse(0).unwrap();

    assert_eq!(tree_string(&interp, second), first_tree);
    assert!(errors.is_empty());
}

#[test]
fn parser_is_idle_after_parse() {
    let (interp, _, _) = interpret(hello_parser(), &[(1, "hello"), (2, "world")]);
    let parser = interp.parser();

    assert_eq!(parser.state(), None);
    assert!(parser.expected_tokens().is_empty());
    assert!(!parser.is_expected_token(token::EOF));
}

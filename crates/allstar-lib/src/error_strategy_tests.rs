use allstar_core::token;

use crate::error::{Error, RecognitionError, Result};
use crate::error_strategy::BailErrorStrategy;
use crate::interpreter::ParserInterpreter;
use crate::parser::Parser;
use crate::test_utils::{ambiguous_parser, calc_parser, hello_parser, parser};
use crate::tree::NodeId;

const MUL: i32 = 1;
const ADD: i32 = 2;
const INT: i32 = 3;

/// `r : 'hello' ID ;` written the way a generated rule function drives the
/// parser.
fn rule_r(p: &mut Parser) -> Result<NodeId> {
    let ctx = p.enter_rule(0, 0);
    p.enter_outer_alt(ctx, 1);
    p.set_state(3);
    p.match_token(1)?;
    p.set_state(4);
    p.match_token(2)?;
    p.set_state(5);
    p.exit_rule();
    Ok(ctx)
}

#[test]
fn generated_style_rule() {
    let (mut p, errors) = parser(hello_parser(), &[(1, "hello"), (2, "world")]);

    let ctx = rule_r(&mut p).unwrap();

    assert!(errors.is_empty());
    assert_eq!(
        p.tree().to_string_tree(ctx, p.grammar().rule_names()),
        "(r hello world)"
    );
    assert_eq!(p.ctx(), None);
    assert_eq!(p.state(), None);
}

#[test]
fn expected_tokens_follow_the_atn() {
    let (mut p, _) = parser(hello_parser(), &[(1, "hello")]);
    let vocabulary = p.grammar().vocabulary().clone();
    p.enter_rule(0, 0);

    p.set_state(3);
    assert_eq!(p.expected_tokens().to_string_with(&vocabulary), "'hello'");
    assert!(p.is_expected_token(1));
    assert!(!p.is_expected_token(2));

    p.set_state(4);
    assert_eq!(p.expected_tokens().to_string_with(&vocabulary), "ID");

    // end of the start rule: only EOF can follow
    p.set_state(5);
    assert!(p.is_expected_token(token::EOF));
    assert!(!p.is_expected_token(2));
    assert_eq!(p.rule_invocation_stack(), vec!["r"]);
}

#[test]
fn expected_tokens_look_into_invoking_rules() {
    let (mut p, _) = parser(calc_parser(), &[(INT, "1")]);
    let vocabulary = p.grammar().vocabulary().clone();
    p.enter_rule(0, 0);
    p.set_state(4);
    let e = p.enter_rule(2, 1);
    p.set_state(8);

    assert_eq!(p.invoking_states(Some(e)), vec![4]);
    assert_eq!(p.rule_invocation_stack(), vec!["e", "s"]);
    assert_eq!(
        p.expected_tokens().to_string_with(&vocabulary),
        "{<EOF>, '*', '+'}"
    );
    assert!(p.is_expected_token(token::EOF));
    assert!(!p.is_expected_token(INT));

    let within = p.expected_tokens_within_current_rule();
    assert!(within.contains(MUL) && within.contains(ADD));
    assert!(within.contains(token::EPSILON));
}

#[test]
fn no_viable_alternative_message() {
    let (mut p, errors) = parser(ambiguous_parser(), &[]);
    p.enter_rule(0, 0);
    p.set_state(2);

    let Err(Error::Recognition(e)) = p.adaptive_predict(0) else {
        panic!("expected a recognition error");
    };

    assert!(matches!(e, RecognitionError::NoViableAlt { .. }));
    assert!(e.offending_token().unwrap().is_eof());
    p.report_error(&e);
    assert_eq!(
        errors.messages(),
        vec!["line 1:0 no viable alternative at input '<EOF>'"]
    );

    // quiet until a token matches again
    p.report_error(&e);
    assert_eq!(errors.len(), 1);
    assert!(p.in_error_recovery_mode());
}

#[test]
fn failed_predicate_message() {
    let (mut p, errors) = parser(hello_parser(), &[(1, "hello")]);
    p.enter_rule(0, 0);
    p.set_state(3);

    let e = p.failed_predicate(0, Some(1), "0:1");
    p.report_error(&e);

    assert_eq!(
        errors.messages(),
        vec!["line 1:0 rule r failed predicate: {0:1}?"]
    );
    assert_eq!(p.syntax_errors(), 1);
}

#[test]
fn match_leaves_recovery_mode() {
    let (mut p, _) = parser(hello_parser(), &[(1, "hello"), (2, "world")]);
    p.enter_rule(0, 0);
    p.set_state(3);
    let e = p.input_mismatch(None);
    p.report_error(&e);
    assert!(p.in_error_recovery_mode());

    p.match_token(1).unwrap();

    assert!(!p.in_error_recovery_mode());
}

#[test]
fn resync_consumes_unexpected_tokens_as_errors() {
    let (p, errors) = parser(ambiguous_parser(), &[(5, "y"), (5, "z")]);
    let mut interp = ParserInterpreter::new(p);

    let root = interp.parse(0).unwrap();

    let p = interp.parser();
    assert_eq!(
        errors.messages(),
        vec!["line 1:0 mismatched input 'y' expecting X"]
    );
    assert_eq!(p.tree().to_string_tree(root, p.grammar().rule_names()), "(r y z)");
    let children = p.tree().children(root);
    assert!(children.iter().all(|&c| p.tree().node(c).is_error()));
}

#[test]
fn bail_strategy_never_resyncs() {
    let (mut p, errors) = parser(ambiguous_parser(), &[(5, "y")]);
    p.set_error_strategy(BailErrorStrategy::new());
    let mut interp = ParserInterpreter::new(p);

    let err = interp.parse(0).unwrap_err();

    // sync is a no-op, so the decision itself fails
    assert!(matches!(
        err,
        Error::Cancelled(RecognitionError::NoViableAlt { .. })
    ));
    assert_eq!(
        errors.messages(),
        vec!["line 1:0 no viable alternative at input 'y'"]
    );
}

#[test]
fn dfa_dump_after_parse() {
    let (p, _) = parser(calc_parser(), &[(INT, "1"), (ADD, "+"), (INT, "2")]);
    let mut interp = ParserInterpreter::new(p);
    interp.parse(0).unwrap();
    let p = interp.parser();

    assert_eq!(p.dfa_strings().len(), 2);
    let dump = p.dump_dfa();
    assert!(dump.contains("Decision 1:\n"), "{dump}");

    p.grammar().clear_dfa();
    assert!(p.dump_dfa().is_empty());
}

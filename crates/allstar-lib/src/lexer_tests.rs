use allstar_core::{IntStream, token};

use crate::error::Error;
use crate::error_listener::ErrorCollector;
use crate::input_stream::InputStream;
use crate::interpreter::ParserInterpreter;
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::test_utils::{hello_lexer, hello_parser, modes_lexer};
use crate::token::Token;
use crate::token_stream::CommonTokenStream;

const T_HELLO: i32 = 1;
const ID: i32 = 2;

const STRING: i32 = 1;
const M_ID: i32 = 2;
const M_WS: i32 = 3;

fn lexer(grammar: std::sync::Arc<crate::Grammar>, text: &str) -> (Lexer, ErrorCollector) {
    let mut lexer = Lexer::new(grammar, InputStream::new(text)).unwrap();
    let errors = ErrorCollector::new();
    lexer.remove_error_listeners();
    lexer.add_error_listener(errors.clone());
    (lexer, errors)
}

fn summary(tokens: &[Token]) -> Vec<(i32, &str)> {
    tokens
        .iter()
        .map(|t| (t.token_type, t.text.as_str()))
        .collect()
}

#[test]
fn keyword_wins_tie_and_whitespace_is_skipped() {
    let (mut lexer, errors) = lexer(hello_lexer(), "hello world");

    let tokens = lexer.all_tokens().unwrap();

    assert_eq!(summary(&tokens), vec![(T_HELLO, "hello"), (ID, "world")]);
    assert_eq!((tokens[1].start, tokens[1].stop), (6, 10));
    assert_eq!((tokens[1].line, tokens[1].column), (1, 6));
    assert!(errors.is_empty());
}

#[test]
fn longest_match_wins() {
    let (mut lexer, _) = lexer(hello_lexer(), "hellos");

    let tokens = lexer.all_tokens().unwrap();

    assert_eq!(summary(&tokens), vec![(ID, "hellos")]);
}

#[test]
fn positions_track_newlines() {
    let (mut lexer, _) = lexer(hello_lexer(), "hello\n  world");

    let tokens = lexer.all_tokens().unwrap();

    assert_eq!((tokens[1].line, tokens[1].column), (2, 2));
    assert_eq!(lexer.line(), 2);
    assert_eq!(lexer.column(), 7);
}

#[test]
fn eof_is_returned_forever() {
    let (mut lexer, _) = lexer(hello_lexer(), "hi");

    assert_eq!(lexer.next_token().unwrap().text, "hi");
    let eof = lexer.next_token().unwrap();
    assert!(eof.is_eof());
    assert_eq!(eof.text, "<EOF>");
    assert_eq!((eof.start, eof.stop), (2, 1));
    assert_eq!(eof.column, 2);
    assert!(lexer.next_token().unwrap().is_eof());
}

#[test]
fn unmatched_character_is_reported_and_dropped() {
    let (mut lexer, errors) = lexer(hello_lexer(), "Hello");

    let tokens = lexer.all_tokens().unwrap();

    assert_eq!(
        errors.messages(),
        vec!["line 1:0 token recognition error at: 'H'"]
    );
    assert_eq!(summary(&tokens), vec![(ID, "ello")]);
    assert_eq!((tokens[0].start, tokens[0].column), (1, 1));
}

#[test]
fn error_position_is_token_start() {
    let (mut lexer, errors) = lexer(hello_lexer(), "hello\tX\nX");

    let tokens = lexer.all_tokens().unwrap();

    assert_eq!(summary(&tokens), vec![(T_HELLO, "hello")]);
    assert_eq!(
        errors.messages(),
        vec![
            "line 1:6 token recognition error at: 'X'",
            "line 2:0 token recognition error at: 'X'",
        ]
    );
}

#[test]
fn more_joins_matches_across_modes() {
    let (mut lexer, errors) = lexer(modes_lexer(), "ab \"c d\" e");

    let tokens = lexer.all_tokens().unwrap();

    assert!(errors.is_empty(), "{:?}", errors.messages());
    assert_eq!(
        summary(&tokens),
        vec![
            (M_ID, "ab"),
            (M_WS, " "),
            (STRING, "\"c d\""),
            (M_WS, " "),
            (M_ID, "e"),
        ]
    );
    assert_eq!(tokens[1].channel, token::HIDDEN_CHANNEL);
    assert_eq!(tokens[2].channel, token::DEFAULT_CHANNEL);
    assert_eq!((tokens[2].start, tokens[2].stop), (3, 7));
    assert_eq!(lexer.mode(), 0);
    assert!(lexer.state().mode_stack().is_empty());
}

#[test]
fn mode_stack_operations() {
    let (mut lexer, _) = lexer(modes_lexer(), "");

    assert!(matches!(lexer.pop_mode(), Err(Error::EmptyModeStack)));

    lexer.push_mode(1);
    assert_eq!(lexer.mode(), 1);
    assert_eq!(lexer.state().mode_stack(), &[0]);
    assert_eq!(lexer.pop_mode().unwrap(), 0);
    assert_eq!(lexer.mode(), 0);

    lexer.set_mode(1);
    lexer.reset();
    assert_eq!(lexer.mode(), 0);
}

#[test]
fn lexer_requires_lexer_grammar() {
    let err = Lexer::new(hello_parser(), InputStream::new("")).err().unwrap();
    assert!(matches!(err, Error::WrongGrammarType { expected: "lexer" }));
}

#[test]
fn reset_relexes_from_start() {
    let (mut lexer, _) = lexer(hello_lexer(), "hello world");
    let first = lexer.all_tokens().unwrap();

    lexer.reset();

    assert_eq!(lexer.all_tokens().unwrap(), first);
}

#[test]
fn lexer_feeds_parser() {
    let (lexer, _) = lexer(hello_lexer(), "hello world");
    let mut parser = Parser::new(hello_parser(), CommonTokenStream::new(lexer)).unwrap();
    let errors = ErrorCollector::new();
    parser.remove_error_listeners();
    parser.add_error_listener(errors.clone());
    let mut interp = ParserInterpreter::new(parser);

    let root = interp.parse(0).unwrap();

    let parser = interp.parser();
    assert!(errors.is_empty());
    assert_eq!(
        parser.tree().to_string_tree(root, parser.grammar().rule_names()),
        "(r hello world)"
    );
    assert_eq!(parser.input().source_name(), "<unknown>");
}

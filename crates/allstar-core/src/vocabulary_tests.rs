use indoc::indoc;

use crate::token;
use crate::vocabulary::{Vocabulary, VocabularyError};

#[test]
fn tokens_file_loads_both_name_kinds() {
    let src = indoc! {"
        T__0=1
        ID=2
        WS=3
        'hello'=1
        '='=4
    "};
    let vocab = Vocabulary::from_tokens_file(src).unwrap();

    assert_eq!(vocab.max_token_type(), 4);
    assert_eq!(vocab.symbolic_name(2), Some("ID"));
    assert_eq!(vocab.literal_name(1), Some("'hello'"));
    assert_eq!(vocab.literal_name(4), Some("'='"));
    assert_eq!(vocab.display_name(1), "'hello'");
    assert_eq!(vocab.display_name(3), "WS");
    assert_eq!(vocab.display_name(9), "9");
    assert_eq!(vocab.token_type("WS"), Some(3));
    assert_eq!(vocab.token_type("'hello'"), Some(1));
}

#[test]
fn eof_has_a_symbolic_name() {
    let vocab = Vocabulary::default();
    assert_eq!(vocab.symbolic_name(token::EOF), Some("EOF"));
    assert_eq!(vocab.display_name(token::EOF), "EOF");
    assert_eq!(vocab.token_type("EOF"), Some(token::EOF));
}

#[test]
fn tokens_file_errors_carry_line() {
    let err = Vocabulary::from_tokens_file("ID=1\nnonsense\n").unwrap_err();
    assert_eq!(
        err,
        VocabularyError::Malformed {
            line: 2,
            text: "nonsense".to_string()
        }
    );

    let err = Vocabulary::from_tokens_file("ID=x").unwrap_err();
    assert_eq!(err.to_string(), "line 1: invalid token type `x`");
}

#[test]
fn legacy_token_names() {
    let vocab = Vocabulary::from_token_names(&["<INVALID>", "'+'", "ID"]);
    assert_eq!(vocab.literal_name(1), Some("'+'"));
    assert_eq!(vocab.symbolic_name(2), Some("ID"));
    assert_eq!(vocab.display_name(0), "<INVALID>");
}

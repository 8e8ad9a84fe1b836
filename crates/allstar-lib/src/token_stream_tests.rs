use allstar_core::{IntStream, Interval, token};

use crate::error::{Error, Result};
use crate::test_utils::tokens;
use crate::token::Token;
use crate::token_source::{ListTokenSource, TokenSource};
use crate::token_stream::CommonTokenStream;

const ID: i32 = 1;
const WS: i32 = 2;

/// `a`, a hidden space, `b`, then EOF.
fn with_hidden_space() -> CommonTokenStream {
    let mut list = tokens(&[(ID, "a"), (WS, " "), (ID, "b")]);
    list[1].channel = token::HIDDEN_CHANNEL;
    CommonTokenStream::new(ListTokenSource::new(list))
}

#[test]
fn lookahead_skips_off_channel_tokens() {
    let mut s = with_hidden_space();

    assert_eq!(s.lt(1).unwrap().text, "a");
    assert_eq!(s.lt(2).unwrap().text, "b");
    assert_eq!(s.la(3), token::EOF);
    assert_eq!(s.la(0), 0);
    assert!(s.lt(-1).is_none());

    s.consume();
    assert_eq!(s.index(), 2);
    assert_eq!(s.lt(1).unwrap().text, "b");
    assert_eq!(s.lt(-1).unwrap().text, "a");
}

#[test]
fn consume_stops_at_eof() {
    let mut s = with_hidden_space();
    s.consume();
    s.consume();
    assert!(s.lt(1).unwrap().is_eof());
    let at_eof = s.index();

    s.consume();

    assert_eq!(s.index(), at_eof);
    assert_eq!(s.la(1), token::EOF);
}

#[test]
fn tokens_are_indexed_in_buffer_order() {
    let mut s = with_hidden_space();
    s.fill();

    let indexes: Vec<_> = s.tokens().iter().map(|t| t.index).collect();
    assert_eq!(indexes, vec![Some(0), Some(1), Some(2), Some(3)]);
    assert_eq!(s.size(), 4);
    assert_eq!(s.get(1).unwrap().channel, token::HIDDEN_CHANNEL);
}

#[test]
fn synthesized_eof_follows_last_token() {
    let mut s = with_hidden_space();
    s.fill();

    let eof = s.get(3).unwrap();
    assert!(eof.is_eof());
    assert_eq!(eof.start, 5);
    assert_eq!(eof.stop, 4);
    assert_eq!((eof.line, eof.column), (1, 5));
    assert_eq!(eof.text, "<EOF>");
}

#[test]
fn text_covers_every_channel_up_to_eof() {
    let mut s = with_hidden_space();

    assert_eq!(s.text(), "a b");
    assert_eq!(s.text_of(Interval::new(1, 2)), " b");
    assert_eq!(s.text_of(Interval::new(0, 10)), "a b");
    assert_eq!(s.text_of(Interval::INVALID), "");

    let a = s.get(0).unwrap().clone();
    let b = s.get(2).unwrap().clone();
    assert_eq!(s.text_between(&a, &b), "a b");
    assert_eq!(s.text_between(&Token::new(ID, "x"), &b), "");
}

#[test]
fn on_channel_count_includes_eof() {
    let mut s = with_hidden_space();
    assert_eq!(s.number_of_on_channel_tokens(), 3);
}

#[test]
fn hidden_tokens_around_a_token() {
    let mut s = with_hidden_space();

    let right: Vec<_> = s
        .hidden_tokens_to_right(0, None)
        .into_iter()
        .map(|t| t.text.clone())
        .collect();
    assert_eq!(right, vec![" "]);

    let left: Vec<_> = s
        .hidden_tokens_to_left(2, None)
        .into_iter()
        .map(|t| t.text.clone())
        .collect();
    assert_eq!(left, vec![" "]);

    assert!(s.hidden_tokens_to_left(0, None).is_empty());
    assert!(s.hidden_tokens_to_right(2, None).is_empty());
    assert!(s.hidden_tokens_to_right(0, Some(5)).is_empty());
}

#[test]
fn tokens_in_filters_by_type() {
    let mut s = with_hidden_space();
    s.fill();

    let ids: Vec<_> = s
        .tokens_in(0, 3, Some(&[ID]))
        .into_iter()
        .map(|t| t.text.as_str())
        .collect();
    assert_eq!(ids, vec!["a", "b"]);
    assert_eq!(s.tokens_in(0, 3, None).len(), 3);
}

#[test]
fn seek_lands_on_channel() {
    let mut s = with_hidden_space();

    s.seek(1);

    assert_eq!(s.index(), 2);
    assert_eq!(s.lt(1).unwrap().text, "b");
}

#[test]
fn alternate_channel_sees_only_its_tokens() {
    let mut list = tokens(&[(ID, "a"), (WS, " "), (ID, "b")]);
    list[1].channel = token::HIDDEN_CHANNEL;
    let mut s = CommonTokenStream::with_channel(ListTokenSource::new(list), token::HIDDEN_CHANNEL);

    assert_eq!(s.channel(), token::HIDDEN_CHANNEL);
    assert_eq!(s.lt(1).unwrap().text, " ");
    s.consume();
    assert!(s.lt(1).unwrap().is_eof());
}

struct Failing {
    emitted: bool,
}

impl TokenSource for Failing {
    fn next_token(&mut self) -> Result<Token> {
        if self.emitted {
            return Err(Error::EmptyModeStack);
        }
        self.emitted = true;
        Ok(Token::new(ID, "a").with_span(0, 0))
    }

    fn line(&self) -> usize {
        1
    }

    fn column(&self) -> usize {
        1
    }
}

#[test]
fn source_error_ends_the_stream() {
    let mut s = CommonTokenStream::new(Failing { emitted: false });

    s.fill();

    assert_eq!(s.size(), 2);
    let eof = s.get(1).unwrap();
    assert!(eof.is_eof());
    assert_eq!(eof.start, 1);
    assert!(matches!(s.take_error(), Some(Error::EmptyModeStack)));
    assert!(s.take_error().is_none());
}

#[test]
fn list_source_keeps_explicit_eof() {
    let mut list = tokens(&[(ID, "a")]);
    list.push(Token::eof(7, 2, 4));
    let mut source = ListTokenSource::new(list).with_source_name("fixture");

    assert_eq!(source.source_name(), "fixture");
    assert_eq!(source.next_token().unwrap().text, "a");
    let eof = source.next_token().unwrap();
    assert_eq!((eof.start, eof.line, eof.column), (7, 2, 4));
    assert_eq!(source.next_token().unwrap(), eof);
}

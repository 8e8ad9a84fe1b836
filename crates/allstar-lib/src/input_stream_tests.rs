use allstar_core::{CharStream, IntStream, Interval, UNKNOWN_SOURCE_NAME, token};

use crate::input_stream::InputStream;
use crate::token::Token;

#[test]
fn lookahead_by_code_point() {
    let mut s = InputStream::new("aé😀");

    assert_eq!(s.la(1), 'a' as i32);
    assert_eq!(s.la(2), 'é' as i32);
    assert_eq!(s.la(3), '😀' as i32);
    assert_eq!(s.la(4), token::EOF);
    assert_eq!(s.la(0), 0);
    assert_eq!(s.la(-1), token::EOF);
    assert_eq!(s.size(), 3);

    s.consume();
    assert_eq!(s.la(-1), 'a' as i32);
    assert_eq!(s.index(), 1);
}

#[test]
fn consume_stops_at_end() {
    let mut s = InputStream::new("x");
    s.consume();
    s.consume();
    assert_eq!(s.index(), 1);
    assert_eq!(s.la(1), token::EOF);
}

#[test]
fn seek_clamps_and_reset_rewinds() {
    let mut s = InputStream::new("abc");
    s.seek(10);
    assert_eq!(s.index(), 3);
    s.seek(1);
    assert_eq!(s.la(1), 'b' as i32);
    s.reset();
    assert_eq!(s.index(), 0);
}

#[test]
fn text_of_interval() {
    let s = InputStream::new("hello world");

    assert_eq!(s.text(Interval::new(0, 4)), "hello");
    assert_eq!(s.text(Interval::new(6, 100)), "world");
    assert_eq!(s.text(Interval::new(3, 2)), "");
    assert_eq!(s.text(Interval::new(20, 30)), "");
    assert_eq!(s.text(Interval::INVALID), "");
}

#[test]
fn source_name() {
    assert_eq!(InputStream::new("").source_name(), UNKNOWN_SOURCE_NAME);
    assert_eq!(
        InputStream::new("").with_source_name("in.txt").source_name(),
        "in.txt"
    );
}

#[test]
fn token_display() {
    let t = Token::new(2, "a\nb")
        .with_span(3, 5)
        .with_position(4, 1);
    assert_eq!(t.to_string(), "[@-1,3:5='a\\nb',<2>,4:1]");

    let mut hidden = t.with_channel(1);
    hidden.index = Some(7);
    assert_eq!(hidden.to_string(), "[@7,3:5='a\\nb',<2>,channel=1,4:1]");
}

#[test]
fn eof_token_is_empty() {
    let eof = Token::eof(4, 2, 0);
    assert!(eof.is_eof());
    assert_eq!((eof.start, eof.stop), (4, 3));
    assert_eq!(eof.to_string(), "[@-1,4:3='<EOF>',<-1>,2:0]");
}

#[test]
fn token_serializes_type_field() {
    let t = Token::new(2, "ab").with_span(0, 1);
    let json = serde_json::to_value(&t).unwrap();

    assert_eq!(json["type"], 2);
    assert_eq!(json["text"], "ab");
    assert_eq!(json["index"], serde_json::Value::Null);
    assert_eq!(json["stop"], 1);
}

//! Tokens produced by lexers and consumed by parsers.

use std::fmt;

use allstar_core::utils::escape_whitespace;
use allstar_core::{Vocabulary, token};
use serde::Serialize;

/// Text of every EOF token.
pub const EOF_TEXT: &str = "<EOF>";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Token {
    #[serde(rename = "type")]
    pub token_type: i32,
    pub channel: i32,
    /// Char index of the first character; -1 when not taken from input.
    pub start: isize,
    /// Char index of the last character; `start - 1` for empty tokens.
    pub stop: isize,
    /// Position in the token stream. `None` until buffered, and for tokens
    /// conjured during error recovery.
    pub index: Option<usize>,
    pub line: usize,
    pub column: usize,
    pub text: String,
}

impl Token {
    pub fn new(token_type: i32, text: impl Into<String>) -> Self {
        Self {
            token_type,
            channel: token::DEFAULT_CHANNEL,
            start: -1,
            stop: -1,
            index: None,
            line: 1,
            column: 0,
            text: text.into(),
        }
    }

    /// Empty EOF token at char index `start`.
    pub fn eof(start: usize, line: usize, column: usize) -> Self {
        let start = start as isize;
        Self {
            start,
            stop: start - 1,
            line,
            column,
            ..Self::new(token::EOF, EOF_TEXT)
        }
    }

    pub fn with_channel(mut self, channel: i32) -> Self {
        self.channel = channel;
        self
    }

    pub fn with_span(mut self, start: isize, stop: isize) -> Self {
        self.start = start;
        self.stop = stop;
        self
    }

    pub fn with_position(mut self, line: usize, column: usize) -> Self {
        self.line = line;
        self.column = column;
        self
    }

    pub fn is_eof(&self) -> bool {
        self.token_type == token::EOF
    }

    /// Like `Display`, with the type rendered by its vocabulary name.
    pub fn to_string_with(&self, vocabulary: &Vocabulary) -> String {
        self.render(&vocabulary.display_name(self.token_type))
    }

    fn render(&self, type_name: &str) -> String {
        let index = self.index.map_or(-1, |i| i as isize);
        let channel = if self.channel > 0 {
            format!(",channel={}", self.channel)
        } else {
            String::new()
        };
        format!(
            "[@{index},{}:{}='{}',<{type_name}>{channel},{}:{}]",
            self.start,
            self.stop,
            escape_whitespace(&self.text, false),
            self.line,
            self.column
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(&self.token_type.to_string()))
    }
}

//! Producers of tokens.

use allstar_core::{UNKNOWN_SOURCE_NAME, token};

use crate::error::Result;
use crate::token::{EOF_TEXT, Token};

/// Anything that hands out tokens one at a time, ending with EOF forever.
pub trait TokenSource {
    fn next_token(&mut self) -> Result<Token>;

    /// Line of the next character, 1-based.
    fn line(&self) -> usize;

    /// Column of the next character, 0-based.
    fn column(&self) -> usize;

    fn source_name(&self) -> &str {
        UNKNOWN_SOURCE_NAME
    }
}

impl<T: TokenSource + ?Sized> TokenSource for Box<T> {
    fn next_token(&mut self) -> Result<Token> {
        (**self).next_token()
    }

    fn line(&self) -> usize {
        (**self).line()
    }

    fn column(&self) -> usize {
        (**self).column()
    }

    fn source_name(&self) -> &str {
        (**self).source_name()
    }
}

/// Replays a fixed list of tokens, then EOF.
///
/// When the list does not end with EOF, one is synthesized right after the
/// last token's stop index and position.
#[derive(Clone, Debug)]
pub struct ListTokenSource {
    tokens: Vec<Token>,
    i: usize,
    eof: Option<Token>,
    name: String,
}

impl ListTokenSource {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            i: 0,
            eof: None,
            name: "List".to_string(),
        }
    }

    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    fn synthesize_eof(&self) -> Token {
        let start = match self.tokens.last() {
            Some(last) if last.stop != -1 => last.stop + 1,
            _ => -1,
        };
        let mut eof = Token::new(token::EOF, EOF_TEXT).with_position(self.line(), self.column());
        eof.start = start;
        eof.stop = (start - 1).max(-1);
        eof
    }
}

impl TokenSource for ListTokenSource {
    fn next_token(&mut self) -> Result<Token> {
        let Some(t) = self.tokens.get(self.i) else {
            if let Some(eof) = &self.eof {
                return Ok(eof.clone());
            }
            let eof = self.synthesize_eof();
            self.eof = Some(eof.clone());
            return Ok(eof);
        };
        let t = t.clone();
        if self.i == self.tokens.len() - 1 && t.is_eof() {
            self.eof = Some(t.clone());
        }
        self.i += 1;
        Ok(t)
    }

    fn line(&self) -> usize {
        if let Some(t) = self.tokens.get(self.i) {
            return t.line;
        }
        if let Some(eof) = &self.eof {
            return eof.line;
        }
        match self.tokens.last() {
            Some(last) => last.line + last.text.matches('\n').count(),
            None => 1,
        }
    }

    fn column(&self) -> usize {
        if let Some(t) = self.tokens.get(self.i) {
            return t.column;
        }
        if let Some(eof) = &self.eof {
            return eof.column;
        }
        let Some(last) = self.tokens.last() else {
            return 0;
        };
        if let Some(nl) = last.text.rfind('\n') {
            return last.text[nl + 1..].chars().count();
        }
        last.column + (last.stop - last.start + 1).max(0) as usize
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}

//! Buffered token stream filtered to one channel.

use allstar_core::{IntStream, Interval, token};

use crate::error::{Error, Result};
use crate::token::Token;
use crate::token_source::TokenSource;

/// Pulls tokens from a [`TokenSource`] on demand and keeps all of them, so
/// prediction can look ahead and rewind freely.
///
/// Lookahead (`lt`, `la`, `consume`) skips tokens that are not on the
/// stream's channel; `get` and `tokens` see everything. A failing source is
/// treated as having reached EOF; the error is kept for [`Self::take_error`].
pub struct CommonTokenStream {
    source: Box<dyn TokenSource>,
    tokens: Vec<Token>,
    /// Index of the current token; `None` until the first access.
    p: Option<usize>,
    channel: i32,
    fetched_eof: bool,
    error: Option<Error>,
}

impl CommonTokenStream {
    pub fn new(source: impl TokenSource + 'static) -> Self {
        Self::with_channel(source, token::DEFAULT_CHANNEL)
    }

    pub fn with_channel(source: impl TokenSource + 'static, channel: i32) -> Self {
        Self {
            source: Box::new(source),
            tokens: Vec::new(),
            p: None,
            channel,
            fetched_eof: false,
            error: None,
        }
    }

    pub fn token_source(&self) -> &dyn TokenSource {
        self.source.as_ref()
    }

    pub fn channel(&self) -> i32 {
        self.channel
    }

    /// Error the token source failed with, if any.
    pub fn take_error(&mut self) -> Option<Error> {
        self.error.take()
    }

    /// Token `k` on-channel positions away: 1 is the current token, -1 the
    /// previous one. `None` for `k == 0` and before the first token.
    pub fn lt(&mut self, k: isize) -> Option<&Token> {
        let p = self.lazy_init();
        if k == 0 {
            return None;
        }
        if k < 0 {
            return self.lb(p, -k);
        }
        let mut i = p;
        for _ in 1..k {
            if self.sync(i + 1) {
                i = self.next_token_on_channel(i + 1);
            }
        }
        self.tokens.get(i)
    }

    fn lb(&mut self, p: usize, k: isize) -> Option<&Token> {
        if (p as isize) - k < 0 {
            return None;
        }
        let mut i = p as isize;
        let mut n = 1;
        while n <= k && i > 0 {
            i = self
                .previous_token_on_channel((i - 1) as usize)
                .map_or(-1, |j| j as isize);
            n += 1;
        }
        if i < 0 {
            return None;
        }
        self.tokens.get(i as usize)
    }

    /// Buffered token at absolute index `index`, any channel.
    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    /// Every token buffered so far, all channels.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Buffered tokens in `start..=stop`, optionally only those of `types`.
    pub fn tokens_in(&self, start: usize, stop: usize, types: Option<&[i32]>) -> Vec<&Token> {
        let stop = stop.min(self.tokens.len().saturating_sub(1));
        self.tokens
            .get(start..=stop)
            .unwrap_or_default()
            .iter()
            .take_while(|t| !t.is_eof())
            .filter(|t| types.is_none_or(|types| types.contains(&t.token_type)))
            .collect()
    }

    /// Reads the whole source.
    pub fn fill(&mut self) {
        self.lazy_init();
        const BLOCK: usize = 1000;
        while self.fetch(BLOCK) >= BLOCK {}
    }

    /// Concatenated text of all tokens, up to EOF.
    pub fn text(&mut self) -> String {
        self.fill();
        self.text_of(Interval::new(0, self.tokens.len() as i32 - 1))
    }

    /// Concatenated text of buffered tokens whose index is in `interval`.
    pub fn text_of(&self, interval: Interval) -> String {
        if interval.a < 0 || interval.b < 0 {
            return String::new();
        }
        let stop = (interval.b as usize).min(self.tokens.len().saturating_sub(1));
        let Some(tokens) = self.tokens.get(interval.a as usize..=stop) else {
            return String::new();
        };
        tokens
            .iter()
            .take_while(|t| !t.is_eof())
            .map(|t| t.text.as_str())
            .collect()
    }

    /// Text from `start` to `stop` inclusive, by stream index.
    pub fn text_between(&self, start: &Token, stop: &Token) -> String {
        match (start.index, stop.index) {
            (Some(a), Some(b)) => self.text_of(Interval::new(a as i32, b as i32)),
            _ => String::new(),
        }
    }

    pub fn number_of_on_channel_tokens(&mut self) -> usize {
        self.fill();
        let mut n = 0;
        for t in &self.tokens {
            if t.channel == self.channel {
                n += 1;
            }
            if t.is_eof() {
                break;
            }
        }
        n
    }

    /// Off-channel tokens directly after `index`, up to the next on-channel
    /// token or EOF. `channel` narrows to one channel.
    pub fn hidden_tokens_to_right(&mut self, index: usize, channel: Option<i32>) -> Vec<&Token> {
        self.lazy_init();
        self.sync(index);
        if index >= self.tokens.len() {
            return Vec::new();
        }
        let next = self.next_token_on_channel(index + 1);
        self.filter_hidden(index + 1, next, channel)
    }

    /// Off-channel tokens directly before `index`, back to the previous
    /// on-channel token. `channel` narrows to one channel.
    pub fn hidden_tokens_to_left(&mut self, index: usize, channel: Option<i32>) -> Vec<&Token> {
        self.lazy_init();
        self.sync(index);
        if index == 0 || index >= self.tokens.len() {
            return Vec::new();
        }
        let from = match self.previous_token_on_channel(index - 1) {
            Some(prev) if prev == index - 1 => return Vec::new(),
            Some(prev) => prev + 1,
            None => 0,
        };
        self.filter_hidden(from, index - 1, channel)
    }

    fn filter_hidden(&self, from: usize, to: usize, channel: Option<i32>) -> Vec<&Token> {
        if from > to {
            return Vec::new();
        }
        self.tokens[from..=to]
            .iter()
            .filter(|t| match channel {
                Some(c) => t.channel == c,
                None => t.channel != token::DEFAULT_CHANNEL,
            })
            .collect()
    }

    fn lazy_init(&mut self) -> usize {
        if let Some(p) = self.p {
            return p;
        }
        self.sync(0);
        let p = self.next_token_on_channel(0);
        self.p = Some(p);
        p
    }

    /// Makes sure token `i` is buffered; false when the source ended first.
    fn sync(&mut self, i: usize) -> bool {
        let len = self.tokens.len();
        if i < len {
            return true;
        }
        let needed = i - len + 1;
        self.fetch(needed) >= needed
    }

    fn fetch(&mut self, n: usize) -> usize {
        if self.fetched_eof {
            return 0;
        }
        for k in 0..n {
            let mut t = match self.source.next_token() {
                Ok(t) => t,
                Err(e) => {
                    self.error.get_or_insert(e);
                    let start = self.tokens.last().map_or(0, |t| (t.stop + 1).max(0) as usize);
                    Token::eof(start, self.source.line(), self.source.column())
                }
            };
            t.index = Some(self.tokens.len());
            let eof = t.is_eof();
            self.tokens.push(t);
            if eof {
                self.fetched_eof = true;
                return k + 1;
            }
        }
        n
    }

    /// First on-channel token (or EOF) at or after `i`.
    fn next_token_on_channel(&mut self, mut i: usize) -> usize {
        self.sync(i);
        loop {
            let Some(t) = self.tokens.get(i) else {
                return self.tokens.len().saturating_sub(1);
            };
            if t.channel == self.channel || t.is_eof() {
                return i;
            }
            i += 1;
            self.sync(i);
        }
    }

    /// Last on-channel token (or EOF) at or before `i`.
    fn previous_token_on_channel(&mut self, i: usize) -> Option<usize> {
        self.sync(i);
        if i >= self.tokens.len() {
            return self.tokens.len().checked_sub(1);
        }
        (0..=i).rev().find(|&j| {
            let t = &self.tokens[j];
            t.is_eof() || t.channel == self.channel
        })
    }
}

impl IntStream for CommonTokenStream {
    fn consume(&mut self) {
        let p = self.lazy_init();
        if self.la(1) == token::EOF {
            return;
        }
        if self.sync(p + 1) {
            self.p = Some(self.next_token_on_channel(p + 1));
        }
    }

    fn la(&mut self, i: isize) -> i32 {
        match self.lt(i) {
            Some(t) => t.token_type,
            None if i == 0 => 0,
            None => token::EOF,
        }
    }

    fn mark(&mut self) -> isize {
        0
    }

    fn release(&mut self, _marker: isize) {}

    fn index(&self) -> usize {
        self.p.unwrap_or(0)
    }

    fn seek(&mut self, index: usize) {
        self.lazy_init();
        self.p = Some(self.next_token_on_channel(index));
    }

    fn size(&self) -> usize {
        self.tokens.len()
    }

    fn source_name(&self) -> &str {
        self.source.source_name()
    }
}

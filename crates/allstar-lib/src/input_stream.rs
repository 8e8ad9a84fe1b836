//! In-memory character stream.

use allstar_core::{CharStream, IntStream, Interval, UNKNOWN_SOURCE_NAME, token};

/// Whole input buffered as Unicode code points; `la` and `text` index by
/// code point, not byte.
#[derive(Clone, Debug)]
pub struct InputStream {
    data: Vec<char>,
    p: usize,
    name: String,
}

impl InputStream {
    pub fn new(text: &str) -> Self {
        Self {
            data: text.chars().collect(),
            p: 0,
            name: UNKNOWN_SOURCE_NAME.to_string(),
        }
    }

    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Rewinds to the first character.
    pub fn reset(&mut self) {
        self.p = 0;
    }
}

impl IntStream for InputStream {
    fn consume(&mut self) {
        if self.p < self.data.len() {
            self.p += 1;
        }
    }

    fn la(&mut self, i: isize) -> i32 {
        if i == 0 {
            return 0;
        }
        // la(-1) is the previous char
        let offset = if i < 0 { i } else { i - 1 };
        let pos = self.p as isize + offset;
        if pos < 0 {
            return token::EOF;
        }
        self.data
            .get(pos as usize)
            .map_or(token::EOF, |&c| c as i32)
    }

    fn mark(&mut self) -> isize {
        -1
    }

    fn release(&mut self, _marker: isize) {}

    fn index(&self) -> usize {
        self.p
    }

    fn seek(&mut self, index: usize) {
        self.p = index.min(self.data.len());
    }

    fn size(&self) -> usize {
        self.data.len()
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}

impl CharStream for InputStream {
    fn text(&self, interval: Interval) -> String {
        let n = self.data.len() as i32;
        let start = interval.a;
        let stop = interval.b.min(n - 1);
        if start < 0 || start >= n || stop < start {
            return String::new();
        }
        self.data[start as usize..=stop as usize].iter().collect()
    }
}

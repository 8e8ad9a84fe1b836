//! Input abstractions shared by lexers, parsers, and the simulators.

use crate::interval::Interval;

/// Source name used when a stream was not built from a file.
pub const UNKNOWN_SOURCE_NAME: &str = "<unknown>";

/// A cursor over a sequence of integer symbols (code points or token types).
///
/// `la(1)` is the current symbol, `la(-1)` the previous one. Looking past
/// either end yields [`crate::token::EOF`]. `la(0)` is undefined and returns 0.
pub trait IntStream {
    /// Advances one symbol. Consuming at EOF leaves the stream unchanged.
    fn consume(&mut self);

    fn la(&mut self, i: isize) -> i32;

    /// Pins the buffer so `seek` back to any index after the mark is valid.
    fn mark(&mut self) -> isize;

    fn release(&mut self, marker: isize);

    fn index(&self) -> usize;

    fn seek(&mut self, index: usize);

    fn size(&self) -> usize;

    fn source_name(&self) -> &str {
        UNKNOWN_SOURCE_NAME
    }
}

/// Character input with text extraction by absolute index range.
pub trait CharStream: IntStream {
    /// Text of `[interval.a, interval.b]`, clamped to the input.
    fn text(&self, interval: Interval) -> String;
}

impl<T: IntStream + ?Sized> IntStream for &mut T {
    fn consume(&mut self) {
        (**self).consume()
    }
    fn la(&mut self, i: isize) -> i32 {
        (**self).la(i)
    }
    fn mark(&mut self) -> isize {
        (**self).mark()
    }
    fn release(&mut self, marker: isize) {
        (**self).release(marker)
    }
    fn index(&self) -> usize {
        (**self).index()
    }
    fn seek(&mut self, index: usize) {
        (**self).seek(index)
    }
    fn size(&self) -> usize {
        (**self).size()
    }
    fn source_name(&self) -> &str {
        (**self).source_name()
    }
}

impl<T: CharStream + ?Sized> CharStream for &mut T {
    fn text(&self, interval: Interval) -> String {
        (**self).text(interval)
    }
}

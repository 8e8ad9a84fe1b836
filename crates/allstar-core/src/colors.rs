//! ANSI color codes for dumps and traces.
//!
//! - Cyan: state numbers and DFA state ids
//! - Yellow: edge labels (tokens, characters, sets)
//! - Magenta: rule and decision names
//! - Red: errors and dead ends
//! - Dim: structural punctuation

/// Terminal palette. Every field is empty when colors are off, so callers can
/// interpolate unconditionally.
#[derive(Clone, Copy, Debug)]
pub struct Colors {
    pub cyan: &'static str,
    pub yellow: &'static str,
    pub magenta: &'static str,
    pub red: &'static str,
    pub dim: &'static str,
    pub reset: &'static str,
}

impl Default for Colors {
    fn default() -> Self {
        Self::OFF
    }
}

impl Colors {
    pub const ON: Self = Self {
        cyan: "\x1b[36m",
        yellow: "\x1b[33m",
        magenta: "\x1b[35m",
        red: "\x1b[31m",
        dim: "\x1b[2m",
        reset: "\x1b[0m",
    };

    pub const OFF: Self = Self {
        cyan: "",
        yellow: "",
        magenta: "",
        red: "",
        dim: "",
        reset: "",
    };

    pub fn new(enabled: bool) -> Self {
        if enabled { Self::ON } else { Self::OFF }
    }

    pub fn is_enabled(&self) -> bool {
        !self.reset.is_empty()
    }
}

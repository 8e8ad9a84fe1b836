//! Reserved token types, channels, and lexer constants.

/// End of input. Also the lookahead symbol past the last token.
pub const EOF: i32 = -1;

/// Pseudo token type used during lookahead computation for "may be empty".
pub const EPSILON: i32 = -2;

pub const INVALID_TYPE: i32 = 0;

pub const MIN_USER_TOKEN_TYPE: i32 = 1;

pub const DEFAULT_CHANNEL: i32 = 0;

pub const HIDDEN_CHANNEL: i32 = 1;

/// Lowest channel number free for grammar-defined channels.
pub const MIN_USER_CHANNEL_VALUE: i32 = 2;

pub const DEFAULT_MODE: usize = 0;

pub const MIN_CHAR_VALUE: i32 = 0;

pub const MAX_CHAR_VALUE: i32 = 0x10FFFF;

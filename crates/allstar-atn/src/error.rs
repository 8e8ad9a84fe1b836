use crate::serialized::FormatId;

/// Errors from reading, building, or verifying an ATN.
#[derive(Debug, thiserror::Error)]
pub enum AtnError {
    #[error("could not deserialize ATN with version {found} (expected {expected})")]
    UnsupportedVersion { found: i32, expected: i32 },

    #[error(
        "could not deserialize ATN with UUID {0} \
         (expected AADB8D7E-AEEF-4415-AD2B-8204D6CF042E or a legacy UUID)"
    )]
    UnsupportedUuid(FormatId),

    #[error("malformed UUID `{0}`")]
    MalformedUuid(String),

    #[error("invalid grammar type {0}")]
    InvalidGrammarType(i32),

    #[error("the specified state type {0} is not valid")]
    InvalidStateType(i32),

    #[error("the specified transition type {0} is not valid")]
    InvalidTransitionType(i32),

    #[error("the specified lexer action ({kind}, {a}, {b}) is not valid")]
    InvalidLexerAction { kind: i32, a: i32, b: i32 },

    #[error("serialized ATN truncated at word {offset}")]
    Truncated { offset: usize },

    #[error("{what} {index} out of range")]
    OutOfRange { what: &'static str, index: i64 },

    #[error("state {state} is not a {expected} state")]
    WrongStateKind { state: usize, expected: &'static str },

    #[error("illegal ATN state: {0}")]
    IllegalState(String),

    #[error("{0}")]
    Unsupported(String),

    #[error("invalid ATN JSON: {0}")]
    Json(#[from] serde_json::Error),
}

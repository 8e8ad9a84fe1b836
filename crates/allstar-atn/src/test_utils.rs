//! Serialized grammars shared by tests across the workspace.
//!
//! Each fixture is the JSON dictionary form of a small, hand-built ATN. The
//! grammar it encodes is given in the constant's doc comment.

use crate::atn::Atn;
use crate::deserializer::Deserializer;

/// Deserializes a fixture with default options, panicking on error.
pub fn load(json: &str) -> Atn {
    Deserializer::default()
        .from_json(json)
        .unwrap_or_else(|e| panic!("fixture failed to deserialize: {e}"))
}

/// `r : ('x' | 'x') EOF ;` with `X=1`. Decision 0 is ambiguous on `x`.
pub const AMBIGUOUS_PARSER: &str = r#"{
  "version": 3,
  "uuid": "AADB8D7E-AEEF-4415-AD2B-8204D6CF042E",
  "grammarType": 1,
  "maxTokenType": 1,
  "states": [
    {"ruleIndex": 0, "stateType": 2},
    {"ruleIndex": 0, "stateType": 7},
    {"ruleIndex": 0, "stateType": 3, "detailStateNumber": 5},
    {"ruleIndex": 0, "stateType": 1},
    {"ruleIndex": 0, "stateType": 1},
    {"ruleIndex": 0, "stateType": 8},
    {"ruleIndex": 0, "stateType": 1},
    {"ruleIndex": 0, "stateType": 1}
  ],
  "ruleToStartState": [{"stateNumber": 0}],
  "allTransitionsBuilder": [
    [{"src": 0, "trg": 2, "edgeType": 1}],
    [{"src": 2, "trg": 3, "edgeType": 1}, {"src": 2, "trg": 4, "edgeType": 1}],
    [{"src": 3, "trg": 5, "edgeType": 5, "arg1": 1}],
    [{"src": 4, "trg": 5, "edgeType": 5, "arg1": 1}],
    [{"src": 5, "trg": 6, "edgeType": 1}],
    [{"src": 6, "trg": 7, "edgeType": 5, "arg3": 1}],
    [{"src": 7, "trg": 1, "edgeType": 1}]
  ],
  "decisionToState": [2]
}"#;

/// Token vocabulary shared by [`HELLO_LEXER`] and [`HELLO_PARSER`].
pub const HELLO_TOKENS: &str = "T__0=1\nID=2\nWS=3\n'hello'=1\n";

/// ```text
/// T__0 : 'hello' ;
/// ID   : [a-z]+ ;
/// WS   : [ \t\r\n]+ -> skip ;
/// ```
pub const HELLO_LEXER: &str = r#"{
  "version": 3,
  "uuid": "AADB8D7E-AEEF-4415-AD2B-8204D6CF042E",
  "grammarType": 0,
  "maxTokenType": 3,
  "states": [
    {"stateType": 6},
    {"ruleIndex": 0, "stateType": 2},
    {"ruleIndex": 0, "stateType": 7},
    {"ruleIndex": 1, "stateType": 2},
    {"ruleIndex": 1, "stateType": 7},
    {"ruleIndex": 2, "stateType": 2},
    {"ruleIndex": 2, "stateType": 7},
    {"ruleIndex": 0, "stateType": 1},
    {"ruleIndex": 0, "stateType": 1},
    {"ruleIndex": 0, "stateType": 1},
    {"ruleIndex": 0, "stateType": 1},
    {"ruleIndex": 0, "stateType": 1},
    {"ruleIndex": 0, "stateType": 1},
    {"ruleIndex": 1, "stateType": 4, "detailStateNumber": 15},
    {"ruleIndex": 1, "stateType": 1},
    {"ruleIndex": 1, "stateType": 8},
    {"ruleIndex": 1, "stateType": 11},
    {"ruleIndex": 1, "stateType": 12, "detailStateNumber": 16},
    {"ruleIndex": 2, "stateType": 4, "detailStateNumber": 20},
    {"ruleIndex": 2, "stateType": 1},
    {"ruleIndex": 2, "stateType": 8},
    {"ruleIndex": 2, "stateType": 11},
    {"ruleIndex": 2, "stateType": 12, "detailStateNumber": 21},
    {"ruleIndex": 2, "stateType": 1}
  ],
  "ruleToStartState": [
    {"stateNumber": 1, "ruleToTokenType": 1},
    {"stateNumber": 3, "ruleToTokenType": 2},
    {"stateNumber": 5, "ruleToTokenType": 3}
  ],
  "modeToStartState": [0],
  "nsets": 1,
  "IntervalSet": [
    {"size": 3, "containsEof": 0, "Intervals": [{"a": 9, "b": 10}, {"a": 13, "b": 13}, {"a": 32, "b": 32}]}
  ],
  "allTransitionsBuilder": [
    [
      {"src": 0, "trg": 1, "edgeType": 1},
      {"src": 0, "trg": 3, "edgeType": 1},
      {"src": 0, "trg": 5, "edgeType": 1}
    ],
    [{"src": 1, "trg": 7, "edgeType": 1}],
    [{"src": 3, "trg": 13, "edgeType": 1}],
    [{"src": 5, "trg": 18, "edgeType": 1}],
    [{"src": 7, "trg": 8, "edgeType": 5, "arg1": 104}],
    [{"src": 8, "trg": 9, "edgeType": 5, "arg1": 101}],
    [{"src": 9, "trg": 10, "edgeType": 5, "arg1": 108}],
    [{"src": 10, "trg": 11, "edgeType": 5, "arg1": 108}],
    [{"src": 11, "trg": 12, "edgeType": 5, "arg1": 111}],
    [{"src": 12, "trg": 2, "edgeType": 1}],
    [{"src": 13, "trg": 14, "edgeType": 1}],
    [{"src": 14, "trg": 15, "edgeType": 2, "arg1": 97, "arg2": 122}],
    [{"src": 15, "trg": 16, "edgeType": 1}],
    [{"src": 16, "trg": 13, "edgeType": 1}, {"src": 16, "trg": 17, "edgeType": 1}],
    [{"src": 17, "trg": 4, "edgeType": 1}],
    [{"src": 18, "trg": 19, "edgeType": 1}],
    [{"src": 19, "trg": 20, "edgeType": 7, "arg1": 0}],
    [{"src": 20, "trg": 21, "edgeType": 1}],
    [{"src": 21, "trg": 18, "edgeType": 1}, {"src": 21, "trg": 22, "edgeType": 1}],
    [{"src": 22, "trg": 23, "edgeType": 1}],
    [{"src": 23, "trg": 6, "edgeType": 6, "arg1": 2, "arg2": 0}]
  ],
  "decisionToState": [0, 13, 16, 18, 21],
  "lexerActions": [{"actionType": 6}]
}"#;

/// `r : ( 'hello' ID ) ;` over [`HELLO_TOKENS`]. The block is decision 0.
pub const HELLO_PARSER: &str = r#"{
  "version": 3,
  "uuid": "AADB8D7E-AEEF-4415-AD2B-8204D6CF042E",
  "grammarType": 1,
  "maxTokenType": 3,
  "states": [
    {"ruleIndex": 0, "stateType": 2},
    {"ruleIndex": 0, "stateType": 7},
    {"ruleIndex": 0, "stateType": 3, "detailStateNumber": 5},
    {"ruleIndex": 0, "stateType": 1},
    {"ruleIndex": 0, "stateType": 1},
    {"ruleIndex": 0, "stateType": 8}
  ],
  "ruleToStartState": [{"stateNumber": 0}],
  "allTransitionsBuilder": [
    [{"src": 0, "trg": 2, "edgeType": 1}],
    [{"src": 2, "trg": 3, "edgeType": 1}],
    [{"src": 3, "trg": 4, "edgeType": 5, "arg1": 1}],
    [{"src": 4, "trg": 5, "edgeType": 5, "arg1": 2}],
    [{"src": 5, "trg": 1, "edgeType": 1}]
  ],
  "decisionToState": [2]
}"#;

/// Token vocabulary for [`EXPR_PARSER`].
pub const EXPR_TOKENS: &str = "MUL=1\nADD=2\nINT=3\n'*'=1\n'+'=2\n";

/// Left-recursive expression rule, already rewritten into its precedence
/// loop:
///
/// ```text
/// e : e '*' e
///   | e '+' e
///   | INT
///   ;
/// ```
///
/// Decision 0 is the precedence loop entry, decision 1 picks the operator.
pub const EXPR_PARSER: &str = r#"{
  "version": 3,
  "uuid": "AADB8D7E-AEEF-4415-AD2B-8204D6CF042E",
  "grammarType": 1,
  "maxTokenType": 3,
  "states": [
    {"ruleIndex": 0, "stateType": 2},
    {"ruleIndex": 0, "stateType": 7},
    {"ruleIndex": 0, "stateType": 1},
    {"ruleIndex": 0, "stateType": 1},
    {"ruleIndex": 0, "stateType": 10},
    {"ruleIndex": 0, "stateType": 5, "detailStateNumber": 11},
    {"ruleIndex": 0, "stateType": 1},
    {"ruleIndex": 0, "stateType": 1},
    {"ruleIndex": 0, "stateType": 1},
    {"ruleIndex": 0, "stateType": 1},
    {"ruleIndex": 0, "stateType": 1},
    {"ruleIndex": 0, "stateType": 8},
    {"ruleIndex": 0, "stateType": 12, "detailStateNumber": 14},
    {"ruleIndex": 0, "stateType": 1},
    {"ruleIndex": 0, "stateType": 9}
  ],
  "precedenceStates": [0],
  "ruleToStartState": [{"stateNumber": 0}],
  "allTransitionsBuilder": [
    [{"src": 0, "trg": 2, "edgeType": 1}],
    [{"src": 2, "trg": 3, "edgeType": 5, "arg1": 3}],
    [{"src": 3, "trg": 4, "edgeType": 1}],
    [{"src": 4, "trg": 5, "edgeType": 1}, {"src": 4, "trg": 12, "edgeType": 1}],
    [{"src": 5, "trg": 6, "edgeType": 1}, {"src": 5, "trg": 9, "edgeType": 1}],
    [{"src": 6, "trg": 7, "edgeType": 10, "arg1": 2}],
    [{"src": 7, "trg": 8, "edgeType": 5, "arg1": 1}],
    [{"src": 8, "trg": 11, "edgeType": 3, "arg1": 0, "arg2": 0, "arg3": 3}],
    [{"src": 9, "trg": 10, "edgeType": 10, "arg1": 1}],
    [{"src": 10, "trg": 13, "edgeType": 5, "arg1": 2}],
    [{"src": 11, "trg": 14, "edgeType": 1}],
    [{"src": 12, "trg": 1, "edgeType": 1}],
    [{"src": 13, "trg": 11, "edgeType": 3, "arg1": 0, "arg2": 0, "arg3": 2}],
    [{"src": 14, "trg": 4, "edgeType": 1}]
  ],
  "decisionToState": [4, 5]
}"#;

/// [`EXPR_PARSER`]'s expression rule called from a start rule that ends
/// in EOF, over [`EXPR_TOKENS`]:
///
/// ```text
/// s : e EOF ;
/// e : e '*' e
///   | e '+' e
///   | INT
///   ;
/// ```
///
/// Decision 0 is the precedence loop entry of `e`, decision 1 picks the
/// operator.
pub const CALC_PARSER: &str = r#"{
  "version": 3,
  "uuid": "AADB8D7E-AEEF-4415-AD2B-8204D6CF042E",
  "grammarType": 1,
  "maxTokenType": 3,
  "states": [
    {"ruleIndex": 0, "stateType": 2},
    {"ruleIndex": 0, "stateType": 7},
    {"ruleIndex": 1, "stateType": 2},
    {"ruleIndex": 1, "stateType": 7},
    {"ruleIndex": 0, "stateType": 1},
    {"ruleIndex": 0, "stateType": 1},
    {"ruleIndex": 0, "stateType": 1},
    {"ruleIndex": 1, "stateType": 1},
    {"ruleIndex": 1, "stateType": 1},
    {"ruleIndex": 1, "stateType": 10},
    {"ruleIndex": 1, "stateType": 5, "detailStateNumber": 16},
    {"ruleIndex": 1, "stateType": 1},
    {"ruleIndex": 1, "stateType": 1},
    {"ruleIndex": 1, "stateType": 1},
    {"ruleIndex": 1, "stateType": 1},
    {"ruleIndex": 1, "stateType": 1},
    {"ruleIndex": 1, "stateType": 8},
    {"ruleIndex": 1, "stateType": 12, "detailStateNumber": 19},
    {"ruleIndex": 1, "stateType": 1},
    {"ruleIndex": 1, "stateType": 9}
  ],
  "precedenceStates": [2],
  "ruleToStartState": [{"stateNumber": 0}, {"stateNumber": 2}],
  "allTransitionsBuilder": [
    [{"src": 0, "trg": 4, "edgeType": 1}],
    [{"src": 2, "trg": 7, "edgeType": 1}],
    [{"src": 4, "trg": 5, "edgeType": 3, "arg1": 2, "arg2": 1, "arg3": 0}],
    [{"src": 5, "trg": 6, "edgeType": 5, "arg3": 1}],
    [{"src": 6, "trg": 1, "edgeType": 1}],
    [{"src": 7, "trg": 8, "edgeType": 5, "arg1": 3}],
    [{"src": 8, "trg": 9, "edgeType": 1}],
    [{"src": 9, "trg": 10, "edgeType": 1}, {"src": 9, "trg": 17, "edgeType": 1}],
    [{"src": 10, "trg": 11, "edgeType": 1}, {"src": 10, "trg": 14, "edgeType": 1}],
    [{"src": 11, "trg": 12, "edgeType": 10, "arg1": 2}],
    [{"src": 12, "trg": 13, "edgeType": 5, "arg1": 1}],
    [{"src": 13, "trg": 16, "edgeType": 3, "arg1": 2, "arg2": 1, "arg3": 3}],
    [{"src": 14, "trg": 15, "edgeType": 10, "arg1": 1}],
    [{"src": 15, "trg": 18, "edgeType": 5, "arg1": 2}],
    [{"src": 16, "trg": 19, "edgeType": 1}],
    [{"src": 17, "trg": 3, "edgeType": 1}],
    [{"src": 18, "trg": 16, "edgeType": 3, "arg1": 2, "arg2": 1, "arg3": 2}],
    [{"src": 19, "trg": 9, "edgeType": 1}]
  ],
  "decisionToState": [9, 10]
}"#;

/// Token vocabulary for [`MODES_LEXER`].
pub const MODES_TOKENS: &str = "STRING=1\nID=2\nWS=3\nQUOTE_OPEN=4\nTEXT=5\n";

/// Two-mode lexer exercising `more`, mode stack, and channel commands:
///
/// ```text
/// QUOTE_OPEN : '"' -> more, pushMode(STR) ;
/// ID         : [a-z]+ ;
/// WS         : ' ' -> channel(HIDDEN) ;
/// mode STR;
/// STRING     : '"' -> popMode ;
/// TEXT       : [a-z ] -> more ;
/// ```
pub const MODES_LEXER: &str = r#"{
  "version": 3,
  "uuid": "AADB8D7E-AEEF-4415-AD2B-8204D6CF042E",
  "grammarType": 0,
  "maxTokenType": 5,
  "states": [
    {"stateType": 6},
    {"stateType": 6},
    {"ruleIndex": 0, "stateType": 2},
    {"ruleIndex": 0, "stateType": 7},
    {"ruleIndex": 1, "stateType": 2},
    {"ruleIndex": 1, "stateType": 7},
    {"ruleIndex": 2, "stateType": 2},
    {"ruleIndex": 2, "stateType": 7},
    {"ruleIndex": 3, "stateType": 2},
    {"ruleIndex": 3, "stateType": 7},
    {"ruleIndex": 4, "stateType": 2},
    {"ruleIndex": 4, "stateType": 7},
    {"ruleIndex": 0, "stateType": 1},
    {"ruleIndex": 0, "stateType": 1},
    {"ruleIndex": 0, "stateType": 1},
    {"ruleIndex": 1, "stateType": 4, "detailStateNumber": 17},
    {"ruleIndex": 1, "stateType": 1},
    {"ruleIndex": 1, "stateType": 8},
    {"ruleIndex": 1, "stateType": 11},
    {"ruleIndex": 1, "stateType": 12, "detailStateNumber": 18},
    {"ruleIndex": 2, "stateType": 1},
    {"ruleIndex": 2, "stateType": 1},
    {"ruleIndex": 3, "stateType": 1},
    {"ruleIndex": 3, "stateType": 1},
    {"ruleIndex": 4, "stateType": 1},
    {"ruleIndex": 4, "stateType": 1}
  ],
  "ruleToStartState": [
    {"stateNumber": 2, "ruleToTokenType": 4},
    {"stateNumber": 4, "ruleToTokenType": 2},
    {"stateNumber": 6, "ruleToTokenType": 3},
    {"stateNumber": 8, "ruleToTokenType": 1},
    {"stateNumber": 10, "ruleToTokenType": 5}
  ],
  "modeToStartState": [0, 1],
  "nsets": 1,
  "IntervalSet": [
    {"size": 2, "containsEof": 0, "Intervals": [{"a": 32, "b": 32}, {"a": 97, "b": 122}]}
  ],
  "allTransitionsBuilder": [
    [
      {"src": 0, "trg": 2, "edgeType": 1},
      {"src": 0, "trg": 4, "edgeType": 1},
      {"src": 0, "trg": 6, "edgeType": 1}
    ],
    [{"src": 1, "trg": 8, "edgeType": 1}, {"src": 1, "trg": 10, "edgeType": 1}],
    [{"src": 2, "trg": 12, "edgeType": 1}],
    [{"src": 4, "trg": 15, "edgeType": 1}],
    [{"src": 6, "trg": 20, "edgeType": 1}],
    [{"src": 8, "trg": 22, "edgeType": 1}],
    [{"src": 10, "trg": 24, "edgeType": 1}],
    [{"src": 12, "trg": 13, "edgeType": 5, "arg1": 34}],
    [{"src": 13, "trg": 14, "edgeType": 6, "arg1": 0, "arg2": 0}],
    [{"src": 14, "trg": 3, "edgeType": 6, "arg1": 0, "arg2": 1}],
    [{"src": 15, "trg": 16, "edgeType": 1}],
    [{"src": 16, "trg": 17, "edgeType": 2, "arg1": 97, "arg2": 122}],
    [{"src": 17, "trg": 18, "edgeType": 1}],
    [{"src": 18, "trg": 15, "edgeType": 1}, {"src": 18, "trg": 19, "edgeType": 1}],
    [{"src": 19, "trg": 5, "edgeType": 1}],
    [{"src": 20, "trg": 21, "edgeType": 5, "arg1": 32}],
    [{"src": 21, "trg": 7, "edgeType": 6, "arg1": 2, "arg2": 2}],
    [{"src": 22, "trg": 23, "edgeType": 5, "arg1": 34}],
    [{"src": 23, "trg": 9, "edgeType": 6, "arg1": 3, "arg2": 3}],
    [{"src": 24, "trg": 25, "edgeType": 7, "arg1": 0}],
    [{"src": 25, "trg": 11, "edgeType": 6, "arg1": 4, "arg2": 0}]
  ],
  "decisionToState": [0, 1, 15, 18],
  "lexerActions": [
    {"actionType": 3},
    {"actionType": 5, "a": 1},
    {"actionType": 0, "a": 1},
    {"actionType": 4}
  ]
}"#;

//! Serialized ATN forms.
//!
//! Two encodings describe the same content:
//! - **JSON dictionary**: field-for-field mapping of [`SerializedAtn`].
//! - **Char-packed**: a flat `u16` word stream (see [`packed`]).
//!
//! Both decode into [`SerializedAtn`]; building the [`crate::Atn`] from it is
//! a single pass shared by both.

pub mod packed;

use std::fmt;
use std::str::FromStr;

use allstar_core::Interval;
use serde::{Deserialize, Serialize};

use crate::error::AtnError;

/// Serialization format version.
pub const SERIALIZED_VERSION: i32 = 3;

/// 128-bit format identifier (a UUID). Each supported id marks the point at
/// which a serialization feature appeared.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FormatId(pub u128);

impl FormatId {
    /// Earliest supported format.
    pub const BASE: FormatId = FormatId(0x33761B2D_78BB_4A43_8B0B_4F5BEE8AACF3);
    /// Adds precedence predicates and the precedence-rule state list.
    pub const ADDED_PRECEDENCE_TRANSITIONS: FormatId =
        FormatId(0x1DA0C57D_6C06_438A_9B27_10BCB3CE0F61);
    /// Adds the serialized lexer action table.
    pub const ADDED_LEXER_ACTIONS: FormatId = FormatId(0xAADB8D7E_AEEF_4415_AD2B_8204D6CF042E);
    pub const CURRENT: FormatId = Self::ADDED_LEXER_ACTIONS;

    /// Supported ids, oldest first.
    pub const SUPPORTED: [FormatId; 3] = [
        Self::BASE,
        Self::ADDED_PRECEDENCE_TRANSITIONS,
        Self::ADDED_LEXER_ACTIONS,
    ];

    pub fn is_supported(self) -> bool {
        Self::SUPPORTED.contains(&self)
    }

    /// Does a file written with `self` include `feature`?
    pub fn supports(self, feature: FormatId) -> bool {
        let position = |id: FormatId| Self::SUPPORTED.iter().position(|s| *s == id);
        match (position(self), position(feature)) {
            (Some(actual), Some(needed)) => actual >= needed,
            _ => false,
        }
    }

    /// Decodes eight words, least significant first.
    pub fn from_words(words: [u16; 8]) -> FormatId {
        let value = words
            .iter()
            .enumerate()
            .fold(0u128, |acc, (i, w)| acc | (u128::from(*w) << (16 * i)));
        FormatId(value)
    }

    pub fn to_words(self) -> [u16; 8] {
        std::array::from_fn(|i| (self.0 >> (16 * i)) as u16)
    }
}

impl fmt::Display for FormatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = self.0;
        write!(
            f,
            "{:08X}-{:04X}-{:04X}-{:04X}-{:012X}",
            (v >> 96) as u32,
            (v >> 80) as u16,
            (v >> 64) as u16,
            (v >> 48) as u16,
            v & 0xFFFF_FFFF_FFFF
        )
    }
}

impl FromStr for FormatId {
    type Err = AtnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || AtnError::MalformedUuid(s.to_string());
        let groups: Vec<&str> = s.split('-').collect();
        let lengths: Vec<usize> = groups.iter().map(|g| g.len()).collect();
        if lengths != [8, 4, 4, 4, 12] {
            return Err(malformed());
        }
        let hex: String = groups.concat();
        u128::from_str_radix(&hex, 16)
            .map(FormatId)
            .map_err(|_| malformed())
    }
}

/// The dictionary form of a serialized ATN.
///
/// Integers are kept signed: `-1` marks absent values (no rule index, EOF
/// token type, no action index).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedAtn {
    pub version: i32,
    pub uuid: String,
    pub grammar_type: i32,
    pub max_token_type: i32,
    pub states: Vec<SerializedState>,
    #[serde(default)]
    pub non_greedy_states: Vec<i32>,
    #[serde(default)]
    pub precedence_states: Vec<i32>,
    pub rule_to_start_state: Vec<SerializedRule>,
    #[serde(default)]
    pub mode_to_start_state: Vec<i32>,
    #[serde(default)]
    pub nsets: usize,
    #[serde(rename = "IntervalSet", default)]
    pub interval_sets: Vec<SerializedSet>,
    #[serde(default)]
    pub all_transitions_builder: Vec<Vec<SerializedEdge>>,
    #[serde(default)]
    pub decision_to_state: Vec<i32>,
    #[serde(default)]
    pub lexer_actions: Vec<SerializedLexerAction>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedState {
    #[serde(default = "absent")]
    pub rule_index: i32,
    pub state_type: i32,
    /// End state for block starts, loop-back state for loop ends.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail_state_number: Option<i32>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedRule {
    pub state_number: i32,
    /// Lexer rules only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_to_token_type: Option<i32>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedSet {
    pub size: usize,
    /// `1` when EOF is a member; EOF is not listed among the intervals.
    pub contains_eof: i32,
    #[serde(rename = "Intervals")]
    pub intervals: Vec<Interval>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedEdge {
    pub src: i32,
    pub trg: i32,
    pub edge_type: i32,
    #[serde(default)]
    pub arg1: i32,
    #[serde(default)]
    pub arg2: i32,
    #[serde(default)]
    pub arg3: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedLexerAction {
    pub action_type: i32,
    #[serde(default)]
    pub a: i32,
    #[serde(default)]
    pub b: i32,
}

fn absent() -> i32 {
    -1
}

impl SerializedAtn {
    pub fn from_json(json: &str) -> Result<Self, AtnError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, AtnError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn format_id(&self) -> Result<FormatId, AtnError> {
        self.uuid.parse()
    }

    /// All edges in source order.
    pub fn edges(&self) -> impl Iterator<Item = &SerializedEdge> {
        self.all_transitions_builder.iter().flatten()
    }
}

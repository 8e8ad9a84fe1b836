//! Token type names: literal (`'+'`), symbolic (`PLUS`), and display forms.

use crate::token;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VocabularyError {
    #[error("line {line}: expected `NAME=TYPE`, found `{text}`")]
    Malformed { line: usize, text: String },
    #[error("line {line}: invalid token type `{text}`")]
    InvalidTokenType { line: usize, text: String },
}

/// Maps token types to the names a grammar gave them.
///
/// Literal names keep their quotes (`'+'`), matching the `.tokens` file format.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    literal_names: Vec<Option<String>>,
    symbolic_names: Vec<Option<String>>,
    display_names: Vec<Option<String>>,
    max_token_type: i32,
}

impl Vocabulary {
    pub fn new(literal_names: Vec<Option<String>>, symbolic_names: Vec<Option<String>>) -> Self {
        Self::with_display_names(literal_names, symbolic_names, Vec::new())
    }

    pub fn with_display_names(
        literal_names: Vec<Option<String>>,
        symbolic_names: Vec<Option<String>>,
        display_names: Vec<Option<String>>,
    ) -> Self {
        let longest = literal_names
            .len()
            .max(symbolic_names.len())
            .max(display_names.len());
        Self {
            literal_names,
            symbolic_names,
            display_names,
            max_token_type: longest as i32 - 1,
        }
    }

    /// Builds a vocabulary from legacy token-name tables, where a quoted name is
    /// a literal and anything else is symbolic.
    pub fn from_token_names(names: &[&str]) -> Self {
        let mut literal = vec![None; names.len()];
        let mut symbolic = vec![None; names.len()];
        for (t, name) in names.iter().enumerate() {
            if name.is_empty() {
                continue;
            }
            if name.starts_with('\'') {
                literal[t] = Some((*name).to_string());
            } else if name.chars().next().is_some_and(char::is_uppercase) {
                symbolic[t] = Some((*name).to_string());
            }
        }
        Self::with_display_names(
            literal,
            symbolic,
            names.iter().map(|n| Some((*n).to_string())).collect(),
        )
    }

    /// Parses the `.tokens` format: one `NAME=TYPE` or `'literal'=TYPE` per line.
    ///
    /// Blank lines are skipped. The split is on the last `=`, so `'='=4` works.
    pub fn from_tokens_file(src: &str) -> Result<Self, VocabularyError> {
        let mut literal: Vec<Option<String>> = Vec::new();
        let mut symbolic: Vec<Option<String>> = Vec::new();

        for (idx, raw) in src.lines().enumerate() {
            let line = idx + 1;
            let text = raw.trim();
            if text.is_empty() {
                continue;
            }
            let Some((name, ty)) = text.rsplit_once('=') else {
                return Err(VocabularyError::Malformed {
                    line,
                    text: text.to_string(),
                });
            };
            if name.is_empty() {
                return Err(VocabularyError::Malformed {
                    line,
                    text: text.to_string(),
                });
            }
            let ty: usize = ty
                .trim()
                .parse()
                .map_err(|_| VocabularyError::InvalidTokenType {
                    line,
                    text: ty.to_string(),
                })?;

            let table = if name.starts_with('\'') {
                &mut literal
            } else {
                &mut symbolic
            };
            if table.len() <= ty {
                table.resize(ty + 1, None);
            }
            table[ty] = Some(name.to_string());
        }

        Ok(Self::new(literal, symbolic))
    }

    pub fn max_token_type(&self) -> i32 {
        self.max_token_type
    }

    pub fn literal_name(&self, token_type: i32) -> Option<&str> {
        lookup(&self.literal_names, token_type)
    }

    pub fn symbolic_name(&self, token_type: i32) -> Option<&str> {
        if token_type == token::EOF {
            return Some("EOF");
        }
        lookup(&self.symbolic_names, token_type)
    }

    /// Best human-readable name: display, then literal, then symbolic, then the number.
    pub fn display_name(&self, token_type: i32) -> String {
        lookup(&self.display_names, token_type)
            .or_else(|| self.literal_name(token_type))
            .or_else(|| self.symbolic_name(token_type))
            .map(str::to_string)
            .unwrap_or_else(|| token_type.to_string())
    }

    /// Reverse lookup by symbolic or literal name.
    pub fn token_type(&self, name: &str) -> Option<i32> {
        if name == "EOF" {
            return Some(token::EOF);
        }
        let find = |table: &[Option<String>]| {
            table
                .iter()
                .position(|n| n.as_deref() == Some(name))
                .map(|t| t as i32)
        };
        find(&self.symbolic_names).or_else(|| find(&self.literal_names))
    }
}

fn lookup(table: &[Option<String>], token_type: i32) -> Option<&str> {
    let idx = usize::try_from(token_type).ok()?;
    table.get(idx)?.as_deref()
}

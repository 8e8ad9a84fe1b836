//! Reading serialized ATNs, `.tokens` files, and input text.
//!
//! An ATN file is either the JSON dictionary (first non-blank character is
//! `{`) or the char-packed words written as decimal integers separated by
//! commas or whitespace, optionally wrapped in `[` `]`.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use allstar_atn::serialized::packed;
use allstar_atn::{AtnError, SerializedAtn};
use allstar_core::{Vocabulary, VocabularyError};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read '{}': {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to read stdin: {0}")]
    Stdin(io::Error),

    #[error("'{path}': invalid packed word `{word}`")]
    InvalidWord { path: String, word: String },

    #[error("'{path}': {source}")]
    Atn { path: String, source: AtnError },

    #[error("'{path}': {source}")]
    Vocabulary { path: String, source: VocabularyError },

    #[error("{0}")]
    Missing(&'static str),
}

/// The two encodings an ATN file can use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AtnFormat {
    Json,
    Packed,
}

impl AtnFormat {
    pub fn detect(text: &str) -> Self {
        match text.trim_start().chars().next() {
            Some('{') => AtnFormat::Json,
            _ => AtnFormat::Packed,
        }
    }
}

pub fn load_atn(path: &Path) -> Result<SerializedAtn, LoadError> {
    let text = read_path(path)?;
    let name = path.to_string_lossy();
    parse_atn(&name, &text)
}

pub fn parse_atn(name: &str, text: &str) -> Result<SerializedAtn, LoadError> {
    let atn_error = |source| LoadError::Atn {
        path: name.to_string(),
        source,
    };
    match AtnFormat::detect(text) {
        AtnFormat::Json => SerializedAtn::from_json(text).map_err(atn_error),
        AtnFormat::Packed => {
            let words = parse_words(name, text)?;
            packed::decode(&words).map_err(atn_error)
        }
    }
}

/// Renders packed words the way [`parse_atn`] reads them, sixteen per line.
pub fn format_words(words: &[u16]) -> String {
    let lines: Vec<String> = words
        .chunks(16)
        .map(|chunk| {
            chunk
                .iter()
                .map(u16::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        })
        .collect();
    format!("[\n  {}\n]\n", lines.join(",\n  "))
}

fn parse_words(name: &str, text: &str) -> Result<Vec<u16>, LoadError> {
    let body = text.trim();
    let body = body.strip_prefix('[').unwrap_or(body);
    let body = body.strip_suffix(']').unwrap_or(body);
    body.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(|w| {
            w.parse::<u16>().map_err(|_| LoadError::InvalidWord {
                path: name.to_string(),
                word: w.to_string(),
            })
        })
        .collect()
}

pub fn load_vocabulary(path: &Path) -> Result<Vocabulary, LoadError> {
    let text = read_path(path)?;
    Vocabulary::from_tokens_file(&text).map_err(|source| LoadError::Vocabulary {
        path: path.to_string_lossy().into_owned(),
        source,
    })
}

/// Input to recognize: inline text wins over a path; `-` reads stdin.
///
/// Returns the text and its source name.
pub fn load_input(
    input_path: Option<&Path>,
    input_text: Option<&str>,
) -> Result<(String, String), LoadError> {
    if let Some(text) = input_text {
        return Ok((text.to_string(), "<inline>".to_string()));
    }
    let Some(path) = input_path else {
        return Err(LoadError::Missing(
            "input is required: use a positional argument or -s/--source",
        ));
    };
    let text = read_path(path)?;
    let name = if path.as_os_str() == "-" {
        "<stdin>".to_string()
    } else {
        path.to_string_lossy().into_owned()
    };
    Ok((text, name))
}

fn read_path(path: &Path) -> Result<String, LoadError> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(LoadError::Stdin)?;
        return Ok(buf);
    }
    fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })
}

//! Re-encode a serialized ATN.

use std::fs;
use std::path::PathBuf;

use allstar_atn::serialized::packed;
use allstar_atn::{AtnError, DeserializationOptions, Deserializer, serialize};

use super::atn_loader::{self, AtnFormat, LoadError};
use super::run_common;

pub struct ConvertArgs {
    pub atn_path: PathBuf,
    pub to: AtnFormat,
    pub output: Option<PathBuf>,
    pub verify: bool,
}

pub fn run(args: ConvertArgs) {
    let text = match convert(&args) {
        Ok(text) => text,
        Err(e) => run_common::fail(e),
    };
    match &args.output {
        Some(path) => {
            if let Err(e) = fs::write(path, text) {
                run_common::fail(format!("failed to write '{}': {}", path.display(), e));
            }
        }
        None => print!("{}", text),
    }
}

/// Decodes the file, rebuilds the ATN, and writes it back in `args.to`.
///
/// Going through the ATN normalizes the output: legacy format ids become the
/// current one and derived edges are dropped.
pub fn convert(args: &ConvertArgs) -> Result<String, LoadError> {
    let loaded = atn_loader::load_atn(&args.atn_path)?;
    let atn_error = |source: AtnError| LoadError::Atn {
        path: args.atn_path.to_string_lossy().into_owned(),
        source,
    };
    let atn = Deserializer::new(DeserializationOptions::default().with_verify(args.verify))
        .deserialize(&loaded)
        .map_err(atn_error)?;
    let data = serialize(&atn);
    match args.to {
        AtnFormat::Json => {
            let mut json = data.to_json().map_err(atn_error)?;
            json.push('\n');
            Ok(json)
        }
        AtnFormat::Packed => {
            let words = packed::encode(&data).map_err(atn_error)?;
            Ok(atn_loader::format_words(&words))
        }
    }
}

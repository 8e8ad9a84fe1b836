use std::path::PathBuf;

use allstar_atn::{DeserializationOptions, dump};
use allstar_core::{Colors, Vocabulary};

use super::run_common::{self, RunError};

pub struct DumpArgs {
    pub atn_path: PathBuf,
    pub verify: bool,
    pub bypass: bool,
    pub color: bool,
}

pub fn run(args: DumpArgs) {
    match render(&args) {
        Ok(out) => print!("{}", out),
        Err(e) => run_common::fail(e),
    }
}

pub fn render(args: &DumpArgs) -> Result<String, RunError> {
    let options = DeserializationOptions::default()
        .with_verify(args.verify)
        .with_rule_bypass_transitions(args.bypass);
    let grammar = run_common::load_grammar(&args.atn_path, Vocabulary::default(), options)?;
    Ok(dump(grammar.atn(), Colors::new(args.color)))
}

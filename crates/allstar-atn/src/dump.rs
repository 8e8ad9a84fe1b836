//! Human-readable ATN dump for debugging.

use std::fmt::Write as _;

use allstar_core::Colors;

use crate::atn::{Atn, GrammarType};
use crate::state::{AtnState, BlockKind, StateKind};
use crate::transition::Transition;

/// Generate a human-readable dump of the ATN.
pub fn dump(atn: &Atn, colors: Colors) -> String {
    let mut out = String::new();
    dump_header(&mut out, atn, &colors);
    dump_rules(&mut out, atn, &colors);
    if atn.grammar_type == GrammarType::Lexer {
        dump_modes(&mut out, atn, &colors);
    }
    dump_decisions(&mut out, atn, &colors);
    dump_states(&mut out, atn, &colors);
    if !atn.lexer_actions.is_empty() {
        dump_lexer_actions(&mut out, atn, &colors);
    }
    out
}

fn dump_header(out: &mut String, atn: &Atn, c: &Colors) {
    let grammar = match atn.grammar_type {
        GrammarType::Lexer => "lexer",
        GrammarType::Parser => "parser",
    };
    writeln!(out, "{}[atn]{}", c.dim, c.reset).unwrap();
    writeln!(out, "grammar {grammar}").unwrap();
    writeln!(out, "max_token_type {}", atn.max_token_type).unwrap();
    out.push('\n');
}

fn dump_rules(out: &mut String, atn: &Atn, c: &Colors) {
    writeln!(out, "{}[rules]{}", c.dim, c.reset).unwrap();
    for (rule, &start) in atn.rule_to_start_state.iter().enumerate() {
        let stop = atn.rule_to_stop_state.get(rule).copied();
        write!(out, "{}r{rule}{} ", c.magenta, c.reset).unwrap();
        write!(out, "{}S{start}{}", c.cyan, c.reset).unwrap();
        if let Some(stop) = stop {
            write!(out, "..{}S{stop}{}", c.cyan, c.reset).unwrap();
        }
        if let Some(token_type) = atn.rule_to_token_type.get(rule) {
            write!(out, " => {}{token_type}{}", c.yellow, c.reset).unwrap();
        }
        if atn.is_precedence_rule(rule) {
            write!(out, " {}precedence{}", c.dim, c.reset).unwrap();
        }
        out.push('\n');
    }
    out.push('\n');
}

fn dump_modes(out: &mut String, atn: &Atn, c: &Colors) {
    writeln!(out, "{}[modes]{}", c.dim, c.reset).unwrap();
    for (mode, &start) in atn.mode_to_start_state.iter().enumerate() {
        writeln!(out, "m{mode} {}S{start}{}", c.cyan, c.reset).unwrap();
    }
    out.push('\n');
}

fn dump_decisions(out: &mut String, atn: &Atn, c: &Colors) {
    writeln!(out, "{}[decisions]{}", c.dim, c.reset).unwrap();
    for (decision, &state) in atn.decision_to_state.iter().enumerate() {
        writeln!(
            out,
            "{}d{decision}{} {}S{state}{}",
            c.magenta, c.reset, c.cyan, c.reset
        )
        .unwrap();
    }
    out.push('\n');
}

fn dump_states(out: &mut String, atn: &Atn, c: &Colors) {
    writeln!(out, "{}[states]{}", c.dim, c.reset).unwrap();
    for (number, slot) in atn.slots().iter().enumerate() {
        let Some(state) = slot else {
            writeln!(out, "{}S{number}{} {}-{}", c.cyan, c.reset, c.dim, c.reset).unwrap();
            continue;
        };
        dump_state(out, atn, state, c);
    }
}

fn dump_state(out: &mut String, atn: &Atn, state: &AtnState, c: &Colors) {
    write!(out, "{}S{}{} {}", c.cyan, state.number, c.reset, state.kind.name()).unwrap();
    if let Some(rule) = state.rule_index {
        write!(out, " {}r{rule}{}", c.magenta, c.reset).unwrap();
    }
    if let Some(decision) = state.decision {
        write!(out, " {}d{decision}{}", c.magenta, c.reset).unwrap();
    }
    if state.non_greedy {
        write!(out, " non-greedy").unwrap();
    }
    for (name, link) in links(&state.kind) {
        if let Some(target) = link {
            write!(out, " {}{name}={}{}S{target}{}", c.dim, c.reset, c.cyan, c.reset).unwrap();
        }
    }
    if state.is_precedence_decision() {
        write!(out, " {}precedence{}", c.dim, c.reset).unwrap();
    }
    out.push('\n');

    for t in state.transitions() {
        writeln!(
            out,
            "    {}{}{} -> {}S{}{}",
            c.yellow,
            edge_label(atn, t),
            c.reset,
            c.cyan,
            t.target,
            c.reset
        )
        .unwrap();
    }
}

fn links(kind: &StateKind) -> Vec<(&'static str, Option<usize>)> {
    match *kind {
        StateKind::RuleStart { stop_state, .. } => vec![("stop", stop_state)],
        StateKind::BlockStart {
            kind: BlockKind::Plus { loop_back },
            end_state,
        } => vec![("end", end_state), ("loop", loop_back)],
        StateKind::BlockStart { end_state, .. } => vec![("end", end_state)],
        StateKind::BlockEnd { start_state } => vec![("start", start_state)],
        StateKind::StarLoopEntry { loop_back, .. } | StateKind::LoopEnd { loop_back } => {
            vec![("loop", loop_back)]
        }
        _ => Vec::new(),
    }
}

fn edge_label(atn: &Atn, t: &Transition) -> String {
    match atn.grammar_type {
        GrammarType::Lexer => t.char_label(),
        GrammarType::Parser => t.to_string(),
    }
}

fn dump_lexer_actions(out: &mut String, atn: &Atn, c: &Colors) {
    out.push('\n');
    writeln!(out, "{}[lexer_actions]{}", c.dim, c.reset).unwrap();
    for (i, action) in atn.lexer_actions.iter().enumerate() {
        writeln!(out, "a{i} {action}").unwrap();
    }
}

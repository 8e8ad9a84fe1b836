use std::sync::Arc;

use allstar_atn::test_utils::{HELLO_LEXER, HELLO_TOKENS, MODES_LEXER, load};
use allstar_core::{IntStream, Vocabulary, token};

use crate::dfa::DfaCache;
use crate::error::PredictionError;
use crate::lexer_sim::LexerAtnSimulator;
use crate::test_utils::{RecordingLexer, Symbols};
use crate::trace::{NoopTracer, PrintTracer};

fn simulator(json: &str) -> LexerAtnSimulator {
    let atn = load(json);
    let dfa = Arc::new(DfaCache::for_lexer(&atn));
    LexerAtnSimulator::new(Arc::new(atn), dfa)
}

/// Token types of every match until EOF, in mode 0.
fn lex_all(sim: &mut LexerAtnSimulator, text: &str) -> Vec<i32> {
    let mut input = Symbols::chars(text);
    let mut host = RecordingLexer::default();
    let mut types = Vec::new();
    loop {
        let ttype = sim.match_token(&mut input, 0, &mut host, &mut NoopTracer).unwrap();
        types.push(ttype);
        if ttype == token::EOF {
            return types;
        }
    }
}

#[test]
fn earlier_rule_wins_equal_length() {
    let mut sim = simulator(HELLO_LEXER);
    let mut input = Symbols::chars("hello world");
    let mut host = RecordingLexer::default();

    assert_eq!(sim.match_token(&mut input, 0, &mut host, &mut NoopTracer), Ok(1));
    assert_eq!(input.index(), 5);
    assert_eq!(sim.start_index(), 0);
    assert_eq!(sim.text(&input), "hello");
    assert!(host.events.is_empty());
}

#[test]
fn longest_match_wins() {
    let mut sim = simulator(HELLO_LEXER);
    let mut input = Symbols::chars("helloo");
    let mut host = RecordingLexer::default();

    assert_eq!(sim.match_token(&mut input, 0, &mut host, &mut NoopTracer), Ok(2));
    assert_eq!(input.index(), 6);
}

#[test]
fn skip_action_runs_after_match() {
    let mut sim = simulator(HELLO_LEXER);
    let mut input = Symbols::chars("hello world");
    let mut host = RecordingLexer::default();

    sim.match_token(&mut input, 0, &mut host, &mut NoopTracer).unwrap();
    assert_eq!(sim.match_token(&mut input, 0, &mut host, &mut NoopTracer), Ok(3));
    assert_eq!(host.events, vec!["skip"]);
    assert_eq!(sim.match_token(&mut input, 0, &mut host, &mut NoopTracer), Ok(2));
    assert_eq!(sim.text(&input), "world");
}

#[test]
fn eof_after_last_token() {
    let mut sim = simulator(HELLO_LEXER);

    assert_eq!(lex_all(&mut sim, "hello world"), vec![1, 3, 2, token::EOF]);
    assert_eq!(lex_all(&mut sim, ""), vec![token::EOF]);
}

#[test]
fn tracks_line_and_column() {
    let mut sim = simulator(HELLO_LEXER);
    let mut input = Symbols::chars("hello\n  ab");
    let mut host = RecordingLexer::default();

    sim.match_token(&mut input, 0, &mut host, &mut NoopTracer).unwrap();
    assert_eq!((sim.line, sim.column), (1, 5));

    sim.match_token(&mut input, 0, &mut host, &mut NoopTracer).unwrap();
    assert_eq!((sim.line, sim.column), (2, 2));

    sim.match_token(&mut input, 0, &mut host, &mut NoopTracer).unwrap();
    assert_eq!((sim.line, sim.column), (2, 4));
}

#[test]
fn unmatched_character_is_an_error() {
    let mut sim = simulator(HELLO_LEXER);
    let mut input = Symbols::chars("Hello");
    let mut host = RecordingLexer::default();

    assert_eq!(
        sim.match_token(&mut input, 0, &mut host, &mut NoopTracer),
        Err(PredictionError::LexerNoViableAlt {
            mode: 0,
            start_index: 0,
        })
    );
}

#[test]
fn unknown_mode() {
    let mut sim = simulator(HELLO_LEXER);
    let mut input = Symbols::chars("hello");
    let mut host = RecordingLexer::default();

    assert_eq!(
        sim.match_token(&mut input, 4, &mut host, &mut NoopTracer),
        Err(PredictionError::UnknownMode(4))
    );
}

#[test]
fn mode_actions_reach_host() {
    let mut sim = simulator(MODES_LEXER);
    let mut input = Symbols::chars("\"ab\"");
    let mut host = RecordingLexer::default();

    assert_eq!(sim.match_token(&mut input, 0, &mut host, &mut NoopTracer), Ok(4));
    assert_eq!(host.events, vec!["more", "push 1"]);
    assert_eq!(host.modes, vec![1]);

    assert_eq!(sim.match_token(&mut input, 1, &mut host, &mut NoopTracer), Ok(5));
    assert_eq!(sim.match_token(&mut input, 1, &mut host, &mut NoopTracer), Ok(5));
    assert_eq!(sim.match_token(&mut input, 1, &mut host, &mut NoopTracer), Ok(1));
    assert_eq!(host.events, vec!["more", "push 1", "more", "more", "pop"]);
    assert!(host.modes.is_empty());
    assert_eq!(input.index(), 4);
}

#[test]
fn channel_action() {
    let mut sim = simulator(MODES_LEXER);
    let mut input = Symbols::chars(" ");
    let mut host = RecordingLexer::default();

    assert_eq!(sim.match_token(&mut input, 0, &mut host, &mut NoopTracer), Ok(3));
    assert_eq!(host.events, vec!["channel 1"]);
}

#[test]
fn pop_on_empty_mode_stack_fails() {
    let mut sim = simulator(MODES_LEXER);
    let mut input = Symbols::chars("\"");
    let mut host = RecordingLexer::default();

    assert_eq!(
        sim.match_token(&mut input, 1, &mut host, &mut NoopTracer),
        Err(PredictionError::EmptyModeStack)
    );
}

#[test]
fn dfa_is_shared_and_reused() {
    let atn = Arc::new(load(HELLO_LEXER));
    let dfa = Arc::new(DfaCache::for_lexer(&atn));

    let mut first = LexerAtnSimulator::new(Arc::clone(&atn), Arc::clone(&dfa));
    lex_all(&mut first, "hello world");
    let states = dfa.num_states();
    assert!(states > 0);

    let mut second = LexerAtnSimulator::new(atn, Arc::clone(&dfa));
    assert_eq!(lex_all(&mut second, "world hello"), vec![2, 3, 1, token::EOF]);
    assert_eq!(dfa.num_states(), states);

    let rendered = dfa.read(0).unwrap().to_lexer_string();
    assert!(rendered.contains("s0-'h'->"), "{rendered}");

    dfa.reset();
    assert_eq!(dfa.num_states(), 0);
}

#[test]
fn trace_lists_matches() {
    let mut sim = simulator(HELLO_LEXER);
    let vocabulary = Vocabulary::from_tokens_file(HELLO_TOKENS).unwrap();
    let mut tracer = PrintTracer::builder()
        .vocabulary(vocabulary)
        .lexer(true)
        .build();
    let mut input = Symbols::chars("hello x");
    let mut host = RecordingLexer::default();

    for _ in 0..3 {
        sim.match_token(&mut input, 0, &mut host, &mut tracer)
            .unwrap();
    }

    assert_eq!(
        tracer.lines(),
        &["lex m0 0..4 'hello'", "lex m0 5..5 WS", "lex m0 6..6 ID"]
    );
}

use std::sync::Arc;

use allstar_atn::test_utils::{AMBIGUOUS_PARSER, EXPR_PARSER, EXPR_TOKENS, HELLO_PARSER, load};
use allstar_core::{IntStream, Vocabulary};

use crate::config_set::AltSet;
use crate::context::PredictionContextCache;
use crate::dfa::DfaCache;
use crate::error::PredictionError;
use crate::host::NoHost;
use crate::parser_sim::ParserAtnSimulator;
use crate::prediction_mode::PredictionMode;
use crate::test_utils::{RecordingParser, Symbols};
use crate::trace::{NoopTracer, PrintTracer, Verbosity};

fn simulator(json: &str) -> ParserAtnSimulator {
    let atn = Arc::new(load(json));
    let dfa = Arc::new(DfaCache::for_parser(&atn));
    ParserAtnSimulator::new(atn, dfa, Arc::new(PredictionContextCache::new()))
}

fn alts(alts: &[usize]) -> AltSet {
    alts.iter().copied().collect()
}

#[test]
fn single_alternative_block() {
    let sim = simulator(HELLO_PARSER);
    let mut input = Symbols::tokens(&[1, 2]);

    let alt = sim.adaptive_predict(&mut input, 0, &[], &mut NoHost, &mut NoopTracer);

    assert_eq!(alt, Ok(1));
    assert_eq!(input.index(), 0);
}

#[test]
fn unknown_decision() {
    let sim = simulator(HELLO_PARSER);
    let mut input = Symbols::tokens(&[1, 2]);

    assert_eq!(
        sim.adaptive_predict(&mut input, 3, &[], &mut NoHost, &mut NoopTracer),
        Err(PredictionError::UnknownDecision(3))
    );
}

#[test]
fn sll_conflict_retries_with_full_context() {
    let sim = simulator(AMBIGUOUS_PARSER);
    let mut input = Symbols::tokens(&[1]);
    let mut host = RecordingParser::default();

    let alt = sim.adaptive_predict(&mut input, 0, &[], &mut host, &mut NoopTracer);

    assert_eq!(alt, Ok(1));
    assert_eq!(host.full_context, vec![(0, Some(alts(&[1, 2])))]);
    assert_eq!(host.ambiguities, vec![(0, alts(&[1, 2]), false)]);
    assert!(host.context_sensitivities.is_empty());
    assert_eq!(input.index(), 0);
}

#[test]
fn exact_ambiguity_detection() {
    let mut sim = simulator(AMBIGUOUS_PARSER);
    sim.set_prediction_mode(PredictionMode::LlExactAmbigDetection);
    let mut input = Symbols::tokens(&[1]);
    let mut host = RecordingParser::default();

    assert_eq!(sim.adaptive_predict(&mut input, 0, &[], &mut host, &mut NoopTracer), Ok(1));
    assert_eq!(host.ambiguities, vec![(0, alts(&[1, 2]), true)]);
}

#[test]
fn sll_mode_trusts_the_conflict() {
    let mut sim = simulator(AMBIGUOUS_PARSER);
    sim.set_prediction_mode(PredictionMode::Sll);
    let mut input = Symbols::tokens(&[1]);
    let mut host = RecordingParser::default();

    assert_eq!(sim.adaptive_predict(&mut input, 0, &[], &mut host, &mut NoopTracer), Ok(1));
    assert!(host.full_context.is_empty());
    assert!(host.ambiguities.is_empty());
}

#[test]
fn cached_dfa_gives_same_answer() {
    let sim = simulator(AMBIGUOUS_PARSER);
    let mut host = RecordingParser::default();

    for _ in 0..3 {
        let mut input = Symbols::tokens(&[1]);
        assert_eq!(sim.adaptive_predict(&mut input, 0, &[], &mut host, &mut NoopTracer), Ok(1));
    }

    // the conflict state is cached, full-context prediction is not
    assert_eq!(host.full_context.len(), 3);
    assert_eq!(sim.dfa().num_states(), 2);

    let vocabulary = Vocabulary::from_tokens_file("X=1\n").unwrap();
    let rendered = sim.dfa().read(0).unwrap().to_string_with(&vocabulary);
    assert_eq!(rendered, "s0-X->:s1^=>1\n");
}

#[test]
fn dead_end_reports_no_viable_alt() {
    let sim = simulator(AMBIGUOUS_PARSER);
    let mut input = Symbols::tokens(&[]);

    assert_eq!(
        sim.adaptive_predict(&mut input, 0, &[], &mut NoHost, &mut NoopTracer),
        Err(PredictionError::NoViableAlt {
            decision: 0,
            start_index: 0,
            offending_index: 0,
            dead_end_alts: alts(&[1, 2]),
        })
    );
}

#[test]
fn precedence_loop_continues_at_low_precedence() {
    let sim = simulator(EXPR_PARSER);
    let mut host = RecordingParser::default();

    // `1 * 2` at the top level: the loop takes the operator
    let mut input = Symbols::tokens(&[1, 3]);
    assert_eq!(sim.adaptive_predict(&mut input, 0, &[], &mut host, &mut NoopTracer), Ok(1));

    let mut input = Symbols::tokens(&[2, 3]);
    assert_eq!(sim.adaptive_predict(&mut input, 0, &[], &mut host, &mut NoopTracer), Ok(1));
}

#[test]
fn precedence_loop_exits_at_high_precedence() {
    let sim = simulator(EXPR_PARSER);

    // inside the right operand of `*`, a following `+` belongs to the caller
    let mut host = RecordingParser {
        precedence: 3,
        ..Default::default()
    };
    let mut input = Symbols::tokens(&[2, 3]);
    assert_eq!(sim.adaptive_predict(&mut input, 0, &[8], &mut host, &mut NoopTracer), Ok(2));

    // at level 2, `*` still binds tighter than the caller
    let mut host = RecordingParser {
        precedence: 2,
        ..Default::default()
    };
    let mut input = Symbols::tokens(&[1, 3]);
    assert_eq!(sim.adaptive_predict(&mut input, 0, &[8], &mut host, &mut NoopTracer), Ok(1));
    let mut input = Symbols::tokens(&[2, 3]);
    assert_eq!(sim.adaptive_predict(&mut input, 0, &[8], &mut host, &mut NoopTracer), Ok(2));
}

#[test]
fn precedence_dfa_keeps_one_start_state_per_level() {
    let sim = simulator(EXPR_PARSER);

    for precedence in [0, 3] {
        let mut host = RecordingParser {
            precedence,
            ..Default::default()
        };
        let mut input = Symbols::tokens(&[2, 3]);
        sim.adaptive_predict(&mut input, 0, &[], &mut host, &mut NoopTracer).unwrap();
    }

    let dfa = sim.dfa().read(0).unwrap();
    assert!(dfa.is_precedence_dfa());
    assert!(dfa.s0.is_none());
    let low = dfa.precedence_start_state(0).unwrap();
    let high = dfa.precedence_start_state(3).unwrap();
    assert_ne!(low, high);
}

#[test]
fn accept_state_predicates_are_evaluated() {
    let sim = simulator(EXPR_PARSER);
    let mut input = Symbols::tokens(&[2, 3]);

    assert_eq!(sim.adaptive_predict(&mut input, 1, &[], &mut NoHost, &mut NoopTracer), Ok(2));

    let vocabulary = Vocabulary::from_tokens_file(EXPR_TOKENS).unwrap();
    let rendered = sim.dfa().read(1).unwrap().to_string_with(&vocabulary);
    assert_eq!(rendered, "s0-'+'->:s1=>[({1>=prec}?, 2)]\n");

    // `{1>=prec}?` fails at level 2 on the cached state too
    let mut host = RecordingParser {
        precedence: 2,
        ..Default::default()
    };
    let mut input = Symbols::tokens(&[2, 3]);
    assert!(matches!(
        sim.adaptive_predict(&mut input, 1, &[], &mut host, &mut NoopTracer),
        Err(PredictionError::NoViableAlt { decision: 1, .. })
    ));
}

#[test]
fn trace_shows_full_context_and_ambiguity() {
    let sim = simulator(AMBIGUOUS_PARSER);
    let mut tracer = PrintTracer::builder()
        .vocabulary(Vocabulary::from_tokens_file("X=1\n").unwrap())
        .build();
    let mut input = Symbols::tokens(&[1]);

    sim.adaptive_predict(&mut input, 0, &[], &mut NoHost, &mut tracer)
        .unwrap();

    assert_eq!(
        tracer.lines(),
        &[
            "predict d0 @0 X",
            "  full-context d0 conflict {1, 2}",
            "  ambiguity d0 {1, 2}",
            "  => alt 1",
        ]
    );
}

#[test]
fn verbose_trace_shows_dfa_edges() {
    let sim = simulator(HELLO_PARSER);
    let mut tracer = PrintTracer::builder().verbosity(Verbosity::Verbose).build();

    for _ in 0..2 {
        let mut input = Symbols::tokens(&[1, 2]);
        sim.adaptive_predict(&mut input, 0, &[], &mut NoHost, &mut tracer)
            .unwrap();
    }

    insta::assert_snapshot!(tracer.lines().join("\n"), @r"
    predict d0 @0 1
      atn s0 -1-> s1
      => alt 1
    predict d0 @0 1
      dfa s0 -1-> s1
      => alt 1
    ");
}

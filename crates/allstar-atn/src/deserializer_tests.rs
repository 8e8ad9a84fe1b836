use indoc::indoc;

use crate::serialized::{FormatId, SerializedAtn, packed};
use crate::state::{BlockKind, StateKind};
use crate::test_utils::{AMBIGUOUS_PARSER, EXPR_PARSER, HELLO_LEXER, MODES_LEXER, load};
use crate::transition::TransitionKind;
use crate::{AtnError, DeserializationOptions, Deserializer, GrammarType, LexerAction};

#[test]
fn parser_fixture_links_block() {
    let atn = load(AMBIGUOUS_PARSER);

    assert_eq!(atn.grammar_type, GrammarType::Parser);
    assert_eq!(atn.num_states(), 8);
    assert_eq!(atn.rule_to_start_state, vec![0]);
    assert_eq!(atn.rule_to_stop_state, vec![1]);
    assert_eq!(atn.decision_to_state, vec![2]);
    assert_eq!(atn.state(2).decision, Some(0));
    assert_eq!(atn.state(2).end_state(), Some(5));
    assert_eq!(atn.state(5).kind, StateKind::BlockEnd { start_state: Some(2) });
    assert_eq!(
        atn.state(0).kind,
        StateKind::RuleStart {
            stop_state: Some(1),
            is_left_recursive: false,
        }
    );
}

#[test]
fn eof_atom_uses_arg3() {
    let atn = load(AMBIGUOUS_PARSER);

    assert_eq!(atn.state(6).transition(0).kind, TransitionKind::Atom { label: -1 });
}

#[test]
fn lexer_fixture_reads_rules_modes_and_actions() {
    let atn = load(HELLO_LEXER);

    assert_eq!(atn.grammar_type, GrammarType::Lexer);
    assert_eq!(atn.rule_to_token_type, vec![1, 2, 3]);
    assert_eq!(atn.mode_to_start_state, vec![0]);
    assert_eq!(atn.lexer_actions, vec![LexerAction::Skip]);
    assert_eq!(atn.state(19).transition(0).kind, TransitionKind::Set(
        [9, 10, 13, 32].into_iter().collect()
    ));
}

#[test]
fn plus_loop_back_is_linked() {
    let atn = load(HELLO_LEXER);

    assert_eq!(
        atn.state(13).kind,
        StateKind::BlockStart {
            kind: BlockKind::Plus { loop_back: Some(16) },
            end_state: Some(15),
        }
    );
    assert_eq!(atn.state(17).loop_back_state(), Some(16));
}

#[test]
fn precedence_rule_return_edges() {
    let atn = load(EXPR_PARSER);

    assert!(atn.is_precedence_rule(0));
    assert!(atn.state(4).is_precedence_decision());
    assert_eq!(atn.state(4).loop_back_state(), Some(14));

    // both calls pass a non-zero precedence, so neither return is outermost
    let returns: Vec<_> = atn.state(1).transitions().iter().map(|t| t.target).collect();
    assert_eq!(returns, vec![11, 11]);
    assert!(atn.state(1).transitions().iter().all(|t| t.kind
        == TransitionKind::Epsilon {
            outermost_precedence_return: None
        }));
}

#[test]
fn rule_edge_targets_callee_start() {
    let atn = load(EXPR_PARSER);

    let t = atn.state(8).transition(0);
    assert_eq!(t.target, 0);
    assert_eq!(
        t.kind,
        TransitionKind::Rule {
            rule_index: 0,
            precedence: 3,
            follow_state: 11,
        }
    );
}

#[test]
fn outermost_precedence_return_marked() {
    let json = indoc! {r#"
        {
          "version": 3,
          "uuid": "AADB8D7E-AEEF-4415-AD2B-8204D6CF042E",
          "grammarType": 1,
          "maxTokenType": 1,
          "states": [
            {"ruleIndex": 0, "stateType": 2},
            {"ruleIndex": 0, "stateType": 7},
            {"ruleIndex": 0, "stateType": 1},
            {"ruleIndex": 0, "stateType": 1},
            {"ruleIndex": 1, "stateType": 2},
            {"ruleIndex": 1, "stateType": 7},
            {"ruleIndex": 1, "stateType": 1}
          ],
          "precedenceStates": [4],
          "ruleToStartState": [{"stateNumber": 0}, {"stateNumber": 4}],
          "allTransitionsBuilder": [
            [{"src": 0, "trg": 2, "edgeType": 1}],
            [{"src": 2, "trg": 3, "edgeType": 3, "arg1": 4, "arg2": 1, "arg3": 0}],
            [{"src": 3, "trg": 1, "edgeType": 1}],
            [{"src": 4, "trg": 6, "edgeType": 1}],
            [{"src": 6, "trg": 5, "edgeType": 5, "arg1": 1}]
          ]
        }
    "#};
    let atn = Deserializer::default().from_json(json).unwrap();

    assert_eq!(
        atn.state(5).transition(0).kind,
        TransitionKind::Epsilon {
            outermost_precedence_return: Some(1)
        }
    );
}

#[test]
fn packed_matches_json() {
    let serialized = SerializedAtn::from_json(MODES_LEXER).unwrap();
    let words = packed::encode(&serialized).unwrap();
    let decoded = packed::decode(&words).unwrap();

    assert_eq!(decoded.states, serialized.states);
    assert_eq!(decoded.rule_to_start_state, serialized.rule_to_start_state);
    assert_eq!(decoded.interval_sets, serialized.interval_sets);
    assert_eq!(decoded.lexer_actions, serialized.lexer_actions);
    assert_eq!(
        decoded.edges().collect::<Vec<_>>(),
        serialized.edges().collect::<Vec<_>>()
    );

    let from_packed = Deserializer::default().from_packed(&words).unwrap();
    let from_json = load(MODES_LEXER);
    assert_eq!(from_packed.num_states(), from_json.num_states());
    assert_eq!(from_packed.lexer_actions, from_json.lexer_actions);
}

#[test]
fn packed_words_are_shifted() {
    let serialized = SerializedAtn::from_json(AMBIGUOUS_PARSER).unwrap();
    let words = packed::encode(&serialized).unwrap();

    assert_eq!(words[0], 3);
    // least significant uuid word, +2
    assert_eq!(words[1], 0x042E + 2);
    // grammar type parser (1) and max token type (1)
    assert_eq!(&words[9..11], &[3, 3]);
}

#[test]
fn packed_truncated() {
    let serialized = SerializedAtn::from_json(AMBIGUOUS_PARSER).unwrap();
    let words = packed::encode(&serialized).unwrap();

    let err = packed::decode(&words[..12]).unwrap_err();
    assert!(matches!(err, AtnError::Truncated { offset: 12 }));
}

#[test]
fn unsupported_version() {
    let json = AMBIGUOUS_PARSER.replace(r#""version": 3"#, r#""version": 2"#);
    let err = Deserializer::default().from_json(&json).unwrap_err();

    assert_eq!(
        err.to_string(),
        "could not deserialize ATN with version 2 (expected 3)"
    );
}

#[test]
fn unsupported_uuid() {
    let json = AMBIGUOUS_PARSER.replace(
        "AADB8D7E-AEEF-4415-AD2B-8204D6CF042E",
        "00000000-0000-0000-0000-000000000001",
    );
    let err = Deserializer::default().from_json(&json).unwrap_err();

    assert!(matches!(err, AtnError::UnsupportedUuid(FormatId(1))));
}

#[test]
fn malformed_uuid() {
    let json = AMBIGUOUS_PARSER.replace("AADB8D7E-AEEF-4415-AD2B-8204D6CF042E", "nope");
    let err = Deserializer::default().from_json(&json).unwrap_err();

    assert!(matches!(err, AtnError::MalformedUuid(s) if s == "nope"));
}

#[test]
fn invalid_transition_type() {
    let json = AMBIGUOUS_PARSER.replace(
        r#"{"src": 7, "trg": 1, "edgeType": 1}"#,
        r#"{"src": 7, "trg": 1, "edgeType": 42}"#,
    );
    let err = Deserializer::default().from_json(&json).unwrap_err();

    assert!(matches!(err, AtnError::InvalidTransitionType(42)));
}

#[test]
fn invalid_state_type() {
    let json = AMBIGUOUS_PARSER.replace(
        r#"{"ruleIndex": 0, "stateType": 8}"#,
        r#"{"ruleIndex": 0, "stateType": 13}"#,
    );
    let err = Deserializer::default().from_json(&json).unwrap_err();

    assert_eq!(err.to_string(), "the specified state type 13 is not valid");
}

#[test]
fn dangling_edge_target() {
    let json = AMBIGUOUS_PARSER.replace(
        r#"{"src": 7, "trg": 1, "edgeType": 1}"#,
        r#"{"src": 7, "trg": 99, "edgeType": 1}"#,
    );
    let err = Deserializer::default().from_json(&json).unwrap_err();

    assert!(matches!(
        err,
        AtnError::OutOfRange {
            what: "edge target",
            index: 99
        }
    ));
}

#[test]
fn missing_decision_fails_verification() {
    let json = AMBIGUOUS_PARSER.replace(r#""decisionToState": [2]"#, r#""decisionToState": []"#);

    let err = Deserializer::default().from_json(&json).unwrap_err();
    assert!(matches!(err, AtnError::IllegalState(_)));

    let unverified = Deserializer::new(DeserializationOptions::default().with_verify(false))
        .from_json(&json)
        .unwrap();
    assert_eq!(unverified.num_decisions(), 0);
}

#[test]
fn malformed_json() {
    let err = Deserializer::default().from_json("{").unwrap_err();
    assert!(matches!(err, AtnError::Json(_)));
}

#[test]
fn legacy_lexer_actions_become_custom() {
    let json = HELLO_LEXER
        .replace(
            "AADB8D7E-AEEF-4415-AD2B-8204D6CF042E",
            "33761B2D-78BB-4A43-8B0B-4F5BEE8AACF3",
        )
        .replace(
            r#"{"src": 23, "trg": 6, "edgeType": 6, "arg1": 2, "arg2": 0}"#,
            r#"{"src": 23, "trg": 6, "edgeType": 6, "arg1": 2, "arg2": 7}"#,
        );
    let atn = Deserializer::default().from_json(&json).unwrap();

    assert_eq!(
        atn.lexer_actions,
        vec![LexerAction::Custom {
            rule_index: 2,
            action_index: 7
        }]
    );
    assert_eq!(
        atn.state(23).transition(0).kind,
        TransitionKind::Action {
            rule_index: 2,
            action_index: Some(0),
            ctx_dependent: false,
        }
    );
}

#[test]
fn legacy_packed_layout_round_trips() {
    let mut serialized = SerializedAtn::from_json(HELLO_LEXER).unwrap();
    serialized.uuid = FormatId::BASE.to_string();
    serialized.lexer_actions.clear();

    let words = packed::encode(&serialized).unwrap();
    let decoded = packed::decode(&words).unwrap();

    assert_eq!(decoded.uuid, "33761B2D-78BB-4A43-8B0B-4F5BEE8AACF3");
    assert_eq!(decoded.rule_to_start_state, serialized.rule_to_start_state);
    assert!(decoded.lexer_actions.is_empty());
}

#[test]
fn format_id_features_follow_order() {
    assert!(FormatId::CURRENT.supports(FormatId::BASE));
    assert!(FormatId::CURRENT.supports(FormatId::ADDED_PRECEDENCE_TRANSITIONS));
    assert!(!FormatId::BASE.supports(FormatId::ADDED_LEXER_ACTIONS));
    assert!(!FormatId(7).supports(FormatId::BASE));
}

#[test]
fn format_id_text_and_words() {
    let id: FormatId = "aadb8d7e-aeef-4415-ad2b-8204d6cf042e".parse().unwrap();

    assert_eq!(id, FormatId::ADDED_LEXER_ACTIONS);
    assert_eq!(id.to_string(), "AADB8D7E-AEEF-4415-AD2B-8204D6CF042E");
    assert_eq!(FormatId::from_words(id.to_words()), id);
}

use allstar_core::Interval;

use crate::interpreter::ParserInterpreter;
use crate::listener::ParseTreeWalker;
use crate::test_utils::{EventLog, calc_parser, parser};
use crate::token::Token;
use crate::tree::{NodeId, ParseTree};

const ADD: i32 = 2;
const INT: i32 = 3;

/// `(s (e (e 1) + (e 2)) <EOF>)`
fn one_plus_two() -> (ParseTree, NodeId, Vec<String>) {
    let (p, _) = parser(calc_parser(), &[(INT, "1"), (ADD, "+"), (INT, "2")]);
    let mut interp = ParserInterpreter::new(p);
    let root = interp.parse(0).unwrap();
    let parser = interp.into_parser();
    let names = parser.grammar().rule_names().to_vec();
    (parser.tree().clone(), root, names)
}

#[test]
fn child_queries_by_rule_and_type() {
    let (tree, root, _) = one_plus_two();

    let e = tree.rule_context(root, 1, 0).unwrap();
    assert_eq!(tree.rule_contexts(root, 1), vec![e]);
    assert!(tree.rule_context(root, 0, 0).is_none());

    assert_eq!(tree.child_count(e), 3);
    let plus = tree.token(e, ADD, 0).unwrap();
    assert_eq!(tree.node(plus).token().unwrap().text, "+");
    assert!(tree.token(e, INT, 0).is_none());
    assert_eq!(tree.rule_contexts(e, 1).len(), 2);
    let right = tree.rule_context(e, 1, 1).unwrap();
    assert_eq!(tree.text(right), "2");
}

#[test]
fn descendants_are_preorder() {
    let (tree, root, names) = one_plus_two();

    let labels: Vec<String> = tree
        .descendants(root)
        .into_iter()
        .map(|n| match tree.rule(n) {
            Some(r) => names[r.rule_index].clone(),
            None => tree.node(n).token().unwrap().text.clone(),
        })
        .collect();

    assert_eq!(labels, vec!["s", "e", "e", "1", "+", "e", "2", "<EOF>"]);
}

#[test]
fn find_all_searches_the_subtree() {
    let (tree, root, _) = one_plus_two();

    assert_eq!(tree.find_all_token_nodes(root, INT).len(), 2);
    assert_eq!(tree.find_all_rule_nodes(root, 1).len(), 3);
    assert_eq!(tree.find_all_rule_nodes(root, 0), vec![root]);
}

#[test]
fn ancestry() {
    let (tree, root, _) = one_plus_two();
    let one = tree.find_all_token_nodes(root, INT)[0];
    let e = tree.child(root, 0).unwrap();
    let inner = tree.child(e, 0).unwrap();

    assert_eq!(tree.ancestors(one), vec![root, e, inner]);
    assert_eq!(tree.depth(one), 4);
    assert_eq!(tree.depth(root), 1);
    assert!(tree.is_ancestor_of(root, one));
    assert!(!tree.is_ancestor_of(one, root));
    assert!(!tree.is_ancestor_of(one, one));
    assert_eq!(tree.root_of(one), root);
}

#[test]
fn source_intervals() {
    let (tree, root, _) = one_plus_two();
    let e = tree.child(root, 0).unwrap();
    let plus = tree.token(e, ADD, 0).unwrap();

    assert_eq!(tree.source_interval(root), Interval::new(0, 3));
    assert_eq!(tree.source_interval(e), Interval::new(0, 2));
    assert_eq!(tree.source_interval(plus), Interval::single(1));
}

#[test]
fn enclosing_region() {
    let (tree, root, _) = one_plus_two();
    let e = tree.child(root, 0).unwrap();
    let right = tree.rule_context(e, 1, 1).unwrap();

    assert_eq!(tree.root_of_subtree_enclosing_region(root, 2, 2), Some(right));
    assert_eq!(tree.root_of_subtree_enclosing_region(root, 0, 2), Some(e));
    assert_eq!(tree.root_of_subtree_enclosing_region(root, 0, 3), Some(root));
}

#[test]
fn walker_visits_in_document_order() {
    let (tree, root, names) = one_plus_two();
    let mut log = EventLog::new(&names);

    ParseTreeWalker.walk(&mut log, &tree, root);

    assert_eq!(
        log.events(),
        vec![
            "enter s",
            "enter e",
            "enter e",
            "terminal 1",
            "exit e",
            "terminal +",
            "enter e",
            "terminal 2",
            "exit e",
            "exit e",
            "terminal <EOF>",
            "exit s",
        ]
    );
}

#[test]
fn hand_built_tree() {
    let mut tree = ParseTree::new();
    let root = tree.new_rule(None, 0, None);
    let child = tree.new_rule(Some(root), 7, Some(3));
    tree.add_child(root, child);
    tree.add_terminal(child, Token::new(1, "a b\n"));
    let err = tree.add_error_node(root, Token::new(0, "?"));

    assert_eq!(tree.len(), 4);
    assert!(tree.node(err).is_error());
    assert_eq!(tree.parent(err), Some(root));
    assert_eq!(
        tree.to_string_tree(root, &["top".to_string()]),
        "(top (7 a b\\n) ?)"
    );
    assert_eq!(tree.text(root), "a b\n?");
    // no tokens from a stream: no interval
    assert_eq!(tree.source_interval(root), Interval::INVALID);

    assert_eq!(tree.remove_last_child(root), Some(err));
    assert_eq!(tree.child_count(root), 1);

    tree.clear();
    assert!(tree.is_empty());
}

#[test]
fn empty_rule_interval() {
    let mut tree = ParseTree::new();
    let root = tree.new_rule(None, 0, None);
    let mut start = Token::new(1, "x");
    start.index = Some(2);
    let mut stop = Token::new(1, "w");
    stop.index = Some(1);
    let rule = tree.rule_mut(root).unwrap();
    rule.start = Some(start);
    rule.stop = Some(stop);

    assert_eq!(tree.source_interval(root), Interval::new(2, 1));
}

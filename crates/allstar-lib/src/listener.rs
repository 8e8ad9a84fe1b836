//! Depth-first walks over a parse tree.

use crate::tree::{NodeId, NodeKind, ParseTree};

/// Callbacks for [`ParseTreeWalker`]. Also used by the parser to report
/// rule entry, exit, and matched tokens while parsing.
pub trait ParseTreeListener {
    fn visit_terminal(&mut self, _tree: &ParseTree, _node: NodeId) {}

    fn visit_error_node(&mut self, _tree: &ParseTree, _node: NodeId) {}

    fn enter_every_rule(&mut self, _tree: &ParseTree, _ctx: NodeId) {}

    fn exit_every_rule(&mut self, _tree: &ParseTree, _ctx: NodeId) {}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ParseTreeWalker;

impl ParseTreeWalker {
    /// Visits `node` and its subtree in order: rule entry, children, rule exit.
    pub fn walk(&self, listener: &mut dyn ParseTreeListener, tree: &ParseTree, node: NodeId) {
        match tree.node(node).kind() {
            NodeKind::Error(_) => listener.visit_error_node(tree, node),
            NodeKind::Terminal(_) => listener.visit_terminal(tree, node),
            NodeKind::Rule(_) => {
                listener.enter_every_rule(tree, node);
                for &child in tree.children(node) {
                    self.walk(listener, tree, child);
                }
                listener.exit_every_rule(tree, node);
            }
        }
    }
}

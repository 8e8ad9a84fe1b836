//! Parse trees.
//!
//! Nodes live in an arena owned by [`ParseTree`] and refer to each other by
//! [`NodeId`]. A rule node keeps its parent link even when it is not attached
//! as a child (parse tree building off), so the invocation chain is always
//! walkable.

use allstar_core::Interval;
use allstar_core::utils::escape_whitespace;

use crate::error::RecognitionError;
use crate::invariants::invalid_node;
use crate::token::Token;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A rule invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleNode {
    pub rule_index: usize,
    /// Outer alternative the rule matched, when known.
    pub alt_number: Option<usize>,
    /// ATN state that invoked the rule; `None` for the start rule.
    pub invoking_state: Option<usize>,
    pub start: Option<Token>,
    pub stop: Option<Token>,
    /// Error that forced the rule to return early.
    pub exception: Option<RecognitionError>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Rule(RuleNode),
    Terminal(Token),
    /// Token consumed or conjured during error recovery.
    Error(Token),
}

#[derive(Clone, Debug)]
pub struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

impl Node {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn rule(&self) -> Option<&RuleNode> {
        match &self.kind {
            NodeKind::Rule(r) => Some(r),
            _ => None,
        }
    }

    /// Token of a terminal or error node.
    pub fn token(&self) -> Option<&Token> {
        match &self.kind {
            NodeKind::Terminal(t) | NodeKind::Error(t) => Some(t),
            NodeKind::Rule(_) => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.kind, NodeKind::Error(_))
    }
}

#[derive(Clone, Debug, Default)]
pub struct ParseTree {
    nodes: Vec<Node>,
}

impl ParseTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn node(&self, id: NodeId) -> &Node {
        self.nodes
            .get(id.index())
            .unwrap_or_else(|| invalid_node(id.index()))
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes
            .get_mut(id.index())
            .unwrap_or_else(|| invalid_node(id.index()))
    }

    pub fn rule(&self, id: NodeId) -> Option<&RuleNode> {
        self.node(id).rule()
    }

    pub fn rule_mut(&mut self, id: NodeId) -> Option<&mut RuleNode> {
        match &mut self.node_mut(id).kind {
            NodeKind::Rule(r) => Some(r),
            _ => None,
        }
    }

    fn push(&mut self, parent: Option<NodeId>, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            kind,
        });
        id
    }

    /// Creates a rule node linked to `parent` but not yet one of its children.
    pub fn new_rule(
        &mut self,
        parent: Option<NodeId>,
        rule_index: usize,
        invoking_state: Option<usize>,
    ) -> NodeId {
        self.push(
            parent,
            NodeKind::Rule(RuleNode {
                rule_index,
                alt_number: None,
                invoking_state,
                start: None,
                stop: None,
                exception: None,
            }),
        )
    }

    /// Appends `child` to `parent`'s children and points it at `parent`.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        self.node_mut(child).parent = Some(parent);
        self.node_mut(parent).children.push(child);
    }

    pub fn remove_last_child(&mut self, parent: NodeId) -> Option<NodeId> {
        self.node_mut(parent).children.pop()
    }

    pub fn set_parent(&mut self, node: NodeId, parent: Option<NodeId>) {
        self.node_mut(node).parent = parent;
    }

    pub fn add_terminal(&mut self, parent: NodeId, token: Token) -> NodeId {
        let id = self.push(Some(parent), NodeKind::Terminal(token));
        self.node_mut(parent).children.push(id);
        id
    }

    pub fn add_error_node(&mut self, parent: NodeId, token: Token) -> NodeId {
        let id = self.push(Some(parent), NodeKind::Error(token));
        self.node_mut(parent).children.push(id);
        id
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn child(&self, id: NodeId, i: usize) -> Option<NodeId> {
        self.node(id).children.get(i).copied()
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.node(id).children.len()
    }

    /// The `i`th terminal child of `ctx` with type `token_type`.
    pub fn token(&self, ctx: NodeId, token_type: i32, i: usize) -> Option<NodeId> {
        self.tokens(ctx, token_type).into_iter().nth(i)
    }

    /// Terminal children of `ctx` with type `token_type`; error nodes excluded.
    pub fn tokens(&self, ctx: NodeId, token_type: i32) -> Vec<NodeId> {
        self.children(ctx)
            .iter()
            .copied()
            .filter(|&c| matches!(&self.node(c).kind, NodeKind::Terminal(t) if t.token_type == token_type))
            .collect()
    }

    /// The `i`th child of `ctx` that invokes `rule_index`.
    pub fn rule_context(&self, ctx: NodeId, rule_index: usize, i: usize) -> Option<NodeId> {
        self.rule_contexts(ctx, rule_index).into_iter().nth(i)
    }

    pub fn rule_contexts(&self, ctx: NodeId, rule_index: usize) -> Vec<NodeId> {
        self.children(ctx)
            .iter()
            .copied()
            .filter(|&c| self.rule(c).is_some_and(|r| r.rule_index == rule_index))
            .collect()
    }

    /// Token index range covered by `id`.
    ///
    /// A rule that matched nothing yields `(start, start - 1)`; one that has
    /// no start token yet yields [`Interval::INVALID`].
    pub fn source_interval(&self, id: NodeId) -> Interval {
        match &self.node(id).kind {
            NodeKind::Terminal(t) | NodeKind::Error(t) => match t.index {
                Some(i) => Interval::single(i as i32),
                None => Interval::INVALID,
            },
            NodeKind::Rule(r) => {
                let Some(start) = r.start.as_ref().and_then(|t| t.index) else {
                    return Interval::INVALID;
                };
                let start = start as i32;
                match r.stop.as_ref().and_then(|t| t.index) {
                    Some(stop) if stop as i32 >= start => Interval::new(start, stop as i32),
                    _ => Interval::new(start, start - 1),
                }
            }
        }
    }

    /// Text of every token under `id`, concatenated without separators.
    pub fn text(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let node = self.node(id);
        match &node.kind {
            NodeKind::Terminal(t) | NodeKind::Error(t) => out.push_str(&t.text),
            NodeKind::Rule(_) => {
                for &c in &node.children {
                    self.collect_text(c, out);
                }
            }
        }
    }

    /// LISP-style rendering: `(rule child child)`, leaves as their text.
    pub fn to_string_tree(&self, id: NodeId, rule_names: &[String]) -> String {
        let mut out = String::new();
        self.write_tree(id, rule_names, &mut out);
        out
    }

    fn write_tree(&self, id: NodeId, rule_names: &[String], out: &mut String) {
        let node = self.node(id);
        let label = match &node.kind {
            NodeKind::Rule(r) => rule_names
                .get(r.rule_index)
                .cloned()
                .unwrap_or_else(|| r.rule_index.to_string()),
            NodeKind::Terminal(t) | NodeKind::Error(t) => t.text.clone(),
        };
        let label = escape_whitespace(&label, false);
        if node.children.is_empty() {
            out.push_str(&label);
            return;
        }
        out.push('(');
        out.push_str(&label);
        for &c in &node.children {
            out.push(' ');
            self.write_tree(c, rule_names, out);
        }
        out.push(')');
    }

    /// Ancestors of `id`, root first, excluding `id`.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut p = self.parent(id);
        while let Some(n) = p {
            out.push(n);
            p = self.parent(n);
        }
        out.reverse();
        out
    }

    pub fn is_ancestor_of(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut p = self.parent(id);
        while let Some(n) = p {
            if n == ancestor {
                return true;
            }
            p = self.parent(n);
        }
        false
    }

    /// `id` and everything below it, preorder.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.children(n).iter().rev());
        }
        out
    }

    pub fn find_all_token_nodes(&self, id: NodeId, token_type: i32) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|&n| matches!(&self.node(n).kind, NodeKind::Terminal(t) if t.token_type == token_type))
            .collect()
    }

    pub fn find_all_rule_nodes(&self, id: NodeId, rule_index: usize) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|&n| self.rule(n).is_some_and(|r| r.rule_index == rule_index))
            .collect()
    }

    /// Number of nodes on the parent chain, counting `id`: a root has depth 1.
    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).len() + 1
    }

    /// Top of the parent chain.
    pub fn root_of(&self, id: NodeId) -> NodeId {
        let mut n = id;
        while let Some(p) = self.parent(n) {
            n = p;
        }
        n
    }

    /// Deepest rule node whose token range contains `start_index..=stop_index`.
    pub fn root_of_subtree_enclosing_region(
        &self,
        id: NodeId,
        start_index: usize,
        stop_index: usize,
    ) -> Option<NodeId> {
        for &c in self.children(id) {
            if let Some(r) = self.root_of_subtree_enclosing_region(c, start_index, stop_index) {
                return Some(r);
            }
        }
        let r = self.rule(id)?;
        let start = r.start.as_ref().and_then(|t| t.index)?;
        let stop_ok = match r.stop.as_ref().and_then(|t| t.index) {
            Some(stop) => stop_index <= stop,
            None => true,
        };
        (start_index >= start && stop_ok).then_some(id)
    }
}

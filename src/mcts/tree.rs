//! Arena-allocated search tree.
//!
//! Nodes live in one `Vec` and refer to each other by [`NodeId`]. Each node
//! keeps a back-reference to its parent for backpropagation, and its children
//! both in a hash map (lookup by action) and in insertion order, so that
//! every walk over children is deterministic.

use rustc_hash::FxHashMap;

use crate::engine::{self, Action, GameState};

/// Index of a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// The root node.
    pub const ROOT: NodeId = NodeId(0);

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// One node of the tree.
#[derive(Debug, Clone)]
pub struct MctsNode {
    /// State this node represents.
    pub state: GameState,
    /// Parent node, `None` for the root.
    pub parent: Option<NodeId>,
    /// Action that led here from the parent.
    pub action: Option<Action>,
    /// Number of times this node was on a backpropagation path.
    pub visits: u32,
    /// Sum of scores backpropagated through this node.
    pub total_score: f64,
    /// Distance from the root.
    pub depth: usize,
    children: FxHashMap<Action, NodeId>,
    child_order: Vec<Action>,
    untried: Vec<Action>,
}

impl MctsNode {
    fn new(state: GameState, parent: Option<NodeId>, action: Option<Action>, depth: usize) -> Self {
        let untried = engine::legal_actions(&state);
        Self {
            state,
            parent,
            action,
            visits: 0,
            total_score: 0.0,
            depth,
            children: FxHashMap::default(),
            child_order: Vec::new(),
            untried,
        }
    }

    /// Average backpropagated score, 0 if never visited.
    pub fn mean_score(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.total_score / f64::from(self.visits)
        }
    }

    /// Legal actions not yet expanded into children.
    pub fn untried(&self) -> &[Action] {
        &self.untried
    }

    /// Whether every legal action already has a child.
    pub fn is_fully_expanded(&self) -> bool {
        self.untried.is_empty()
    }

    /// Whether the node has at least one child.
    pub fn has_children(&self) -> bool {
        !self.child_order.is_empty()
    }

    /// Child reached by `action`, if expanded.
    pub fn child(&self, action: &Action) -> Option<NodeId> {
        self.children.get(action).copied()
    }
}

/// The search tree for one decision.
#[derive(Debug, Clone)]
pub struct MctsTree {
    nodes: Vec<MctsNode>,
}

impl MctsTree {
    /// Tree holding only a root for `state`.
    pub fn new(state: GameState) -> Self {
        Self {
            nodes: vec![MctsNode::new(state, None, None, 0)],
        }
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree is empty. Never true; a tree always has a root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node by id.
    pub fn node(&self, id: NodeId) -> &MctsNode {
        &self.nodes[id.index()]
    }

    /// Children of `id` in expansion order.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = (Action, NodeId)> + '_ {
        let node = self.node(id);
        node.child_order
            .iter()
            .filter_map(move |a| node.children.get(a).map(|&child| (*a, child)))
    }

    /// UCB1 value of `child` under `exploration`.
    ///
    /// ```text
    /// UCB1 = mean + C * sqrt(ln(parent_visits) / child_visits)
    /// ```
    ///
    /// Unvisited children score infinity so they are always tried first.
    pub fn ucb1(&self, child: NodeId, exploration: f64) -> f64 {
        let node = self.node(child);
        if node.visits == 0 {
            return f64::INFINITY;
        }
        let parent_visits = node
            .parent
            .map_or(node.visits, |p| self.node(p).visits)
            .max(1);
        let visits = f64::from(node.visits);
        node.mean_score() + exploration * (f64::from(parent_visits).ln() / visits).sqrt()
    }

    /// Child of `id` with the highest UCB1, first in expansion order on ties.
    pub fn select_child(&self, id: NodeId, exploration: f64) -> Option<NodeId> {
        let mut best: Option<(NodeId, f64)> = None;
        for (_, child) in self.children(id) {
            let value = self.ucb1(child, exploration);
            match best {
                Some((_, top)) if top >= value => {}
                _ => best = Some((child, value)),
            }
        }
        best.map(|(child, _)| child)
    }

    /// Remove the untried action at `index` of node `id`, apply it and
    /// attach the resulting child.
    ///
    /// Returns `None` if `index` is out of range.
    pub fn expand(&mut self, id: NodeId, index: usize) -> Option<NodeId> {
        let parent = &mut self.nodes[id.index()];
        if index >= parent.untried.len() {
            return None;
        }
        let action = parent.untried.swap_remove(index);
        let state = engine::apply(&parent.state, &action);
        let depth = parent.depth + 1;

        let child = NodeId(self.nodes.len() as u32);
        let parent = &mut self.nodes[id.index()];
        parent.children.insert(action, child);
        parent.child_order.push(action);
        self.nodes.push(MctsNode::new(state, Some(id), Some(action), depth));
        Some(child)
    }

    /// Add `score` to `id` and every ancestor, bumping their visit counts.
    pub fn backpropagate(&mut self, id: NodeId, score: f64) {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = &mut self.nodes[current.index()];
            node.visits += 1;
            node.total_score += score;
            cursor = node.parent;
        }
    }

    /// Actions of the `k` most visited children of the root, in descending
    /// visit order. Ties keep expansion order.
    pub fn most_visited(&self, k: usize) -> Vec<Action> {
        let mut ranked: Vec<(Action, u32)> = self
            .children(NodeId::ROOT)
            .map(|(action, child)| (action, self.node(child).visits))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.into_iter().take(k).map(|(action, _)| action).collect()
    }
}

//! Search tree with arena allocation.
//!
//! All nodes live in one `Vec` and refer to each other by [`NodeId`].
//! Parents own their children through their child lists; the parent link
//! is a plain index and never keeps anything alive. Re-rooting compacts the
//! arena so discarded subtrees are actually freed.

use super::node::{Node, NodeId};
use crate::error::{EngineError, Result};
use crate::position::Position;
use chess::ChessMove;

#[derive(Debug)]
pub struct Tree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Tree {
    pub fn new(position: Position) -> Self {
        Self {
            nodes: vec![Node::new(position, 0.0, None)],
            root: NodeId(0),
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// Number of nodes currently held.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Creates the child reached by playing `mv` from `parent`.
    pub fn add_child(&mut self, parent: NodeId, mv: ChessMove, prior: f32) -> Result<NodeId> {
        let parent_node = self.get(parent);
        if parent_node.child(mv).is_some() {
            return Err(EngineError::TreeState(format!(
                "node already has a child for {}",
                mv
            )));
        }

        let position = parent_node.position.apply_move(mv)?;
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(position, prior, Some(parent)));
        self.get_mut(parent).children.push((mv, id));
        Ok(id)
    }

    /// Makes `new_root` the root, dropping every node outside its subtree.
    pub fn reroot(&mut self, new_root: NodeId) {
        // Breadth-first order of the kept subtree; position in `order` is
        // the node's new id.
        let mut order = vec![new_root];
        let mut next = 0;
        while next < order.len() {
            let id = order[next];
            order.extend(self.get(id).children.iter().map(|&(_, child)| child));
            next += 1;
        }

        let mut remap: Vec<Option<NodeId>> = vec![None; self.nodes.len()];
        for (new_index, old) in order.iter().enumerate() {
            remap[old.index()] = Some(NodeId(new_index as u32));
        }

        let mut slots: Vec<Option<Node>> = std::mem::take(&mut self.nodes).into_iter().map(Some).collect();
        let mut nodes = Vec::with_capacity(order.len());
        for old in order {
            if let Some(mut node) = slots[old.index()].take() {
                // The new root's parent is outside the subtree and maps to None.
                node.parent = node.parent.and_then(|p| remap[p.index()]);
                for (_, child) in node.children.iter_mut() {
                    if let Some(id) = remap[child.index()] {
                        *child = id;
                    }
                }
                nodes.push(node);
            }
        }

        self.nodes = nodes;
        self.root = NodeId(0);
    }

    /// Nodes from `id` up to and including the root.
    pub fn path_to_root(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = vec![id];
        let mut walker = self.get(id).parent;
        while let Some(parent) = walker {
            path.push(parent);
            walker = self.get(parent).parent;
        }
        path
    }
}

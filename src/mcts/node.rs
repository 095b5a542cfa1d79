//! One node of the search tree.

use crate::position::{color_sign, Position};
use chess::ChessMove;

/// Index into the tree arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A position in the tree with its search statistics.
///
/// `value_sum` is kept from White's point of view, so backing a value up
/// adds it unchanged at every ancestor. Selection reads it from the side
/// that moved into the node (see [`Node::upper_confidence_bound`]).
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) position: Position,
    pub(crate) prior: f32,
    pub(crate) value_sum: f32,
    pub(crate) visit: u32,
    /// Non-owning link; `None` for the root.
    pub(crate) parent: Option<NodeId>,
    /// Empty until the node is expanded.
    pub(crate) children: Vec<(ChessMove, NodeId)>,
}

impl Node {
    pub fn new(position: Position, prior: f32, parent: Option<NodeId>) -> Self {
        Self {
            position,
            prior,
            value_sum: 0.0,
            visit: 0,
            parent,
            children: Vec::new(),
        }
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn prior(&self) -> f32 {
        self.prior
    }

    pub fn value_sum(&self) -> f32 {
        self.value_sum
    }

    pub fn visit(&self) -> u32 {
        self.visit
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[(ChessMove, NodeId)] {
        &self.children
    }

    pub fn child(&self, mv: ChessMove) -> Option<NodeId> {
        self.children.iter().find(|(m, _)| *m == mv).map(|&(_, id)| id)
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Mean backed-up value. Undefined (`None`) before the first visit.
    pub fn mean_value(&self) -> Option<f32> {
        if self.visit == 0 {
            None
        } else {
            Some(self.value_sum / self.visit as f32)
        }
    }

    /// AlphaZero-style score used by selection:
    ///
    /// `q + confidence * prior * sqrt(parent_visit_sum) / (1 + visit)`
    ///
    /// where `q` is the mean value seen by the player who made the move into
    /// this node, or 0 while unvisited.
    pub fn upper_confidence_bound(&self, confidence: f32, parent_visit_sum: u32) -> f32 {
        let mover = !self.position.side_to_move();
        let q = self.mean_value().map_or(0.0, |mean| mean * color_sign(mover));
        q + confidence * self.prior * (parent_visit_sum as f32).sqrt() / (1 + self.visit) as f32
    }
}

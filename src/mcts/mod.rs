//! Monte-Carlo Tree Search driven by a policy and a value oracle.
//!
//! One search iteration is:
//!
//! 1. **select**: walk down from the root by UCB until a leaf,
//! 2. **expand**: add a child per legal move with priors from the policy,
//!    then pick one of them at random,
//! 3. **simulate**: score that node (terminal reward or value oracle),
//! 4. **backup**: add the score to every node up to the root.
//!
//! [`Mcts::search`] repeats this until a wall-clock budget runs out. The
//! tree survives between moves: [`Mcts::advance_root`] keeps the statistics
//! of the subtree that was actually played.

pub mod node;
pub mod tree;

pub use node::{Node, NodeId};
pub use tree::Tree;

use crate::codec;
use crate::error::{EngineError, Result};
use crate::oracle::{OracleError, PolicyOracle, ValueOracle};
use crate::position::{color_sign, terminal_reward, Position};
use chess::ChessMove;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchReport {
    pub iterations: u64,
    pub elapsed: Duration,
}

pub struct Mcts {
    tree: Tree,
    confidence: f32,
    policy: Arc<dyn PolicyOracle>,
    value: Arc<dyn ValueOracle>,
    rng: StdRng,
}

impl Mcts {
    pub fn new(
        position: Position,
        policy: Arc<dyn PolicyOracle>,
        value: Arc<dyn ValueOracle>,
        confidence: f32,
    ) -> Self {
        Self {
            tree: Tree::new(position),
            confidence,
            policy,
            value,
            rng: StdRng::from_entropy(),
        }
    }

    /// Fixes the RNG used to pick freshly expanded children.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    pub fn root_position(&self) -> &Position {
        self.tree.get(self.tree.root()).position()
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn set_confidence(&mut self, confidence: f32) {
        self.confidence = confidence;
    }

    pub fn set_oracles(&mut self, policy: Arc<dyn PolicyOracle>, value: Arc<dyn ValueOracle>) {
        self.policy = policy;
        self.value = value;
    }

    /// Throws the tree away and starts again at `position`.
    pub fn reset(&mut self, position: Position) {
        self.tree = Tree::new(position);
    }

    /// Walks down from the root to the first leaf, taking the child with the
    /// highest UCB at each step. Ties go to the earliest child.
    pub fn select(&self) -> NodeId {
        let mut current = self.tree.root();
        loop {
            let node = self.tree.get(current);
            if node.is_leaf() {
                return current;
            }

            let visit_sum: u32 = node.children.iter().map(|&(_, id)| self.tree.get(id).visit).sum();
            let mut best: Option<(NodeId, f32)> = None;
            for &(_, child) in &node.children {
                let score = self.tree.get(child).upper_confidence_bound(self.confidence, visit_sum);
                if best.map_or(true, |(_, best_score)| score > best_score) {
                    best = Some((child, score));
                }
            }

            match best {
                Some((child, _)) => current = child,
                None => return current,
            }
        }
    }

    /// Adds one child per legal move, each with the policy's score for that
    /// move as its prior, and returns one of the new children at random.
    /// A node without legal moves is returned unchanged.
    pub fn expand(&mut self, id: NodeId) -> Result<NodeId> {
        let node = self.tree.get(id);
        if !node.is_leaf() {
            return Err(EngineError::TreeState("cannot expand a non-leaf node".to_string()));
        }

        let position = node.position();
        let moves = position.legal_moves();
        if moves.is_empty() {
            return Ok(id);
        }

        let side = position.side_to_move();
        let priors = self.policy.score_distribution(position)?;
        if priors.len() != codec::MOVE_SPACE {
            return Err(OracleError::DistributionLength {
                expected: codec::MOVE_SPACE,
                got: priors.len(),
            }
            .into());
        }

        let mut children = Vec::with_capacity(moves.len());
        for mv in moves {
            let prior = priors[codec::encode(mv, side)];
            children.push(self.tree.add_child(id, mv, prior)?);
        }

        children
            .choose(&mut self.rng)
            .copied()
            .ok_or_else(|| EngineError::TreeState("expansion created no children".to_string()))
    }

    /// Scores a leaf for the side to move there: the game result if the game
    /// is over (draw claims included), otherwise the value oracle.
    pub fn simulate(&self, id: NodeId) -> Result<f32> {
        let node = self.tree.get(id);
        if !node.is_leaf() {
            return Err(EngineError::TreeState("cannot simulate from a non-leaf".to_string()));
        }

        let position = node.position();
        if position.is_game_over(true) {
            return terminal_reward(position.result(true), position.side_to_move());
        }
        Ok(self.value.evaluate(position)?)
    }

    /// Adds one visit and `value` to every node from `id` up to the root.
    pub fn backup(&mut self, id: NodeId, value: f32) {
        for current in self.tree.path_to_root(id) {
            let node = self.tree.get_mut(current);
            node.visit += 1;
            node.value_sum += value;
        }
    }

    /// Runs search iterations until `duration` seconds have passed. The
    /// clock is only checked between iterations, so the last one may run
    /// slightly over. A non-positive duration does nothing.
    pub fn search(&mut self, duration: f64) -> Result<SearchReport> {
        let start = Instant::now();
        let mut iterations = 0;

        while start.elapsed().as_secs_f64() < duration {
            let leaf = self.select();
            let leaf = self.expand(leaf)?;
            let value = self.simulate(leaf)?;
            // simulate() answers for the side to move at the leaf; the tree
            // stores White's point of view.
            let side = self.tree.get(leaf).position().side_to_move();
            self.backup(leaf, value * color_sign(side));
            iterations += 1;
        }

        let report = SearchReport {
            iterations,
            elapsed: start.elapsed(),
        };
        info!(
            "search finished: {} iterations in {:.3}s, {} nodes",
            report.iterations,
            report.elapsed.as_secs_f64(),
            self.tree.len()
        );
        Ok(report)
    }

    /// The root move with the most visits. Visit count, not mean value, is
    /// what search converges on.
    pub fn get_move(&self) -> Result<ChessMove> {
        let root = self.tree.get(self.tree.root());
        let mut best: Option<(ChessMove, u32)> = None;
        for &(mv, child) in root.children() {
            let visit = self.tree.get(child).visit;
            if best.map_or(true, |(_, best_visit)| visit > best_visit) {
                best = Some((mv, visit));
            }
        }

        best.map(|(mv, _)| mv)
            .ok_or_else(|| EngineError::TreeState("search before asking for a move".to_string()))
    }

    /// Most-visited line from the root.
    pub fn principal_variation(&self) -> Vec<ChessMove> {
        let mut line = Vec::new();
        let mut current = self.tree.root();
        loop {
            let mut best: Option<(ChessMove, NodeId, u32)> = None;
            for &(mv, child) in self.tree.get(current).children() {
                let visit = self.tree.get(child).visit;
                if visit > 0 && best.map_or(true, |(_, _, best_visit)| visit > best_visit) {
                    best = Some((mv, child, visit));
                }
            }
            match best {
                Some((mv, child, _)) => {
                    line.push(mv);
                    current = child;
                }
                None => return line,
            }
        }
    }

    /// Moves the root to the child reached by `mv`, creating it if needed.
    /// Statistics below that child are kept; everything else is freed.
    pub fn advance_root(&mut self, mv: ChessMove) -> Result<()> {
        let root = self.tree.root();
        let child = match self.tree.get(root).child(mv) {
            Some(child) => child,
            None => self.tree.add_child(root, mv, 0.0)?,
        };

        let before = self.tree.len();
        self.tree.reroot(child);
        debug!(
            "advanced root by {}: kept {} of {} nodes",
            mv,
            self.tree.len(),
            before
        );
        Ok(())
    }
}

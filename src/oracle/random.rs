use super::{OracleError, PolicyOracle, ValueOracle};
use crate::codec::{self, MOVE_SPACE};
use crate::position::Position;

pub const UNIFORM_POLICY: &str = "random";
pub const ZERO_VALUE: &str = "zero";

/// Equal prior for every legal move. The fallback when no trained policy is
/// available.
#[derive(Debug, Clone, Default)]
pub struct UniformPolicy;

impl UniformPolicy {
    pub fn new() -> Self {
        Self
    }
}

impl PolicyOracle for UniformPolicy {
    fn score_distribution(&self, position: &Position) -> Result<Vec<f32>, OracleError> {
        let mut scores = vec![0.0; MOVE_SPACE];
        let moves = position.legal_moves();
        if moves.is_empty() {
            return Ok(scores);
        }

        let prob = 1.0 / moves.len() as f32;
        let side = position.side_to_move();
        for mv in moves {
            scores[codec::encode(mv, side)] = prob;
        }
        Ok(scores)
    }

    fn name(&self) -> &str {
        UNIFORM_POLICY
    }
}

/// Every position is even. Search then only learns from finished games.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroValue;

impl ValueOracle for ZeroValue {
    fn evaluate(&self, _position: &Position) -> Result<f32, OracleError> {
        Ok(0.0)
    }

    fn name(&self) -> &str {
        ZERO_VALUE
    }
}

use super::{OracleError, ValueOracle};
use crate::position::{terminal_reward, Position};
use rand::seq::SliceRandom;
use rand::thread_rng;

pub const ROLLOUT_VALUE: &str = "rollout";

/// Plays uniformly random moves until the game ends or `max_depth` plies
/// have been played. Unfinished playouts count as draws.
#[derive(Debug, Clone)]
pub struct RolloutValue {
    pub max_depth: u32,
}

impl Default for RolloutValue {
    fn default() -> Self {
        Self { max_depth: 50 }
    }
}

impl RolloutValue {
    pub fn new(max_depth: u32) -> Self {
        Self { max_depth }
    }
}

impl ValueOracle for RolloutValue {
    fn evaluate(&self, position: &Position) -> Result<f32, OracleError> {
        let perspective = position.side_to_move();
        let mut rng = thread_rng();
        let mut current = position.clone();

        for _ in 0..self.max_depth {
            if current.is_game_over(true) {
                break;
            }
            let moves = current.legal_moves();
            let Some(&mv) = moves.choose(&mut rng) else {
                break;
            };
            current = current
                .apply_move(mv)
                .map_err(|e| OracleError::Evaluation(e.to_string()))?;
        }

        if !current.is_game_over(true) {
            return Ok(0.0);
        }
        terminal_reward(current.result(true), perspective).map_err(|e| OracleError::Evaluation(e.to_string()))
    }

    fn name(&self) -> &str {
        ROLLOUT_VALUE
    }
}

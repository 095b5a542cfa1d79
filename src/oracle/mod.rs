//! Move-scoring oracles consulted by the search.
//!
//! A [`PolicyOracle`] proposes priors over the move index space (see
//! [`crate::codec`]); a [`ValueOracle`] estimates who is winning. The engine
//! only sees the traits, so a trained network can be dropped in later
//! without touching the search.

use crate::config::EngineConfig;
use crate::position::Position;
use log::warn;
use std::sync::Arc;
use thiserror::Error;

pub mod material;
pub mod random;
pub mod rollout;

pub use material::{CapturePolicy, MaterialValue};
pub use random::{UniformPolicy, ZeroValue};
pub use rollout::RolloutValue;

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("unknown {kind} oracle '{name}'")]
    Unknown { kind: &'static str, name: String },

    #[error("policy returned {got} scores, expected {expected}")]
    DistributionLength { expected: usize, got: usize },

    #[error("evaluation failed: {0}")]
    Evaluation(String),
}

pub trait PolicyOracle: Send + Sync {
    /// Dense, non-negative scores indexed by [`crate::codec::encode`]. They
    /// do not have to sum to one.
    fn score_distribution(&self, position: &Position) -> Result<Vec<f32>, OracleError>;

    fn name(&self) -> &str;
}

pub trait ValueOracle: Send + Sync {
    /// Expected outcome in `[-1, 1]` for the side to move.
    fn evaluate(&self, position: &Position) -> Result<f32, OracleError>;

    fn name(&self) -> &str;
}

pub fn build_policy(config: &EngineConfig) -> Result<Arc<dyn PolicyOracle>, OracleError> {
    let policy: Arc<dyn PolicyOracle> = match config.policy_name.as_str() {
        random::UNIFORM_POLICY => Arc::new(UniformPolicy::new()),
        material::CAPTURE_POLICY => Arc::new(CapturePolicy::new()),
        other => {
            return Err(OracleError::Unknown {
                kind: "policy",
                name: other.to_string(),
            })
        }
    };

    if let Some(path) = &config.policy_file {
        warn!("policy '{}' has no weights, ignoring {}", policy.name(), path.display());
    }
    Ok(policy)
}

pub fn build_value(config: &EngineConfig) -> Result<Arc<dyn ValueOracle>, OracleError> {
    let value: Arc<dyn ValueOracle> = match config.value_name.as_str() {
        random::ZERO_VALUE => Arc::new(ZeroValue),
        material::MATERIAL_VALUE => Arc::new(MaterialValue::new()),
        rollout::ROLLOUT_VALUE => Arc::new(RolloutValue::new(config.rollout_depth)),
        other => {
            return Err(OracleError::Unknown {
                kind: "value",
                name: other.to_string(),
            })
        }
    };

    if let Some(path) = &config.value_file {
        warn!("value '{}' has no weights, ignoring {}", value.name(), path.display());
    }
    Ok(value)
}

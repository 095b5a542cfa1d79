use crate::oracle::OracleError;
use thiserror::Error;

/// Errors raised by the engine. Every one of them is local to a single
/// protocol command; none of them ends the process.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("illegal move {mv} in position {fen}")]
    InvalidMove { mv: String, fen: String },

    #[error("invalid FEN: {0}")]
    InvalidFen(String),

    #[error("tree state error: {0}")]
    TreeState(String),

    #[error("unknown game result: {0}")]
    UnknownResult(String),

    #[error("time control parse error: {0}")]
    TimeControlParse(String),

    #[error("invalid option: {0}")]
    InvalidOption(String),

    #[error(transparent)]
    Oracle(#[from] OracleError),
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;

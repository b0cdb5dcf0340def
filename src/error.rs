//! Engine error type

use thiserror::Error;

use crate::sim::GameStatus;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Lifecycle call not allowed from the current status
    #[error("cannot {action} while {from:?}")]
    InvalidTransition {
        from: GameStatus,
        action: &'static str,
    },

    /// Entity carries a non-finite position or extent
    #[error("entity {id} has malformed state")]
    MalformedEntity { id: u32 },

    #[error("unknown variant: {0}")]
    UnknownVariant(String),

    #[error("invalid frame delta: {0}")]
    InvalidDelta(f32),

    #[error("renderer: {0}")]
    Renderer(String),

    /// Host refused an input listener
    #[error("input: {0}")]
    Input(String),

    #[error("persistence: {0}")]
    Persistence(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

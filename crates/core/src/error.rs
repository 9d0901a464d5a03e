//! Engine error type

use thiserror::Error;

/// Failures surfaced by a game session
///
/// Geometry queries never fail; only broken internal invariants end up here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The piece queue was asked for a piece while empty
    #[error("kind=queue_underflow: piece queue is empty")]
    QueueUnderflow,
}

impl EngineError {
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::QueueUnderflow => "queue_underflow",
        }
    }
}

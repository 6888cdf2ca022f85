use crate::core::physics::dipole::InteractionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Pair ({first}, {second}) cannot be evaluated: {source}")]
    Interaction {
        first: usize,
        second: usize,
        #[source]
        source: InteractionError,
    },

    #[error("Failed to write report: {0}")]
    Report(#[from] std::io::Error),

    #[error("Pipeline was cancelled after {received} of {expected} samples")]
    Cancelled { received: u64, expected: u64 },

    #[error("Pipeline stage '{stage}' failed: {reason}")]
    StageFailed { stage: &'static str, reason: String },

    #[error("Internal logic error: {0}")]
    Internal(String),
}

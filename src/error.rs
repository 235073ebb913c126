use thiserror::Error;

use crate::services::StoreError;

/// Errors surfaced by event operations
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Not enough participants: need at least {required}, found {found}")]
    InsufficientParticipants { required: usize, found: usize },

    #[error("Round limit exceeded: round {attempted} is past the final round {max_rounds}")]
    RoundLimitExceeded { attempted: u8, max_rounds: u8 },

    #[error("Teams not ready: {current_round} of {max_rounds} rounds completed")]
    TeamsNotReady { current_round: u8, max_rounds: u8 },

    #[error("No eligible pairs left for round {round}")]
    NoEligiblePairs { round: u8 },

    #[error("Another event operation is already in progress")]
    OperationInProgress,

    #[error("Persistence failure: {0}")]
    PersistenceFailure(#[from] StoreError),
}

impl EngineError {
    /// Short machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::InsufficientParticipants { .. } => "insufficient_participants",
            EngineError::RoundLimitExceeded { .. } => "round_limit_exceeded",
            EngineError::TeamsNotReady { .. } => "teams_not_ready",
            EngineError::NoEligiblePairs { .. } => "no_eligible_pairs",
            EngineError::OperationInProgress => "operation_in_progress",
            EngineError::PersistenceFailure(_) => "persistence_failure",
        }
    }
}

/*
[INPUT]:  Round state violations, provider and leaderboard failures
[OUTPUT]: GameError with retry hints for the presentation layer
[POS]:    Error handling layer - game crate
[UPDATE]: When adding new failure modes to the round or its collaborators
*/

use bearfactory_adapter::FactoryError;
use thiserror::Error;

use crate::round::Phase;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("operation requires phase {expected:?}, round is in {actual:?}")]
    InvalidPhase { expected: Phase, actual: Phase },

    #[error("goal must not be empty")]
    EmptyGoal,

    #[error("task set is empty")]
    EmptyTaskSet,

    #[error("task provider unavailable: {0}")]
    ProviderUnavailable(#[source] FactoryError),

    #[error("task generation aborted: {0}")]
    GenerationAborted(String),

    #[error("player name must not be empty")]
    MissingPlayerName,

    #[error("score already saved for this round")]
    AlreadySaved,

    #[error("round has no results to save")]
    NoResults,

    #[error("failed to save high score: {0}")]
    PersistenceFailure(#[source] FactoryError),

    #[error("game session closed")]
    SessionClosed,
}

impl GameError {
    /// Whether retrying the same call can succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            GameError::PersistenceFailure(_) => true,
            GameError::ProviderUnavailable(err) => err.is_retryable(),
            _ => false,
        }
    }
}

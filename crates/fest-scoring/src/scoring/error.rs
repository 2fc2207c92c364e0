use super::domain::{EventId, JudgeId, RoundNumber, ScoreKey};
use super::repository::RepositoryError;
use super::validation::ValidationError;

/// Failures surfaced by the scoring operations.
#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("score {0} is already finalized and cannot be edited")]
    AlreadyFinalized(ScoreKey),
    #[error("nothing to finalize yet: no finalized scores for event {event} round {round}")]
    IncompleteRound { event: EventId, round: RoundNumber },
    #[error("round {round} is the final round of event {event}; nothing to promote into")]
    TerminalRound { event: EventId, round: RoundNumber },
    #[error("cannot promote {requested} team(s) when {available} are ranked")]
    InvalidCount { requested: i64, available: usize },
    #[error("promotion count must be positive, got {0}")]
    NonPositiveCount(i64),
    #[error("judge {judge} is not the head judge of event {event}")]
    NotHeadJudge { judge: JudgeId, event: EventId },
    #[error(transparent)]
    Storage(RepositoryError),
}

impl From<RepositoryError> for ScoringError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::Locked(key) => Self::AlreadyFinalized(key),
            other => Self::Storage(other),
        }
    }
}

impl ScoringError {
    /// Storage failures may be retried with the same request; everything else is final.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ScoringError::Storage(RepositoryError::Unavailable(_)))
    }
}

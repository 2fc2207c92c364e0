use std::collections::BTreeMap;

use super::domain::{Event, EventId, RoundNumber, Score, ScoreKey, Team, TeamId};

/// Score storage keyed uniquely by `ScoreKey`.
pub trait ScoreRepository: Send + Sync {
    /// Inserts or replaces the record under `score.key()`, returning the replaced draft.
    ///
    /// Must fail with `RepositoryError::Locked` when the stored record is finalized;
    /// the check and the write happen as one atomic step.
    fn upsert_score(&self, score: Score) -> Result<Option<Score>, RepositoryError>;
    /// Finalized scores for one round, ordered by key.
    fn finalized_for_round(
        &self,
        event: &EventId,
        round: RoundNumber,
    ) -> Result<Vec<Score>, RepositoryError>;
    /// Finalized scores for every round of an event, ordered by key.
    fn finalized_for_event(&self, event: &EventId) -> Result<Vec<Score>, RepositoryError>;
}

/// Team documents, trophy awards and promotion markers.
pub trait TeamRepository: Send + Sync {
    fn fetch_team(&self, id: &TeamId) -> Result<Option<Team>, RepositoryError>;
    fn registered_for(&self, event: &EventId) -> Result<Vec<TeamId>, RepositoryError>;
    /// Writes every award of one finalization for `event`, or none of them.
    ///
    /// Each entry overwrites the team's earlier award for the event. Fails with
    /// `RepositoryError::NotFound` before any write when a team is unknown.
    fn apply_awards(
        &self,
        event: &EventId,
        awards: &BTreeMap<TeamId, i32>,
    ) -> Result<Vec<Team>, RepositoryError>;
    /// Replaces the set of teams eligible for `round`.
    fn set_promotions(
        &self,
        event: &EventId,
        round: RoundNumber,
        teams: &[TeamId],
    ) -> Result<(), RepositoryError>;
    fn promoted(&self, event: &EventId, round: RoundNumber)
        -> Result<Vec<TeamId>, RepositoryError>;
    fn all_teams(&self) -> Result<Vec<Team>, RepositoryError>;
}

/// Read access to event definitions.
pub trait EventDirectory: Send + Sync {
    fn fetch_event(&self, id: &EventId) -> Result<Option<Event>, RepositoryError>;
}

/// Error enumeration for storage failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("score {0} is finalized")]
    Locked(ScoreKey),
    #[error("record not found: {0}")]
    NotFound(String),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

//! Scoring and ranking engine for festival judging.
//!
//! Judges submit ballots per (team, event, round); finalized ballots are
//! aggregated into deterministic rankings, the head judge promotes teams
//! between elimination rounds, and the decisive round is normalized into
//! trophy points on each team's standing.

pub mod aggregation;
pub mod domain;
pub mod error;
pub mod memory;
pub mod promotion;
pub mod repository;
pub mod router;
pub mod service;
pub mod trophies;
pub mod validation;

#[cfg(test)]
mod tests;

pub use aggregation::rank_round;
pub use domain::{
    Ballot, DirectWinners, Event, EventId, FinalizeOutcome, FinalizeRequest, JudgeId,
    PromotionRequest, Ranking, RankingEntry, RoundNumber, Score, ScoreKey, ScoreReceipt,
    ScoreSubmission, Team, TeamId, TeamStandingView,
};
pub use error::ScoringError;
pub use memory::{FestivalSeed, InMemoryFestivalStore, SeedError};
pub use promotion::{plan_promotion, PromotionPlan};
pub use repository::{EventDirectory, RepositoryError, ScoreRepository, TeamRepository};
pub use router::scoring_router;
pub use service::ScoringService;
pub use trophies::{TrophyAwards, TrophyNormalizer};
pub use validation::{validate_event, SubmissionValidator, ValidationError};

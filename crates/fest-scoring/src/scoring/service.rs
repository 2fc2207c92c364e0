use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::aggregation::rank_round;
use super::domain::{
    Event, EventId, FinalizeOutcome, FinalizeRequest, PromotionRequest, Ranking, RoundNumber,
    ScoreReceipt, ScoreSubmission, TeamId, TeamStandingView,
};
use super::error::ScoringError;
use super::promotion::plan_promotion;
use super::repository::{EventDirectory, ScoreRepository, TeamRepository};
use super::trophies::{TrophyAwards, TrophyNormalizer};
use super::validation::{ensure_round, SubmissionValidator, ValidationError};

/// Service composing validation, aggregation, promotion and trophy normalization
/// over the storage seams. Holds no ranking state between calls.
pub struct ScoringService<S, T, E> {
    scores: Arc<S>,
    teams: Arc<T>,
    events: Arc<E>,
    normalizer: TrophyNormalizer,
}

impl<S, T, E> ScoringService<S, T, E>
where
    S: ScoreRepository + 'static,
    T: TeamRepository + 'static,
    E: EventDirectory + 'static,
{
    pub fn new(scores: Arc<S>, teams: Arc<T>, events: Arc<E>, awards: TrophyAwards) -> Self {
        Self {
            scores,
            teams,
            events,
            normalizer: TrophyNormalizer::new(awards),
        }
    }

    /// Validate a judge submission and upsert it under its uniqueness key.
    pub fn submit(&self, submission: ScoreSubmission) -> Result<ScoreReceipt, ScoringError> {
        let event = self.event(&submission.event)?;
        let eligible: BTreeSet<TeamId> = self
            .assigned_teams(&event, submission.round)?
            .into_iter()
            .collect();

        let judge = submission.judge.clone();
        let score = SubmissionValidator::new(&event)
            .normalize(submission, &eligible, Utc::now())
            .inspect_err(|err| {
                warn!(event = %event.id, judge = %judge, error = %err, "score submission rejected");
            })?;

        let key = score.key();
        let previous = self.scores.upsert_score(score.clone()).map_err(|err| {
            let err = ScoringError::from(err);
            warn!(key = %key, error = %err, "score upsert failed");
            err
        })?;

        info!(
            key = %key,
            total = score.total,
            finalized = score.finalized,
            replaced_draft = previous.is_some(),
            "score recorded"
        );

        Ok(ScoreReceipt {
            score,
            replaced_draft: previous.is_some(),
        })
    }

    /// Current ranking snapshot for a round. Nothing is written.
    pub fn ranking(&self, event_id: &EventId, round: RoundNumber) -> Result<Ranking, ScoringError> {
        let event = self.event(event_id)?;
        self.rank(&event, round)
    }

    /// Head judge promotes the top `count` teams of `round` into the next round.
    pub fn promote(
        &self,
        event_id: &EventId,
        round: RoundNumber,
        request: PromotionRequest,
    ) -> Result<Vec<TeamId>, ScoringError> {
        let event = self.event(event_id)?;
        let plan = plan_promotion(&event, &request.head_judge, round, request.count)?;
        let ranking = self.rank(&event, round)?;
        let advancing = plan.select(&ranking)?;

        self.teams.set_promotions(&event.id, plan.next_round, &advancing)?;

        info!(
            event = %event.id,
            from_round = plan.from_round,
            next_round = plan.next_round,
            promoted = advancing.len(),
            "teams promoted"
        );

        Ok(advancing)
    }

    /// Teams currently eligible to be scored in `round`.
    pub fn promoted(
        &self,
        event_id: &EventId,
        round: RoundNumber,
    ) -> Result<Vec<TeamId>, ScoringError> {
        let event = self.event(event_id)?;
        ensure_round(&event, round)?;
        self.assigned_teams(&event, round)
    }

    /// Rank a round and, for the event's last round, write trophy points.
    ///
    /// Awards for the whole event are written in one store update that
    /// overwrites per (team, event), so a failed run can be retried as a whole.
    pub fn finalize(
        &self,
        event_id: &EventId,
        round: RoundNumber,
        request: FinalizeRequest,
    ) -> Result<FinalizeOutcome, ScoringError> {
        let event = self.event(event_id)?;
        let ranking = self.rank(&event, round)?;

        if !event.is_final_round(round) {
            debug!(event = %event.id, round, "non-decisive round finalized without awards");
            return Ok(FinalizeOutcome {
                ranking,
                points_awarded: Default::default(),
                decisive: false,
            });
        }

        let registered = self.teams.registered_for(&event.id)?;
        let participated = self.participants(&event, &registered, &request)?;
        let points = self
            .normalizer
            .normalize(&event, &ranking, &registered, &participated);

        self.teams
            .apply_awards(&event.id, &points)
            .inspect_err(|err| {
                warn!(event = %event.id, round, error = %err, "trophy award write failed");
            })?;
        for (team, awarded) in &points {
            debug!(event = %event.id, team = %team, points = awarded, "trophy points written");
        }

        info!(
            event = %event.id,
            round,
            ranked = ranking.entries.len(),
            awarded = points.len(),
            "event finalized"
        );

        Ok(FinalizeOutcome {
            ranking,
            points_awarded: points,
            decisive: true,
        })
    }

    pub fn standing(&self, team_id: &TeamId) -> Result<TeamStandingView, ScoringError> {
        let team = self
            .teams
            .fetch_team(team_id)?
            .ok_or_else(|| ValidationError::UnknownTeam(team_id.clone()))?;
        Ok(team.standing())
    }

    /// All teams by total trophy score, highest first, ties by team id.
    pub fn leaderboard(&self) -> Result<Vec<TeamStandingView>, ScoringError> {
        let mut standings: Vec<TeamStandingView> = self
            .teams
            .all_teams()?
            .iter()
            .map(|team| team.standing())
            .collect();
        standings.sort_by(|a, b| {
            b.total_trophy_score
                .cmp(&a.total_trophy_score)
                .then_with(|| a.team.cmp(&b.team))
        });
        Ok(standings)
    }

    fn event(&self, id: &EventId) -> Result<Event, ScoringError> {
        let event = self
            .events
            .fetch_event(id)?
            .ok_or_else(|| ValidationError::UnknownEvent(id.clone()))?;
        Ok(event)
    }

    /// Only scores for teams assigned to the round are ranked.
    fn rank(&self, event: &Event, round: RoundNumber) -> Result<Ranking, ScoringError> {
        ensure_round(event, round)?;
        let assigned = self.assigned_teams(event, round)?;
        let eligible: BTreeSet<&TeamId> = assigned.iter().collect();
        let mut finalized = self.scores.finalized_for_round(&event.id, round)?;
        finalized.retain(|score| {
            score
                .credited_team()
                .is_some_and(|team| eligible.contains(team))
        });
        rank_round(event, round, &finalized, &assigned)
    }

    /// Round 1 is open to every registered team; later rounds only to promoted ones.
    fn assigned_teams(
        &self,
        event: &Event,
        round: RoundNumber,
    ) -> Result<Vec<TeamId>, ScoringError> {
        let teams = if round <= 1 {
            self.teams.registered_for(&event.id)?
        } else {
            self.teams.promoted(&event.id, round)?
        };
        Ok(teams)
    }

    fn participants(
        &self,
        event: &Event,
        registered: &[TeamId],
        request: &FinalizeRequest,
    ) -> Result<BTreeSet<TeamId>, ScoringError> {
        if event.is_direct_win {
            return Ok(registered
                .iter()
                .filter(|team| !request.no_shows.contains(*team))
                .cloned()
                .collect());
        }

        Ok(self
            .scores
            .finalized_for_event(&event.id)?
            .iter()
            .filter_map(|score| score.credited_team().cloned())
            .collect())
    }
}

use super::domain::{Event, JudgeId, Ranking, RoundNumber, TeamId};
use super::error::ScoringError;
use super::validation::ensure_round;

/// Authorized promotion awaiting a ranking to select from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromotionPlan {
    pub from_round: RoundNumber,
    pub next_round: RoundNumber,
    pub count: usize,
}

/// Checks who may promote, from which round, and how many teams.
///
/// Runs before any ranking is built so misuse is reported even when the
/// round has no finalized scores yet.
pub fn plan_promotion(
    event: &Event,
    requester: &JudgeId,
    round: RoundNumber,
    count: i64,
) -> Result<PromotionPlan, ScoringError> {
    if requester != &event.head_judge {
        return Err(ScoringError::NotHeadJudge {
            judge: requester.clone(),
            event: event.id.clone(),
        });
    }

    ensure_round(event, round)?;

    if event.is_final_round(round) {
        return Err(ScoringError::TerminalRound {
            event: event.id.clone(),
            round,
        });
    }

    let count = usize::try_from(count)
        .ok()
        .filter(|count| *count > 0)
        .ok_or(ScoringError::NonPositiveCount(count))?;

    Ok(PromotionPlan {
        from_round: round,
        next_round: round + 1,
        count,
    })
}

impl PromotionPlan {
    /// Top `count` teams in ranking order.
    pub fn select(&self, ranking: &Ranking) -> Result<Vec<TeamId>, ScoringError> {
        if self.count > ranking.entries.len() {
            return Err(ScoringError::InvalidCount {
                requested: self.count as i64,
                available: ranking.entries.len(),
            });
        }

        Ok(ranking
            .entries
            .iter()
            .take(self.count)
            .map(|entry| entry.team.clone())
            .collect())
    }
}

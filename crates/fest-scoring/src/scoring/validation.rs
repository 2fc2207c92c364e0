use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use super::domain::{
    Ballot, DirectWinners, Event, EventId, JudgeId, RoundNumber, Score, ScoreSubmission, TeamId,
    CRITERIA_COUNT, DIRECT_WIN_BALLOT, MAX_CRITERION_VALUE, MAX_ROUNDS,
};

/// Rejections raised before anything is written.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("unknown event {0}")]
    UnknownEvent(EventId),
    #[error("unknown team {0}")]
    UnknownTeam(TeamId),
    #[error("round {round} is outside 1..={rounds} for event {event}")]
    RoundOutOfRange {
        event: EventId,
        round: RoundNumber,
        rounds: RoundNumber,
    },
    #[error("judge {judge} is not assigned to event {event}")]
    JudgeNotAssigned { judge: JudgeId, event: EventId },
    #[error("expected {expected} criteria values, found {found}")]
    CriteriaCount { expected: usize, found: usize },
    #[error("score out of range: criterion {index} is {value}, allowed 0..={max}")]
    CriterionOutOfRange { index: usize, value: i32, max: i32 },
    #[error("event {event} expects a {expected} ballot, found {found}")]
    BallotKindMismatch {
        event: EventId,
        expected: &'static str,
        found: &'static str,
    },
    #[error("direct-win ballot must name a winning team")]
    MissingWinner,
    #[error("criteria ballot must reference a team")]
    MissingTeam,
    #[error("team {team} is not eligible for round {round} of event {event}")]
    TeamNotEligible {
        team: TeamId,
        event: EventId,
        round: RoundNumber,
    },
    #[error("event {event} must have between 1 and {max} rounds, found {rounds}")]
    InvalidRoundCount {
        event: EventId,
        rounds: RoundNumber,
        max: RoundNumber,
    },
    #[error("event {event} requires exactly {expected} judging criteria, found {found}")]
    CriteriaDefinition {
        event: EventId,
        expected: usize,
        found: usize,
    },
    #[error("event {0} has no judges assigned")]
    NoJudges(EventId),
    #[error("head judge {judge} is not on the panel for event {event}")]
    HeadJudgeNotOnPanel { judge: JudgeId, event: EventId },
}

/// Checks the structural invariants of an event definition.
pub fn validate_event(event: &Event) -> Result<(), ValidationError> {
    if event.rounds == 0 || event.rounds > MAX_ROUNDS {
        return Err(ValidationError::InvalidRoundCount {
            event: event.id.clone(),
            rounds: event.rounds,
            max: MAX_ROUNDS,
        });
    }

    if event.requires_criteria() && event.criteria.len() != CRITERIA_COUNT {
        return Err(ValidationError::CriteriaDefinition {
            event: event.id.clone(),
            expected: CRITERIA_COUNT,
            found: event.criteria.len(),
        });
    }

    if event.judges.is_empty() {
        return Err(ValidationError::NoJudges(event.id.clone()));
    }

    if !event.has_judge(&event.head_judge) {
        return Err(ValidationError::HeadJudgeNotOnPanel {
            judge: event.head_judge.clone(),
            event: event.id.clone(),
        });
    }

    Ok(())
}

pub(crate) fn ensure_round(event: &Event, round: RoundNumber) -> Result<(), ValidationError> {
    if event.contains_round(round) {
        Ok(())
    } else {
        Err(ValidationError::RoundOutOfRange {
            event: event.id.clone(),
            round,
            rounds: event.rounds,
        })
    }
}

/// Turns a raw submission into a normalized `Score` for one event.
pub struct SubmissionValidator<'a> {
    event: &'a Event,
}

impl<'a> SubmissionValidator<'a> {
    pub fn new(event: &'a Event) -> Self {
        Self { event }
    }

    /// `eligible` holds the teams allowed to appear in the submission's round.
    pub fn normalize(
        &self,
        submission: ScoreSubmission,
        eligible: &BTreeSet<TeamId>,
        submitted_at: DateTime<Utc>,
    ) -> Result<Score, ValidationError> {
        let event = self.event;

        if submission.event != event.id {
            return Err(ValidationError::UnknownEvent(submission.event));
        }

        if !event.has_judge(&submission.judge) {
            return Err(ValidationError::JudgeNotAssigned {
                judge: submission.judge,
                event: event.id.clone(),
            });
        }

        ensure_round(event, submission.round)?;

        let ScoreSubmission {
            judge,
            team,
            event: event_id,
            round,
            ballot,
            comment,
            finalize,
        } = submission;

        let comment = comment
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());

        match (event.is_direct_win, ballot) {
            (false, Ballot::Criteria { values }) => {
                let criteria = criteria_values(&values)?;
                let team = team.ok_or(ValidationError::MissingTeam)?;
                self.ensure_eligible(&team, round, eligible)?;
                let total = criteria
                    .iter()
                    .sum::<u32>()
                    .min((CRITERIA_COUNT as u32) * (MAX_CRITERION_VALUE as u32));

                Ok(Score {
                    team: Some(team),
                    event: event_id,
                    round,
                    judge,
                    criteria: Some(criteria),
                    direct_winners: None,
                    total,
                    finalized: finalize,
                    comment,
                    submitted_at,
                })
            }
            (true, Ballot::DirectWin { first_place }) => {
                let winner = first_place
                    .filter(|team| !team.0.trim().is_empty())
                    .ok_or(ValidationError::MissingWinner)?;
                self.ensure_eligible(&winner, round, eligible)?;

                Ok(Score {
                    team: None,
                    event: event_id,
                    round,
                    judge,
                    criteria: None,
                    direct_winners: Some(DirectWinners {
                        first_place: winner,
                    }),
                    total: DIRECT_WIN_BALLOT,
                    finalized: finalize,
                    comment,
                    submitted_at,
                })
            }
            (direct_win, ballot) => Err(ValidationError::BallotKindMismatch {
                event: event.id.clone(),
                expected: if direct_win { "direct_win" } else { "criteria" },
                found: ballot.label(),
            }),
        }
    }

    fn ensure_eligible(
        &self,
        team: &TeamId,
        round: RoundNumber,
        eligible: &BTreeSet<TeamId>,
    ) -> Result<(), ValidationError> {
        if eligible.contains(team) {
            Ok(())
        } else {
            Err(ValidationError::TeamNotEligible {
                team: team.clone(),
                event: self.event.id.clone(),
                round,
            })
        }
    }
}

fn criteria_values(values: &[i32]) -> Result<[u32; CRITERIA_COUNT], ValidationError> {
    if values.len() != CRITERIA_COUNT {
        return Err(ValidationError::CriteriaCount {
            expected: CRITERIA_COUNT,
            found: values.len(),
        });
    }

    let mut criteria = [0u32; CRITERIA_COUNT];
    for (index, value) in values.iter().copied().enumerate() {
        if !(0..=MAX_CRITERION_VALUE).contains(&value) {
            return Err(ValidationError::CriterionOutOfRange {
                index,
                value,
                max: MAX_CRITERION_VALUE,
            });
        }
        criteria[index] = value as u32;
    }

    Ok(criteria)
}

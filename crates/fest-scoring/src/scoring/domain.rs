use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of judging criteria on every criteria-scored event.
pub const CRITERIA_COUNT: usize = 3;
/// Upper bound for a single criterion value.
pub const MAX_CRITERION_VALUE: i32 = 100;
/// Highest round count an event may be configured with.
pub const MAX_ROUNDS: RoundNumber = 3;
/// Total recorded for a single direct-win ballot.
pub const DIRECT_WIN_BALLOT: u32 = 1;

/// 1-based round index within an event.
pub type RoundNumber = u8;

/// Identifier wrapper for registered teams.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TeamId(pub String);

/// Identifier wrapper for festival events.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub String);

/// Identifier wrapper for judges, already authenticated upstream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JudgeId(pub String);

macro_rules! display_id {
    ($($ty:ty),+) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(&self.0)
            }
        })+
    };
}

display_id!(TeamId, EventId, JudgeId);

/// Registered team together with its per-event trophy awards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub college: String,
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub registered_events: BTreeSet<EventId>,
    /// Sparse: events without an entry have not been scored for this team yet.
    #[serde(default)]
    pub awards: BTreeMap<EventId, i32>,
}

impl Team {
    pub fn is_registered_for(&self, event: &EventId) -> bool {
        self.registered_events.contains(event)
    }

    /// Always derived from the award map, never stored on its own.
    pub fn total_trophy_score(&self) -> i32 {
        self.awards.values().sum()
    }

    /// Overwrites any earlier award for the same event.
    pub fn record_award(&mut self, event: EventId, points: i32) {
        self.awards.insert(event, points);
    }

    pub fn standing(&self) -> TeamStandingView {
        TeamStandingView {
            team: self.id.clone(),
            college: self.college.clone(),
            awards: self.awards.clone(),
            total_trophy_score: self.total_trophy_score(),
        }
    }
}

/// Event definition consumed by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    pub category: String,
    pub rounds: RoundNumber,
    pub is_trophy_event: bool,
    pub is_direct_win: bool,
    #[serde(default)]
    pub criteria: Vec<String>,
    pub judges: Vec<JudgeId>,
    pub head_judge: JudgeId,
}

impl Event {
    pub fn requires_criteria(&self) -> bool {
        self.is_trophy_event && !self.is_direct_win
    }

    pub fn has_judge(&self, judge: &JudgeId) -> bool {
        self.judges.contains(judge)
    }

    pub fn contains_round(&self, round: RoundNumber) -> bool {
        (1..=self.rounds).contains(&round)
    }

    pub fn is_final_round(&self, round: RoundNumber) -> bool {
        round == self.rounds
    }
}

/// Ballot content carried by a judge submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Ballot {
    Criteria {
        values: Vec<i32>,
    },
    DirectWin {
        #[serde(default)]
        first_place: Option<TeamId>,
    },
}

impl Ballot {
    pub const fn label(&self) -> &'static str {
        match self {
            Ballot::Criteria { .. } => "criteria",
            Ballot::DirectWin { .. } => "direct_win",
        }
    }
}

/// Raw judge submission before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSubmission {
    pub judge: JudgeId,
    #[serde(default)]
    pub team: Option<TeamId>,
    pub event: EventId,
    pub round: RoundNumber,
    pub ballot: Ballot,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub finalize: bool,
}

/// Uniqueness key of a score record. Direct-win ballots carry no team.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScoreKey {
    pub event: EventId,
    pub round: RoundNumber,
    pub team: Option<TeamId>,
    pub judge: JudgeId,
}

impl fmt::Display for ScoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let team = self.team.as_ref().map(|team| team.0.as_str()).unwrap_or("-");
        write!(f, "{}/r{}/{}/{}", self.event, self.round, team, self.judge)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectWinners {
    pub first_place: TeamId,
}

/// Normalized score record as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub team: Option<TeamId>,
    pub event: EventId,
    pub round: RoundNumber,
    pub judge: JudgeId,
    pub criteria: Option<[u32; CRITERIA_COUNT]>,
    pub direct_winners: Option<DirectWinners>,
    pub total: u32,
    pub finalized: bool,
    pub comment: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

impl Score {
    pub fn key(&self) -> ScoreKey {
        ScoreKey {
            event: self.event.clone(),
            round: self.round,
            team: self.team.clone(),
            judge: self.judge.clone(),
        }
    }

    /// Team credited by this record: the scored team, or the declared winner.
    pub fn credited_team(&self) -> Option<&TeamId> {
        match &self.direct_winners {
            Some(winners) => Some(&winners.first_place),
            None => self.team.as_ref(),
        }
    }
}

/// Accepted submission plus whether it replaced an earlier draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreReceipt {
    pub score: Score,
    pub replaced_draft: bool,
}

/// One ranked team for an (event, round).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub team: TeamId,
    pub total: u32,
    pub criteria_sums: [u32; CRITERIA_COUNT],
    pub ballots: usize,
}

/// Derived ranking snapshot; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ranking {
    pub event: EventId,
    pub round: RoundNumber,
    pub entries: Vec<RankingEntry>,
    /// Teams assigned to the round without a finalized score.
    pub unscored: Vec<TeamId>,
}

impl Ranking {
    pub fn position(&self, team: &TeamId) -> Option<usize> {
        self.entries.iter().position(|entry| &entry.team == team)
    }

    pub fn leader(&self) -> Option<&TeamId> {
        self.entries.first().map(|entry| &entry.team)
    }

    pub fn teams(&self) -> Vec<TeamId> {
        self.entries.iter().map(|entry| entry.team.clone()).collect()
    }
}

/// Head judge request to advance the top teams of a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionRequest {
    pub head_judge: JudgeId,
    pub count: i64,
}

/// Optional attendance information supplied when finalizing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizeRequest {
    #[serde(default)]
    pub no_shows: BTreeSet<TeamId>,
}

/// Result of finalizing a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinalizeOutcome {
    pub ranking: Ranking,
    pub points_awarded: BTreeMap<TeamId, i32>,
    /// Only the event's last round awards trophy points.
    pub decisive: bool,
}

/// Public view of a team's trophy standing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamStandingView {
    pub team: TeamId,
    pub college: String,
    pub awards: BTreeMap<EventId, i32>,
    pub total_trophy_score: i32,
}

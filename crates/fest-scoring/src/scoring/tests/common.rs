use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use axum::response::Response;
use chrono::{TimeZone, Utc};
use serde_json::Value;

use crate::scoring::domain::{
    Ballot, DirectWinners, Event, EventId, JudgeId, RoundNumber, Score, ScoreSubmission, Team,
    TeamId,
};
use crate::scoring::memory::InMemoryFestivalStore;
use crate::scoring::repository::{RepositoryError, ScoreRepository, TeamRepository};
use crate::scoring::service::ScoringService;
use crate::scoring::trophies::TrophyAwards;

pub(super) type MemoryService =
    ScoringService<InMemoryFestivalStore, InMemoryFestivalStore, InMemoryFestivalStore>;

pub(super) fn event_id(id: &str) -> EventId {
    EventId(id.to_string())
}

pub(super) fn team_id(id: &str) -> TeamId {
    TeamId(id.to_string())
}

pub(super) fn judge(id: &str) -> JudgeId {
    JudgeId(id.to_string())
}

pub(super) fn panel() -> Vec<JudgeId> {
    vec![judge("j1"), judge("j2"), judge("j3")]
}

pub(super) fn criteria_event(id: &str, rounds: RoundNumber) -> Event {
    Event {
        id: event_id(id),
        name: format!("{id} showcase"),
        category: "cultural".to_string(),
        rounds,
        is_trophy_event: true,
        is_direct_win: false,
        criteria: vec![
            "Creativity".to_string(),
            "Execution".to_string(),
            "Presentation".to_string(),
        ],
        judges: panel(),
        head_judge: judge("j1"),
    }
}

pub(super) fn direct_win_event(id: &str) -> Event {
    Event {
        id: event_id(id),
        name: format!("{id} final"),
        category: "sports".to_string(),
        rounds: 1,
        is_trophy_event: true,
        is_direct_win: true,
        criteria: Vec::new(),
        judges: panel(),
        head_judge: judge("j1"),
    }
}

pub(super) fn team(id: &str, events: &[&str]) -> Team {
    Team {
        id: team_id(id),
        college: format!("{id} college"),
        members: vec![format!("{id}-captain"), format!("{id}-member")],
        registered_events: events.iter().map(|event| event_id(event)).collect(),
        awards: Default::default(),
    }
}

pub(super) fn ids(teams: &[&str]) -> Vec<TeamId> {
    teams.iter().map(|team| team_id(team)).collect()
}

pub(super) fn id_set(teams: &[&str]) -> BTreeSet<TeamId> {
    teams.iter().map(|team| team_id(team)).collect()
}

/// Festival with a one-round dance event, a two-round quiz, a direct-win tug of
/// war, and four teams registered for all three.
pub(super) fn festival_store() -> Arc<InMemoryFestivalStore> {
    let store = InMemoryFestivalStore::default();
    store
        .register_event(criteria_event("dance", 1))
        .expect("dance event valid");
    store
        .register_event(criteria_event("quiz", 2))
        .expect("quiz event valid");
    store
        .register_event(direct_win_event("tug"))
        .expect("tug event valid");
    for id in ["t1", "t2", "t3", "t4"] {
        store.register_team(team(id, &["dance", "quiz", "tug"]));
    }
    store.register_team(team("t9", &[]));
    Arc::new(store)
}

pub(super) fn build_service() -> (MemoryService, Arc<InMemoryFestivalStore>) {
    let store = festival_store();
    let service = ScoringService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        TrophyAwards::default(),
    );
    (service, store)
}

pub(super) fn ballot(
    judge_id: &str,
    team: &str,
    event: &str,
    round: RoundNumber,
    values: [i32; 3],
    finalize: bool,
) -> ScoreSubmission {
    ScoreSubmission {
        judge: judge(judge_id),
        team: Some(team_id(team)),
        event: event_id(event),
        round,
        ballot: Ballot::Criteria {
            values: values.to_vec(),
        },
        comment: None,
        finalize,
    }
}

pub(super) fn direct_ballot(judge_id: &str, event: &str, winner: &str) -> ScoreSubmission {
    ScoreSubmission {
        judge: judge(judge_id),
        team: None,
        event: event_id(event),
        round: 1,
        ballot: Ballot::DirectWin {
            first_place: Some(team_id(winner)),
        },
        comment: None,
        finalize: true,
    }
}

/// Every panel judge finalizes the same values for `team`.
pub(super) fn score_by_panel(
    service: &MemoryService,
    event: &str,
    round: RoundNumber,
    team: &str,
    values: [i32; 3],
) {
    for judge_id in ["j1", "j2", "j3"] {
        service
            .submit(ballot(judge_id, team, event, round, values, true))
            .expect("panel ballot accepted");
    }
}

pub(super) fn finalized_score(team: &str, judge_id: &str, criteria: [u32; 3]) -> Score {
    Score {
        team: Some(team_id(team)),
        event: event_id("dance"),
        round: 1,
        judge: judge(judge_id),
        criteria: Some(criteria),
        direct_winners: None,
        total: criteria.iter().sum(),
        finalized: true,
        comment: None,
        submitted_at: Utc
            .with_ymd_and_hms(2025, 2, 14, 10, 0, 0)
            .single()
            .expect("valid timestamp"),
    }
}

pub(super) fn winner_ballot(winner: &str, judge_id: &str) -> Score {
    Score {
        team: None,
        event: event_id("tug"),
        round: 1,
        judge: judge(judge_id),
        criteria: None,
        direct_winners: Some(DirectWinners {
            first_place: team_id(winner),
        }),
        total: 1,
        finalized: true,
        comment: None,
        submitted_at: Utc
            .with_ymd_and_hms(2025, 2, 14, 16, 30, 0)
            .single()
            .expect("valid timestamp"),
    }
}

pub(super) struct UnavailableScores;

impl ScoreRepository for UnavailableScores {
    fn upsert_score(&self, _score: Score) -> Result<Option<Score>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn finalized_for_round(
        &self,
        _event: &EventId,
        _round: RoundNumber,
    ) -> Result<Vec<Score>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn finalized_for_event(&self, _event: &EventId) -> Result<Vec<Score>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn unavailable_service(
) -> ScoringService<UnavailableScores, InMemoryFestivalStore, InMemoryFestivalStore> {
    let store = festival_store();
    ScoringService::new(
        Arc::new(UnavailableScores),
        store.clone(),
        store,
        TrophyAwards::default(),
    )
}

/// Team store whose roster for every event also lists `ghost`, a team it
/// holds no record for, so award writes for that event cannot complete.
pub(super) struct GhostRoster {
    inner: Arc<InMemoryFestivalStore>,
}

impl TeamRepository for GhostRoster {
    fn fetch_team(&self, id: &TeamId) -> Result<Option<Team>, RepositoryError> {
        self.inner.fetch_team(id)
    }

    fn registered_for(&self, event: &EventId) -> Result<Vec<TeamId>, RepositoryError> {
        let mut teams = self.inner.registered_for(event)?;
        teams.push(team_id("ghost"));
        Ok(teams)
    }

    fn apply_awards(
        &self,
        event: &EventId,
        awards: &BTreeMap<TeamId, i32>,
    ) -> Result<Vec<Team>, RepositoryError> {
        self.inner.apply_awards(event, awards)
    }

    fn set_promotions(
        &self,
        event: &EventId,
        round: RoundNumber,
        teams: &[TeamId],
    ) -> Result<(), RepositoryError> {
        self.inner.set_promotions(event, round, teams)
    }

    fn promoted(
        &self,
        event: &EventId,
        round: RoundNumber,
    ) -> Result<Vec<TeamId>, RepositoryError> {
        self.inner.promoted(event, round)
    }

    fn all_teams(&self) -> Result<Vec<Team>, RepositoryError> {
        self.inner.all_teams()
    }
}

pub(super) fn ghost_roster_service() -> (
    ScoringService<InMemoryFestivalStore, GhostRoster, InMemoryFestivalStore>,
    Arc<InMemoryFestivalStore>,
) {
    let store = festival_store();
    let service = ScoringService::new(
        store.clone(),
        Arc::new(GhostRoster {
            inner: store.clone(),
        }),
        store.clone(),
        TrophyAwards::default(),
    );
    (service, store)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use super::domain::{Event, EventId, RoundNumber, Score, ScoreKey, Team, TeamId};
use super::repository::{EventDirectory, RepositoryError, ScoreRepository, TeamRepository};
use super::validation::{validate_event, ValidationError};

/// Festival roster used to populate a store at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FestivalSeed {
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub teams: Vec<Team>,
}

impl FestivalSeed {
    pub fn from_path(path: &Path) -> Result<Self, SeedError> {
        let raw = std::fs::read_to_string(path)?;
        let seed = serde_json::from_str(&raw)?;
        Ok(seed)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("unable to read festival seed: {0}")]
    Io(#[from] std::io::Error),
    #[error("festival seed is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("festival seed rejected: {0}")]
    Invalid(#[from] ValidationError),
}

/// Mutex-backed store implementing every scoring repository seam.
#[derive(Debug, Default)]
pub struct InMemoryFestivalStore {
    scores: Mutex<BTreeMap<ScoreKey, Score>>,
    teams: Mutex<BTreeMap<TeamId, Team>>,
    events: Mutex<BTreeMap<EventId, Event>>,
    promotions: Mutex<BTreeMap<(EventId, RoundNumber), Vec<TeamId>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("store mutex poisoned".to_string()))
}

impl InMemoryFestivalStore {
    pub fn from_seed(seed: FestivalSeed) -> Result<Self, SeedError> {
        let store = Self::default();
        for event in seed.events {
            store.register_event(event)?;
        }
        for team in seed.teams {
            store.register_team(team);
        }
        Ok(store)
    }

    pub fn register_event(&self, event: Event) -> Result<(), ValidationError> {
        validate_event(&event)?;
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(event.id.clone(), event);
        Ok(())
    }

    pub fn register_team(&self, team: Team) {
        self.teams
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(team.id.clone(), team);
    }

    pub fn score_count(&self) -> usize {
        self.scores
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Stored record under `key`, draft or finalized.
    pub fn score(&self, key: &ScoreKey) -> Option<Score> {
        self.scores
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

impl ScoreRepository for InMemoryFestivalStore {
    fn upsert_score(&self, score: Score) -> Result<Option<Score>, RepositoryError> {
        let mut scores = lock(&self.scores)?;
        let key = score.key();
        if let Some(existing) = scores.get(&key) {
            if existing.finalized {
                return Err(RepositoryError::Locked(key));
            }
        }
        Ok(scores.insert(key, score))
    }

    fn finalized_for_round(
        &self,
        event: &EventId,
        round: RoundNumber,
    ) -> Result<Vec<Score>, RepositoryError> {
        Ok(lock(&self.scores)?
            .values()
            .filter(|score| score.finalized && &score.event == event && score.round == round)
            .cloned()
            .collect())
    }

    fn finalized_for_event(&self, event: &EventId) -> Result<Vec<Score>, RepositoryError> {
        Ok(lock(&self.scores)?
            .values()
            .filter(|score| score.finalized && &score.event == event)
            .cloned()
            .collect())
    }
}

impl TeamRepository for InMemoryFestivalStore {
    fn fetch_team(&self, id: &TeamId) -> Result<Option<Team>, RepositoryError> {
        Ok(lock(&self.teams)?.get(id).cloned())
    }

    fn registered_for(&self, event: &EventId) -> Result<Vec<TeamId>, RepositoryError> {
        Ok(lock(&self.teams)?
            .values()
            .filter(|team| team.is_registered_for(event))
            .map(|team| team.id.clone())
            .collect())
    }

    fn apply_awards(
        &self,
        event: &EventId,
        awards: &BTreeMap<TeamId, i32>,
    ) -> Result<Vec<Team>, RepositoryError> {
        let mut teams = lock(&self.teams)?;
        if let Some(missing) = awards.keys().find(|team| !teams.contains_key(*team)) {
            return Err(RepositoryError::NotFound(format!("team {missing}")));
        }

        let mut updated = Vec::with_capacity(awards.len());
        for (team, points) in awards {
            if let Some(record) = teams.get_mut(team) {
                record.record_award(event.clone(), *points);
                updated.push(record.clone());
            }
        }
        Ok(updated)
    }

    fn set_promotions(
        &self,
        event: &EventId,
        round: RoundNumber,
        teams: &[TeamId],
    ) -> Result<(), RepositoryError> {
        lock(&self.promotions)?.insert((event.clone(), round), teams.to_vec());
        Ok(())
    }

    fn promoted(
        &self,
        event: &EventId,
        round: RoundNumber,
    ) -> Result<Vec<TeamId>, RepositoryError> {
        Ok(lock(&self.promotions)?
            .get(&(event.clone(), round))
            .cloned()
            .unwrap_or_default())
    }

    fn all_teams(&self) -> Result<Vec<Team>, RepositoryError> {
        Ok(lock(&self.teams)?.values().cloned().collect())
    }
}

impl EventDirectory for InMemoryFestivalStore {
    fn fetch_event(&self, id: &EventId) -> Result<Option<Event>, RepositoryError> {
        Ok(lock(&self.events)?.get(id).cloned())
    }
}

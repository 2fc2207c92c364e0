use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::domain::{Event, Ranking, TeamId};

/// Fixed point table applied when an event is finalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrophyAwards {
    pub winner: i32,
    pub runner_up: i32,
    pub participation: i32,
    pub no_show: i32,
}

impl Default for TrophyAwards {
    fn default() -> Self {
        Self {
            winner: 100,
            runner_up: 50,
            participation: 10,
            no_show: -5,
        }
    }
}

impl TrophyAwards {
    pub fn for_rank(&self, rank: usize) -> i32 {
        match rank {
            0 => self.winner,
            1 => self.runner_up,
            _ => self.participation,
        }
    }
}

/// Converts a decisive ranking into per-team trophy points.
#[derive(Debug, Clone, Default)]
pub struct TrophyNormalizer {
    awards: TrophyAwards,
}

impl TrophyNormalizer {
    pub fn new(awards: TrophyAwards) -> Self {
        Self { awards }
    }

    pub fn awards(&self) -> &TrophyAwards {
        &self.awards
    }

    /// Points for every registered team of `event`.
    ///
    /// `participated` holds the teams that showed up: for criteria events the
    /// teams with a finalized score in any round, for direct-win events the
    /// registered teams not reported as no-shows. Unregistered teams never
    /// get an entry, and non-trophy events yield an empty map.
    pub fn normalize(
        &self,
        event: &Event,
        ranking: &Ranking,
        registered: &[TeamId],
        participated: &BTreeSet<TeamId>,
    ) -> BTreeMap<TeamId, i32> {
        let mut points = BTreeMap::new();
        if !event.is_trophy_event {
            return points;
        }

        for team in registered {
            let awarded = if event.is_direct_win {
                if ranking.leader() == Some(team) {
                    self.awards.winner
                } else if participated.contains(team) {
                    self.awards.participation
                } else {
                    self.awards.no_show
                }
            } else {
                match ranking.position(team) {
                    Some(rank) => self.awards.for_rank(rank),
                    // Knocked out in an earlier round.
                    None if participated.contains(team) => self.awards.participation,
                    None => self.awards.no_show,
                }
            };
            points.insert(team.clone(), awarded);
        }

        points
    }
}

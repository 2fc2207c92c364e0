use std::cmp::Ordering;
use std::collections::HashMap;

use super::domain::{
    Event, Ranking, RankingEntry, RoundNumber, Score, TeamId, CRITERIA_COUNT,
};
use super::error::ScoringError;

/// Builds the ranking for one (event, round) from its finalized scores.
///
/// Judge totals are summed, not averaged, so a team seen by more judges
/// accumulates more. `assigned` lists the teams expected in the round;
/// for criteria events those without a finalized score land in
/// `Ranking::unscored`.
///
/// Teams tied on total and all three criterion sums keep the order in which
/// they first appear in `scores`.
pub fn rank_round(
    event: &Event,
    round: RoundNumber,
    scores: &[Score],
    assigned: &[TeamId],
) -> Result<Ranking, ScoringError> {
    let finalized = scores
        .iter()
        .filter(|score| score.finalized && score.event == event.id && score.round == round);

    let mut entries: Vec<RankingEntry> = Vec::new();
    let mut index: HashMap<TeamId, usize> = HashMap::new();

    for score in finalized {
        let Some(team) = score.credited_team() else {
            continue;
        };

        let slot = *index.entry(team.clone()).or_insert_with(|| {
            entries.push(RankingEntry {
                team: team.clone(),
                total: 0,
                criteria_sums: [0; CRITERIA_COUNT],
                ballots: 0,
            });
            entries.len() - 1
        });

        let entry = &mut entries[slot];
        entry.total += score.total;
        entry.ballots += 1;
        if let Some(criteria) = score.criteria {
            for (sum, value) in entry.criteria_sums.iter_mut().zip(criteria) {
                *sum += value;
            }
        }
    }

    if entries.is_empty() {
        return Err(ScoringError::IncompleteRound {
            event: event.id.clone(),
            round,
        });
    }

    // `sort_by` is stable, which keeps fully tied teams in input order.
    entries.sort_by(compare_entries);

    // Direct-win ballots name only the winner, so losing teams are not unscored.
    let unscored = if event.is_direct_win {
        Vec::new()
    } else {
        assigned
            .iter()
            .filter(|team| !index.contains_key(*team))
            .cloned()
            .collect()
    };

    Ok(Ranking {
        event: event.id.clone(),
        round,
        entries,
        unscored,
    })
}

fn compare_entries(a: &RankingEntry, b: &RankingEntry) -> Ordering {
    b.total
        .cmp(&a.total)
        .then_with(|| b.criteria_sums[0].cmp(&a.criteria_sums[0]))
        .then_with(|| b.criteria_sums[1].cmp(&a.criteria_sums[1]))
        .then_with(|| b.criteria_sums[2].cmp(&a.criteria_sums[2]))
}

use crate::infra::{build_service, store_from_seed, FestivalService};
use clap::Args;
use fest_scoring::error::AppError;
use fest_scoring::scoring::domain::CRITERIA_COUNT;
use fest_scoring::scoring::{
    Ballot, Event, FestivalSeed, FinalizeOutcome, FinalizeRequest, PromotionRequest, Ranking,
    RoundNumber, ScoreSubmission, SeedError, TeamId, TeamStandingView, TrophyAwards,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

const SAMPLE_FESTIVAL: &str = include_str!("../../../crates/fest-scoring/fixtures/festival.json");

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Festival seed to replay. Defaults to the bundled sample festival.
    #[arg(long)]
    pub(crate) seed: Option<PathBuf>,
    /// Teams promoted out of each elimination round.
    #[arg(long, default_value_t = 2)]
    pub(crate) promote: i64,
    /// Print the final summary as JSON instead of text.
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Debug, Serialize)]
struct DemoSummary {
    events: Vec<EventSummary>,
    leaderboard: Vec<TeamStandingView>,
}

#[derive(Debug, Serialize)]
struct EventSummary {
    event: String,
    rounds: Vec<FinalizeOutcome>,
    /// Teams advanced into each later round.
    promoted: BTreeMap<RoundNumber, Vec<TeamId>>,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        seed,
        promote,
        json,
    } = args;

    let seed = match seed {
        Some(path) => FestivalSeed::from_path(&path)?,
        None => serde_json::from_str(SAMPLE_FESTIVAL).map_err(SeedError::from)?,
    };
    let events = seed.events.clone();
    let service = build_service(store_from_seed(seed)?, TrophyAwards::default());

    let mut summary = DemoSummary {
        events: Vec::with_capacity(events.len()),
        leaderboard: Vec::new(),
    };
    for event in &events {
        summary.events.push(replay_event(&service, event, promote)?);
    }
    summary.leaderboard = service.leaderboard()?;

    if json {
        let rendered = serde_json::to_string_pretty(&summary).map_err(std::io::Error::from)?;
        println!("{rendered}");
    } else {
        render_summary(&summary);
    }

    Ok(())
}

/// Judges every round of `event` with synthetic ballots and finalizes it.
fn replay_event(
    service: &FestivalService,
    event: &Event,
    promote: i64,
) -> Result<EventSummary, AppError> {
    let mut rounds = Vec::with_capacity(usize::from(event.rounds));
    let mut promoted = BTreeMap::new();

    for round in 1..=event.rounds {
        let teams = service.promoted(&event.id, round)?;
        if teams.is_empty() {
            break;
        }

        if event.is_direct_win {
            let winner = teams[event.name.len() % teams.len()].clone();
            service.submit(ScoreSubmission {
                judge: event.head_judge.clone(),
                team: None,
                event: event.id.clone(),
                round,
                ballot: Ballot::DirectWin {
                    first_place: Some(winner),
                },
                comment: None,
                finalize: true,
            })?;
        } else {
            for (team_index, team) in teams.iter().enumerate() {
                for (judge_index, judge) in event.judges.iter().enumerate() {
                    service.submit(ScoreSubmission {
                        judge: judge.clone(),
                        team: Some(team.clone()),
                        event: event.id.clone(),
                        round,
                        ballot: Ballot::Criteria {
                            values: synthetic_values(team_index, judge_index, round),
                        },
                        comment: None,
                        finalize: true,
                    })?;
                }
            }
        }

        let outcome = service.finalize(&event.id, round, FinalizeRequest::default())?;
        if !outcome.decisive {
            let count = promote.min(outcome.ranking.entries.len() as i64);
            let advancing = service.promote(
                &event.id,
                round,
                PromotionRequest {
                    head_judge: event.head_judge.clone(),
                    count,
                },
            )?;
            promoted.insert(round + 1, advancing);
        }
        rounds.push(outcome);
    }

    Ok(EventSummary {
        event: event.name.clone(),
        rounds,
        promoted,
    })
}

fn synthetic_values(team_index: usize, judge_index: usize, round: RoundNumber) -> Vec<i32> {
    (0..CRITERIA_COUNT)
        .map(|criterion| {
            let spread =
                team_index * 17 + judge_index * 7 + criterion * 11 + usize::from(round) * 5;
            40 + (spread % 60) as i32
        })
        .collect()
}

fn render_summary(summary: &DemoSummary) {
    println!("Festival scoring demo");
    for event in &summary.events {
        println!("\n{}", event.event);
        for outcome in &event.rounds {
            render_ranking(&outcome.ranking);
            if let Some(teams) = event.promoted.get(&(outcome.ranking.round + 1)) {
                println!("    promoted to round {}: {}", outcome.ranking.round + 1, join(teams));
            }
            if outcome.decisive {
                for (team, points) in &outcome.points_awarded {
                    println!("    {team:<16} {points:>+5} pts");
                }
            }
        }
    }

    println!("\nOverall leaderboard");
    for (position, standing) in summary.leaderboard.iter().enumerate() {
        println!(
            "  {:>2}. {:<16} {:<28} {:>5}",
            position + 1,
            standing.team,
            standing.college,
            standing.total_trophy_score
        );
    }
}

fn render_ranking(ranking: &Ranking) {
    println!("  Round {}", ranking.round);
    for (position, entry) in ranking.entries.iter().enumerate() {
        println!(
            "    {:>2}. {:<16} total {:>4} across {} ballot(s)",
            position + 1,
            entry.team,
            entry.total,
            entry.ballots
        );
    }
    if !ranking.unscored.is_empty() {
        println!("    unscored: {}", join(&ranking.unscored));
    }
}

fn join(teams: &[TeamId]) -> String {
    teams
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

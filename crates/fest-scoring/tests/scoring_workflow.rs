//! End-to-end scenarios for a festival day driven through the public service facade and
//! router: concurrent judging, promotion between rounds, and trophy standings.

mod common {
    use std::path::PathBuf;
    use std::sync::Arc;

    use fest_scoring::scoring::{
        Ballot, EventId, FestivalSeed, InMemoryFestivalStore, JudgeId, RoundNumber,
        ScoreSubmission, ScoringService, TeamId, TrophyAwards,
    };

    pub(super) type FestivalService =
        ScoringService<InMemoryFestivalStore, InMemoryFestivalStore, InMemoryFestivalStore>;

    pub(super) fn seed_path() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/festival.json")
    }

    pub(super) fn festival() -> (Arc<FestivalService>, Arc<InMemoryFestivalStore>) {
        let seed = FestivalSeed::from_path(&seed_path()).expect("fixture seed loads");
        let store = Arc::new(InMemoryFestivalStore::from_seed(seed).expect("fixture seed valid"));
        let service = ScoringService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            TrophyAwards::default(),
        );
        (Arc::new(service), store)
    }

    pub(super) fn event(id: &str) -> EventId {
        EventId(id.to_string())
    }

    pub(super) fn team(id: &str) -> TeamId {
        TeamId(id.to_string())
    }

    pub(super) fn criteria(
        judge: &str,
        team_id: &str,
        event_id: &str,
        round: RoundNumber,
        values: [i32; 3],
    ) -> ScoreSubmission {
        ScoreSubmission {
            judge: JudgeId(judge.to_string()),
            team: Some(team(team_id)),
            event: event(event_id),
            round,
            ballot: Ballot::Criteria {
                values: values.to_vec(),
            },
            comment: Some(format!("{judge} on {team_id}")),
            finalize: true,
        }
    }

    pub(super) fn direct_win(judge: &str, event_id: &str, winner: &str) -> ScoreSubmission {
        ScoreSubmission {
            judge: JudgeId(judge.to_string()),
            team: None,
            event: event(event_id),
            round: 1,
            ballot: Ballot::DirectWin {
                first_place: Some(team(winner)),
            },
            comment: None,
            finalize: true,
        }
    }
}

use std::thread;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::*;
use fest_scoring::scoring::{
    scoring_router, FinalizeRequest, JudgeId, PromotionRequest, ScoreRepository, ScoringError,
    TeamRepository,
};
use serde_json::Value;
use tower::ServiceExt;

#[test]
fn concurrent_panels_produce_one_record_per_key() {
    let (service, store) = festival();
    let teams = [
        ("north-star", [80, 85, 90]),
        ("river-side", [70, 75, 80]),
        ("hill-crest", [90, 90, 90]),
    ];

    thread::scope(|scope| {
        for judge in ["meera", "arjun", "lina"] {
            let service = &service;
            scope.spawn(move || {
                for (team_id, values) in teams {
                    let mut draft = criteria(judge, team_id, "street-dance", 1, [10, 10, 10]);
                    draft.finalize = false;
                    service.submit(draft).expect("draft accepted");
                    service
                        .submit(criteria(judge, team_id, "street-dance", 1, values))
                        .expect("final ballot accepted");
                }
            });
        }
    });

    assert_eq!(store.score_count(), 9);
    let finalized = store
        .finalized_for_round(&event("street-dance"), 1)
        .expect("scores listed");
    assert_eq!(finalized.len(), 9);

    let ranking = service
        .ranking(&event("street-dance"), 1)
        .expect("ranking builds");
    let order: Vec<_> = ranking.entries.iter().map(|entry| entry.team.0.as_str()).collect();
    assert_eq!(order, vec!["hill-crest", "north-star", "river-side"]);
    assert_eq!(ranking.entries[0].total, 810);
    assert_eq!(ranking.entries[0].ballots, 3);
}

#[test]
fn festival_day_produces_expected_leaderboard() {
    let (service, store) = festival();

    for (team_id, values) in [
        ("north-star", [80, 85, 90]),
        ("river-side", [70, 75, 80]),
        ("hill-crest", [90, 90, 90]),
    ] {
        for judge in ["meera", "arjun", "lina"] {
            service
                .submit(criteria(judge, team_id, "street-dance", 1, values))
                .expect("dance ballot accepted");
        }
    }

    for (team_id, values) in [
        ("north-star", [60, 60, 60]),
        ("river-side", [90, 80, 70]),
        ("hill-crest", [50, 50, 50]),
        ("bay-view", [85, 85, 85]),
    ] {
        for judge in ["rahul", "sana"] {
            service
                .submit(criteria(judge, team_id, "tech-quiz", 1, values))
                .expect("quiz ballot accepted");
        }
    }

    let promoted = service
        .promote(
            &event("tech-quiz"),
            1,
            PromotionRequest {
                head_judge: JudgeId("rahul".to_string()),
                count: 2,
            },
        )
        .expect("promotion succeeds");
    assert_eq!(promoted, vec![team("bay-view"), team("river-side")]);

    let eliminated = service.submit(criteria("sana", "north-star", "tech-quiz", 2, [99, 99, 99]));
    assert!(matches!(eliminated, Err(ScoringError::Validation(_))));

    for (team_id, values) in [("river-side", [95, 95, 95]), ("bay-view", [70, 70, 70])] {
        for judge in ["rahul", "sana"] {
            service
                .submit(criteria(judge, team_id, "tech-quiz", 2, values))
                .expect("finals ballot accepted");
        }
    }
    service
        .submit(direct_win("referee", "tug-of-war", "river-side"))
        .expect("tug ballot accepted");

    let quiz = service
        .finalize(&event("tech-quiz"), 2, FinalizeRequest::default())
        .expect("quiz finalizes");
    assert_eq!(quiz.points_awarded[&team("river-side")], 100);
    assert_eq!(quiz.points_awarded[&team("bay-view")], 50);
    assert_eq!(quiz.points_awarded[&team("north-star")], 10);
    assert_eq!(quiz.points_awarded[&team("hill-crest")], 10);

    // Both remaining events credit river-side; neither write may clobber the other.
    thread::scope(|scope| {
        let dance = scope.spawn(|| {
            service.finalize(&event("street-dance"), 1, FinalizeRequest::default())
        });
        let tug = scope.spawn(|| {
            service.finalize(
                &event("tug-of-war"),
                1,
                FinalizeRequest {
                    no_shows: [team("bay-view")].into_iter().collect(),
                },
            )
        });
        dance
            .join()
            .expect("dance thread")
            .expect("dance finalizes");
        tug.join().expect("tug thread").expect("tug finalizes");
    });

    let river = store
        .fetch_team(&team("river-side"))
        .expect("fetch team")
        .expect("team present");
    assert_eq!(river.awards.len(), 3);
    assert_eq!(river.total_trophy_score(), 210);

    let board = service.leaderboard().expect("leaderboard");
    let summary: Vec<_> = board
        .iter()
        .map(|view| (view.team.0.as_str(), view.total_trophy_score))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("river-side", 210),
            ("hill-crest", 110),
            ("north-star", 70),
            ("bay-view", 45),
        ]
    );
}

#[tokio::test]
async fn standings_are_served_over_http() {
    let (service, _) = festival();
    service
        .submit(direct_win("referee", "tug-of-war", "north-star"))
        .expect("tug ballot accepted");
    service
        .finalize(&event("tug-of-war"), 1, FinalizeRequest::default())
        .expect("tug finalizes");

    let response = scoring_router(service)
        .oneshot(
            Request::get("/api/v1/teams/north-star")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    let payload: Value = serde_json::from_slice(&body).expect("json payload");
    assert_eq!(payload["college"], Value::from("North Star Institute"));
    assert_eq!(payload["awards"]["tug-of-war"].as_i64(), Some(100));
    assert_eq!(payload["total_trophy_score"].as_i64(), Some(100));
}

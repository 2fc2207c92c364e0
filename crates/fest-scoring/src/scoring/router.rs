use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use super::domain::{
    EventId, FinalizeRequest, PromotionRequest, RoundNumber, ScoreSubmission, TeamId,
};
use super::error::ScoringError;
use super::repository::{EventDirectory, RepositoryError, ScoreRepository, TeamRepository};
use super::service::ScoringService;
use super::validation::ValidationError;

type SharedService<S, T, E> = Arc<ScoringService<S, T, E>>;

/// Router builder exposing the judging, promotion and standings endpoints.
pub fn scoring_router<S, T, E>(service: SharedService<S, T, E>) -> Router
where
    S: ScoreRepository + 'static,
    T: TeamRepository + 'static,
    E: EventDirectory + 'static,
{
    Router::new()
        .route("/api/v1/scores", post(submit_handler::<S, T, E>))
        .route(
            "/api/v1/events/:event_id/rounds/:round/ranking",
            get(ranking_handler::<S, T, E>),
        )
        .route(
            "/api/v1/events/:event_id/rounds/:round/promotions",
            post(promote_handler::<S, T, E>).get(promoted_handler::<S, T, E>),
        )
        .route(
            "/api/v1/events/:event_id/rounds/:round/finalize",
            post(finalize_handler::<S, T, E>),
        )
        .route("/api/v1/teams/:team_id", get(standing_handler::<S, T, E>))
        .route("/api/v1/leaderboard", get(leaderboard_handler::<S, T, E>))
        .with_state(service)
}

/// HTTP status for each scoring failure.
pub fn status_for(error: &ScoringError) -> StatusCode {
    match error {
        ScoringError::Validation(ValidationError::UnknownEvent(_))
        | ScoringError::Validation(ValidationError::UnknownTeam(_)) => StatusCode::NOT_FOUND,
        ScoringError::Validation(_)
        | ScoringError::TerminalRound { .. }
        | ScoringError::InvalidCount { .. }
        | ScoringError::NonPositiveCount(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ScoringError::AlreadyFinalized(_) | ScoringError::IncompleteRound { .. } => {
            StatusCode::CONFLICT
        }
        ScoringError::NotHeadJudge { .. } => StatusCode::FORBIDDEN,
        ScoringError::Storage(RepositoryError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
        ScoringError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) fn error_response(error: ScoringError) -> Response {
    let status = status_for(&error);
    let payload = json!({
        "error": error.to_string(),
        "retryable": error.is_retryable(),
    });
    (status, Json(payload)).into_response()
}

pub(crate) async fn submit_handler<S, T, E>(
    State(service): State<SharedService<S, T, E>>,
    Json(submission): Json<ScoreSubmission>,
) -> Response
where
    S: ScoreRepository + 'static,
    T: TeamRepository + 'static,
    E: EventDirectory + 'static,
{
    match service.submit(submission) {
        Ok(receipt) => {
            let status = if receipt.replaced_draft {
                StatusCode::OK
            } else {
                StatusCode::CREATED
            };
            (status, Json(receipt)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn ranking_handler<S, T, E>(
    State(service): State<SharedService<S, T, E>>,
    Path((event_id, round)): Path<(String, RoundNumber)>,
) -> Response
where
    S: ScoreRepository + 'static,
    T: TeamRepository + 'static,
    E: EventDirectory + 'static,
{
    match service.ranking(&EventId(event_id), round) {
        Ok(ranking) => (StatusCode::OK, Json(ranking)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn promote_handler<S, T, E>(
    State(service): State<SharedService<S, T, E>>,
    Path((event_id, round)): Path<(String, RoundNumber)>,
    Json(request): Json<PromotionRequest>,
) -> Response
where
    S: ScoreRepository + 'static,
    T: TeamRepository + 'static,
    E: EventDirectory + 'static,
{
    match service.promote(&EventId(event_id), round, request) {
        Ok(promoted) => (
            StatusCode::OK,
            Json(json!({ "next_round": round + 1, "promoted": promoted })),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn promoted_handler<S, T, E>(
    State(service): State<SharedService<S, T, E>>,
    Path((event_id, round)): Path<(String, RoundNumber)>,
) -> Response
where
    S: ScoreRepository + 'static,
    T: TeamRepository + 'static,
    E: EventDirectory + 'static,
{
    match service.promoted(&EventId(event_id), round) {
        Ok(teams) => {
            (StatusCode::OK, Json(json!({ "round": round, "teams": teams }))).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn finalize_handler<S, T, E>(
    State(service): State<SharedService<S, T, E>>,
    Path((event_id, round)): Path<(String, RoundNumber)>,
    request: Option<Json<FinalizeRequest>>,
) -> Response
where
    S: ScoreRepository + 'static,
    T: TeamRepository + 'static,
    E: EventDirectory + 'static,
{
    let request = request.map(|Json(request)| request).unwrap_or_default();
    match service.finalize(&EventId(event_id), round, request) {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn standing_handler<S, T, E>(
    State(service): State<SharedService<S, T, E>>,
    Path(team_id): Path<String>,
) -> Response
where
    S: ScoreRepository + 'static,
    T: TeamRepository + 'static,
    E: EventDirectory + 'static,
{
    match service.standing(&TeamId(team_id)) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn leaderboard_handler<S, T, E>(
    State(service): State<SharedService<S, T, E>>,
) -> Response
where
    S: ScoreRepository + 'static,
    T: TeamRepository + 'static,
    E: EventDirectory + 'static,
{
    match service.leaderboard() {
        Ok(standings) => (StatusCode::OK, Json(standings)).into_response(),
        Err(error) => error_response(error),
    }
}

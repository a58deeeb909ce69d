use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use std::sync::Arc;

use super::{AppState, TeamSearchParams, error_response};
use crate::api::models::{MatchResponse, TeamDetailResponse, TeamResponse};

pub async fn get_teams(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let service = state.service.lock().await;
    let teams: Vec<TeamResponse> = service.engine().teams().iter().map(TeamResponse::from).collect();
    Json(teams).into_response()
}

pub async fn search_team(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TeamSearchParams>,
) -> impl IntoResponse {
    let Some(name) = params.name.filter(|n| !n.trim().is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "Missing name parameter");
    };

    let service = state.service.lock().await;
    let engine = service.engine();

    match engine.get_team_by_name(&name) {
        Some(team) => Json(TeamDetailResponse {
            team: team.into(),
            matches: engine
                .get_team_matches(team.team_id)
                .iter()
                .map(MatchResponse::from)
                .collect(),
        })
        .into_response(),
        None => error_response(StatusCode::NOT_FOUND, format!("Team '{}' not found", name)),
    }
}

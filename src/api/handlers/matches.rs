use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use std::sync::Arc;

use super::{AppState, MatchParams, NextStageParams, error_response, principal, service_error};
use crate::api::models::{MatchResponse, ResultRequest};
use crate::domain::{MatchId, Stage};

pub async fn get_matches(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MatchParams>,
) -> impl IntoResponse {
    let stage = match params.stage.as_deref().map(str::parse::<Stage>).transpose() {
        Ok(stage) => stage,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };

    let service = state.service.lock().await;
    let engine = service.engine();
    let matches: Vec<MatchResponse> = match stage {
        Some(stage) => engine.get_matches_by_stage(stage).iter().map(MatchResponse::from).collect(),
        None => engine.matches().iter().map(MatchResponse::from).collect(),
    };
    Json(matches).into_response()
}

pub async fn get_match(
    State(state): State<Arc<AppState>>,
    Path(match_id): Path<MatchId>,
) -> impl IntoResponse {
    let service = state.service.lock().await;
    match service.engine().get_match_by_id(match_id) {
        Some(m) => Json(MatchResponse::from(m)).into_response(),
        None => error_response(StatusCode::NOT_FOUND, format!("Match {} not found", match_id)),
    }
}

pub async fn post_result(
    State(state): State<Arc<AppState>>,
    Path(match_id): Path<MatchId>,
    headers: HeaderMap,
    Json(request): Json<ResultRequest>,
) -> impl IntoResponse {
    let caller = principal(&headers, &state.config);

    let mut service = state.service.lock().await;
    match service.record_result(
        &caller,
        match_id,
        request.team1_score,
        request.team2_score,
        request.winner_id,
    ) {
        Ok(updated) => Json(MatchResponse::from(&updated)).into_response(),
        Err(e) => service_error(e),
    }
}

pub async fn post_next_stage(
    State(state): State<Arc<AppState>>,
    Query(params): Query<NextStageParams>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let caller = principal(&headers, &state.config);

    let mut service = state.service.lock().await;
    match service.advance_stage(&caller, params.parallel_matches.unwrap_or(1)) {
        Ok(generated) => (
            StatusCode::CREATED,
            Json(generated.iter().map(MatchResponse::from).collect::<Vec<_>>()),
        )
            .into_response(),
        Err(e) => service_error(e),
    }
}

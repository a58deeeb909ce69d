use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json},
};
use std::sync::Arc;

use super::{AppState, StandingsParams};
use crate::api::models::StandingResponse;

pub async fn get_standings(
    State(state): State<Arc<AppState>>,
    Query(params): Query<StandingsParams>,
) -> impl IntoResponse {
    let group = params.group.map(|g| g.trim().to_uppercase());

    let service = state.service.lock().await;
    let ranked = service.engine().get_group_standings(group.as_deref());
    Json(StandingResponse::ranked(&ranked)).into_response()
}

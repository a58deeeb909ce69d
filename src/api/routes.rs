use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::api::handlers::{
    AppState,
    commands::post_command,
    matches::{get_match, get_matches, post_next_stage, post_result},
    standings::get_standings,
    teams::{get_teams, search_team},
};

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/teams", get(get_teams))
        .route("/api/teams/search", get(search_team))
        .route("/api/standings", get(get_standings))
        .route("/api/matches", get(get_matches))
        .route("/api/matches/:id", get(get_match))
        .route("/api/matches/:id/result", post(post_result))
        .route("/api/stages/next", post(post_next_stage))
        .route("/api/commands", post(post_command))
        .with_state(state)
}

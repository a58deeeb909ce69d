use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Json},
};
use std::sync::Arc;

use super::{AppState, principal, service_error};
use crate::api::models::{CommandRequest, CommandResponse};

pub async fn post_command(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<CommandRequest>,
) -> impl IntoResponse {
    let caller = principal(&headers, &state.config);

    let mut service = state.service.lock().await;
    let interpretation = service.interpret(&request.text);
    log::debug!(
        "Command {:?} read as {} ({:.0}%)",
        request.text,
        interpretation.action.as_str(),
        interpretation.confidence * 100.0
    );

    match service.execute(&caller, &interpretation) {
        Ok(outcome) => Json(CommandResponse {
            outcome: (&outcome).into(),
            interpretation,
        })
        .into_response(),
        Err(e) => service_error(e),
    }
}

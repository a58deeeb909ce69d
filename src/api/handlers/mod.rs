use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::access::Principal;
use crate::api::models::ErrorResponse;
use crate::config::AppConfig;
use crate::errors::{AccessError, EngineError};
use crate::services::TournamentService;

pub mod commands;
pub mod matches;
pub mod standings;
pub mod teams;

/// One tournament per server. The mutex keeps requests from interleaving
/// inside the engine.
pub struct AppState {
    pub service: Mutex<TournamentService>,
    pub config: AppConfig,
}

#[derive(Deserialize)]
pub struct TeamSearchParams {
    pub name: Option<String>,
}

#[derive(Deserialize)]
pub struct StandingsParams {
    pub group: Option<String>,
}

#[derive(Deserialize)]
pub struct MatchParams {
    pub stage: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextStageParams {
    pub parallel_matches: Option<usize>,
}

/// Admin when the request carries `Authorization: Bearer <ADMIN_TOKEN>`.
pub fn principal(headers: &HeaderMap, config: &AppConfig) -> Principal {
    let token = headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));
    Principal::from_bearer(token, config.admin_token.as_deref())
}

pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// Map a service failure to a status code by the error it carries.
pub fn service_error(e: anyhow::Error) -> Response {
    let status = if let Some(engine_error) = e.downcast_ref::<EngineError>() {
        match engine_error {
            EngineError::MatchNotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_REQUEST,
        }
    } else if e.downcast_ref::<AccessError>().is_some() {
        StatusCode::FORBIDDEN
    } else if e
        .chain()
        .any(|cause| cause.is::<rusqlite::Error>() || cause.is::<std::io::Error>())
    {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::BAD_REQUEST
    };

    if status == StatusCode::INTERNAL_SERVER_ERROR {
        log::error!("Request failed: {:?}", e);
    }
    error_response(status, format!("{:#}", e))
}

use anyhow::Context as _;
use thiserror::Error;

use crate::domain::MatchId;

/// Failures raised by the tournament engine itself. Nothing is mutated when one
/// of these is returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("Match {0} not found")]
    MatchNotFound(MatchId),

    #[error("Invalid group partition: {0}")]
    InvalidPartition(String),

    #[error("Unknown stage: {0}")]
    UnknownStage(String),

    #[error("Unknown match status: {0}")]
    UnknownStatus(String),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("Invalid score {score} for match {match_id}, expected 0 to {max}")]
    InvalidScore { match_id: MatchId, score: i32, max: i32 },
}

/// Role checks performed by the service layer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccessError {
    #[error("{role} is not allowed to {action}")]
    Forbidden { role: String, action: String },
}

/// Add context to roster errors
pub fn roster_context(path: &str) -> String {
    format!("Failed to read team roster from: {}", path)
}

/// Add context to persistence errors
pub fn storage_context(operation: &str, table: &str) -> String {
    format!("Failed to {} table: {}", operation, table)
}

/// Wrap result with roster context
pub fn with_roster_context<T, E>(result: Result<T, E>, path: &str) -> anyhow::Result<T>
where
    E: std::error::Error + Send + Sync + 'static,
{
    result.context(roster_context(path))
}

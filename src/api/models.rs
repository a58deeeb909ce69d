use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::commands::Interpretation;
use crate::domain::{Match, Team, TeamId, TeamStanding};
use crate::services::CommandOutcome;

const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

fn format_time(time: Option<NaiveDateTime>) -> Option<String> {
    time.map(|t| t.format(TIME_FORMAT).to_string())
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TeamResponse {
    pub team_id: TeamId,
    pub team_name: String,
    pub participants: Vec<String>,
    pub group: Option<String>,
}

impl From<&Team> for TeamResponse {
    fn from(team: &Team) -> Self {
        Self {
            team_id: team.team_id,
            team_name: team.team_name.clone(),
            participants: team.participants.clone(),
            group: team.group.clone(),
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct MatchResponse {
    pub match_id: i64,
    pub team1_id: TeamId,
    pub team1_name: String,
    pub team2_id: TeamId,
    pub team2_name: String,
    pub stage: String,
    pub group: Option<String>,
    pub scheduled_time: Option<String>,
    pub end_time: Option<String>,
    pub team1_score: i32,
    pub team2_score: i32,
    pub winner_id: Option<TeamId>,
    pub winner_name: Option<String>,
    pub status: String,
    pub summary: String,
}

impl From<&Match> for MatchResponse {
    fn from(m: &Match) -> Self {
        Self {
            match_id: m.match_id,
            team1_id: m.team1_id,
            team1_name: m.team1_name.clone(),
            team2_id: m.team2_id,
            team2_name: m.team2_name.clone(),
            stage: m.stage.as_str().to_string(),
            group: m.group.clone(),
            scheduled_time: format_time(m.scheduled_time),
            end_time: format_time(m.end_time),
            team1_score: m.team1_score,
            team2_score: m.team2_score,
            winner_id: m.winner_id,
            winner_name: m.winner_name.clone(),
            status: m.status.as_str().to_string(),
            summary: m.summary(),
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct StandingResponse {
    pub rank: usize,
    pub team_id: TeamId,
    pub team_name: String,
    pub group: Option<String>,
    pub matches_played: i32,
    pub wins: i32,
    pub losses: i32,
    pub draws: i32,
    pub points: i32,
    pub score_for: i32,
    pub score_against: i32,
    pub score_difference: i32,
    pub tiebreaker_score_for: i32,
    pub tiebreaker_score_against: i32,
    pub tiebreaker_score_difference: i32,
}

impl StandingResponse {
    /// `standings` must already be ranked.
    pub fn ranked(standings: &[TeamStanding]) -> Vec<Self> {
        standings
            .iter()
            .enumerate()
            .map(|(i, s)| Self {
                rank: i + 1,
                team_id: s.team_id,
                team_name: s.team_name.clone(),
                group: s.group.clone(),
                matches_played: s.matches_played,
                wins: s.wins,
                losses: s.losses,
                draws: s.draws,
                points: s.points,
                score_for: s.score_for,
                score_against: s.score_against,
                score_difference: s.score_difference(),
                tiebreaker_score_for: s.tiebreaker_score_for,
                tiebreaker_score_against: s.tiebreaker_score_against,
                tiebreaker_score_difference: s.tiebreaker_score_difference(),
            })
            .collect()
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TeamDetailResponse {
    pub team: TeamResponse,
    pub matches: Vec<MatchResponse>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum OutcomeResponse {
    MatchUpdated { updated: MatchResponse },
    Standings { standings: Vec<StandingResponse> },
    Matches { matches: Vec<MatchResponse> },
    TeamInfo { detail: TeamDetailResponse },
    StageGenerated { matches: Vec<MatchResponse> },
    NotUnderstood { message: String },
}

impl From<&CommandOutcome> for OutcomeResponse {
    fn from(outcome: &CommandOutcome) -> Self {
        match outcome {
            CommandOutcome::MatchUpdated(m) => OutcomeResponse::MatchUpdated { updated: m.into() },
            CommandOutcome::Standings(standings) => OutcomeResponse::Standings {
                standings: StandingResponse::ranked(standings),
            },
            CommandOutcome::Matches(matches) => OutcomeResponse::Matches {
                matches: matches.iter().map(MatchResponse::from).collect(),
            },
            CommandOutcome::TeamInfo { team, matches } => OutcomeResponse::TeamInfo {
                detail: TeamDetailResponse {
                    team: team.into(),
                    matches: matches.iter().map(MatchResponse::from).collect(),
                },
            },
            CommandOutcome::StageGenerated(matches) => OutcomeResponse::StageGenerated {
                matches: matches.iter().map(MatchResponse::from).collect(),
            },
            CommandOutcome::NotUnderstood(message) => OutcomeResponse::NotUnderstood {
                message: message.clone(),
            },
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CommandResponse {
    pub interpretation: Interpretation,
    pub outcome: OutcomeResponse,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ResultRequest {
    pub team1_score: i32,
    pub team2_score: i32,
    pub winner_id: Option<TeamId>,
}

#[derive(Deserialize, Debug)]
pub struct CommandRequest {
    pub text: String,
}

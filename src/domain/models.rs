use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::errors::EngineError;

pub type TeamId = i64;
pub type MatchId = i64;

pub const DRAW_LABEL: &str = "Draw";

/// Registered team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub team_id: TeamId,
    pub team_name: String,
    pub participants: Vec<String>,
    pub group: Option<String>,
}

impl Team {
    pub fn new(team_id: TeamId, team_name: impl Into<String>, participants: Vec<String>) -> Self {
        Self {
            team_id,
            team_name: team_name.into(),
            participants,
            group: None,
        }
    }

    /// Participants in their persisted form, e.g. `"Rahul, Priya"`.
    pub fn participants_joined(&self) -> String {
        self.participants.join(", ")
    }

    pub fn split_participants(joined: &str) -> Vec<String> {
        joined
            .split(", ")
            .map(str::to_string)
            .filter(|p| !p.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Group,
    Quarterfinal,
    Semifinal,
    /// Known to bracket renderers, never generated.
    ThirdPlace,
    Final,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Group => "group",
            Stage::Quarterfinal => "quarterfinal",
            Stage::Semifinal => "semifinal",
            Stage::ThirdPlace => "third_place",
            Stage::Final => "final",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Stage::Group => "Group Stage (Round Robin)",
            Stage::Quarterfinal => "Quarter Finals",
            Stage::Semifinal => "Semi Finals",
            Stage::ThirdPlace => "Third Place",
            Stage::Final => "Final",
        }
    }

    /// Stage generated once this one is complete.
    pub fn next(&self) -> Option<Stage> {
        match self {
            Stage::Group => Some(Stage::Quarterfinal),
            Stage::Quarterfinal => Some(Stage::Semifinal),
            Stage::Semifinal => Some(Stage::Final),
            Stage::ThirdPlace | Stage::Final => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "group" => Ok(Stage::Group),
            "quarterfinal" => Ok(Stage::Quarterfinal),
            "semifinal" => Ok(Stage::Semifinal),
            "third_place" => Ok(Stage::ThirdPlace),
            "final" => Ok(Stage::Final),
            other => Err(EngineError::UnknownStage(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "scheduled",
            MatchStatus::InProgress => "in_progress",
            MatchStatus::Completed => "completed",
            MatchStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchStatus {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "scheduled" => Ok(MatchStatus::Scheduled),
            "in_progress" => Ok(MatchStatus::InProgress),
            "completed" => Ok(MatchStatus::Completed),
            "cancelled" => Ok(MatchStatus::Cancelled),
            other => Err(EngineError::UnknownStatus(other.to_string())),
        }
    }
}

/// Fixture between two teams
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub match_id: MatchId,
    pub team1_id: TeamId,
    pub team1_name: String,
    pub team2_id: TeamId,
    pub team2_name: String,
    pub stage: Stage,
    pub group: Option<String>,
    pub scheduled_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub team1_score: i32,
    pub team2_score: i32,
    pub winner_id: Option<TeamId>,
    pub winner_name: Option<String>,
    pub status: MatchStatus,
}

impl Match {
    pub fn scheduled(
        match_id: MatchId,
        team1: &Team,
        team2: &Team,
        stage: Stage,
        group: Option<String>,
    ) -> Self {
        Self {
            match_id,
            team1_id: team1.team_id,
            team1_name: team1.team_name.clone(),
            team2_id: team2.team_id,
            team2_name: team2.team_name.clone(),
            stage,
            group,
            scheduled_time: None,
            end_time: None,
            team1_score: 0,
            team2_score: 0,
            winner_id: None,
            winner_name: None,
            status: MatchStatus::Scheduled,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == MatchStatus::Completed
    }

    pub fn involves(&self, team_id: TeamId) -> bool {
        self.team1_id == team_id || self.team2_id == team_id
    }

    /// One-line description for feeds and command replies.
    pub fn summary(&self) -> String {
        let score = format!(
            "{} {} - {} {}",
            self.team1_name, self.team1_score, self.team2_score, self.team2_name
        );
        match (self.status, self.winner_name.as_deref()) {
            (MatchStatus::Completed, Some(winner)) if self.winner_id.is_some() => {
                format!("{} wins! Final score: {}", winner, score)
            }
            (MatchStatus::Completed, _) => format!("It's a draw! {}", score),
            _ => format!("Upcoming: {} vs {}", self.team1_name, self.team2_name),
        }
    }
}

/// Accumulated record of one team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamStanding {
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
    pub tiebreaker_score_for: i32,
    pub tiebreaker_score_against: i32,
}

impl TeamStanding {
    pub fn for_team(team: &Team) -> Self {
        Self {
            team_id: team.team_id,
            team_name: team.team_name.clone(),
            group: team.group.clone(),
            matches_played: 0,
            wins: 0,
            losses: 0,
            draws: 0,
            points: 0,
            score_for: 0,
            score_against: 0,
            tiebreaker_score_for: 0,
            tiebreaker_score_against: 0,
        }
    }

    pub fn score_difference(&self) -> i32 {
        self.score_for - self.score_against
    }

    pub fn tiebreaker_score_difference(&self) -> i32 {
        self.tiebreaker_score_for - self.tiebreaker_score_against
    }

    pub fn reset(&mut self) {
        self.matches_played = 0;
        self.wins = 0;
        self.losses = 0;
        self.draws = 0;
        self.points = 0;
        self.score_for = 0;
        self.score_against = 0;
        self.tiebreaker_score_for = 0;
        self.tiebreaker_score_against = 0;
    }
}

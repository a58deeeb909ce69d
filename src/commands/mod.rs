//! Free-text operator commands.
//!
//! A fixed list of patterns is tried in order against the lower-cased text and
//! the first hit wins. The interpreter only classifies; executing the action
//! is up to `TournamentService::execute`.

use anyhow::{Context, Result};
use regex::{Captures, Regex};
use serde::Serialize;

use crate::domain::{MatchId, Stage};

const HELP_MESSAGE: &str = "I couldn't understand that command. Try something like:\n\
    - 'Update match 1 score to 3-2'\n\
    - 'Show standings for group A'\n\
    - 'Get all matches'\n\
    - 'Team Alpha info'";

const STANDINGS_WORDS: [&str; 4] = ["standing", "leaderboard", "points table", "ranking"];
const MATCHES_WORDS: [&str; 4] = ["match", "fixture", "game", "schedule"];
const NEXT_STAGE_WORDS: [&str; 6] = [
    "generate",
    "create",
    "next stage",
    "quarterfinal",
    "semifinal",
    "final",
];

/// Which match a score update is aimed at
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase", tag = "by")]
pub enum ScoreTarget {
    /// No winner is given, so the result is recorded as a draw.
    MatchId { match_id: MatchId },
    /// `winner` beat `loser`; scores are in that order.
    TeamNames { winner: String, loser: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase",
    tag = "action",
    content = "params"
)]
pub enum CommandAction {
    UpdateScore {
        target: ScoreTarget,
        team1_score: i32,
        team2_score: i32,
    },
    GetStandings {
        group: Option<String>,
    },
    GetMatches {
        stage: Option<Stage>,
    },
    GetTeamInfo {
        team_name: String,
    },
    GenerateNextStage,
    Unknown,
}

impl CommandAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandAction::UpdateScore { .. } => "UPDATE_SCORE",
            CommandAction::GetStandings { .. } => "GET_STANDINGS",
            CommandAction::GetMatches { .. } => "GET_MATCHES",
            CommandAction::GetTeamInfo { .. } => "GET_TEAM_INFO",
            CommandAction::GenerateNextStage => "GENERATE_NEXT_STAGE",
            CommandAction::Unknown => "UNKNOWN",
        }
    }
}

/// Classified command with a human-readable echo and a confidence in [0, 1]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Interpretation {
    #[serde(flatten)]
    pub action: CommandAction,
    pub message: String,
    pub confidence: f64,
}

impl Interpretation {
    fn new(action: CommandAction, message: impl Into<String>, confidence: f64) -> Self {
        Self {
            action,
            message: message.into(),
            confidence,
        }
    }
}

pub struct CommandInterpreter {
    beat_regex: Regex,
    match_score_regex: Regex,
    group_regex: Regex,
    team_info_regex: Regex,
    team_suffix_regex: Regex,
}

impl CommandInterpreter {
    pub fn new() -> Result<Self> {
        Ok(Self {
            beat_regex: compile(
                r"(\w+(?:\s+\w+)?)\s+(?:beat|won|defeated)\s+(\w+(?:\s+\w+)?)\s+(\d+)\s*[-:]\s*(\d+)",
                "team result",
            )?,
            match_score_regex: compile(r"match\s*(\d+).*?(\d+)\s*[-:]\s*(\d+)", "match result")?,
            group_regex: compile(r"group\s*([a-z])", "group")?,
            team_info_regex: compile(r"(?:info|details?|about|show)\s+(?:team\s+)?([a-z0-9\s]+)", "team info")?,
            team_suffix_regex: compile(r"team\s+([a-z0-9][a-z0-9\s]*?)\s+(?:info|details?)\b", "team suffix")?,
        })
    }

    pub fn interpret(&self, text: &str) -> Interpretation {
        let command = text.trim().to_lowercase();

        self.team_result(&command)
            .or_else(|| self.match_result(&command))
            .or_else(|| self.standings(&command))
            .or_else(|| matches_query(&command))
            .or_else(|| self.team_info(&command))
            .or_else(|| next_stage(&command))
            .unwrap_or_else(|| Interpretation::new(CommandAction::Unknown, HELP_MESSAGE, 0.0))
    }

    fn team_result(&self, command: &str) -> Option<Interpretation> {
        let caps = self.beat_regex.captures(command)?;
        let winner = caps[1].trim().to_string();
        let loser = caps[2].trim().to_string();
        let team1_score = number(&caps, 3)?;
        let team2_score = number(&caps, 4)?;

        let message = format!(
            "Updating score: {} {} - {} {}",
            winner, team1_score, team2_score, loser
        );
        let action = CommandAction::UpdateScore {
            target: ScoreTarget::TeamNames { winner, loser },
            team1_score,
            team2_score,
        };
        Some(Interpretation::new(action, message, 0.7))
    }

    fn match_result(&self, command: &str) -> Option<Interpretation> {
        let caps = self.match_score_regex.captures(command)?;
        let match_id: MatchId = caps[1].parse().ok()?;
        let team1_score = number(&caps, 2)?;
        let team2_score = number(&caps, 3)?;

        let action = CommandAction::UpdateScore {
            target: ScoreTarget::MatchId { match_id },
            team1_score,
            team2_score,
        };
        let message = format!(
            "Updating match {} score to {}-{}",
            match_id, team1_score, team2_score
        );
        Some(Interpretation::new(action, message, 0.8))
    }

    fn standings(&self, command: &str) -> Option<Interpretation> {
        if !contains_any(command, &STANDINGS_WORDS) {
            return None;
        }

        let group = self
            .group_regex
            .captures(command)
            .map(|caps| caps[1].to_uppercase());
        let message = match &group {
            Some(label) => format!("Fetching standings for Group {}", label),
            None => "Fetching standings".to_string(),
        };
        Some(Interpretation::new(CommandAction::GetStandings { group }, message, 0.9))
    }

    fn team_info(&self, command: &str) -> Option<Interpretation> {
        let team_name = self
            .team_info_regex
            .captures(command)
            .or_else(|| self.team_suffix_regex.captures(command))
            .map(|caps| caps[1].trim().to_string())
            .filter(|name| !name.is_empty())?;

        Some(Interpretation::new(
            CommandAction::GetTeamInfo { team_name },
            "Fetching team information",
            0.7,
        ))
    }
}

fn compile(pattern: &str, name: &str) -> Result<Regex> {
    Regex::new(pattern).with_context(|| format!("Failed to compile {} regex", name))
}

fn number(caps: &Captures, idx: usize) -> Option<i32> {
    caps.get(idx)?.as_str().parse().ok()
}

fn contains_any(command: &str, words: &[&str]) -> bool {
    words.iter().any(|word| command.contains(word))
}

fn matches_query(command: &str) -> Option<Interpretation> {
    if !contains_any(command, &MATCHES_WORDS) {
        return None;
    }

    let stage = if command.contains("quarter") {
        Some(Stage::Quarterfinal)
    } else if command.contains("semi") {
        Some(Stage::Semifinal)
    } else if command.contains("final") {
        Some(Stage::Final)
    } else if command.contains("group") {
        Some(Stage::Group)
    } else {
        None
    };

    let message = match stage {
        Some(stage) => format!("Fetching {} matches", stage),
        None => "Fetching all matches".to_string(),
    };
    Some(Interpretation::new(CommandAction::GetMatches { stage }, message, 0.8))
}

fn next_stage(command: &str) -> Option<Interpretation> {
    contains_any(command, &NEXT_STAGE_WORDS).then(|| {
        Interpretation::new(
            CommandAction::GenerateNextStage,
            "Generating next stage fixtures",
            0.7,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interpret(text: &str) -> Interpretation {
        CommandInterpreter::new().unwrap().interpret(text)
    }

    #[test]
    fn test_team_result() {
        let result = interpret("Red Strikers beat Blue Queens 3-1");
        assert_eq!(
            result.action,
            CommandAction::UpdateScore {
                target: ScoreTarget::TeamNames {
                    winner: "red strikers".to_string(),
                    loser: "blue queens".to_string(),
                },
                team1_score: 3,
                team2_score: 1,
            }
        );
        assert_eq!(result.confidence, 0.7);
    }

    #[test]
    fn test_match_result() {
        let result = interpret("Update match 12 score to 3-2");
        assert_eq!(
            result.action,
            CommandAction::UpdateScore {
                target: ScoreTarget::MatchId { match_id: 12 },
                team1_score: 3,
                team2_score: 2,
            }
        );
        assert_eq!(result.message, "Updating match 12 score to 3-2");
        assert_eq!(result.confidence, 0.8);

        let colon = interpret("match 4: 10 : 7");
        assert_eq!(colon.action.as_str(), "UPDATE_SCORE");
    }

    #[test]
    fn test_standings_with_group() {
        let result = interpret("show standings for group b");
        assert_eq!(
            result.action,
            CommandAction::GetStandings {
                group: Some("B".to_string())
            }
        );
        assert_eq!(result.message, "Fetching standings for Group B");
        assert_eq!(result.confidence, 0.9);

        let all = interpret("Leaderboard please");
        assert_eq!(all.action, CommandAction::GetStandings { group: None });
    }

    #[test]
    fn test_matches_by_stage() {
        let cases = [
            ("show quarterfinal matches", Some(Stage::Quarterfinal)),
            ("semi final fixtures", Some(Stage::Semifinal)),
            ("when is the final game", Some(Stage::Final)),
            ("group schedule", Some(Stage::Group)),
            ("get all matches", None),
        ];
        for (text, stage) in cases {
            assert_eq!(interpret(text).action, CommandAction::GetMatches { stage }, "{}", text);
        }
    }

    #[test]
    fn test_team_info() {
        let result = interpret("Show team Alpha");
        assert_eq!(
            result.action,
            CommandAction::GetTeamInfo {
                team_name: "alpha".to_string()
            }
        );

        let numbered = interpret("details team 7");
        assert_eq!(
            numbered.action,
            CommandAction::GetTeamInfo {
                team_name: "7".to_string()
            }
        );

        let suffix = interpret("Team Alpha info");
        assert_eq!(
            suffix.action,
            CommandAction::GetTeamInfo {
                team_name: "alpha".to_string()
            }
        );
    }

    #[test]
    fn test_next_stage() {
        for text in ["generate next round", "next stage", "create semifinal"] {
            let result = interpret(text);
            assert_eq!(result.action, CommandAction::GenerateNextStage, "{}", text);
            assert_eq!(result.confidence, 0.7);
        }
    }

    #[test]
    fn test_unknown() {
        let result = interpret("what's the weather like");
        assert_eq!(result.action, CommandAction::Unknown);
        assert_eq!(result.confidence, 0.0);
        assert!(result.message.contains("Update match 1 score to 3-2"));
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(interpret("standings group a")).unwrap();
        assert_eq!(json["action"], "GET_STANDINGS");
        assert_eq!(json["params"]["group"], "A");
        assert_eq!(json["confidence"], 0.9);
    }
}

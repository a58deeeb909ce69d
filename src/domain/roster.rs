use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info};

use super::models::{Team, TeamId};
use crate::errors::with_roster_context;

const TEAM_NAME_COLUMNS: [&str; 3] = ["team_name", "team", "name"];
const PARTICIPANTS_COLUMN: &str = "participants";
const PARTICIPANT_COLUMN_HINTS: [&str; 3] = ["participant", "player", "member"];

/// Uploaded team list before any interpretation of its columns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RosterTable {
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path);
        let file = with_roster_context(file, &path.display().to_string())?;
        Self::from_csv_reader(file)
            .with_context(|| format!("Failed to parse roster CSV: {}", path.display()))
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader
            .headers()
            .context("Failed to read roster header row")?
            .iter()
            .map(str::to_string)
            .collect();

        let rows = reader
            .records()
            .map(|record| record.map(|r| r.iter().map(str::to_string).collect()))
            .collect::<csv::Result<Vec<Vec<String>>>>()
            .context("Failed to read roster rows")?;

        Ok(Self { headers, rows })
    }

    /// Turn every row into a team. Never fails: missing columns fall back to
    /// `Team {n}` for the name and the team name as the only participant.
    pub fn parse_teams(&self) -> Vec<Team> {
        let columns = RosterColumns::infer(&self.headers);
        debug!("Roster columns inferred: {:?}", columns);

        let teams: Vec<Team> = self
            .rows
            .iter()
            .enumerate()
            .map(|(idx, row)| columns.build_team(idx, row))
            .collect();

        info!("Parsed {} teams from roster", teams.len());
        teams
    }
}

#[derive(Debug)]
struct RosterColumns {
    team_name: Option<usize>,
    participants: ParticipantSource,
}

#[derive(Debug)]
enum ParticipantSource {
    CommaSeparated(usize),
    Columns(Vec<usize>),
    TeamName,
}

impl RosterColumns {
    fn infer(headers: &[String]) -> Self {
        let normalized: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();

        let team_name = TEAM_NAME_COLUMNS
            .iter()
            .find_map(|candidate| normalized.iter().position(|h| h == candidate));

        let participants = match normalized.iter().position(|h| h == PARTICIPANTS_COLUMN) {
            Some(idx) => ParticipantSource::CommaSeparated(idx),
            None => {
                let cols: Vec<usize> = normalized
                    .iter()
                    .enumerate()
                    .filter(|(_, h)| PARTICIPANT_COLUMN_HINTS.iter().any(|hint| h.contains(hint)))
                    .map(|(idx, _)| idx)
                    .collect();
                if cols.is_empty() {
                    ParticipantSource::TeamName
                } else {
                    ParticipantSource::Columns(cols)
                }
            }
        };

        Self {
            team_name,
            participants,
        }
    }

    fn build_team(&self, idx: usize, row: &[String]) -> Team {
        let team_name = self
            .team_name
            .and_then(|col| cell(row, col))
            .map(str::to_string)
            .unwrap_or_else(|| format!("Team {}", idx + 1));

        let raw: Vec<String> = match &self.participants {
            ParticipantSource::CommaSeparated(col) => cell(row, *col)
                .map(|value| value.split(',').map(str::to_string).collect())
                .unwrap_or_default(),
            ParticipantSource::Columns(cols) => cols
                .iter()
                .filter_map(|col| cell(row, *col))
                .map(str::to_string)
                .collect(),
            ParticipantSource::TeamName => vec![team_name.clone()],
        };

        Team::new((idx + 1) as TeamId, team_name, clean_participants(raw))
    }
}

fn cell(row: &[String], col: usize) -> Option<&str> {
    row.get(col).map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn clean_participants(raw: Vec<String>) -> Vec<String> {
    raw.into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty() && !p.eq_ignore_ascii_case("nan"))
        .collect()
}

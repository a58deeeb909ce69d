//! In-memory tournament engine.
//!
//! Owns the teams, matches and standings of one tournament and moves it from
//! group assignment through round-robin fixtures and scheduling to the knockout
//! bracket. Operations are synchronous; callers that serve several requests
//! must confine one engine to one request at a time.

pub mod fixtures;
pub mod groups;
pub mod queries;
pub mod schedule;
pub mod standings;

use std::collections::BTreeMap;

use crate::config::TournamentSettings;
use crate::domain::{Match, Team, TeamId, TeamStanding};
use crate::errors::EngineError;

pub use fixtures::generate_round_robin_fixtures;
pub use groups::Groups;
pub use schedule::MatchSelection;

/// Everything that is persisted for a tournament
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TournamentState {
    pub teams: Vec<Team>,
    pub matches: Vec<Match>,
    pub standings: BTreeMap<TeamId, TeamStanding>,
}

#[derive(Debug, Clone)]
pub struct TournamentEngine {
    settings: TournamentSettings,
    teams: Vec<Team>,
    matches: Vec<Match>,
    standings: BTreeMap<TeamId, TeamStanding>,
}

impl Default for TournamentEngine {
    fn default() -> Self {
        Self {
            settings: TournamentSettings::default(),
            teams: Vec::new(),
            matches: Vec::new(),
            standings: BTreeMap::new(),
        }
    }
}

impl TournamentEngine {
    pub fn new(settings: TournamentSettings) -> Result<Self, EngineError> {
        settings.validate()?;
        Ok(Self {
            settings,
            ..Self::default()
        })
    }

    pub fn settings(&self) -> &TournamentSettings {
        &self.settings
    }

    /// Swap in a new settings value. Standings are recomputed so a changed
    /// points system applies to matches already played.
    pub fn replace_settings(&mut self, settings: TournamentSettings) -> Result<(), EngineError> {
        settings.validate()?;
        self.settings = settings;
        if !self.standings.is_empty() {
            self.recalculate_all_standings();
        }
        Ok(())
    }

    /// Register teams, dropping any previous tournament.
    pub fn load_teams(&mut self, teams: Vec<Team>) -> &[Team] {
        self.teams = teams;
        self.matches.clear();
        self.standings.clear();
        &self.teams
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    pub fn standings(&self) -> &BTreeMap<TeamId, TeamStanding> {
        &self.standings
    }

    pub fn snapshot(&self) -> TournamentState {
        TournamentState {
            teams: self.teams.clone(),
            matches: self.matches.clone(),
            standings: self.standings.clone(),
        }
    }

    /// Replace the whole state with a previously persisted one.
    pub fn restore(&mut self, state: TournamentState) {
        self.teams = state.teams;
        self.matches = state.matches;
        self.standings = state.standings;
    }

    fn team(&self, team_id: TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| t.team_id == team_id)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn teams(count: usize) -> Vec<Team> {
        (1..=count)
            .map(|i| Team::new(i as TeamId, format!("Team {}", i), vec![format!("Player {}", i)]))
            .collect()
    }

    pub fn engine_with_teams(count: usize) -> TournamentEngine {
        let mut engine = TournamentEngine::default();
        engine.load_teams(teams(count));
        engine
    }
}

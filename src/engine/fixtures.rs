use log::{info, warn};

use super::TournamentEngine;
use super::groups::Groups;
use crate::domain::{Match, MatchId, Stage, Team, TeamStanding};

/// One match per unordered pair of `teams`, ids counting up from
/// `match_id_start`. Pairs come out in input order: (0,1), (0,2), ..., (1,2), ...
pub fn generate_round_robin_fixtures(
    teams: &[Team],
    stage: Stage,
    match_id_start: MatchId,
) -> Vec<Match> {
    let mut matches = Vec::with_capacity(teams.len() * teams.len().saturating_sub(1) / 2);

    for (i, team1) in teams.iter().enumerate() {
        for team2 in &teams[i + 1..] {
            let match_id = match_id_start + matches.len() as MatchId;
            matches.push(Match::scheduled(match_id, team1, team2, stage, team1.group.clone()));
        }
    }

    matches
}

impl TournamentEngine {
    /// Round-robin every group in label order with ids continuing across
    /// groups from 1. Replaces the whole match list.
    pub fn generate_group_stage_fixtures(&mut self, groups: &Groups) -> &[Match] {
        let mut all_matches = Vec::new();
        let mut next_match_id: MatchId = 1;

        for (label, teams) in groups {
            let group_matches = generate_round_robin_fixtures(teams, Stage::Group, next_match_id);
            info!("  → Group {}: {} fixtures", label, group_matches.len());
            next_match_id += group_matches.len() as MatchId;
            all_matches.extend(group_matches);
        }

        self.matches = all_matches;
        &self.matches
    }

    /// Mirror-seeded pairs (first vs last, second vs second last, ...) appended
    /// to the match list. An odd trailing qualifier gets no match.
    pub fn generate_knockout_fixtures(&mut self, qualified: &[Team], stage: Stage) -> Vec<Match> {
        let match_id_start = self.next_match_id();
        let count = qualified.len();

        if count % 2 == 1 {
            warn!(
                "{} qualifiers for {}: {} left without an opponent",
                count,
                stage,
                qualified[count - 1].team_name
            );
        }

        let matches: Vec<Match> = (0..count / 2)
            .map(|i| {
                Match::scheduled(
                    match_id_start + i as MatchId,
                    &qualified[i],
                    &qualified[count - 1 - i],
                    stage,
                    None,
                )
            })
            .collect();

        info!("Generated {} {} fixtures", matches.len(), stage);
        self.matches.extend(matches.iter().cloned());
        matches
    }

    /// Ranked standings of every group cut to the qualifying places.
    pub fn get_top_teams_from_groups(&self) -> std::collections::BTreeMap<String, Vec<TeamStanding>> {
        let top_n = self.settings.top_teams_per_group();

        self.groups()
            .into_keys()
            .map(|label| {
                let mut ranked = self.get_group_standings(Some(label.as_str()));
                ranked.truncate(top_n);
                (label, ranked)
            })
            .collect()
    }

    pub fn generate_quarterfinals(&mut self) -> Vec<Match> {
        let qualified: Vec<Team> = self
            .get_top_teams_from_groups()
            .values()
            .flatten()
            .filter_map(|standing| self.team(standing.team_id).cloned())
            .collect();

        self.generate_knockout_fixtures(&qualified, Stage::Quarterfinal)
    }

    pub fn generate_semifinals(&mut self) -> Vec<Match> {
        let winners = self.stage_winners(Stage::Quarterfinal);
        self.generate_knockout_fixtures(&winners, Stage::Semifinal)
    }

    pub fn generate_final(&mut self) -> Vec<Match> {
        let winners = self.stage_winners(Stage::Semifinal);
        self.generate_knockout_fixtures(&winners, Stage::Final)
    }

    /// Winners of the completed matches of `stage`, in match list order.
    fn stage_winners(&self, stage: Stage) -> Vec<Team> {
        self.matches
            .iter()
            .filter(|m| m.stage == stage && m.is_completed())
            .filter_map(|m| m.winner_id)
            .filter_map(|winner_id| self.team(winner_id).cloned())
            .collect()
    }

    fn next_match_id(&self) -> MatchId {
        self.matches.iter().map(|m| m.match_id).max().unwrap_or(0) + 1
    }
}

use std::cmp::Reverse;

use log::{debug, info, warn};

use super::TournamentEngine;
use crate::config::TournamentSettings;
use crate::domain::{DRAW_LABEL, Match, MatchId, MatchStatus, TeamId, TeamStanding};
use crate::errors::EngineError;

/// Highest score a single match may record.
pub const MAX_SCORE: i32 = 9_999;

enum Outcome {
    Win,
    Loss,
    Draw,
}

impl Outcome {
    fn for_team(m: &Match, team_id: TeamId) -> Self {
        match m.winner_id {
            Some(winner) if winner == team_id => Outcome::Win,
            Some(_) => Outcome::Loss,
            None => Outcome::Draw,
        }
    }
}

fn apply_result(
    standing: &mut TeamStanding,
    outcome: Outcome,
    own_score: i32,
    opponent_score: i32,
    settings: &TournamentSettings,
) {
    standing.matches_played += 1;
    standing.score_for += own_score;
    standing.score_against += opponent_score;
    standing.tiebreaker_score_for += own_score;
    standing.tiebreaker_score_against += opponent_score;

    match outcome {
        Outcome::Win => {
            standing.wins += 1;
            standing.points += settings.points_per_win;
        }
        Outcome::Loss => {
            standing.losses += 1;
            standing.points += settings.points_per_loss;
        }
        Outcome::Draw => {
            standing.draws += 1;
            standing.points += settings.points_per_draw;
        }
    }
}

impl TournamentEngine {
    /// Record the outcome of a match and rebuild every standing.
    ///
    /// The winner is whichever team `winner_id` names. Any other value,
    /// `None` included, records a draw. Scores never decide the winner; they
    /// only feed the tie-breakers. Calling this again for the same match
    /// overwrites the earlier result. Scores outside `0..=MAX_SCORE` are
    /// rejected before anything changes.
    pub fn update_match_result(
        &mut self,
        match_id: MatchId,
        team1_score: i32,
        team2_score: i32,
        winner_id: Option<TeamId>,
    ) -> Result<Match, EngineError> {
        if let Some(&score) = [team1_score, team2_score]
            .iter()
            .find(|score| !(0..=MAX_SCORE).contains(*score))
        {
            return Err(EngineError::InvalidScore {
                match_id,
                score,
                max: MAX_SCORE,
            });
        }

        let m = self
            .matches
            .iter_mut()
            .find(|m| m.match_id == match_id)
            .ok_or(EngineError::MatchNotFound(match_id))?;

        m.team1_score = team1_score;
        m.team2_score = team2_score;
        m.status = MatchStatus::Completed;

        match winner_id {
            Some(id) if id == m.team1_id => {
                m.winner_id = Some(m.team1_id);
                m.winner_name = Some(m.team1_name.clone());
            }
            Some(id) if id == m.team2_id => {
                m.winner_id = Some(m.team2_id);
                m.winner_name = Some(m.team2_name.clone());
            }
            other => {
                if let Some(id) = other {
                    warn!(
                        "Winner {} is not playing match {}, recording a draw",
                        id, match_id
                    );
                }
                m.winner_id = None;
                m.winner_name = Some(DRAW_LABEL.to_string());
            }
        }

        let updated = m.clone();
        debug!("Match {}: {}", match_id, updated.summary());

        self.recalculate_all_standings();
        Ok(updated)
    }

    /// Zero every standing and replay all completed matches in list order.
    pub fn recalculate_all_standings(&mut self) {
        for team in &self.teams {
            let standing = self
                .standings
                .entry(team.team_id)
                .or_insert_with(|| TeamStanding::for_team(team));
            standing.team_name = team.team_name.clone();
            standing.group = team.group.clone();
        }

        for standing in self.standings.values_mut() {
            standing.reset();
        }

        let mut replayed = 0;
        for m in self.matches.iter().filter(|m| m.is_completed()) {
            if let Some(standing) = self.standings.get_mut(&m.team1_id) {
                let outcome = Outcome::for_team(m, m.team1_id);
                apply_result(standing, outcome, m.team1_score, m.team2_score, &self.settings);
            }
            if let Some(standing) = self.standings.get_mut(&m.team2_id) {
                let outcome = Outcome::for_team(m, m.team2_id);
                apply_result(standing, outcome, m.team2_score, m.team1_score, &self.settings);
            }
            replayed += 1;
        }

        info!("  → Standings rebuilt from {} completed matches", replayed);
    }

    /// Ranked standings, optionally restricted to one group.
    ///
    /// Ordered by points, then tie-breaker score difference, then tie-breaker
    /// score for, all descending. Remaining ties keep ascending team id.
    pub fn get_group_standings(&self, group: Option<&str>) -> Vec<TeamStanding> {
        let mut ranked: Vec<TeamStanding> = self
            .standings
            .values()
            .filter(|s| group.is_none_or(|label| s.group.as_deref() == Some(label)))
            .cloned()
            .collect();

        ranked.sort_by_key(|s| {
            Reverse((
                s.points,
                s.tiebreaker_score_difference(),
                s.tiebreaker_score_for,
            ))
        });
        ranked
    }
}

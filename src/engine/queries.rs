use super::TournamentEngine;
use crate::domain::{Match, MatchId, Stage, Team, TeamId};

impl TournamentEngine {
    pub fn get_matches_by_stage(&self, stage: Stage) -> Vec<Match> {
        self.matches.iter().filter(|m| m.stage == stage).cloned().collect()
    }

    pub fn get_match_by_id(&self, match_id: MatchId) -> Option<&Match> {
        self.matches.iter().find(|m| m.match_id == match_id)
    }

    /// First team whose name contains `fragment`, ignoring case.
    pub fn get_team_by_name(&self, fragment: &str) -> Option<&Team> {
        let needle = fragment.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        self.teams
            .iter()
            .find(|t| t.team_name.to_lowercase().contains(&needle))
    }

    /// Matches a team has played or will play, in list order.
    pub fn get_team_matches(&self, team_id: TeamId) -> Vec<Match> {
        self.matches.iter().filter(|m| m.involves(team_id)).cloned().collect()
    }

    /// True once `stage` has fixtures and every one of them is completed.
    pub fn is_stage_complete(&self, stage: Stage) -> bool {
        let mut stage_matches = self.matches.iter().filter(|m| m.stage == stage).peekable();
        stage_matches.peek().is_some() && stage_matches.all(Match::is_completed)
    }

    /// Most advanced stage that has fixtures.
    pub fn current_stage(&self) -> Option<Stage> {
        self.matches.iter().map(|m| m.stage).max()
    }

    /// Winner of the completed final.
    pub fn champion(&self) -> Option<&Team> {
        self.matches
            .iter()
            .filter(|m| m.stage == Stage::Final && m.is_completed())
            .find_map(|m| m.winner_id)
            .and_then(|winner_id| self.team(winner_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::*;

    fn engine_with_fixtures() -> TournamentEngine {
        let mut engine = engine_with_teams(8);
        let groups = engine.divide_into_groups(false);
        engine.generate_group_stage_fixtures(&groups);
        engine
    }

    #[test]
    fn test_lookup_by_stage_and_id() {
        let engine = engine_with_fixtures();
        assert_eq!(engine.get_matches_by_stage(Stage::Group).len(), 12);
        assert!(engine.get_matches_by_stage(Stage::Final).is_empty());
        assert_eq!(engine.get_match_by_id(7).map(|m| m.group.as_deref()), Some(Some("B")));
        assert!(engine.get_match_by_id(40).is_none());
    }

    #[test]
    fn test_team_name_search() {
        let mut engine = TournamentEngine::default();
        engine.load_teams(vec![
            Team::new(1, "Red Strikers", Vec::new()),
            Team::new(2, "Blue Queens", Vec::new()),
        ]);
        assert_eq!(engine.get_team_by_name("queen").map(|t| t.team_id), Some(2));
        assert_eq!(engine.get_team_by_name("  RED ").map(|t| t.team_id), Some(1));
        assert!(engine.get_team_by_name("green").is_none());
        assert!(engine.get_team_by_name("").is_none());
    }

    #[test]
    fn test_team_matches() {
        let engine = engine_with_fixtures();
        let played = engine.get_team_matches(1);
        assert_eq!(played.len(), 3);
        assert!(played.iter().all(|m| m.involves(1)));
    }

    #[test]
    fn test_stage_completion() {
        let mut engine = engine_with_fixtures();
        assert!(!engine.is_stage_complete(Stage::Quarterfinal));
        assert!(!engine.is_stage_complete(Stage::Group));
        assert_eq!(engine.current_stage(), Some(Stage::Group));

        for match_id in 1..=12 {
            engine.update_match_result(match_id, 1, 0, None).unwrap();
        }
        assert!(engine.is_stage_complete(Stage::Group));
    }

    #[test]
    fn test_champion() {
        let mut engine = engine_with_teams(2);
        assert!(engine.champion().is_none());
        assert_eq!(engine.current_stage(), None);

        let finals = engine.generate_knockout_fixtures(&teams(2), Stage::Final);
        assert!(engine.champion().is_none());
        engine.update_match_result(finals[0].match_id, 4, 2, Some(2)).unwrap();
        assert_eq!(engine.champion().map(|t| t.team_name.as_str()), Some("Team 2"));
        assert_eq!(engine.current_stage(), Some(Stage::Final));
    }
}

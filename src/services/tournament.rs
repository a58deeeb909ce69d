use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use chrono::{Duration, Local, NaiveDateTime};
use log::{info, warn};

use crate::access::{Permission, Principal, require};
use crate::commands::{CommandAction, CommandInterpreter, Interpretation, ScoreTarget};
use crate::config::{AppConfig, TournamentSettings};
use crate::database;
use crate::domain::{Match, MatchId, Stage, Team, TeamId, TeamStanding};
use crate::engine::{MatchSelection, TournamentEngine};

/// Gap between the last match of a stage and the first of the next one.
const STAGE_BREAK_MINUTES: i64 = 30;

/// How the group stage is laid out by [`TournamentService::initialize`]
#[derive(Debug, Clone)]
pub struct TournamentSetup {
    pub start_time: NaiveDateTime,
    pub parallel_matches: usize,
    pub shuffle: bool,
    /// Manual group partition; random or round-robin assignment when absent.
    pub partition: Option<BTreeMap<String, Vec<TeamId>>>,
}

impl TournamentSetup {
    pub fn starting_at(start_time: NaiveDateTime) -> Self {
        Self {
            start_time,
            parallel_matches: 1,
            shuffle: true,
            partition: None,
        }
    }
}

/// Result of running an interpreted command
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    MatchUpdated(Match),
    Standings(Vec<TeamStanding>),
    Matches(Vec<Match>),
    TeamInfo { team: Team, matches: Vec<Match> },
    StageGenerated(Vec<Match>),
    NotUnderstood(String),
}

/// The engine together with its persistence and role checks.
///
/// Every mutation is bracketed: the state is snapshotted first, and if the
/// operation or the following save fails the snapshot is put back.
pub struct TournamentService {
    config: AppConfig,
    engine: TournamentEngine,
    interpreter: CommandInterpreter,
}

impl TournamentService {
    /// Empty tournament that will persist to `config.database_path`.
    pub fn new(config: AppConfig) -> Result<Self> {
        let engine = TournamentEngine::new(config.tournament.clone())?;
        Ok(Self {
            config,
            engine,
            interpreter: CommandInterpreter::new()?,
        })
    }

    /// Like [`TournamentService::new`] but picks up a previously saved
    /// tournament when the database file exists.
    pub fn open(config: AppConfig) -> Result<Self> {
        let mut service = Self::new(config)?;
        if Path::new(&service.config.database_path).exists() {
            service.reload()?;
        } else {
            info!("No saved tournament at {}, starting empty", service.config.database_path);
        }
        Ok(service)
    }

    pub fn engine(&self) -> &TournamentEngine {
        &self.engine
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn interpret(&self, text: &str) -> Interpretation {
        self.interpreter.interpret(text)
    }

    /// Replace the in-memory state with the saved one. On failure nothing
    /// changes.
    pub fn reload(&mut self) -> Result<()> {
        let state = database::load_tournament(&self.config.database_path)?;
        self.engine.restore(state);
        Ok(())
    }

    /// Switch to new tournament rules. Settings live in the config, not in
    /// the saved state, so only the in-memory standings are recomputed.
    pub fn apply_settings(&mut self, principal: &Principal, settings: TournamentSettings) -> Result<()> {
        require(principal, Permission::EditTournament, "change tournament settings")?;
        self.engine.replace_settings(settings.clone())?;
        info!("Tournament settings changed: {:?}", settings);
        self.config.tournament = settings;
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        database::save_tournament(&self.config.database_path, &self.engine.snapshot())
    }

    /// Register `teams`, split them into groups, create and schedule the group
    /// stage. Any previous tournament is discarded.
    pub fn initialize(
        &mut self,
        principal: &Principal,
        teams: Vec<Team>,
        setup: &TournamentSetup,
    ) -> Result<Vec<Match>> {
        require(principal, Permission::EditTournament, "create a tournament")?;
        if teams.len() < 2 {
            bail!("At least two teams are needed, got {}", teams.len());
        }

        self.mutate(|engine| {
            engine.load_teams(teams);
            let groups = match &setup.partition {
                Some(partition) => engine.assign_teams_to_groups(partition)?,
                None => engine.divide_into_groups(setup.shuffle),
            };
            engine.generate_group_stage_fixtures(&groups);
            let matches = engine.schedule_matches(
                setup.start_time,
                &MatchSelection::Stage(Stage::Group),
                setup.parallel_matches,
            );
            info!(
                "Tournament created: {} teams, {} groups, {} group matches",
                engine.teams().len(),
                groups.len(),
                matches.len()
            );
            Ok(matches)
        })
    }

    pub fn record_result(
        &mut self,
        principal: &Principal,
        match_id: MatchId,
        team1_score: i32,
        team2_score: i32,
        winner_id: Option<TeamId>,
    ) -> Result<Match> {
        require(principal, Permission::UpdateMatch, &format!("update match {}", match_id))?;
        self.mutate(|engine| {
            Ok(engine.update_match_result(match_id, team1_score, team2_score, winner_id)?)
        })
    }

    /// Generate and schedule the stage after the current one. Refuses while
    /// the current stage still has unplayed matches.
    pub fn advance_stage(&mut self, principal: &Principal, parallel_matches: usize) -> Result<Vec<Match>> {
        require(principal, Permission::EditTournament, "generate the next stage")?;

        let current = self
            .engine
            .current_stage()
            .ok_or_else(|| anyhow!("No fixtures yet, create the tournament first"))?;
        if !self.engine.is_stage_complete(current) {
            bail!("{} is not finished yet", current.display_name());
        }
        let next = current
            .next()
            .ok_or_else(|| anyhow!("The final has been played, nothing left to generate"))?;

        let start_time = self
            .engine
            .stage_end_time(current)
            .map(|end| end + Duration::minutes(STAGE_BREAK_MINUTES))
            .unwrap_or_else(|| Local::now().naive_local());

        self.mutate(|engine| {
            let generated = match next {
                Stage::Quarterfinal => engine.generate_quarterfinals(),
                Stage::Semifinal => engine.generate_semifinals(),
                _ => engine.generate_final(),
            };
            if generated.is_empty() {
                bail!("No teams qualified for the {}", next.display_name());
            }
            info!("Advanced from {} to {}", current, next);
            Ok(engine.schedule_matches(start_time, &MatchSelection::Stage(next), parallel_matches))
        })
    }

    /// Run an interpreted command on behalf of `principal`.
    pub fn execute(&mut self, principal: &Principal, interpretation: &Interpretation) -> Result<CommandOutcome> {
        match &interpretation.action {
            CommandAction::UpdateScore {
                target,
                team1_score,
                team2_score,
            } => {
                require(principal, Permission::UpdateMatch, "update a match score")?;
                let (match_id, team1_score, team2_score, winner_id) =
                    self.resolve_score_target(target, *team1_score, *team2_score)?;
                let updated = self.record_result(principal, match_id, team1_score, team2_score, winner_id)?;
                Ok(CommandOutcome::MatchUpdated(updated))
            }
            CommandAction::GetStandings { group } => {
                require(principal, Permission::ViewScores, "view standings")?;
                Ok(CommandOutcome::Standings(self.engine.get_group_standings(group.as_deref())))
            }
            CommandAction::GetMatches { stage } => {
                require(principal, Permission::ViewScores, "view matches")?;
                let matches = match stage {
                    Some(stage) => self.engine.get_matches_by_stage(*stage),
                    None => self.engine.matches().to_vec(),
                };
                Ok(CommandOutcome::Matches(matches))
            }
            CommandAction::GetTeamInfo { team_name } => {
                require(principal, Permission::ViewScores, "view teams")?;
                let team = self
                    .engine
                    .get_team_by_name(team_name)
                    .cloned()
                    .ok_or_else(|| anyhow!("Team '{}' not found", team_name))?;
                let matches = self.engine.get_team_matches(team.team_id);
                Ok(CommandOutcome::TeamInfo { team, matches })
            }
            CommandAction::GenerateNextStage => {
                let generated = self.advance_stage(principal, 1)?;
                Ok(CommandOutcome::StageGenerated(generated))
            }
            CommandAction::Unknown => Ok(CommandOutcome::NotUnderstood(interpretation.message.clone())),
        }
    }

    /// Match id, scores in the match's own team order, and winner.
    fn resolve_score_target(
        &self,
        target: &ScoreTarget,
        team1_score: i32,
        team2_score: i32,
    ) -> Result<(MatchId, i32, i32, Option<TeamId>)> {
        match target {
            ScoreTarget::MatchId { match_id } => Ok((*match_id, team1_score, team2_score, None)),
            ScoreTarget::TeamNames { winner, loser } => {
                let winner = self.find_team(winner)?;
                let loser = self.find_team(loser)?;
                if winner.team_id == loser.team_id {
                    bail!("'{}' cannot play against itself", winner.team_name);
                }

                let between = |m: &&Match| m.involves(winner.team_id) && m.involves(loser.team_id);
                let m = self
                    .engine
                    .matches()
                    .iter()
                    .filter(between)
                    .find(|m| !m.is_completed())
                    .or_else(|| self.engine.matches().iter().find(between))
                    .ok_or_else(|| {
                        anyhow!("No match between {} and {}", winner.team_name, loser.team_name)
                    })?;

                if m.is_completed() {
                    warn!("Overwriting the result of completed match {}", m.match_id);
                }
                let (score1, score2) = if m.team1_id == winner.team_id {
                    (team1_score, team2_score)
                } else {
                    (team2_score, team1_score)
                };
                Ok((m.match_id, score1, score2, Some(winner.team_id)))
            }
        }
    }

    fn find_team(&self, name: &str) -> Result<&Team> {
        self.engine
            .get_team_by_name(name)
            .ok_or_else(|| anyhow!("Team '{}' not found", name))
    }

    fn mutate<T>(&mut self, operation: impl FnOnce(&mut TournamentEngine) -> Result<T>) -> Result<T> {
        let before = self.engine.snapshot();

        let value = match operation(&mut self.engine) {
            Ok(value) => value,
            Err(e) => {
                self.engine.restore(before);
                return Err(e);
            }
        };

        if let Err(e) = self.save() {
            self.engine.restore(before);
            return Err(e).context("Tournament state was not saved, change reverted");
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use tempfile::TempDir;

    use super::*;
    use crate::config::TournamentSettings;
    use crate::errors::{AccessError, EngineError};

    fn config_in(dir: &TempDir) -> AppConfig {
        let path = dir.path().join("tournament.db");
        AppConfig::default()
            .with_tournament(TournamentSettings::default())
            .with_database_path(path.to_string_lossy().to_string())
    }

    fn teams(count: i64) -> Vec<Team> {
        (1..=count)
            .map(|i| Team::new(i, format!("Team {}", i), vec![format!("Player {}", i)]))
            .collect()
    }

    fn setup() -> TournamentSetup {
        let start = NaiveDate::from_ymd_opt(2026, 5, 2)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        TournamentSetup {
            shuffle: false,
            ..TournamentSetup::starting_at(start)
        }
    }

    fn started_service(dir: &TempDir) -> TournamentService {
        let mut service = TournamentService::new(config_in(dir)).unwrap();
        service.initialize(&Principal::admin(), teams(8), &setup()).unwrap();
        service
    }

    fn complete_stage(service: &mut TournamentService, stage: Stage) {
        let pending: Vec<(MatchId, TeamId)> = service
            .engine()
            .get_matches_by_stage(stage)
            .iter()
            .map(|m| (m.match_id, m.team1_id))
            .collect();
        for (match_id, winner) in pending {
            service
                .record_result(&Principal::admin(), match_id, 3, 1, Some(winner))
                .unwrap();
        }
    }

    #[test]
    fn test_initialize_creates_scheduled_group_stage() {
        let dir = TempDir::new().unwrap();
        let service = started_service(&dir);

        let matches = service.engine().matches();
        assert_eq!(matches.len(), 12);
        assert!(matches.iter().all(|m| m.scheduled_time.is_some()));
        assert!(Path::new(&service.config().database_path).exists());
    }

    #[test]
    fn test_viewer_cannot_mutate() {
        let dir = TempDir::new().unwrap();
        let mut service = started_service(&dir);
        let before = service.engine().snapshot();

        let err = service
            .record_result(&Principal::viewer(), 1, 3, 1, Some(1))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AccessError>(),
            Some(AccessError::Forbidden { .. })
        ));
        assert!(service.advance_stage(&Principal::viewer(), 1).is_err());
        assert_eq!(service.engine().snapshot(), before);
    }

    #[test]
    fn test_unknown_match_surfaces_engine_error() {
        let dir = TempDir::new().unwrap();
        let mut service = started_service(&dir);
        let err = service
            .record_result(&Principal::admin(), 404, 1, 0, None)
            .unwrap_err();
        assert_eq!(err.downcast_ref::<EngineError>(), Some(&EngineError::MatchNotFound(404)));
    }

    #[test]
    fn test_bad_partition_keeps_previous_tournament() {
        let dir = TempDir::new().unwrap();
        let mut service = started_service(&dir);
        let before = service.engine().snapshot();

        let bad = TournamentSetup {
            partition: Some(BTreeMap::from([("A".to_string(), vec![1, 2])])),
            ..setup()
        };
        assert!(service.initialize(&Principal::admin(), teams(4), &bad).is_err());
        assert_eq!(service.engine().snapshot(), before);
    }

    #[test]
    fn test_advance_stage_waits_for_results() {
        let dir = TempDir::new().unwrap();
        let mut service = started_service(&dir);

        let err = service.advance_stage(&Principal::admin(), 1).unwrap_err();
        assert!(err.to_string().contains("not finished"));

        complete_stage(&mut service, Stage::Group);
        let quarterfinals = service.advance_stage(&Principal::admin(), 2).unwrap();
        assert_eq!(quarterfinals.len(), 4);

        let group_end = service.engine().stage_end_time(Stage::Group).unwrap();
        assert_eq!(
            quarterfinals[0].scheduled_time,
            Some(group_end + Duration::minutes(STAGE_BREAK_MINUTES))
        );
    }

    #[test]
    fn test_runs_through_to_champion() {
        let dir = TempDir::new().unwrap();
        let mut service = started_service(&dir);

        for stage in [Stage::Group, Stage::Quarterfinal, Stage::Semifinal] {
            complete_stage(&mut service, stage);
            service.advance_stage(&Principal::admin(), 1).unwrap();
        }
        assert_eq!(service.engine().get_matches_by_stage(Stage::Final).len(), 1);

        complete_stage(&mut service, Stage::Final);
        assert!(service.engine().champion().is_some());
        assert!(service.advance_stage(&Principal::admin(), 1).is_err());
    }

    #[test]
    fn test_execute_team_result_orients_scores() {
        let dir = TempDir::new().unwrap();
        let mut service = started_service(&dir);

        // match 1 is Team 1 vs Team 3 in group A
        let interpretation = service.interpret("team 3 beat team 1 5-2");
        let outcome = service.execute(&Principal::admin(), &interpretation).unwrap();

        let CommandOutcome::MatchUpdated(updated) = outcome else {
            panic!("expected a match update");
        };
        assert_eq!(updated.match_id, 1);
        assert_eq!(updated.winner_id, Some(3));
        assert_eq!((updated.team1_score, updated.team2_score), (2, 5));
    }

    #[test]
    fn test_execute_match_id_records_draw() {
        let dir = TempDir::new().unwrap();
        let mut service = started_service(&dir);

        let interpretation = service.interpret("match 2 score 4-4");
        let outcome = service.execute(&Principal::admin(), &interpretation).unwrap();
        let CommandOutcome::MatchUpdated(updated) = outcome else {
            panic!("expected a match update");
        };
        assert_eq!(updated.winner_id, None);
    }

    #[test]
    fn test_execute_queries_as_viewer() {
        let dir = TempDir::new().unwrap();
        let mut service = started_service(&dir);
        let viewer = Principal::viewer();

        let standings = service.interpret("standings group a");
        assert!(matches!(
            service.execute(&viewer, &standings).unwrap(),
            CommandOutcome::Standings(rows) if rows.len() == 4
        ));

        let info = service.interpret("show team 2");
        assert!(matches!(
            service.execute(&viewer, &info).unwrap(),
            CommandOutcome::TeamInfo { team, matches } if team.team_id == 2 && matches.len() == 3
        ));

        let update = service.interpret("match 1 3-1");
        assert!(service.execute(&viewer, &update).is_err());
    }

    #[test]
    fn test_viewer_score_command_is_forbidden_before_team_lookup() {
        let dir = TempDir::new().unwrap();
        let mut service = started_service(&dir);

        let update = service.interpret("nobody beat team 1 3-0");
        let err = service.execute(&Principal::viewer(), &update).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AccessError>(),
            Some(AccessError::Forbidden { .. })
        ));
    }

    #[test]
    fn test_team_cannot_beat_itself() {
        let dir = TempDir::new().unwrap();
        let mut service = started_service(&dir);
        let before = service.engine().snapshot();

        let update = service.interpret("team 1 beat team 1 3-0");
        let err = service.execute(&Principal::admin(), &update).unwrap_err();
        assert!(err.to_string().contains("against itself"));
        assert_eq!(service.engine().snapshot(), before);
    }

    #[test]
    fn test_out_of_range_score_keeps_saved_state() {
        let dir = TempDir::new().unwrap();
        let mut service = started_service(&dir);
        let before = service.engine().snapshot();

        let err = service
            .record_result(&Principal::admin(), 1, i32::MAX, 0, Some(1))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EngineError>(),
            Some(EngineError::InvalidScore { .. })
        ));
        assert_eq!(service.engine().snapshot(), before);

        let reopened = TournamentService::open(config_in(&dir)).unwrap();
        assert_eq!(reopened.engine().snapshot(), before);
    }

    #[test]
    fn test_apply_settings() {
        let dir = TempDir::new().unwrap();
        let mut service = started_service(&dir);
        service.record_result(&Principal::admin(), 1, 3, 1, Some(1)).unwrap();
        assert_eq!(service.engine().standings()[&1].points, 2);

        let three_points = TournamentSettings::default().with_points_per_win(3);
        assert!(service.apply_settings(&Principal::viewer(), three_points.clone()).is_err());
        assert!(
            service
                .apply_settings(&Principal::admin(), three_points.clone().with_match_duration(0))
                .is_err()
        );
        assert_eq!(service.config().tournament, TournamentSettings::default());

        service.apply_settings(&Principal::admin(), three_points.clone()).unwrap();
        assert_eq!(service.engine().standings()[&1].points, 3);
        assert_eq!(service.config().tournament, three_points);
    }

    #[test]
    fn test_open_restores_saved_state() {
        let dir = TempDir::new().unwrap();
        let mut service = started_service(&dir);
        service.record_result(&Principal::admin(), 3, 2, 0, Some(1)).unwrap();
        let saved = service.engine().snapshot();

        let reopened = TournamentService::open(config_in(&dir)).unwrap();
        assert_eq!(reopened.engine().snapshot(), saved);
    }
}

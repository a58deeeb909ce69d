use crate::errors::EngineError;

const DEFAULT_DATABASE_PATH: &str = "tournament.db";

/// Longest match a tournament may be configured with: one day.
pub const MAX_MATCH_DURATION_MINUTES: i64 = 24 * 60;

/// Rules of a tournament. Never mutated in place: build a new value and hand it
/// to `TournamentEngine::replace_settings`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TournamentSettings {
    pub match_duration_minutes: i64,
    pub points_per_win: i32,
    pub points_per_draw: i32,
    pub points_per_loss: i32,
    pub number_of_groups: usize,
    pub total_qualifiers: usize,
}

impl Default for TournamentSettings {
    fn default() -> Self {
        Self {
            match_duration_minutes: 20,
            points_per_win: 2,
            points_per_draw: 1,
            points_per_loss: 0,
            number_of_groups: 2,
            total_qualifiers: 8,
        }
    }
}

impl TournamentSettings {
    /// Defaults overridden by `MATCH_DURATION_MINUTES`, `POINTS_PER_WIN`,
    /// `NUMBER_OF_GROUPS` and `TOTAL_QUALIFIERS` when they parse.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            match_duration_minutes: env_or("MATCH_DURATION_MINUTES", defaults.match_duration_minutes),
            points_per_win: env_or("POINTS_PER_WIN", defaults.points_per_win),
            number_of_groups: env_or("NUMBER_OF_GROUPS", defaults.number_of_groups),
            total_qualifiers: env_or("TOTAL_QUALIFIERS", defaults.total_qualifiers),
            ..defaults
        }
    }

    pub fn with_match_duration(self, minutes: i64) -> Self {
        Self {
            match_duration_minutes: minutes,
            ..self
        }
    }

    pub fn with_groups(self, number_of_groups: usize) -> Self {
        Self {
            number_of_groups,
            ..self
        }
    }

    pub fn with_points_per_win(self, points: i32) -> Self {
        Self {
            points_per_win: points,
            ..self
        }
    }

    pub fn with_total_qualifiers(self, total_qualifiers: usize) -> Self {
        Self {
            total_qualifiers,
            ..self
        }
    }

    /// How many teams leave each group for the quarterfinals.
    /// 2 groups -> top 4 each, 4 groups -> top 2 each.
    pub fn top_teams_per_group(&self) -> usize {
        self.total_qualifiers / self.number_of_groups.max(1)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.number_of_groups == 0 || self.number_of_groups > 26 {
            return Err(EngineError::InvalidSettings(format!(
                "number of groups must be between 1 and 26, got {}",
                self.number_of_groups
            )));
        }
        if !(1..=MAX_MATCH_DURATION_MINUTES).contains(&self.match_duration_minutes) {
            return Err(EngineError::InvalidSettings(format!(
                "match duration must be between 1 and {} minutes, got {}",
                MAX_MATCH_DURATION_MINUTES, self.match_duration_minutes
            )));
        }
        Ok(())
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub tournament: TournamentSettings,
    pub database_path: String,
    pub admin_token: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            tournament: TournamentSettings::from_env(),
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| DEFAULT_DATABASE_PATH.to_string()),
            admin_token: std::env::var("ADMIN_TOKEN").ok().filter(|t| !t.is_empty()),
        }
    }

    pub fn with_database_path(self, database_path: impl Into<String>) -> Self {
        Self {
            database_path: database_path.into(),
            ..self
        }
    }

    pub fn with_admin_token(self, token: impl Into<String>) -> Self {
        Self {
            admin_token: Some(token.into()),
            ..self
        }
    }

    pub fn with_tournament(self, tournament: TournamentSettings) -> Self {
        Self { tournament, ..self }
    }
}

pub mod settings;

pub use settings::{AppConfig, MAX_MATCH_DURATION_MINUTES, TournamentSettings};

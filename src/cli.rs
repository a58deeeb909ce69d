use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use crate::access::Role;
use crate::domain::{MatchId, Stage, TeamId};

#[derive(Parser, Debug)]
#[command(author, version, about = "Round-robin to knockout tournament builder")]
pub struct Cli {
    /// Role the command runs with
    #[arg(long, global = true, default_value = "admin")]
    pub role: Role,

    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "kebab-case")]
pub enum Command {
    /// Create a tournament from a CSV roster, replacing any saved one
    Init {
        /// CSV file with a header row (team_name, participants, ...)
        roster: PathBuf,
        /// First match time, "YYYY-MM-DD HH:MM" (defaults to now)
        #[arg(short, long)]
        start: Option<String>,
        /// Matches played at the same time
        #[arg(short, long, default_value_t = 1)]
        parallel: usize,
        /// Number of groups (overrides NUMBER_OF_GROUPS)
        #[arg(short, long)]
        groups: Option<usize>,
        /// Match length in minutes (overrides MATCH_DURATION_MINUTES)
        #[arg(short, long)]
        duration: Option<i64>,
        /// Teams that reach the quarterfinals (overrides TOTAL_QUALIFIERS)
        #[arg(short, long)]
        qualifiers: Option<usize>,
        /// Keep roster order instead of shuffling teams into groups
        #[arg(long)]
        no_shuffle: bool,
    },
    /// Record or correct a match result
    Result {
        match_id: MatchId,
        team1_score: i32,
        team2_score: i32,
        /// Winning team id; omit for a draw
        #[arg(short, long)]
        winner: Option<TeamId>,
    },
    /// Show ranked standings
    Standings {
        /// Group label, e.g. A
        #[arg(short, long)]
        group: Option<String>,
    },
    /// List matches
    Matches {
        /// group, quarterfinal, semifinal or final
        #[arg(short, long)]
        stage: Option<Stage>,
    },
    /// Show a team and its matches
    Team {
        /// Any part of the team name
        name: String,
    },
    /// Generate the next knockout stage once the current one is finished
    NextStage {
        /// Matches played at the same time
        #[arg(short, long, default_value_t = 1)]
        parallel: usize,
    },
    /// Run a free-text command, e.g. "match 3 2-1" or "standings group a"
    Ask {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Start the HTTP server
    Serve {
        /// Port number (optional, defaults to 3000)
        #[arg(short, long, default_value_t = 3000)]
        port: u16,
    },
    /// Print shell completions
    Completions { shell: Shell },
}

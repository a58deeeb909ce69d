use anyhow::Result;

use tournament_builder::cli::{Cli, Command};
use tournament_builder::{
    InitOptions, handle_ask, handle_completions, handle_init, handle_matches, handle_next_stage,
    handle_result, handle_serve, handle_standings, handle_team, interpret,
};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let cli = interpret();
    execute_command(&cli)
}

fn execute_command(cli: &Cli) -> Result<()> {
    match &cli.command {
        Command::Init {
            roster,
            start,
            parallel,
            groups,
            duration,
            qualifiers,
            no_shuffle,
        } => handle_init(
            cli.role,
            &InitOptions {
                roster,
                start: start.as_deref(),
                parallel: *parallel,
                groups: *groups,
                duration: *duration,
                qualifiers: *qualifiers,
                shuffle: !no_shuffle,
            },
        ),
        Command::Result {
            match_id,
            team1_score,
            team2_score,
            winner,
        } => handle_result(cli.role, *match_id, *team1_score, *team2_score, *winner),
        Command::Standings { group } => handle_standings(group.as_deref()),
        Command::Matches { stage } => handle_matches(*stage),
        Command::Team { name } => handle_team(name),
        Command::NextStage { parallel } => handle_next_stage(cli.role, *parallel),
        Command::Ask { text } => handle_ask(cli.role, &text.join(" ")),
        Command::Serve { port } => handle_serve(*port),
        Command::Completions { shell } => handle_completions(*shell),
    }
}

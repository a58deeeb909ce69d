pub mod access;
pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod database;
pub mod domain;
pub mod engine;
pub mod errors;
pub mod services;

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use clap::{CommandFactory, Parser};
use colored::Colorize;
use log::info;

use cli::Cli;

use crate::access::{Principal, Role};
use crate::config::AppConfig;
use crate::domain::{Match, MatchId, MatchStatus, RosterTable, Stage, Team, TeamId, TeamStanding};
use crate::services::server::ServerService;
use crate::services::{CommandOutcome, TournamentService, TournamentSetup};

const START_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

pub fn interpret() -> Cli {
    Cli::parse()
}

fn principal(role: Role) -> Principal {
    Principal::new(format!("cli-{}", role), role)
}

/// Options of the `init` command
pub struct InitOptions<'a> {
    pub roster: &'a Path,
    pub start: Option<&'a str>,
    pub parallel: usize,
    pub groups: Option<usize>,
    pub duration: Option<i64>,
    pub qualifiers: Option<usize>,
    pub shuffle: bool,
}

pub fn handle_init(role: Role, options: &InitOptions) -> Result<()> {
    let principal = principal(role);
    let mut service = TournamentService::new(AppConfig::new())?;

    let mut settings = service.config().tournament.clone();
    if let Some(groups) = options.groups {
        settings = settings.with_groups(groups);
    }
    if let Some(duration) = options.duration {
        settings = settings.with_match_duration(duration);
    }
    if let Some(qualifiers) = options.qualifiers {
        settings = settings.with_total_qualifiers(qualifiers);
    }
    service.apply_settings(&principal, settings)?;

    let start_time = match options.start {
        Some(raw) => NaiveDateTime::parse_from_str(raw, START_TIME_FORMAT)
            .with_context(|| format!("Start time must look like 2026-03-14 09:00, got {:?}", raw))?,
        None => Local::now().naive_local(),
    };

    let teams = RosterTable::from_csv_path(options.roster)?.parse_teams();
    info!("Read {} teams from {}", teams.len(), options.roster.display());

    let setup = TournamentSetup {
        parallel_matches: options.parallel,
        shuffle: options.shuffle,
        ..TournamentSetup::starting_at(start_time)
    };

    let matches = service.initialize(&principal, teams, &setup)?;

    println!(
        "{} {} teams, {} group matches",
        "Tournament created:".green().bold(),
        service.engine().teams().len(),
        matches.len()
    );
    for (label, teams) in service.engine().groups() {
        let names: Vec<&str> = teams.iter().map(|t| t.team_name.as_str()).collect();
        println!("  Group {}: {}", label.bold(), names.join(", "));
    }
    print_matches(&matches);
    Ok(())
}

pub fn handle_result(
    role: Role,
    match_id: MatchId,
    team1_score: i32,
    team2_score: i32,
    winner: Option<TeamId>,
) -> Result<()> {
    let mut service = TournamentService::open(AppConfig::new())?;
    let updated = service.record_result(&principal(role), match_id, team1_score, team2_score, winner)?;
    println!("{} {}", "Recorded:".green().bold(), updated.summary());
    Ok(())
}

pub fn handle_standings(group: Option<&str>) -> Result<()> {
    let service = TournamentService::open(AppConfig::new())?;
    let group = group.map(|g| g.trim().to_uppercase());
    print_standings(&service.engine().get_group_standings(group.as_deref()));
    Ok(())
}

pub fn handle_matches(stage: Option<Stage>) -> Result<()> {
    let service = TournamentService::open(AppConfig::new())?;
    let matches = match stage {
        Some(stage) => service.engine().get_matches_by_stage(stage),
        None => service.engine().matches().to_vec(),
    };
    print_matches(&matches);
    Ok(())
}

pub fn handle_team(name: &str) -> Result<()> {
    let service = TournamentService::open(AppConfig::new())?;
    let engine = service.engine();
    match engine.get_team_by_name(name) {
        Some(team) => print_team(team, &engine.get_team_matches(team.team_id)),
        None => println!("{}", format!("Team '{}' not found", name).yellow()),
    }
    Ok(())
}

pub fn handle_next_stage(role: Role, parallel: usize) -> Result<()> {
    let mut service = TournamentService::open(AppConfig::new())?;
    let generated = service.advance_stage(&principal(role), parallel)?;
    println!("{} {} matches", "Generated:".green().bold(), generated.len());
    print_matches(&generated);
    Ok(())
}

pub fn handle_ask(role: Role, text: &str) -> Result<()> {
    let mut service = TournamentService::open(AppConfig::new())?;
    let interpretation = service.interpret(text);
    println!(
        "{} {} ({:.0}% confidence)",
        "Understood:".cyan().bold(),
        interpretation.message,
        interpretation.confidence * 100.0
    );

    match service.execute(&principal(role), &interpretation)? {
        CommandOutcome::MatchUpdated(updated) => println!("{}", updated.summary()),
        CommandOutcome::Standings(standings) => print_standings(&standings),
        CommandOutcome::Matches(matches) | CommandOutcome::StageGenerated(matches) => {
            print_matches(&matches)
        }
        CommandOutcome::TeamInfo { team, matches } => print_team(&team, &matches),
        CommandOutcome::NotUnderstood(message) => println!("{}", message.yellow()),
    }
    Ok(())
}

pub fn handle_serve(port: u16) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let config = AppConfig::new();
        let service = ServerService::new(port, config);
        service.run().await
    })
}

pub fn handle_completions(shell: clap_complete::Shell) -> Result<()> {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
    Ok(())
}

fn print_matches(matches: &[Match]) {
    if matches.is_empty() {
        println!("{}", "No matches".dimmed());
        return;
    }

    for m in matches {
        let when = m
            .scheduled_time
            .map(|t| t.format(START_TIME_FORMAT).to_string())
            .unwrap_or_else(|| "unscheduled".to_string());
        let label = match &m.group {
            Some(group) => format!("{} {}", m.stage, group),
            None => m.stage.to_string(),
        };
        let line = format!("#{:<3} {:<16} {:<16} {}", m.match_id, label, when, m.summary());
        match m.status {
            MatchStatus::Completed => println!("{}", line.green()),
            MatchStatus::Cancelled => println!("{}", line.dimmed()),
            _ => println!("{}", line),
        }
    }
}

fn print_standings(standings: &[TeamStanding]) {
    if standings.is_empty() {
        println!("{}", "No standings yet".dimmed());
        return;
    }

    println!(
        "{}",
        format!(
            "{:>3}  {:<24} {:>5} {:>3} {:>3} {:>3} {:>3} {:>5} {:>5}",
            "#", "Team", "Group", "P", "W", "D", "L", "Diff", "Pts"
        )
        .bold()
    );
    for (i, s) in standings.iter().enumerate() {
        println!(
            "{:>3}  {:<24} {:>5} {:>3} {:>3} {:>3} {:>3} {:>5} {:>5}",
            i + 1,
            s.team_name,
            s.group.as_deref().unwrap_or("-"),
            s.matches_played,
            s.wins,
            s.draws,
            s.losses,
            s.tiebreaker_score_difference(),
            s.points
        );
    }
}

fn print_team(team: &Team, matches: &[Match]) {
    println!(
        "{} (#{}, group {})",
        team.team_name.bold(),
        team.team_id,
        team.group.as_deref().unwrap_or("-")
    );
    println!("  Participants: {}", team.participants_joined());
    print_matches(matches);
}

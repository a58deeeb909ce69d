use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result, bail};
use log::info;

use super::connection::{create_pool, get_connection};
use super::{fixtures, setup, standings, teams};
use crate::engine::TournamentState;
use crate::errors::storage_context;

/// Write the whole tournament to `db_path`.
///
/// The tables are filled inside one transaction in `<db_path>.tmp`, which then
/// replaces the target. A failure leaves the previous file as it was.
pub fn save_tournament(db_path: &str, state: &TournamentState) -> Result<()> {
    let temp_db_path = format!("{}.tmp", db_path);

    if Path::new(&temp_db_path).exists() {
        std::fs::remove_file(&temp_db_path)
            .with_context(|| format!("Failed to remove stale {}", temp_db_path))?;
    }

    write_tables(&temp_db_path, state)?;

    std::fs::rename(&temp_db_path, db_path)
        .with_context(|| format!("Failed to move {} over {}", temp_db_path, db_path))?;
    info!(
        "Saved {} teams, {} matches to {}",
        state.teams.len(),
        state.matches.len(),
        db_path
    );
    Ok(())
}

fn write_tables(db_path: &str, state: &TournamentState) -> Result<()> {
    let pool = create_pool(db_path)?;
    let mut conn = get_connection(&pool)?;

    setup::reset_database(&conn)?;

    let tx = conn.transaction().context("Failed to start transaction")?;
    teams::insert_teams(&tx, &state.teams).context(storage_context("write", "teams"))?;
    fixtures::insert_fixtures(&tx, &state.matches).context(storage_context("write", "fixtures"))?;
    standings::insert_standings(&tx, &state.standings)
        .context(storage_context("write", "standings"))?;
    tx.commit().context("Failed to commit tournament state")?;

    Ok(())
}

/// Read a tournament previously written by [`save_tournament`].
///
/// Every table is read and checked before anything is returned, so callers
/// can swap the result in without ever holding a half-loaded state.
pub fn load_tournament(db_path: &str) -> Result<TournamentState> {
    if !Path::new(db_path).exists() {
        bail!("No saved tournament at {}", db_path);
    }

    let pool = create_pool(db_path)?;
    let conn = get_connection(&pool)?;

    let state = TournamentState {
        teams: teams::list_all(&conn).context(storage_context("read", "teams"))?,
        matches: fixtures::list_all(&conn).context(storage_context("read", "fixtures"))?,
        standings: standings::list_all(&conn).context(storage_context("read", "standings"))?,
    };
    validate(&state)?;

    info!(
        "Loaded {} teams, {} matches from {}",
        state.teams.len(),
        state.matches.len(),
        db_path
    );
    Ok(state)
}

fn validate(state: &TournamentState) -> Result<()> {
    let team_ids: BTreeSet<_> = state.teams.iter().map(|t| t.team_id).collect();

    for m in &state.matches {
        for team_id in [m.team1_id, m.team2_id] {
            if !team_ids.contains(&team_id) {
                bail!("Match {} references unknown team {}", m.match_id, team_id);
            }
        }
    }

    if let Some(team_id) = state.standings.keys().find(|id| !team_ids.contains(id)) {
        bail!("Standing recorded for unknown team {}", team_id);
    }

    Ok(())
}

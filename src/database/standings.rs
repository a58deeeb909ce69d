use std::collections::BTreeMap;

use anyhow::{Context, Result};
use rusqlite::{Connection, params};

use crate::domain::{TeamId, TeamStanding};

const COLUMNS: &str = r#"team_id, team_name, "group", matches_played, wins, losses, draws, points,
    score_for, score_against, tiebreaker_score_for, tiebreaker_score_against"#;

pub fn insert_standings(
    conn: &Connection,
    standings: &BTreeMap<TeamId, TeamStanding>,
) -> Result<usize> {
    let sql = format!(
        "INSERT INTO standings ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        COLUMNS
    );
    let mut stmt = conn.prepare(&sql).context("Failed to prepare standing insert")?;

    for s in standings.values() {
        stmt.execute(params![
            s.team_id,
            s.team_name,
            s.group,
            s.matches_played,
            s.wins,
            s.losses,
            s.draws,
            s.points,
            s.score_for,
            s.score_against,
            s.tiebreaker_score_for,
            s.tiebreaker_score_against,
        ])
        .with_context(|| format!("Failed to insert standing for team {}", s.team_id))?;
    }

    Ok(standings.len())
}

pub fn list_all(conn: &Connection) -> Result<BTreeMap<TeamId, TeamStanding>> {
    let sql = format!("SELECT {} FROM standings", COLUMNS);

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], parse_standing_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows.into_iter().map(|s| (s.team_id, s)).collect())
}

fn parse_standing_row(row: &rusqlite::Row) -> rusqlite::Result<TeamStanding> {
    Ok(TeamStanding {
        team_id: row.get(0)?,
        team_name: row.get(1)?,
        group: row.get(2)?,
        matches_played: row.get(3)?,
        wins: row.get(4)?,
        losses: row.get(5)?,
        draws: row.get(6)?,
        points: row.get(7)?,
        score_for: row.get(8)?,
        score_against: row.get(9)?,
        tiebreaker_score_for: row.get(10)?,
        tiebreaker_score_against: row.get(11)?,
    })
}

use anyhow::{Context, Result};
use rusqlite::{Connection, params};

use crate::domain::Team;

pub fn insert_teams(conn: &Connection, teams: &[Team]) -> Result<usize> {
    let sql = r#"INSERT INTO teams (team_id, team_name, participants, "group") VALUES (?1, ?2, ?3, ?4)"#;
    let mut stmt = conn.prepare(sql).context("Failed to prepare team insert")?;

    for team in teams {
        stmt.execute(params![
            team.team_id,
            team.team_name,
            team.participants_joined(),
            team.group
        ])
        .with_context(|| format!("Failed to insert team {}", team.team_id))?;
    }

    Ok(teams.len())
}

pub fn list_all(conn: &Connection) -> Result<Vec<Team>> {
    let sql = r#"SELECT team_id, team_name, participants, "group" FROM teams ORDER BY team_id"#;

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map([], parse_team_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

fn parse_team_row(row: &rusqlite::Row) -> rusqlite::Result<Team> {
    let participants: String = row.get(2)?;
    Ok(Team {
        team_id: row.get(0)?,
        team_name: row.get(1)?,
        participants: Team::split_participants(&participants),
        group: row.get(3)?,
    })
}

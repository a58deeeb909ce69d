use anyhow::{Context, Result};
use rusqlite::types::Type;
use rusqlite::{Connection, params};

use crate::domain::{Match, MatchStatus, Stage};

const COLUMNS: &str = r#"match_id, team1_id, team1_name, team2_id, team2_name, stage, "group",
    scheduled_time, end_time, team1_score, team2_score, winner_id, winner_name, status"#;

pub fn insert_fixtures(conn: &Connection, matches: &[Match]) -> Result<usize> {
    let sql = format!(
        "INSERT INTO fixtures ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        COLUMNS
    );
    let mut stmt = conn.prepare(&sql).context("Failed to prepare fixture insert")?;

    for m in matches {
        stmt.execute(params![
            m.match_id,
            m.team1_id,
            m.team1_name,
            m.team2_id,
            m.team2_name,
            m.stage.as_str(),
            m.group,
            m.scheduled_time,
            m.end_time,
            m.team1_score,
            m.team2_score,
            m.winner_id,
            m.winner_name,
            m.status.as_str(),
        ])
        .with_context(|| format!("Failed to insert match {}", m.match_id))?;
    }

    Ok(matches.len())
}

/// All fixtures in generation order.
pub fn list_all(conn: &Connection) -> Result<Vec<Match>> {
    let sql = format!("SELECT {} FROM fixtures ORDER BY match_id", COLUMNS);

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], parse_fixture_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

fn parse_fixture_row(row: &rusqlite::Row) -> rusqlite::Result<Match> {
    let stage: String = row.get(5)?;
    let status: String = row.get(13)?;

    Ok(Match {
        match_id: row.get(0)?,
        team1_id: row.get(1)?,
        team1_name: row.get(2)?,
        team2_id: row.get(3)?,
        team2_name: row.get(4)?,
        stage: stage
            .parse::<Stage>()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?,
        group: row.get(6)?,
        scheduled_time: row.get(7)?,
        end_time: row.get(8)?,
        team1_score: row.get(9)?,
        team2_score: row.get(10)?,
        winner_id: row.get(11)?,
        winner_name: row.get(12)?,
        status: status
            .parse::<MatchStatus>()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(13, Type::Text, Box::new(e)))?,
    })
}

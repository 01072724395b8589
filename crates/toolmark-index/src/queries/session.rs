use rusqlite::{Connection, OptionalExtension, params};
use serde_json::{Map, Value};
use toolmark_types::{CanonicalMessage, CanonicalSession, SessionSummary};

use crate::Result;

/// Insert or replace the session's content; annotations are left in place
pub fn upsert(conn: &Connection, session: &CanonicalSession) -> Result<()> {
    let metadata = serde_json::to_string(&session.metadata)?;
    let messages = serde_json::to_string(&session.messages)?;

    conn.execute(
        r#"
        INSERT INTO sessions (session_id, created_at, model, source_format, metadata, messages,
                              message_count, tool_call_count)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        ON CONFLICT(session_id) DO UPDATE SET
            created_at = ?2,
            model = ?3,
            source_format = ?4,
            metadata = ?5,
            messages = ?6,
            message_count = ?7,
            tool_call_count = ?8
        "#,
        params![
            &session.session_id,
            &session.created_at,
            &session.model,
            session.source_format(),
            metadata,
            messages,
            session.message_count() as i64,
            session.tool_call_count() as i64,
        ],
    )?;

    Ok(())
}

pub fn get_by_id(conn: &Connection, session_id: &str) -> Result<Option<CanonicalSession>> {
    let row = conn
        .query_row(
            r#"
            SELECT session_id, created_at, model, metadata, messages
            FROM sessions
            WHERE session_id = ?1
            "#,
            [session_id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            },
        )
        .optional()?;

    let Some((session_id, created_at, model, metadata, messages)) = row else {
        return Ok(None);
    };

    let metadata: Map<String, Value> = serde_json::from_str(&metadata)?;
    let messages: Vec<CanonicalMessage> = serde_json::from_str(&messages)?;

    Ok(Some(CanonicalSession {
        session_id,
        created_at,
        model,
        metadata,
        messages,
    }))
}

pub fn exists(conn: &Connection, session_id: &str) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM sessions WHERE session_id = ?1",
            [session_id],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Newest first by the session's own timestamp
pub fn list(conn: &Connection) -> Result<Vec<SessionSummary>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT s.session_id, s.created_at, s.model, s.source_format,
               s.message_count, s.tool_call_count,
               (SELECT COUNT(*) FROM annotations a WHERE a.session_id = s.session_id)
        FROM sessions s
        ORDER BY s.created_at DESC, s.session_id ASC
        "#,
    )?;

    let sessions = stmt
        .query_map([], |row| {
            Ok(SessionSummary {
                session_id: row.get(0)?,
                created_at: row.get(1)?,
                model: row.get(2)?,
                source_format: row.get(3)?,
                message_count: row.get::<_, i64>(4)? as usize,
                tool_call_count: row.get::<_, i64>(5)? as usize,
                annotation_count: row.get::<_, i64>(6)? as usize,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(sessions)
}

/// (session count, tool call count) across the store
pub fn totals(conn: &Connection) -> Result<(usize, usize)> {
    let (sessions, tool_calls): (i64, i64) = conn.query_row(
        "SELECT COUNT(*), COALESCE(SUM(tool_call_count), 0) FROM sessions",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    Ok((sessions as usize, tool_calls as usize))
}

use rusqlite::types::Type;
use rusqlite::{Connection, Row, params};
use std::collections::BTreeMap;
use std::str::FromStr;
use toolmark_types::ToolCallAnnotation;

use crate::Result;

const SELECT_COLUMNS: &str = r#"
    SELECT id, session_id, message_index, tool_call_index, annotator,
           correctness, error_type, severity, comment, created_at
    FROM annotations
"#;

pub fn insert(conn: &Connection, annotation: &ToolCallAnnotation) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO annotations (id, session_id, message_index, tool_call_index, annotator,
                                 correctness, error_type, severity, comment, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
        params![
            &annotation.id,
            &annotation.session_id,
            annotation.message_index as i64,
            annotation.tool_call_index as i64,
            &annotation.annotator,
            annotation.correctness.as_str(),
            annotation.error_type.map(|e| e.as_str()),
            annotation.severity.map(|s| s.as_str()),
            &annotation.comment,
            &annotation.created_at,
        ],
    )?;
    Ok(())
}

/// Newest first, optionally restricted to one session
pub fn list(conn: &Connection, session_id: Option<&str>) -> Result<Vec<ToolCallAnnotation>> {
    let annotations = match session_id {
        Some(id) => {
            let query = format!(
                "{} WHERE session_id = ?1 ORDER BY created_at DESC, rowid DESC",
                SELECT_COLUMNS
            );
            let mut stmt = conn.prepare(&query)?;
            let rows = stmt
                .query_map([id], map_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows
        }
        None => {
            let query = format!("{} ORDER BY created_at DESC, rowid DESC", SELECT_COLUMNS);
            let mut stmt = conn.prepare(&query)?;
            let rows = stmt
                .query_map([], map_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows
        }
    };
    Ok(annotations)
}

/// Oldest first, keyed by (message_index, tool_call_index)
pub fn by_position(
    conn: &Connection,
    session_id: &str,
) -> Result<BTreeMap<(usize, usize), Vec<ToolCallAnnotation>>> {
    let query = format!(
        "{} WHERE session_id = ?1 ORDER BY created_at ASC, rowid ASC",
        SELECT_COLUMNS
    );
    let mut stmt = conn.prepare(&query)?;
    let rows = stmt.query_map([session_id], map_row)?;

    let mut grouped: BTreeMap<(usize, usize), Vec<ToolCallAnnotation>> = BTreeMap::new();
    for row in rows {
        let annotation = row?;
        grouped
            .entry((annotation.message_index, annotation.tool_call_index))
            .or_default()
            .push(annotation);
    }
    Ok(grouped)
}

pub fn count(conn: &Connection) -> Result<usize> {
    let n: i64 = conn.query_row("SELECT COUNT(*) FROM annotations", [], |row| row.get(0))?;
    Ok(n as usize)
}

/// Count annotations per distinct non-null value of `column`
pub fn distribution(conn: &Connection, column: Column) -> Result<BTreeMap<String, usize>> {
    let name = column.as_sql();
    let query = format!(
        "SELECT {name}, COUNT(*) FROM annotations WHERE {name} IS NOT NULL GROUP BY {name}"
    );
    let mut stmt = conn.prepare(&query)?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as usize))
    })?;

    let mut counts = BTreeMap::new();
    for row in rows {
        let (value, n) = row?;
        counts.insert(value, n);
    }
    Ok(counts)
}

/// Annotation columns that can be grouped on
#[derive(Debug, Clone, Copy)]
pub enum Column {
    Correctness,
    ErrorType,
}

impl Column {
    fn as_sql(&self) -> &'static str {
        match self {
            Column::Correctness => "correctness",
            Column::ErrorType => "error_type",
        }
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<ToolCallAnnotation> {
    Ok(ToolCallAnnotation {
        id: row.get(0)?,
        session_id: row.get(1)?,
        message_index: row.get::<_, i64>(2)? as usize,
        tool_call_index: row.get::<_, i64>(3)? as usize,
        annotator: row.get(4)?,
        correctness: parse_column(row, 5)?,
        error_type: parse_optional_column(row, 6)?,
        severity: parse_optional_column(row, 7)?,
        comment: row.get(8)?,
        created_at: row.get(9)?,
    })
}

pub(crate) fn parse_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let text: String = row.get(idx)?;
    text.parse::<T>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parse_optional_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match row.get::<_, Option<String>>(idx)? {
        Some(text) => text
            .parse::<T>()
            .map(Some)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))),
        None => Ok(None),
    }
}

use rusqlite::types::{ToSql, Type};
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use std::collections::BTreeMap;
use toolmark_types::{ReviewCounts, ReviewStatus, Submission, SubmissionData, TaskType};

use super::annotation::parse_column;
use crate::Result;

const SELECT_COLUMNS: &str = r#"
    SELECT id, task_id, sample_id, prompt, domain, annotator, submitted_at,
           duration_seconds, review_status, review_comment, reviewed_at, data
    FROM submissions
"#;

pub fn insert(conn: &Connection, submission: &Submission) -> Result<()> {
    let data = serde_json::to_string(&submission.data)?;

    conn.execute(
        r#"
        INSERT INTO submissions (id, task_id, task_type, sample_id, prompt, domain, annotator,
                                 submitted_at, duration_seconds, review_status, review_comment,
                                 reviewed_at, data)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
        "#,
        params![
            &submission.id,
            &submission.task_id,
            submission.task_type().as_str(),
            &submission.sample_id,
            &submission.prompt,
            &submission.domain,
            &submission.annotator,
            &submission.submitted_at,
            submission.duration_seconds as i64,
            submission.review_status.as_str(),
            &submission.review_comment,
            &submission.reviewed_at,
            data,
        ],
    )?;
    Ok(())
}

pub fn get_by_id(conn: &Connection, id: &str) -> Result<Option<Submission>> {
    let query = format!("{} WHERE id = ?1", SELECT_COLUMNS);
    Ok(conn.query_row(&query, [id], map_row).optional()?)
}

pub fn for_sample(conn: &Connection, task_id: &str, sample_id: &str) -> Result<Option<Submission>> {
    let query = format!("{} WHERE task_id = ?1 AND sample_id = ?2", SELECT_COLUMNS);
    Ok(conn
        .query_row(&query, [task_id, sample_id], map_row)
        .optional()?)
}

pub fn count_for_task(conn: &Connection, task_id: &str) -> Result<usize> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM submissions WHERE task_id = ?1",
        [task_id],
        |row| row.get(0),
    )?;
    Ok(n as usize)
}

/// Record a review on a pending submission
///
/// Returns `false` when no pending submission with that id exists.
pub fn review(
    conn: &Connection,
    id: &str,
    status: ReviewStatus,
    comment: Option<&str>,
    reviewed_at: &str,
) -> Result<bool> {
    let changed = conn.execute(
        r#"
        UPDATE submissions
        SET review_status = ?2, review_comment = ?3, reviewed_at = ?4
        WHERE id = ?1 AND review_status = 'pending'
        "#,
        params![id, status.as_str(), comment, reviewed_at],
    )?;
    Ok(changed == 1)
}

/// Newest first, optionally restricted by task and review status
pub fn list(
    conn: &Connection,
    task_id: Option<&str>,
    status: Option<ReviewStatus>,
) -> Result<Vec<Submission>> {
    let mut clauses = Vec::new();
    let mut values: Vec<&dyn ToSql> = Vec::new();
    if let Some(task_id) = &task_id {
        clauses.push("task_id = ?");
        values.push(task_id);
    }
    let status = status.map(|s| s.as_str());
    if let Some(status) = &status {
        clauses.push("review_status = ?");
        values.push(status);
    }

    let mut query = SELECT_COLUMNS.to_string();
    if !clauses.is_empty() {
        query.push_str(&format!(" WHERE {}", clauses.join(" AND ")));
    }
    query.push_str(" ORDER BY submitted_at DESC, rowid DESC");

    let mut stmt = conn.prepare(&query)?;
    let rows = stmt
        .query_map(params_from_iter(values), map_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Review counts and mean duration in seconds, store-wide or for one task
pub fn tally(conn: &Connection, task_id: Option<&str>) -> Result<(ReviewCounts, f64)> {
    let tally = conn.query_row(
        r#"
        SELECT COALESCE(SUM(review_status = 'pending'), 0),
               COALESCE(SUM(review_status = 'approved'), 0),
               COALESCE(SUM(review_status = 'rejected'), 0),
               COALESCE(AVG(duration_seconds), 0.0)
        FROM submissions
        WHERE ?1 IS NULL OR task_id = ?1
        "#,
        [task_id],
        |row| {
            Ok((
                ReviewCounts {
                    pending: row.get::<_, i64>(0)? as usize,
                    approved: row.get::<_, i64>(1)? as usize,
                    rejected: row.get::<_, i64>(2)? as usize,
                },
                row.get::<_, f64>(3)?,
            ))
        },
    )?;
    Ok(tally)
}

/// Count submissions per distinct value of `column`
pub fn distribution(conn: &Connection, column: Column) -> Result<BTreeMap<String, usize>> {
    let name = column.as_sql();
    let query = format!("SELECT {name}, COUNT(*) FROM submissions GROUP BY {name}");
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

/// Payloads of every submission of one task type, oldest first
pub fn data_of_type(conn: &Connection, task_type: TaskType) -> Result<Vec<SubmissionData>> {
    let mut stmt =
        conn.prepare("SELECT data FROM submissions WHERE task_type = ?1 ORDER BY rowid ASC")?;
    let rows = stmt
        .query_map([task_type.as_str()], |row| parse_data(row, 0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Submission columns that can be grouped on
#[derive(Debug, Clone, Copy)]
pub enum Column {
    Domain,
    TaskType,
}

impl Column {
    fn as_sql(&self) -> &'static str {
        match self {
            Column::Domain => "domain",
            Column::TaskType => "task_type",
        }
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<Submission> {
    Ok(Submission {
        id: row.get(0)?,
        task_id: row.get(1)?,
        sample_id: row.get(2)?,
        prompt: row.get(3)?,
        domain: row.get(4)?,
        annotator: row.get(5)?,
        submitted_at: row.get(6)?,
        duration_seconds: row.get::<_, i64>(7)? as u64,
        review_status: parse_column(row, 8)?,
        review_comment: row.get(9)?,
        reviewed_at: row.get(10)?,
        data: parse_data(row, 11)?,
    })
}

fn parse_data(row: &Row<'_>, idx: usize) -> rusqlite::Result<SubmissionData> {
    let text: String = row.get(idx)?;
    serde_json::from_str(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

use rusqlite::Connection;

use crate::Result;

// Schema version (increment when changing table definitions)
pub const SCHEMA_VERSION: i32 = 2;

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;

    let current_version: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    if current_version != 0 && current_version != SCHEMA_VERSION {
        tracing::warn!(
            found = current_version,
            expected = SCHEMA_VERSION,
            "store schema changed; dropping tables"
        );
        drop_all_tables(conn)?;
    }

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            session_id TEXT PRIMARY KEY,
            created_at TEXT NOT NULL,
            model TEXT NOT NULL,
            source_format TEXT,
            metadata TEXT NOT NULL DEFAULT '{}',
            messages TEXT NOT NULL,
            message_count INTEGER NOT NULL,
            tool_call_count INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS annotations (
            id TEXT PRIMARY KEY,
            session_id TEXT NOT NULL,
            message_index INTEGER NOT NULL,
            tool_call_index INTEGER NOT NULL,
            annotator TEXT NOT NULL,
            correctness TEXT NOT NULL,
            error_type TEXT,
            severity TEXT,
            comment TEXT,
            created_at TEXT NOT NULL,
            FOREIGN KEY (session_id) REFERENCES sessions(session_id)
        );

        CREATE TABLE IF NOT EXISTS submissions (
            id TEXT PRIMARY KEY,
            task_id TEXT NOT NULL,
            task_type TEXT NOT NULL,
            sample_id TEXT NOT NULL,
            prompt TEXT NOT NULL,
            domain TEXT NOT NULL,
            annotator TEXT NOT NULL,
            submitted_at TEXT NOT NULL,
            duration_seconds INTEGER NOT NULL DEFAULT 0,
            review_status TEXT NOT NULL DEFAULT 'pending',
            review_comment TEXT,
            reviewed_at TEXT,
            data TEXT NOT NULL,
            UNIQUE (task_id, sample_id)
        );

        CREATE INDEX IF NOT EXISTS idx_sessions_created ON sessions(created_at DESC);
        CREATE INDEX IF NOT EXISTS idx_annotations_session ON annotations(session_id);
        CREATE INDEX IF NOT EXISTS idx_submissions_task ON submissions(task_id);
        CREATE INDEX IF NOT EXISTS idx_submissions_status ON submissions(review_status);
        "#,
    )?;

    conn.execute(&format!("PRAGMA user_version = {}", SCHEMA_VERSION), [])?;

    Ok(())
}

fn drop_all_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        DROP TABLE IF EXISTS submissions;
        DROP TABLE IF EXISTS annotations;
        DROP TABLE IF EXISTS sessions;
        "#,
    )?;
    Ok(())
}

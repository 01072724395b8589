use rusqlite::Connection;
use std::path::Path;
use std::collections::BTreeMap;
use toolmark_types::{
    AnnotationStats, CanonicalSession, ReviewCounts, ReviewStatus, SessionSummary, Submission,
    SubmissionData, TaskType, ToolCallAnnotation, ToolCallEntry, annotation_rate,
};

use crate::queries::annotation::{self, Column};
use crate::queries::session;
use crate::queries::submission;

pub use crate::queries::submission::Column as SubmissionColumn;
use crate::{Result, schema};

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        let _mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;

        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    pub fn init_schema(&self) -> Result<()> {
        schema::init_schema(&self.conn)
    }

    // --- Sessions ---

    /// Store a session, replacing any previous session with the same id
    pub fn upsert_session(&self, session: &CanonicalSession) -> Result<()> {
        session::upsert(&self.conn, session)?;
        tracing::debug!(session_id = %session.session_id, "stored session");
        Ok(())
    }

    pub fn get_session(&self, session_id: &str) -> Result<Option<CanonicalSession>> {
        session::get_by_id(&self.conn, session_id)
    }

    pub fn session_exists(&self, session_id: &str) -> Result<bool> {
        session::exists(&self.conn, session_id)
    }

    pub fn list_sessions(&self) -> Result<Vec<SessionSummary>> {
        session::list(&self.conn)
    }

    /// Every tool call of a session in conversation order, with its annotations
    ///
    /// Returns `None` when the session does not exist.
    pub fn tool_calls(&self, session_id: &str) -> Result<Option<Vec<ToolCallEntry>>> {
        let Some(session) = self.get_session(session_id)? else {
            return Ok(None);
        };
        let mut annotations = annotation::by_position(&self.conn, session_id)?;

        let mut entries = Vec::with_capacity(session.tool_call_count());
        for (message_index, message) in session.messages.iter().enumerate() {
            for (tool_call_index, call) in message.tool_calls().iter().enumerate() {
                entries.push(ToolCallEntry {
                    message_index,
                    tool_call_index,
                    tool_call: call.clone(),
                    annotations: annotations
                        .remove(&(message_index, tool_call_index))
                        .unwrap_or_default(),
                });
            }
        }

        Ok(Some(entries))
    }

    // --- Annotations ---

    pub fn insert_annotation(&self, record: &ToolCallAnnotation) -> Result<()> {
        annotation::insert(&self.conn, record)?;
        tracing::debug!(
            id = %record.id,
            session_id = %record.session_id,
            message_index = record.message_index,
            tool_call_index = record.tool_call_index,
            "stored annotation"
        );
        Ok(())
    }

    pub fn list_annotations(&self, session_id: Option<&str>) -> Result<Vec<ToolCallAnnotation>> {
        annotation::list(&self.conn, session_id)
    }

    pub fn stats(&self) -> Result<AnnotationStats> {
        let (total_sessions, total_tool_calls) = session::totals(&self.conn)?;
        let total_annotations = annotation::count(&self.conn)?;

        Ok(AnnotationStats {
            total_sessions,
            total_tool_calls,
            total_annotations,
            annotation_rate: annotation_rate(total_annotations, total_tool_calls),
            correctness_distribution: annotation::distribution(&self.conn, Column::Correctness)?,
            error_type_distribution: annotation::distribution(&self.conn, Column::ErrorType)?,
        })
    }

    // --- Preference-data submissions ---

    pub fn insert_submission(&self, record: &Submission) -> Result<()> {
        submission::insert(&self.conn, record)?;
        tracing::debug!(
            id = %record.id,
            task_id = %record.task_id,
            sample_id = %record.sample_id,
            "stored submission"
        );
        Ok(())
    }

    pub fn get_submission(&self, id: &str) -> Result<Option<Submission>> {
        submission::get_by_id(&self.conn, id)
    }

    pub fn submission_for_sample(
        &self,
        task_id: &str,
        sample_id: &str,
    ) -> Result<Option<Submission>> {
        submission::for_sample(&self.conn, task_id, sample_id)
    }

    pub fn count_submissions(&self, task_id: &str) -> Result<usize> {
        submission::count_for_task(&self.conn, task_id)
    }

    /// Move a pending submission to `status`; `false` if it was not pending
    pub fn review_submission(
        &self,
        id: &str,
        status: ReviewStatus,
        comment: Option<&str>,
        reviewed_at: &str,
    ) -> Result<bool> {
        submission::review(&self.conn, id, status, comment, reviewed_at)
    }

    pub fn list_submissions(
        &self,
        task_id: Option<&str>,
        status: Option<ReviewStatus>,
    ) -> Result<Vec<Submission>> {
        submission::list(&self.conn, task_id, status)
    }

    /// Review counts and mean duration, store-wide or for one task
    pub fn submission_tally(&self, task_id: Option<&str>) -> Result<(ReviewCounts, f64)> {
        submission::tally(&self.conn, task_id)
    }

    pub fn submission_distribution(
        &self,
        column: SubmissionColumn,
    ) -> Result<BTreeMap<String, usize>> {
        submission::distribution(&self.conn, column)
    }

    pub fn submission_data(&self, task_type: TaskType) -> Result<Vec<SubmissionData>> {
        submission::data_of_type(&self.conn, task_type)
    }
}

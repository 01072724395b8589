use crate::{Error, Result};
use toolmark_index::Database;
use toolmark_types::{AnnotationStats, CanonicalSession, SessionSummary, ToolCallEntry};

pub struct SessionService<'a> {
    db: &'a Database,
}

impl<'a> SessionService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn list(&self) -> Result<Vec<SessionSummary>> {
        Ok(self.db.list_sessions()?)
    }

    pub fn get(&self, session_id: &str) -> Result<CanonicalSession> {
        self.db
            .get_session(session_id)?
            .ok_or_else(|| not_found(session_id))
    }

    pub fn tool_calls(&self, session_id: &str) -> Result<Vec<ToolCallEntry>> {
        self.db
            .tool_calls(session_id)?
            .ok_or_else(|| not_found(session_id))
    }

    pub fn stats(&self) -> Result<AnnotationStats> {
        Ok(self.db.stats()?)
    }
}

pub(crate) fn not_found(session_id: &str) -> Error {
    Error::NotFound(format!("session '{}'", session_id))
}
